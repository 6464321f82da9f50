use serde_json::json;

use super::*;

#[test]
fn empty_input_yields_default_document() {
    for raw in [json!({}), Value::Null] {
        let doc = ensure_schema_v2(&raw, "Demo");
        assert_eq!(doc.version, CURRENT_SCHEMA_VERSION);
        assert_eq!(doc.project_name, "Demo");
        assert_eq!(doc.metadata.name, "Demo");
        assert_eq!(doc.current_scene_id, MAIN_SCENE_ID);
        assert_eq!(doc.scenes.len(), 1);
        assert_eq!(doc.scenes[0].is_main, Some(true));
        assert_eq!(doc.settings.canvas.width, 1080.0);
        assert_eq!(doc.output_settings.bitrate, "8M");
    }
    let scalar = ensure_schema_v2(&json!(42), "Fallback");
    assert_eq!(scalar.project_name, "Fallback");
}

#[test]
fn legacy_flat_document_is_upgraded() {
    let raw = json!({
        "projectName": "Legacy",
        "tracks": [{"id": "track-video", "type": "video", "clips": []}],
        "playheadTime": 2.5,
        "timelineZoom": 0,
        "customKey": {"kept": true}
    });
    let doc = ensure_schema_v2(&raw, "Fallback");
    assert_eq!(doc.version, 2);
    assert_eq!(doc.project_name, "Legacy");
    assert_eq!(doc.metadata.name, "Legacy");
    assert_eq!(doc.scenes.len(), 1);
    assert_eq!(doc.scenes[0].tracks, doc.tracks);
    assert_eq!(doc.tracks.len(), 1);
    assert_eq!(doc.playhead_time, 2.5);
    assert_eq!(doc.timeline_view_state.playhead_time, 2.5);
    // Zero is treated as missing.
    assert_eq!(doc.timeline_zoom, 1.0);
    assert_eq!(doc.extra.get("customKey"), Some(&json!({"kept": true})));
}

#[test]
fn active_scene_tracks_are_mirrored() {
    let raw = json!({
        "version": 2,
        "currentSceneId": "b",
        "scenes": [
            {"id": "a", "tracks": [{"id": "t-a", "type": "video"}]},
            {"id": "b", "tracks": [{"id": "t-b", "type": "audio"}], "color": "red"},
            "not a scene"
        ]
    });
    let doc = ensure_schema_v2(&raw, "P");
    assert_eq!(doc.scenes.len(), 2);
    assert_eq!(doc.tracks[0]["id"], "t-b");
    assert_eq!(doc.scenes[1].extra.get("color"), Some(&json!("red")));
}

#[test]
fn scenes_without_ids_are_numbered() {
    let raw = json!({"scenes": [{"tracks": []}, {"id": 0}]});
    let doc = ensure_schema_v2(&raw, "P");
    assert_eq!(doc.scenes[0].id, "scene_1");
    assert_eq!(doc.scenes[1].id, "scene_2");
    assert_eq!(doc.current_scene_id, "scene_1");
}

#[test]
fn output_settings_merge_over_defaults() {
    let out = merge_output_settings(Some(&json!({"fps": 60, "codec": "h264"})));
    assert_eq!(out.fps, 60.0);
    assert_eq!(out.width, 1920);
    assert_eq!(out.extra.get("codec"), Some(&json!("h264")));
    assert_eq!(merge_output_settings(None), OutputSettings::default());
}

#[test]
fn persisted_round_trip_keeps_tracks_transitions_and_view() {
    let raw = json!({
        "version": 2,
        "projectName": "Round",
        "currentSceneId": "scene_main",
        "scenes": [{"id": "scene_main", "name": "Scene 1", "isMain": true, "tracks": [
            {"id": "track-video", "type": "video", "label": "Video", "clips": [
                {"id": "c1", "type": "video", "startTime": 0, "duration": 2, "layer": 1,
                 "vendorField": [1, 2, 3]}
            ]}
        ]}],
        "transitions": [{"id": "t1", "type": "cross_fade", "fromClipId": "c1",
                         "toClipId": "c2", "durationFrames": 12}],
        "playheadTime": 1.25,
        "timelineZoom": 2
    });
    let doc = ensure_schema_v2(&raw, "x");
    let flat = doc.flat_state();
    let rebuilt = build_persisted(&flat, "Round", &flat.output_settings);

    assert_eq!(rebuilt.tracks, doc.tracks);
    assert_eq!(rebuilt.scenes[0].tracks, doc.tracks);
    assert_eq!(rebuilt.transitions, doc.transitions);
    assert_eq!(rebuilt.playhead_time, 1.25);
    assert_eq!(rebuilt.timeline_zoom, 2.0);
    assert_eq!(rebuilt.timeline_view_state.zoom_level, 2.0);
    assert_eq!(rebuilt.timeline_view_state.playhead_time, 1.25);
}

#[test]
fn persist_onto_keeps_other_scenes() {
    let base = ensure_schema_v2(
        &json!({"currentSceneId": "b", "scenes": [{"id": "a", "tracks": [1]}, {"id": "b"}]}),
        "P",
    );
    let flat = FlatState {
        tracks: vec![json!({"id": "new", "type": "graphics"})],
        ..FlatState::default()
    };
    let doc = build_persisted_onto(&base, &flat, "Renamed", &OutputSettings::default());
    assert_eq!(doc.scenes[0].tracks, vec![json!(1)]);
    assert_eq!(doc.scenes[1].tracks, flat.tracks);
    assert_eq!(doc.metadata.name, "Renamed");
}

#[test]
fn flat_to_state_drops_malformed_entries() {
    let flat = FlatState {
        tracks: vec![
            json!({"id": "track-video", "type": "video", "clips": [
                {"id": "ok", "type": "video", "duration": 1},
                {"id": "bad", "type": "hologram"}
            ]}),
            json!({"id": "weird", "type": "smell"}),
            json!("nope"),
        ],
        transitions: vec![json!({"id": "t"}), json!({"id": "t2", "type": "hard_wipe",
            "fromClipId": "a", "toClipId": "b", "durationFrames": 4, "direction": "left"})],
        ..FlatState::default()
    };
    let state = flat_to_state(&flat);
    assert_eq!(state.tracks.len(), 1);
    assert_eq!(state.tracks[0].clips.len(), 1);
    assert_eq!(state.tracks[0].clips[0].id, "ok");
    assert_eq!(state.transitions.len(), 1);
    assert_eq!(state.transitions[0].layer, 1);
}

#[test]
fn typed_state_survives_flat_round_trip() {
    let mut state = TimelineState::default();
    let mut clip = Clip::new("c", crate::timeline::model::ClipKind::Text);
    clip.duration = 1.5;
    clip.text = Some("Hi".to_string());
    state.tracks[1].clips.push(clip);
    state.selected_clip_id = Some("c".to_string());
    assert_eq!(flat_to_state(&state_to_flat(&state)), state);
}

#[test]
fn document_io_round_trips_through_writer() {
    let doc = ensure_schema_v2(&json!({"projectName": "IO", "outputSettings": {"bitrate": "4M"}}), "x");
    let mut buf = Vec::new();
    doc.to_writer_pretty(&mut buf).unwrap();
    let back = ProjectDocument::from_reader(buf.as_slice(), "y").unwrap();
    assert_eq!(back, doc);
    assert!(ProjectDocument::from_reader("{".as_bytes(), "y").is_err());
}
