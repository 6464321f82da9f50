use super::*;
use crate::collision::resolver::CollisionReason;
use crate::timeline::patch::EffectsPatch;

fn editor() -> TimelineEditor {
    TimelineEditor::default()
}

fn add(ed: &mut TimelineEditor, track: TrackType, start: f64, duration: f64) -> Clip {
    ed.add_clip(track, ClipPatch::timing(start, duration)).unwrap()
}

fn assert_undo_symmetry(ed: &mut TimelineEditor, verb: impl FnOnce(&mut TimelineEditor)) {
    let before = ed.export_state();
    verb(ed);
    let after = ed.export_state();
    assert_ne!(before, after, "verb did not change the state");
    assert!(ed.undo());
    assert_eq!(ed.export_state(), before);
    assert!(ed.redo());
    assert_eq!(ed.export_state(), after);
}

#[test]
fn add_clip_fills_defaults_and_selects() {
    let mut ed = editor();
    ed.set_playhead(0.0);
    let clip = ed.add_clip(TrackType::Video, ClipPatch::default()).unwrap();
    assert_eq!(clip.kind, ClipKind::Video);
    assert_eq!(clip.duration, 3.0);
    assert_eq!(clip.layer, 1);
    assert_eq!(clip.crop, Some(CropRect::FULL));
    assert_eq!(clip.effects.speed, 1.0);
    assert_eq!(ed.state().selected_clip_id.as_deref(), Some(clip.id.as_str()));

    let shape = ed.add_clip(TrackType::Graphics, ClipPatch::default()).unwrap();
    assert_eq!(shape.kind, ClipKind::Shape);
    assert_eq!(shape.group(), LayerGroup::Graphics);
}

#[test]
fn add_clip_rejects_missing_track() {
    let mut ed = editor();
    assert!(ed.add_clip(TrackType::Layer, ClipPatch::default()).is_none());
    assert!(!ed.can_undo());
}

#[test]
fn add_clip_picks_next_free_layer() {
    let mut ed = editor();
    let a = add(&mut ed, TrackType::Video, 0.0, 2.0);
    let b = add(&mut ed, TrackType::Video, 1.0, 2.0);
    let c = add(&mut ed, TrackType::Video, 2.0, 2.0);
    assert_eq!(a.layer, 1);
    assert_eq!(b.layer, 2);
    assert_eq!(c.layer, 1);
    assert_eq!(c.start_time, 2.0);
}

#[test]
fn add_clip_on_fixed_layer_is_pushed_clear() {
    let mut ed = editor();
    add(&mut ed, TrackType::Video, 0.0, 2.0);
    let patch = ClipPatch {
        layer: Some(1),
        ..ClipPatch::timing(1.0, 1.0)
    };
    let clip = ed.add_clip(TrackType::Video, patch).unwrap();
    assert_eq!(clip.layer, 1);
    assert_eq!(clip.start_time, 2.0);
}

#[test]
fn explicit_ids_are_kept_unless_taken() {
    let mut ed = editor();
    let patch = ClipPatch {
        id: Some("mine".to_string()),
        ..ClipPatch::default()
    };
    assert_eq!(ed.add_clip(TrackType::Audio, patch.clone()).unwrap().id, "mine");
    assert_ne!(ed.add_clip(TrackType::Audio, patch).unwrap().id, "mine");
}

#[test]
fn remove_layer_clips_is_one_undo_step() {
    let mut ed = editor();
    add(&mut ed, TrackType::Video, 0.0, 2.0);
    add(&mut ed, TrackType::Video, 2.0, 2.0);
    let before = ed.export_state();

    assert_eq!(ed.remove_layer_clips(LayerGroup::Video, 1), 2);
    assert_eq!(ed.clips().count(), 0);
    assert!(ed.state().selected_clip_id.is_none());

    assert!(ed.undo());
    assert_eq!(ed.export_state(), before);
    assert_eq!(ed.remove_layer_clips(LayerGroup::Audio, 3), 0);
}

#[test]
fn split_then_undo_restores_original() {
    let mut ed = editor();
    let clip = add(&mut ed, TrackType::Video, 0.0, 6.0);
    let original = ed.clip(&clip.id).unwrap().clone();

    assert!(ed.split_selected_clip(Some(3.0)));
    let left = ed.clip(&clip.id).unwrap().clone();
    let right = ed.selected_clip().unwrap().clone();
    assert_ne!(right.id, clip.id);
    assert_eq!(left.duration, 3.0);
    assert_eq!(right.duration, 3.0);
    assert_eq!(right.start_time, 3.0);
    assert_eq!(left.trim_start, Some(0.0));
    assert_eq!(left.trim_end, Some(3.0));
    assert_eq!(right.trim_start, Some(3.0));
    assert_eq!(right.trim_end, Some(6.0));
    assert_eq!(left.label, "Clip (1)");
    assert_eq!(right.label, "Clip (2)");

    assert!(ed.undo());
    assert_eq!(ed.clips().count(), 1);
    assert_eq!(ed.clip(&clip.id), Some(&original));
}

#[test]
fn split_requires_margin_on_both_sides() {
    let mut ed = editor();
    add(&mut ed, TrackType::Video, 0.0, 1.0);
    assert!(!ed.split_selected_clip(Some(0.05)));
    assert!(!ed.split_selected_clip(Some(0.95)));
    assert!(!ed.split_selected_clip(Some(2.0)));
    assert!(ed.split_selected_clip(Some(0.1)));
}

#[test]
fn split_divides_trim_window_in_proportion() {
    let mut ed = editor();
    let patch = ClipPatch {
        trim_start: Some(Some(10.0)),
        trim_end: Some(Some(14.0)),
        ..ClipPatch::timing(0.0, 2.0)
    };
    ed.add_clip(TrackType::Video, patch).unwrap();
    assert!(ed.split_selected_clip(Some(0.5)));
    let right = ed.selected_clip().unwrap();
    assert_eq!(right.trim_start, Some(11.0));
    assert_eq!(right.trim_end, Some(14.0));
}

#[test]
fn duplicate_slides_past_neighbours() {
    let mut ed = editor();
    let first = add(&mut ed, TrackType::Video, 0.0, 2.0);
    let blocker = ed
        .add_clip(
            TrackType::Video,
            ClipPatch {
                layer: Some(1),
                ..ClipPatch::timing(2.0, 1.0)
            },
        )
        .unwrap();
    assert_eq!(blocker.layer, 1);
    ed.select_clip(Some(&first.id));

    let dup = ed.duplicate_selected_clip().unwrap();
    assert_eq!(dup.layer, 1);
    assert_eq!(dup.start_time, 3.0);
    assert_eq!(dup.duration, 2.0);
    assert_eq!(ed.selected_clip().map(|c| c.id.as_str()), Some(dup.id.as_str()));
}

#[test]
fn duplicate_strips_transition() {
    let mut ed = editor();
    let patch = ClipPatch {
        effects: Some(EffectsPatch {
            transition: Some(Some("cross_fade".to_string())),
            transition_duration: Some(Some(0.5)),
            transition_with: Some(Some("x".to_string())),
            ..EffectsPatch::default()
        }),
        ..ClipPatch::timing(0.0, 1.0)
    };
    let original = ed.add_clip(TrackType::Video, patch).unwrap();
    assert!(original.effects.transition.is_some());
    let dup = ed.duplicate_selected_clip().unwrap();
    assert!(dup.effects.transition.is_none());
    assert!(dup.effects.transition_with.is_none());
}

#[test]
fn update_clip_merges_and_resolves_collisions() {
    let mut ed = editor();
    let a = add(&mut ed, TrackType::Video, 0.0, 2.0);
    let b = add(&mut ed, TrackType::Video, 4.0, 2.0);
    assert_eq!(b.layer, 1);

    assert!(ed.update_clip(&b.id, &ClipPatch::start_at(1.5), UpdateOptions::default()));
    assert_eq!(ed.clip(&b.id).unwrap().start_time, 2.0);
    assert!(!ed.update_clip("missing", &ClipPatch::default(), UpdateOptions::default()));

    let fx = ClipPatch {
        effects: Some(EffectsPatch {
            transition_duration: Some(Some(1.0)),
            ..EffectsPatch::default()
        }),
        ..ClipPatch::default()
    };
    assert!(ed.update_clip(&a.id, &fx, UpdateOptions::default()));
    assert!(ed.clip(&a.id).unwrap().effects.transition_duration.is_none());
}

#[test]
fn unrecorded_updates_skip_history() {
    let mut ed = editor();
    let a = add(&mut ed, TrackType::Audio, 0.0, 2.0);
    let depth_before = ed.undo_label().map(str::to_string);
    let opts = UpdateOptions {
        record_history: false,
    };
    assert!(ed.update_clip(&a.id, &ClipPatch::start_at(5.0), opts));
    assert_eq!(ed.clip(&a.id).unwrap().start_time, 5.0);
    assert_eq!(ed.undo_label().map(str::to_string), depth_before);
}

#[test]
fn redo_refuses_a_slot_taken_by_an_unrecorded_move() {
    let mut ed = editor();
    let a = add(&mut ed, TrackType::Video, 10.0, 3.0);
    let b = add(&mut ed, TrackType::Video, 0.0, 3.0);
    assert_eq!((a.layer, b.layer), (1, 1));
    let quiet = UpdateOptions {
        record_history: false,
    };

    assert!(ed.update_clip(&b.id, &ClipPatch::start_at(4.0), UpdateOptions::default()));
    assert!(ed.undo());
    assert_eq!(ed.clip(&b.id).unwrap().start_time, 0.0);

    assert!(ed.update_clip(&a.id, &ClipPatch::start_at(4.0), quiet));
    assert_eq!(ed.clip(&a.id).unwrap().start_time, 4.0);
    let blocked = ed.export_state();
    assert!(!ed.redo());
    assert_eq!(ed.export_state(), blocked);
    assert!(ed.can_redo());
    assert_eq!(ed.redo_label(), Some("update clip"));

    assert!(ed.update_clip(&a.id, &ClipPatch::start_at(10.0), quiet));
    assert!(ed.redo());
    assert_eq!(ed.clip(&b.id).unwrap().start_time, 4.0);
}

#[test]
fn undo_refuses_a_slot_taken_by_an_unrecorded_move() {
    let mut ed = editor();
    let a = add(&mut ed, TrackType::Video, 10.0, 3.0);
    let b = add(&mut ed, TrackType::Video, 0.0, 3.0);
    let quiet = UpdateOptions {
        record_history: false,
    };

    assert!(ed.update_clip(&b.id, &ClipPatch::start_at(4.0), UpdateOptions::default()));
    assert!(ed.update_clip(&a.id, &ClipPatch::start_at(0.0), quiet));
    let blocked = ed.export_state();
    assert!(!ed.undo());
    assert_eq!(ed.export_state(), blocked);
    assert_eq!(ed.undo_label(), Some("update clip"));
}

#[test]
fn changing_group_moves_the_clip_between_tracks() {
    let mut ed = editor();
    let clip = add(&mut ed, TrackType::Video, 0.0, 2.0);
    let video = ed.state().track_index(TrackType::Video).unwrap();
    let audio = ed.state().track_index(TrackType::Audio).unwrap();
    let patch = ClipPatch {
        layer_group: Some(LayerGroup::Audio),
        ..ClipPatch::default()
    };

    assert!(ed.update_clip(&clip.id, &patch, UpdateOptions::default()));
    assert_eq!(ed.state().find_clip(&clip.id).map(|(t, _)| t), Some(audio));
    assert_eq!(ed.clip(&clip.id).unwrap().group(), LayerGroup::Audio);

    assert!(ed.undo());
    assert_eq!(ed.state().find_clip(&clip.id).map(|(t, _)| t), Some(video));
    assert_eq!(ed.clip(&clip.id).unwrap().group(), LayerGroup::Video);

    assert!(ed.redo());
    assert_eq!(ed.state().find_clip(&clip.id).map(|(t, _)| t), Some(audio));
}

#[test]
fn huge_times_are_clamped_to_the_timeline_limit() {
    let mut ed = editor();
    let clip = ed
        .add_clip(TrackType::Video, ClipPatch::timing(1e300, 2.0))
        .unwrap();
    assert_eq!(clip.start_time, crate::frames::math::MAX_TIMELINE_SECONDS);
    assert_eq!(clip.duration, 2.0);

    let long = ed
        .add_clip(TrackType::Audio, ClipPatch::timing(0.0, 1e300))
        .unwrap();
    assert_eq!(long.duration, crate::frames::math::MAX_TIMELINE_SECONDS);

    assert!(ed.trim_clip(&clip.id, TrimEdge::End, 1e300));
    assert!(ed.trim_clip(&clip.id, TrimEdge::Start, 1e300));
    assert!(ed.update_clip(&clip.id, &ClipPatch::start_at(f64::MAX), UpdateOptions::default()));
    let clip = ed.clip(&clip.id).unwrap();
    assert_eq!(clip.start_time, crate::frames::math::MAX_TIMELINE_SECONDS);
    assert!(clip.duration > 0.0);
}

#[test]
fn trim_is_rejected_when_blocked() {
    let mut ed = editor();
    let a = add(&mut ed, TrackType::Video, 0.0, 2.0);
    let b = ed
        .add_clip(
            TrackType::Video,
            ClipPatch {
                layer: Some(1),
                ..ClipPatch::timing(3.0, 2.0)
            },
        )
        .unwrap();

    assert!(!ed.trim_clip(&a.id, TrimEdge::End, 4.0));
    assert!(!ed.trim_clip(&b.id, TrimEdge::Start, 1.0));
    assert!(ed.trim_clip(&a.id, TrimEdge::End, 3.0));
    assert_eq!(ed.clip(&a.id).unwrap().duration, 3.0);

    assert!(ed.trim_clip(&b.id, TrimEdge::Start, 3.5));
    let trimmed = ed.clip(&b.id).unwrap();
    assert_eq!(trimmed.start_time, 3.5);
    assert_eq!(trimmed.duration, 1.5);
    assert_eq!(trimmed.trim_start, Some(0.5));
}

#[test]
fn paste_moves_to_another_layer_when_slot_is_taken() {
    let mut ed = editor();
    add(&mut ed, TrackType::Video, 0.0, 2.0);
    assert!(ed.copy_selected_clip());
    let pasted = ed.paste_clip(Some(0.5)).unwrap();
    assert_eq!(pasted.layer, 2);
    assert_eq!(pasted.start_time, 0.5);

    let free = ed.paste_clip(Some(10.0)).unwrap();
    assert_eq!(free.layer, 1);
    assert_eq!(free.start_time, 10.0);
}

#[test]
fn paste_without_clipboard_is_none() {
    let mut ed = editor();
    assert!(!ed.copy_selected_clip());
    assert!(ed.paste_clip(None).is_none());
}

#[test]
fn preview_move_commits_nothing() {
    let mut ed = editor();
    add(&mut ed, TrackType::Video, 0.0, 2.0);
    let b = add(&mut ed, TrackType::Video, 4.0, 1.0);
    let before = ed.export_state();
    let res = ed.preview_move(&b.id, 1.0, Some(1)).unwrap();
    assert_eq!(res.start_frame, 60);
    assert_eq!(res.reason, CollisionReason::ClampedPrev);
    assert_eq!(ed.export_state(), before);
}

#[test]
fn every_recorded_verb_is_symmetric() {
    let mut ed = editor();
    assert_undo_symmetry(&mut ed, |ed| {
        add(ed, TrackType::Video, 0.0, 4.0);
    });
    let id = ed.selected_clip().unwrap().id.clone();
    assert_undo_symmetry(&mut ed, |ed| {
        ed.update_clip(&id, &ClipPatch::start_at(1.0), UpdateOptions::default());
    });
    assert_undo_symmetry(&mut ed, |ed| {
        ed.trim_clip(&id, TrimEdge::End, 2.0);
    });
    assert_undo_symmetry(&mut ed, |ed| {
        ed.duplicate_selected_clip();
    });
    assert_undo_symmetry(&mut ed, |ed| {
        ed.split_selected_clip(Some(2.5));
    });
    assert_undo_symmetry(&mut ed, |ed| {
        ed.copy_selected_clip();
        ed.paste_clip(Some(0.0));
    });
    assert_undo_symmetry(&mut ed, |ed| {
        ed.remove_selected_clip();
    });
    assert_undo_symmetry(&mut ed, |ed| {
        ed.remove_layer_clips(LayerGroup::Video, 1);
    });
    assert_undo_symmetry(&mut ed, |ed| {
        ed.set_source_video_clip(SourceVideo {
            source_id: "src-1".to_string(),
            label: "Intro".to_string(),
            duration: 12.0,
            ..SourceVideo::default()
        });
    });
}

#[test]
fn source_video_replaces_document() {
    let mut ed = editor();
    add(&mut ed, TrackType::Graphics, 0.0, 2.0);
    let video = ed.set_source_video_clip(SourceVideo {
        source_id: "src".to_string(),
        duration: f64::NAN,
        ..SourceVideo::default()
    });
    assert_eq!(video.label, "Video clip");
    assert_eq!(video.duration, 1.0);
    assert_eq!(video.aspect_ratio.as_deref(), Some("16:9"));
    assert_eq!(ed.clips().count(), 2);
    assert_eq!(ed.selected_clip().map(|c| c.id.as_str()), Some(video.id.as_str()));
    let audio = ed.clips().find(|c| c.kind == ClipKind::Audio).unwrap();
    assert_eq!(audio.source_id.as_deref(), Some("src"));
}

#[test]
fn view_state_is_clamped() {
    let mut ed = editor();
    assert_eq!(ed.set_playhead(5.0), 0.1);
    add(&mut ed, TrackType::Video, 0.0, 2.0);
    assert_eq!(ed.set_playhead(-1.0), 0.0);
    assert_eq!(ed.set_playhead(1.0), 1.0);
    assert_eq!(ed.set_playhead(f64::NAN), 0.0);
    assert_eq!(ed.set_timeline_zoom(10.0), 4.0);
    assert_eq!(ed.set_timeline_zoom(0.0), 0.1);
    assert_eq!(ed.set_timeline_zoom(f64::INFINITY), 0.1);
    ed.set_project_name("   ");
    assert_eq!(ed.state().project_name, UNTITLED_PROJECT);
    ed.set_project_name(" Trailer ");
    assert_eq!(ed.state().project_name, "Trailer");
    assert!(!ed.select_clip(Some("nope")));
    assert!(ed.select_clip(None));
}

#[test]
fn load_state_repairs_overlaps_and_duplicate_ids() {
    let mut state = TimelineState::default();
    let mut a = Clip::new("a", ClipKind::Video);
    a.duration = 2.0;
    let mut b = Clip::new("a", ClipKind::Video);
    b.start_time = 1.0;
    b.duration = 2.0;
    state.tracks[0].clips = vec![a, b];
    state.selected_clip_id = Some("ghost".to_string());
    state.timeline_zoom = 99.0;

    let ed = TimelineEditor::with_state(EngineConfig::default(), state);
    let clips: Vec<&Clip> = ed.clips().collect();
    assert_eq!(clips.len(), 2);
    assert_ne!(clips[0].id, clips[1].id);
    assert_eq!(clips[1].start_time, 2.0);
    assert!(ed.state().selected_clip_id.is_none());
    assert_eq!(ed.state().timeline_zoom, 4.0);
    assert!(!ed.can_undo());
}

#[test]
fn reset_keeps_name_and_clears_history() {
    let mut ed = editor();
    ed.set_project_name("Keep");
    add(&mut ed, TrackType::Video, 0.0, 2.0);
    ed.reset_state();
    assert_eq!(ed.state().project_name, "Keep");
    assert_eq!(ed.clips().count(), 0);
    assert!(!ed.can_undo());
}

#[test]
fn flat_round_trip_through_editor() {
    let mut ed = editor();
    add(&mut ed, TrackType::Video, 0.0, 2.0);
    add(&mut ed, TrackType::Audio, 1.0, 2.0);
    let flat = ed.export_flat();
    let mut other = editor();
    other.load_flat(&flat);
    assert_eq!(other.export_state(), ed.export_state());
}
