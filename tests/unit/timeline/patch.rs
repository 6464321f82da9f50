use super::*;

fn base() -> Clip {
    let mut clip = Clip::new("c1", ClipKind::Video);
    clip.duration = 4.0;
    clip.source_id = Some("src".to_string());
    clip.position = Some(Position { x: 10.0, y: 20.0 });
    clip.effects.brightness = 0.5;
    clip
}

#[test]
fn nested_bags_merge_one_level_deep() {
    let patch = ClipPatch {
        effects: Some(EffectsPatch {
            contrast: Some(1.5),
            ..EffectsPatch::default()
        }),
        position: Some(PositionPatch {
            y: Some(50.0),
            ..PositionPatch::default()
        }),
        ..ClipPatch::default()
    };
    let next = patch.apply(&base());
    assert_eq!(next.effects.contrast, 1.5);
    assert_eq!(next.effects.brightness, 0.5);
    assert_eq!(next.position, Some(Position { x: 10.0, y: 50.0 }));
}

#[test]
fn missing_bags_start_from_defaults() {
    let patch = ClipPatch {
        crop: Some(CropPatch {
            width: Some(0.5),
            ..CropPatch::default()
        }),
        style: Some(StylePatch {
            shape_type: Some(ShapeType::Arrow),
            ..StylePatch::default()
        }),
        ..ClipPatch::default()
    };
    let next = patch.apply(&base());
    let crop = next.crop.unwrap();
    assert_eq!(crop.width, 0.5);
    assert_eq!(crop.height, 1.0);
    let style = next.style.unwrap();
    assert_eq!(style.shape_type, ShapeType::Arrow);
    assert_eq!(style.color, "#ffffff");
}

#[test]
fn id_is_never_patched() {
    let patch = ClipPatch {
        id: Some("other".to_string()),
        label: Some("Renamed".to_string()),
        ..ClipPatch::default()
    };
    let next = patch.apply(&base());
    assert_eq!(next.id, "c1");
    assert_eq!(next.label, "Renamed");
}

#[test]
fn null_clears_and_absent_keeps() {
    let clear: ClipPatch = serde_json::from_str(r#"{"sourceId": null}"#).unwrap();
    assert_eq!(clear.source_id, Some(None));
    assert_eq!(clear.apply(&base()).source_id, None);

    let keep: ClipPatch = serde_json::from_str(r#"{"label": "x"}"#).unwrap();
    assert_eq!(keep.source_id, None);
    assert_eq!(keep.apply(&base()).source_id.as_deref(), Some("src"));
}

#[test]
fn json_patch_parses_camel_case_fields() {
    let patch: ClipPatch = serde_json::from_str(
        r#"{"type":"text","startTime":1.5,"effects":{"fadeIn":0.25,"transition":"cross_fade"}}"#,
    )
    .unwrap();
    assert_eq!(patch.kind, Some(ClipKind::Text));
    assert_eq!(patch.start_time, Some(1.5));
    let fx = patch.effects.unwrap();
    assert_eq!(fx.fade_in, Some(0.25));
    assert_eq!(fx.transition, Some(Some("cross_fade".to_string())));
}

#[test]
fn timing_helpers() {
    let next = ClipPatch::timing(2.0, 1.0).apply(&base());
    assert_eq!((next.start_time, next.duration), (2.0, 1.0));
    assert_eq!(ClipPatch::start_at(3.0).apply(&base()).duration, 4.0);
}
