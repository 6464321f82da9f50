use super::*;

#[test]
fn defaults_validate() {
    let cfg = EngineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.history_depth, 240);
    assert_eq!(cfg.fps, 30.0);
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = EngineConfig::from_reader(r#"{"fps": 24, "snapThresholdFrames": 4}"#.as_bytes())
        .unwrap();
    assert_eq!(cfg.fps, 24.0);
    assert_eq!(cfg.snap_threshold_frames, 4);
    assert_eq!(cfg.min_duration, 0.1);
}

#[test]
fn invalid_values_are_rejected() {
    let err = EngineConfig::from_reader(r#"{"fps": 0}"#.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("config error:"));

    let cfg = EngineConfig {
        zoom_min: 5.0,
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = EngineConfig {
        history_depth: 0,
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn min_duration_frames_rounds_up() {
    assert_eq!(EngineConfig::default().min_duration_frames(), 3);
    let cfg = EngineConfig {
        fps: 24.0,
        ..EngineConfig::default()
    };
    assert_eq!(cfg.min_duration_frames(), 3);
    let cfg = EngineConfig {
        fps: 60.0,
        ..EngineConfig::default()
    };
    assert_eq!(cfg.min_duration_frames(), 6);
}
