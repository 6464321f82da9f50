use super::*;

#[test]
fn normalize_fps_falls_back_to_default() {
    assert_eq!(normalize_fps(f64::NAN), 30.0);
    assert_eq!(normalize_fps(0.0), 30.0);
    assert_eq!(normalize_fps(-24.0), 30.0);
    assert_eq!(normalize_fps(f64::INFINITY), 30.0);
    assert_eq!(normalize_fps(60.0), 60.0);
}

#[test]
fn seconds_frames_convert_both_ways() {
    let frame = to_frame(2.5, 30.0);
    assert_eq!(frame, 75);
    assert_eq!(to_sec(frame, 30.0), 2.5);
    assert_eq!(to_frame(f64::NAN, 30.0), 0);
    assert_eq!(to_frame(-0.2, 30.0), -6);
}

#[test]
fn frame_round_trip_is_exact_at_common_rates() {
    for fps in [24.0, 25.0, 30.0, 60.0] {
        for f in 0..5_000i64 {
            assert_eq!(to_frame(to_sec(f, fps), fps), f, "fps={fps} frame={f}");
        }
    }
}

#[test]
fn to_frame_is_idempotent_once_snapped() {
    for fps in [24.0, 29.97, 30.0] {
        for s in [0.0, 0.01, 1.234, 7.5, 100.049] {
            let snapped = snap_seconds(s, fps);
            assert_eq!(snap_seconds(snapped, fps), snapped);
        }
    }
}

#[test]
fn clip_ranges_are_end_exclusive_and_floored() {
    let range = clip_range_frames(1.0, 2.0, 30.0);
    assert_eq!(range.start_frame, 30);
    assert_eq!(range.duration_frames, 60);
    assert_eq!(range.end_frame, 90);
    assert!(range.contains(30));
    assert!(!range.contains(90));

    let tiny = clip_range_frames(-4.0, 0.0, 30.0);
    assert_eq!(tiny.start_frame, 0);
    assert_eq!(tiny.duration_frames, 1);
    assert_eq!(tiny.end_frame, 1);
}

#[test]
fn adjacency_and_overlap_by_frame_gap() {
    let left = clip_range_frames(0.0, 2.0, 30.0);
    let adjacent = clip_range_frames(2.0, 1.0, 30.0);
    let overlapping = clip_range_frames(1.9, 1.0, 30.0);
    let gapped = clip_range_frames(2.5, 1.0, 30.0);

    assert!(is_adjacent_frames(left, adjacent));
    assert_eq!(gap_overlap_frames(left, adjacent, 30.0).gap_frames, 0);

    let o = gap_overlap_frames(left, overlapping, 30.0);
    assert!(o.is_overlap && !o.is_gap && !o.is_adjacent);
    assert_eq!(o.gap_frames, -3);

    let g = gap_overlap_frames(left, gapped, 30.0);
    assert!(g.is_gap);
    assert_eq!(g.gap_seconds, 0.5);
}

#[test]
fn px_scale_maps_through_seconds() {
    let frame = px_to_frame(240.0, 120.0, 30.0);
    assert_eq!(frame, 60);
    assert_eq!(frame_to_px(frame, 120.0, 30.0), 240.0);
    assert_eq!(px_to_frame(240.0, 0.0, 30.0), 0);
    assert_eq!(frame_to_px(10, f64::NAN, 30.0), 0.0);
}

#[test]
fn frame_range_validation_and_shift() {
    assert!(FrameRange::new(5, 5).is_err());
    assert!(FrameRange::new(-1, 5).is_err());
    let r = FrameRange::new(10, 20).unwrap();
    assert!(r.overlaps(FrameRange::new(19, 30).unwrap()));
    assert!(!r.overlaps(FrameRange::new(20, 30).unwrap()));
    assert_eq!(r.shift(-15), range_from_frames(0, 10));
    assert_eq!(r.shift(5).end_frame, 25);
}

#[test]
fn format_includes_frames_and_seconds() {
    assert_eq!(format_frame_seconds(75, 30.0), "75f (2.500s)");
    assert_eq!(duration_frames_to_seconds(0, 30.0), to_sec(1, 30.0));
}

#[test]
fn huge_ranges_saturate_instead_of_overflowing() {
    let r = clip_range_frames(1e300, 2.0, 30.0);
    assert_eq!(r.end_frame, i64::MAX);
    assert_eq!(r.start_frame, i64::MAX - 1);
    assert_eq!(r.duration_frames, 1);

    let r = range_from_frames(i64::MAX - 10, 100);
    assert_eq!(r.end_frame, i64::MAX);
    assert_eq!(r.duration_frames, 10);
}
