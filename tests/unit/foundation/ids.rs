use super::*;

#[test]
fn skips_ids_already_in_use() {
    let mut ids = ClipIdGen::new();
    assert_eq!(ids.next("clip", |_| false), "clip-1");
    assert_eq!(ids.next("clip", |id| id == "clip-2"), "clip-3");
    assert_eq!(ids.next("dup", |_| false), "dup-4");
}

#[test]
fn counter_is_per_generator() {
    let mut a = ClipIdGen::new();
    let mut b = ClipIdGen::new();
    assert_eq!(a.next("video", |_| false), "video-1");
    assert_eq!(b.next("video", |_| false), "video-1");
}
