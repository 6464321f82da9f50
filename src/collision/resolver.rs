//! Conflict-free placement of a clip inside a lane.
//!
//! All coordinates are frames. The resolver never sees clips, only `[start, end)` ranges tagged
//! with an id, so it can be exercised without a timeline.

use crate::foundation::core::LayerGroup;

/// The edit that triggered a placement request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionOperation {
    /// Moving an existing clip.
    Drag,
    /// Adding a new clip.
    Insert,
    /// Pasting a clipboard clip.
    Paste,
    /// Moving the start edge of a clip.
    TrimStart,
    /// Moving the end edge of a clip.
    TrimEnd,
    /// Cutting a clip in two.
    Split,
}

impl CollisionOperation {
    /// Trim operations are pinned to their lane and must not relocate the clip.
    pub fn is_trim(self) -> bool {
        matches!(self, Self::TrimStart | Self::TrimEnd)
    }
}

/// Why the resolved start differs (or not) from the desired one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionReason {
    /// Desired start accepted verbatim.
    Ok,
    /// Pushed later because an earlier clip was in the way.
    ClampedPrev,
    /// Pulled earlier to fit before a later clip.
    ClampedNext,
    /// Placed at the desired start on another layer.
    MovedToNewLayer,
    /// No legal placement; the caller must reject the edit.
    Blocked,
}

impl CollisionReason {
    /// Stable snake_case name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::ClampedPrev => "clamped_prev",
            Self::ClampedNext => "clamped_next",
            Self::MovedToNewLayer => "moved_to_new_layer",
            Self::Blocked => "blocked",
        }
    }
}

/// An occupied range in a lane.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionRange {
    /// Clip occupying the range.
    pub clip_id: String,
    /// Inclusive start frame.
    pub start_frame: i64,
    /// Exclusive end frame.
    pub end_frame: i64,
}

impl CollisionRange {
    /// Convenience constructor.
    pub fn new(clip_id: impl Into<String>, start_frame: i64, end_frame: i64) -> Self {
        Self {
            clip_id: clip_id.into(),
            start_frame,
            end_frame,
        }
    }
}

/// A candidate lane offered for relocation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionLane {
    /// Layer group of the lane.
    pub group: LayerGroup,
    /// Layer index inside the group.
    pub layer: u32,
    /// Occupied ranges in the lane.
    pub clips: Vec<CollisionRange>,
}

/// Which neighbouring edge a dragged clip was snapped onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapKind {
    /// The dragged start met a neighbour's end.
    ClipEnd,
    /// The dragged end met a neighbour's start.
    ClipStart,
}

/// Edge a placement was snapped onto.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapTarget {
    /// Edge kind.
    pub kind: SnapKind,
    /// Neighbouring clip owning the edge.
    pub clip_id: String,
    /// Edge frame.
    pub frame: i64,
}

/// Placement request for one clip.
#[derive(Clone, Debug)]
pub struct CollisionRequest<'a> {
    /// Edit being resolved.
    pub operation: CollisionOperation,
    /// Group of the target lane.
    pub group: LayerGroup,
    /// Layer of the target lane.
    pub layer: u32,
    /// Clip being placed; its own range is ignored.
    pub clip_id: Option<&'a str>,
    /// Requested start frame.
    pub desired_start_frame: i64,
    /// Clip length in frames.
    pub duration_frames: i64,
    /// Occupied ranges of the target lane.
    pub lane_clips: &'a [CollisionRange],
    /// Allow relocation into `alternative_lanes`.
    pub allow_create_layer: bool,
    /// Other lanes that may receive the clip.
    pub alternative_lanes: &'a [CollisionLane],
    /// Snap radius in frames, `0` disables snapping.
    pub snap_threshold_frames: i64,
}

impl<'a> CollisionRequest<'a> {
    /// Request for `operation` in a single lane with relocation and snapping disabled.
    pub fn new(
        operation: CollisionOperation,
        group: LayerGroup,
        layer: u32,
        desired_start_frame: i64,
        duration_frames: i64,
        lane_clips: &'a [CollisionRange],
    ) -> Self {
        Self {
            operation,
            group,
            layer,
            clip_id: None,
            desired_start_frame,
            duration_frames,
            lane_clips,
            allow_create_layer: false,
            alternative_lanes: &[],
            snap_threshold_frames: 0,
        }
    }

    /// Ignore the range owned by `clip_id`.
    pub fn excluding(mut self, clip_id: &'a str) -> Self {
        self.clip_id = Some(clip_id);
        self
    }

    /// Allow relocation into the given lanes.
    pub fn with_alternatives(mut self, lanes: &'a [CollisionLane]) -> Self {
        self.allow_create_layer = true;
        self.alternative_lanes = lanes;
        self
    }

    /// Enable edge snapping within `threshold_frames`.
    pub fn with_snapping(mut self, threshold_frames: i64) -> Self {
        self.snap_threshold_frames = threshold_frames.max(0);
        self
    }
}

/// Outcome of a placement request.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionResolution {
    /// Resolved start frame.
    pub start_frame: i64,
    /// Resolved layer.
    pub layer: u32,
    /// Resolved group.
    pub group: LayerGroup,
    /// The resolved lane held no clips, so placing there opens a new layer.
    pub created_layer: bool,
    /// Classification of the outcome.
    pub reason: CollisionReason,
    /// Edge the desired start was snapped onto, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_target: Option<SnapTarget>,
}

struct Placement {
    start_frame: i64,
    reason: CollisionReason,
}

fn sort_ranges(ranges: &[CollisionRange], exclude: Option<&str>) -> Vec<CollisionRange> {
    let mut out: Vec<CollisionRange> = ranges
        .iter()
        .filter(|r| exclude != Some(r.clip_id.as_str()))
        .map(|r| CollisionRange {
            clip_id: r.clip_id.clone(),
            start_frame: r.start_frame.max(0),
            end_frame: r.end_frame.max(0),
        })
        .filter(|r| r.end_frame > r.start_frame)
        .collect();
    out.sort_by(|a, b| {
        a.start_frame
            .cmp(&b.start_frame)
            .then_with(|| a.clip_id.cmp(&b.clip_id))
    });
    out
}

fn find_best_placement(desired: i64, duration: i64, ranges: &[CollisionRange]) -> Placement {
    if ranges.is_empty() {
        return Placement {
            start_frame: desired,
            reason: CollisionReason::Ok,
        };
    }

    let mut candidates = Vec::with_capacity(ranges.len() + 1);
    let mut cursor = 0i64;
    for range in ranges {
        let gap_start = cursor;
        let max_start = range.start_frame - duration;
        if max_start >= gap_start {
            candidates.push(desired.clamp(gap_start, max_start));
        }
        cursor = cursor.max(range.end_frame);
    }
    // The open tail always fits.
    candidates.push(cursor.max(desired));

    let mut best = candidates[0];
    for &candidate in &candidates[1..] {
        let d = (candidate - desired).abs();
        let best_d = (best - desired).abs();
        if d < best_d || (d == best_d && candidate < best) {
            best = candidate;
        }
    }

    let reason = if best == desired {
        CollisionReason::Ok
    } else if best > desired {
        CollisionReason::ClampedPrev
    } else {
        CollisionReason::ClampedNext
    };
    Placement {
        start_frame: best,
        reason,
    }
}

fn find_snap(
    desired: i64,
    duration: i64,
    ranges: &[CollisionRange],
    threshold: i64,
) -> Option<(i64, SnapTarget)> {
    if threshold <= 0 {
        return None;
    }
    let mut best: Option<(i64, i64, SnapTarget)> = None;
    for r in ranges {
        let edges = [
            (r.end_frame, r.end_frame, SnapKind::ClipEnd),
            (r.start_frame - duration, r.start_frame, SnapKind::ClipStart),
        ];
        for (start, edge, kind) in edges {
            let d = (start - desired).abs();
            if d == 0 || d > threshold || start < 0 {
                continue;
            }
            let closer = match &best {
                Some((_, best_d, _)) => d < *best_d,
                None => true,
            };
            if closer {
                best = Some((
                    start,
                    d,
                    SnapTarget {
                        kind,
                        clip_id: r.clip_id.clone(),
                        frame: edge,
                    },
                ));
            }
        }
    }
    best.map(|(start, _, target)| (start, target))
}

/// Resolve a conflict-free placement for `req`.
///
/// Same inputs always yield the same output. Ties between equally distant candidates go to the
/// earlier start.
pub fn resolve_collision(req: &CollisionRequest<'_>) -> CollisionResolution {
    let desired = req.desired_start_frame.max(0);
    let duration = req.duration_frames.max(1);
    let ranges = sort_ranges(req.lane_clips, req.clip_id);

    let snap = if req.operation == CollisionOperation::Drag {
        find_snap(desired, duration, &ranges, req.snap_threshold_frames)
    } else {
        None
    };
    let (target, snap_target) = match snap {
        Some((start, t)) => (start, Some(t)),
        None => (desired, None),
    };

    let primary = find_best_placement(target, duration, &ranges);
    let in_lane = |p: Placement, snap_target: Option<SnapTarget>| CollisionResolution {
        start_frame: p.start_frame,
        layer: req.layer,
        group: req.group,
        created_layer: false,
        reason: p.reason,
        snap_target,
    };

    if primary.reason == CollisionReason::Ok {
        return in_lane(primary, snap_target);
    }

    if req.operation.is_trim() {
        return CollisionResolution {
            start_frame: desired,
            layer: req.layer,
            group: req.group,
            created_layer: false,
            reason: CollisionReason::Blocked,
            snap_target: None,
        };
    }

    if req.allow_create_layer && !req.alternative_lanes.is_empty() {
        let mut ordered: Vec<&CollisionLane> = req
            .alternative_lanes
            .iter()
            .filter(|lane| !(lane.group == req.group && lane.layer == req.layer))
            .collect();
        ordered.sort_by_key(|lane| (lane.layer.abs_diff(req.layer), lane.layer));

        for lane in ordered {
            let lane_ranges = sort_ranges(&lane.clips, req.clip_id);
            let placement = find_best_placement(desired, duration, &lane_ranges);
            if placement.reason != CollisionReason::Ok {
                continue;
            }
            return CollisionResolution {
                start_frame: placement.start_frame,
                layer: lane.layer,
                group: lane.group,
                created_layer: lane_ranges.is_empty(),
                reason: CollisionReason::MovedToNewLayer,
                snap_target: None,
            };
        }
    }

    in_lane(primary, snap_target)
}

/// Return `true` when `range` overlaps any range in `others` (ignoring `exclude`).
pub fn has_overlap(range: &CollisionRange, others: &[CollisionRange], exclude: Option<&str>) -> bool {
    sort_ranges(others, exclude)
        .iter()
        .any(|c| range.start_frame < c.end_frame && range.end_frame > c.start_frame)
}

/// Earliest start `>= from_frame` where `duration_frames` fits without overlap.
pub fn first_fit_at_or_after(
    from_frame: i64,
    duration_frames: i64,
    lane_clips: &[CollisionRange],
    exclude: Option<&str>,
) -> i64 {
    let duration = duration_frames.max(1);
    let mut start = from_frame.max(0);
    for r in sort_ranges(lane_clips, exclude) {
        if r.end_frame <= start {
            continue;
        }
        if start + duration <= r.start_frame {
            break;
        }
        start = start.max(r.end_frame);
    }
    start
}

#[cfg(test)]
#[path = "../../tests/unit/collision/resolver.rs"]
mod tests;
