//! Seconds/frames conversion.
//!
//! Frames are the canonical integer coordinate for placement and adjacency. Every conversion in
//! the engine goes through this module so that rounding is applied in exactly one way:
//! `frame = round(seconds * fps)`.

use crate::foundation::error::{CliptrackError, CliptrackResult};

/// Frame rate used when a caller supplies a missing, non-finite or non-positive one.
pub const DEFAULT_FPS: f64 = 30.0;

/// Longest timeline position accepted for a clip start or duration, in seconds (24 hours).
///
/// Clips are clamped to it on normalization so frame arithmetic stays far from `i64` limits.
pub const MAX_TIMELINE_SECONDS: f64 = 24.0 * 60.0 * 60.0;

/// Return `fps` when it is finite and positive, else [`DEFAULT_FPS`].
pub fn normalize_fps(fps: f64) -> f64 {
    if fps.is_finite() && fps > 0.0 {
        fps
    } else {
        DEFAULT_FPS
    }
}

/// Convert seconds to the nearest frame. Non-finite input maps to frame `0`.
pub fn to_frame(seconds: f64, fps: f64) -> i64 {
    let fps = normalize_fps(fps);
    if !seconds.is_finite() {
        return 0;
    }
    (seconds * fps).round() as i64
}

/// Convert a frame to seconds.
pub fn to_sec(frame: i64, fps: f64) -> f64 {
    frame as f64 / normalize_fps(fps)
}

/// Round `seconds` onto the frame grid.
pub fn snap_seconds(seconds: f64, fps: f64) -> f64 {
    to_sec(to_frame(seconds, fps), fps)
}

/// Convert a duration to frames, never less than one frame.
pub fn duration_seconds_to_frames(duration_seconds: f64, fps: f64) -> i64 {
    to_frame(duration_seconds, fps).max(1)
}

/// Convert a frame count to seconds, never less than one frame.
pub fn duration_frames_to_seconds(duration_frames: i64, fps: f64) -> f64 {
    to_sec(duration_frames.max(1), fps)
}

/// End-exclusive frame range `[start_frame, end_frame)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct FrameRange {
    /// Inclusive start frame.
    pub start_frame: i64,
    /// Exclusive end frame.
    pub end_frame: i64,
    /// `end_frame - start_frame`.
    pub duration_frames: i64,
}

impl FrameRange {
    /// Create a validated range with `0 <= start < end`.
    pub fn new(start_frame: i64, end_frame: i64) -> CliptrackResult<Self> {
        if start_frame < 0 {
            return Err(CliptrackError::validation("FrameRange start must be >= 0"));
        }
        if end_frame <= start_frame {
            return Err(CliptrackError::validation("FrameRange end must be > start"));
        }
        Ok(Self {
            start_frame,
            end_frame,
            duration_frames: end_frame - start_frame,
        })
    }

    /// Return `true` when `frame` is inside `[start, end)`.
    pub fn contains(self, frame: i64) -> bool {
        self.start_frame <= frame && frame < self.end_frame
    }

    /// Return `true` when the two ranges share at least one frame.
    pub fn overlaps(self, other: FrameRange) -> bool {
        self.start_frame < other.end_frame && other.start_frame < self.end_frame
    }

    /// Shift both bounds by `delta` frames, clamping the start at `0`.
    pub fn shift(self, delta: i64) -> Self {
        range_from_frames(self.start_frame.saturating_add(delta), self.duration_frames)
    }
}

/// Frame range of a clip placed at `start_seconds` lasting `duration_seconds`.
///
/// The start is clamped to `0` and the duration to at least one frame.
pub fn clip_range_frames(start_seconds: f64, duration_seconds: f64, fps: f64) -> FrameRange {
    range_from_frames(
        to_frame(start_seconds, fps),
        duration_seconds_to_frames(duration_seconds, fps),
    )
}

/// Build a range from raw frame values with the same clamping as [`clip_range_frames`].
///
/// The end saturates at `i64::MAX`; the duration is shortened to match.
pub fn range_from_frames(start_frame: i64, duration_frames: i64) -> FrameRange {
    let start_frame = start_frame.clamp(0, i64::MAX - 1);
    let end_frame = start_frame.saturating_add(duration_frames.max(1));
    FrameRange {
        start_frame,
        end_frame,
        duration_frames: end_frame - start_frame,
    }
}

/// Gap between the end of one range and the start of the next.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapOverlap {
    /// `to.start_frame - from.end_frame`; negative when the ranges overlap.
    pub gap_frames: i64,
    /// Gap expressed in seconds.
    pub gap_seconds: f64,
    /// Zero-frame gap.
    pub is_adjacent: bool,
    /// Positive gap.
    pub is_gap: bool,
    /// Negative gap.
    pub is_overlap: bool,
}

/// Frames between the end of `from` and the start of `to`.
pub fn adjacency_frames(from: FrameRange, to: FrameRange) -> i64 {
    to.start_frame - from.end_frame
}

/// Classify the gap between two ranges.
pub fn gap_overlap_frames(from: FrameRange, to: FrameRange, fps: f64) -> GapOverlap {
    let gap_frames = adjacency_frames(from, to);
    GapOverlap {
        gap_frames,
        gap_seconds: to_sec(gap_frames, fps),
        is_adjacent: gap_frames == 0,
        is_gap: gap_frames > 0,
        is_overlap: gap_frames < 0,
    }
}

/// Return `true` when `to` starts exactly where `from` ends.
pub fn is_adjacent_frames(from: FrameRange, to: FrameRange) -> bool {
    adjacency_frames(from, to) == 0
}

/// Convert a pixel offset at `px_per_second` density to a frame.
pub fn px_to_frame(px: f64, px_per_second: f64, fps: f64) -> i64 {
    if !px_per_second.is_finite() || px_per_second <= 0.0 {
        return 0;
    }
    to_frame(px / px_per_second, fps)
}

/// Convert a frame to a pixel offset at `px_per_second` density.
pub fn frame_to_px(frame: i64, px_per_second: f64, fps: f64) -> f64 {
    if !px_per_second.is_finite() || px_per_second <= 0.0 {
        return 0.0;
    }
    to_sec(frame, fps) * px_per_second
}

/// Human-readable `"<frame>f (<seconds>s)"` label.
pub fn format_frame_seconds(frame: i64, fps: f64) -> String {
    format!("{frame}f ({:.3}s)", to_sec(frame, fps))
}

#[cfg(test)]
#[path = "../../tests/unit/frames/math.rs"]
mod tests;
