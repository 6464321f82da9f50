//! Engine configuration.
//!
//! [`EngineConfig`] carries the frame rate, duration floor, history depth and view bounds. It is
//! read from JSON with every field optional and checked with [`EngineConfig::validate`].

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{CliptrackError, CliptrackResult};

/// Engine-wide tunables.
///
/// Every field has a default, so a partial JSON object (or `{}`) is a valid config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Project frame rate used for frame snapping and collision checks.
    pub fps: f64,
    /// Minimum clip duration in seconds.
    pub min_duration: f64,
    /// Maximum depth of the undo and redo stacks.
    pub history_depth: usize,
    /// Duration in seconds given to added clips that do not specify one.
    pub default_clip_duration: f64,
    /// Lower bound for the timeline zoom factor.
    pub zoom_min: f64,
    /// Upper bound for the timeline zoom factor.
    pub zoom_max: f64,
    /// Drag snapping radius in frames; `0` disables snapping.
    pub snap_threshold_frames: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fps: crate::frames::math::DEFAULT_FPS,
            min_duration: 0.1,
            history_depth: crate::history::engine::DEFAULT_HISTORY_DEPTH,
            default_clip_duration: 3.0,
            zoom_min: 0.1,
            zoom_max: 4.0,
            snap_threshold_frames: 0,
        }
    }
}

impl EngineConfig {
    /// Validate config invariants.
    pub fn validate(&self) -> CliptrackResult<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(CliptrackError::config("fps must be finite and > 0"));
        }
        if !self.min_duration.is_finite() || self.min_duration <= 0.0 {
            return Err(CliptrackError::config("minDuration must be finite and > 0"));
        }
        if self.history_depth == 0 {
            return Err(CliptrackError::config("historyDepth must be > 0"));
        }
        if !self.default_clip_duration.is_finite() || self.default_clip_duration < self.min_duration
        {
            return Err(CliptrackError::config(
                "defaultClipDuration must be finite and >= minDuration",
            ));
        }
        if !self.zoom_min.is_finite()
            || !self.zoom_max.is_finite()
            || self.zoom_min <= 0.0
            || self.zoom_min > self.zoom_max
        {
            return Err(CliptrackError::config(
                "zoom bounds must be finite with 0 < zoomMin <= zoomMax",
            ));
        }
        Ok(())
    }

    /// Parse and validate a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CliptrackResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| CliptrackError::config(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CliptrackResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CliptrackError::config(format!("open engine config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Smallest whole number of frames whose length is at least `min_duration`.
    pub fn min_duration_frames(&self) -> i64 {
        let fps = crate::frames::math::normalize_fps(self.fps);
        ((self.min_duration * fps) - 1e-9).ceil().max(1.0) as i64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
