//! Shared primitives: layer groups and lane keys.

use std::fmt;

use crate::foundation::error::{CliptrackError, CliptrackResult};

/// Coarse classification used to route clips to tracks and lanes.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LayerGroup {
    /// Picture-carrying media (video clips).
    #[default]
    Video,
    /// Overlays: text, images and shapes.
    Graphics,
    /// Sound-only clips.
    Audio,
}

impl LayerGroup {
    /// All groups in painter's order (bottom first).
    pub const ALL: [LayerGroup; 3] = [LayerGroup::Video, LayerGroup::Graphics, LayerGroup::Audio];

    /// Stable lowercase name used in lane keys and documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Graphics => "graphics",
            Self::Audio => "audio",
        }
    }

    /// Whether clips of this group contribute pixels to the rendered frame.
    pub fn is_visual(self) -> bool {
        !matches!(self, Self::Audio)
    }
}

impl fmt::Display for LayerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LayerGroup {
    type Err = CliptrackError;

    fn from_str(s: &str) -> CliptrackResult<Self> {
        match s {
            "video" => Ok(Self::Video),
            "graphics" => Ok(Self::Graphics),
            "audio" => Ok(Self::Audio),
            other => Err(CliptrackError::validation(format!(
                "unknown layer group '{other}'"
            ))),
        }
    }
}

/// A lane: the `(group, layer)` pair inside which clips must not overlap.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LaneKey {
    /// Layer group of the lane.
    pub group: LayerGroup,
    /// 1-based layer index inside the group.
    pub layer: u32,
}

impl LaneKey {
    /// Create a lane key; layer `0` is lifted to `1`.
    pub fn new(group: LayerGroup, layer: u32) -> Self {
        Self {
            group,
            layer: layer.max(1),
        }
    }
}

impl fmt::Display for LaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.layer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
