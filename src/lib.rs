//! Cliptrack is a frame-accurate, layered timeline editing engine.
//!
//! Clips live on lanes identified by a layer group (video, graphics, audio) and a layer number.
//! Every edit goes through a [`TimelineEditor`], which keeps lanes free of overlap by resolving
//! placements with the collision resolver, snaps times to the frame grid and records a command
//! for undo/redo.
//!
//! - Edit a timeline with [`TimelineEditor`]
//! - Load and persist project documents with [`ProjectDocument`]
//! - Inspect frame-level state with [`build_timeline_diagnostics`] and [`playback_at`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod collision;
pub(crate) mod diagnostics;
pub(crate) mod frames;
pub(crate) mod history;
pub(crate) mod project;
pub(crate) mod timeline;

pub use crate::foundation::config::EngineConfig;
pub use crate::foundation::core::{LaneKey, LayerGroup};
pub use crate::foundation::error::{CliptrackError, CliptrackResult};
pub use crate::foundation::ids::ClipIdGen;

pub use crate::frames::math::{
    DEFAULT_FPS, FrameRange, GapOverlap, MAX_TIMELINE_SECONDS, adjacency_frames, clip_range_frames,
    duration_frames_to_seconds, duration_seconds_to_frames, format_frame_seconds, frame_to_px,
    gap_overlap_frames, is_adjacent_frames, normalize_fps, px_to_frame, range_from_frames,
    snap_seconds, to_frame, to_sec,
};

pub use crate::collision::resolver::{
    CollisionLane, CollisionOperation, CollisionRange, CollisionReason, CollisionRequest,
    CollisionResolution, SnapKind, SnapTarget, first_fit_at_or_after, has_overlap,
    resolve_collision,
};

pub use crate::history::engine::{Command, DEFAULT_HISTORY_DEPTH, History};

pub use crate::timeline::editor::{SourceVideo, TimelineEditor, TrimEdge, UpdateOptions};
pub use crate::timeline::model::{
    Clip, ClipKind, ClipLocation, CropRect, Effects, FitMode, Keyframe, MIN_CROP_EXTENT,
    Position, ShapeType, Size, Style, TimelineState, TimelineTransition, Track, TrackType,
    TransitionDirection, TransitionKind, UNTITLED_PROJECT, initial_tracks,
};
pub use crate::timeline::patch::{
    ClipPatch, CropPatch, EffectsPatch, PositionPatch, SizePatch, StylePatch,
};

pub use crate::project::codec::{
    Background, CURRENT_SCHEMA_VERSION, Canvas, FlatState, MAIN_SCENE_ID, Metadata,
    OutputSettings, ProjectDocument, ProjectSettings, Scene, TimelineViewState,
    build_persisted, build_persisted_onto, ensure_schema_v2, extract_flat_state, flat_to_state,
    merge_output_settings, state_to_flat,
};

pub use crate::diagnostics::projection::{
    ActiveTransitionDiagnostic, ActiveTransitionInput, AdjacencyDiagnostic, ClipDiagnostic,
    DragDiagnostic, GeometryOverride, PlaybackDiagnostics, PlaybackInput, SampleRequest,
    SampleWindow, TimelineDiagnostics, TransitionDiagnostic, build_playback_diagnostics,
    build_timeline_diagnostics, playback_at,
};
