//! Timeline data model.
//!
//! Clips, tracks, transition records and the editable snapshot. [`Clip::normalize`] puts a clip
//! into its committed form; lane and track queries used by the editor live on
//! [`TimelineState`].

use crate::{
    collision::resolver::{self, CollisionRange},
    foundation::config::EngineConfig,
    foundation::core::{LaneKey, LayerGroup},
    frames::math::{self, FrameRange},
};

/// Media kind of a clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipKind {
    /// Video file.
    Video,
    /// Text overlay.
    Text,
    /// Still image.
    Image,
    /// Vector shape.
    Shape,
    /// Audio file.
    Audio,
}

impl ClipKind {
    /// Layer group a clip of this kind lands in when none is given.
    pub fn default_group(self) -> LayerGroup {
        match self {
            Self::Video => LayerGroup::Video,
            Self::Audio => LayerGroup::Audio,
            Self::Text | Self::Image | Self::Shape => LayerGroup::Graphics,
        }
    }
}

/// Type of a track container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    /// Holds video clips.
    Video,
    /// Holds text, image and shape clips.
    Graphics,
    /// Holds audio clips.
    Audio,
    /// Per-layer header track; never created by the engine.
    Layer,
}

impl TrackType {
    /// Track that hosts clips of `group`.
    pub fn for_group(group: LayerGroup) -> Self {
        match group {
            LayerGroup::Video => Self::Video,
            LayerGroup::Graphics => Self::Graphics,
            LayerGroup::Audio => Self::Audio,
        }
    }

    /// Clip kind used when a clip added to this track does not name one.
    pub fn default_clip_kind(self) -> ClipKind {
        match self {
            Self::Video => ClipKind::Video,
            Self::Audio => ClipKind::Audio,
            Self::Graphics | Self::Layer => ClipKind::Shape,
        }
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Graphics => "graphics",
            Self::Audio => "audio",
            Self::Layer => "layer",
        }
    }
}

/// How a clip's media fits its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Letterbox inside the box.
    #[default]
    Fit,
    /// Cover the box, cropping overflow.
    Fill,
    /// Ignore aspect ratio.
    Stretch,
}

/// Shape drawn by a shape clip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    /// Filled square.
    #[default]
    Square,
    /// Filled circle.
    Circle,
    /// Unfilled rectangle.
    Outline,
    /// Arrow.
    Arrow,
}

/// Smallest width/height of a crop rectangle.
pub const MIN_CROP_EXTENT: f64 = 0.05;

/// Normalized crop rectangle inside `[0, 1] x [0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CropRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Default for CropRect {
    fn default() -> Self {
        Self::FULL
    }
}

impl CropRect {
    /// The whole frame.
    pub const FULL: CropRect = CropRect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    /// Clamp into the unit square keeping at least [`MIN_CROP_EXTENT`] on each axis.
    pub fn clamped(self) -> Self {
        fn finite_or(v: f64, d: f64) -> f64 {
            if v.is_finite() { v } else { d }
        }
        let x = finite_or(self.x, 0.0).clamp(0.0, 1.0 - MIN_CROP_EXTENT);
        let y = finite_or(self.y, 0.0).clamp(0.0, 1.0 - MIN_CROP_EXTENT);
        let width = finite_or(self.width, 1.0).clamp(MIN_CROP_EXTENT, 1.0 - x);
        let height = finite_or(self.height, 1.0).clamp(MIN_CROP_EXTENT, 1.0 - y);
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Position in percent of the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Position {
    /// Horizontal offset, 0..100.
    pub x: f64,
    /// Vertical offset, 0..100.
    pub y: f64,
}

/// Size in percent of the canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Size {
    /// Width, 0..100.
    pub width: f64,
    /// Height, 0..100.
    pub height: f64,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
        }
    }
}

/// Per-clip effect parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Effects {
    /// Video fade-in, seconds.
    pub fade_in: f64,
    /// Video fade-out, seconds.
    pub fade_out: f64,
    /// Transition name into the partner clip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
    /// Transition length in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_duration: Option<f64>,
    /// Id of the clip the transition leads into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_with: Option<String>,
    /// Audio fade-in, seconds.
    pub audio_fade_in: f64,
    /// Audio fade-out, seconds.
    pub audio_fade_out: f64,
    /// Playback rate multiplier.
    pub speed: f64,
    /// Named color filter preset.
    pub filter: String,
    /// Additive brightness.
    pub brightness: f64,
    /// Contrast multiplier.
    pub contrast: f64,
    /// Saturation multiplier.
    pub saturation: f64,
    /// Gamma exponent.
    pub gamma: f64,
    /// Hue rotation in degrees.
    pub hue: f64,
    /// Blur radius in pixels.
    pub blur: f64,
    /// Layer opacity in `[0, 1]`.
    pub opacity: f64,
    /// Audio gain.
    pub volume: f64,
    /// Compositing blend mode.
    pub blend_mode: String,
    /// Tint overlay color.
    pub overlay_color: String,
    /// Tint overlay opacity.
    pub overlay_opacity: f64,
    /// Tint overlay blend mode.
    pub overlay_blend: String,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            fade_in: 0.0,
            fade_out: 0.0,
            transition: None,
            transition_duration: None,
            transition_with: None,
            audio_fade_in: 0.0,
            audio_fade_out: 0.0,
            speed: 1.0,
            filter: "None".to_string(),
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
            gamma: 1.0,
            hue: 0.0,
            blur: 0.0,
            opacity: 1.0,
            volume: 1.0,
            blend_mode: "normal".to_string(),
            overlay_color: "transparent".to_string(),
            overlay_opacity: 0.0,
            overlay_blend: "soft-light".to_string(),
        }
    }
}

impl Effects {
    /// Remove the transition and its metadata.
    pub fn strip_transition(&mut self) {
        self.transition = None;
        self.transition_duration = None;
        self.transition_with = None;
    }

    /// Drop transition metadata left behind without a transition.
    pub fn sanitize(&mut self) {
        if self.transition.as_deref().is_none_or(|t| t.trim().is_empty()) {
            self.strip_transition();
        }
        if let Some(d) = self.transition_duration
            && (!d.is_finite() || d < 0.0)
        {
            self.transition_duration = None;
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            self.speed = 1.0;
        }
    }
}

/// Styling for text and shape clips.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Style {
    /// CSS color string.
    pub color: String,
    /// Draw an outline instead of a fill.
    pub outline: bool,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Shape drawn by shape clips.
    pub shape_type: ShapeType,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            outline: false,
            opacity: 1.0,
            shape_type: ShapeType::Square,
        }
    }
}

/// Time-stamped override of a clip's visual transform, relative to the clip start.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Keyframe {
    /// Seconds from the clip start.
    pub time: f64,
    /// Position override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Size override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Rotation override in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Opacity override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// An editable unit placed on a track.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    /// Stable identifier.
    #[serde(default)]
    pub id: String,
    /// Media kind.
    #[serde(rename = "type")]
    pub kind: ClipKind,
    /// Display label.
    #[serde(default = "default_label")]
    pub label: String,
    /// Timeline start in seconds.
    #[serde(default)]
    pub start_time: f64,
    /// Timeline length in seconds.
    #[serde(default)]
    pub duration: f64,
    /// 1-based layer inside the group.
    #[serde(default)]
    pub layer: u32,
    /// Group the clip's lane belongs to; inferred from `kind` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_group: Option<LayerGroup>,
    /// Media library id of the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Media location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Thumbnail location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    /// Source media offset of the clip start, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_start: Option<f64>,
    /// Source media offset of the clip end, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_end: Option<f64>,
    /// Source aspect ratio, e.g. `"16:9"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    /// Fit of the media inside its box.
    #[serde(default)]
    pub fit_mode: FitMode,
    /// Normalized crop window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
    /// Effect parameters.
    #[serde(default)]
    pub effects: Effects,
    /// Canvas position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Canvas size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Keep width and height proportional when resizing.
    #[serde(default = "default_true")]
    pub lock_aspect_ratio: bool,
    /// Body of a text clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Text and shape styling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    /// Keyframes ordered by time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<Keyframe>,
}

fn default_label() -> String {
    "Clip".to_string()
}

fn default_true() -> bool {
    true
}

impl Clip {
    /// A clip of `kind` with every optional field at its default.
    pub fn new(id: impl Into<String>, kind: ClipKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: default_label(),
            start_time: 0.0,
            duration: 0.0,
            layer: 1,
            layer_group: Some(kind.default_group()),
            source_id: None,
            source_url: None,
            poster_url: None,
            trim_start: None,
            trim_end: None,
            aspect_ratio: None,
            fit_mode: FitMode::Fit,
            crop: None,
            effects: Effects::default(),
            position: None,
            size: None,
            rotation: 0.0,
            lock_aspect_ratio: true,
            text: None,
            style: None,
            keyframes: Vec::new(),
        }
    }

    /// Explicit group, or the one implied by `kind`.
    pub fn group(&self) -> LayerGroup {
        self.layer_group.unwrap_or(self.kind.default_group())
    }

    /// Lane key of this clip.
    pub fn lane(&self) -> LaneKey {
        LaneKey::new(self.group(), self.layer)
    }

    /// Timeline end in seconds.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Frame range at `fps`.
    pub fn frame_range(&self, fps: f64) -> FrameRange {
        math::clip_range_frames(self.start_time, self.duration, fps)
    }

    /// Collision range at `fps`.
    pub fn collision_range(&self, fps: f64) -> CollisionRange {
        let r = self.frame_range(fps);
        CollisionRange::new(self.id.clone(), r.start_frame, r.end_frame)
    }

    /// Put the clip into its committed form: start and duration clamped to
    /// [`math::MAX_TIMELINE_SECONDS`] and on the frame grid with the duration at or above the floor, explicit layer group, layer `>= 1`, clean effects,
    /// clamped crop, ordered keyframes and a well-formed trim window.
    pub fn normalize(&mut self, cfg: &EngineConfig) {
        let fps = math::normalize_fps(cfg.fps);
        let start = if self.start_time.is_finite() {
            self.start_time.clamp(0.0, math::MAX_TIMELINE_SECONDS)
        } else {
            0.0
        };
        let duration = if self.duration.is_finite() {
            self.duration.min(math::MAX_TIMELINE_SECONDS)
        } else {
            cfg.min_duration
        };
        let start_frame = math::to_frame(start, fps).max(0);
        let duration_frames = math::to_frame(duration, fps).max(cfg.min_duration_frames());
        self.start_time = math::to_sec(start_frame, fps);
        self.duration = math::to_sec(duration_frames, fps);

        self.layer_group = Some(self.group());
        self.layer = self.layer.max(1);
        if self.label.trim().is_empty() {
            self.label = default_label();
        }
        self.effects.sanitize();
        self.crop = self.crop.map(CropRect::clamped);

        for kf in &mut self.keyframes {
            kf.time = if kf.time.is_finite() {
                kf.time.clamp(0.0, self.duration)
            } else {
                0.0
            };
        }
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));

        if let Some(ts) = self.trim_start {
            let ts = if ts.is_finite() { ts.max(0.0) } else { 0.0 };
            self.trim_start = Some(ts);
            if let Some(te) = self.trim_end {
                let floor = ts + cfg.min_duration;
                self.trim_end = Some(if te.is_finite() { te.max(floor) } else { floor });
            }
        }
    }
}

/// A lane container of one type.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Stable identifier.
    pub id: String,
    /// Track type.
    #[serde(rename = "type")]
    pub track_type: TrackType,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Clips ordered by start time.
    #[serde(default)]
    pub clips: Vec<Clip>,
}

impl Track {
    /// Empty track of `track_type`.
    pub fn new(track_type: TrackType) -> Self {
        let label = match track_type {
            TrackType::Video => "Video",
            TrackType::Graphics => "Graphics",
            TrackType::Audio => "Audio",
            TrackType::Layer => "Layer",
        };
        Self {
            id: format!("track-{}", track_type.as_str()),
            track_type,
            label: label.to_string(),
            clips: Vec::new(),
        }
    }

    /// Order clips by start time, then layer, then id.
    ///
    /// The order is a function of the clip set alone, so undoing an edit restores the exact
    /// previous order.
    pub fn sort_clips(&mut self) {
        self.clips.sort_by(|a, b| {
            a.start_time
                .total_cmp(&b.start_time)
                .then_with(|| a.layer.cmp(&b.layer))
                .then_with(|| a.id.cmp(&b.id))
        });
    }
}

/// Built-in transition kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Opacity cross-fade.
    CrossFade,
    /// Hard-edged wipe.
    HardWipe,
}

/// Wipe direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionDirection {
    /// Towards the left edge.
    Left,
    /// Towards the right edge.
    Right,
    /// Towards the top edge.
    Up,
    /// Towards the bottom edge.
    Down,
}

/// Project-level transition record between two clips of one lane.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineTransition {
    /// Stable identifier.
    pub id: String,
    /// Transition kind.
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    /// Outgoing clip.
    pub from_clip_id: String,
    /// Incoming clip.
    pub to_clip_id: String,
    /// Group of the shared lane.
    #[serde(default)]
    pub group: LayerGroup,
    /// Layer of the shared lane.
    #[serde(default = "default_layer")]
    pub layer: u32,
    /// Length in frames.
    pub duration_frames: i64,
    /// Wipe direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<TransitionDirection>,
}

fn default_layer() -> u32 {
    1
}

/// Fallback project name.
pub const UNTITLED_PROJECT: &str = "Untitled project";

/// The complete editable state of one project.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineState {
    /// Display name.
    pub project_name: String,
    /// Tracks in display order.
    pub tracks: Vec<Track>,
    /// Transition records.
    #[serde(default)]
    pub transitions: Vec<TimelineTransition>,
    /// Selected clip, if any.
    #[serde(default)]
    pub selected_clip_id: Option<String>,
    /// Playhead in seconds.
    #[serde(default)]
    pub playhead_time: f64,
    /// Timeline zoom factor.
    #[serde(default = "default_zoom")]
    pub timeline_zoom: f64,
}

fn default_zoom() -> f64 {
    1.0
}

impl Default for TimelineState {
    fn default() -> Self {
        Self {
            project_name: UNTITLED_PROJECT.to_string(),
            tracks: initial_tracks(),
            transitions: Vec::new(),
            selected_clip_id: None,
            playhead_time: 0.0,
            timeline_zoom: 1.0,
        }
    }
}

/// One empty track per layer group.
pub fn initial_tracks() -> Vec<Track> {
    vec![
        Track::new(TrackType::Video),
        Track::new(TrackType::Graphics),
        Track::new(TrackType::Audio),
    ]
}

/// Location of a clip: `(track index, clip index)`.
pub type ClipLocation = (usize, usize);

impl TimelineState {
    /// Iterate over every clip in track order.
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tracks.iter().flat_map(|t| t.clips.iter())
    }

    /// Locate a clip by id.
    pub fn find_clip(&self, id: &str) -> Option<ClipLocation> {
        self.tracks.iter().enumerate().find_map(|(ti, t)| {
            t.clips.iter().position(|c| c.id == id).map(|ci| (ti, ci))
        })
    }

    /// Borrow a clip by id.
    pub fn clip(&self, id: &str) -> Option<&Clip> {
        self.find_clip(id).map(|(ti, ci)| &self.tracks[ti].clips[ci])
    }

    /// Whether any clip uses `id`.
    pub fn contains_clip(&self, id: &str) -> bool {
        self.find_clip(id).is_some()
    }

    /// Index of the first track of `track_type`.
    pub fn track_index(&self, track_type: TrackType) -> Option<usize> {
        self.tracks.iter().position(|t| t.track_type == track_type)
    }

    /// End of the last clip, in seconds.
    pub fn duration(&self) -> f64 {
        self.clips().map(Clip::end_time).fold(0.0, f64::max)
    }

    /// Occupied ranges of `lane`, excluding `exclude`.
    pub fn lane_ranges(&self, lane: LaneKey, fps: f64, exclude: Option<&str>) -> Vec<CollisionRange> {
        self.clips()
            .filter(|c| c.lane() == lane && Some(c.id.as_str()) != exclude)
            .map(|c| c.collision_range(fps))
            .collect()
    }

    /// Distinct layers in use by `group`, ascending.
    pub fn layers_in_group(&self, group: LayerGroup) -> Vec<u32> {
        let mut layers: Vec<u32> = self
            .clips()
            .filter(|c| c.group() == group)
            .map(|c| c.layer)
            .collect();
        layers.sort_unstable();
        layers.dedup();
        layers
    }

    /// Insert a clip into the track at `track_idx` and restore ordering.
    pub(crate) fn insert_clip(&mut self, track_idx: usize, clip: Clip) {
        let track = &mut self.tracks[track_idx];
        track.clips.push(clip);
        track.sort_clips();
    }

    /// Remove and return a clip by id.
    pub(crate) fn take_clip(&mut self, id: &str) -> Option<(usize, Clip)> {
        let (ti, ci) = self.find_clip(id)?;
        Some((ti, self.tracks[ti].clips.remove(ci)))
    }

    /// Replace the clip with id `id` by `clip`, keeping it in its track.
    pub(crate) fn replace_clip(&mut self, id: &str, clip: Clip) -> bool {
        let Some((ti, ci)) = self.find_clip(id) else {
            return false;
        };
        let track = &mut self.tracks[ti];
        track.clips[ci] = clip;
        track.sort_clips();
        true
    }

    /// Replace the clip with id `id` by `clip` and file it under the track at `track_idx`.
    pub(crate) fn relocate_clip(&mut self, id: &str, track_idx: usize, clip: Clip) -> bool {
        if track_idx >= self.tracks.len() || self.take_clip(id).is_none() {
            return false;
        }
        self.insert_clip(track_idx, clip);
        true
    }

    /// Track for a clip in track `current` whose group changes from `from` to `to`: the same
    /// track while the group holds, else the track serving `to`.
    pub(crate) fn track_for(&self, current: usize, from: LayerGroup, to: LayerGroup) -> Option<usize> {
        if from == to {
            Some(current)
        } else {
            self.track_index(TrackType::for_group(to))
        }
    }

    /// Whether `clip` fits its lane without overlapping any clip other than itself and the ids
    /// in `ignore`.
    pub(crate) fn lane_accepts(&self, clip: &Clip, fps: f64, ignore: &[&str]) -> bool {
        let others: Vec<CollisionRange> = self
            .lane_ranges(clip.lane(), fps, Some(clip.id.as_str()))
            .into_iter()
            .filter(|r| !ignore.contains(&r.clip_id.as_str()))
            .collect();
        !resolver::has_overlap(&clip.collision_range(fps), &others, None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
