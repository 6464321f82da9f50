//! Read-only views derived from a timeline snapshot.
//!
//! Nothing here mutates the model. Payloads serialize to camelCase JSON for overlays and
//! inspection tools.

use std::collections::{BTreeMap, HashMap};

use crate::{
    collision::resolver::{CollisionReason, CollisionResolution},
    foundation::core::LayerGroup,
    frames::math::{self, FrameRange},
    timeline::model::{Clip, ClipKind, TimelineState, TimelineTransition, Track, TransitionKind},
};

/// One clip in frame coordinates.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipDiagnostic {
    /// Clip id.
    pub clip_id: String,
    /// Clip label.
    pub label: String,
    /// Clip kind.
    #[serde(rename = "type")]
    pub kind: ClipKind,
    /// Lane group.
    pub group: LayerGroup,
    /// Lane layer.
    pub layer: u32,
    /// Inclusive start frame.
    pub start_frame: i64,
    /// Exclusive end frame.
    pub end_frame: i64,
    /// Length in frames.
    pub duration_frames: i64,
    /// Start frame in seconds.
    pub start_seconds: f64,
    /// End frame in seconds.
    pub end_seconds: f64,
}

impl ClipDiagnostic {
    fn range(&self) -> FrameRange {
        math::range_from_frames(self.start_frame, self.duration_frames)
    }
}

/// Gap between two consecutive clips of a lane.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjacencyDiagnostic {
    /// Lane group.
    pub group: LayerGroup,
    /// Lane layer.
    pub layer: u32,
    /// Earlier clip.
    pub from_clip_id: String,
    /// Later clip.
    pub to_clip_id: String,
    /// `to.start - from.end` in frames.
    pub gap_frames: i64,
    /// Gap in seconds.
    pub gap_seconds: f64,
    /// Zero-frame gap.
    pub is_adjacent: bool,
    /// Positive gap.
    pub is_gap: bool,
    /// Negative gap.
    pub is_overlap: bool,
}

/// A transition window around a cut.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDiagnostic {
    /// Outgoing clip.
    pub from_clip_id: String,
    /// Incoming clip.
    pub to_clip_id: String,
    /// Transition name.
    pub name: String,
    /// Window length in frames.
    pub duration_frames: i64,
    /// Window length in seconds.
    pub duration_seconds: f64,
    /// First frame of the window.
    pub start_frame: i64,
    /// Frame after the window.
    pub end_frame: i64,
    /// The two clips touch exactly.
    pub valid_adjacency: bool,
}

/// Outcome of an in-progress drag.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragDiagnostic {
    /// Dragged clip.
    pub clip_id: String,
    /// Frame under the pointer.
    pub desired_start_frame: i64,
    /// Frame the resolver picked.
    pub resolved_start_frame: i64,
    /// Resolved layer.
    pub layer: u32,
    /// Resolved group.
    pub group: LayerGroup,
    /// Resolver classification.
    pub reason: CollisionReason,
    /// Edge the drag snapped onto.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_target_frame: Option<i64>,
}

impl DragDiagnostic {
    /// Describe `resolution` of a drag of `clip_id` towards `desired_start_frame`.
    pub fn from_resolution(
        clip_id: impl Into<String>,
        desired_start_frame: i64,
        resolution: &CollisionResolution,
    ) -> Self {
        Self {
            clip_id: clip_id.into(),
            desired_start_frame,
            resolved_start_frame: resolution.start_frame,
            layer: resolution.layer,
            group: resolution.group,
            reason: resolution.reason,
            snap_target_frame: resolution.snap_target.as_ref().map(|s| s.frame),
        }
    }
}

/// Draft geometry that replaces a clip's committed start and duration.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryOverride {
    /// Start in seconds.
    pub start_time: f64,
    /// Duration in seconds.
    pub duration: f64,
}

/// Frame-level report of a timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDiagnostics {
    /// Frame rate used.
    pub fps: f64,
    /// Clips ordered by group, layer, start and id.
    pub clips: Vec<ClipDiagnostic>,
    /// Consecutive pairs per lane.
    pub adjacency: Vec<AdjacencyDiagnostic>,
    /// Transitions between consecutive pairs.
    pub transitions: Vec<TransitionDiagnostic>,
    /// Drag in progress.
    pub drag: Option<DragDiagnostic>,
}

fn transition_window(cut_frame: i64, duration_frames: i64) -> (i64, i64) {
    let start = (cut_frame - duration_frames / 2).max(0);
    (start, start + duration_frames)
}

/// Effect transition of `clip` into `to_id`: `(name, seconds)`.
fn effect_transition<'a>(clip: &'a Clip, to_id: &str) -> Option<(&'a str, f64)> {
    let fx = &clip.effects;
    let name = fx.transition.as_deref().filter(|n| !n.is_empty())?;
    let with = fx.transition_with.as_deref()?;
    let seconds = fx.transition_duration.unwrap_or(0.0);
    (with == to_id && seconds > 0.0).then_some((name, seconds))
}

fn transition_name(kind: TransitionKind) -> &'static str {
    match kind {
        TransitionKind::CrossFade => "cross_fade",
        TransitionKind::HardWipe => "hard_wipe",
    }
}

/// Build the frame-level report.
///
/// `overrides` replaces the geometry of the named clips, e.g. while a drag is previewed. The
/// transition window of a pair is centered on the cut and valid only when the pair touches.
#[tracing::instrument(skip_all, fields(fps = fps))]
pub fn build_timeline_diagnostics(
    tracks: &[Track],
    fps: f64,
    overrides: Option<&HashMap<String, GeometryOverride>>,
    drag: Option<DragDiagnostic>,
) -> TimelineDiagnostics {
    let fps = math::normalize_fps(fps);
    let mut by_id: HashMap<&str, &Clip> = HashMap::new();
    let mut clips: Vec<ClipDiagnostic> = Vec::new();
    for clip in tracks.iter().flat_map(|t| t.clips.iter()) {
        by_id.insert(clip.id.as_str(), clip);
        let (start, duration) = overrides
            .and_then(|o| o.get(&clip.id))
            .map_or((clip.start_time, clip.duration), |g| (g.start_time, g.duration));
        let range = math::clip_range_frames(start, duration, fps);
        clips.push(ClipDiagnostic {
            clip_id: clip.id.clone(),
            label: clip.label.clone(),
            kind: clip.kind,
            group: clip.group(),
            layer: clip.layer.max(1),
            start_frame: range.start_frame,
            end_frame: range.end_frame,
            duration_frames: range.duration_frames,
            start_seconds: math::to_sec(range.start_frame, fps),
            end_seconds: math::to_sec(range.end_frame, fps),
        });
    }
    clips.sort_by(|a, b| {
        a.group
            .as_str()
            .cmp(b.group.as_str())
            .then(a.layer.cmp(&b.layer))
            .then(a.start_frame.cmp(&b.start_frame))
            .then_with(|| a.clip_id.cmp(&b.clip_id))
    });

    let mut lanes: BTreeMap<(&str, u32), Vec<&ClipDiagnostic>> = BTreeMap::new();
    for c in &clips {
        lanes.entry((c.group.as_str(), c.layer)).or_default().push(c);
    }

    let mut adjacency = Vec::new();
    let mut transitions = Vec::new();
    for lane in lanes.values() {
        for pair in lane.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let gap = math::gap_overlap_frames(from.range(), to.range(), fps);
            adjacency.push(AdjacencyDiagnostic {
                group: from.group,
                layer: from.layer,
                from_clip_id: from.clip_id.clone(),
                to_clip_id: to.clip_id.clone(),
                gap_frames: gap.gap_frames,
                gap_seconds: gap.gap_seconds,
                is_adjacent: gap.is_adjacent,
                is_gap: gap.is_gap,
                is_overlap: gap.is_overlap,
            });

            let Some(source) = by_id.get(from.clip_id.as_str()) else {
                continue;
            };
            let Some((name, seconds)) = effect_transition(source, &to.clip_id) else {
                continue;
            };
            let duration_frames = math::duration_seconds_to_frames(seconds, fps);
            let (start_frame, end_frame) = transition_window(to.start_frame, duration_frames);
            transitions.push(TransitionDiagnostic {
                from_clip_id: from.clip_id.clone(),
                to_clip_id: to.clip_id.clone(),
                name: name.to_string(),
                duration_frames,
                duration_seconds: math::to_sec(duration_frames, fps),
                start_frame,
                end_frame,
                valid_adjacency: gap.is_adjacent,
            });
        }
    }

    tracing::debug!(
        clips = clips.len(),
        pairs = adjacency.len(),
        transitions = transitions.len(),
        "timeline diagnostics built"
    );
    TimelineDiagnostics {
        fps,
        clips,
        adjacency,
        transitions,
        drag,
    }
}

/// Transition reported as playing, in seconds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTransitionInput {
    /// Outgoing clip.
    pub from_id: String,
    /// Incoming clip.
    pub to_id: String,
    /// Transition name.
    pub name: String,
    /// Window start in seconds.
    pub t0: f64,
    /// Window end in seconds.
    pub t1: f64,
    /// Renderer mode, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// Media time requested for one clip.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRequest {
    /// Clip id.
    pub clip_id: String,
    /// Media-local time in seconds.
    pub media_time: f64,
}

/// Host-side playback state.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaybackInput {
    /// Frame rate.
    pub fps: f64,
    /// Playback position in seconds.
    pub current_time: f64,
    /// Clips under the playhead.
    pub active_clip_ids: Vec<String>,
    /// Clips in painter's order.
    pub render_order: Vec<String>,
    /// Transition being played.
    pub active_transition: Option<ActiveTransitionInput>,
    /// Media sample requests.
    pub sample_windows: Vec<SampleRequest>,
}

/// Transition being played, in frames.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTransitionDiagnostic {
    /// Outgoing clip.
    pub from_clip_id: String,
    /// Incoming clip.
    pub to_clip_id: String,
    /// Transition name.
    pub name: String,
    /// First frame.
    pub start_frame: i64,
    /// Frame after the window.
    pub end_frame: i64,
    /// Renderer mode, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// Media sample echoed with frame numbers.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleWindow {
    /// Clip id.
    pub clip_id: String,
    /// Timeline frame of the sample.
    pub timeline_frame: i64,
    /// Media-local time in seconds.
    pub media_time: f64,
    /// Media-local frame.
    pub media_frame: i64,
}

/// Frame-level report of a playback position.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackDiagnostics {
    /// Frame rate used.
    pub fps: f64,
    /// Playback position in seconds.
    pub current_time: f64,
    /// Playback position in frames.
    pub current_frame: i64,
    /// Clips under the playhead.
    pub active_clip_ids: Vec<String>,
    /// Transition being played.
    pub active_transition: Option<ActiveTransitionDiagnostic>,
    /// Clips in painter's order.
    pub render_order: Vec<String>,
    /// Media samples.
    pub sample_windows: Vec<SampleWindow>,
}

/// Convert host playback state into frames.
#[tracing::instrument(skip_all, fields(fps = input.fps, time = input.current_time))]
pub fn build_playback_diagnostics(input: &PlaybackInput) -> PlaybackDiagnostics {
    let fps = math::normalize_fps(input.fps);
    let current_frame = math::to_frame(input.current_time, fps);
    PlaybackDiagnostics {
        fps,
        current_time: input.current_time,
        current_frame,
        active_clip_ids: input.active_clip_ids.clone(),
        active_transition: input
            .active_transition
            .as_ref()
            .map(|t| ActiveTransitionDiagnostic {
                from_clip_id: t.from_id.clone(),
                to_clip_id: t.to_id.clone(),
                name: t.name.clone(),
                start_frame: math::to_frame(t.t0, fps),
                end_frame: math::to_frame(t.t1, fps),
                mode: t.mode.clone(),
            }),
        render_order: input.render_order.clone(),
        sample_windows: input
            .sample_windows
            .iter()
            .map(|s| SampleWindow {
                clip_id: s.clip_id.clone(),
                timeline_frame: current_frame,
                media_time: s.media_time,
                media_frame: math::to_frame(s.media_time, fps),
            })
            .collect(),
    }
}

fn paint_rank(group: LayerGroup) -> u8 {
    match group {
        LayerGroup::Video => 0,
        LayerGroup::Graphics => 1,
        LayerGroup::Audio => 2,
    }
}

fn record_window(
    record: &TimelineTransition,
    state: &TimelineState,
    fps: f64,
) -> Option<ActiveTransitionInput> {
    let to = state.clip(&record.to_clip_id)?;
    state.clip(&record.from_clip_id)?;
    let duration_frames = record.duration_frames.max(1);
    let (start, end) = transition_window(to.frame_range(fps).start_frame, duration_frames);
    Some(ActiveTransitionInput {
        from_id: record.from_clip_id.clone(),
        to_id: record.to_clip_id.clone(),
        name: transition_name(record.kind).to_string(),
        t0: math::to_sec(start, fps),
        t1: math::to_sec(end, fps),
        mode: record
            .direction
            .and_then(|d| serde_json::to_value(d).ok())
            .and_then(|v| v.as_str().map(str::to_string)),
    })
}

/// Derive the playback report at `time` from the snapshot itself.
///
/// Active clips are those whose frame range holds the current frame. The render order paints
/// video before graphics, lower layers first; audio is not painted. The first transition
/// window containing the frame is reported, effect transitions before transition records.
pub fn playback_at(
    state: &TimelineState,
    fps: f64,
    time: f64,
    samples: &[SampleRequest],
) -> PlaybackDiagnostics {
    let fps = math::normalize_fps(fps);
    let frame = math::to_frame(time, fps);

    let mut active: Vec<&Clip> = state
        .clips()
        .filter(|c| c.frame_range(fps).contains(frame))
        .collect();
    active.sort_by(|a, b| {
        paint_rank(a.group())
            .cmp(&paint_rank(b.group()))
            .then(a.layer.cmp(&b.layer))
            .then(a.start_time.total_cmp(&b.start_time))
            .then_with(|| a.id.cmp(&b.id))
    });

    let contains = |t: &ActiveTransitionInput| {
        let (s, e) = (math::to_frame(t.t0, fps), math::to_frame(t.t1, fps));
        s <= frame && frame < e
    };
    let from_effects = state.clips().find_map(|from| {
        let to_id = from.effects.transition_with.as_deref()?;
        let (name, seconds) = effect_transition(from, to_id)?;
        let to = state.clip(to_id)?;
        let duration_frames = math::duration_seconds_to_frames(seconds, fps);
        let (start, end) = transition_window(to.frame_range(fps).start_frame, duration_frames);
        let t = ActiveTransitionInput {
            from_id: from.id.clone(),
            to_id: to.id.clone(),
            name: name.to_string(),
            t0: math::to_sec(start, fps),
            t1: math::to_sec(end, fps),
            mode: None,
        };
        contains(&t).then_some(t)
    });
    let active_transition = from_effects.or_else(|| {
        state
            .transitions
            .iter()
            .filter_map(|r| record_window(r, state, fps))
            .find(|t| contains(t))
    });

    let input = PlaybackInput {
        fps,
        current_time: time,
        active_clip_ids: active.iter().map(|c| c.id.clone()).collect(),
        render_order: active
            .iter()
            .filter(|c| c.group().is_visual())
            .map(|c| c.id.clone())
            .collect(),
        active_transition,
        sample_windows: samples.to_vec(),
    };
    build_playback_diagnostics(&input)
}

#[cfg(test)]
#[path = "../../tests/unit/diagnostics/projection.rs"]
mod tests;
