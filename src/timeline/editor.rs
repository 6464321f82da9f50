//! The editing surface.
//!
//! [`TimelineEditor`] owns one [`TimelineState`] and is the only way to change it. Every verb
//! normalizes its input, places clips through the collision resolver and records a command, so
//! the committed state always satisfies the lane invariants. Verbs never fail with an error:
//! they report rejected edits as `false`, `None` or `0`.

use crate::{
    collision::resolver::{
        self, CollisionLane, CollisionOperation, CollisionReason, CollisionRequest,
        CollisionResolution,
    },
    foundation::{config::EngineConfig, core::LaneKey, core::LayerGroup, ids::ClipIdGen},
    frames::math,
    history::engine::{Command, History},
    project::codec::{self, FlatState},
    timeline::{
        commands::{DocumentContent, InsertClip, RemoveClips, ReplaceClip, ReplaceDocument, SplitClip},
        model::{Clip, ClipKind, CropRect, TimelineState, Track, TrackType, UNTITLED_PROJECT},
        patch::ClipPatch,
    },
};

/// Options for [`TimelineEditor::update_clip`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Record an undo step. High-frequency pushes (e.g. slider drags) pass `false`.
    pub record_history: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            record_history: true,
        }
    }
}

/// Which edge [`TimelineEditor::trim_clip`] moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimEdge {
    /// Move the start, keeping the end fixed.
    Start,
    /// Move the end, keeping the start fixed.
    End,
}

/// A freshly imported source for [`TimelineEditor::set_source_video_clip`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceVideo {
    /// Media library id.
    pub source_id: String,
    /// Media location.
    pub source_url: Option<String>,
    /// Thumbnail location.
    pub poster_url: Option<String>,
    /// Label of the video clip.
    pub label: String,
    /// Source length in seconds.
    pub duration: f64,
    /// Source aspect ratio; `"16:9"` when absent.
    pub aspect_ratio: Option<String>,
}

/// Timeline editing engine with command-based undo/redo.
#[derive(Debug)]
pub struct TimelineEditor {
    config: EngineConfig,
    state: TimelineState,
    history: History<TimelineState>,
    ids: ClipIdGen,
    clipboard: Option<Clip>,
}

impl Default for TimelineEditor {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TimelineEditor {
    /// Create an editor with an empty project.
    pub fn new(config: EngineConfig) -> Self {
        let history = History::new(config.history_depth);
        Self {
            config,
            state: TimelineState::default(),
            history,
            ids: ClipIdGen::new(),
            clipboard: None,
        }
    }

    /// Create an editor and load `state` into it.
    pub fn with_state(config: EngineConfig, state: TimelineState) -> Self {
        let mut editor = Self::new(config);
        editor.load_state(state);
        editor
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn fps(&self) -> f64 {
        math::normalize_fps(self.config.fps)
    }

    // ---- reads ----

    /// Borrow the current snapshot.
    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    /// Owned copy of the current snapshot.
    pub fn export_state(&self) -> TimelineState {
        self.state.clone()
    }

    /// Current snapshot in the codec's flat shape.
    pub fn export_flat(&self) -> FlatState {
        codec::state_to_flat(&self.state)
    }

    /// Every clip in track order.
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.state.clips()
    }

    /// Clip by id.
    pub fn clip(&self, id: &str) -> Option<&Clip> {
        self.state.clip(id)
    }

    /// The selected clip, if it still exists.
    pub fn selected_clip(&self) -> Option<&Clip> {
        self.state
            .selected_clip_id
            .as_deref()
            .and_then(|id| self.state.clip(id))
    }

    /// End of the last clip in seconds.
    pub fn duration(&self) -> f64 {
        self.state.duration()
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Label of the next undo step.
    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    /// Label of the next redo step.
    pub fn redo_label(&self) -> Option<&str> {
        self.history.redo_label()
    }

    // ---- history ----

    /// Revert the last recorded edit.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.state)
    }

    /// Re-apply the last reverted edit.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.state)
    }

    fn execute(&mut self, command: impl Command<TimelineState> + 'static) {
        self.history.execute(&mut self.state, Box::new(command));
    }

    // ---- unrecorded view state ----

    /// Select a clip, or clear the selection with `None`. Unknown ids are rejected.
    pub fn select_clip(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) if !self.state.contains_clip(id) => false,
            _ => {
                self.state.selected_clip_id = id.map(str::to_string);
                true
            }
        }
    }

    /// Move the playhead, clamped to `[0, max(duration, minDuration)]`. Returns the new time.
    pub fn set_playhead(&mut self, time: f64) -> f64 {
        let max = self.duration().max(self.config.min_duration);
        let t = if time.is_finite() { time.clamp(0.0, max) } else { 0.0 };
        self.state.playhead_time = t;
        t
    }

    /// Set the zoom factor, clamped to the configured bounds. Returns the new zoom.
    pub fn set_timeline_zoom(&mut self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            self.state.timeline_zoom = zoom.clamp(self.config.zoom_min, self.config.zoom_max);
        }
        self.state.timeline_zoom
    }

    /// Rename the project; blank names fall back to the default.
    pub fn set_project_name(&mut self, name: &str) {
        let name = name.trim();
        self.state.project_name = if name.is_empty() {
            UNTITLED_PROJECT.to_string()
        } else {
            name.to_string()
        };
    }

    // ---- whole-document replacement ----

    /// Replace the snapshot wholesale and clear history.
    ///
    /// Clips are normalized, duplicate ids are renamed and clips that overlap an earlier clip
    /// of their lane are moved to the nearest free slot.
    pub fn load_state(&mut self, state: TimelineState) {
        let fps = self.fps();
        let mut state = state;
        for track_type in [TrackType::Video, TrackType::Graphics, TrackType::Audio] {
            if state.track_index(track_type).is_none() {
                state.tracks.push(Track::new(track_type));
            }
        }

        let mut seen = std::collections::HashSet::new();
        let mut placed: std::collections::HashMap<LaneKey, Vec<resolver::CollisionRange>> =
            std::collections::HashMap::new();
        for track in &mut state.tracks {
            for clip in &mut track.clips {
                clip.normalize(&self.config);
            }
            track.sort_clips();
        }
        let taken: std::collections::HashSet<String> =
            state.clips().map(|c| c.id.clone()).collect();

        for track in &mut state.tracks {
            for clip in &mut track.clips {
                if clip.id.is_empty() || !seen.insert(clip.id.clone()) {
                    let fresh = self.ids.next("clip", |id| taken.contains(id) || seen.contains(id));
                    tracing::warn!(old = %clip.id, new = %fresh, "renamed clip with duplicate id");
                    clip.id = fresh.clone();
                    seen.insert(fresh);
                }
                let lane = placed.entry(clip.lane()).or_default();
                let range = clip.frame_range(fps);
                let req = CollisionRequest::new(
                    CollisionOperation::Insert,
                    clip.group(),
                    clip.layer,
                    range.start_frame,
                    range.duration_frames,
                    lane,
                );
                let res = resolver::resolve_collision(&req);
                if res.start_frame != range.start_frame {
                    tracing::warn!(
                        clip = %clip.id,
                        lane = %clip.lane(),
                        from = range.start_frame,
                        to = res.start_frame,
                        "relocated overlapping clip"
                    );
                    clip.start_time = math::to_sec(res.start_frame, fps);
                }
                lane.push(clip.collision_range(fps));
            }
            track.sort_clips();
        }

        if let Some(id) = &state.selected_clip_id
            && !state.contains_clip(id)
        {
            state.selected_clip_id = None;
        }
        if state.project_name.trim().is_empty() {
            state.project_name = UNTITLED_PROJECT.to_string();
        }
        state.timeline_zoom = if state.timeline_zoom.is_finite() {
            state.timeline_zoom.clamp(self.config.zoom_min, self.config.zoom_max)
        } else {
            1.0
        };
        let max = state.duration().max(self.config.min_duration);
        state.playhead_time = if state.playhead_time.is_finite() {
            state.playhead_time.clamp(0.0, max)
        } else {
            0.0
        };

        self.state = state;
        self.history.clear();
        tracing::debug!(clips = self.state.clips().count(), "timeline state loaded");
    }

    /// Load from the codec's flat shape, dropping malformed entries.
    pub fn load_flat(&mut self, flat: &FlatState) {
        self.load_state(codec::flat_to_state(flat));
    }

    /// Empty every track, keeping the project name, and clear history.
    pub fn reset_state(&mut self) {
        let state = TimelineState {
            project_name: self.state.project_name.clone(),
            ..TimelineState::default()
        };
        self.load_state(state);
    }

    /// Replace the project with one video clip and its audio for a freshly imported source.
    ///
    /// Recorded as a single undo step. Returns the new video clip.
    pub fn set_source_video_clip(&mut self, source: SourceVideo) -> Clip {
        let duration = if source.duration.is_finite() && source.duration > 0.0 {
            source.duration
        } else {
            1.0
        };
        let duration = duration.max(self.config.min_duration);

        let mut video = Clip::new(self.fresh_id("video"), ClipKind::Video);
        video.label = if source.label.trim().is_empty() {
            "Video clip".to_string()
        } else {
            source.label.clone()
        };
        video.duration = duration;
        video.position = Some(Default::default());
        video.size = Some(Default::default());
        video.source_id = Some(source.source_id.clone());
        video.source_url = source.source_url.clone();
        video.poster_url = source.poster_url.clone();
        video.trim_start = Some(0.0);
        video.trim_end = Some(duration);
        video.aspect_ratio = Some(source.aspect_ratio.unwrap_or_else(|| "16:9".to_string()));
        video.crop = Some(CropRect::FULL);
        video.normalize(&self.config);

        let mut audio = Clip::new(self.fresh_id("audio"), ClipKind::Audio);
        audio.label = "Source audio".to_string();
        audio.duration = duration;
        audio.source_id = Some(source.source_id);
        audio.normalize(&self.config);

        let mut tracks = crate::timeline::model::initial_tracks();
        tracks[0].clips.push(video.clone());
        tracks[2].clips.push(audio);

        let before = DocumentContent::capture(&self.state);
        let after = DocumentContent {
            tracks,
            transitions: Vec::new(),
            selected_clip_id: Some(video.id.clone()),
            playhead_time: 0.0,
        };
        self.execute(ReplaceDocument {
            label: "import source",
            before,
            after,
        });
        video
    }

    // ---- clip verbs ----

    fn fresh_id(&mut self, prefix: &str) -> String {
        let state = &self.state;
        self.ids.next(prefix, |id| state.contains_clip(id))
    }

    /// Smallest layer of `group` where `[start, start + duration)` is free, else one past the top.
    fn next_free_layer(&self, group: LayerGroup, start: f64, duration: f64) -> u32 {
        let fps = self.fps();
        let r = math::clip_range_frames(start, duration, fps);
        let candidate = resolver::CollisionRange::new("", r.start_frame, r.end_frame);
        let layers = self.state.layers_in_group(group);
        let top = layers.last().copied().unwrap_or(0);
        (1..=top)
            .find(|&layer| {
                let lane = self.state.lane_ranges(LaneKey::new(group, layer), fps, None);
                !resolver::has_overlap(&candidate, &lane, None)
            })
            .unwrap_or(top + 1)
    }

    fn resolve_in_lane(
        &self,
        clip: &Clip,
        operation: CollisionOperation,
        exclude: Option<&str>,
    ) -> CollisionResolution {
        let fps = self.fps();
        let range = clip.frame_range(fps);
        let lane = self.state.lane_ranges(clip.lane(), fps, exclude);
        let mut req = CollisionRequest::new(
            operation,
            clip.group(),
            clip.layer,
            range.start_frame,
            range.duration_frames,
            &lane,
        );
        if let Some(id) = exclude {
            req = req.excluding(id);
        }
        if operation == CollisionOperation::Drag {
            req = req.with_snapping(i64::from(self.config.snap_threshold_frames));
        }
        resolver::resolve_collision(&req)
    }

    /// Add a clip to the track of `track_type` and select it.
    ///
    /// Missing fields get defaults: the playhead as start, the configured default duration and
    /// the lowest layer of the group that is free at that time. The start is then resolved
    /// against the lane. Returns `None` when the project has no such track.
    pub fn add_clip(&mut self, track_type: TrackType, input: ClipPatch) -> Option<Clip> {
        let Some(track) = self.state.track_index(track_type) else {
            tracing::warn!(track = track_type.as_str(), "add_clip: no such track");
            return None;
        };
        let kind = input.kind.unwrap_or(track_type.default_clip_kind());
        let id = match input.id.as_deref() {
            Some(id) if !id.is_empty() && !self.state.contains_clip(id) => id.to_string(),
            _ => self.fresh_id(track_type.as_str()),
        };

        let mut base = Clip::new(id, kind);
        base.start_time = self.state.playhead_time;
        base.duration = self.config.default_clip_duration;
        if kind == ClipKind::Video {
            base.crop = Some(CropRect::FULL);
        }
        let mut clip = input.apply(&base);
        clip.normalize(&self.config);
        if input.layer.is_none() {
            clip.layer = self.next_free_layer(clip.group(), clip.start_time, clip.duration);
        }

        let res = self.resolve_in_lane(&clip, CollisionOperation::Insert, None);
        clip.start_time = math::to_sec(res.start_frame, self.fps());

        let prev_selection = self.state.selected_clip_id.clone();
        self.execute(InsertClip {
            label: "add clip",
            track,
            clip: clip.clone(),
            prev_selection,
            fps: self.fps(),
        });
        Some(clip)
    }

    /// Merge `patch` into a clip and re-resolve its placement.
    ///
    /// Start and duration are re-clamped and snapped to frames, the clip is kept clear of its
    /// lane neighbours and transition metadata without a transition is dropped. Returns `false`
    /// for unknown ids.
    pub fn update_clip(&mut self, id: &str, patch: &ClipPatch, options: UpdateOptions) -> bool {
        let Some((track_before, ci)) = self.state.find_clip(id) else {
            return false;
        };
        let before = self.state.tracks[track_before].clips[ci].clone();
        let mut after = patch.apply(&before);
        after.normalize(&self.config);
        let Some(track_after) = self.state.track_for(track_before, before.group(), after.group())
        else {
            tracing::warn!(clip = id, group = ?after.group(), "update_clip: no track for group");
            return false;
        };
        let res = self.resolve_in_lane(&after, CollisionOperation::Drag, Some(id));
        after.start_time = math::to_sec(res.start_frame, self.fps());
        if after == before {
            return true;
        }

        if options.record_history {
            self.execute(ReplaceClip {
                label: "update clip",
                before,
                after,
                track_before,
                track_after,
                fps: self.fps(),
            });
        } else {
            self.state.relocate_clip(id, track_after, after);
        }
        true
    }

    /// Move one edge of a clip in place.
    ///
    /// The clip never changes lane: a trim that would overlap a neighbour is rejected with
    /// `false`. The source trim window follows the moved edge.
    pub fn trim_clip(&mut self, id: &str, edge: TrimEdge, time: f64) -> bool {
        let Some((track, ci)) = self.state.find_clip(id) else {
            return false;
        };
        let before = self.state.tracks[track].clips[ci].clone();
        if !time.is_finite() {
            return false;
        }
        let fps = self.fps();
        let min = self.config.min_duration_frames();
        let range = before.frame_range(fps);
        let target = math::to_frame(time.clamp(0.0, math::MAX_TIMELINE_SECONDS), fps);
        let (start, end, op) = match edge {
            TrimEdge::Start => (
                target.clamp(0, range.end_frame.saturating_sub(min).max(0)),
                range.end_frame,
                CollisionOperation::TrimStart,
            ),
            TrimEdge::End => (
                range.start_frame,
                target.max(range.start_frame.saturating_add(min)),
                CollisionOperation::TrimEnd,
            ),
        };

        let lane = self.state.lane_ranges(before.lane(), fps, Some(id));
        let req = CollisionRequest::new(op, before.group(), before.layer, start, end - start, &lane)
            .excluding(id);
        let res = resolver::resolve_collision(&req);
        if res.reason != CollisionReason::Ok {
            tracing::debug!(clip = id, reason = res.reason.as_str(), "trim rejected");
            return false;
        }

        let mut after = before.clone();
        after.start_time = math::to_sec(start, fps);
        after.duration = math::to_sec(end - start, fps);
        match edge {
            TrimEdge::Start => {
                let delta = math::to_sec(start - range.start_frame, fps);
                let ts = before.trim_start.unwrap_or(0.0);
                after.trim_start = Some((ts + delta).max(0.0));
            }
            TrimEdge::End => {
                let delta = math::to_sec(end - range.end_frame, fps);
                after.trim_end = before.trim_end.map(|te| te + delta);
            }
        }
        after.normalize(&self.config);
        if after == before {
            return true;
        }
        self.execute(ReplaceClip {
            label: "trim clip",
            before,
            after,
            track_before: track,
            track_after: track,
            fps,
        });
        true
    }

    /// Set start and duration of the selected clip in one recorded step.
    pub fn update_selected_clip_trim(&mut self, start_time: f64, duration: f64) -> bool {
        let Some(id) = self.selected_clip().map(|c| c.id.clone()) else {
            return false;
        };
        self.update_clip(
            &id,
            &ClipPatch::timing(start_time.max(0.0), duration.max(self.config.min_duration)),
            UpdateOptions::default(),
        )
    }

    /// Remove a clip; the selection is cleared if it pointed at it.
    pub fn remove_clip(&mut self, id: &str) -> bool {
        let Some((track, ci)) = self.state.find_clip(id) else {
            return false;
        };
        let clip = self.state.tracks[track].clips[ci].clone();
        let prev_selection = self.state.selected_clip_id.clone();
        let next_selection = prev_selection.clone().filter(|s| s != id);
        self.execute(RemoveClips {
            label: "remove clip",
            removed: vec![(track, clip)],
            prev_selection,
            next_selection,
            fps: self.fps(),
        });
        true
    }

    /// Remove the selected clip.
    pub fn remove_selected_clip(&mut self) -> bool {
        match self.state.selected_clip_id.clone() {
            Some(id) => self.remove_clip(&id),
            None => false,
        }
    }

    /// Remove every clip of one lane as a single undo step. Returns how many were removed.
    pub fn remove_layer_clips(&mut self, group: LayerGroup, layer: u32) -> usize {
        let lane = LaneKey::new(group, layer);
        let removed: Vec<(usize, Clip)> = self
            .state
            .tracks
            .iter()
            .enumerate()
            .flat_map(|(ti, t)| t.clips.iter().map(move |c| (ti, c)))
            .filter(|(_, c)| c.lane() == lane)
            .map(|(ti, c)| (ti, c.clone()))
            .collect();
        if removed.is_empty() {
            return 0;
        }
        let count = removed.len();
        let prev_selection = self.state.selected_clip_id.clone();
        let next_selection = prev_selection
            .clone()
            .filter(|s| !removed.iter().any(|(_, c)| &c.id == s));
        self.execute(RemoveClips {
            label: "remove layer clips",
            removed,
            prev_selection,
            next_selection,
            fps: self.fps(),
        });
        tracing::debug!(%lane, count, "removed lane clips");
        count
    }

    /// Clone the selected clip right after itself, sliding past anything in the way.
    pub fn duplicate_selected_clip(&mut self) -> Option<Clip> {
        let original = self.selected_clip()?.clone();
        let (track, _) = self.state.find_clip(&original.id)?;
        let fps = self.fps();

        let mut clip = original.clone();
        clip.id = self.fresh_id("dup");
        clip.effects.strip_transition();
        let range = original.frame_range(fps);
        let lane = self.state.lane_ranges(original.lane(), fps, None);
        let start =
            resolver::first_fit_at_or_after(range.end_frame, range.duration_frames, &lane, None);
        clip.start_time = math::to_sec(start, fps);

        let prev_selection = self.state.selected_clip_id.clone();
        self.execute(InsertClip {
            label: "duplicate clip",
            track,
            clip: clip.clone(),
            prev_selection,
            fps: self.fps(),
        });
        Some(clip)
    }

    /// Cut the selected clip at `at` (the playhead when `None`).
    ///
    /// Both halves must be at least the minimum duration long. The left half keeps the id, the
    /// right half gets a new one and becomes selected. The source trim window is divided in
    /// proportion and transitions are removed from both halves.
    pub fn split_selected_clip(&mut self, at: Option<f64>) -> bool {
        let Some(original) = self.selected_clip().cloned() else {
            return false;
        };
        let Some((track, _)) = self.state.find_clip(&original.id) else {
            return false;
        };
        let at = at.unwrap_or(self.state.playhead_time);
        if !at.is_finite() {
            return false;
        }
        let fps = self.fps();
        let min = self.config.min_duration_frames();
        let range = original.frame_range(fps);
        let cut = math::to_frame(at, fps);
        let left_frames = cut - range.start_frame;
        let right_frames = range.end_frame - cut;
        if left_frames < min || right_frames < min {
            return false;
        }

        let ts = original.trim_start.unwrap_or(0.0);
        let te = original.trim_end.unwrap_or(ts + original.duration);
        let cut_trim = ts + (te - ts) * left_frames as f64 / range.duration_frames as f64;

        let mut left = original.clone();
        left.duration = math::to_sec(left_frames, fps);
        left.trim_start = Some(ts);
        left.trim_end = Some(cut_trim);
        left.label = format!("{} (1)", original.label);
        left.effects.strip_transition();

        let mut right = original.clone();
        right.id = self.fresh_id("split");
        right.start_time = math::to_sec(cut, fps);
        right.duration = math::to_sec(right_frames, fps);
        right.trim_start = Some(cut_trim);
        right.trim_end = Some(te);
        right.label = format!("{} (2)", original.label);
        right.effects.strip_transition();
        let offset = left.duration;
        right.keyframes.retain(|kf| kf.time >= offset);
        for kf in &mut right.keyframes {
            kf.time -= offset;
        }
        left.keyframes.retain(|kf| kf.time <= offset);

        let prev_selection = self.state.selected_clip_id.clone();
        self.execute(SplitClip {
            track,
            original,
            left,
            right,
            prev_selection,
            fps,
        });
        true
    }

    /// Put a copy of the selected clip on the clipboard.
    pub fn copy_selected_clip(&mut self) -> bool {
        match self.selected_clip() {
            Some(clip) => {
                self.clipboard = Some(clip.clone());
                true
            }
            None => false,
        }
    }

    /// Whether the clipboard holds a clip.
    pub fn has_clipboard(&self) -> bool {
        self.clipboard.is_some()
    }

    /// Paste the clipboard clip at `at` (the playhead when `None`).
    ///
    /// When the slot on the copied clip's layer is taken, other layers of the group are tried
    /// nearest first, including one new empty layer. Returns the pasted clip.
    pub fn paste_clip(&mut self, at: Option<f64>) -> Option<Clip> {
        let mut clip = self.clipboard.clone()?;
        let fps = self.fps();
        clip.id = self.fresh_id("paste");
        clip.effects.strip_transition();
        clip.start_time = at.unwrap_or(self.state.playhead_time);
        clip.normalize(&self.config);

        let group = clip.group();
        let layers = self.state.layers_in_group(group);
        let top = layers.last().copied().unwrap_or(0).max(clip.layer);
        let alternatives: Vec<CollisionLane> = layers
            .iter()
            .copied()
            .chain(std::iter::once(top + 1))
            .filter(|&l| l != clip.layer)
            .map(|layer| CollisionLane {
                group,
                layer,
                clips: self.state.lane_ranges(LaneKey::new(group, layer), fps, None),
            })
            .collect();
        let range = clip.frame_range(fps);
        let lane = self.state.lane_ranges(clip.lane(), fps, None);
        let req = CollisionRequest::new(
            CollisionOperation::Paste,
            group,
            clip.layer,
            range.start_frame,
            range.duration_frames,
            &lane,
        )
        .with_alternatives(&alternatives);
        let res = resolver::resolve_collision(&req);
        clip.start_time = math::to_sec(res.start_frame, fps);
        clip.layer = res.layer;
        if res.reason == CollisionReason::MovedToNewLayer {
            tracing::debug!(layer = res.layer, created = res.created_layer, "paste moved layer");
        }

        let track = self.state.track_index(TrackType::for_group(group))?;
        let prev_selection = self.state.selected_clip_id.clone();
        self.execute(InsertClip {
            label: "paste clip",
            track,
            clip: clip.clone(),
            prev_selection,
            fps: self.fps(),
        });
        Some(clip)
    }

    /// Resolve where a drag of `id` to `start_time` (optionally on `layer`) would land, without
    /// committing anything.
    pub fn preview_move(
        &self,
        id: &str,
        start_time: f64,
        layer: Option<u32>,
    ) -> Option<CollisionResolution> {
        let mut clip = self.state.clip(id)?.clone();
        clip.start_time = start_time;
        if let Some(layer) = layer {
            clip.layer = layer;
        }
        clip.normalize(&self.config);
        Some(self.resolve_in_lane(&clip, CollisionOperation::Drag, Some(id)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/editor.rs"]
mod tests;
