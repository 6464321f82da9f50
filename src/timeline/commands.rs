//! Reversible edits of a [`TimelineState`].
//!
//! Commands hold clones of the clips they touch and locate clips by id, so they stay valid
//! when unrecorded edits land between recording and undo. Before placing a clip back they
//! check its lane at the recorded frame rate and refuse when an unrecorded edit has since
//! taken the slot.

use crate::{
    history::engine::Command,
    timeline::model::{Clip, TimelineState, TimelineTransition, Track},
};

/// Adds one clip and selects it.
#[derive(Debug)]
pub(crate) struct InsertClip {
    pub(crate) label: &'static str,
    pub(crate) track: usize,
    pub(crate) clip: Clip,
    pub(crate) prev_selection: Option<String>,
    pub(crate) fps: f64,
}

impl Command<TimelineState> for InsertClip {
    fn label(&self) -> &str {
        self.label
    }

    fn can_redo(&self, state: &TimelineState) -> bool {
        state.lane_accepts(&self.clip, self.fps, &[])
    }

    fn redo(&self, state: &mut TimelineState) {
        state.insert_clip(self.track, self.clip.clone());
        state.selected_clip_id = Some(self.clip.id.clone());
    }

    fn undo(&self, state: &mut TimelineState) {
        state.take_clip(&self.clip.id);
        state.selected_clip_id = self.prev_selection.clone();
    }
}

/// Swaps one clip for an updated version of itself, moving it between tracks when its group
/// changed.
#[derive(Debug)]
pub(crate) struct ReplaceClip {
    pub(crate) label: &'static str,
    pub(crate) before: Clip,
    pub(crate) after: Clip,
    pub(crate) track_before: usize,
    pub(crate) track_after: usize,
    pub(crate) fps: f64,
}

impl Command<TimelineState> for ReplaceClip {
    fn label(&self) -> &str {
        self.label
    }

    fn redo(&self, state: &mut TimelineState) {
        state.relocate_clip(&self.before.id, self.track_after, self.after.clone());
    }

    fn undo(&self, state: &mut TimelineState) {
        state.relocate_clip(&self.after.id, self.track_before, self.before.clone());
    }

    fn can_redo(&self, state: &TimelineState) -> bool {
        state.lane_accepts(&self.after, self.fps, &[])
    }

    fn can_undo(&self, state: &TimelineState) -> bool {
        state.lane_accepts(&self.before, self.fps, &[])
    }
}

/// Removes any number of clips as one step.
#[derive(Debug)]
pub(crate) struct RemoveClips {
    pub(crate) label: &'static str,
    /// `(track index, clip)` pairs.
    pub(crate) removed: Vec<(usize, Clip)>,
    pub(crate) prev_selection: Option<String>,
    pub(crate) next_selection: Option<String>,
    pub(crate) fps: f64,
}

impl Command<TimelineState> for RemoveClips {
    fn label(&self) -> &str {
        self.label
    }

    fn can_undo(&self, state: &TimelineState) -> bool {
        self.removed
            .iter()
            .all(|(_, clip)| state.lane_accepts(clip, self.fps, &[]))
    }

    fn redo(&self, state: &mut TimelineState) {
        for (_, clip) in &self.removed {
            state.take_clip(&clip.id);
        }
        state.selected_clip_id = self.next_selection.clone();
    }

    fn undo(&self, state: &mut TimelineState) {
        for (track, clip) in &self.removed {
            state.insert_clip(*track, clip.clone());
        }
        state.selected_clip_id = self.prev_selection.clone();
    }
}

/// Replaces a clip by its left half and inserts the right half.
#[derive(Debug)]
pub(crate) struct SplitClip {
    pub(crate) track: usize,
    pub(crate) original: Clip,
    pub(crate) left: Clip,
    pub(crate) right: Clip,
    pub(crate) prev_selection: Option<String>,
    pub(crate) fps: f64,
}

impl Command<TimelineState> for SplitClip {
    fn label(&self) -> &str {
        "split clip"
    }

    fn can_redo(&self, state: &TimelineState) -> bool {
        state.lane_accepts(&self.left, self.fps, &[])
            && state.lane_accepts(&self.right, self.fps, &[self.original.id.as_str()])
    }

    fn can_undo(&self, state: &TimelineState) -> bool {
        state.lane_accepts(&self.original, self.fps, &[self.right.id.as_str()])
    }

    fn redo(&self, state: &mut TimelineState) {
        state.replace_clip(&self.original.id, self.left.clone());
        state.insert_clip(self.track, self.right.clone());
        state.selected_clip_id = Some(self.right.id.clone());
    }

    fn undo(&self, state: &mut TimelineState) {
        state.take_clip(&self.right.id);
        state.replace_clip(&self.left.id, self.original.clone());
        state.selected_clip_id = self.prev_selection.clone();
    }
}

/// Document content swapped by [`ReplaceDocument`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DocumentContent {
    pub(crate) tracks: Vec<Track>,
    pub(crate) transitions: Vec<TimelineTransition>,
    pub(crate) selected_clip_id: Option<String>,
    pub(crate) playhead_time: f64,
}

impl DocumentContent {
    pub(crate) fn capture(state: &TimelineState) -> Self {
        Self {
            tracks: state.tracks.clone(),
            transitions: state.transitions.clone(),
            selected_clip_id: state.selected_clip_id.clone(),
            playhead_time: state.playhead_time,
        }
    }

    fn restore(&self, state: &mut TimelineState) {
        state.tracks = self.tracks.clone();
        state.transitions = self.transitions.clone();
        state.selected_clip_id = self.selected_clip_id.clone();
        state.playhead_time = self.playhead_time;
    }
}

/// Replaces every track, transition and the selection at once.
#[derive(Debug)]
pub(crate) struct ReplaceDocument {
    pub(crate) label: &'static str,
    pub(crate) before: DocumentContent,
    pub(crate) after: DocumentContent,
}

impl Command<TimelineState> for ReplaceDocument {
    fn label(&self) -> &str {
        self.label
    }

    fn redo(&self, state: &mut TimelineState) {
        self.after.restore(state);
    }

    fn undo(&self, state: &mut TimelineState) {
        self.before.restore(state);
    }
}
