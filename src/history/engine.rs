//! Command-based undo/redo.
//!
//! Each committed edit is a [`Command`] that can re-apply itself and revert itself against the
//! state it was recorded on. Commands capture exactly the data they touch, so the stacks never
//! hold whole-state snapshots.

use std::collections::VecDeque;
use std::fmt;

/// Default cap for the undo and redo stacks.
pub const DEFAULT_HISTORY_DEPTH: usize = 240;

/// A reversible edit of `S`.
///
/// `redo` followed by `undo` must leave `S` exactly as it was.
///
/// Edits that bypass the history can leave `S` in a shape a recorded command no longer fits.
/// `can_redo` and `can_undo` let a command refuse to replay in that case; both accept
/// everything by default.
pub trait Command<S>: fmt::Debug {
    /// Short human-readable label, e.g. `"split clip"`.
    fn label(&self) -> &str;
    /// Apply the edit.
    fn redo(&self, state: &mut S);
    /// Revert the edit.
    fn undo(&self, state: &mut S);
    /// Whether [`Command::redo`] can be applied to `state` without breaking its invariants.
    fn can_redo(&self, _state: &S) -> bool {
        true
    }
    /// Whether [`Command::undo`] can be applied to `state` without breaking its invariants.
    fn can_undo(&self, _state: &S) -> bool {
        true
    }
}

/// Bounded undo/redo stacks of commands.
pub struct History<S> {
    undo_stack: VecDeque<Box<dyn Command<S>>>,
    redo_stack: VecDeque<Box<dyn Command<S>>>,
    max_depth: usize,
}

impl<S> fmt::Debug for History<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl<S> History<S> {
    /// Create empty stacks holding at most `max_depth` entries each (minimum one).
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Apply `command` to `state` once and record it.
    ///
    /// Recording a new command discards everything that could have been redone.
    pub fn execute(&mut self, state: &mut S, command: Box<dyn Command<S>>) {
        command.redo(state);
        self.record(command);
    }

    /// Record a command whose effect is already present in the state.
    pub fn record(&mut self, command: Box<dyn Command<S>>) {
        tracing::debug!(label = command.label(), "history push");
        self.redo_stack.clear();
        self.undo_stack.push_back(command);
        Self::cap(&mut self.undo_stack, self.max_depth);
    }

    /// Revert the most recent command.
    ///
    /// Returns `false` when there is nothing to undo or the command refuses to revert against
    /// the current state. A refusal leaves both the state and the stacks untouched.
    pub fn undo(&mut self, state: &mut S) -> bool {
        let Some(command) = self.undo_stack.back() else {
            return false;
        };
        if !command.can_undo(state) {
            tracing::warn!(label = command.label(), "undo refused by current state");
            return false;
        }
        let Some(command) = self.undo_stack.pop_back() else {
            return false;
        };
        command.undo(state);
        tracing::debug!(
            label = command.label(),
            undo_remaining = self.undo_stack.len(),
            "undo"
        );
        self.redo_stack.push_back(command);
        Self::cap(&mut self.redo_stack, self.max_depth);
        true
    }

    /// Re-apply the most recently undone command.
    ///
    /// Returns `false` when there is nothing to redo or the command refuses to re-apply against
    /// the current state. A refusal leaves both the state and the stacks untouched.
    pub fn redo(&mut self, state: &mut S) -> bool {
        let Some(command) = self.redo_stack.back() else {
            return false;
        };
        if !command.can_redo(state) {
            tracing::warn!(label = command.label(), "redo refused by current state");
            return false;
        }
        let Some(command) = self.redo_stack.pop_back() else {
            return false;
        };
        command.redo(state);
        tracing::debug!(
            label = command.label(),
            redo_remaining = self.redo_stack.len(),
            "redo"
        );
        self.undo_stack.push_back(command);
        Self::cap(&mut self.undo_stack, self.max_depth);
        true
    }

    /// Whether [`History::undo`] would do anything.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether [`History::redo`] would do anything.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable commands.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable commands.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Label of the command [`History::undo`] would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.label())
    }

    /// Label of the command [`History::redo`] would re-apply.
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.back().map(|c| c.label())
    }

    /// Maximum entries per stack.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the cap, dropping the oldest entries if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        Self::cap(&mut self.undo_stack, self.max_depth);
        Self::cap(&mut self.redo_stack, self.max_depth);
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        tracing::debug!("history cleared");
    }

    fn cap(stack: &mut VecDeque<Box<dyn Command<S>>>, max_depth: usize) {
        while stack.len() > max_depth {
            stack.pop_front();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/engine.rs"]
mod tests;
