//! Undo/Redo Log
//!
//! Keeps two stacks of [`Operation`]s. Recording a new edit clears the redo stack. While a
//! replay (undo or redo) is in progress, [`UndoRedoLog::record`] ignores everything so the
//! edits generated by the replay are not recorded again.
//!
//! # Grouping
//!
//! A single-character insert extends the insert on top of the undo stack instead of pushing
//! a new entry when it arrives within the grouping window of the previous edit and starts
//! exactly where that insert ends. Any other kind of edit, a pause longer than the window,
//! [`UndoRedoLog::end_group`], or reaching the clean point starts a new step.

use crate::operation::Operation;
use std::time::{Duration, Instant};

/// Undo and redo stacks with time-based insert grouping.
#[derive(Debug)]
pub struct UndoRedoLog {
    undo_stack: Vec<Operation>,
    redo_stack: Vec<Operation>,
    max_undo: usize,
    group_window: Duration,
    /// Clean point tracking. Uses `undo_stack.len()` as the saved position in the linear history.
    /// When `redo_stack` is non-empty, `clean_index` may be greater than `undo_stack.len()`.
    clean_index: Option<usize>,
    /// Time of the last coalescible insert while the top entry may still be extended.
    open_insert_at: Option<Instant>,
    replaying: bool,
    compound_depth: usize,
    pending_compound: Vec<Operation>,
}

impl UndoRedoLog {
    /// Create a log keeping at most `max_undo` steps.
    pub fn new(max_undo: usize, group_window: Duration) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
            group_window,
            clean_index: Some(0),
            open_insert_at: None,
            replaying: false,
            compound_depth: 0,
            pending_compound: Vec::new(),
        }
    }

    /// Record a new edit made at time `now`.
    ///
    /// Ignored while replaying. Inside an open compound group the operation is held until the
    /// group closes.
    pub fn record(&mut self, op: Operation, now: Instant) {
        if self.replaying {
            return;
        }
        if self.compound_depth > 0 {
            self.pending_compound.push(op);
            return;
        }
        if op.is_single_char_insert() && self.try_extend_top(&op, now) {
            self.open_insert_at = Some(now);
            return;
        }
        self.push(op, now);
    }

    fn try_extend_top(&mut self, op: &Operation, now: Instant) -> bool {
        let Some(last) = self.open_insert_at else {
            return false;
        };
        if now.saturating_duration_since(last) > self.group_window {
            return false;
        }
        // The entry at the clean point stays closed.
        if self.clean_index == Some(self.undo_stack.len()) {
            return false;
        }
        let Operation::Insert {
            offset,
            text,
            selection_after,
            ..
        } = op
        else {
            return false;
        };

        match self.undo_stack.last_mut() {
            Some(Operation::Insert {
                offset: top_offset,
                text: top_text,
                selection_after: top_after,
                ..
            }) if *top_offset + top_text.chars().count() == *offset => {
                top_text.push_str(text);
                *top_after = *selection_after;
                self.clear_redo_and_adjust_clean();
                true
            }
            _ => false,
        }
    }

    fn push(&mut self, op: Operation, now: Instant) {
        self.clear_redo_and_adjust_clean();

        if self.undo_stack.len() >= self.max_undo {
            self.undo_stack.remove(0);
            if let Some(clean_index) = self.clean_index {
                self.clean_index = clean_index.checked_sub(1);
            }
        }

        self.open_insert_at = op.is_single_char_insert().then_some(now);
        self.undo_stack.push(op);
    }

    fn clear_redo_and_adjust_clean(&mut self) {
        if self.redo_stack.is_empty() {
            return;
        }

        // If clean point is in redo area, it becomes unreachable after clearing redo.
        if let Some(clean_index) = self.clean_index
            && clean_index > self.undo_stack.len()
        {
            self.clean_index = None;
        }

        self.redo_stack.clear();
    }

    /// Close the current insert group; the next edit starts a new undo step.
    pub fn end_group(&mut self) {
        self.open_insert_at = None;
    }

    /// Open a compound group. Groups nest; only the outermost close records anything.
    pub fn begin_compound(&mut self) {
        self.end_group();
        self.compound_depth += 1;
    }

    /// Close a compound group, recording everything collected since the outermost open as
    /// one step.
    pub fn end_compound(&mut self, now: Instant) {
        if self.compound_depth == 0 {
            return;
        }
        self.compound_depth -= 1;
        if self.compound_depth > 0 {
            return;
        }

        let mut ops = std::mem::take(&mut self.pending_compound);
        match ops.len() {
            0 => {}
            1 => {
                if let Some(op) = ops.pop() {
                    self.push(op, now);
                }
            }
            _ => self.push(Operation::Compound(ops), now),
        }
        self.end_group();
    }

    /// Pop the most recent step for undoing.
    pub fn pop_undo(&mut self) -> Option<Operation> {
        self.end_group();
        self.undo_stack.pop()
    }

    /// Pop the most recently undone step for redoing.
    pub fn pop_redo(&mut self) -> Option<Operation> {
        self.end_group();
        self.redo_stack.pop()
    }

    /// Push an undone step onto the redo stack.
    pub fn push_redo(&mut self, op: Operation) {
        self.redo_stack.push(op);
    }

    /// Push a redone step back onto the undo stack, keeping the redo stack.
    pub fn push_undo(&mut self, op: Operation) {
        self.undo_stack.push(op);
    }

    /// Mark the start of a replay; [`Self::record`] is ignored until [`Self::end_replay`].
    pub fn begin_replay(&mut self) {
        self.replaying = true;
    }

    /// Mark the end of a replay.
    pub fn end_replay(&mut self) {
        self.replaying = false;
    }

    /// Returns `true` while an undo or redo is being applied.
    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of steps on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of steps on the redo stack.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// The step that the next undo would revert.
    pub fn peek_undo(&self) -> Option<&Operation> {
        self.undo_stack.last()
    }

    /// Returns `true` if the history is at the last saved position.
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.undo_stack.len())
    }

    /// Record the current position as saved.
    pub fn mark_clean(&mut self) {
        self.clean_index = Some(self.undo_stack.len());
        self.end_group();
    }

    /// Drop all history; the current state becomes the clean point.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending_compound.clear();
        self.compound_depth = 0;
        self.clean_index = Some(0);
        self.open_insert_at = None;
    }
}
