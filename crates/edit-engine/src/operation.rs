//! Reversible edit operations recorded by the undo/redo log.
//!
//! Every [`Operation`] carries everything needed to invert it (removed text included), so
//! undo never has to re-read the document.

use crate::selection::Selection;

/// One recorded edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `text` was inserted at `offset`.
    Insert {
        /// Character offset of the insertion.
        offset: usize,
        /// Inserted text.
        text: String,
        /// Selection before the edit.
        selection_before: Selection,
        /// Selection after the edit.
        selection_after: Selection,
    },
    /// `removed` was deleted starting at `offset`.
    Delete {
        /// Character offset of the deletion.
        offset: usize,
        /// Deleted text.
        removed: String,
        /// Selection before the edit.
        selection_before: Selection,
        /// Selection after the edit.
        selection_after: Selection,
    },
    /// `removed` at `offset` was replaced by `inserted`.
    Replace {
        /// Character offset of the replacement.
        offset: usize,
        /// Replaced text.
        removed: String,
        /// Replacement text.
        inserted: String,
        /// Selection before the edit.
        selection_before: Selection,
        /// Selection after the edit.
        selection_after: Selection,
    },
    /// Operations applied in order and undone in reverse order as one step.
    Compound(Vec<Operation>),
}

impl Operation {
    /// Classify a raw edit as an insert, delete or replace.
    pub fn from_edit(
        offset: usize,
        removed: String,
        inserted: String,
        selection_before: Selection,
        selection_after: Selection,
    ) -> Self {
        if removed.is_empty() {
            Operation::Insert {
                offset,
                text: inserted,
                selection_before,
                selection_after,
            }
        } else if inserted.is_empty() {
            Operation::Delete {
                offset,
                removed,
                selection_before,
                selection_after,
            }
        } else {
            Operation::Replace {
                offset,
                removed,
                inserted,
                selection_before,
                selection_after,
            }
        }
    }

    /// Selection before the operation (the first member's, for a compound).
    pub fn selection_before(&self) -> Option<Selection> {
        match self {
            Operation::Insert {
                selection_before, ..
            }
            | Operation::Delete {
                selection_before, ..
            }
            | Operation::Replace {
                selection_before, ..
            } => Some(*selection_before),
            Operation::Compound(ops) => ops.first().and_then(Operation::selection_before),
        }
    }

    /// Selection after the operation (the last member's, for a compound).
    pub fn selection_after(&self) -> Option<Selection> {
        match self {
            Operation::Insert {
                selection_after, ..
            }
            | Operation::Delete {
                selection_after, ..
            }
            | Operation::Replace {
                selection_after, ..
            } => Some(*selection_after),
            Operation::Compound(ops) => ops.last().and_then(Operation::selection_after),
        }
    }

    /// The operation that exactly undoes this one.
    pub fn inverse(&self) -> Operation {
        match self {
            Operation::Insert {
                offset,
                text,
                selection_before,
                selection_after,
            } => Operation::Delete {
                offset: *offset,
                removed: text.clone(),
                selection_before: *selection_after,
                selection_after: *selection_before,
            },
            Operation::Delete {
                offset,
                removed,
                selection_before,
                selection_after,
            } => Operation::Insert {
                offset: *offset,
                text: removed.clone(),
                selection_before: *selection_after,
                selection_after: *selection_before,
            },
            Operation::Replace {
                offset,
                removed,
                inserted,
                selection_before,
                selection_after,
            } => Operation::Replace {
                offset: *offset,
                removed: inserted.clone(),
                inserted: removed.clone(),
                selection_before: *selection_after,
                selection_after: *selection_before,
            },
            Operation::Compound(ops) => {
                Operation::Compound(ops.iter().rev().map(Operation::inverse).collect())
            }
        }
    }

    /// Returns `true` for an insert of exactly one non-newline character.
    pub fn is_single_char_insert(&self) -> bool {
        match self {
            Operation::Insert { text, .. } => {
                let mut chars = text.chars();
                matches!((chars.next(), chars.next()), (Some(ch), None) if ch != '\n')
            }
            _ => false,
        }
    }
}
