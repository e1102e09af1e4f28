//! Error types.
//!
//! Storage-layer errors ([`RopeError`]) signal a caller passing a stale or invalid offset.
//! They propagate unchanged through the session layer inside [`EditError`].

use thiserror::Error;

/// Out-of-range errors raised by [`crate::Rope`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RopeError {
    /// A single position is outside the valid range.
    #[error("position {pos} is out of range (length {len})")]
    PositionOutOfRange {
        /// Offending character offset.
        pos: usize,
        /// Document length in characters.
        len: usize,
    },
    /// A range is inverted or extends past the end of the text.
    #[error("range {start}..{end} is out of range (length {len})")]
    RangeOutOfRange {
        /// Start character offset.
        start: usize,
        /// End character offset.
        end: usize,
        /// Document length in characters.
        len: usize,
    },
    /// A line index is past the last line.
    #[error("line {line} is out of range (line count {line_count})")]
    LineOutOfRange {
        /// Offending line index.
        line: usize,
        /// Number of lines in the document.
        line_count: usize,
    },
}

/// Errors returned by [`crate::DocumentSession`] mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The storage layer rejected an offset or range.
    #[error(transparent)]
    Rope(#[from] RopeError),
}

/// Search errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The provided regex pattern failed to compile.
    #[error("invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
}
