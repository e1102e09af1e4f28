//! Single-line edit buffer.
//!
//! While a [`LineBuffer`] is active it is the source of truth for one line; the [`Rope`]
//! still holds the stale copy of that line until the buffer is committed. The buffered text
//! never contains a newline, so line indices are the same in both views.

use crate::error::RopeError;
use crate::rope::{Rope, byte_offset};

/// Overlay holding the current content of one buffered line.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    line: usize,
    /// Character offset of the line start (identical in the rope and the logical view).
    start: usize,
    text: String,
    chars: usize,
    original_len: usize,
    dirty: bool,
}

impl LineBuffer {
    /// Start buffering `line` of `rope`.
    pub(crate) fn open(rope: &Rope, line: usize) -> Result<Self, RopeError> {
        let start = rope.line_start_offset(line)?;
        let text = rope.line_text(line)?;
        let chars = text.chars().count();
        Ok(Self {
            line,
            start,
            text,
            chars,
            original_len: chars,
            dirty: false,
        })
    }

    /// Index of the buffered line.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Character offset where the buffered line starts.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Exclusive end of the buffered content in the logical view.
    pub fn end(&self) -> usize {
        self.start + self.chars
    }

    /// Current line content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current line length in characters.
    pub fn len(&self) -> usize {
        self.chars
    }

    /// Returns `true` if the buffered line is currently empty.
    pub fn is_empty(&self) -> bool {
        self.chars == 0
    }

    /// Length of the line in the rope when buffering started.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Returns `true` once the overlay has been edited.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Map a logical offset past the buffered line to the corresponding rope offset.
    pub(crate) fn to_rope_offset(&self, offset: usize) -> usize {
        offset - self.chars + self.original_len
    }

    /// Map a rope offset past the buffered line to the corresponding logical offset.
    pub(crate) fn to_logical_offset(&self, offset: usize) -> usize {
        offset - self.original_len + self.chars
    }

    /// Characters `from..to` of the line (line-relative offsets).
    pub(crate) fn slice(&self, from: usize, to: usize) -> &str {
        let from_byte = byte_offset(&self.text, from);
        let to_byte = from_byte + byte_offset(&self.text[from_byte..], to - from);
        &self.text[from_byte..to_byte]
    }

    /// Replace the logical range `start..end` (inside this line) with `text`.
    pub(crate) fn replace(&mut self, start: usize, end: usize, text: &str) {
        let from = byte_offset(&self.text, start - self.start);
        let to = from + byte_offset(&self.text[from..], end - start);
        self.text.replace_range(from..to, text);
        self.chars = self.chars - (end - start) + text.chars().count();
        self.dirty = true;
    }

    /// Write the overlay back into `rope`, replacing the stale copy of the line.
    pub(crate) fn commit(&self, rope: &mut Rope) -> Result<(), RopeError> {
        if !self.dirty {
            return Ok(());
        }
        rope.delete(self.start, self.start + self.original_len)?;
        rope.insert(self.start, &self.text)
    }
}
