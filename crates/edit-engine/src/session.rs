//! Document Session
//!
//! [`DocumentSession`] owns the text of one document and everything that goes with editing
//! it: the selection, a version counter, dirty tracking, undo/redo and change notifications.
//!
//! # Line buffering
//!
//! Edits that stay on one line (no newline removed or inserted) go to a [`LineBuffer`]
//! overlay instead of the rope. The buffer is committed ("flushed") when:
//!
//! - an edit touches another line or changes the line structure
//! - the selection moves to another line
//! - an undo or redo starts
//! - [`DocumentSession::flush`] is called
//! - the debounce deadline passes and [`DocumentSession::poll_flush`] is called
//!
//! Every read accessor presents the logical text (rope plus overlay), so callers never see the
//! difference. [`DocumentSession::flushed_rope`] flushes first and exposes the storage.

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::delta::{TextDelta, TextDeltaEdit};
use crate::error::{EditError, RopeError};
use crate::history::UndoRedoLog;
use crate::line_buffer::LineBuffer;
use crate::line_ending::{self, LineEnding};
use crate::operation::Operation;
use crate::rope::{Rope, byte_offset};
use crate::search::{self, SearchMatch, SearchOptions};
use crate::selection::Selection;
use crate::typing::{self, TypingContext, TypingPlan};
use std::cell::RefCell;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// What was invalidated since the host last cleared it.
///
/// Only the most recent mutation is described; consumers must not assume regions accumulate.
/// An undo or redo step counts as one mutation, however many edits it replays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyState {
    /// Line touched by the most recent mutation or flush.
    pub line: Option<usize>,
    /// Character range covering the text inserted by the most recent mutation.
    pub region: Option<Range<usize>>,
    /// Only the selection changed since the last clear.
    pub selection_only: bool,
    /// The most recent mutation added or removed lines, or was a bulk replace.
    pub line_structure_changed: bool,
}

impl DirtyState {
    /// Returns `true` if nothing is dirty.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Change kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Document text changed.
    TextChanged,
    /// The whole document was replaced.
    TextReplaced,
    /// Only the selection changed.
    SelectionChanged,
}

/// Change notification delivered to subscribers.
#[derive(Debug, Clone)]
pub struct ChangeNotice {
    /// Change kind
    pub kind: ChangeKind,
    /// Version before the change.
    pub old_version: u64,
    /// Version after the change.
    pub new_version: u64,
    /// Selection after the change.
    pub selection: Selection,
    /// Dirty state after the change.
    pub dirty: DirtyState,
    /// The edits behind a text change.
    pub text_delta: Option<Arc<TextDelta>>,
}

/// Change callback function type
pub type ChangeCallback = Box<dyn FnMut(&ChangeNotice) + Send>;

/// Handle returned by [`DocumentSession::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditPath {
    /// Single-line edits may go through the line buffer.
    Buffered,
    /// Always edit the rope directly.
    Direct,
}

/// An editable document.
///
/// # Example
///
/// ```rust
/// use edit_engine::{DocumentSession, Selection};
///
/// let mut session = DocumentSession::new("");
/// session.insert_at(0, "hello", Selection::caret(5)).unwrap();
/// assert_eq!(&*session.text(), "hello");
///
/// session.undo().unwrap();
/// assert_eq!(&*session.text(), "");
/// ```
pub struct DocumentSession {
    rope: Rope,
    buffer: Option<LineBuffer>,
    selection: Selection,
    version: u64,
    dirty: DirtyState,
    history: UndoRedoLog,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    flush_deadline: Option<Instant>,
    text_cache: RefCell<Option<(u64, Arc<str>)>>,
    observers: Vec<(SubscriptionId, ChangeCallback)>,
    next_subscription: u64,
    line_ending: LineEnding,
    pending_edits: Vec<TextDeltaEdit>,
    pending_before_len: Option<usize>,
    last_text_delta: Option<Arc<TextDelta>>,
}

impl DocumentSession {
    /// Create a session over `text` with the default configuration.
    pub fn new(text: &str) -> Self {
        Self::with_config(text, SessionConfig::default())
    }

    /// Create a session over `text`.
    ///
    /// CRLF and lone CR newlines are normalized to LF; the detected line ending is kept for
    /// [`Self::text_for_saving`].
    pub fn with_config(text: &str, config: SessionConfig) -> Self {
        let line_ending = LineEnding::detect_in_text(text);
        let rope = Rope::from_text(&line_ending::normalize(text));
        Self {
            rope,
            buffer: None,
            selection: Selection::caret(0),
            version: 0,
            dirty: DirtyState::default(),
            history: UndoRedoLog::new(config.max_undo, config.undo_group_window),
            config,
            clock: Arc::new(SystemClock),
            flush_deadline: None,
            text_cache: RefCell::new(None),
            observers: Vec::new(),
            next_subscription: 0,
            line_ending,
            pending_edits: Vec::new(),
            pending_before_len: None,
            last_text_delta: None,
        }
    }

    /// Use `clock` for undo grouping and the flush deadline.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        match &self.buffer {
            Some(buffer) => self.rope.len() - buffer.original_len() + buffer.len(),
            None => self.rope.len(),
        }
    }

    /// Returns `true` if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lines (always at least 1).
    pub fn line_count(&self) -> usize {
        self.rope.line_count()
    }

    /// Version counter, incremented by every text mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check if the text has changed since `version`.
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.version > version
    }

    /// Current selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Dirty tracking state.
    pub fn dirty(&self) -> &DirtyState {
        &self.dirty
    }

    /// Reset dirty tracking after the host has consumed it.
    pub fn clear_dirty_region(&mut self) {
        self.dirty = DirtyState::default();
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Undo/redo log.
    pub fn history(&self) -> &UndoRedoLog {
        &self.history
    }

    /// The active line buffer, if any.
    pub fn line_buffer(&self) -> Option<&LineBuffer> {
        self.buffer.as_ref()
    }

    /// When the line buffer is due to be flushed.
    pub fn flush_deadline(&self) -> Option<Instant> {
        self.flush_deadline
    }

    /// Full logical text.
    ///
    /// Cached per version, so repeated calls between mutations share one allocation.
    pub fn text(&self) -> Arc<str> {
        if let Some((version, text)) = self.text_cache.borrow().as_ref()
            && *version == self.version
        {
            return Arc::clone(text);
        }
        let text: Arc<str> = self
            .assemble_text()
            .expect("line buffer lies within the rope")
            .into();
        *self.text_cache.borrow_mut() = Some((self.version, Arc::clone(&text)));
        text
    }

    fn assemble_text(&self) -> Result<String, RopeError> {
        let Some(buffer) = &self.buffer else {
            return Ok(self.rope.text());
        };
        let tail = buffer.start() + buffer.original_len();
        let mut out = String::with_capacity(self.len());
        out.extend(self.rope.chunks_in_range(0, buffer.start())?);
        out.push_str(buffer.text());
        out.extend(self.rope.chunks_in_range(tail, self.rope.len())?);
        Ok(out)
    }

    /// Characters `start..end` of the logical text.
    pub fn substring(&self, start: usize, end: usize) -> Result<String, RopeError> {
        let Some(buffer) = &self.buffer else {
            return self.rope.substring(start, end);
        };
        let len = self.len();
        if start > end || end > len {
            return Err(RopeError::RangeOutOfRange { start, end, len });
        }

        let mut out = String::new();
        if start < buffer.start() {
            out.push_str(&self.rope.substring(start, end.min(buffer.start()))?);
        }
        let (from, to) = (start.max(buffer.start()), end.min(buffer.end()));
        if from < to {
            out.push_str(buffer.slice(from - buffer.start(), to - buffer.start()));
        }
        if end > buffer.end() {
            let from = buffer.to_rope_offset(start.max(buffer.end()));
            out.push_str(&self.rope.substring(from, buffer.to_rope_offset(end))?);
        }
        Ok(out)
    }

    /// Text of line `line`, without its newline.
    pub fn line_text(&self, line: usize) -> Result<String, RopeError> {
        match &self.buffer {
            Some(buffer) if buffer.line() == line => Ok(buffer.text().to_string()),
            _ => self.rope.line_text(line),
        }
    }

    /// Character offset where `line` starts.
    pub fn line_start_offset(&self, line: usize) -> Result<usize, RopeError> {
        let offset = self.rope.line_start_offset(line)?;
        Ok(match &self.buffer {
            Some(buffer) if line > buffer.line() => buffer.to_logical_offset(offset),
            _ => offset,
        })
    }

    /// Line containing character offset `pos` (a newline belongs to the line it ends).
    pub fn line_at_offset(&self, pos: usize) -> Result<usize, RopeError> {
        let len = self.len();
        if pos > len {
            return Err(RopeError::PositionOutOfRange { pos, len });
        }
        match &self.buffer {
            Some(buffer) if pos >= buffer.start() => {
                if pos <= buffer.end() {
                    Ok(buffer.line())
                } else {
                    self.rope.line_at_offset(buffer.to_rope_offset(pos))
                }
            }
            _ => self.rope.line_at_offset(pos),
        }
    }

    /// Flush the line buffer and return the underlying rope.
    pub fn flushed_rope(&mut self) -> Result<&Rope, EditError> {
        self.commit_buffer()?;
        Ok(&self.rope)
    }

    /// Find every match of `query`. An invalid pattern yields no matches.
    pub fn find_all(&self, query: &str, options: SearchOptions) -> Vec<SearchMatch> {
        match search::find_all(&self.text(), query, options) {
            Ok(matches) => matches,
            Err(err) => {
                debug!(%err, "search pattern rejected");
                Vec::new()
            }
        }
    }

    /// First match starting at or after `from`.
    pub fn find_next(
        &self,
        query: &str,
        options: SearchOptions,
        from: usize,
    ) -> Option<SearchMatch> {
        self.find_all(query, options)
            .into_iter()
            .find(|m| m.start >= from)
    }

    /// Last match ending at or before `from`.
    pub fn find_prev(
        &self,
        query: &str,
        options: SearchOptions,
        from: usize,
    ) -> Option<SearchMatch> {
        self.find_all(query, options)
            .into_iter()
            .take_while(|m| m.end <= from)
            .last()
    }

    /// Preferred line ending for saving.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Set the preferred line ending for saving.
    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    /// Logical text converted to the preferred line ending.
    pub fn text_for_saving(&self) -> String {
        self.line_ending.apply_to_text(&self.text())
    }

    /// Returns `true` if the text differs from the last saved (clean) point.
    pub fn is_modified(&self) -> bool {
        !self.history.is_clean()
    }

    /// Mark the current state as saved.
    pub fn mark_saved(&mut self) {
        self.history.mark_clean();
    }

    /// Returns `true` if there is something to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns `true` if there is something to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Get the structured text delta produced by the last text change, if any.
    pub fn last_text_delta(&self) -> Option<&TextDelta> {
        self.last_text_delta.as_deref()
    }

    /// Take the structured text delta produced by the last text change, if any.
    pub fn take_last_text_delta(&mut self) -> Option<Arc<TextDelta>> {
        self.last_text_delta.take()
    }

    /// Subscribe to change notifications.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChangeNotice) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer, _)| *observer != id);
        self.observers.len() != before
    }

    /// Replace the whole document.
    ///
    /// Clears undo history, marks the new text clean and puts the caret at the end.
    pub fn set_text(&mut self, text: &str) {
        let old_version = self.version;
        let before = self.text();
        self.buffer = None;
        self.flush_deadline = None;
        self.pending_edits.clear();
        self.pending_before_len = None;

        self.line_ending = LineEnding::detect_in_text(text);
        let normalized = line_ending::normalize(text);
        self.rope = Rope::from_text(&normalized);
        self.history.clear();

        let len = self.rope.len();
        self.selection = Selection::caret(len);
        self.version += 1;
        self.dirty = DirtyState {
            line: None,
            region: Some(0..len),
            selection_only: false,
            line_structure_changed: true,
        };
        debug!(len, lines = self.rope.line_count(), "document replaced");

        let delta = Arc::new(TextDelta {
            before_char_count: before.chars().count(),
            after_char_count: len,
            edits: vec![TextDeltaEdit {
                start: 0,
                deleted_text: before.to_string(),
                inserted_text: normalized.into_owned(),
            }],
        });
        self.last_text_delta = Some(Arc::clone(&delta));
        self.notify(ChangeKind::TextReplaced, old_version, Some(delta));
    }

    /// Insert `text` at `offset`, then select `new_selection`. CRLF in `text` becomes LF.
    ///
    /// With auto-pairing or auto-indent enabled, a single typed opener, closer or newline
    /// goes through the typing rules and may insert more (or nothing) and place the caret
    /// itself.
    pub fn insert_at(
        &mut self,
        offset: usize,
        text: &str,
        new_selection: Selection,
    ) -> Result<(), EditError> {
        let len = self.len();
        if offset > len {
            return Err(RopeError::PositionOutOfRange { pos: offset, len }.into());
        }
        if text.is_empty() {
            return Ok(());
        }
        let text = line_ending::normalize(text);
        if let Some(plan) = self.plan_typing(offset, offset, &text)? {
            return self.apply_plan(plan);
        }
        self.apply_edit(offset, offset, &text, new_selection, EditPath::Buffered)
    }

    /// Delete `start..end`, then select `new_selection`.
    pub fn delete_range(
        &mut self,
        start: usize,
        end: usize,
        new_selection: Selection,
    ) -> Result<(), EditError> {
        let len = self.len();
        if start > end || end > len {
            return Err(RopeError::RangeOutOfRange { start, end, len }.into());
        }
        if start == end {
            return Ok(());
        }
        self.apply_edit(start, end, "", new_selection, EditPath::Buffered)
    }

    /// Replace `start..end` with `text` directly in the rope, then select `new_selection`.
    ///
    /// The range is clamped to the document and may be given in either order.
    pub fn replace_range(
        &mut self,
        start: usize,
        end: usize,
        text: &str,
        new_selection: Selection,
    ) -> Result<(), EditError> {
        let len = self.len();
        let (a, b) = (start.min(len), end.min(len));
        let (start, end) = (a.min(b), a.max(b));
        if start == end && text.is_empty() {
            return Ok(());
        }
        let text = line_ending::normalize(text);
        self.apply_edit(start, end, &text, new_selection, EditPath::Direct)
    }

    /// Type `text` over the current selection, applying the typing rules to single
    /// characters.
    pub fn type_text(&mut self, text: &str) -> Result<(), EditError> {
        if text.is_empty() {
            return Ok(());
        }
        let text = line_ending::normalize(text);
        let (start, end) = (self.selection.start(), self.selection.end());
        if let Some(plan) = self.plan_typing(start, end, &text)? {
            return self.apply_plan(plan);
        }
        let caret = start + text.chars().count();
        self.apply_edit(start, end, &text, Selection::caret(caret), EditPath::Buffered)
    }

    /// Delete the selection, or the grapheme before the caret.
    ///
    /// Inside an empty auto-pair (`(|)`) both characters are removed.
    pub fn backspace(&mut self) -> Result<(), EditError> {
        let selection = self.selection;
        if !selection.is_caret() {
            let start = selection.start();
            return self.delete_range(start, selection.end(), Selection::caret(start));
        }
        let caret = selection.extent;
        if caret == 0 {
            return Ok(());
        }

        let line = self.line_at_offset(caret)?;
        let line_start = self.line_start_offset(line)?;
        if caret == line_start {
            return self.delete_range(caret - 1, caret, Selection::caret(caret - 1));
        }

        let line_text = self.line_text(line)?;
        let split = byte_offset(&line_text, caret - line_start);
        let (prefix, suffix) = line_text.split_at(split);
        let start = caret - typing::last_grapheme_len(prefix);
        let mut end = caret;
        if self.config.auto_pairs
            && caret - start == 1
            && let (Some(open), Some(close)) = (prefix.chars().next_back(), suffix.chars().next())
            && self.config.language.is_pair(open, close)
        {
            end += 1;
        }
        self.delete_range(start, end, Selection::caret(start))
    }

    /// Delete the selection, or the grapheme after the caret.
    pub fn delete(&mut self) -> Result<(), EditError> {
        let selection = self.selection;
        if !selection.is_caret() {
            let start = selection.start();
            return self.delete_range(start, selection.end(), Selection::caret(start));
        }
        let caret = selection.extent;
        if caret >= self.len() {
            return Ok(());
        }

        let line = self.line_at_offset(caret)?;
        let line_start = self.line_start_offset(line)?;
        let line_text = self.line_text(line)?;
        let split = byte_offset(&line_text, caret - line_start);
        let end = match typing::first_grapheme_len(&line_text[split..]) {
            // At the end of the line: remove the newline.
            0 => caret + 1,
            n => caret + n,
        };
        self.delete_range(caret, end, Selection::caret(caret))
    }

    /// Move the selection. Positions are clamped to the document.
    ///
    /// Flushes the line buffer when the moving end leaves the buffered line. Does not bump
    /// the version.
    pub fn set_selection(&mut self, selection: Selection) -> Result<(), EditError> {
        let selection = selection.clamped(self.len());
        if selection == self.selection {
            return Ok(());
        }
        if let Some(line) = self.buffer.as_ref().map(LineBuffer::line)
            && self.line_at_offset(selection.extent)? != line
        {
            self.commit_buffer()?;
        }
        self.selection = selection;
        self.history.end_group();
        if self.dirty.region.is_none() && self.dirty.line.is_none() {
            self.dirty.selection_only = true;
        }
        self.notify(ChangeKind::SelectionChanged, self.version, None);
        Ok(())
    }

    /// Run `f` so that every edit it makes becomes a single undo step.
    pub fn compound<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.history.begin_compound();
        let result = f(self);
        let now = self.clock.now();
        self.history.end_compound(now);
        result
    }

    /// Commit the line buffer and close the current undo group.
    pub fn flush(&mut self) -> Result<(), EditError> {
        self.commit_buffer()?;
        self.history.end_group();
        Ok(())
    }

    /// Flush the line buffer if its debounce deadline has passed. Returns `true` if it did.
    pub fn poll_flush(&mut self) -> Result<bool, EditError> {
        match self.flush_deadline {
            Some(deadline) if self.clock.now() >= deadline => {
                self.commit_buffer()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Undo the most recent step. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        if self.history.is_replaying() {
            return Ok(false);
        }
        self.commit_buffer()?;
        let Some(op) = self.history.pop_undo() else {
            return Ok(false);
        };
        debug!(remaining = self.history.undo_depth(), "undo");
        self.replay(&op.inverse())?;
        self.history.push_redo(op);
        Ok(true)
    }

    /// Redo the most recently undone step. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditError> {
        if self.history.is_replaying() {
            return Ok(false);
        }
        self.commit_buffer()?;
        let Some(op) = self.history.pop_redo() else {
            return Ok(false);
        };
        debug!(remaining = self.history.redo_depth(), "redo");
        self.replay(&op)?;
        self.history.push_undo(op);
        Ok(true)
    }

    fn replay(&mut self, op: &Operation) -> Result<(), EditError> {
        let old_version = self.version;
        self.dirty.region = None;
        self.dirty.line_structure_changed = false;
        self.history.begin_replay();
        let result = self.apply_operation(op);
        self.history.end_replay();
        result?;

        if let Some(region) = &self.dirty.region {
            self.dirty.line = Some(self.line_at_offset(region.start)?);
        }
        if let Some(selection) = op.selection_after() {
            self.selection = selection.clamped(self.len());
        }
        let delta = self.take_pending_delta();
        self.notify(ChangeKind::TextChanged, old_version, delta);
        Ok(())
    }

    fn apply_operation(&mut self, op: &Operation) -> Result<(), EditError> {
        match op {
            Operation::Insert {
                offset,
                text,
                selection_after,
                ..
            } => self.apply_edit(*offset, *offset, text, *selection_after, EditPath::Direct),
            Operation::Delete {
                offset,
                removed,
                selection_after,
                ..
            } => {
                let end = *offset + removed.chars().count();
                self.apply_edit(*offset, end, "", *selection_after, EditPath::Direct)
            }
            Operation::Replace {
                offset,
                removed,
                inserted,
                selection_after,
                ..
            } => {
                let end = *offset + removed.chars().count();
                self.apply_edit(*offset, end, inserted, *selection_after, EditPath::Direct)
            }
            Operation::Compound(ops) => {
                for op in ops {
                    self.apply_operation(op)?;
                }
                Ok(())
            }
        }
    }

    fn plan_typing(
        &self,
        start: usize,
        end: usize,
        text: &str,
    ) -> Result<Option<TypingPlan>, EditError> {
        let mut chars = text.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return Ok(None);
        };
        if !self.config.auto_pairs && !(self.config.auto_indent && ch == '\n') {
            return Ok(None);
        }

        let line = self.line_at_offset(start)?;
        let line_start = self.line_start_offset(line)?;
        let line_text = self.line_text(line)?;
        let prefix = &line_text[..byte_offset(&line_text, start - line_start)];
        let prev = match prefix.chars().next_back() {
            Some(c) => Some(c),
            None if line > 0 => Some('\n'),
            None => None,
        };
        let next = if end < self.len() {
            self.substring(end, end + 1)?.chars().next()
        } else {
            None
        };
        let selected = if start < end {
            self.substring(start, end)?
        } else {
            String::new()
        };

        let ctx = TypingContext {
            start,
            end,
            prefix,
            prev,
            next,
            selected: &selected,
        };
        Ok(typing::plan(ch, &ctx, &self.config))
    }

    fn apply_plan(&mut self, plan: TypingPlan) -> Result<(), EditError> {
        match plan {
            TypingPlan::TypeOver { caret } => self.set_selection(Selection::caret(caret)),
            TypingPlan::Edit {
                start,
                end,
                text,
                selection,
            } => self.apply_edit(start, end, &text, selection, EditPath::Buffered),
        }
    }

    /// The single mutation path. Offsets are already validated.
    fn apply_edit(
        &mut self,
        start: usize,
        end: usize,
        text: &str,
        selection_after: Selection,
        path: EditPath,
    ) -> Result<(), EditError> {
        let now = self.clock.now();
        let old_version = self.version;
        let selection_before = self.selection;
        let len_before = self.len();
        let removed = self.substring(start, end)?;
        let changes_lines = removed.contains('\n') || text.contains('\n');

        if path == EditPath::Buffered && !changes_lines {
            let line = self.line_at_offset(start)?;
            if self.buffer.as_ref().is_some_and(|b| b.line() != line) {
                self.commit_buffer()?;
            }
            let mut buffer = match self.buffer.take() {
                Some(buffer) => buffer,
                None => LineBuffer::open(&self.rope, line)?,
            };
            buffer.replace(start, end, text);
            self.buffer = Some(buffer);
            self.flush_deadline = Some(now + self.config.flush_delay);
            self.dirty.line = Some(line);
        } else {
            self.commit_buffer()?;
            self.rope.delete(start, end)?;
            self.rope.insert(start, text)?;
            self.dirty.line = Some(self.rope.line_at_offset(start)?);
            trace!(start, end, inserted = text.len(), "direct edit");
        }

        let inserted_len = text.chars().count();
        let bulk = path == EditPath::Direct || changes_lines;
        if self.history.is_replaying() {
            // One replayed step may hold several edits; its notice covers all of them.
            let region = match self.dirty.region.take() {
                Some(previous) => widen_region(previous, start, end, inserted_len),
                None => start..start + inserted_len,
            };
            self.dirty.region = Some(region);
            self.dirty.line_structure_changed |= changes_lines;
        } else {
            self.dirty.region = Some(start..start + inserted_len);
            self.dirty.line_structure_changed = bulk;
        }
        self.dirty.selection_only = false;
        self.version += 1;

        let selection_after = selection_after.clamped(self.len());
        self.history.record(
            Operation::from_edit(
                start,
                removed.clone(),
                text.to_string(),
                selection_before,
                selection_after,
            ),
            now,
        );

        self.pending_before_len.get_or_insert(len_before);
        self.pending_edits.push(TextDeltaEdit {
            start,
            deleted_text: removed,
            inserted_text: text.to_string(),
        });

        // A caller-supplied selection may land on another line.
        if let Some(line) = self.buffer.as_ref().map(LineBuffer::line)
            && self.line_at_offset(selection_after.extent)? != line
        {
            self.commit_buffer()?;
        }
        self.selection = selection_after;

        if !self.history.is_replaying() {
            let delta = self.take_pending_delta();
            self.notify(ChangeKind::TextChanged, old_version, delta);
        }
        Ok(())
    }

    /// Write the line buffer back into the rope.
    fn commit_buffer(&mut self) -> Result<(), EditError> {
        self.flush_deadline = None;
        let Some(buffer) = &self.buffer else {
            return Ok(());
        };
        if buffer.is_dirty() {
            trace!(line = buffer.line(), len = buffer.len(), "flushing line buffer");
            buffer.commit(&mut self.rope)?;
            self.dirty.line = Some(buffer.line());
        }
        self.buffer = None;
        Ok(())
    }

    fn take_pending_delta(&mut self) -> Option<Arc<TextDelta>> {
        let before_char_count = self.pending_before_len.take()?;
        let delta = Arc::new(TextDelta {
            before_char_count,
            after_char_count: self.len(),
            edits: std::mem::take(&mut self.pending_edits),
        });
        self.last_text_delta = Some(Arc::clone(&delta));
        Some(delta)
    }

    fn notify(&mut self, kind: ChangeKind, old_version: u64, text_delta: Option<Arc<TextDelta>>) {
        if self.observers.is_empty() {
            return;
        }
        let notice = ChangeNotice {
            kind,
            old_version,
            new_version: self.version,
            selection: self.selection,
            dirty: self.dirty.clone(),
            text_delta,
        };
        for (_, callback) in &mut self.observers {
            callback(&notice);
        }
    }
}

/// Union of `previous` (mapped through the edit `start..end` -> `inserted` chars) and the
/// inserted span.
fn widen_region(
    previous: Range<usize>,
    start: usize,
    end: usize,
    inserted: usize,
) -> Range<usize> {
    let map = |pos: usize| {
        if pos <= start {
            pos
        } else if pos >= end {
            pos - (end - start) + inserted
        } else {
            start + inserted
        }
    };
    map(previous.start).min(start)..map(previous.end).max(start + inserted)
}

impl Default for DocumentSession {
    fn default() -> Self {
        Self::new("")
    }
}
