#![warn(missing_docs)]
//! Edit Engine - Headless Text Editing Core
//!
//! # Overview
//!
//! `edit-engine` holds the text of a document and performs edits on it. It has no rendering,
//! layout or file I/O; a host drives it with edits and selection changes and reads back text,
//! lines and change notifications.
//!
//! # Core Features
//!
//! - **Balanced Rope Storage**: AVL rope with O(log n) insert, delete and line lookup
//! - **Line Buffering**: fast-path overlay for edits confined to one line, flushed on a debounce
//! - **Undo/Redo**: reversible operations, keystroke grouping, compound steps
//! - **Typing Rules**: auto-closing pairs, type-over and newline indentation
//! - **State Tracking**: version counter, dirty regions and change notifications
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  DocumentSession (edits, selection, notify) │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Typing rules        │  Undo/Redo log       │
//! ├─────────────────────────────────────────────┤
//! │  Line buffer (single-line overlay)          │
//! ├─────────────────────────────────────────────┤
//! │  Rope (AVL, char offsets, newline counts)   │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use edit_engine::{DocumentSession, Selection};
//!
//! let mut session = DocumentSession::new("fn main() ");
//! session.set_selection(Selection::caret(10)).unwrap();
//!
//! // Typing an opener inserts the pair; Enter between the pair opens an indented block.
//! session.type_text("{").unwrap();
//! session.type_text("\n").unwrap();
//! assert_eq!(&*session.text(), "fn main() {\n    \n}");
//! assert_eq!(session.line_at_offset(session.selection().extent).unwrap(), 1);
//!
//! session.undo().unwrap();
//! assert_eq!(&*session.text(), "fn main() {}");
//! ```
//!
//! # Module Description
//!
//! - [`rope`] - Balanced rope text storage
//! - [`line_buffer`] - Single-line edit overlay
//! - [`history`] - Undo/redo log
//! - [`operation`] - Reversible edit operations
//! - [`session`] - Document session (public editing API)
//! - [`search`] - Find helpers
//!
//! # Unicode Support
//!
//! - All offsets are Unicode scalar value (char) offsets
//! - Backspace and delete remove whole grapheme clusters
//! - Text is stored with LF newlines; CRLF input is normalized and restored on save

pub mod clock;
pub mod config;
pub mod delta;
pub mod error;
pub mod history;
pub mod line_buffer;
pub mod line_ending;
pub mod operation;
pub mod rope;
pub mod search;
pub mod selection;
pub mod session;
mod typing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SessionConfig;
pub use delta::{TextDelta, TextDeltaEdit};
pub use edit_engine_lang::{BracketPair, LanguageConfig};
pub use error::{EditError, RopeError, SearchError};
pub use history::UndoRedoLog;
pub use line_buffer::LineBuffer;
pub use line_ending::LineEnding;
pub use operation::Operation;
pub use rope::{Chunks, LEAF_SIZE, Rope};
pub use search::{SearchMatch, SearchOptions};
pub use selection::Selection;
pub use session::{
    ChangeCallback, ChangeKind, ChangeNotice, DirtyState, DocumentSession, SubscriptionId,
};
