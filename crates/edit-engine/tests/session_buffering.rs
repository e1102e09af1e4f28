use edit_engine::{DocumentSession, ManualClock, Selection, SessionConfig};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn session_with_clock(text: &str) -> (DocumentSession, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let session = DocumentSession::new(text).with_clock(clock.clone());
    (session, clock)
}

#[test]
fn test_insert_into_empty_document() {
    let mut session = DocumentSession::new("");
    session.insert_at(0, "hello", Selection::caret(5)).unwrap();

    assert_eq!(&*session.text(), "hello");
    assert_eq!(session.len(), 5);
    assert_eq!(session.line_count(), 1);
    assert_eq!(session.line_at_offset(3).unwrap(), 0);
    assert_eq!(session.selection(), Selection::caret(5));
    assert_eq!(session.version(), 1);
}

#[test]
fn test_cross_line_delete_joins_lines() {
    let mut session = DocumentSession::new("ab\ncd");
    session.delete_range(1, 4, Selection::caret(1)).unwrap();

    assert_eq!(&*session.text(), "ad");
    assert_eq!(session.line_count(), 1);
    assert!(session.dirty().line_structure_changed);
}

#[test]
fn test_flush_is_idempotent() {
    let mut session = DocumentSession::new("abc\ndef");
    session.insert_at(5, "XX", Selection::caret(7)).unwrap();
    let before = session.text().to_string();
    let version = session.version();

    session.flush().unwrap();
    assert_eq!(&*session.text(), before);
    session.flush().unwrap();
    assert_eq!(&*session.text(), before);
    assert_eq!(session.version(), version);
    assert!(session.line_buffer().is_none());
    assert_eq!(session.flushed_rope().unwrap().text(), before);
}

#[test]
fn test_logical_view_matches_flushed_view() {
    let mut session = DocumentSession::new("first\nsecond\nthird\n");
    session.insert_at(8, "++", Selection::caret(10)).unwrap();
    session.delete_range(6, 7, Selection::caret(6)).unwrap();
    assert!(session.line_buffer().is_some());

    let logical: Vec<(usize, String)> = (0..session.line_count())
        .map(|line| {
            (
                session.line_start_offset(line).unwrap(),
                session.line_text(line).unwrap(),
            )
        })
        .collect();
    let offsets: Vec<usize> = (0..=session.len())
        .map(|pos| session.line_at_offset(pos).unwrap())
        .collect();
    let text = session.text().to_string();
    assert_eq!(text.chars().count(), session.len());

    session.flush().unwrap();
    let rope = session.flushed_rope().unwrap();
    assert_eq!(rope.text(), text);
    for (line, (start, content)) in logical.iter().enumerate() {
        assert_eq!(rope.line_start_offset(line).unwrap(), *start);
        assert_eq!(&rope.line_text(line).unwrap(), content);
    }
    for (pos, line) in offsets.iter().enumerate() {
        assert_eq!(rope.line_at_offset(pos).unwrap(), *line);
    }
}

#[test]
fn test_newline_edit_bypasses_buffer() {
    let config = SessionConfig::default().with_auto_indent(false);
    let mut session = DocumentSession::with_config("ab", config);
    session.insert_at(1, "\n", Selection::caret(2)).unwrap();
    assert!(session.line_buffer().is_none());
    assert_eq!(session.line_count(), 2);
}

#[test]
fn test_debounced_flush() {
    let clock = Arc::new(ManualClock::new());
    let config = SessionConfig::default().with_flush_delay(Duration::from_millis(100));
    let mut session = DocumentSession::with_config("x", config).with_clock(clock.clone());

    session.insert_at(1, "y", Selection::caret(2)).unwrap();
    let first_deadline = session.flush_deadline().unwrap();
    clock.advance(Duration::from_millis(60));
    session.insert_at(2, "z", Selection::caret(3)).unwrap();
    // Each edit pushes the deadline out.
    assert!(session.flush_deadline().unwrap() > first_deadline);

    clock.advance(Duration::from_millis(60));
    assert!(!session.poll_flush().unwrap());
    assert!(session.line_buffer().is_some());

    clock.advance(Duration::from_millis(40));
    assert!(session.poll_flush().unwrap());
    assert!(session.line_buffer().is_none());
    assert_eq!(session.flush_deadline(), None);
    assert_eq!(&*session.text(), "xyz");
}

#[test]
fn test_dirty_tracking_and_version() {
    let (mut session, _) = session_with_clock("one\ntwo");
    assert!(session.dirty().is_clean());

    session.insert_at(4, "T", Selection::caret(5)).unwrap();
    assert_eq!(session.version(), 1);
    assert_eq!(session.dirty().line, Some(1));
    assert_eq!(session.dirty().region, Some(4..5));
    assert!(!session.dirty().line_structure_changed);

    session.clear_dirty_region();
    session.set_selection(Selection::caret(0)).unwrap();
    assert_eq!(session.version(), 1);
    // Leaving the buffered line flushes it, which marks that line.
    assert_eq!(session.dirty().line, Some(1));
    assert!(!session.dirty().selection_only);

    session.clear_dirty_region();
    session.set_selection(Selection::caret(2)).unwrap();
    assert!(session.dirty().selection_only);
    assert_eq!(session.version(), 1);
    assert!(!session.has_changed_since(1));
}

#[test]
fn test_selection_is_clamped() {
    let (mut session, _) = session_with_clock("abc");
    session.set_selection(Selection::new(10, 1)).unwrap();
    assert_eq!(session.selection(), Selection::new(3, 1));
    assert!(session.selection().is_reversed());

    session.insert_at(0, "x", Selection::caret(99)).unwrap();
    assert_eq!(session.selection(), Selection::caret(4));
}

#[test]
fn test_replace_range_is_direct() {
    let (mut session, _) = session_with_clock("hello world");
    session.replace_range(6, 11, "there", Selection::caret(11)).unwrap();
    assert!(session.line_buffer().is_none());
    assert_eq!(&*session.text(), "hello there");
    // A paste without newlines still invalidates line structure.
    assert!(session.dirty().line_structure_changed);
    assert_eq!(session.dirty().region, Some(6..11));
}
