use edit_engine::{DocumentSession, LineEnding, Selection};
use pretty_assertions::assert_eq;

#[test]
fn test_crlf_is_normalized_on_load_and_preserved_for_saving() {
    let session = DocumentSession::new("a\r\nb\r\n");

    // Internal storage is LF-only.
    assert_eq!(&*session.text(), "a\nb\n");
    assert_eq!(session.line_count(), 3);

    assert_eq!(session.line_ending(), LineEnding::Crlf);
    assert_eq!(session.text_for_saving(), "a\r\nb\r\n");
}

#[test]
fn test_insert_normalizes_crlf_to_lf() {
    let mut session = DocumentSession::new("");
    session.insert_at(0, "a\r\nb\rc", Selection::caret(5)).unwrap();

    assert_eq!(&*session.text(), "a\nb\nc");
    assert_eq!(session.line_ending(), LineEnding::Lf);
    assert_eq!(session.text_for_saving(), "a\nb\nc");
}

#[test]
fn test_line_ending_can_be_changed() {
    let mut session = DocumentSession::new("x\ny");
    session.set_line_ending(LineEnding::Crlf);
    assert_eq!(session.text_for_saving(), "x\r\ny");

    session.set_text("p\nq");
    assert_eq!(session.line_ending(), LineEnding::Lf);
}
