use edit_engine::{DocumentSession, Selection};
use pretty_assertions::assert_eq;

#[test]
fn test_backspace_removes_combining_cluster() {
    // "e\u{301}" is "e" + combining acute accent; one extended grapheme cluster.
    let mut session = DocumentSession::new("xe\u{301}");
    session.set_selection(Selection::caret(3)).unwrap();
    session.backspace().unwrap();
    assert_eq!(&*session.text(), "x");
    assert_eq!(session.selection(), Selection::caret(1));
}

#[test]
fn test_delete_removes_emoji_cluster() {
    // Family emoji joined with ZWJ: 5 scalar values, one grapheme.
    let family = "👨\u{200d}👩\u{200d}👧";
    let mut session = DocumentSession::new(&format!("{family}!"));
    session.set_selection(Selection::caret(0)).unwrap();
    session.delete().unwrap();
    assert_eq!(&*session.text(), "!");
}

#[test]
fn test_offsets_are_scalar_values() {
    let mut session = DocumentSession::new("日本\n語");
    assert_eq!(session.len(), 4);
    assert_eq!(session.line_start_offset(1).unwrap(), 3);

    session.insert_at(1, "ß", Selection::caret(2)).unwrap();
    assert_eq!(session.substring(1, 3).unwrap(), "ß本");
    assert_eq!(session.line_text(0).unwrap(), "日ß本");
    assert_eq!(session.line_at_offset(4).unwrap(), 1);
}
