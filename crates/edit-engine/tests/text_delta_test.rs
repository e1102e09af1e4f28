use edit_engine::{DocumentSession, Selection, TextDeltaEdit};
use pretty_assertions::assert_eq;

#[test]
fn test_insert_produces_text_delta() {
    let mut session = DocumentSession::new("abc");
    session.insert_at(1, "X", Selection::caret(2)).unwrap();

    let delta = session.last_text_delta().unwrap();
    assert_eq!(delta.before_char_count, 3);
    assert_eq!(delta.after_char_count, 4);
    assert_eq!(
        delta.edits,
        vec![TextDeltaEdit {
            start: 1,
            deleted_text: String::new(),
            inserted_text: "X".to_string(),
        }]
    );
}

#[test]
fn test_delete_delta_carries_removed_text() {
    let mut session = DocumentSession::new("one\ntwo");
    session.delete_range(2, 5, Selection::caret(2)).unwrap();

    let delta = session.take_last_text_delta().unwrap();
    assert_eq!(delta.edits[0].deleted_text, "e\nt");
    assert_eq!(delta.apply_to("one\ntwo"), "onwo");
    assert!(session.last_text_delta().is_none());
}

#[test]
fn test_compound_undo_delta_replays_all_edits() {
    let mut session = DocumentSession::new("a\nb");
    session
        .compound(|s| {
            s.insert_at(0, "- ", Selection::caret(2))?;
            s.insert_at(4, "- ", Selection::caret(6))
        })
        .unwrap();
    let after = session.text().to_string();
    assert_eq!(after, "- a\n- b");

    session.undo().unwrap();
    let delta = session.last_text_delta().unwrap();
    assert_eq!(delta.edits.len(), 2);
    assert_eq!(delta.before_char_count, 7);
    assert_eq!(delta.after_char_count, 3);
    assert_eq!(delta.apply_to(&after), "a\nb");
}

#[test]
fn test_type_over_produces_no_delta() {
    let mut session = DocumentSession::new("");
    session.type_text("(").unwrap();
    session.take_last_text_delta();
    session.type_text(")").unwrap();
    assert!(session.last_text_delta().is_none());
    assert_eq!(&*session.text(), "()");
}
