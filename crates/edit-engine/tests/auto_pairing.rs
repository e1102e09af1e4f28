use edit_engine::{BracketPair, DocumentSession, LanguageConfig, Selection, SessionConfig};
use pretty_assertions::assert_eq;

#[test]
fn test_opener_inserts_closer() {
    let mut session = DocumentSession::new("");
    session.insert_at(0, "(", Selection::caret(1)).unwrap();
    assert_eq!(&*session.text(), "()");
    assert_eq!(session.selection(), Selection::caret(1));
}

#[test]
fn test_closer_types_over() {
    let mut session = DocumentSession::new("");
    session.type_text("[").unwrap();
    session.type_text("x").unwrap();
    let version = session.version();
    session.type_text("]").unwrap();

    assert_eq!(&*session.text(), "[x]");
    assert_eq!(session.selection(), Selection::caret(3));
    assert_eq!(session.version(), version);
}

#[test]
fn test_quotes_pair_and_type_over() {
    let mut session = DocumentSession::new("x = ");
    session.set_selection(Selection::caret(4)).unwrap();
    session.type_text("\"").unwrap();
    assert_eq!(&*session.text(), "x = \"\"");
    session.type_text("hi").unwrap();
    session.type_text("\"").unwrap();
    assert_eq!(&*session.text(), "x = \"hi\"");
    assert_eq!(session.selection(), Selection::caret(8));
}

#[test]
fn test_quote_after_word_is_not_paired() {
    let mut session = DocumentSession::new("don");
    session.set_selection(Selection::caret(3)).unwrap();
    session.type_text("'").unwrap();
    assert_eq!(&*session.text(), "don'");
}

#[test]
fn test_opener_wraps_selection() {
    let mut session = DocumentSession::new("call value");
    session.set_selection(Selection::new(5, 10)).unwrap();
    session.type_text("(").unwrap();
    assert_eq!(&*session.text(), "call (value)");
    assert_eq!(session.selection(), Selection::new(6, 11));
}

#[test]
fn test_backspace_inside_empty_pair_removes_both() {
    let mut session = DocumentSession::new("");
    session.type_text("{").unwrap();
    session.backspace().unwrap();
    assert_eq!(&*session.text(), "");

    // Only an adjacent pair is removed.
    session.set_text("(a)");
    session.set_selection(Selection::caret(2)).unwrap();
    session.backspace().unwrap();
    assert_eq!(&*session.text(), "()");
}

#[test]
fn test_disabled_pairs_insert_verbatim() {
    let config = SessionConfig::default().with_auto_pairs(false);
    let mut session = DocumentSession::with_config("", config);
    session.type_text("(").unwrap();
    session.type_text(")").unwrap();
    assert_eq!(&*session.text(), "()");
    assert_eq!(session.selection(), Selection::caret(2));

    session.set_selection(Selection::caret(1)).unwrap();
    session.type_text(")").unwrap();
    assert_eq!(&*session.text(), "())");
}

#[test]
fn test_custom_pairs() {
    let language = LanguageConfig::new(vec![BracketPair::new('<', '>')], "  ");
    let config = SessionConfig::default().with_language(language);
    let mut session = DocumentSession::with_config("", config);
    session.type_text("<").unwrap();
    session.type_text("(").unwrap();
    assert_eq!(&*session.text(), "<(>");
}

#[test]
fn test_paired_insert_undoes_in_one_step() {
    let mut session = DocumentSession::new("");
    session.type_text("(").unwrap();
    session.undo().unwrap();
    assert_eq!(&*session.text(), "");
    assert_eq!(session.selection(), Selection::caret(0));
}
