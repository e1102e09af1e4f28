//! Typing session example
//!
//! Drives a `DocumentSession` the way an editor front end would and prints the change
//! notifications. Run with `RUST_LOG=edit_engine=trace` to see the engine's own logging.

use edit_engine::{DocumentSession, SearchOptions, Selection};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut session = DocumentSession::new("fn main() ");
    session.subscribe(|notice| {
        println!(
            "  {:?} (version: {} -> {}), dirty line {:?}",
            notice.kind, notice.old_version, notice.new_version, notice.dirty.line
        );
    });

    println!("1. Typing a block:");
    session.set_selection(Selection::caret(10)).unwrap();
    for key in ["{", "\n", "l", "e", "t", " ", "x", " ", "=", " ", "(", "1", ")", ";"] {
        session.type_text(key).unwrap();
    }
    println!("{}", session.text());

    println!("\n2. Line buffer before flush: {:?}", session.line_buffer().map(|b| b.text()));
    session.flush().unwrap();
    println!("   after flush: {:?}", session.line_buffer().map(|b| b.text()));

    println!("\n3. Find:");
    for m in session.find_all("x", SearchOptions::default()) {
        println!("  match at {}..{}", m.start, m.end);
    }

    println!("\n4. Undo:");
    while session.undo().unwrap() {
        println!("{:?}", &*session.text());
    }
}
