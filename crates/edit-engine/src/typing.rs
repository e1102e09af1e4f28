//! Keystroke planning: auto-pairing, type-over and newline indentation.
//!
//! The planner is pure. The session gathers the context around the edit and applies the
//! returned [`TypingPlan`].

use crate::config::SessionConfig;
use crate::search::is_word_char;
use crate::selection::Selection;
use edit_engine_lang::LanguageConfig;
use unicode_segmentation::UnicodeSegmentation;

/// Text around a pending single-character edit.
#[derive(Debug)]
pub(crate) struct TypingContext<'a> {
    /// Start of the replaced range.
    pub start: usize,
    /// End of the replaced range.
    pub end: usize,
    /// Text of the line containing `start`, up to `start`.
    pub prefix: &'a str,
    /// Character before `start` (`'\n'` at the start of a non-first line).
    pub prev: Option<char>,
    /// Character at `end`.
    pub next: Option<char>,
    /// Currently selected text (`start..end`).
    pub selected: &'a str,
}

/// What a keystroke turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TypingPlan {
    /// Move the caret over an existing closer instead of inserting.
    TypeOver { caret: usize },
    /// Replace `start..end` with `text` and select `selection`.
    Edit {
        start: usize,
        end: usize,
        text: String,
        selection: Selection,
    },
}

/// Plan a single typed character. `None` means a plain insertion.
pub(crate) fn plan(
    ch: char,
    ctx: &TypingContext<'_>,
    config: &SessionConfig,
) -> Option<TypingPlan> {
    let lang = &config.language;
    if config.auto_pairs {
        let caret = ctx.start == ctx.end;
        if caret && ctx.next == Some(ch) && lang.pair_for_close(ch).is_some() {
            return Some(TypingPlan::TypeOver {
                caret: ctx.start + 1,
            });
        }
        if let Some(pair) = lang.pair_for_open(ch)
            && !(caret && pair.is_symmetric() && ctx.prev.is_some_and(is_word_char))
        {
            let selected_len = ctx.selected.chars().count();
            let mut text = String::with_capacity(ctx.selected.len() + 2);
            text.push(pair.open);
            text.push_str(ctx.selected);
            text.push(pair.close);
            return Some(TypingPlan::Edit {
                start: ctx.start,
                end: ctx.end,
                text,
                selection: Selection::new(ctx.start + 1, ctx.start + 1 + selected_len),
            });
        }
    }
    if ch == '\n' && config.auto_indent {
        return Some(newline_plan(ctx, lang));
    }
    None
}

fn newline_plan(ctx: &TypingContext<'_>, lang: &LanguageConfig) -> TypingPlan {
    let indent: String = ctx
        .prefix
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();

    let between_pair = ctx.start == ctx.end
        && matches!(
            (ctx.prev, ctx.next),
            (Some(open), Some(close)) if open != close && lang.is_pair(open, close)
        );
    if between_pair {
        let inner = format!("{indent}{}", lang.indent_unit);
        let caret = ctx.start + 1 + inner.chars().count();
        return TypingPlan::Edit {
            start: ctx.start,
            end: ctx.end,
            text: format!("\n{inner}\n{indent}"),
            selection: Selection::caret(caret),
        };
    }

    let opens_block = ctx
        .prefix
        .trim_end()
        .chars()
        .next_back()
        .is_some_and(|c| lang.opens_block(c));
    let text = if opens_block {
        format!("\n{indent}{}", lang.indent_unit)
    } else {
        format!("\n{indent}")
    };
    let caret = ctx.start + text.chars().count();
    TypingPlan::Edit {
        start: ctx.start,
        end: ctx.end,
        text,
        selection: Selection::caret(caret),
    }
}

/// Length in characters of the last grapheme cluster of `text`.
pub(crate) fn last_grapheme_len(text: &str) -> usize {
    text.graphemes(true)
        .next_back()
        .map_or(0, |g| g.chars().count())
}

/// Length in characters of the first grapheme cluster of `text`.
pub(crate) fn first_grapheme_len(text: &str) -> usize {
    text.graphemes(true).next().map_or(0, |g| g.chars().count())
}
