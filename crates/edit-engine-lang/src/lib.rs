#![warn(missing_docs)]
//! `edit-engine-lang` - data-driven language configuration helpers for `edit-engine`.
//!
//! This crate intentionally stays lightweight and does **not** depend on any parsing or
//! highlighting system. It provides small structs that hosts can use to configure the
//! engine's typing behavior (auto-closing pairs, newline indentation) per language.

/// An auto-closing character pair (e.g. `(` / `)` or `"` / `"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketPair {
    /// Opening character.
    pub open: char,
    /// Closing character.
    pub close: char,
}

impl BracketPair {
    /// Create a new pair.
    pub const fn new(open: char, close: char) -> Self {
        Self { open, close }
    }

    /// Returns `true` if both ends are the same character (quotes).
    pub fn is_symmetric(&self) -> bool {
        self.open == self.close
    }
}

/// Typing-related configuration for a given language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Pairs that are auto-closed when their opener is typed.
    pub pairs: Vec<BracketPair>,
    /// Text inserted for one level of indentation.
    pub indent_unit: String,
    /// Characters that, when ending the text before a newline, open an indented block.
    pub block_openers: Vec<char>,
}

impl LanguageConfig {
    /// Create a config with the given pairs and indent unit, and the default block openers.
    pub fn new(pairs: Vec<BracketPair>, indent_unit: impl Into<String>) -> Self {
        Self {
            pairs,
            indent_unit: indent_unit.into(),
            block_openers: vec![':', '{', '(', '['],
        }
    }

    /// A config with no auto-closing pairs.
    pub fn plain_text() -> Self {
        Self::new(Vec::new(), "    ")
    }

    /// Replace the indent unit (e.g. `"\t"` or `"  "`).
    pub fn with_indent_unit(mut self, unit: impl Into<String>) -> Self {
        self.indent_unit = unit.into();
        self
    }

    /// Replace the set of block-opening characters.
    pub fn with_block_openers(mut self, openers: impl IntoIterator<Item = char>) -> Self {
        self.block_openers = openers.into_iter().collect();
        self
    }

    /// Find the pair whose opener is `ch`.
    pub fn pair_for_open(&self, ch: char) -> Option<BracketPair> {
        self.pairs.iter().copied().find(|p| p.open == ch)
    }

    /// Find the pair whose closer is `ch`.
    pub fn pair_for_close(&self, ch: char) -> Option<BracketPair> {
        self.pairs.iter().copied().find(|p| p.close == ch)
    }

    /// Returns `true` if `open` followed by `close` forms a configured pair.
    pub fn is_pair(&self, open: char, close: char) -> bool {
        self.pairs.iter().any(|p| p.open == open && p.close == close)
    }

    /// Returns `true` if `ch` opens an indented block when it ends a line.
    pub fn opens_block(&self, ch: char) -> bool {
        self.block_openers.contains(&ch)
    }
}

impl Default for LanguageConfig {
    /// Brackets and quotes common to C-like languages, four-space indentation.
    fn default() -> Self {
        Self::new(
            vec![
                BracketPair::new('(', ')'),
                BracketPair::new('[', ']'),
                BracketPair::new('{', '}'),
                BracketPair::new('"', '"'),
                BracketPair::new('\'', '\''),
            ],
            "    ",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pairs() {
        let config = LanguageConfig::default();
        assert_eq!(config.pair_for_open('{'), Some(BracketPair::new('{', '}')));
        assert_eq!(config.pair_for_close(']'), Some(BracketPair::new('[', ']')));
        assert!(config.pair_for_open('<').is_none());
        assert!(config.is_pair('(', ')'));
        assert!(!config.is_pair('(', ']'));
    }

    #[test]
    fn test_symmetric_quotes() {
        let config = LanguageConfig::default();
        assert!(config.pair_for_open('"').unwrap().is_symmetric());
        assert!(!config.pair_for_open('(').unwrap().is_symmetric());
    }

    #[test]
    fn test_block_openers() {
        let config = LanguageConfig::plain_text().with_block_openers(['{']);
        assert!(config.opens_block('{'));
        assert!(!config.opens_block(':'));
        assert!(config.pairs.is_empty());
    }
}
