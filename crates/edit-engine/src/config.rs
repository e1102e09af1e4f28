//! Session configuration.

use edit_engine_lang::LanguageConfig;
use std::time::Duration;

/// Default delay before a buffered line is committed to the rope.
pub const DEFAULT_FLUSH_DELAY: Duration = Duration::from_millis(300);

/// Default window within which consecutive keystrokes share one undo step.
pub const DEFAULT_UNDO_GROUP_WINDOW: Duration = Duration::from_millis(750);

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 1000;

/// Tunables for a [`crate::DocumentSession`].
///
/// ```rust
/// use edit_engine::SessionConfig;
/// use std::time::Duration;
///
/// let config = SessionConfig::default()
///     .with_flush_delay(Duration::from_millis(100))
///     .with_auto_pairs(false);
/// assert!(!config.auto_pairs);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Debounce delay for committing the line buffer.
    pub flush_delay: Duration,
    /// Maximum pause between keystrokes that are still grouped into one undo step.
    pub undo_group_window: Duration,
    /// Maximum number of undo steps kept.
    pub max_undo: usize,
    /// Auto-close brackets and quotes, and type over closers.
    pub auto_pairs: bool,
    /// Carry indentation over on newline.
    pub auto_indent: bool,
    /// Pairs, indent unit and block openers.
    pub language: LanguageConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            flush_delay: DEFAULT_FLUSH_DELAY,
            undo_group_window: DEFAULT_UNDO_GROUP_WINDOW,
            max_undo: DEFAULT_MAX_UNDO,
            auto_pairs: true,
            auto_indent: true,
            language: LanguageConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Set the line-buffer flush delay.
    pub fn with_flush_delay(mut self, delay: Duration) -> Self {
        self.flush_delay = delay;
        self
    }

    /// Set the undo grouping window.
    pub fn with_undo_group_window(mut self, window: Duration) -> Self {
        self.undo_group_window = window;
        self
    }

    /// Set the maximum number of undo steps.
    pub fn with_max_undo(mut self, max_undo: usize) -> Self {
        self.max_undo = max_undo;
        self
    }

    /// Enable or disable auto-pairing.
    pub fn with_auto_pairs(mut self, enabled: bool) -> Self {
        self.auto_pairs = enabled;
        self
    }

    /// Enable or disable newline auto-indentation.
    pub fn with_auto_indent(mut self, enabled: bool) -> Self {
        self.auto_indent = enabled;
        self
    }

    /// Replace the language configuration.
    pub fn with_language(mut self, language: LanguageConfig) -> Self {
        self.language = language;
        self
    }
}
