//! Selection (base/extent) in character offsets.

/// A selection range.
///
/// `base` is the anchored end and `extent` the moving end, so a reversed selection
/// (`base > extent`) is meaningful and is never normalized away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Anchored end (character offset).
    pub base: usize,
    /// Moving end (character offset).
    pub extent: usize,
}

impl Selection {
    /// Create a selection from `base` to `extent`.
    pub const fn new(base: usize, extent: usize) -> Self {
        Self { base, extent }
    }

    /// Create a collapsed selection at `offset`.
    pub const fn caret(offset: usize) -> Self {
        Self {
            base: offset,
            extent: offset,
        }
    }

    /// Returns `true` if base and extent coincide.
    pub fn is_caret(&self) -> bool {
        self.base == self.extent
    }

    /// Returns `true` if the moving end lies before the anchor.
    pub fn is_reversed(&self) -> bool {
        self.base > self.extent
    }

    /// Smaller of the two ends.
    pub fn start(&self) -> usize {
        self.base.min(self.extent)
    }

    /// Larger of the two ends.
    pub fn end(&self) -> usize {
        self.base.max(self.extent)
    }

    /// Clamp both ends into `[0, len]`, keeping the direction.
    pub fn clamped(self, len: usize) -> Self {
        Self {
            base: self.base.min(len),
            extent: self.extent.min(len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_selection_keeps_direction() {
        let sel = Selection::new(8, 3);
        assert!(sel.is_reversed());
        assert_eq!((sel.start(), sel.end()), (3, 8));

        let clamped = sel.clamped(5);
        assert_eq!(clamped, Selection::new(5, 3));
        assert!(clamped.is_reversed());
    }

    #[test]
    fn test_caret() {
        let sel = Selection::caret(4);
        assert!(sel.is_caret());
        assert_eq!(sel.clamped(2), Selection::caret(2));
    }
}
