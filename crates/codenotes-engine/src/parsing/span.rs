/// A byte range `[start, end)` into a block's content.
///
/// Parsed inline nodes store spans rather than copied text: slicing the
/// content with any span reproduces the exact source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// The text covered by this span, or `""` when it is out of bounds or
    /// not on a char boundary.
    pub fn slice(self, s: &str) -> &str {
        s.get(self.start..self.end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_reproduces_source() {
        let s = "say **hi**";
        assert_eq!(Span::new(4, 10).slice(s), "**hi**");
        assert_eq!(Span::new(4, 10).len(), 6);
    }

    #[test]
    fn slice_out_of_bounds_is_empty() {
        assert_eq!(Span::new(3, 40).slice("abc"), "");
        assert!(Span::new(5, 2).is_empty());
    }
}
