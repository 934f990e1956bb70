/// A byte cursor for hand-written scanners (inline markup, HTML tokens).
///
/// Operates over a string slice while tracking the absolute byte position
/// (via `base` offset) so spans can point into a larger buffer. Delimiters
/// the scanners look for are all ASCII, so positions where a scanner stops on
/// a delimiter are always char boundaries.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Base offset added to local indices for absolute positions.
    pub base: usize,
    /// Current local index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str, base: usize) -> Self {
        Self { s, base, i: 0 }
    }

    /// Returns the current absolute byte position (base + local index).
    pub fn pos(&self) -> usize {
        self.base + self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Peeks `n` bytes ahead of the current one.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    /// Checks if the remaining input starts with the given byte pattern.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes().get(self.i..).is_some_and(|rest| rest.starts_with(pat))
    }

    /// ASCII case-insensitive [`Cursor::starts_with`].
    pub fn starts_with_ignore_case(&self, pat: &[u8]) -> bool {
        self.s
            .as_bytes()
            .get(self.i..self.i + pat.len())
            .is_some_and(|rest| rest.eq_ignore_ascii_case(pat))
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.s.as_bytes().get(self.i).copied()?;
        self.i += 1;
        Some(b)
    }

    /// Advances by `n` bytes.
    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Advances while `pred` holds for the current byte.
    pub fn bump_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.i += 1;
        }
    }

    /// Advances to the next occurrence of `pat`, or to the end.
    /// Returns true when `pat` was found (cursor left on its first byte).
    pub fn seek(&mut self, pat: &[u8]) -> bool {
        while !self.eof() {
            if self.starts_with(pat) {
                return true;
            }
            self.i += 1;
        }
        false
    }

    /// Local text between `start` (a local index) and the cursor.
    pub fn slice_from(&self, start: usize) -> &'a str {
        self.s.get(start..self.i.min(self.s.len())).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cur = Cursor::new("hello", 10);
        assert_eq!(cur.pos(), 10);
        assert!(!cur.eof());
        assert_eq!(cur.peek(), Some(b'h'));
        assert_eq!(cur.bump(), Some(b'h'));
        assert_eq!(cur.pos(), 11);
        assert_eq!(cur.peek_at(1), Some(b'l'));
    }

    #[test]
    fn cursor_starts_with() {
        let cur = Cursor::new("**bold**", 0);
        assert!(cur.starts_with(b"**"));
        assert!(!cur.starts_with(b"[["));
    }

    #[test]
    fn empty_string_input() {
        let cur = Cursor::new("", 0);
        assert!(cur.eof());
        assert_eq!(cur.peek(), None);
        assert_eq!(cur.pos(), 0);
    }

    #[test]
    fn starts_with_pattern_longer_than_remaining() {
        let mut cur = Cursor::new("ab", 0);
        assert!(!cur.starts_with(b"abcdef"));

        cur.bump();
        assert!(!cur.starts_with(b"bc"));
        assert!(cur.starts_with(b"b"));
    }

    #[test]
    fn starts_with_past_end_does_not_panic() {
        let mut cur = Cursor::new("hi", 0);
        cur.bump_n(10);
        assert!(cur.eof());
        assert!(!cur.starts_with(b"a"));
        assert!(!cur.starts_with_ignore_case(b"a"));
        assert_eq!(cur.slice_from(0), "hi");
    }

    #[test]
    fn starts_with_ignore_case_matches_mixed_case() {
        let cur = Cursor::new("</SCRIPT>", 0);
        assert!(cur.starts_with_ignore_case(b"</script"));
    }

    #[test]
    fn seek_and_slice() {
        let mut cur = Cursor::new("abc-->rest", 0);
        assert!(cur.seek(b"-->"));
        assert_eq!(cur.slice_from(0), "abc");

        let mut cur = Cursor::new("no end", 0);
        assert!(!cur.seek(b"-->"));
        assert!(cur.eof());
    }

    #[test]
    fn bump_while_stops_at_predicate() {
        let mut cur = Cursor::new("   x", 0);
        cur.bump_while(|b| b.is_ascii_whitespace());
        assert_eq!(cur.peek(), Some(b'x'));
    }

    #[test]
    fn bump_at_eof_returns_none() {
        let mut cur = Cursor::new("x", 0);
        assert_eq!(cur.bump(), Some(b'x'));
        assert_eq!(cur.bump(), None);
        assert_eq!(cur.bump(), None);
    }
}
