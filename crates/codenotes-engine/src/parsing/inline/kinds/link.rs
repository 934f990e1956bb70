/// An inline link, `[text](url)`.
pub struct Link;

impl Link {
    pub const OPEN: u8 = b'[';
    /// Separates the link text from the destination.
    pub const MIDDLE: &'static [u8] = b"](";
    pub const CLOSE: u8 = b')';
}
