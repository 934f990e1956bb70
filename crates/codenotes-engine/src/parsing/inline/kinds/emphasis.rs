/// Bold text, `**text**`.
pub struct Strong;

impl Strong {
    pub const DELIM: &'static [u8] = b"**";
}

/// Italic text, `*text*`.
pub struct Emphasis;

impl Emphasis {
    pub const DELIM: u8 = b'*';
}
