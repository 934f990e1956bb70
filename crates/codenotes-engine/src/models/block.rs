use std::fmt;

use serde::{Deserialize, Serialize};

/// Deepest indent a list row can reach (visual levels `0..=3`).
pub const MAX_LIST_LEVEL: u8 = 3;

/// Highest heading rank understood by the nested document format.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Stable identifier of a block within one document.
///
/// Ids are handed out by the owning [`Document`](super::Document) from a
/// monotonic counter and are never reused within a session, even after the
/// block that carried them has been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The type tag of a block, without any type-specific payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Text,
    Heading,
    Bullet,
    Numbered,
    Todo,
    Code,
    Quote,
    Divider,
    Image,
    Video,
}

impl BlockType {
    pub const ALL: [BlockType; 10] = [
        BlockType::Text,
        BlockType::Heading,
        BlockType::Bullet,
        BlockType::Numbered,
        BlockType::Todo,
        BlockType::Code,
        BlockType::Quote,
        BlockType::Divider,
        BlockType::Image,
        BlockType::Video,
    ];

    /// Name used in the flat JSON form (`"type"` field).
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Heading => "heading",
            BlockType::Bullet => "bullet",
            BlockType::Numbered => "numbered",
            BlockType::Todo => "todo",
            BlockType::Code => "code",
            BlockType::Quote => "quote",
            BlockType::Divider => "divider",
            BlockType::Image => "image",
            BlockType::Video => "video",
        }
    }

    /// Looks up a type by its stored name.
    ///
    /// Accepts the names written by older editor versions
    /// (`image-with-description`, `youtube-with-description`, `sub-bullet`).
    /// Use [`BlockType::legacy_level`] to recover the indent implied by a
    /// legacy name.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "text" | "paragraph" => BlockType::Text,
            "heading" => BlockType::Heading,
            "bullet" | "sub-bullet" => BlockType::Bullet,
            "numbered" => BlockType::Numbered,
            "todo" => BlockType::Todo,
            "code" => BlockType::Code,
            "quote" => BlockType::Quote,
            "divider" => BlockType::Divider,
            "image" | "image-with-description" => BlockType::Image,
            "video" | "youtube" | "youtube-with-description" => BlockType::Video,
            _ => return None,
        };
        Some(ty)
    }

    /// Indent implied by a legacy type name, if any.
    pub fn legacy_level(name: &str) -> Option<u8> {
        (name == "sub-bullet").then_some(1)
    }

    /// List rows carry an indent level and take part in Tab/Shift+Tab.
    pub fn is_list(self) -> bool {
        matches!(self, BlockType::Bullet | BlockType::Numbered | BlockType::Todo)
    }

    pub fn is_media(self) -> bool {
        matches!(self, BlockType::Image | BlockType::Video)
    }

    /// Whether the block has editable inline text.
    pub fn has_text(self) -> bool {
        !matches!(self, BlockType::Divider) && !self.is_media()
    }

    /// Display-only hint shown while the block is empty.
    pub fn placeholder(self) -> &'static str {
        match self {
            BlockType::Text => "Type something...",
            BlockType::Heading => "Heading",
            BlockType::Bullet | BlockType::Numbered => "List item",
            BlockType::Todo => "Task item",
            BlockType::Code => "Write your code here...",
            BlockType::Quote => "Quote",
            BlockType::Divider | BlockType::Image | BlockType::Video => "",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of an image block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageData {
    pub src: String,
    pub alt: String,
    pub description: String,
}

/// Payload of an embedded video block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoData {
    pub video_id: String,
    pub video_url: String,
    pub description: String,
}

/// Block type together with the fields that are only meaningful for it.
///
/// Encoding the per-type fields in the variant keeps "absent" distinct from
/// "zero": a quote can never carry a list level, and a todo always has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Text,
    /// Heading rank `1..=6`.
    Heading {
        level: u8,
    },
    Bullet {
        level: u8,
    },
    Numbered {
        level: u8,
    },
    Todo {
        level: u8,
        checked: bool,
    },
    Code {
        language: Option<String>,
    },
    Quote,
    Divider,
    Image(ImageData),
    Video(VideoData),
}

impl BlockKind {
    /// Default kind for `ty`. List types start at `level` (clamped), which
    /// lets a type change keep the indent of the row it replaces.
    pub fn defaults_for(ty: BlockType, level: Option<u8>) -> Self {
        let list_level = level.unwrap_or(0).min(MAX_LIST_LEVEL);
        match ty {
            BlockType::Text => BlockKind::Text,
            BlockType::Heading => BlockKind::Heading { level: 1 },
            BlockType::Bullet => BlockKind::Bullet { level: list_level },
            BlockType::Numbered => BlockKind::Numbered { level: list_level },
            BlockType::Todo => BlockKind::Todo {
                level: list_level,
                checked: false,
            },
            BlockType::Code => BlockKind::Code { language: None },
            BlockType::Quote => BlockKind::Quote,
            BlockType::Divider => BlockKind::Divider,
            BlockType::Image => BlockKind::Image(ImageData::default()),
            BlockType::Video => BlockKind::Video(VideoData::default()),
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Text => BlockType::Text,
            BlockKind::Heading { .. } => BlockType::Heading,
            BlockKind::Bullet { .. } => BlockType::Bullet,
            BlockKind::Numbered { .. } => BlockType::Numbered,
            BlockKind::Todo { .. } => BlockType::Todo,
            BlockKind::Code { .. } => BlockType::Code,
            BlockKind::Quote => BlockType::Quote,
            BlockKind::Divider => BlockType::Divider,
            BlockKind::Image(_) => BlockType::Image,
            BlockKind::Video(_) => BlockType::Video,
        }
    }

    /// Indent level of a list row, `None` for every other kind.
    pub fn list_level(&self) -> Option<u8> {
        match self {
            BlockKind::Bullet { level }
            | BlockKind::Numbered { level }
            | BlockKind::Todo { level, .. } => Some(*level),
            _ => None,
        }
    }

    /// Returns a copy with the list level replaced (clamped to
    /// [`MAX_LIST_LEVEL`]). Non-list kinds are returned unchanged.
    #[must_use]
    pub fn with_list_level(&self, new_level: u8) -> Self {
        let new_level = new_level.min(MAX_LIST_LEVEL);
        match self {
            BlockKind::Bullet { .. } => BlockKind::Bullet { level: new_level },
            BlockKind::Numbered { .. } => BlockKind::Numbered { level: new_level },
            BlockKind::Todo { checked, .. } => BlockKind::Todo {
                level: new_level,
                checked: *checked,
            },
            other => other.clone(),
        }
    }
}

/// The atomic unit of document content.
///
/// Blocks are immutable values: every edit builds a replacement through the
/// `with_*` helpers rather than mutating a block that a document already owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Literal inline text, possibly containing `**bold**`, `*italic*` and
    /// `[text](url)` markup.
    pub content: String,
}

impl Block {
    pub fn new(id: BlockId, kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            content: content.into(),
        }
    }

    pub fn text(id: BlockId, content: impl Into<String>) -> Self {
        Self::new(id, BlockKind::Text, content)
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    pub fn is_list(&self) -> bool {
        self.block_type().is_list()
    }

    pub fn list_level(&self) -> Option<u8> {
        self.kind.list_level()
    }

    pub fn placeholder(&self) -> &'static str {
        self.block_type().placeholder()
    }

    /// Content length in characters, the unit carets and selections use.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    #[must_use]
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_kind(&self, kind: BlockKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }
}

/// A block that has not been placed in a document yet.
///
/// Parsers and paste handling produce drafts; the document assigns ids when
/// the drafts are adopted. `id` carries an id read from persisted data, which
/// is kept when it is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDraft {
    pub id: Option<u64>,
    pub kind: BlockKind,
    pub content: String,
}

impl BlockDraft {
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            content: content.into(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Text, content)
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("text", Some(BlockType::Text))]
    #[case("bullet", Some(BlockType::Bullet))]
    #[case("sub-bullet", Some(BlockType::Bullet))]
    #[case("image-with-description", Some(BlockType::Image))]
    #[case("youtube-with-description", Some(BlockType::Video))]
    #[case("callout", None)]
    fn test_type_names(#[case] name: &str, #[case] expected: Option<BlockType>) {
        assert_eq!(BlockType::from_name(name), expected);
    }

    #[test]
    fn test_type_names_round_trip() {
        for ty in BlockType::ALL {
            assert_eq!(BlockType::from_name(ty.as_str()), Some(ty));
        }
    }

    #[test]
    fn test_list_defaults_clamp_level() {
        let kind = BlockKind::defaults_for(BlockType::Todo, Some(9));
        assert_eq!(
            kind,
            BlockKind::Todo {
                level: MAX_LIST_LEVEL,
                checked: false
            }
        );
    }

    #[test]
    fn test_non_list_kinds_have_no_level() {
        assert_eq!(BlockKind::Quote.list_level(), None);
        assert_eq!(BlockKind::Heading { level: 2 }.list_level(), None);
        assert_eq!(BlockKind::Quote.with_list_level(2), BlockKind::Quote);
    }

    #[test]
    fn test_with_list_level_keeps_checked() {
        let todo = BlockKind::Todo {
            level: 0,
            checked: true,
        };
        assert_eq!(
            todo.with_list_level(2),
            BlockKind::Todo {
                level: 2,
                checked: true
            }
        );
    }

    #[test]
    fn test_char_len_counts_characters() {
        let block = Block::text(BlockId(1), "héllo");
        assert_eq!(block.char_len(), 5);
    }
}
