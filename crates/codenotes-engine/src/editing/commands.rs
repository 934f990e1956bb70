use std::ops::Range;

use crate::editing::marks::InlineMark;
use crate::editing::ops::MediaUpdate;
use crate::models::{BlockId, BlockType};
use crate::paste::ClipboardData;

/// Edit commands understood by [`crate::editing::Editor::apply`].
///
/// Offsets are char offsets within the target block's content.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Replaces a block's text; drives the command menu.
    SetContent {
        block: BlockId,
        content: String,
        cursor: usize,
    },
    Focus {
        block: BlockId,
        selection: Range<usize>,
    },
    InsertBlockAfter {
        block: BlockId,
        block_type: BlockType,
        level: Option<u8>,
    },
    DeleteBlock {
        block: BlockId,
    },
    /// Enter at `cursor`.
    Split {
        block: BlockId,
        cursor: usize,
    },
    /// Backspace at the start of a block.
    Backspace {
        block: BlockId,
    },
    Indent {
        block: BlockId,
    },
    Outdent {
        block: BlockId,
    },
    ChangeBlockType {
        block: BlockId,
        block_type: BlockType,
        level: Option<u8>,
    },
    ToggleChecked {
        block: BlockId,
    },
    ToggleMark {
        block: BlockId,
        range: Range<usize>,
        mark: InlineMark,
    },
    InsertLink {
        block: BlockId,
        range: Range<usize>,
        url: String,
    },
    UpdateMedia {
        block: BlockId,
        update: MediaUpdate,
    },
    Paste {
        block: BlockId,
        cursor: usize,
        data: ClipboardData,
    },
    MenuNext,
    MenuPrevious,
    /// Applies the highlighted menu entry.
    MenuConfirm,
    MenuClose,
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Tab,
    Escape,
    Up,
    Down,
    Char(char),
}

/// A key plus modifiers. `ctrl` also covers Cmd on macOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyChord {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl(c: char) -> Self {
        Self {
            key: Key::Char(c),
            ctrl: true,
            shift: false,
        }
    }

    pub fn shift(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: true,
        }
    }
}
