use std::ops::Range;

use crate::models::BlockId;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Blocks inserted or replaced by the edit
    pub changed: Vec<BlockId>,
    /// Block holding focus after the edit
    pub active: BlockId,
    /// Caret or selection in `active`, as char offsets
    pub new_selection: Range<usize>,
    pub version: u64,
    /// Set when the front-end should move focus
    pub focus: Option<FocusRequest>,
}

impl Patch {
    /// Whether the command changed the document.
    pub fn is_edit(&self) -> bool {
        !self.changed.is_empty() || self.focus.is_some()
    }
}

/// Asks the front-end to focus a block and place the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRequest {
    pub block: BlockId,
    pub selection: Range<usize>,
}
