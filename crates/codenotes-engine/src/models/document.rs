use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::block::{Block, BlockDraft, BlockId, BlockKind};

/// Largest stored block id kept as is; larger ids are reassigned.
pub const MAX_BLOCK_ID: u64 = u32::MAX as u64;

/// An ordered sequence of blocks representing one note or solution field.
///
/// Stored arena style: `order` holds the block sequence as ids and `blocks`
/// maps ids to shared, immutable blocks. Cloning a document only copies the
/// id list and bumps reference counts, so every edit can produce a fresh
/// document while a reader holding the previous one (a pending save, an undo
/// entry) keeps seeing a consistent state.
///
/// Invariants:
/// - `order` is never empty; an empty document is one empty text block
/// - every id in `order` is unique and present in `blocks`
/// - `next_id` is greater than every id ever handed out by this document
#[derive(Debug, Clone)]
pub struct Document {
    order: Vec<BlockId>,
    blocks: HashMap<BlockId, Arc<Block>>,
    next_id: u64,
}

impl Document {
    /// A document holding a single empty text block.
    pub fn new() -> Self {
        let id = BlockId(1);
        Self {
            order: vec![id],
            blocks: HashMap::from([(id, Arc::new(Block::text(id, "")))]),
            next_id: 2,
        }
    }

    /// Builds a document from parsed drafts.
    ///
    /// Ids read from storage are kept when they are unique; drafts without an
    /// id, or whose id was already taken by an earlier block, get a fresh one.
    /// An empty draft list yields [`Document::new`].
    pub fn from_drafts(drafts: impl IntoIterator<Item = BlockDraft>) -> Self {
        let drafts: Vec<BlockDraft> = drafts.into_iter().collect();
        if drafts.is_empty() {
            return Self::new();
        }

        let max_id = drafts
            .iter()
            .filter_map(|d| d.id)
            .filter(|id| *id <= MAX_BLOCK_ID)
            .max()
            .unwrap_or(0);
        let mut next_id = max_id + 1;
        let mut seen = HashSet::new();
        let mut order = Vec::with_capacity(drafts.len());
        let mut blocks = HashMap::with_capacity(drafts.len());

        for draft in drafts {
            let id = match draft.id {
                Some(id) if (1..=MAX_BLOCK_ID).contains(&id) && seen.insert(id) => id,
                _ => {
                    if let Some(id) = draft.id {
                        log::warn!("Reassigning duplicate or invalid block id {id}");
                    }
                    let id = next_id;
                    next_id += 1;
                    seen.insert(id);
                    id
                }
            };
            let id = BlockId(id);
            order.push(id);
            blocks.insert(id, Arc::new(Block::new(id, draft.kind, draft.content)));
        }

        Self {
            order,
            blocks,
            next_id,
        }
    }

    /// Builds a document from already-identified blocks (duplicates get fresh ids).
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        Self::from_drafts(blocks.into_iter().map(|b| BlockDraft {
            id: Some(b.id.0),
            kind: b.kind,
            content: b.content,
        }))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always false: a document holds at least one block.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// True when the document is the canonical empty document.
    #[cfg(test)]
    pub fn is_blank(&self) -> bool {
        self.order.len() == 1
            && self
                .first()
                .is_some_and(|b| b.kind == BlockKind::Text && b.content.is_empty())
    }

    /// Blocks in document order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.order.iter().filter_map(|id| self.blocks.get(id).map(|b| b.as_ref()))
    }

    pub fn ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.order.iter().copied()
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id).map(|b| b.as_ref())
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.order.iter().position(|&b| b == id)
    }

    pub fn block_at(&self, index: usize) -> Option<&Block> {
        self.order.get(index).and_then(|id| self.get(*id))
    }

    pub fn first(&self) -> Option<&Block> {
        self.block_at(0)
    }

    pub fn last(&self) -> Option<&Block> {
        self.order.last().and_then(|id| self.get(*id))
    }

    /// The block immediately before `id`.
    pub fn previous(&self, id: BlockId) -> Option<&Block> {
        let index = self.index_of(id)?;
        index.checked_sub(1).and_then(|i| self.block_at(i))
    }

    /// The block immediately after `id`.
    pub fn next(&self, id: BlockId) -> Option<&Block> {
        let index = self.index_of(id)?;
        self.block_at(index + 1)
    }

    /// Id the next inserted block will receive.
    #[cfg(test)]
    pub fn peek_next_id(&self) -> BlockId {
        BlockId(self.next_id)
    }

    pub(crate) fn allocate_id(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Swaps in a replacement for the block with the same id.
    pub(crate) fn replace(&mut self, block: Block) {
        if self.blocks.contains_key(&block.id) {
            self.blocks.insert(block.id, Arc::new(block));
        }
    }

    /// Inserts `block` at `index` (clamped to the end). The caller allocates
    /// the id through [`Document::allocate_id`].
    pub(crate) fn insert_at(&mut self, index: usize, block: Block) {
        let index = index.min(self.order.len());
        self.order.insert(index, block.id);
        self.blocks.insert(block.id, Arc::new(block));
    }

    /// Removes a block. Refuses to remove the last remaining block.
    pub(crate) fn remove(&mut self, id: BlockId) -> bool {
        if self.order.len() <= 1 {
            return false;
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.order.remove(index);
        self.blocks.remove(&id);
        true
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Documents are equal when they hold the same blocks in the same order; the
/// id counter is bookkeeping and does not take part.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.blocks().zip(other.blocks()).all(|(a, b)| a == b)
    }
}

impl Eq for Document {}
