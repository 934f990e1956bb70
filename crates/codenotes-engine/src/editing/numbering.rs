//! Ordinals for numbered list rows. Never stored; recomputed on render.

use std::collections::HashMap;

use crate::models::{BlockId, BlockKind, Document};

/// Ordinal of a numbered row: one plus the numbered rows at the same level
/// before it in the same run. Deeper list rows do not break the run; any
/// other block, a shallower row, or a different list type at the same level
/// does. `None` for blocks that are not numbered.
pub fn ordinal(doc: &Document, id: BlockId) -> Option<usize> {
    let BlockKind::Numbered { level } = doc.get(id)?.kind else {
        return None;
    };
    let index = doc.index_of(id)?;

    let mut count = 1;
    for i in (0..index).rev() {
        let Some(block) = doc.block_at(i) else { break };
        match (&block.kind, block.list_level()) {
            (_, Some(other)) if other > level => continue,
            (BlockKind::Numbered { level: other }, _) if *other == level => count += 1,
            _ => break,
        }
    }
    Some(count)
}

/// Ordinals for every numbered row, computed in one pass.
pub fn ordinals(doc: &Document) -> HashMap<BlockId, usize> {
    // counters[level] is the running count for the open run at that level
    let mut counters: Vec<Option<usize>> = Vec::new();
    let mut out = HashMap::new();

    for block in doc.blocks() {
        let Some(level) = block.list_level().map(usize::from) else {
            counters.clear();
            continue;
        };
        counters.truncate(level + 1);
        if counters.len() <= level {
            counters.resize(level + 1, None);
        }
        match block.kind {
            BlockKind::Numbered { .. } => {
                let next = counters[level].map_or(1, |n| n + 1);
                counters[level] = Some(next);
                out.insert(block.id, next);
            }
            _ => counters[level] = None,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlockDraft;
    use pretty_assertions::assert_eq;

    fn numbered(level: u8, content: &str) -> BlockDraft {
        BlockDraft::new(BlockKind::Numbered { level }, content)
    }

    fn bullet(level: u8, content: &str) -> BlockDraft {
        BlockDraft::new(BlockKind::Bullet { level }, content)
    }

    #[test]
    fn test_run_with_nested_rows() {
        // Given numbered rows with a deeper child between them
        let doc = Document::from_drafts([
            numbered(0, "one"),
            numbered(1, "one.a"),
            bullet(2, "detail"),
            numbered(1, "one.b"),
            numbered(0, "two"),
            BlockDraft::text("break"),
            numbered(0, "again"),
        ]);

        // Then ordinals count within each run and level
        let expected = [(1, 1), (2, 1), (4, 2), (5, 2), (7, 1)];
        for (id, n) in expected {
            assert_eq!(ordinal(&doc, BlockId(id)), Some(n), "block {id}");
        }
        assert_eq!(ordinal(&doc, BlockId(3)), None);

        let all = ordinals(&doc);
        assert_eq!(all.len(), 5);
        for (id, n) in expected {
            assert_eq!(all[&BlockId(id)], n);
        }
    }

    #[test]
    fn test_bullet_at_same_level_breaks_run() {
        let doc = Document::from_drafts([numbered(0, "a"), bullet(0, "b"), numbered(0, "c")]);
        assert_eq!(ordinal(&doc, BlockId(3)), Some(1));
        assert_eq!(ordinals(&doc)[&BlockId(3)], 1);
    }

    #[test]
    fn test_shallower_row_breaks_nested_run() {
        let doc = Document::from_drafts([
            numbered(1, "a"),
            bullet(0, "parent"),
            numbered(1, "b"),
        ]);
        assert_eq!(ordinal(&doc, BlockId(3)), Some(1));
        assert_eq!(ordinals(&doc)[&BlockId(3)], 1);
    }
}
