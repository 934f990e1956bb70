pub mod block;
pub mod document;
pub mod nested;

pub use block::{
    Block, BlockDraft, BlockId, BlockKind, BlockType, ImageData, MAX_HEADING_LEVEL,
    MAX_LIST_LEVEL, VideoData,
};
pub use document::Document;
pub use nested::{DocNode, Mark, NestedDocument};
