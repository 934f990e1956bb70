//! Conversions between the block model and the nested document format.

pub mod from_nested;
pub mod to_nested;

use serde::{Deserialize, Serialize};

use crate::models::Document;

pub use from_nested::{inline_markup, nested_to_blocks};
pub use to_nested::{blocks_to_nested, unescape_newlines};

/// How list rows are grouped into list containers on export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListGrouping {
    /// Every list row gets its own container; row levels are not exported.
    #[default]
    OnePerRow,
    /// Adjacent rows of the same list type share a container and deeper rows
    /// nest under the item before them.
    MergeAdjacent,
}

/// Serializes a document as nested document JSON.
pub fn serialize_nested(
    document: &Document,
    grouping: ListGrouping,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&blocks_to_nested(document.blocks(), grouping))
}
