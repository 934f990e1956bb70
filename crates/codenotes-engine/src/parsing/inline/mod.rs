//! # Inline Markup
//!
//! Cursor-based parsing of the lightweight markup stored in block content:
//! `**bold**`, `*italic*` and `[text](url)`.
//!
//! - **`types`**: `InlineNode` enum (Text, Strong, Emphasis, Link)
//! - **`kinds`**: marker types owning their delimiters
//! - **`parser`**: `parse_inline()` entry point with `try_parse_*` helpers
//!
//! Markup does not nest: the inside of a span is plain text. Unclosed
//! delimiters are text.

pub mod kinds;
pub mod parser;
pub mod types;

pub use parser::{parse_inline, strip_markup};
pub use types::InlineNode;
