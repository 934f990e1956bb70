//! # Inline Kinds
//!
//! Inline types that own their syntax delimiters. The parser reads these
//! constants; it never hardcodes `**`, `*` or `](`.

pub mod emphasis;
pub mod link;

pub use emphasis::{Emphasis, Strong};
pub use link::Link;
