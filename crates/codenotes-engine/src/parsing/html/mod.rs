//! # HTML Reading
//!
//! A small forgiving HTML reader for the legacy note format and for clipboard
//! data. It is not a general HTML5 parser; it recovers from the markup rich
//! text widgets actually emit.
//!
//! - **`tokenizer`**: cursor-based tokenizer (tags, attributes, decoded text)
//! - **`tree`**: node tree with implicit `<p>` / `<li>` closing and sanitizing
//! - **`legacy`**: maps a fragment onto block drafts

pub mod legacy;
pub mod tokenizer;
pub mod tree;

use std::sync::OnceLock;

use regex::Regex;

pub use legacy::parse_legacy_html;
pub use tree::{Element, Node, parse_fragment, sanitize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HtmlError {
    #[error("HTML nested deeper than {limit} elements")]
    TooDeep { limit: usize },
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("Invalid html tag regex"))
}

/// True when `text` contains at least one `<tag>`-shaped substring.
pub fn looks_like_html(text: &str) -> bool {
    tag_regex().is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<p>hi</p>", true)]
    #[case("a <b> c", true)]
    #[case("x < y > z", true)]
    #[case("no tags here", false)]
    #[case("a < b", false)]
    #[case("<>", false)]
    fn test_looks_like_html(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(looks_like_html(input), expected);
    }
}
