use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::ops::{Edit, byte_offset, char_slice};
use crate::models::{BlockId, Document};
use crate::parsing::inline::kinds::{Emphasis, Link, Strong};

/// Inline marks that can be toggled on a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineMark {
    Bold,
    Italic,
}

/// Text used for a link inserted without a selection.
pub const LINK_PLACEHOLDER: &str = "link";

fn bold_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^\*\*(.*)\*\*$").expect("Invalid bold regex"))
}

fn italic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^\*(.*)\*$").expect("Invalid italic regex"))
}

fn bold_italic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\*\*\*(.+)\*\*\*$").expect("Invalid bold italic regex")
    })
}

/// Wraps or unwraps the selected text.
///
/// A selection that is exactly wrapped in the mark's delimiters is
/// unwrapped, anything else is wrapped, so applying the same mark twice
/// restores the original text. A bold-wrapped selection only counts as
/// italic when a third `*` wraps it. The selection afterwards covers the rewritten text.
pub fn apply_inline_mark(
    doc: &Document,
    id: BlockId,
    range: Range<usize>,
    mark: InlineMark,
) -> Option<Edit> {
    let block = doc.get(id)?;
    if !block.block_type().has_text() {
        return None;
    }
    let (start, end) = char_slice(&block.content, &range);
    if start == end {
        return None;
    }

    let content = &block.content;
    let (from, to) = (byte_offset(content, start), byte_offset(content, end));
    let selected = &content[from..to];
    let replacement = toggle(selected, mark);

    let new_end = start + replacement.chars().count();
    let new_content = format!("{}{}{}", &content[..from], replacement, &content[to..]);

    let mut next = doc.clone();
    next.replace(block.with_content(new_content));
    Some(Edit {
        document: next,
        active: id,
        selection: Some(start..new_end),
        changed: vec![id],
    })
}

fn toggle(selected: &str, mark: InlineMark) -> String {
    match mark {
        InlineMark::Bold => match bold_regex().captures(selected) {
            Some(caps) => caps[1].to_string(),
            None => {
                let delim = String::from_utf8_lossy(Strong::DELIM);
                format!("{delim}{selected}{delim}")
            }
        },
        InlineMark::Italic => {
            let bold_only =
                bold_regex().is_match(selected) && !bold_italic_regex().is_match(selected);
            match italic_regex().captures(selected) {
                Some(caps) if !bold_only => caps[1].to_string(),
                _ => {
                    let delim = char::from(Emphasis::DELIM);
                    format!("{delim}{selected}{delim}")
                }
            }
        }
    }
}

/// Replaces the selection (or inserts [`LINK_PLACEHOLDER`] at the caret)
/// with `[text](url)` and puts the caret after it. A blank URL is a no-op.
pub fn insert_link(doc: &Document, id: BlockId, range: Range<usize>, url: &str) -> Option<Edit> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let block = doc.get(id)?;
    if !block.block_type().has_text() {
        return None;
    }

    let content = &block.content;
    let (start, end) = char_slice(content, &range);
    let (from, to) = (byte_offset(content, start), byte_offset(content, end));
    let text = if from == to {
        LINK_PLACEHOLDER
    } else {
        &content[from..to]
    };

    let link = format!(
        "{}{text}{}{url}{}",
        char::from(Link::OPEN),
        String::from_utf8_lossy(Link::MIDDLE),
        char::from(Link::CLOSE)
    );
    let caret = start + link.chars().count();
    let new_content = format!("{}{}{}", &content[..from], link, &content[to..]);

    let mut next = doc.clone();
    next.replace(block.with_content(new_content));
    Some(Edit::caret(next, id, caret, vec![id]))
}
