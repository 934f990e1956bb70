//! Clipboard content to blocks.
//!
//! HTML is preferred over plain text when the clipboard has both. HTML is
//! sanitized, then walked with nested lists turned into deeper list rows;
//! plain text is read line by line with list markers recognised.

use std::sync::OnceLock;

use regex::Regex;

use crate::editing::ops::{Edit, byte_offset};
use crate::models::{Block, BlockDraft, BlockId, BlockKind, Document, MAX_LIST_LEVEL};
use crate::parsing::html::{Element, HtmlError, Node, parse_fragment, sanitize};

/// Most blocks a single paste may produce.
pub const DEFAULT_PASTE_LIMIT: usize = 50;

/// What the clipboard offered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardData {
    pub html: Option<String>,
    pub text: Option<String>,
}

impl ClipboardData {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            html: None,
            text: Some(text.into()),
        }
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            text: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasteError {
    #[error("No valid content found in clipboard")]
    Empty,
    #[error("Error processing HTML content: {0}")]
    Html(#[from] HtmlError),
}

fn task_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\s*)[-*]\s+\[([ xX])\]\s+(.+)$").expect("Invalid task line regex")
    })
}

fn bullet_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)[-*•]\s+(.+)$").expect("Invalid bullet line regex"))
}

fn numbered_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)\d+\.\s+(.+)$").expect("Invalid numbered line regex"))
}

/// Converts clipboard data into at most `limit` drafts.
pub fn parse_clipboard(data: &ClipboardData, limit: usize) -> Result<Vec<BlockDraft>, PasteError> {
    fn non_blank(s: &Option<String>) -> Option<&str> {
        s.as_deref().filter(|s| !s.trim().is_empty())
    }

    let drafts = if let Some(html) = non_blank(&data.html) {
        parse_html(html, limit)?
    } else if let Some(text) = non_blank(&data.text) {
        parse_text(text, limit)
    } else {
        return Err(PasteError::Empty);
    };
    log::debug!("Clipboard produced {} block(s)", drafts.len());
    Ok(drafts)
}

fn parse_html(html: &str, limit: usize) -> Result<Vec<BlockDraft>, HtmlError> {
    let mut nodes = parse_fragment(html)?;
    sanitize(&mut nodes);

    let mut out = Sink { out: Vec::new(), limit };
    walk(&nodes, &mut out);
    Ok(out.out)
}

/// Collects drafts up to a limit.
struct Sink {
    out: Vec<BlockDraft>,
    limit: usize,
}

impl Sink {
    fn full(&self) -> bool {
        self.out.len() >= self.limit
    }

    fn push(&mut self, kind: BlockKind, text: &str) {
        let text = text.trim();
        if !text.is_empty() && !self.full() {
            self.out.push(BlockDraft::new(kind, text));
        }
    }
}

fn walk(nodes: &[Node], out: &mut Sink) {
    for node in nodes {
        if out.full() {
            return;
        }
        match node {
            Node::Text(text) => out.push(BlockKind::Text, text),
            Node::Element(e) => read_element(e, out),
        }
    }
}

fn read_element(e: &Element, out: &mut Sink) {
    match e.name.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = e.name[1..].parse().unwrap_or(1);
            out.push(BlockKind::Heading { level }, &e.text_content());
        }
        "p" | "strong" | "b" | "em" | "i" => out.push(BlockKind::Text, &e.text_content()),
        "ul" | "ol" => read_list(e, 0, out),
        "blockquote" => out.push(BlockKind::Quote, &e.text_content()),
        "pre" | "code" => out.push(BlockKind::Code { language: None }, &e.text_content()),
        "hr" => {
            if !out.full() {
                out.out.push(BlockDraft::new(BlockKind::Divider, ""));
            }
        }
        "br" | "li" => {}
        _ => walk(&e.children, out),
    }
}

fn read_list(list: &Element, level: u8, out: &mut Sink) {
    let is_list = |e: &Element| e.name == "ul" || e.name == "ol";
    for item in list.child_elements().filter(|c| c.name == "li") {
        if out.full() {
            return;
        }
        let kind = if list.name == "ol" {
            BlockKind::Numbered { level }
        } else {
            BlockKind::Bullet { level }
        };
        out.push(kind, &item.text_content_except(&is_list));

        for nested in item.child_elements().filter(|c| is_list(*c)) {
            read_list(nested, (level + 1).min(MAX_LIST_LEVEL), out);
        }
    }
}

fn parse_text(text: &str, limit: usize) -> Vec<BlockDraft> {
    let level_of = |indent: &str| (indent.chars().count() / 2).min(usize::from(MAX_LIST_LEVEL)) as u8;

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            if let Some(caps) = task_regex().captures(line) {
                let kind = BlockKind::Todo {
                    level: level_of(&caps[1]),
                    checked: caps[2].eq_ignore_ascii_case("x"),
                };
                BlockDraft::new(kind, caps[3].trim())
            } else if let Some(caps) = bullet_regex().captures(line) {
                BlockDraft::new(BlockKind::Bullet { level: level_of(&caps[1]) }, caps[2].trim())
            } else if let Some(caps) = numbered_regex().captures(line) {
                BlockDraft::new(BlockKind::Numbered { level: level_of(&caps[1]) }, caps[2].trim())
            } else {
                BlockDraft::text(line.trim())
            }
        })
        .take(limit)
        .collect()
}

/// Inserts pasted drafts at the caret of block `id`.
///
/// A single plain-text draft is spliced into the block's text. Any other
/// paste splits the block: text before the caret stays, the drafts follow, and text after the
/// caret moves into a block of the original type after them. An empty target
/// block is replaced by the first draft. Focus ends at the end of the last
/// pasted block.
pub fn paste_into(doc: &Document, id: BlockId, cursor: usize, drafts: Vec<BlockDraft>) -> Option<Edit> {
    let block = doc.get(id)?;
    if drafts.is_empty() {
        return None;
    }
    let text_bearing = block.block_type().has_text();

    if let [only] = drafts.as_slice()
        && text_bearing
        && only.kind == BlockKind::Text
    {
        let (from, inserted) = (byte_offset(&block.content, cursor), &only.content);
        let mut content = block.content.clone();
        content.insert_str(from, inserted);
        let caret = block.content[..from].chars().count() + inserted.chars().count();

        let mut next = doc.clone();
        next.replace(block.with_content(content));
        return Some(Edit::caret(next, id, caret, vec![id]));
    }

    let mut next = doc.clone();
    let mut changed = Vec::new();
    let mut index = doc.index_of(id)?;
    let mut drafts = drafts.into_iter();
    let mut trailing = None;

    if text_bearing {
        let split = byte_offset(&block.content, cursor);
        let (before, after) = block.content.split_at(split);
        if !after.is_empty() {
            trailing = Some((block.kind.clone(), after.to_string()));
        }
        if block.content.trim().is_empty() && block.kind == BlockKind::Text
            && let Some(first) = drafts.next()
        {
            next.replace(Block::new(id, first.kind, first.content));
        } else {
            next.replace(block.with_content(before));
        }
        changed.push(id);
    }

    let mut last = (id, next.get(id)?.char_len());
    for draft in drafts {
        let new_id = next.allocate_id();
        index += 1;
        let pasted = Block::new(new_id, draft.kind, draft.content);
        last = (new_id, pasted.char_len());
        next.insert_at(index, pasted);
        changed.push(new_id);
    }

    if let Some((kind, rest)) = trailing {
        let new_id = next.allocate_id();
        next.insert_at(index + 1, Block::new(new_id, kind, rest));
        changed.push(new_id);
    }

    let (active, caret) = last;
    Some(Edit::caret(next, active, caret, changed))
}
