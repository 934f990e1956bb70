//! Structural edit operations.
//!
//! Every operation is a pure function from a document to an [`Edit`]: the
//! input document is never touched, and `None` means the precondition did
//! not hold and nothing changes.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::media;
use crate::models::{Block, BlockId, BlockKind, BlockType, Document, MAX_LIST_LEVEL};
use crate::parsing::inline::strip_markup;

/// Result of a successful edit operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub document: Document,
    /// Block that should hold focus afterwards.
    pub active: BlockId,
    /// New caret or selection in `active` (char offsets); `None` keeps the
    /// current one.
    pub selection: Option<Range<usize>>,
    /// Blocks inserted or replaced. Removed blocks are not listed.
    pub changed: Vec<BlockId>,
}

impl Edit {
    pub(crate) fn caret(document: Document, active: BlockId, at: usize, changed: Vec<BlockId>) -> Self {
        Self {
            document,
            active,
            selection: Some(at..at),
            changed,
        }
    }

    fn keep_selection(document: Document, active: BlockId) -> Self {
        Self {
            document,
            active,
            selection: None,
            changed: vec![active],
        }
    }
}

/// A change to the payload of a media block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaUpdate {
    ImageSource { src: String, alt: String },
    /// Any URL form [`media::extract_youtube_id`] understands.
    VideoUrl(String),
    Description(String),
}

fn slash_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/\w*").expect("Invalid slash token regex"))
}

/// Byte offset of the `chars`-th character, clamped to the end.
pub(crate) fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}

/// Substring between two char offsets (clamped, order-insensitive).
pub(crate) fn char_slice(s: &str, range: &Range<usize>) -> (usize, usize) {
    let len = s.chars().count();
    let start = range.start.min(range.end).min(len);
    let end = range.start.max(range.end).min(len);
    (start, end)
}

/// Inserts a new empty block after `id` and focuses it.
pub fn insert_block_after(
    doc: &Document,
    id: BlockId,
    block_type: BlockType,
    level: Option<u8>,
) -> Option<Edit> {
    let index = doc.index_of(id)?;
    let mut next = doc.clone();
    let new_id = next.allocate_id();
    next.insert_at(
        index + 1,
        Block::new(new_id, BlockKind::defaults_for(block_type, level), ""),
    );
    Some(Edit::caret(next, new_id, 0, vec![new_id]))
}

/// Removes a block unless it is the only one. Focus moves to the block
/// before it (caret at its end), or to the block after it.
pub fn delete_block(doc: &Document, id: BlockId) -> Option<Edit> {
    if doc.len() <= 1 {
        return None;
    }
    let index = doc.index_of(id)?;
    let mut next = doc.clone();
    next.remove(id);

    let (active, caret) = match index.checked_sub(1).and_then(|i| next.block_at(i)) {
        Some(previous) => (previous.id, previous.char_len()),
        None => (next.block_at(0)?.id, 0),
    };
    Some(Edit::caret(next, active, caret, Vec::new()))
}

/// Enter inside a block.
///
/// At the very start an empty text block is inserted above and the caret
/// stays put. Anywhere else an empty block is inserted below: a list row
/// continues the list at the same level, everything else gets a text block.
/// Text after the caret stays where it is.
pub fn split_at_cursor(doc: &Document, id: BlockId, cursor: usize) -> Option<Edit> {
    let block = doc.get(id)?;
    if !block.block_type().has_text() {
        return None;
    }
    let index = doc.index_of(id)?;
    let mut next = doc.clone();
    let new_id = next.allocate_id();

    if cursor == 0 {
        next.insert_at(index, Block::text(new_id, ""));
        return Some(Edit::caret(next, id, 0, vec![new_id]));
    }

    let kind = if block.is_list() {
        BlockKind::defaults_for(block.block_type(), block.list_level())
    } else {
        BlockKind::Text
    };
    next.insert_at(index + 1, Block::new(new_id, kind, ""));
    Some(Edit::caret(next, new_id, 0, vec![new_id]))
}

/// Backspace at the start of a non-list block: append its content to the
/// previous block, caret at the join. With no text-bearing block before it
/// the block is deleted instead (unless it is the only one).
pub fn merge_with_previous(doc: &Document, id: BlockId) -> Option<Edit> {
    let block = doc.get(id)?;
    if block.is_list() || !block.block_type().has_text() {
        return None;
    }

    match doc.previous(id) {
        Some(previous) if previous.block_type().has_text() => {
            let boundary = previous.char_len();
            let merged = previous.with_content(format!("{}{}", previous.content, block.content));
            let previous_id = previous.id;

            let mut next = doc.clone();
            next.replace(merged);
            next.remove(id);
            Some(Edit::caret(next, previous_id, boundary, vec![previous_id]))
        }
        _ => delete_block(doc, id),
    }
}

/// Backspace at the start of a list row: outdent, or leave the list from
/// level 0.
pub fn demote_list_item_or_convert(doc: &Document, id: BlockId) -> Option<Edit> {
    let block = doc.get(id)?;
    let level = block.list_level()?;
    let kind = if level > 0 {
        block.kind.with_list_level(level - 1)
    } else {
        BlockKind::Text
    };

    let mut next = doc.clone();
    next.replace(block.with_kind(kind));
    Some(Edit::caret(next, id, 0, vec![id]))
}

/// Enter on an empty list row turns it into a text block.
pub fn exit_list_on_empty_enter(doc: &Document, id: BlockId) -> Option<Edit> {
    let block = doc.get(id)?;
    if !block.is_list() || !block.content.trim().is_empty() {
        return None;
    }
    let mut next = doc.clone();
    next.replace(block.with_kind(BlockKind::Text));
    Some(Edit::caret(next, id, 0, vec![id]))
}

pub fn indent(doc: &Document, id: BlockId) -> Option<Edit> {
    let block = doc.get(id)?;
    let level = block.list_level()?;
    if level >= MAX_LIST_LEVEL {
        return None;
    }
    let mut next = doc.clone();
    next.replace(block.with_kind(block.kind.with_list_level(level + 1)));
    Some(Edit::keep_selection(next, id))
}

pub fn outdent(doc: &Document, id: BlockId) -> Option<Edit> {
    let block = doc.get(id)?;
    let level = block.list_level()?.checked_sub(1)?;
    let mut next = doc.clone();
    next.replace(block.with_kind(block.kind.with_list_level(level)));
    Some(Edit::keep_selection(next, id))
}

/// Content left after removing a leading `/command` token.
pub fn strip_slash_token(content: &str) -> String {
    slash_token_regex().replace(content, "").trim().to_string()
}

/// Converts a block to another type.
///
/// A leading `/command` token is removed from the content; dividers and
/// media blocks end up with no content (for media, the remaining text
/// becomes the description, without inline markup). List types keep the
/// indent of a list row they replace unless `level` says otherwise; a todo
/// always starts unchecked.
pub fn change_block_type(
    doc: &Document,
    id: BlockId,
    block_type: BlockType,
    level: Option<u8>,
) -> Option<Edit> {
    let block = doc.get(id)?;
    let cleaned = strip_slash_token(&block.content);

    let mut kind = BlockKind::defaults_for(block_type, level.or(block.list_level()));
    let content = match &mut kind {
        BlockKind::Divider => String::new(),
        BlockKind::Image(image) => {
            image.description = strip_markup(&cleaned);
            String::new()
        }
        BlockKind::Video(video) => {
            video.description = strip_markup(&cleaned);
            String::new()
        }
        _ => cleaned,
    };

    let caret = content.chars().count();
    let mut next = doc.clone();
    next.replace(Block::new(id, kind, content));
    Some(Edit::caret(next, id, caret, vec![id]))
}

pub fn toggle_checked(doc: &Document, id: BlockId) -> Option<Edit> {
    let block = doc.get(id)?;
    let BlockKind::Todo { level, checked } = block.kind else {
        return None;
    };
    let mut next = doc.clone();
    next.replace(block.with_kind(BlockKind::Todo {
        level,
        checked: !checked,
    }));
    Some(Edit::keep_selection(next, id))
}

/// Replaces the text of a block (typing). Dividers and media blocks have no
/// editable text.
pub fn set_content(doc: &Document, id: BlockId, content: &str, cursor: usize) -> Option<Edit> {
    let block = doc.get(id)?;
    if !block.block_type().has_text() {
        return None;
    }
    let caret = cursor.min(content.chars().count());
    let mut next = doc.clone();
    next.replace(block.with_content(content));
    Some(Edit::caret(next, id, caret, vec![id]))
}

/// Updates the payload of an image or video block. An unrecognised video URL
/// or a mismatched update is a no-op.
pub fn update_media(doc: &Document, id: BlockId, update: &MediaUpdate) -> Option<Edit> {
    let block = doc.get(id)?;
    let kind = match (&block.kind, update) {
        (BlockKind::Image(image), MediaUpdate::ImageSource { src, alt }) => {
            let mut image = image.clone();
            image.src = src.trim().to_string();
            image.alt = alt.clone();
            BlockKind::Image(image)
        }
        (BlockKind::Video(video), MediaUpdate::VideoUrl(url)) => {
            BlockKind::Video(media::video_from_url(url, &video.description)?)
        }
        (BlockKind::Image(image), MediaUpdate::Description(text)) => {
            let mut image = image.clone();
            image.description = text.clone();
            BlockKind::Image(image)
        }
        (BlockKind::Video(video), MediaUpdate::Description(text)) => {
            let mut video = video.clone();
            video.description = text.clone();
            BlockKind::Video(video)
        }
        _ => return None,
    };
    let mut next = doc.clone();
    next.replace(block.with_kind(kind));
    Some(Edit::keep_selection(next, id))
}
