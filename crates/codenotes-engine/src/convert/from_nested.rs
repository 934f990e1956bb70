use crate::media;
use crate::models::nested::node_type;
use crate::models::{
    BlockDraft, BlockKind, DocNode, ImageData, MAX_HEADING_LEVEL, MAX_LIST_LEVEL, NestedDocument,
    VideoData,
};

/// Reads the block list out of a nested document.
///
/// Best effort rather than an inverse of [`super::blocks_to_nested`]: list
/// nesting becomes row levels (capped), inline marks become markup, and
/// nodes this editor does not know are kept as text when they have any.
pub fn nested_to_blocks(doc: &NestedDocument) -> Vec<BlockDraft> {
    let mut out = Vec::new();
    for node in &doc.content {
        read_node(node, &mut out);
    }
    log::debug!(
        "Read {} block(s) from {} nested node(s)",
        out.len(),
        doc.content.len()
    );
    out
}

fn read_node(node: &DocNode, out: &mut Vec<BlockDraft>) {
    match node.node_type.as_str() {
        node_type::PARAGRAPH => out.push(BlockDraft::text(inline_markup(node.children()))),
        node_type::HEADING => {
            let level = node
                .attr_u64("level")
                .unwrap_or(1)
                .clamp(1, u64::from(MAX_HEADING_LEVEL)) as u8;
            out.push(BlockDraft::new(
                BlockKind::Heading { level },
                inline_markup(node.children()),
            ));
        }
        node_type::BULLET_LIST | node_type::ORDERED_LIST | node_type::TASK_LIST => {
            read_list(node, 0, out)
        }
        node_type::CODE_BLOCK => {
            let language = node
                .attr_str("language")
                .filter(|l| !l.is_empty())
                .map(str::to_string);
            out.push(BlockDraft::new(
                BlockKind::Code { language },
                plain_text(node.children()),
            ));
        }
        node_type::BLOCKQUOTE => out.push(BlockDraft::new(
            BlockKind::Quote,
            paragraphs_text(node.children()),
        )),
        node_type::HORIZONTAL_RULE => out.push(BlockDraft::new(BlockKind::Divider, "")),
        node_type::IMAGE => {
            let image = ImageData {
                src: node.attr_str("src").unwrap_or_default().to_string(),
                alt: node.attr_str("alt").unwrap_or_default().to_string(),
                description: node.attr_str("title").unwrap_or_default().to_string(),
            };
            out.push(BlockDraft::new(BlockKind::Image(image), ""));
        }
        node_type::YOUTUBE => {
            let video_url = node.attr_str("src").unwrap_or_default().to_string();
            let video = VideoData {
                video_id: media::extract_youtube_id(&video_url).unwrap_or_default(),
                video_url,
                description: node.attr_str("description").unwrap_or_default().to_string(),
            };
            out.push(BlockDraft::new(BlockKind::Video(video), ""));
        }
        other => {
            let text = paragraphs_text(std::slice::from_ref(node));
            log::debug!("Reading unknown node type `{other}` as text");
            if !text.trim().is_empty() {
                out.push(BlockDraft::text(text));
            }
        }
    }
}

fn read_list(list: &DocNode, depth: u8, out: &mut Vec<BlockDraft>) {
    let level = depth.min(MAX_LIST_LEVEL);
    for item in list.children() {
        let kind = if list.is(node_type::TASK_LIST) || item.is(node_type::TASK_ITEM) {
            BlockKind::Todo {
                level,
                checked: item.attr_bool("checked").unwrap_or(false),
            }
        } else if list.is(node_type::ORDERED_LIST) {
            BlockKind::Numbered { level }
        } else {
            BlockKind::Bullet { level }
        };

        let (lists, text_nodes): (Vec<&DocNode>, Vec<&DocNode>) =
            item.children().iter().partition(|c| is_list(c));
        let text = text_nodes
            .iter()
            .map(|n| block_text(n))
            .collect::<Vec<_>>()
            .join("\n");
        out.push(BlockDraft::new(kind, text));

        for nested in lists {
            read_list(nested, depth.saturating_add(1), out);
        }
    }
}

fn is_list(node: &DocNode) -> bool {
    matches!(
        node.node_type.as_str(),
        node_type::BULLET_LIST | node_type::ORDERED_LIST | node_type::TASK_LIST
    )
}

/// Text of one block-level node: inline markup for paragraphs and
/// headings, collected text otherwise.
fn block_text(node: &DocNode) -> String {
    if node.is(node_type::TEXT) {
        return inline_markup(std::slice::from_ref(node));
    }
    if node.is(node_type::PARAGRAPH) || node.is(node_type::HEADING) {
        inline_markup(node.children())
    } else {
        paragraphs_text(node.children())
    }
}

/// Joins the text of child paragraphs with newlines.
fn paragraphs_text(nodes: &[DocNode]) -> String {
    if nodes.iter().all(|n| n.is(node_type::TEXT) || n.is(node_type::HARD_BREAK)) {
        return inline_markup(nodes);
    }
    nodes
        .iter()
        .map(block_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text runs without any markup, for code.
fn plain_text(nodes: &[DocNode]) -> String {
    nodes
        .iter()
        .map(|n| match n.node_type.as_str() {
            node_type::HARD_BREAK => "\n".to_string(),
            _ => n
                .text
                .clone()
                .unwrap_or_else(|| plain_text(n.children())),
        })
        .collect()
}

/// Renders inline nodes back into `**bold**`, `*italic*` and `[text](url)`.
pub fn inline_markup(nodes: &[DocNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node.node_type.as_str() {
            node_type::HARD_BREAK => out.push('\n'),
            node_type::TEXT => {
                let text = node.text.as_deref().unwrap_or_default();
                out.push_str(&apply_marks(text, node));
            }
            _ => out.push_str(&inline_markup(node.children())),
        }
    }
    out
}

fn apply_marks(text: &str, node: &DocNode) -> String {
    let Some(marks) = node.marks.as_deref().filter(|m| !m.is_empty()) else {
        return text.to_string();
    };
    if text.is_empty() {
        return String::new();
    }
    let has = |name: &str| marks.iter().any(|m| m.mark_type == name);

    let mut rendered = text.to_string();
    if has("italic") {
        rendered = format!("*{rendered}*");
    }
    if has("bold") {
        rendered = format!("**{rendered}**");
    }
    let href = marks
        .iter()
        .find(|m| m.mark_type == "link")
        .and_then(|m| m.attrs.as_ref())
        .and_then(|a| a.get("href"))
        .and_then(|v| v.as_str());
    if let Some(href) = href {
        rendered = format!("[{rendered}]({href})");
    }
    rendered
}
