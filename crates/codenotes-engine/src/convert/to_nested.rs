use serde_json::json;

use super::ListGrouping;
use crate::models::nested::node_type;
use crate::models::{Block, BlockKind, DocNode, MAX_HEADING_LEVEL, NestedDocument};

/// Exports blocks as a nested document.
///
/// Total: every block maps onto exactly one top-level node (or, with
/// [`ListGrouping::MergeAdjacent`], shares a list container with its
/// neighbours), and the result always has at least one node.
pub fn blocks_to_nested<'a>(
    blocks: impl IntoIterator<Item = &'a Block>,
    grouping: ListGrouping,
) -> NestedDocument {
    let blocks: Vec<&Block> = blocks.into_iter().collect();

    let mut content = match grouping {
        ListGrouping::OnePerRow => blocks.iter().map(|b| block_node(b)).collect(),
        ListGrouping::MergeAdjacent => merge_adjacent(&blocks),
    };
    if content.is_empty() {
        content.push(DocNode::paragraph(""));
    }

    log::debug!(
        "Exported {} block(s) as {} nested node(s)",
        blocks.len(),
        content.len()
    );
    NestedDocument::new(content)
}

/// The node for a single block, list rows wrapped in their own container.
pub fn block_node(block: &Block) -> DocNode {
    let content = block.content.as_str();
    match &block.kind {
        BlockKind::Text => DocNode::paragraph(content),
        BlockKind::Heading { level } => {
            DocNode::container(node_type::HEADING, text_runs(content))
                .with_attr("level", (*level).clamp(1, MAX_HEADING_LEVEL))
        }
        BlockKind::Bullet { .. } | BlockKind::Numbered { .. } | BlockKind::Todo { .. } => {
            let (container, _) = list_node_types(&block.kind);
            DocNode::container(container, vec![list_item(block, Vec::new())])
        }
        BlockKind::Code { language } => {
            let node = DocNode::container(node_type::CODE_BLOCK, text_runs(&unescape_newlines(content)))
                .with_empty_attrs();
            match language {
                Some(language) => node.with_attr("language", language.as_str()),
                None => node,
            }
        }
        BlockKind::Quote => {
            DocNode::container(node_type::BLOCKQUOTE, vec![DocNode::paragraph(content)])
        }
        BlockKind::Divider => DocNode::leaf(node_type::HORIZONTAL_RULE),
        BlockKind::Image(image) => DocNode::leaf(node_type::IMAGE)
            .with_attr("src", image.src.as_str())
            .with_attr("alt", image.alt.as_str())
            .with_attr("title", image.description.as_str()),
        BlockKind::Video(video) => {
            let src = if video.video_url.is_empty() && !video.video_id.is_empty() {
                crate::media::youtube_watch_url(&video.video_id)
            } else {
                video.video_url.clone()
            };
            DocNode::leaf(node_type::YOUTUBE)
                .with_attr("src", src)
                .with_attr("description", video.description.as_str())
        }
    }
}

/// Undoes the double encoding older saves applied to code: `\\n` and `\n`
/// escape sequences become real newlines.
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\\\n", "\n").replace("\\n", "\n")
}

fn text_runs(text: &str) -> Vec<DocNode> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![DocNode::text(text)]
    }
}

/// Container and item node types for a list kind.
fn list_node_types(kind: &BlockKind) -> (&'static str, &'static str) {
    match kind {
        BlockKind::Numbered { .. } => (node_type::ORDERED_LIST, node_type::LIST_ITEM),
        BlockKind::Todo { .. } => (node_type::TASK_LIST, node_type::TASK_ITEM),
        _ => (node_type::BULLET_LIST, node_type::LIST_ITEM),
    }
}

fn list_item(block: &Block, nested_lists: Vec<DocNode>) -> DocNode {
    let (_, item_type) = list_node_types(&block.kind);
    let mut children = vec![DocNode::paragraph(&block.content)];
    children.extend(nested_lists);

    let item = DocNode::container(item_type, children);
    match block.kind {
        BlockKind::Todo { checked, .. } => item.with_attr("checked", json!(checked)),
        _ => item,
    }
}

fn merge_adjacent(blocks: &[&Block]) -> Vec<DocNode> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < blocks.len() {
        if !blocks[i].is_list() {
            out.push(block_node(blocks[i]));
            i += 1;
            continue;
        }
        let run_end = blocks[i..]
            .iter()
            .position(|b| !b.is_list())
            .map_or(blocks.len(), |offset| i + offset);
        let rows = normalize_levels(&blocks[i..run_end]);
        out.extend(build_lists(&rows, 0));
        i = run_end;
    }
    out
}

/// Pairs each row with a depth no more than one deeper than the row before
/// it; a run cannot start indented.
fn normalize_levels<'a>(rows: &[&'a Block]) -> Vec<(usize, &'a Block)> {
    let mut previous: Option<usize> = None;
    rows.iter()
        .map(|row| {
            let level = usize::from(row.list_level().unwrap_or(0));
            let depth = previous.map_or(0, |p| level.min(p + 1));
            previous = Some(depth);
            (depth, *row)
        })
        .collect()
}

/// Builds the containers for `rows`, all of which are at `depth` or deeper.
/// Consecutive items of the same list type share one container.
fn build_lists(rows: &[(usize, &Block)], depth: usize) -> Vec<DocNode> {
    let mut containers: Vec<DocNode> = Vec::new();
    let mut current_type: Option<&'static str> = None;
    let mut i = 0;

    while i < rows.len() {
        let (_, block) = rows[i];
        let children_end = rows[i + 1..]
            .iter()
            .position(|(d, _)| *d <= depth)
            .map_or(rows.len(), |offset| i + 1 + offset);
        let nested = build_lists(&rows[i + 1..children_end], depth + 1);
        let item = list_item(block, nested);

        let (container_type, _) = list_node_types(&block.kind);
        match containers.last_mut() {
            Some(container) if current_type == Some(container_type) => {
                container.content.get_or_insert_with(Vec::new).push(item);
            }
            _ => {
                containers.push(DocNode::container(container_type, vec![item]));
                current_type = Some(container_type);
            }
        }
        i = children_end;
    }
    containers
}
