use codenotes_engine::editing::{MenuState, ordinals};
use codenotes_engine::media;
use codenotes_engine::models::{Block, BlockId, BlockKind, Document};
use codenotes_engine::parsing::inline::{InlineNode, parse_inline};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Renders a document as terminal lines, one or more per block.
///
/// The active block is marked in the gutter; its caret is not drawn here.
pub fn document_lines(document: &Document, active: Option<BlockId>) -> Vec<Line<'static>> {
    let numbers = ordinals(document);
    let mut lines = Vec::new();

    for block in document.blocks() {
        let gutter = if active == Some(block.id) { "▌ " } else { "  " };
        let ordinal = numbers.get(&block.id).copied();
        for (i, mut line) in block_lines(block, ordinal).into_iter().enumerate() {
            let mark = if i == 0 { gutter } else { "  " };
            line.spans
                .insert(0, Span::styled(mark, Style::default().fg(Color::Yellow)));
            lines.push(line);
        }
    }

    lines
}

fn block_lines(block: &Block, ordinal: Option<usize>) -> Vec<Line<'static>> {
    let indent = |level: u8| "  ".repeat(usize::from(level));
    let text = &block.content;

    match &block.kind {
        BlockKind::Text => vec![prefixed(String::new(), text, Style::default())],
        BlockKind::Heading { level } => {
            let style = Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan);
            vec![prefixed(format!("{} ", "#".repeat(usize::from(*level))), text, style)]
        }
        BlockKind::Bullet { level } => {
            vec![prefixed(format!("{}• ", indent(*level)), text, Style::default())]
        }
        BlockKind::Numbered { level } => {
            let n = ordinal.unwrap_or(1);
            vec![prefixed(format!("{}{n}. ", indent(*level)), text, Style::default())]
        }
        BlockKind::Todo { level, checked } => {
            let (box_, style) = if *checked {
                ("[x] ", Style::default().add_modifier(Modifier::CROSSED_OUT))
            } else {
                ("[ ] ", Style::default())
            };
            vec![prefixed(format!("{}{box_}", indent(*level)), text, style)]
        }
        BlockKind::Code { language } => {
            let style = Style::default().fg(Color::Green);
            let mut lines = vec![Line::styled(
                format!("```{}", language.as_deref().unwrap_or("")),
                Style::default().fg(Color::DarkGray),
            )];
            lines.extend(
                text.split('\n')
                    .map(|l| Line::styled(l.to_string(), style)),
            );
            lines.push(Line::styled("```", Style::default().fg(Color::DarkGray)));
            lines
        }
        BlockKind::Quote => {
            let style = Style::default().add_modifier(Modifier::ITALIC);
            vec![prefixed("│ ".to_string(), text, style)]
        }
        BlockKind::Divider => vec![Line::styled("─".repeat(40), Style::default().fg(Color::DarkGray))],
        BlockKind::Image(image) => {
            let label = if image.src.is_empty() {
                "[image: no source]".to_string()
            } else {
                format!("[image: {}]", image.src)
            };
            media_lines(label, &image.description)
        }
        BlockKind::Video(video) => {
            let label = match media::extract_youtube_id(&video.video_url)
                .or_else(|| (!video.video_id.is_empty()).then(|| video.video_id.clone()))
            {
                Some(id) => format!("[video: {}]", media::youtube_watch_url(&id)),
                None => "[video: no url]".to_string(),
            };
            media_lines(label, &video.description)
        }
    }
}

fn media_lines(label: String, description: &str) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(label, Style::default().fg(Color::Magenta))];
    if !description.is_empty() {
        lines.push(Line::styled(
            description.to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines
}

/// A marker followed by the block's inline markup as styled spans.
fn prefixed(marker: String, content: &str, base: Style) -> Line<'static> {
    let mut spans = vec![Span::styled(marker, Style::default().fg(Color::DarkGray))];
    spans.extend(inline_spans(content, base));
    Line::from(spans)
}

pub fn inline_spans(content: &str, base: Style) -> Vec<Span<'static>> {
    parse_inline(0, content)
        .into_iter()
        .map(|node| match node {
            InlineNode::Text(sp) => Span::styled(sp.slice(content).to_string(), base),
            InlineNode::Strong { inner, .. } => Span::styled(
                inner.slice(content).to_string(),
                base.add_modifier(Modifier::BOLD),
            ),
            InlineNode::Emphasis { inner, .. } => Span::styled(
                inner.slice(content).to_string(),
                base.add_modifier(Modifier::ITALIC),
            ),
            InlineNode::Link { text, .. } => Span::styled(
                text.slice(content).to_string(),
                base.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            ),
        })
        .collect()
}

/// Lines of the command menu, the selected entry highlighted.
pub fn menu_lines(menu: &MenuState) -> Vec<Line<'static>> {
    let MenuState::Open {
        query,
        selected,
        items,
        ..
    } = menu
    else {
        return Vec::new();
    };

    if items.is_empty() {
        return vec![Line::from(format!("No commands match \"{query}\""))];
    }

    items
        .iter()
        .enumerate()
        .map(|(i, cmd)| {
            let style = if i == *selected {
                Style::default().bg(Color::Yellow).fg(Color::Black)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{:<12}", cmd.label), style),
                Span::styled(
                    format!(" {}", cmd.description),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use codenotes_engine::models::BlockDraft;
    use pretty_assertions::assert_eq;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_numbered_rows_show_ordinals() {
        let doc = Document::from_drafts([
            BlockDraft::new(BlockKind::Numbered { level: 0 }, "sort"),
            BlockDraft::new(BlockKind::Numbered { level: 0 }, "sweep"),
        ]);

        let lines: Vec<_> = document_lines(&doc, None).iter().map(plain).collect();

        assert_eq!(lines, vec!["  1. sort", "  2. sweep"]);
    }

    #[test]
    fn test_markup_is_styled_not_shown() {
        let spans = inline_spans("a **b** [c](http://x)", Style::default());

        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "a b c");
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_code_block_spans_lines() {
        let doc = Document::from_drafts([BlockDraft::new(
            BlockKind::Code {
                language: Some("rust".to_string()),
            },
            "let a = 1;\nlet b = 2;",
        )]);

        let lines: Vec<_> = document_lines(&doc, Some(BlockId(1))).iter().map(plain).collect();

        assert_eq!(lines, vec!["▌ ```rust", "  let a = 1;", "  let b = 2;", "  ```"]);
    }
}
