use crate::parsing::{cursor::Cursor, span::Span};

use super::{
    kinds::{Emphasis, Link, Strong},
    types::InlineNode,
};

/// Parses block content into a sequence of [`InlineNode`]s.
///
/// # Arguments
/// - `base`: Byte offset where `s` begins (for absolute span positions)
/// - `s`: The content to parse
///
/// # Precedence
/// Links are tried first, then `**`, then `*`, so `**a**` is bold rather
/// than an italic span around `*a*`.
///
/// # Returns
/// A vector of inline nodes covering the entire input. Text between markup
/// is emitted as `InlineNode::Text`.
pub fn parse_inline(base: usize, s: &str) -> Vec<InlineNode> {
    let mut cur = Cursor::new(s, base);
    let mut out = vec![];
    let mut text_start = cur.pos();

    fn flush_text(out: &mut Vec<InlineNode>, start: usize, end: usize) {
        if end > start {
            out.push(InlineNode::Text(Span { start, end }));
        }
    }

    while !cur.eof() {
        let parsed = if let Some(node) = try_parse_link(&mut cur) {
            Some(node)
        } else if let Some(node) = try_parse_strong(&mut cur) {
            Some(node)
        } else {
            try_parse_emphasis(&mut cur)
        };

        if let Some(node) = parsed {
            let full = node.full_span();
            flush_text(&mut out, text_start, full.start);
            text_start = full.end;
            out.push(node);
            continue;
        }
        cur.bump();
    }

    flush_text(&mut out, text_start, cur.pos());
    out
}

/// Content with markup delimiters removed (link text kept, URL dropped).
pub fn strip_markup(s: &str) -> String {
    parse_inline(0, s)
        .iter()
        .map(|node| match node {
            InlineNode::Text(sp) => sp.slice(s),
            InlineNode::Strong { inner, .. } | InlineNode::Emphasis { inner, .. } => {
                inner.slice(s)
            }
            InlineNode::Link { text, .. } => text.slice(s),
        })
        .collect()
}

/// Attempts to parse `**bold**` at the current position.
///
/// Returns `None` if not at `**`, if the span isn't closed, or if it is
/// empty. On failure, cursor position is restored.
fn try_parse_strong(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    if !cur.starts_with(Strong::DELIM) {
        return None;
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump_n(Strong::DELIM.len());
    let inner_start = cur.pos();

    if !cur.seek(Strong::DELIM) || cur.pos() == inner_start {
        *cur = saved;
        return None;
    }
    let inner_end = cur.pos();
    cur.bump_n(Strong::DELIM.len());

    Some(InlineNode::Strong {
        full: Span::new(start, cur.pos()),
        inner: Span::new(inner_start, inner_end),
    })
}

/// Attempts to parse `*italic*` at the current position.
///
/// The inner text must not start with whitespace, so `a * b * c` stays text.
fn try_parse_emphasis(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    if cur.peek() != Some(Emphasis::DELIM) {
        return None;
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump();
    let inner_start = cur.pos();

    let opens_on_space = cur.peek().is_none_or(|b| b.is_ascii_whitespace());
    if opens_on_space || !cur.seek(&[Emphasis::DELIM]) || cur.pos() == inner_start {
        *cur = saved;
        return None;
    }
    let inner_end = cur.pos();
    cur.bump();

    Some(InlineNode::Emphasis {
        full: Span::new(start, cur.pos()),
        inner: Span::new(inner_start, inner_end),
    })
}

/// Attempts to parse `[text](url)` at the current position.
///
/// The text may be empty, the URL may not. On failure, cursor position is
/// restored.
fn try_parse_link(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    if cur.peek() != Some(Link::OPEN) {
        return None;
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump();
    let text_start = cur.pos();

    while !cur.eof() && !cur.starts_with(Link::MIDDLE) {
        if cur.peek() == Some(Link::OPEN) {
            // a second `[` starts over; the outer bracket is text
            *cur = saved;
            return None;
        }
        cur.bump();
    }
    if cur.eof() {
        *cur = saved;
        return None;
    }
    let text_end = cur.pos();
    cur.bump_n(Link::MIDDLE.len());
    let url_start = cur.pos();

    if !cur.seek(&[Link::CLOSE]) || cur.pos() == url_start {
        *cur = saved;
        return None;
    }
    let url_end = cur.pos();
    cur.bump();

    Some(InlineNode::Link {
        full: Span::new(start, cur.pos()),
        text: Span::new(text_start, text_end),
        url: Span::new(url_start, url_end),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn parse_simple_text() {
        let nodes = parse_inline(0, "hello world");
        assert_eq!(nodes, vec![InlineNode::Text(Span::new(0, 11))]);
    }

    #[test]
    fn parse_strong() {
        let nodes = parse_inline(0, "a **b** c");
        assert_eq!(
            nodes,
            vec![
                InlineNode::Text(Span::new(0, 2)),
                InlineNode::Strong {
                    full: Span::new(2, 7),
                    inner: Span::new(4, 5),
                },
                InlineNode::Text(Span::new(7, 9)),
            ]
        );
    }

    #[test]
    fn parse_emphasis() {
        let nodes = parse_inline(0, "*it*");
        assert_eq!(
            nodes,
            vec![InlineNode::Emphasis {
                full: Span::new(0, 4),
                inner: Span::new(1, 3),
            }]
        );
    }

    #[test]
    fn parse_link_with_base_offset() {
        let nodes = parse_inline(10, "[docs](https://x.io)");
        assert_eq!(
            nodes,
            vec![InlineNode::Link {
                full: Span::new(10, 30),
                text: Span::new(11, 15),
                url: Span::new(17, 29),
            }]
        );
    }

    #[rstest]
    #[case("**unclosed")]
    #[case("****")]
    #[case("a * b * c")]
    #[case("[text](")]
    #[case("[text]()")]
    #[case("[no link]")]
    #[case("2 * 3")]
    fn unclosed_or_empty_markup_is_text(#[case] input: &str) {
        let nodes = parse_inline(0, input);
        assert!(
            nodes.iter().all(|n| matches!(n, InlineNode::Text(_))),
            "{input:?} parsed as {nodes:?}"
        );
    }

    #[test]
    fn inner_brackets_restart_link() {
        let nodes = parse_inline(0, "[a [b](u)");
        assert_eq!(
            nodes,
            vec![
                InlineNode::Text(Span::new(0, 3)),
                InlineNode::Link {
                    full: Span::new(3, 9),
                    text: Span::new(4, 5),
                    url: Span::new(7, 8),
                },
            ]
        );
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let s = "é **ü** →";
        let nodes = parse_inline(0, s);
        let rebuilt: String = nodes.iter().map(|n| n.full_span().slice(s)).collect();
        assert_eq!(rebuilt, s);
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("**b** and *i*", "b and i")]
    #[case("see [docs](https://x.io)!", "see docs!")]
    fn strip_markup_keeps_visible_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_markup(input), expected);
    }
}
