use crate::parsing::span::Span;

/// A parsed inline node with byte spans into the block content.
///
/// All variants store spans rather than text, so the source can always be
/// reproduced exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode {
    /// Plain text that isn't part of any markup.
    Text(Span),
    /// `**bold**`.
    Strong {
        /// Full span including both `**` delimiters.
        full: Span,
        inner: Span,
    },
    /// `*italic*`.
    Emphasis { full: Span, inner: Span },
    /// `[text](url)`.
    Link {
        full: Span,
        text: Span,
        url: Span,
    },
}

impl InlineNode {
    pub fn full_span(&self) -> Span {
        match self {
            InlineNode::Text(sp) => *sp,
            InlineNode::Strong { full, .. }
            | InlineNode::Emphasis { full, .. }
            | InlineNode::Link { full, .. } => *full,
        }
    }
}
