//! # Format Detection & Parsing
//!
//! A persisted note field is a single string written by one of several
//! editor generations. [`detect_and_parse`] classifies it and parses it into
//! an intermediate form; [`load_document`] goes on to build a [`Document`].
//!
//! Detection order:
//! 1. `None`, empty or whitespace-only: the empty document
//! 2. strict JSON: nested document, flat block array, or other JSON (scalars
//!    are read as plain text of the raw input; structured values are
//!    pretty-printed and read as plain text)
//! 3. anything with a `<tag>`: legacy HTML
//! 4. plain text
//!
//! Parsing is total. Whatever goes wrong is reported as a [`ParseWarning`]
//! next to a usable result.

pub mod cursor;
pub mod flat;
pub mod html;
pub mod inline;
pub mod plain_text;
pub mod span;

use serde_json::{Map, Value};

use crate::convert;
use crate::models::{BlockDraft, DocNode, Document, NestedDocument, nested::node_type};

pub use flat::{BlockDecodeError, StoredBlock, serialize_flat};
pub use html::HtmlError;

/// Which persisted format a string was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Empty,
    PlainText,
    LegacyHtml,
    FlatBlocks,
    NestedDocument,
}

impl SourceFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Empty => "empty",
            SourceFormat::PlainText => "plain text",
            SourceFormat::LegacyHtml => "legacy html",
            SourceFormat::FlatBlocks => "flat blocks",
            SourceFormat::NestedDocument => "nested document",
        }
    }
}

/// A recoverable problem met while reading persisted content.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseWarning {
    #[error("content looks like JSON but does not parse ({message}); read as text")]
    MalformedJson { message: String },
    #[error("JSON of an unknown shape was read as plain text")]
    StructuredJsonAsText,
    #[error("content could not be parsed ({reason}); kept as a single paragraph")]
    FallbackParagraph { reason: String },
    #[error("block {index}: {source}")]
    BlockDecode {
        index: usize,
        source: BlockDecodeError,
    },
    #[error("block {index}: unknown type `{name}` read as text")]
    UnknownBlockType { index: usize, name: String },
    #[error("block {index}: id {id} already used; a new id was assigned")]
    DuplicateId { index: usize, id: u64 },
    #[error("block {index}: divider content dropped")]
    DividerContentDropped { index: usize },
    #[error("node {index}: {message}")]
    NodeDecode { index: usize, message: String },
}

/// Parsed content before it becomes a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum Intermediate {
    Blocks(Vec<BlockDraft>),
    /// Nested documents are passed through unchanged.
    Nested(NestedDocument),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub format: SourceFormat,
    pub content: Intermediate,
    pub warnings: Vec<ParseWarning>,
}

impl Parsed {
    fn blocks(format: SourceFormat, drafts: Vec<BlockDraft>, warnings: Vec<ParseWarning>) -> Self {
        Self {
            format,
            content: Intermediate::Blocks(drafts),
            warnings,
        }
    }

    fn empty() -> Self {
        Self::blocks(SourceFormat::Empty, Vec::new(), Vec::new())
    }
}

/// A document read from storage, with what was learned along the way.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: Document,
    pub format: SourceFormat,
    pub warnings: Vec<ParseWarning>,
}

/// Classifies `raw` and parses it. Never fails and never panics; an empty
/// block list stands for the empty document.
pub fn detect_and_parse(raw: Option<&str>) -> Parsed {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Parsed::empty();
    };

    let parsed = match serde_json::from_str::<Value>(raw) {
        Ok(value) => parse_json(raw, value),
        Err(err) => {
            let trimmed = raw.trim_start();
            let mut warnings = Vec::new();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                warnings.push(ParseWarning::MalformedJson {
                    message: err.to_string(),
                });
            }
            if html::looks_like_html(raw) {
                parse_html(raw, warnings)
            } else {
                Parsed::blocks(SourceFormat::PlainText, plain_text::parse_plain_text(raw), warnings)
            }
        }
    };

    log::debug!(
        "Detected {} content with {} warning(s)",
        parsed.format.as_str(),
        parsed.warnings.len()
    );
    for warning in &parsed.warnings {
        log::warn!("{warning}");
    }
    parsed
}

/// Parses `raw` all the way to a [`Document`].
pub fn load_document(raw: Option<&str>) -> LoadedDocument {
    let Parsed {
        format,
        content,
        warnings,
    } = detect_and_parse(raw);

    let document = match content {
        Intermediate::Blocks(drafts) => Document::from_drafts(drafts),
        Intermediate::Nested(nested) => Document::from_drafts(convert::nested_to_blocks(&nested)),
    };

    LoadedDocument {
        document,
        format,
        warnings,
    }
}

fn parse_json(raw: &str, value: Value) -> Parsed {
    match value {
        Value::Object(obj)
            if obj.get("type").and_then(Value::as_str) == Some(node_type::DOC)
                && obj.get("content").is_some_and(Value::is_array) =>
        {
            parse_nested(obj)
        }
        Value::Array(items) if flat::is_flat_block_array(&items) => {
            let (drafts, warnings) = flat::decode_flat(&items);
            Parsed::blocks(SourceFormat::FlatBlocks, drafts, warnings)
        }
        // A field emptied by the flat editor
        Value::Array(items) if items.is_empty() => {
            Parsed::blocks(SourceFormat::FlatBlocks, Vec::new(), Vec::new())
        }
        Value::Array(_) | Value::Object(_) => {
            let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_string());
            Parsed::blocks(
                SourceFormat::PlainText,
                plain_text::parse_plain_text(&text),
                vec![ParseWarning::StructuredJsonAsText],
            )
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Parsed::blocks(SourceFormat::PlainText, plain_text::parse_plain_text(raw), Vec::new())
        }
    }
}

/// Decodes each top-level node on its own so one bad node cannot take the
/// document down with it.
fn parse_nested(mut obj: Map<String, Value>) -> Parsed {
    let items = match obj.remove("content") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    obj.remove("type");

    let mut warnings = Vec::new();
    let content = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<DocNode>(item.clone()).unwrap_or_else(|err| {
                warnings.push(ParseWarning::NodeDecode {
                    index,
                    message: err.to_string(),
                });
                let hint = item
                    .get("text")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .unwrap_or("Invalid block");
                DocNode::paragraph(&format!("[Conversion Error: {hint}]"))
            })
        })
        .collect();

    Parsed {
        format: SourceFormat::NestedDocument,
        content: Intermediate::Nested(NestedDocument {
            extra: obj,
            ..NestedDocument::new(content)
        }),
        warnings,
    }
}

fn parse_html(raw: &str, mut warnings: Vec<ParseWarning>) -> Parsed {
    match html::parse_legacy_html(raw) {
        Ok(drafts) => Parsed::blocks(SourceFormat::LegacyHtml, drafts, warnings),
        Err(err) => {
            warnings.push(ParseWarning::FallbackParagraph {
                reason: err.to_string(),
            });
            Parsed::blocks(
                SourceFormat::LegacyHtml,
                vec![BlockDraft::text(raw.trim())],
                warnings,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockKind, BlockType};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn contents(doc: &Document) -> Vec<&str> {
        doc.blocks().map(|b| b.content.as_str()).collect()
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   \n\t "))]
    fn test_empty_input_is_empty_document(#[case] raw: Option<&str>) {
        let loaded = load_document(raw);
        assert_eq!(loaded.format, SourceFormat::Empty);
        assert!(loaded.document.is_blank());
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_nested_document_passes_through() {
        // Given a nested document with an extra top-level key
        let raw = r#"{"type":"doc","version":1,"content":[{"type":"paragraph","content":[{"type":"text","text":"hi"}]}]}"#;

        // When parsing
        let parsed = detect_and_parse(Some(raw));

        // Then it is kept verbatim
        assert_eq!(parsed.format, SourceFormat::NestedDocument);
        let Intermediate::Nested(doc) = parsed.content else {
            panic!("expected nested content");
        };
        let round_trip: Value = serde_json::to_value(&doc).unwrap();
        assert_eq!(round_trip, serde_json::from_str::<Value>(raw).unwrap());
    }

    #[test]
    fn test_bad_nested_node_is_isolated() {
        let raw = r#"{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"ok"}]},{"text":"orphan"}]}"#;

        let loaded = load_document(Some(raw));

        assert_eq!(contents(&loaded.document), vec!["ok", "[Conversion Error: orphan]"]);
        assert!(matches!(
            loaded.warnings.as_slice(),
            [ParseWarning::NodeDecode { index: 1, .. }]
        ));
    }

    #[test]
    fn test_flat_array_is_detected() {
        let raw = r#"[{"id":1,"type":"heading","content":"Notes","level":2},{"id":2,"type":"bullet","content":"a"}]"#;

        let loaded = load_document(Some(raw));

        assert_eq!(loaded.format, SourceFormat::FlatBlocks);
        let kinds: Vec<_> = loaded.document.blocks().map(|b| b.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Heading { level: 2 }, BlockKind::Bullet { level: 0 }]
        );
    }

    #[test]
    fn test_empty_array_is_empty_document() {
        let loaded = load_document(Some("[]"));
        assert_eq!(loaded.format, SourceFormat::FlatBlocks);
        assert!(loaded.document.is_blank());
    }

    #[rstest]
    #[case("null", "null")]
    #[case("42", "42")]
    #[case("true", "true")]
    #[case("\"quoted\"", "\"quoted\"")]
    fn test_json_scalars_are_plain_text_of_raw(#[case] raw: &str, #[case] expected: &str) {
        let loaded = load_document(Some(raw));
        assert_eq!(loaded.format, SourceFormat::PlainText);
        assert_eq!(contents(&loaded.document), vec![expected]);
    }

    #[test]
    fn test_structured_json_is_pretty_printed_text() {
        let loaded = load_document(Some(r#"{"title":"x"}"#));
        assert_eq!(loaded.format, SourceFormat::PlainText);
        assert_eq!(contents(&loaded.document), vec![r#"{   "title": "x" }"#]);
        assert_eq!(loaded.warnings, vec![ParseWarning::StructuredJsonAsText]);
    }

    #[test]
    fn test_truncated_json_falls_back_to_text() {
        // Given a flat array cut off mid-save
        let raw = r#"[{"id":1,"type":"text","content":"hel"#;

        // When loading
        let loaded = load_document(Some(raw));

        // Then the raw content survives as one paragraph and a warning is raised
        assert_eq!(loaded.format, SourceFormat::PlainText);
        assert_eq!(contents(&loaded.document), vec![raw]);
        assert!(matches!(
            loaded.warnings.as_slice(),
            [ParseWarning::MalformedJson { .. }]
        ));
    }

    #[test]
    fn test_html_is_detected() {
        let loaded = load_document(Some("<h1>Title</h1><p>Body</p>"));
        assert_eq!(loaded.format, SourceFormat::LegacyHtml);
        let types: Vec<_> = loaded.document.blocks().map(|b| b.block_type()).collect();
        assert_eq!(types, vec![BlockType::Heading, BlockType::Text]);
    }

    #[test]
    fn test_html_too_deep_degrades_to_fallback_paragraph() {
        let raw = format!("{}deep", "<div>".repeat(400));
        let loaded = load_document(Some(&raw));
        assert_eq!(loaded.document.len(), 1);
        assert_eq!(loaded.document.first().unwrap().content, raw);
        assert!(matches!(
            loaded.warnings.as_slice(),
            [ParseWarning::FallbackParagraph { .. }]
        ));
    }

    #[rstest]
    #[case("\u{0}\u{1}\u{fffd}garbage\u{7f}")]
    #[case("{")]
    #[case("[")]
    #[case("<")]
    #[case("<<<>>>")]
    #[case("</p>")]
    #[case("[1, 2")]
    fn test_parse_is_total(#[case] raw: &str) {
        let loaded = load_document(Some(raw));
        assert!(loaded.document.len() >= 1);
    }
}
