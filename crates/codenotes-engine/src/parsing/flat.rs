//! The flat block-array JSON form: `[{ "id": 1, "type": "text", "content": "" }, ...]`.
//!
//! Reading is lenient and per element: one malformed block degrades to a
//! marker paragraph and never aborts the rest of the array.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ParseWarning;
use crate::media;
use crate::models::{
    Block, BlockDraft, BlockKind, BlockType, Document, ImageData, MAX_HEADING_LEVEL,
    MAX_LIST_LEVEL, VideoData,
};

/// Wire shape of one block in the flat form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlock {
    pub id: u64,
    #[serde(rename = "type")]
    pub block_type: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Block> for StoredBlock {
    fn from(block: &Block) -> Self {
        let mut stored = StoredBlock {
            id: block.id.0,
            block_type: block.block_type().as_str().to_string(),
            content: block.content.clone(),
            level: None,
            checked: None,
            language: None,
            src: None,
            alt: None,
            video_id: None,
            video_url: None,
            description: None,
        };
        match &block.kind {
            BlockKind::Heading { level } => stored.level = Some(*level),
            BlockKind::Bullet { level } | BlockKind::Numbered { level } => {
                stored.level = Some(*level)
            }
            BlockKind::Todo { level, checked } => {
                stored.level = Some(*level);
                stored.checked = Some(*checked);
            }
            BlockKind::Code { language } => stored.language = language.clone(),
            BlockKind::Image(image) => {
                stored.src = Some(image.src.clone());
                stored.alt = Some(image.alt.clone());
                stored.description = Some(image.description.clone());
            }
            BlockKind::Video(video) => {
                stored.video_id = Some(video.video_id.clone());
                stored.video_url = Some(video.video_url.clone());
                stored.description = Some(video.description.clone());
            }
            BlockKind::Text | BlockKind::Quote | BlockKind::Divider => {}
        }
        stored
    }
}

/// Why a single element of a flat array could not be read.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BlockDecodeError {
    #[error("expected a block object, found {0}")]
    NotAnObject(&'static str),
    #[error("field `{field}` should be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

/// Serializes a document into the flat form.
pub fn serialize_flat(document: &Document) -> Result<String, serde_json::Error> {
    let stored: Vec<StoredBlock> = document.blocks().map(StoredBlock::from).collect();
    serde_json::to_string(&stored)
}

/// True when `items` looks like a flat block array: non-empty, and the first
/// element is an object carrying `id` or `type`.
pub fn is_flat_block_array(items: &[Value]) -> bool {
    items
        .first()
        .and_then(Value::as_object)
        .is_some_and(|obj| obj.contains_key("id") || obj.contains_key("type"))
}

/// Reads every element of a flat array, isolating failures per block.
pub fn decode_flat(items: &[Value]) -> (Vec<BlockDraft>, Vec<ParseWarning>) {
    let mut drafts = Vec::with_capacity(items.len());
    let mut warnings = Vec::new();
    let mut seen_ids = HashSet::new();

    for (index, item) in items.iter().enumerate() {
        match decode_block(index, item, &mut warnings) {
            Ok(mut draft) => {
                if let Some(id) = draft.id
                    && !seen_ids.insert(id)
                {
                    warnings.push(ParseWarning::DuplicateId { index, id });
                    draft.id = None;
                }
                drafts.push(draft);
            }
            Err(source) => {
                log::warn!("Flat block {index} could not be decoded: {source}");
                drafts.push(conversion_error_block(item));
                warnings.push(ParseWarning::BlockDecode { index, source });
            }
        }
    }

    (drafts, warnings)
}

/// Marker paragraph standing in for a block that could not be decoded.
pub fn conversion_error_block(item: &Value) -> BlockDraft {
    let hint = item
        .get("content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("Invalid block");
    BlockDraft::text(format!("[Conversion Error: {hint}]"))
}

fn decode_block(
    index: usize,
    item: &Value,
    warnings: &mut Vec<ParseWarning>,
) -> Result<BlockDraft, BlockDecodeError> {
    let obj = item
        .as_object()
        .ok_or_else(|| BlockDecodeError::NotAnObject(json_kind(item)))?;

    let type_name = match obj.get("type") {
        None | Some(Value::Null) => "text",
        Some(Value::String(s)) => s.as_str(),
        Some(_) => {
            return Err(BlockDecodeError::InvalidField {
                field: "type",
                expected: "a string",
            });
        }
    };

    let mut content = match obj.get("content") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(_) => {
            return Err(BlockDecodeError::InvalidField {
                field: "content",
                expected: "a string",
            });
        }
    };

    let ty = BlockType::from_name(type_name).unwrap_or_else(|| {
        warnings.push(ParseWarning::UnknownBlockType {
            index,
            name: type_name.to_string(),
        });
        BlockType::Text
    });

    let level = obj.get("level").and_then(as_whole_number);
    let str_field = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let kind = match ty {
        BlockType::Heading => BlockKind::Heading {
            level: level.unwrap_or(1).clamp(1, u64::from(MAX_HEADING_LEVEL)) as u8,
        },
        BlockType::Bullet | BlockType::Numbered | BlockType::Todo => {
            let level = level
                .or_else(|| BlockType::legacy_level(type_name).map(u64::from))
                .unwrap_or(0)
                .min(u64::from(MAX_LIST_LEVEL)) as u8;
            let kind = BlockKind::defaults_for(ty, Some(level));
            match kind {
                BlockKind::Todo { level, .. } => BlockKind::Todo {
                    level,
                    checked: obj.get("checked").and_then(Value::as_bool).unwrap_or(false),
                },
                other => other,
            }
        }
        BlockType::Code => BlockKind::Code {
            language: obj
                .get("language")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        },
        BlockType::Divider => {
            if !content.is_empty() {
                warnings.push(ParseWarning::DividerContentDropped { index });
                content.clear();
            }
            BlockKind::Divider
        }
        BlockType::Image => BlockKind::Image(ImageData {
            src: str_field("src"),
            alt: str_field("alt"),
            description: str_field("description"),
        }),
        BlockType::Video => {
            let video_url = str_field("videoUrl");
            let mut video_id = str_field("videoId");
            if video_id.is_empty() {
                video_id = media::extract_youtube_id(&video_url).unwrap_or_default();
            }
            BlockKind::Video(VideoData {
                video_id,
                video_url,
                description: str_field("description"),
            })
        }
        BlockType::Text | BlockType::Quote => BlockKind::defaults_for(ty, None),
    };

    Ok(BlockDraft {
        id: obj.get("id").and_then(as_whole_number).filter(|id| *id > 0),
        kind,
        content,
    })
}

/// Accepts `3`, `3.0` and `"3"` up to `u32::MAX`; anything else is treated
/// as absent.
fn as_whole_number(value: &Value) -> Option<u64> {
    let n = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    if n > u64::from(u32::MAX) {
        log::warn!("Ignoring out of range number {n}");
        return None;
    }
    Some(n)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlockId;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn decode(value: Value) -> (Vec<BlockDraft>, Vec<ParseWarning>) {
        let items = value.as_array().cloned().unwrap_or_default();
        decode_flat(&items)
    }

    #[test]
    fn test_decode_fills_defaults() {
        // Given blocks with only the required fields
        let (drafts, warnings) = decode(json!([
            { "id": 1, "type": "todo", "content": "task" },
            { "id": 2, "type": "heading", "content": "Title" },
        ]));

        // Then per-type defaults are applied
        assert!(warnings.is_empty());
        assert_eq!(
            drafts[0].kind,
            BlockKind::Todo {
                level: 0,
                checked: false
            }
        );
        assert_eq!(drafts[1].kind, BlockKind::Heading { level: 1 });
    }

    #[rstest]
    #[case(json!({ "id": 1, "type": "bullet", "content": "x", "level": 7 }), BlockKind::Bullet { level: 3 })]
    #[case(json!({ "id": 1, "type": "sub-bullet", "content": "x" }), BlockKind::Bullet { level: 1 })]
    #[case(json!({ "id": 1, "type": "heading", "content": "x", "level": 0 }), BlockKind::Heading { level: 1 })]
    #[case(json!({ "id": 1, "type": "heading", "content": "x", "level": 9 }), BlockKind::Heading { level: 6 })]
    #[case(json!({ "id": 1, "type": "numbered", "content": "x", "level": 2.0 }), BlockKind::Numbered { level: 2 })]
    #[case(json!({ "id": 1, "type": "code", "content": "x", "language": "  " }), BlockKind::Code { language: None })]
    fn test_levels_and_fields_are_normalized(#[case] item: Value, #[case] expected: BlockKind) {
        let (drafts, _) = decode(json!([item]));
        assert_eq!(drafts[0].kind, expected);
    }

    #[test]
    fn test_bad_element_degrades_to_marker_paragraph() {
        // Given an array where one element is not an object
        let (drafts, warnings) = decode(json!([
            { "id": 1, "type": "text", "content": "ok" },
            42,
            { "id": 3, "type": "text", "content": { "nested": true } },
        ]));

        // Then the rest of the document survives
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].content, "ok");
        assert_eq!(drafts[1].content, "[Conversion Error: Invalid block]");
        assert_eq!(drafts[2].content, "[Conversion Error: Invalid block]");
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            warnings[0],
            ParseWarning::BlockDecode {
                index: 1,
                source: BlockDecodeError::NotAnObject("a number")
            }
        ));
    }

    #[test]
    fn test_unknown_type_becomes_text_with_warning() {
        let (drafts, warnings) = decode(json!([{ "id": 1, "type": "callout", "content": "hi" }]));
        assert_eq!(drafts[0].kind, BlockKind::Text);
        assert_eq!(drafts[0].content, "hi");
        assert_eq!(
            warnings,
            vec![ParseWarning::UnknownBlockType {
                index: 0,
                name: "callout".to_string()
            }]
        );
    }

    #[test]
    fn test_divider_content_is_dropped() {
        let (drafts, warnings) = decode(json!([{ "id": 1, "type": "divider", "content": "---" }]));
        assert_eq!(drafts[0].content, "");
        assert_eq!(warnings, vec![ParseWarning::DividerContentDropped { index: 0 }]);
    }

    #[test]
    fn test_duplicate_ids_are_released() {
        let (drafts, warnings) = decode(json!([
            { "id": 4, "type": "text", "content": "a" },
            { "id": 4, "type": "text", "content": "b" },
        ]));
        assert_eq!(drafts[0].id, Some(4));
        assert_eq!(drafts[1].id, None);
        assert_eq!(warnings, vec![ParseWarning::DuplicateId { index: 1, id: 4 }]);
    }

    #[test]
    fn test_scalar_content_is_stringified() {
        let (drafts, _) = decode(json!([{ "id": 1, "type": "text", "content": 12 }]));
        assert_eq!(drafts[0].content, "12");
    }

    #[test]
    fn test_legacy_youtube_block_recovers_id_from_url() {
        let (drafts, _) = decode(json!([{
            "id": 1,
            "type": "youtube-with-description",
            "content": "",
            "videoUrl": "https://youtu.be/abc123",
            "description": "talk"
        }]));
        assert_eq!(
            drafts[0].kind,
            BlockKind::Video(VideoData {
                video_id: "abc123".to_string(),
                video_url: "https://youtu.be/abc123".to_string(),
                description: "talk".to_string(),
            })
        );
    }

    #[test]
    fn test_is_flat_block_array() {
        assert!(is_flat_block_array(&[json!({ "type": "text" })]));
        assert!(is_flat_block_array(&[json!({ "id": 1 })]));
        assert!(!is_flat_block_array(&[json!({ "name": "x" })]));
        assert!(!is_flat_block_array(&[json!(1)]));
        assert!(!is_flat_block_array(&[]));
    }

    #[test]
    fn test_serialize_flat_snapshot() {
        let doc = Document::from_blocks([
            Block::new(BlockId(1), BlockKind::Heading { level: 2 }, "Approach"),
            Block::new(
                BlockId(2),
                BlockKind::Todo {
                    level: 1,
                    checked: true,
                },
                "two pointers",
            ),
            Block::new(
                BlockId(3),
                BlockKind::Code {
                    language: Some("rust".to_string()),
                },
                "fn main() {}",
            ),
            Block::new(BlockId(4), BlockKind::Divider, ""),
        ]);

        let json = serialize_flat(&doc).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        insta::assert_json_snapshot!(value, @r#"
        [
          {
            "content": "Approach",
            "id": 1,
            "level": 2,
            "type": "heading"
          },
          {
            "checked": true,
            "content": "two pointers",
            "id": 2,
            "level": 1,
            "type": "todo"
          },
          {
            "content": "fn main() {}",
            "id": 3,
            "language": "rust",
            "type": "code"
          },
          {
            "content": "",
            "id": 4,
            "type": "divider"
          }
        ]
        "#);
    }
}
