use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node type names of the nested document format.
pub mod node_type {
    pub const DOC: &str = "doc";
    pub const PARAGRAPH: &str = "paragraph";
    pub const TEXT: &str = "text";
    pub const HEADING: &str = "heading";
    pub const BULLET_LIST: &str = "bulletList";
    pub const ORDERED_LIST: &str = "orderedList";
    pub const TASK_LIST: &str = "taskList";
    pub const LIST_ITEM: &str = "listItem";
    pub const TASK_ITEM: &str = "taskItem";
    pub const CODE_BLOCK: &str = "codeBlock";
    pub const BLOCKQUOTE: &str = "blockquote";
    pub const HORIZONTAL_RULE: &str = "horizontalRule";
    pub const HARD_BREAK: &str = "hardBreak";
    pub const IMAGE: &str = "image";
    pub const YOUTUBE: &str = "youtube";
}

/// Root of the nested ("ProseMirror-like") document format:
/// `{ "type": "doc", "content": [...] }`.
///
/// Unknown top-level keys are kept in `extra` so that a document read from
/// storage serializes back without losing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedDocument {
    #[serde(rename = "type")]
    pub node_type: String,
    pub content: Vec<DocNode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NestedDocument {
    pub fn new(content: Vec<DocNode>) -> Self {
        Self {
            node_type: node_type::DOC.to_string(),
            content,
            extra: Map::new(),
        }
    }
}

/// A node in the nested document tree.
///
/// Kept schema-less: unknown node types and attributes written by a newer
/// editor survive a read/write cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<DocNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Mark>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocNode {
    /// A node with no attrs and no content.
    pub fn leaf(node_type: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            attrs: None,
            content: None,
            text: None,
            marks: None,
            extra: Map::new(),
        }
    }

    /// A container node; `content` is always present (possibly empty).
    pub fn container(node_type: &str, content: Vec<DocNode>) -> Self {
        Self {
            content: Some(content),
            ..Self::leaf(node_type)
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::leaf(node_type::TEXT)
        }
    }

    /// Paragraph holding one text run, or no runs for empty text.
    pub fn paragraph(text: &str) -> Self {
        Self::container(node_type::PARAGRAPH, text_runs(text))
    }

    #[must_use]
    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Sets `attrs` to an empty object when it is absent.
    #[must_use]
    pub fn with_empty_attrs(mut self) -> Self {
        self.attrs.get_or_insert_with(Map::new);
        self
    }

    pub fn is(&self, node_type: &str) -> bool {
        self.node_type == node_type
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.as_ref().and_then(|a| a.get(key))
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(Value::as_str)
    }

    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        self.attr(key).and_then(Value::as_u64)
    }

    pub fn attr_bool(&self, key: &str) -> Option<bool> {
        self.attr(key).and_then(Value::as_bool)
    }

    pub fn children(&self) -> &[DocNode] {
        self.content.as_deref().unwrap_or(&[])
    }
}

/// An inline mark on a text node (`bold`, `italic`, `link`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
}

fn text_runs(text: &str) -> Vec<DocNode> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![DocNode::text(text)]
    }
}
