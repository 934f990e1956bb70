//! # Persistence
//!
//! The storage boundary: what a note field is serialized to, the store
//! collaborator that loads and saves those strings, and the failures a save
//! can report.
//!
//! - **`autosave`**: debounced saving with retries, driven by the caller's clock

pub mod autosave;

use std::fmt;

use relative_path::{RelativePath, RelativePathBuf};
use serde::{Deserialize, Serialize};

use crate::convert::{ListGrouping, serialize_nested};
use crate::models::Document;
use crate::parsing::flat::serialize_flat;

pub use autosave::{AutosaveConfig, RetryPolicy, SaveOutcome, SaveRequest, SaveScheduler};

/// Persisted string form of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageFormat {
    #[serde(rename = "flat")]
    FlatBlocks,
    #[serde(rename = "nested")]
    NestedDocument,
}

impl StorageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageFormat::FlatBlocks => "flat",
            StorageFormat::NestedDocument => "nested",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "flat" => Some(StorageFormat::FlatBlocks),
            "nested" => Some(StorageFormat::NestedDocument),
            _ => None,
        }
    }
}

/// The rich-text fields a problem page has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteField {
    Notes,
    Solution,
}

impl NoteField {
    /// Notes are stored nested, solutions flat.
    pub fn default_format(self) -> StorageFormat {
        match self {
            NoteField::Notes => StorageFormat::NestedDocument,
            NoteField::Solution => StorageFormat::FlatBlocks,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteField::Notes => "notes",
            NoteField::Solution => "solution",
        }
    }
}

/// Addresses one field of one note.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoteKey {
    pub note: RelativePathBuf,
    pub field: NoteField,
}

impl NoteKey {
    pub fn new(note: impl AsRef<RelativePath>, field: NoteField) -> Self {
        Self {
            note: note.as_ref().to_relative_path_buf(),
            field,
        }
    }
}

impl fmt::Display for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.note, self.field.as_str())
    }
}

/// Serializes a document into the given storage format.
pub fn serialize(
    document: &Document,
    format: StorageFormat,
    grouping: ListGrouping,
) -> Result<String, serde_json::Error> {
    match format {
        StorageFormat::FlatBlocks => serialize_flat(document),
        StorageFormat::NestedDocument => serialize_nested(document, grouping),
    }
}

/// Why a save failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveErrorKind {
    NotFound,
    TooLarge,
    InvalidFormat,
    RateLimited,
    ServerError,
    NetworkError,
    Timeout,
}

impl SaveErrorKind {
    /// Failures worth retrying: the same request may succeed later.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            SaveErrorKind::RateLimited
                | SaveErrorKind::ServerError
                | SaveErrorKind::NetworkError
                | SaveErrorKind::Timeout
        )
    }

    /// Classifies an HTTP status code. `None` for success codes.
    pub fn from_status(status: u16) -> Option<Self> {
        let kind = match status {
            200..=299 => return None,
            404 => SaveErrorKind::NotFound,
            408 => SaveErrorKind::Timeout,
            413 => SaveErrorKind::TooLarge,
            429 => SaveErrorKind::RateLimited,
            400..=499 => SaveErrorKind::InvalidFormat,
            _ => SaveErrorKind::ServerError,
        };
        Some(kind)
    }

    fn describe(self) -> &'static str {
        match self {
            SaveErrorKind::NotFound => "the note no longer exists",
            SaveErrorKind::TooLarge => "the note is too large to save",
            SaveErrorKind::InvalidFormat => "the content was rejected as invalid",
            SaveErrorKind::RateLimited => "too many saves, slow down",
            SaveErrorKind::ServerError => "the server failed to save the note",
            SaveErrorKind::NetworkError => "the server could not be reached",
            SaveErrorKind::Timeout => "the save timed out",
        }
    }
}

impl fmt::Display for SaveErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Save failed: {kind}{}", detail_suffix(.detail))]
pub struct SaveError {
    pub kind: SaveErrorKind,
    pub detail: Option<String>,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
}

impl SaveError {
    pub fn new(kind: SaveErrorKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_detail(kind: SaveErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }

    pub fn from_status(status: u16) -> Option<Self> {
        SaveErrorKind::from_status(status).map(|kind| Self::with_detail(kind, format!("HTTP {status}")))
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

/// Loads and saves the serialized form of note fields.
pub trait NoteStore {
    /// `Ok(None)` when the field has never been saved.
    fn load(&self, key: &NoteKey) -> Result<Option<String>, SaveError>;

    fn save(&mut self, key: &NoteKey, content: &str) -> Result<(), SaveError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockDraft, BlockKind};
    use crate::parsing::{SourceFormat, load_document};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(404, Some(SaveErrorKind::NotFound))]
    #[case(413, Some(SaveErrorKind::TooLarge))]
    #[case(422, Some(SaveErrorKind::InvalidFormat))]
    #[case(429, Some(SaveErrorKind::RateLimited))]
    #[case(408, Some(SaveErrorKind::Timeout))]
    #[case(503, Some(SaveErrorKind::ServerError))]
    #[case(204, None)]
    fn test_status_classification(#[case] status: u16, #[case] expected: Option<SaveErrorKind>) {
        assert_eq!(SaveErrorKind::from_status(status), expected);
    }

    #[rstest]
    #[case(SaveErrorKind::NotFound, false)]
    #[case(SaveErrorKind::TooLarge, false)]
    #[case(SaveErrorKind::InvalidFormat, false)]
    #[case(SaveErrorKind::RateLimited, true)]
    #[case(SaveErrorKind::ServerError, true)]
    #[case(SaveErrorKind::NetworkError, true)]
    #[case(SaveErrorKind::Timeout, true)]
    fn test_transient_kinds(#[case] kind: SaveErrorKind, #[case] transient: bool) {
        assert_eq!(SaveError::new(kind).is_transient(), transient);
    }

    #[test]
    fn test_error_messages_are_readable() {
        assert_eq!(
            SaveError::new(SaveErrorKind::TooLarge).to_string(),
            "Save failed: the note is too large to save"
        );
        assert_eq!(
            SaveError::from_status(500).unwrap().to_string(),
            "Save failed: the server failed to save the note (HTTP 500)"
        );
    }

    #[rstest]
    #[case(StorageFormat::FlatBlocks, SourceFormat::FlatBlocks)]
    #[case(StorageFormat::NestedDocument, SourceFormat::NestedDocument)]
    fn test_serialize_reads_back(#[case] format: StorageFormat, #[case] detected: SourceFormat) {
        // Given an edited document
        let doc = Document::from_drafts([
            BlockDraft::new(BlockKind::Heading { level: 2 }, "Two Sum"),
            BlockDraft::text("use a *hash map*"),
        ]);

        // When serializing and loading again
        let raw = serialize(&doc, format, ListGrouping::default()).unwrap();
        let loaded = load_document(Some(&raw));

        // Then the format is detected and the blocks survive
        assert_eq!(loaded.format, detected);
        let kinds: Vec<_> = loaded.document.blocks().map(|b| (b.kind.clone(), b.content.clone())).collect();
        let expected: Vec<_> = doc.blocks().map(|b| (b.kind.clone(), b.content.clone())).collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn test_note_key_display() {
        let key = NoteKey::new("arrays/two-sum.json", NoteField::Solution);
        assert_eq!(key.to_string(), "arrays/two-sum.json#solution");
    }
}
