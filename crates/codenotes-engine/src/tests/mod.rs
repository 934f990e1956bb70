use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::persistence::{NoteKey, NoteStore, SaveError, SaveErrorKind};

/// Create a temporary notes directory with test files
pub fn create_test_notes_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test note file with content
pub fn create_test_file(notes_dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = notes_dir.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}

/// In-memory store recording every save it receives.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    contents: HashMap<NoteKey, String>,
    saves: Vec<(NoteKey, String)>,
    fail_with: Option<SaveErrorKind>,
}

impl MemoryNoteStore {
    /// A store whose saves always fail with `kind`.
    pub fn failing(kind: SaveErrorKind) -> Self {
        Self {
            fail_with: Some(kind),
            ..Self::default()
        }
    }

    /// Successful saves, in order.
    pub fn saves(&self) -> Vec<(NoteKey, String)> {
        self.saves.clone()
    }
}

impl NoteStore for MemoryNoteStore {
    fn load(&self, key: &NoteKey) -> Result<Option<String>, SaveError> {
        Ok(self.contents.get(key).cloned())
    }

    fn save(&mut self, key: &NoteKey, content: &str) -> Result<(), SaveError> {
        if let Some(kind) = self.fail_with {
            return Err(SaveError::new(kind));
        }
        self.contents.insert(key.clone(), content.to_string());
        self.saves.push((key.clone(), content.to_string()));
        Ok(())
    }
}
