use crate::persistence::{NoteField, NoteKey, NoteStore, SaveError, SaveErrorKind};
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

/// Marker inserted before the extension of a note's solution file.
pub const SOLUTION_MARKER: &str = "solution";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
}

impl From<IoError> for SaveError {
    fn from(err: IoError) -> Self {
        let kind = match &err {
            IoError::NotFound(_) | IoError::InvalidNotesDir(_) => SaveErrorKind::NotFound,
            IoError::Io(io) => match io.kind() {
                std::io::ErrorKind::TimedOut
                | std::io::ErrorKind::Interrupted
                | std::io::ErrorKind::WouldBlock => SaveErrorKind::Timeout,
                std::io::ErrorKind::StorageFull | std::io::ErrorKind::FileTooLarge => {
                    SaveErrorKind::TooLarge
                }
                std::io::ErrorKind::InvalidData => SaveErrorKind::InvalidFormat,
                _ => SaveErrorKind::ServerError,
            },
        };
        SaveError::with_detail(kind, err.to_string())
    }
}

/// Read a note file and return its content
pub fn read_file(relative_path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write content to a note file, creating parent directories
pub fn write_file(
    relative_path: &RelativePath,
    notes_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(notes_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

/// File holding one field of a note.
///
/// The notes field is the note file itself; the solution lives next to it as
/// `<stem>.solution.<ext>`.
pub fn field_path(key: &NoteKey) -> RelativePathBuf {
    match key.field {
        NoteField::Notes => key.note.clone(),
        NoteField::Solution => {
            let stem = key.note.file_stem().unwrap_or_default();
            let name = match key.note.extension() {
                Some(ext) => format!("{stem}.{SOLUTION_MARKER}.{ext}"),
                None => format!("{stem}.{SOLUTION_MARKER}"),
            };
            key.note.with_file_name(name)
        }
    }
}

/// True for a note's solution file rather than a note.
pub fn is_solution_file(path: &RelativePath) -> bool {
    path.extension() == Some(SOLUTION_MARKER)
        || path
            .file_stem()
            .is_some_and(|stem| stem.ends_with(&format!(".{SOLUTION_MARKER}")))
}

/// Scan the notes directory for note files accepted by `is_note`.
///
/// Solution files are fields of their note and never listed on their own.
pub fn scan_note_files(
    notes_root: &Path,
    is_note: &dyn Fn(&RelativePath) -> bool,
) -> Result<Vec<RelativePathBuf>, IoError> {
    validate_notes_dir(notes_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(notes_root, RelativePath::new(""), &mut files)?;
    files.retain(|f| is_note(f.as_relative_path()) && !is_solution_file(f));
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(
    dir: &Path,
    relative: &RelativePath,
    files: &mut Vec<RelativePathBuf>,
) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let child = relative.join(name);

        if path.is_dir() {
            scan_directory_recursive(&path, &child, files)?;
        } else {
            files.push(child);
        }
    }

    Ok(())
}

pub fn validate_notes_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidNotesDir(format!(
            "{} does not exist or is not a directory",
            path.display()
        )));
    }

    Ok(())
}

/// Note store over a notes directory.
#[derive(Debug, Clone)]
pub struct FileNoteStore {
    root: PathBuf,
}

impl FileNoteStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, IoError> {
        let root = root.into();
        validate_notes_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl NoteStore for FileNoteStore {
    fn load(&self, key: &NoteKey) -> Result<Option<String>, SaveError> {
        match read_file(&field_path(key), &self.root) {
            Ok(content) => Ok(Some(content)),
            Err(IoError::NotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, key: &NoteKey, content: &str) -> Result<(), SaveError> {
        write_file(&field_path(key), &self.root, content)?;
        log::debug!("Wrote {} bytes to {}", content.len(), field_path(key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_file, create_test_notes_dir};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn any_json(path: &RelativePath) -> bool {
        path.extension() == Some("json")
    }

    #[test]
    fn test_scan_finds_notes_but_not_solutions() {
        // Given a notes directory with notes, a solution and other files
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "two-sum.json", "[]");
        create_test_file(&notes_dir, "two-sum.solution.json", "[]");
        create_test_file(&notes_dir, "readme.txt", "hello");

        // When scanning for note files
        let files = scan_note_files(notes_dir.path(), &any_json).unwrap();

        // Then only the note is listed
        assert_eq!(files, vec![RelativePathBuf::from("two-sum.json")]);
    }

    #[test]
    fn test_scan_nested_directories() {
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "root.json", "{}");
        std::fs::create_dir(notes_dir.path().join("graphs")).unwrap();
        std::fs::write(notes_dir.path().join("graphs").join("bfs.json"), "{}").unwrap();
        std::fs::create_dir(notes_dir.path().join(".git")).unwrap();
        std::fs::write(notes_dir.path().join(".git").join("x.json"), "{}").unwrap();

        let files = scan_note_files(notes_dir.path(), &any_json).unwrap();

        assert_eq!(
            files,
            vec![
                RelativePathBuf::from("graphs/bfs.json"),
                RelativePathBuf::from("root.json"),
            ]
        );
    }

    #[test]
    fn test_handle_invalid_notes_directory() {
        let result = scan_note_files(Path::new("/this/path/does/not/exist"), &any_json);
        assert!(matches!(result, Err(IoError::InvalidNotesDir(_))));
        assert!(FileNoteStore::open("/this/path/does/not/exist").is_err());
    }

    #[rstest]
    #[case("two-sum.json", NoteField::Notes, "two-sum.json")]
    #[case("two-sum.json", NoteField::Solution, "two-sum.solution.json")]
    #[case("dp/knapsack", NoteField::Solution, "dp/knapsack.solution")]
    fn test_field_path(#[case] note: &str, #[case] field: NoteField, #[case] expected: &str) {
        assert_eq!(field_path(&NoteKey::new(note, field)), RelativePathBuf::from(expected));
    }

    #[test]
    fn test_store_round_trip() {
        // Given a store over an empty notes directory
        let notes_dir = create_test_notes_dir();
        let mut store = FileNoteStore::open(notes_dir.path()).unwrap();
        let key = NoteKey::new("arrays/two-sum.json", NoteField::Solution);

        // Then a field that was never saved loads as None
        assert_eq!(store.load(&key).unwrap(), None);

        // And a saved field loads back, with parent directories created
        store.save(&key, r#"[{"id":1,"type":"text","content":"hi"}]"#).unwrap();
        assert_eq!(
            store.load(&key).unwrap().as_deref(),
            Some(r#"[{"id":1,"type":"text","content":"hi"}]"#)
        );
        assert!(notes_dir.path().join("arrays/two-sum.solution.json").exists());
    }

    #[test]
    fn test_read_file_not_found() {
        let notes_dir = create_test_notes_dir();
        let result = read_file(RelativePath::new("nonexistent.json"), notes_dir.path());
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_io_errors_map_to_save_errors() {
        let err: SaveError = IoError::Io(std::io::Error::from(std::io::ErrorKind::TimedOut)).into();
        assert_eq!(err.kind, SaveErrorKind::Timeout);
        assert!(err.is_transient());
    }
}
