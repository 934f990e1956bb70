pub mod convert;
pub mod editing;
pub mod io;
pub mod media;
pub mod models;
pub mod parsing;
pub mod paste;
pub mod persistence;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use convert::ListGrouping;
pub use editing::{Cmd, Editor, Key, KeyChord, KeyOutcome, Patch};
pub use io::{FileNoteStore, IoError};
pub use models::{Block, BlockDraft, BlockId, BlockKind, BlockType, Document};
pub use parsing::{LoadedDocument, SourceFormat, load_document};
pub use paste::ClipboardData;
pub use persistence::{
    NoteField, NoteKey, NoteStore, SaveError, SaveErrorKind, SaveScheduler, StorageFormat,
};
