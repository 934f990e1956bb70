use std::time::{Duration, Instant};

use codenotes_engine::convert::ListGrouping;
use codenotes_engine::editing::{Cmd, Editor, InlineMark, Key, KeyChord, KeyOutcome};
use codenotes_engine::io::FileNoteStore;
use codenotes_engine::models::{BlockKind, Document};
use codenotes_engine::parsing::load_document;
use codenotes_engine::persistence::{
    AutosaveConfig, NoteField, NoteKey, NoteStore, SaveOutcome, SaveScheduler, serialize,
};
use pretty_assertions::assert_eq;

fn type_text(editor: &mut Editor, content: &str) {
    let block = editor.active();
    editor.apply(Cmd::SetContent {
        block,
        content: content.to_string(),
        cursor: content.chars().count(),
    });
}

fn press(editor: &mut Editor, chord: KeyChord) {
    assert!(matches!(editor.handle_key(chord), KeyOutcome::Handled(_)));
}

#[test]
fn typing_a_note_and_saving_it() {
    // Given an empty note and a store over a temporary notes directory
    let notes_dir = tempfile::tempdir().unwrap();
    let mut store = FileNoteStore::open(notes_dir.path()).unwrap();
    let key = NoteKey::new("two-sum.json", NoteField::Notes);
    let mut editor = Editor::new(Document::new());
    let mut scheduler = SaveScheduler::new(AutosaveConfig::default());
    scheduler.open(key.clone());
    let start = Instant::now();

    // When the user writes a title, then a bullet list with an indented row
    type_text(&mut editor, "Two Sum");
    press(&mut editor, KeyChord::plain(Key::Enter));
    type_text(&mut editor, "/bullet");
    type_text(&mut editor, "hash map lookup");
    press(&mut editor, KeyChord::plain(Key::Enter));
    type_text(&mut editor, "store complements");
    press(&mut editor, KeyChord::plain(Key::Tab));

    let kinds: Vec<_> = editor.document().blocks().map(|b| b.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::Text,
            BlockKind::Bullet { level: 0 },
            BlockKind::Bullet { level: 1 },
        ]
    );

    // And the edits are scheduled for saving
    let content = serialize(editor.document(), NoteField::Notes.default_format(), ListGrouping::default())
        .unwrap();
    scheduler.schedule(content, start);

    // Then nothing is written before the debounce delay
    assert_eq!(scheduler.drive(&mut store, start + Duration::from_millis(100)), None);
    assert_eq!(store.load(&key).unwrap(), None);

    // And after it the note is stored and reads back as the same blocks
    let outcome = scheduler.drive(&mut store, start + Duration::from_millis(500));
    assert_eq!(outcome, Some(SaveOutcome::Saved { attempts: 1 }));
    let saved = store.load(&key).unwrap().unwrap();
    let contents: Vec<_> = load_document(Some(&saved))
        .document
        .blocks()
        .map(|b| b.content.clone())
        .collect();
    assert_eq!(
        contents,
        vec!["Two Sum", "hash map lookup", "store complements"]
    );
}

#[test]
fn switching_documents_cancels_the_pending_save() {
    // Given an edit waiting out the debounce on one note
    let notes_dir = tempfile::tempdir().unwrap();
    let mut store = FileNoteStore::open(notes_dir.path()).unwrap();
    let first = NoteKey::new("a.json", NoteField::Solution);
    let mut scheduler = SaveScheduler::default();
    let start = Instant::now();
    scheduler.open(first.clone());
    scheduler.schedule("[]".to_string(), start);

    // When the user opens another note before it fires
    scheduler.open(NoteKey::new("b.json", NoteField::Solution));

    // Then no save ever happens
    assert_eq!(scheduler.drive(&mut store, start + Duration::from_secs(5)), None);
    assert!(!scheduler.has_pending());
    assert_eq!(store.load(&first).unwrap(), None);
    assert!(std::fs::read_dir(notes_dir.path()).unwrap().next().is_none());
}

#[test]
fn bold_toggle_is_idempotent_in_a_session() {
    // Given a block with a selected word
    let mut editor = Editor::new(Document::new());
    type_text(&mut editor, "use a stack");
    let block = editor.active();

    // When toggling bold on it twice
    editor.apply(Cmd::ToggleMark {
        block,
        range: 6..11,
        mark: InlineMark::Bold,
    });
    assert_eq!(editor.document().get(block).unwrap().content, "use a **stack**");
    let selection = editor.selection();
    editor.apply(Cmd::ToggleMark {
        block,
        range: selection,
        mark: InlineMark::Bold,
    });

    // Then the content is back where it started
    assert_eq!(editor.document().get(block).unwrap().content, "use a stack");
}

#[test]
fn deleting_every_block_leaves_one() {
    let mut editor = Editor::new(Document::new());
    type_text(&mut editor, "first");
    press(&mut editor, KeyChord::plain(Key::Enter));
    type_text(&mut editor, "second");

    for _ in 0..3 {
        let block = editor.active();
        editor.apply(Cmd::DeleteBlock { block });
    }

    assert_eq!(editor.document().len(), 1);
}
