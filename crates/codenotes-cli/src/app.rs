use std::ops::Range;
use std::time::Instant;

use anyhow::Result;
use codenotes_config::Config;
use codenotes_engine::editing::{Cmd, Editor, Key, KeyChord, KeyOutcome};
use codenotes_engine::io::{self, FileNoteStore};
use codenotes_engine::models::BlockId;
use codenotes_engine::parsing::load_document;
use codenotes_engine::paste::ClipboardData;
use codenotes_engine::persistence::{
    self, NoteField, NoteKey, NoteStore, SaveOutcome, SaveScheduler,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use relative_path::{RelativePath, RelativePathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Edit,
}

/// URL being typed for a link on `selection` of `block`.
#[derive(Debug, Clone)]
pub struct LinkPrompt {
    pub block: BlockId,
    pub selection: Range<usize>,
    pub url: String,
}

pub struct App {
    pub config: Config,
    pub notes: Vec<RelativePathBuf>,
    pub list_state: ListState,
    pub field: NoteField,
    pub mode: Mode,
    pub editor: Option<Editor>,
    pub link_prompt: Option<LinkPrompt>,
    pub status: String,
    pub should_quit: bool,
    store: FileNoteStore,
    scheduler: SaveScheduler,
    saved_version: u64,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let store = FileNoteStore::open(&config.notes_path)?;
        let matcher = config.note_matcher()?;
        let is_note = |path: &RelativePath| matcher.matches(path.as_str());
        let notes = io::scan_note_files(&config.notes_path, &is_note)?;
        let scheduler = SaveScheduler::new(config.autosave());
        log::info!("Found {} note(s) in {}", notes.len(), config.notes_path.display());

        let mut app = Self {
            config,
            notes,
            list_state: ListState::default(),
            field: NoteField::Notes,
            mode: Mode::Browse,
            editor: None,
            link_prompt: None,
            status: String::new(),
            should_quit: false,
            store,
            scheduler,
            saved_version: 0,
        };

        // Select first note if available
        if !app.notes.is_empty() {
            app.list_state.select(Some(0));
            app.open_selected();
        }

        Ok(app)
    }

    pub fn current_key(&self) -> Option<NoteKey> {
        let note = self.notes.get(self.list_state.selected()?)?;
        Some(NoteKey::new(note, self.field))
    }

    fn next_note(&mut self) {
        if self.notes.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.notes.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
        self.open_selected();
    }

    fn previous_note(&mut self) {
        if self.notes.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.notes.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
        self.open_selected();
    }

    fn toggle_field(&mut self) {
        self.field = match self.field {
            NoteField::Notes => NoteField::Solution,
            NoteField::Solution => NoteField::Notes,
        };
        self.open_selected();
    }

    /// Loads the selected note field into a fresh editor. Anything still
    /// waiting out the debounce for the previous field is dropped.
    fn open_selected(&mut self) {
        let Some(key) = self.current_key() else {
            return;
        };
        let raw = match self.store.load(&key) {
            Ok(raw) => raw,
            Err(e) => {
                self.status = format!("Error reading {key}: {e}");
                self.editor = None;
                return;
            }
        };

        let loaded = load_document(raw.as_deref());
        self.status = match loaded.warnings.first() {
            Some(warning) => format!("{} ({})", loaded.format.as_str(), warning),
            None => loaded.format.as_str().to_string(),
        };
        let editor = Editor::new(loaded.document).with_paste_limit(self.config.editor.paste_limit);
        self.saved_version = editor.version();
        self.editor = Some(editor);
        self.scheduler.open(key);
        self.link_prompt = None;
    }

    /// Time until the next save is due, for the event loop's poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Runs any save that has become due.
    pub fn tick(&mut self, now: Instant) {
        if let Some(outcome) = self.scheduler.drive(&mut self.store, now) {
            self.status = match outcome {
                SaveOutcome::Saved { .. } => "Saved".to_string(),
                SaveOutcome::Retrying { attempt, error, .. } => {
                    format!("{error}, retrying (attempt {attempt})")
                }
                SaveOutcome::Superseded { error } => format!("{error}, saving newer edits"),
                SaveOutcome::Failed { error, .. } => error.to_string(),
                SaveOutcome::Stale => return,
            };
        }
    }

    pub fn on_key(&mut self, event: KeyEvent, now: Instant) {
        match self.mode {
            Mode::Browse => self.on_browse_key(event),
            Mode::Edit => {
                if self.link_prompt.is_some() {
                    self.on_link_key(event);
                } else {
                    self.on_edit_key(event);
                }
                self.schedule_if_changed(now);
            }
        }
    }

    pub fn on_paste(&mut self, text: String, now: Instant) {
        if self.mode != Mode::Edit {
            return;
        }
        if let Some(editor) = self.editor.as_mut() {
            let block = editor.active();
            let cursor = editor.selection().start;
            editor.apply(Cmd::Paste {
                block,
                cursor,
                data: ClipboardData::text(text),
            });
        }
        self.schedule_if_changed(now);
    }

    fn on_browse_key(&mut self, event: KeyEvent) {
        match event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.next_note(),
            KeyCode::Up | KeyCode::Char('k') => self.previous_note(),
            KeyCode::Tab => self.toggle_field(),
            KeyCode::Enter | KeyCode::Char('e') if self.editor.is_some() => {
                self.mode = Mode::Edit;
            }
            _ => {}
        }
    }

    fn on_link_key(&mut self, event: KeyEvent) {
        let Some(prompt) = self.link_prompt.as_mut() else {
            return;
        };
        match event.code {
            KeyCode::Char(c) => prompt.url.push(c),
            KeyCode::Backspace => {
                prompt.url.pop();
            }
            KeyCode::Esc => self.link_prompt = None,
            KeyCode::Enter => {
                if let Some(LinkPrompt {
                    block,
                    selection,
                    url,
                }) = self.link_prompt.take()
                    && let Some(editor) = self.editor.as_mut()
                {
                    editor.apply(Cmd::InsertLink {
                        block,
                        range: selection,
                        url,
                    });
                }
            }
            _ => {}
        }
    }

    fn on_edit_key(&mut self, event: KeyEvent) {
        let Some(editor) = self.editor.as_mut() else {
            self.mode = Mode::Browse;
            return;
        };

        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let shift = event.modifiers.contains(KeyModifiers::SHIFT);

        if ctrl && event.code == KeyCode::Char('s') {
            self.scheduler.flush(Instant::now());
            return;
        }
        if ctrl && event.code == KeyCode::Char('t') {
            let block = editor.active();
            editor.apply(Cmd::ToggleChecked { block });
            return;
        }

        if let Some(chord) = chord_for(&event) {
            match editor.handle_key(chord) {
                KeyOutcome::Handled(_) => return,
                KeyOutcome::LinkRequested { block, selection } => {
                    self.link_prompt = Some(LinkPrompt {
                        block,
                        selection,
                        url: String::new(),
                    });
                    return;
                }
                KeyOutcome::Ignored => {}
            }
        }

        match event.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Char(c) if !ctrl => type_char(editor, c),
            KeyCode::Enter => type_char(editor, '\n'),
            KeyCode::Backspace => delete_before_caret(editor),
            KeyCode::Left => move_caret(editor, -1, shift),
            KeyCode::Right => move_caret(editor, 1, shift),
            KeyCode::Up => focus_neighbour(editor, false),
            KeyCode::Down => focus_neighbour(editor, true),
            _ => {}
        }
    }

    fn schedule_if_changed(&mut self, now: Instant) {
        let Some(editor) = self.editor.as_ref() else {
            return;
        };
        if editor.version() == self.saved_version {
            return;
        }
        self.saved_version = editor.version();

        let format = self.config.storage_format(self.field);
        match persistence::serialize(editor.document(), format, self.config.storage.list_grouping) {
            Ok(content) => self.scheduler.schedule(content, now),
            Err(e) => self.status = format!("Error serializing note: {e}"),
        }
    }
}

fn chord_for(event: &KeyEvent) -> Option<KeyChord> {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);
    let key = match event.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => {
            return Some(KeyChord::shift(Key::Tab));
        }
        KeyCode::Esc => Key::Escape,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Char(c) => Key::Char(c),
        _ => return None,
    };
    Some(KeyChord { key, ctrl, shift })
}

fn type_char(editor: &mut Editor, c: char) {
    let block = editor.active();
    let Some(current) = editor.document().get(block) else {
        return;
    };
    let selection = editor.selection();
    let (content, cursor) = replace_chars(&current.content, selection, &c.to_string());
    editor.apply(Cmd::SetContent {
        block,
        content,
        cursor,
    });
}

fn delete_before_caret(editor: &mut Editor) {
    let block = editor.active();
    let Some(current) = editor.document().get(block) else {
        return;
    };
    let selection = editor.selection();
    let range = if selection.is_empty() {
        selection.start.saturating_sub(1)..selection.start
    } else {
        selection
    };
    let (content, cursor) = replace_chars(&current.content, range, "");
    editor.apply(Cmd::SetContent {
        block,
        content,
        cursor,
    });
}

fn move_caret(editor: &mut Editor, delta: isize, extend: bool) {
    let block = editor.active();
    let Some(len) = editor.document().get(block).map(|b| b.char_len()) else {
        return;
    };
    let selection = editor.selection();
    let head = selection.end.saturating_add_signed(delta).min(len);
    let selection = if extend {
        selection.start.min(head)..selection.start.max(head)
    } else {
        head..head
    };
    editor.apply(Cmd::Focus { block, selection });
}

fn focus_neighbour(editor: &mut Editor, forward: bool) {
    let active = editor.active();
    let neighbour = if forward {
        editor.document().next(active)
    } else {
        editor.document().previous(active)
    };
    if let Some(block) = neighbour {
        let (block, end) = (block.id, block.char_len());
        editor.apply(Cmd::Focus {
            block,
            selection: end..end,
        });
    }
}

/// Replaces the chars in `range` with `text`; returns the new content and the
/// caret after the inserted text.
fn replace_chars(content: &str, range: Range<usize>, text: &str) -> (String, usize) {
    let byte = |chars: usize| {
        content
            .char_indices()
            .nth(chars)
            .map_or(content.len(), |(i, _)| i)
    };
    let (start, end) = (byte(range.start), byte(range.end.max(range.start)));
    let next = format!("{}{}{}", &content[..start], text, &content[end..]);
    (next, range.start + text.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replace_chars_inserts_at_caret() {
        assert_eq!(replace_chars("héllo", 2..2, "X"), ("héXllo".to_string(), 3));
    }

    #[test]
    fn test_replace_chars_replaces_selection() {
        assert_eq!(replace_chars("two sum", 0..3, ""), (" sum".to_string(), 0));
    }

    #[test]
    fn test_backtab_is_shift_tab() {
        let event = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(chord_for(&event), Some(KeyChord::shift(Key::Tab)));
    }

    #[test]
    fn test_typing_slash_command_in_app_flow() {
        // Given an editor on an empty document
        let mut editor = Editor::new(codenotes_engine::models::Document::new());

        // When typing "/todo" one char at a time
        for c in "/todo".chars() {
            type_char(&mut editor, c);
        }

        // Then the exact token converts the block
        let block = editor.document().first().unwrap();
        assert_eq!(block.block_type(), codenotes_engine::models::BlockType::Todo);
        assert_eq!(block.content, "");
    }
}
