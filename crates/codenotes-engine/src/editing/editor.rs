use std::ops::Range;

use super::commands::{Cmd, Key, KeyChord};
use super::marks::{self, InlineMark};
use super::menu::{self, MenuResolution, MenuState};
use super::ops::{self, Edit};
use super::patch::{FocusRequest, Patch};
use crate::models::{BlockId, Document};
use crate::paste::{self, DEFAULT_PASTE_LIMIT};

/// What a key chord did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled(Patch),
    /// Ctrl+K: the front-end should ask for a URL and send
    /// [`Cmd::InsertLink`] for this selection.
    LinkRequested {
        block: BlockId,
        selection: Range<usize>,
    },
    /// Not an editor key; the front-end applies its default behaviour.
    Ignored,
}

/// An editing session over one document.
///
/// Holds the document, the active block, the caret or selection in it and
/// the command menu. Every change goes through [`Editor::apply`], which
/// delegates to the pure operations in [`super::ops`] and reports the result
/// as a [`Patch`].
#[derive(Debug, Clone)]
pub struct Editor {
    document: Document,
    active: BlockId,
    selection: Range<usize>,
    menu: MenuState,
    version: u64,
    paste_limit: usize,
}

impl Editor {
    /// Starts a session with the caret at the start of the first block.
    pub fn new(document: Document) -> Self {
        let active = document.first().map_or(BlockId(1), |b| b.id);
        Self {
            document,
            active,
            selection: 0..0,
            menu: MenuState::Closed,
            version: 0,
            paste_limit: DEFAULT_PASTE_LIMIT,
        }
    }

    #[must_use]
    pub fn with_paste_limit(mut self, limit: usize) -> Self {
        self.paste_limit = limit;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn active(&self) -> BlockId {
        self.active
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    /// Incremented on every change to the document.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Applies a command. Commands whose precondition fails change nothing
    /// and return a patch with no changed blocks and the same version.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let moves_caret = !matches!(cmd, Cmd::SetContent { .. });
        let edit = match cmd {
            Cmd::SetContent {
                block,
                content,
                cursor,
            } => return self.set_content(block, &content, cursor),
            Cmd::Focus { block, selection } => {
                if self.document.contains(block) {
                    if self.menu.anchor().is_some_and(|a| a != block) {
                        self.menu.close();
                    }
                    self.active = block;
                    self.selection = selection;
                }
                return self.unchanged();
            }
            Cmd::InsertBlockAfter {
                block,
                block_type,
                level,
            } => ops::insert_block_after(&self.document, block, block_type, level),
            Cmd::DeleteBlock { block } => ops::delete_block(&self.document, block),
            Cmd::Split { block, cursor } => {
                ops::exit_list_on_empty_enter(&self.document, block)
                    .or_else(|| ops::split_at_cursor(&self.document, block, cursor))
            }
            Cmd::Backspace { block } => match self.document.get(block) {
                Some(b) if b.is_list() => ops::demote_list_item_or_convert(&self.document, block),
                Some(_) => ops::merge_with_previous(&self.document, block),
                None => None,
            },
            Cmd::Indent { block } => ops::indent(&self.document, block),
            Cmd::Outdent { block } => ops::outdent(&self.document, block),
            Cmd::ChangeBlockType {
                block,
                block_type,
                level,
            } => {
                self.menu.close();
                ops::change_block_type(&self.document, block, block_type, level)
            }
            Cmd::ToggleChecked { block } => ops::toggle_checked(&self.document, block),
            Cmd::ToggleMark { block, range, mark } => {
                marks::apply_inline_mark(&self.document, block, range, mark)
            }
            Cmd::InsertLink { block, range, url } => {
                marks::insert_link(&self.document, block, range, &url)
            }
            Cmd::UpdateMedia { block, update } => ops::update_media(&self.document, block, &update),
            Cmd::Paste {
                block,
                cursor,
                data,
            } => match paste::parse_clipboard(&data, self.paste_limit) {
                Ok(drafts) => paste::paste_into(&self.document, block, cursor, drafts),
                Err(err) => {
                    log::warn!("Paste ignored: {err}");
                    None
                }
            },
            Cmd::MenuNext => {
                self.menu.select_next();
                return self.unchanged();
            }
            Cmd::MenuPrevious => {
                self.menu.select_previous();
                return self.unchanged();
            }
            Cmd::MenuClose => {
                self.menu.close();
                return self.unchanged();
            }
            Cmd::MenuConfirm => {
                let chosen = self.menu.anchor().zip(self.menu.selected());
                self.menu.close();
                chosen.and_then(|(anchor, cmd)| {
                    ops::change_block_type(&self.document, anchor, cmd.block_type, cmd.level)
                })
            }
        };

        match edit {
            Some(edit) => self.commit(edit, moves_caret),
            None => self.unchanged(),
        }
    }

    /// Maps a key chord onto a command for the active block.
    pub fn handle_key(&mut self, chord: KeyChord) -> KeyOutcome {
        let block = self.active;
        let selection = self.selection.clone();

        if self.menu.anchor() == Some(block) && !chord.ctrl {
            let cmd = match chord.key {
                Key::Down => Some(Cmd::MenuNext),
                Key::Up => Some(Cmd::MenuPrevious),
                Key::Enter => Some(Cmd::MenuConfirm),
                Key::Escape => Some(Cmd::MenuClose),
                _ => None,
            };
            if let Some(cmd) = cmd {
                return KeyOutcome::Handled(self.apply(cmd));
            }
        }

        let cmd = match (chord.key, chord.ctrl, chord.shift) {
            (Key::Char(c), true, _) => match c.to_ascii_lowercase() {
                'b' => Cmd::ToggleMark {
                    block,
                    range: selection,
                    mark: InlineMark::Bold,
                },
                'i' => Cmd::ToggleMark {
                    block,
                    range: selection,
                    mark: InlineMark::Italic,
                },
                'k' => return KeyOutcome::LinkRequested { block, selection },
                _ => return KeyOutcome::Ignored,
            },
            (Key::Enter, false, false) => Cmd::Split {
                block,
                cursor: selection.start,
            },
            (Key::Backspace, false, _) if selection == (0..0) => Cmd::Backspace { block },
            (Key::Tab, false, _) if self.document.get(block).is_some_and(|b| b.is_list()) => {
                if chord.shift {
                    Cmd::Outdent { block }
                } else {
                    Cmd::Indent { block }
                }
            }
            (Key::Escape, false, _) if self.menu.is_open() => Cmd::MenuClose,
            _ => return KeyOutcome::Ignored,
        };
        KeyOutcome::Handled(self.apply(cmd))
    }

    /// Typing: stores the text, then opens, refines or closes the menu, or
    /// applies an exact slash token.
    fn set_content(&mut self, block: BlockId, content: &str, cursor: usize) -> Patch {
        let Some(edit) = ops::set_content(&self.document, block, content, cursor) else {
            return self.unchanged();
        };

        match menu::resolve(content) {
            MenuResolution::Apply(cmd) => {
                self.menu.close();
                let applied = ops::change_block_type(&edit.document, block, cmd.block_type, cmd.level);
                log::debug!("Applying slash command `{}`", cmd.name);
                match applied {
                    Some(applied) => self.commit(applied, true),
                    None => self.commit(edit, false),
                }
            }
            MenuResolution::Open(items) => {
                let query = content.strip_prefix('/').unwrap_or(content);
                self.menu.refresh(block, query, items);
                self.commit(edit, false)
            }
            MenuResolution::Closed => {
                if self.menu.anchor() == Some(block) {
                    self.menu.close();
                }
                self.commit(edit, false)
            }
        }
    }

    fn commit(&mut self, edit: Edit, moves_caret: bool) -> Patch {
        let Edit {
            document,
            active,
            selection,
            changed,
        } = edit;

        let focus_moved = active != self.active;
        self.document = document;
        self.active = active;
        if let Some(selection) = selection {
            self.selection = selection;
        }
        if !self.document.contains(self.active) {
            self.active = self.document.first().map_or(self.active, |b| b.id);
        }
        if let Some(anchor) = self.menu.anchor()
            && !self.document.contains(anchor)
        {
            self.menu.close();
        }
        self.version += 1;

        let focus = (moves_caret || focus_moved).then(|| FocusRequest {
            block: self.active,
            selection: self.selection.clone(),
        });
        Patch {
            changed,
            active: self.active,
            new_selection: self.selection.clone(),
            version: self.version,
            focus,
        }
    }

    fn unchanged(&self) -> Patch {
        Patch {
            changed: Vec::new(),
            active: self.active,
            new_selection: self.selection.clone(),
            version: self.version,
            focus: None,
        }
    }
}
