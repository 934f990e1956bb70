/*!
 * # Editing Core
 *
 * The block editor's edit engine.
 *
 * ## Architecture Overview
 *
 * ### 1. Pure Operations
 * - Every structural edit is a function `(&Document, args) -> Option<Edit>`
 * - The input document is never mutated; `None` means the precondition
 *   failed and nothing happens
 * - Blocks are shared between document versions, so an edit only allocates
 *   the blocks it touches
 *
 * ### 2. Command-Based Session
 * - An [`Editor`] owns the current document, the active block, the caret and
 *   the command menu
 * - All changes are expressed as **Commands** (`Cmd` enum) and applied through
 *   `Editor::apply`, which returns a **Patch**
 * - Key chords are mapped onto commands by `Editor::handle_key`
 *
 * ### 3. Presentation Hints, Not Presentation
 * - Focus and menu placement belong to the front-end; the engine only reports
 *   which block should hold focus (`FocusRequest`) and which block the menu is
 *   anchored to
 *
 * ## Module Structure
 *
 * - **`ops`**: structural operations (insert, delete, split, merge, indent,
 *   type changes)
 * - **`marks`**: bold / italic toggling and link insertion on a selection
 * - **`numbering`**: ordinals for numbered list rows
 * - **`menu`**: slash-command catalog, resolver and menu state
 * - **`commands`**: `Cmd` enum and key chords
 * - **`editor`**: the editing session
 * - **`patch`**: edit result metadata
 *
 * ## Usage Pattern
 *
 * ```rust
 * use codenotes_engine::editing::{Cmd, Editor, Key, KeyChord};
 * use codenotes_engine::models::{BlockKind, Document};
 *
 * let mut editor = Editor::new(Document::new());
 * let block = editor.active();
 *
 * // typing an exact slash token applies it
 * editor.apply(Cmd::SetContent { block, content: "/bullet".to_string(), cursor: 7 });
 * assert_eq!(editor.document().get(block).unwrap().kind, BlockKind::Bullet { level: 0 });
 *
 * // Tab indents a list row
 * let patch = editor.handle_key(KeyChord::plain(Key::Tab));
 * assert_eq!(editor.document().get(block).unwrap().list_level(), Some(1));
 * # let _ = patch;
 * ```
 */

pub mod commands;
pub mod editor;
pub mod marks;
pub mod menu;
pub mod numbering;
pub mod ops;
pub mod patch;

pub use commands::{Cmd, Key, KeyChord};
pub use editor::{Editor, KeyOutcome};
pub use marks::InlineMark;
pub use menu::{MenuCommand, MenuResolution, MenuSection, MenuState};
pub use numbering::{ordinal, ordinals};
pub use ops::{Edit, MediaUpdate};
pub use patch::{FocusRequest, Patch};
