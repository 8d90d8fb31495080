/*!
 * # Editing Core Module
 *
 * The document tree, the addressing that points into it, and the commands
 * that change it.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: the Document tree
 * - A **`Document`** is an ordered list of top-level **`Block`**s
 * - Text blocks hold inline content in canonical form: runs of text that
 *   share marks and link target are merged, atoms (images, line breaks) are
 *   surrounded by runs
 * - The document is never empty; it always has a block for the caret
 *
 * ### 2. Mutations return the selection
 * - Every mutation primitive (`insert_text`, `delete_range`, `wrap_range`,
 *   `split_block`, `insert_node`, ...) takes positions in the current tree
 *   and returns the **`Selection`** that is valid in the tree it leaves
 * - Stale positions are resolved by walking to the nearest surviving node,
 *   never by failing
 *
 * ### 3. Command-Based Editing
 * - All edits are **Commands** (`Command` enum) applied by a pure function
 *   of `(Document, Selection, input marks)`
 * - A command that fails validation changes nothing
 *
 * ### 4. Snapshot History
 * - The **`Editor`** records `(Document, Selection)` before every command
 *   that changes the document; undo and redo swap whole snapshots
 *
 * ## Module Structure
 *
 * - **`node`**: `Block`, `Inline`, `TextRun`, marks and block kinds
 * - **`content`**: canonical inline content and offset arithmetic
 * - **`document`**: `Document` and its mutation primitives
 * - **`lists`**: indent, outdent and lifting of list items
 * - **`selection`**: `Position`, `Selection` and resolution of raw ranges
 * - **`format`**: `FormatState` for toolbars
 * - **`commands`**: `Command` enum and the dispatcher
 * - **`history`**: linear undo history
 * - **`metrics`**: word and character counts
 * - **`editor`**: the `Editor` facade tying it all together
 * - **`patch`**: result of executing a command
 *
 * ## Usage Pattern
 *
 * ```rust
 * use quire_engine::editing::*;
 *
 * let mut editor = Editor::new("<p>Hello world</p>", EditorOptions::default());
 * editor.select(RawRange::text(6, 11));
 * let patch = editor.execute(Command::ToggleMark(Mark::Bold)).unwrap();
 * assert!(patch.changed);
 * assert_eq!(editor.content(), "<p>Hello <b>world</b></p>");
 *
 * editor.undo();
 * assert_eq!(editor.content(), "<p>Hello world</p>");
 * ```
 */

// Module exports
pub mod commands;
pub mod content;
pub mod document;
pub mod editor;
pub mod format;
pub mod history;
pub mod lists;
pub mod metrics;
pub mod node;
pub mod patch;
pub mod selection;

// Public API re-exports
pub use commands::Command;
pub use document::{Document, Format};
pub use editor::{ContentListener, Editor, EditorOptions, ImageLoad};
pub use format::FormatState;
pub use history::{History, HistoryEntry};
pub use metrics::Metrics;
pub use node::{Alignment, Block, BlockKind, BlockType, Inline, ListKind, Mark, Marks, Node, TextRun};
pub use patch::Patch;
pub use selection::{Position, RawPoint, RawRange, Selection};
