use std::path::Path;

use crate::editing::commands::{self, Command, Context};
use crate::editing::document::Document;
use crate::editing::format::{self, FormatState};
use crate::editing::history::{DEFAULT_HISTORY_DEPTH, History, HistoryEntry};
use crate::editing::metrics::Metrics;
use crate::editing::node::Marks;
use crate::editing::patch::Patch;
use crate::editing::selection::{self, RawRange, Selection};
use crate::error::{EditError, ImageLoadError};
use crate::image::{self, ImagePolicy, ImageUpload};
use crate::sanitize::{self, SanitizePolicy};
use crate::serialize::serialize;

/// Receives the serialized document after every committed change.
pub type ContentListener = Box<dyn FnMut(&str)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    /// Maximum undo steps, 0 for no limit.
    pub history_depth: usize,
    pub image_policy: ImagePolicy,
    /// Keep `<img>` in pasted markup.
    pub paste_images: bool,
    pub placeholder: String,
    pub read_only: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        EditorOptions {
            history_depth: DEFAULT_HISTORY_DEPTH,
            image_policy: ImagePolicy::default(),
            paste_images: false,
            placeholder: String::new(),
            read_only: false,
        }
    }
}

/// An image read that has started but not finished.
///
/// The ticket remembers the document generation it was issued for; completing
/// it after the content was reset does nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLoad {
    generation: u64,
    file_name: String,
    mime: String,
}

/// One editable document with its selection and history.
pub struct Editor {
    document: Document,
    selection: Selection,
    history: History,
    input_marks: Marks,
    read_only: bool,
    placeholder: String,
    last_emitted: String,
    version: u64,
    generation: u64,
    metrics: Metrics,
    document_policy: SanitizePolicy,
    paste_policy: SanitizePolicy,
    listeners: Vec<ContentListener>,
}

impl Editor {
    /// Create an editor from initial markup, sanitized like host content.
    pub fn new(initial: &str, options: EditorOptions) -> Self {
        let document_policy = SanitizePolicy::document().with_image_policy(options.image_policy.clone());
        let paste_policy = SanitizePolicy::paste()
            .with_images(options.paste_images)
            .with_image_policy(options.image_policy);
        let document = sanitize::sanitize_document(initial, &document_policy);
        let selection = start_of(&document);
        let mut editor = Editor {
            document,
            selection,
            history: History::new(options.history_depth),
            input_marks: Marks::NONE,
            read_only: options.read_only,
            placeholder: options.placeholder,
            last_emitted: String::new(),
            version: 0,
            generation: 0,
            metrics: Metrics::default(),
            document_policy,
            paste_policy,
            listeners: Vec::new(),
        };
        editor.refresh();
        editor
    }

    /// Replace the content from outside. Markup equal to what the editor
    /// last emitted is ignored; anything else resets document, selection and
    /// history. Returns whether a reset happened.
    pub fn set_value(&mut self, markup: &str) -> bool {
        if markup == self.last_emitted {
            return false;
        }
        self.document = sanitize::sanitize_document(markup, &self.document_policy);
        self.selection = start_of(&self.document);
        self.history.clear();
        self.input_marks = Marks::NONE;
        self.generation += 1;
        self.version += 1;
        self.refresh();
        log::debug!("content reset, generation {}", self.generation);
        true
    }

    /// The serialized document.
    pub fn content(&self) -> &str {
        &self.last_emitted
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// True when the placeholder should show.
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Move the selection. Input marks follow the text under the focus.
    pub fn select(&mut self, raw: RawRange) -> &Selection {
        self.selection = selection::resolve(&self.document, &raw);
        self.input_marks = format::marks_at(&self.document, &self.selection);
        &self.selection
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn format_state(&self) -> FormatState {
        FormatState::derive(&self.document, &self.selection, self.input_marks)
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn can_undo(&self) -> bool {
        !self.read_only && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.read_only && self.history.can_redo()
    }

    /// Register a listener for content changes.
    pub fn on_change(&mut self, listener: impl FnMut(&str) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Run a command against the current selection.
    ///
    /// A command that changes the document records the previous state in
    /// history and emits the new content; one that does not only updates
    /// the selection and input marks.
    pub fn execute(&mut self, command: Command) -> Result<Patch, EditError> {
        if self.read_only {
            return Err(EditError::ReadOnly);
        }
        let cx = Context {
            document: &self.document,
            selection: &self.selection,
            input_marks: self.input_marks,
            image_policy: &self.paste_policy.image_policy,
            paste_policy: &self.paste_policy,
        };
        let outcome = match commands::apply(&cx, &command) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::debug!("{} rejected: {err}", command.name());
                return Err(err);
            }
        };

        self.input_marks = outcome.input_marks;
        let changed = outcome.document != self.document;
        if changed {
            let before = HistoryEntry {
                document: std::mem::replace(&mut self.document, outcome.document),
                selection: std::mem::replace(&mut self.selection, outcome.selection),
            };
            self.history.record(before);
            self.commit();
        } else {
            self.selection = outcome.selection;
        }
        log::debug!("{} applied, changed: {changed}, version {}", command.name(), self.version);

        Ok(self.patch(changed))
    }

    /// Go back one step. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Patch> {
        if self.read_only {
            return None;
        }
        let current = HistoryEntry {
            document: self.document.clone(),
            selection: self.selection.clone(),
        };
        let entry = self.history.undo(current)?;
        self.install(entry);
        Some(self.patch(true))
    }

    /// Go forward one step. `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Patch> {
        if self.read_only {
            return None;
        }
        let entry = self.history.redo()?;
        self.install(entry);
        Some(self.patch(true))
    }

    /// Start loading an image. The bytes arrive later through
    /// [`Editor::complete_image_load`].
    pub fn begin_image_load(&self, file_name: impl Into<String>, mime: impl Into<String>) -> ImageLoad {
        ImageLoad {
            generation: self.generation,
            file_name: file_name.into(),
            mime: mime.into(),
        }
    }

    /// Finish an image load: validate and insert at the current selection.
    /// Returns `Ok(None)` when the content was reset since the load began.
    pub fn complete_image_load(&mut self, load: ImageLoad, bytes: Vec<u8>) -> Result<Option<Patch>, EditError> {
        if load.generation != self.generation {
            log::warn!(
                "discarding image {} loaded for generation {}, now {}",
                load.file_name,
                load.generation,
                self.generation
            );
            return Ok(None);
        }
        let upload = ImageUpload::new(load.file_name, load.mime, bytes);
        self.execute(Command::InsertImage(upload)).map(Some)
    }

    /// Read an image file and insert it.
    pub fn insert_image_file(&mut self, path: &Path) -> Result<Patch, ImageLoadError> {
        let upload = image::read_image_file(path)?;
        Ok(self.execute(Command::InsertImage(upload))?)
    }

    fn install(&mut self, entry: HistoryEntry) {
        self.document = entry.document;
        self.selection = entry.selection;
        self.input_marks = format::marks_at(&self.document, &self.selection);
        self.commit();
    }

    /// Bump the version, recompute derived state and emit the content.
    fn commit(&mut self) {
        self.version += 1;
        self.refresh();
        for listener in &mut self.listeners {
            listener(&self.last_emitted);
        }
    }

    fn refresh(&mut self) {
        self.metrics = Metrics::recompute(&self.document);
        self.last_emitted = serialize(&self.document);
    }

    fn patch(&self, changed: bool) -> Patch {
        Patch {
            changed,
            new_selection: self.selection.clone(),
            version: self.version,
        }
    }
}

fn start_of(document: &Document) -> Selection {
    Selection::collapsed(document.position(&document.start_point()))
}
