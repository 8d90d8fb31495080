use crate::editing::selection::Selection;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// False when the command left the document as it was (a collapsed
    /// toggle, indent outside a list, ...); nothing was recorded or emitted.
    pub changed: bool,
    pub new_selection: Selection,
    pub version: u64,
}
