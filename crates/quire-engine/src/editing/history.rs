use crate::editing::document::Document;
use crate::editing::selection::Selection;

/// History depth used when nothing else is configured.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// A document and selection as they were before a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub document: Document,
    pub selection: Selection,
}

/// Linear undo history.
///
/// `entries[..cursor]` are the states undo can go back to. After an undo the
/// state that was current is kept at the tip so redo can return to it;
/// recording anything new drops every entry from the cursor on.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    /// Maximum number of undo steps, 0 for no limit.
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        History::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        History {
            entries: Vec::new(),
            cursor: 0,
            max_depth,
        }
    }

    /// Record the state before a mutation.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.cursor);
        self.entries.push(entry);
        if self.max_depth > 0 && self.entries.len() > self.max_depth {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len();
    }

    /// Step back. `current` is the state being left, kept for redo.
    pub fn undo(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        if self.cursor == self.entries.len() {
            self.entries.push(current);
        }
        self.cursor -= 1;
        log::debug!("undo to {}/{}", self.cursor, self.entries.len());
        self.entries.get(self.cursor).cloned()
    }

    pub fn redo(&mut self) -> Option<HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        log::debug!("redo to {}/{}", self.cursor, self.entries.len());
        self.entries.get(self.cursor).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of steps undo can take.
    pub fn undo_depth(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::node::{Block, Inline};
    use pretty_assertions::assert_eq;

    fn entry(text: &str) -> HistoryEntry {
        HistoryEntry {
            document: Document::from_blocks(vec![Block::paragraph(vec![Inline::text(text)])]),
            selection: Selection::default(),
        }
    }

    fn text(entry: Option<HistoryEntry>) -> String {
        entry.map(|e| e.document.plain_text()).unwrap_or_default()
    }

    #[test]
    fn empty_history_is_a_no_op() {
        let mut history = History::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(entry("x")), None);
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn undo_then_redo_returns_to_tip() {
        let mut history = History::default();
        history.record(entry("0"));
        history.record(entry("1"));

        assert_eq!(text(history.undo(entry("2"))), "1");
        assert_eq!(text(history.undo(entry("ignored"))), "0");
        assert!(!history.can_undo());
        assert_eq!(text(history.redo()), "1");
        assert_eq!(text(history.redo()), "2");
        assert!(!history.can_redo());
    }

    #[test]
    fn record_after_undo_discards_forward_branch() {
        let mut history = History::default();
        history.record(entry("0"));
        history.record(entry("1"));
        history.record(entry("2"));
        history.undo(entry("3"));
        history.undo(entry("3"));
        assert!(history.can_redo());

        history.record(entry("1"));
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(text(history.undo(entry("new"))), "1");
        assert_eq!(text(history.undo(entry("new"))), "0");
    }

    #[test]
    fn depth_limit_drops_oldest() {
        let mut history = History::new(2);
        for i in 0..5 {
            history.record(entry(&i.to_string()));
        }
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(text(history.undo(entry("5"))), "4");
        assert_eq!(text(history.undo(entry("5"))), "3");
        assert!(!history.can_undo());
    }

    #[test]
    fn zero_depth_is_unbounded() {
        let mut history = History::new(0);
        for i in 0..250 {
            history.record(entry(&i.to_string()));
        }
        assert_eq!(history.undo_depth(), 250);
    }
}
