use serde::Serialize;

use crate::editing::content;
use crate::editing::document::Document;
use crate::editing::node::{Alignment, BlockKind, BlockType, Inline, Marks};
use crate::editing::selection::{self, Selection};

/// What the toolbar shows for the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormatState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// `None` when the selection spans blocks of different types or only
    /// rules.
    pub block_type: Option<BlockType>,
    pub alignment: Alignment,
    pub inside_list: bool,
    pub link: Option<String>,
}

impl FormatState {
    /// Derive the state from the document.
    ///
    /// A caret reports `input_marks`, the marks the next typed text gets. A
    /// range reports a mark as active when every non-empty run in it has it.
    pub fn derive(document: &Document, selection: &Selection, input_marks: Marks) -> Self {
        let anchor = selection::resolve_position(document, &selection.anchor);
        let focus = selection::resolve_position(document, &selection.focus);
        let (start, end) = if anchor <= focus {
            (anchor, focus)
        } else {
            (focus, anchor)
        };

        let touched = document.touched(&start, &end);
        let (marks, link) = if start == end {
            let link = document
                .block(&start.block)
                .map(|block| block.inlines().cloned().collect::<Vec<Inline>>())
                .and_then(|inlines| content::run_at(&inlines, start.offset).and_then(|run| run.href.clone()));
            (input_marks, link)
        } else {
            let runs: Vec<_> = touched
                .iter()
                .flat_map(|(path, range)| content::runs_in(&document.inlines_at(path), range.clone()))
                .collect();
            let all = |f: fn(&Marks) -> bool| !runs.is_empty() && runs.iter().all(|run| f(&run.marks));
            let marks = Marks {
                bold: all(|m| m.bold),
                italic: all(|m| m.italic),
                underline: all(|m| m.underline),
            };
            let first = runs.first().and_then(|run| run.href.clone());
            let link = first.filter(|href| runs.iter().all(|run| run.href.as_ref() == Some(href)));
            (marks, link)
        };

        let types: Vec<Option<BlockType>> = touched
            .iter()
            .map(|(path, _)| block_type_at(document, path))
            .collect();
        let block_type = match types.split_first() {
            Some((first, rest)) if rest.iter().all(|t| t == first) => *first,
            _ => None,
        };

        let start_block = document.block(&start.block);
        FormatState {
            bold: marks.bold,
            italic: marks.italic,
            underline: marks.underline,
            block_type,
            alignment: start_block.map(|b| b.alignment).unwrap_or_default(),
            inside_list: start_block.is_some_and(|b| b.kind == BlockKind::ListItem),
            link,
        }
    }
}

/// Marks of the run a caret at `selection`'s focus types into. Link targets
/// are not carried over.
pub fn marks_at(document: &Document, selection: &Selection) -> Marks {
    let point = selection::resolve_position(document, &selection.focus);
    let inlines = document.inlines_at(&point.block);
    content::run_at(&inlines, point.offset)
        .map(|run| run.marks)
        .unwrap_or_default()
}

fn block_type_at(document: &Document, path: &[usize]) -> Option<BlockType> {
    let block = document.block(path)?;
    match block.kind {
        BlockKind::Paragraph => Some(BlockType::Paragraph),
        BlockKind::Heading(level) => Some(BlockType::Heading(level)),
        BlockKind::ListItem => {
            let list = document.block(&path[..path.len() - 1])?;
            list.list_kind().map(BlockType::ListItem)
        }
        BlockKind::List(_) | BlockKind::HorizontalRule => None,
    }
}
