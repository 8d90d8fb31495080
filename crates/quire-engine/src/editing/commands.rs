//! Editing commands.
//!
//! Each command is a pure function of the current document, selection and
//! input marks. It returns a new document and selection and never touches
//! history; the [`Editor`](crate::editing::editor::Editor) decides what to
//! record and emit. Validation happens before anything is cloned, so a
//! rejected command has no effect at all.

use std::ops::Range;

use crate::editing::content;
use crate::editing::document::{Document, Format, Point};
use crate::editing::format::FormatState;
use crate::editing::node::{
    Alignment, Block, BlockKind, BlockType, Inline, ListKind, Mark, Marks, Node, TextRun,
};
use crate::editing::selection::{self, Selection};
use crate::error::EditError;
use crate::image::{ImagePolicy, ImageUpload};
use crate::sanitize::{self, SanitizePolicy, url};

/// Commands that can be applied to the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    InsertText(String),
    /// Enter
    InsertParagraph,
    /// Shift+Enter
    InsertLineBreak,
    DeleteBackward,
    DeleteForward,
    /// Clipboard markup, sanitized before it goes in
    Paste(String),
    ToggleMark(Mark),
    SetBlockType(BlockType),
    ToggleHeading(u8),
    ToggleList(ListKind),
    IndentListItem,
    OutdentListItem,
    SetAlignment(Alignment),
    InsertLink {
        url: String,
        text: String,
    },
    RemoveLink,
    InsertImage(ImageUpload),
    InsertHorizontalRule,
    ClearFormatting,
}

impl Command {
    /// The name toolbars and shortcuts use for this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::InsertText(_) => "insertText",
            Command::InsertParagraph => "insertParagraph",
            Command::InsertLineBreak => "insertLineBreak",
            Command::DeleteBackward => "deleteBackward",
            Command::DeleteForward => "deleteForward",
            Command::Paste(_) => "paste",
            Command::ToggleMark(Mark::Bold) => "bold",
            Command::ToggleMark(Mark::Italic) => "italic",
            Command::ToggleMark(Mark::Underline) => "underline",
            Command::SetBlockType(_) => "formatBlock",
            Command::ToggleHeading(_) => "heading",
            Command::ToggleList(ListKind::Bullet) => "insertUnorderedList",
            Command::ToggleList(ListKind::Ordered) => "insertOrderedList",
            Command::IndentListItem => "indent",
            Command::OutdentListItem => "outdent",
            Command::SetAlignment(_) => "justify",
            Command::InsertLink { .. } => "createLink",
            Command::RemoveLink => "unlink",
            Command::InsertImage(_) => "insertImage",
            Command::InsertHorizontalRule => "insertHorizontalRule",
            Command::ClearFormatting => "removeFormat",
        }
    }
}

/// What a command reads.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub document: &'a Document,
    pub selection: &'a Selection,
    /// Marks the next typed text gets.
    pub input_marks: Marks,
    pub image_policy: &'a ImagePolicy,
    pub paste_policy: &'a SanitizePolicy,
}

/// What a command produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub document: Document,
    pub selection: Selection,
    pub input_marks: Marks,
}

impl Context<'_> {
    fn unchanged(&self) -> Outcome {
        self.with(self.document.clone(), self.selection.clone())
    }

    fn with(&self, document: Document, selection: Selection) -> Outcome {
        Outcome {
            document,
            selection,
            input_marks: self.input_marks,
        }
    }

    /// Selection ends as points, in document order.
    fn range(&self) -> (Point, Point) {
        let anchor = selection::resolve_position(self.document, &self.selection.anchor);
        let focus = selection::resolve_position(self.document, &self.selection.focus);
        if anchor <= focus {
            (anchor, focus)
        } else {
            (focus, anchor)
        }
    }
}

/// Apply a command.
pub fn apply(cx: &Context<'_>, command: &Command) -> Result<Outcome, EditError> {
    let outcome = match command {
        Command::InsertText(text) => insert_text(cx, text),
        Command::InsertParagraph => insert_paragraph(cx),
        Command::InsertLineBreak => replace_with(cx, vec![Inline::LineBreak]),
        Command::DeleteBackward => delete_backward(cx),
        Command::DeleteForward => delete_forward(cx),
        Command::Paste(markup) => paste(cx, markup),
        Command::ToggleMark(mark) => toggle_mark(cx, *mark),
        Command::SetBlockType(block_type) => format(cx, &Format::Block(*block_type)),
        Command::ToggleHeading(level) => toggle_block_type(cx, BlockType::Heading((*level).clamp(1, 6))),
        Command::ToggleList(kind) => toggle_block_type(cx, BlockType::ListItem(*kind)),
        Command::IndentListItem => restructure_items(cx, Document::indent_item),
        Command::OutdentListItem => restructure_items(cx, Document::outdent_item),
        Command::SetAlignment(alignment) => format(cx, &Format::Alignment(*alignment)),
        Command::InsertLink { url, text } => insert_link(cx, url, text)?,
        Command::RemoveLink => remove_link(cx),
        Command::InsertImage(upload) => insert_image(cx, upload)?,
        Command::InsertHorizontalRule => insert_rule(cx),
        Command::ClearFormatting => clear_formatting(cx),
    };
    Ok(outcome)
}

fn caret_at(document: &Document, point: &Point) -> Selection {
    Selection::collapsed(document.position(point))
}

/// Keep the document non-empty after removing its last block.
fn ensure_block(document: &mut Document) {
    if document.top_len() == 0 {
        document.splice_top(0, vec![Block::paragraph(Vec::new())]);
    }
}

fn is_rule(document: &Document, path: &[usize]) -> bool {
    document
        .block(path)
        .is_some_and(|block| block.kind == BlockKind::HorizontalRule)
}

fn runs_between(document: &Document, start: &Point, end: &Point) -> Vec<TextRun> {
    document
        .touched(start, end)
        .into_iter()
        .flat_map(|(path, range)| content::runs_in(&document.inlines_at(&path), range))
        .collect()
}

fn insert_text(cx: &Context<'_>, text: &str) -> Outcome {
    let mut inlines = Vec::new();
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            inlines.push(Inline::LineBreak);
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        inlines.push(Inline::Text(TextRun::marked(line, cx.input_marks)));
    }
    replace_with(cx, inlines)
}

/// Replace the selection with inline content and put the caret after it.
fn replace_with(cx: &Context<'_>, inlines: Vec<Inline>) -> Outcome {
    let mut document = cx.document.clone();
    let caret = document.delete_range(cx.selection);
    let at = selection::resolve_position(&document, &caret.focus);
    let selection = document.insert_inlines(at, inlines);
    cx.with(document, selection)
}

fn delete_selection(cx: &Context<'_>) -> Outcome {
    let mut document = cx.document.clone();
    let selection = document.delete_range(cx.selection);
    cx.with(document, selection)
}

/// Enter. An empty list item moves up a level (out of the list at the top)
/// instead of starting another empty item.
fn insert_paragraph(cx: &Context<'_>) -> Outcome {
    let mut document = cx.document.clone();
    let caret = document.delete_range(cx.selection);
    let at = selection::resolve_position(&document, &caret.focus);

    let empty_item = document
        .block(&at.block)
        .is_some_and(|block| block.kind == BlockKind::ListItem && block.text_len() == 0);
    if empty_item {
        let (ordinal, _) = document.leaf_address(&at);
        if document.outdent_item(&at.block) {
            let point = document.leaf_point(ordinal, 0);
            let selection = caret_at(&document, &point);
            return cx.with(document, selection);
        }
    }

    let selection = document.split_block(&caret.focus);
    cx.with(document, selection)
}

/// Backspace.
fn delete_backward(cx: &Context<'_>) -> Outcome {
    if !cx.selection.is_collapsed() {
        return delete_selection(cx);
    }
    let mut document = cx.document.clone();
    let at = selection::resolve_position(&document, &cx.selection.focus);
    let on_rule = is_rule(&document, &at.block);

    if at.offset > 0 && !on_rule {
        let start = Point::new(at.block.clone(), at.offset - 1);
        document.delete_points(&start, &at);
        let selection = caret_at(&document, &start);
        return cx.with(document, selection);
    }

    let (ordinal, _) = document.leaf_address(&at);
    if on_rule {
        document.remove_leaf(&at.block);
        ensure_block(&mut document);
        let point = match ordinal.checked_sub(1) {
            Some(previous) => document.leaf_point(previous, usize::MAX),
            None => document.leaf_point(0, 0),
        };
        let selection = caret_at(&document, &point);
        return cx.with(document, selection);
    }

    let leaves = document.leaves();
    let Some(previous) = ordinal.checked_sub(1).and_then(|p| leaves.get(p)) else {
        return cx.unchanged();
    };
    if is_rule(&document, previous) {
        document.remove_leaf(previous);
        let point = document.leaf_point(ordinal - 1, 0);
        let selection = caret_at(&document, &point);
        return cx.with(document, selection);
    }

    let end = Point::new(
        previous.clone(),
        document.block(previous).map(Block::text_len).unwrap_or(0),
    );
    document.delete_points(&end, &at);
    let selection = caret_at(&document, &end);
    cx.with(document, selection)
}

/// Delete.
fn delete_forward(cx: &Context<'_>) -> Outcome {
    if !cx.selection.is_collapsed() {
        return delete_selection(cx);
    }
    let mut document = cx.document.clone();
    let at = selection::resolve_position(&document, &cx.selection.focus);
    let (ordinal, _) = document.leaf_address(&at);

    if is_rule(&document, &at.block) {
        document.remove_leaf(&at.block);
        ensure_block(&mut document);
        let offset = if ordinal < document.leaves().len() { 0 } else { usize::MAX };
        let point = document.leaf_point(ordinal, offset);
        let selection = caret_at(&document, &point);
        return cx.with(document, selection);
    }

    let len = document.block(&at.block).map(Block::text_len).unwrap_or(0);
    if at.offset < len {
        let end = Point::new(at.block.clone(), at.offset + 1);
        document.delete_points(&at, &end);
    } else {
        let leaves = document.leaves();
        let Some(next) = leaves.get(ordinal + 1) else {
            return cx.unchanged();
        };
        if is_rule(&document, next) {
            document.remove_leaf(next);
        } else {
            document.delete_points(&at, &Point::new(next.clone(), 0));
        }
    }
    let selection = caret_at(&document, &at);
    cx.with(document, selection)
}

fn paste(cx: &Context<'_>, markup: &str) -> Outcome {
    let blocks = sanitize::sanitize(markup, cx.paste_policy);
    let mut document = cx.document.clone();
    let caret = document.delete_range(cx.selection);
    let selection = document.insert_fragment(&caret.focus, blocks);
    cx.with(document, selection)
}

/// A caret toggles the input marks. A range loses the mark when every run
/// in it has it and gains it everywhere otherwise.
fn toggle_mark(cx: &Context<'_>, mark: Mark) -> Outcome {
    if cx.selection.is_collapsed() {
        return Outcome {
            input_marks: cx.input_marks.toggled(mark),
            ..cx.unchanged()
        };
    }

    let (start, end) = cx.range();
    let runs = runs_between(cx.document, &start, &end);
    let everywhere = !runs.is_empty() && runs.iter().all(|run| run.marks.has(mark));

    let mut document = cx.document.clone();
    let format = Format::Mark(mark);
    let selection = if everywhere {
        document.unwrap_range(cx.selection, &format)
    } else {
        document.wrap_range(cx.selection, &format)
    };
    Outcome {
        document,
        selection,
        input_marks: cx.input_marks.with(mark, !everywhere),
    }
}

fn format(cx: &Context<'_>, format: &Format) -> Outcome {
    let mut document = cx.document.clone();
    let selection = document.wrap_range(cx.selection, format);
    cx.with(document, selection)
}

/// Switch to `block_type`, or back to paragraphs when every touched block
/// already has it.
fn toggle_block_type(cx: &Context<'_>, block_type: BlockType) -> Outcome {
    let state = FormatState::derive(cx.document, cx.selection, cx.input_marks);
    let target = if state.block_type == Some(block_type) {
        BlockType::Paragraph
    } else {
        block_type
    };
    format(cx, &Format::Block(target))
}

/// Indent or outdent every list item the selection touches. The selection
/// stays on the same leaves.
fn restructure_items(cx: &Context<'_>, step: fn(&mut Document, &[usize]) -> bool) -> Outcome {
    let mut document = cx.document.clone();
    let anchor = selection::resolve_position(&document, &cx.selection.anchor);
    let focus = selection::resolve_position(&document, &cx.selection.focus);
    let (start, end) = cx.range();
    let anchor = document.leaf_address(&anchor);
    let focus = document.leaf_address(&focus);

    let leaves = document.leaves();
    let ordinals: Vec<usize> = document
        .touched(&start, &end)
        .iter()
        .filter_map(|(path, _)| leaves.iter().position(|leaf| leaf == path))
        .collect();

    let mut changed = false;
    for ordinal in ordinals {
        let Some(path) = document.leaves().get(ordinal).cloned() else {
            continue;
        };
        let is_item = document
            .block(&path)
            .is_some_and(|block| block.kind == BlockKind::ListItem);
        if is_item {
            changed |= step(&mut document, &path);
        }
    }
    if !changed {
        return cx.unchanged();
    }

    let anchor = document.leaf_point(anchor.0, anchor.1);
    let focus = document.leaf_point(focus.0, focus.1);
    let selection = Selection::new(document.position(&anchor), document.position(&focus));
    cx.with(document, selection)
}

/// Link the selected text, or insert `text` (the URL when empty) as a new
/// link. The caret ends after the link.
fn insert_link(cx: &Context<'_>, url: &str, text: &str) -> Result<Outcome, EditError> {
    let url = url::validate_link(url)?;

    let (start, end) = cx.range();
    let selected = runs_between(cx.document, &start, &end);
    if selected.iter().any(|run| !run.text.is_empty()) {
        let mut document = cx.document.clone();
        let linked = document.wrap_range(cx.selection, &Format::Link(url));
        let caret = Selection::collapsed(linked.ordered().1.clone());
        return Ok(cx.with(document, caret));
    }

    let display = if text.trim().is_empty() {
        url.clone()
    } else {
        text.to_string()
    };
    let run = TextRun {
        text: display,
        marks: cx.input_marks,
        href: Some(url),
    };
    Ok(replace_with(cx, vec![Inline::Text(run)]))
}

/// Drop link targets in the range; a caret unlinks the whole link it sits in.
fn remove_link(cx: &Context<'_>) -> Outcome {
    let unlink = Format::Link(String::new());
    let mut document = cx.document.clone();
    if !cx.selection.is_collapsed() {
        let selection = document.unwrap_range(cx.selection, &unlink);
        return cx.with(document, selection);
    }

    let at = selection::resolve_position(&document, &cx.selection.focus);
    let inlines = document.inlines_at(&at.block);
    let Some(extent) = link_extent(&inlines, at.offset) else {
        return cx.unchanged();
    };
    let start = document.position(&Point::new(at.block.clone(), extent.start));
    let end = document.position(&Point::new(at.block.clone(), extent.end));
    document.unwrap_range(&Selection::new(start, end), &unlink);
    let selection = caret_at(&document, &at);
    cx.with(document, selection)
}

/// Offsets of the link under a caret, including neighbouring runs with the
/// same target.
fn link_extent(inlines: &[Inline], offset: usize) -> Option<Range<usize>> {
    let (index, _) = content::locate(inlines, offset);
    let href = inlines.get(index)?.as_text()?.href.as_ref()?;
    let same = |i: usize| {
        inlines[i]
            .as_text()
            .is_some_and(|run| run.href.as_ref() == Some(href))
    };
    let mut first = index;
    while first > 0 && same(first - 1) {
        first -= 1;
    }
    let mut last = index;
    while last + 1 < inlines.len() && same(last + 1) {
        last += 1;
    }
    Some(content::offset_of(inlines, first, 0)..content::offset_of(inlines, last, usize::MAX))
}

fn insert_image(cx: &Context<'_>, upload: &ImageUpload) -> Result<Outcome, EditError> {
    cx.image_policy.validate(upload)?;
    let image = Inline::Image {
        src: upload.data_uri(),
        alt: upload.alt(),
    };
    Ok(replace_with(cx, vec![image]))
}

fn insert_rule(cx: &Context<'_>) -> Outcome {
    let mut document = cx.document.clone();
    let caret = document.delete_range(cx.selection);
    let selection = document.insert_node(&caret.focus, Node::Block(Block::rule()));
    cx.with(document, selection)
}

/// Marks and links off; block types stay.
fn clear_formatting(cx: &Context<'_>) -> Outcome {
    if cx.selection.is_collapsed() {
        return Outcome {
            input_marks: Marks::NONE,
            ..cx.unchanged()
        };
    }
    let mut document = cx.document.clone();
    let mut selection = cx.selection.clone();
    for mark in Mark::ALL {
        selection = document.unwrap_range(&selection, &Format::Mark(mark));
    }
    selection = document.unwrap_range(&selection, &Format::Link(String::new()));
    Outcome {
        document,
        selection,
        input_marks: Marks::NONE,
    }
}
