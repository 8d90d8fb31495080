use std::collections::VecDeque;

use crate::editing::content;
use crate::editing::node::{Alignment, Block, BlockKind, BlockType, Inline, Mark, Marks, Node, TextRun};
use crate::editing::selection::{self, Position, Selection};

/// Block path plus block-local offset.
///
/// This is the addressing the mutation primitives work in; [`Position`] is
/// what they hand back. Points order like the document: paths compare
/// lexicographically and a list item's own content precedes its nested lists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Point {
    pub block: Vec<usize>,
    pub offset: usize,
}

impl Point {
    pub fn new(block: Vec<usize>, offset: usize) -> Self {
        Point { block, offset }
    }
}

/// A formatting attribute that can be wrapped around or removed from a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    Mark(Mark),
    Link(String),
    Block(BlockType),
    Alignment(Alignment),
}

/// The editable content: an ordered sequence of top-level blocks.
///
/// A document always holds at least one block, so the cursor always has
/// somewhere to land. Each mutation primitive takes positions in the current
/// tree and returns the selection that is valid in the tree it leaves behind;
/// callers never have to patch up addressing themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    /// A document holding one empty paragraph.
    pub fn new() -> Self {
        Document {
            blocks: vec![Block::paragraph(Vec::new())],
        }
    }

    /// Build a document from blocks, normalizing inline content.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut blocks = blocks;
        for block in &mut blocks {
            normalize_block(block);
        }
        if blocks.is_empty() {
            blocks.push(Block::paragraph(Vec::new()));
        }
        Document { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// True when the document is a single empty paragraph.
    pub fn is_empty(&self) -> bool {
        matches!(self.blocks.as_slice(), [only] if only.kind == BlockKind::Paragraph && only.text_len() == 0)
    }

    /// Block at `path`, following block children only.
    pub fn block(&self, path: &[usize]) -> Option<&Block> {
        let (first, rest) = path.split_first()?;
        let mut block = self.blocks.get(*first)?;
        for &index in rest {
            match block.children.get(index)? {
                Node::Block(child) => block = child,
                Node::Inline(_) => return None,
            }
        }
        Some(block)
    }

    pub(crate) fn block_mut(&mut self, path: &[usize]) -> Option<&mut Block> {
        let (first, rest) = path.split_first()?;
        let mut block = self.blocks.get_mut(*first)?;
        for &index in rest {
            match block.children.get_mut(index)? {
                Node::Block(child) => block = child,
                Node::Inline(_) => return None,
            }
        }
        Some(block)
    }

    /// Node at `path`; the last index may address an inline child.
    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (last, parent) = path.split_last()?;
        if parent.is_empty() {
            return None;
        }
        self.block(parent)?.children.get(*last)
    }

    /// Paths of the blocks that hold a cursor, in document order.
    pub fn leaves(&self) -> Vec<Vec<usize>> {
        fn collect(block: &Block, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
            if block.kind.is_leaf() {
                out.push(path.clone());
            }
            for (index, child) in block.children.iter().enumerate() {
                if let Node::Block(child) = child {
                    path.push(index);
                    collect(child, path, out);
                    path.pop();
                }
            }
        }

        let mut out = Vec::new();
        for (index, block) in self.blocks.iter().enumerate() {
            collect(block, &mut vec![index], &mut out);
        }
        out
    }

    /// Text of every run in document order, with no separators.
    pub fn plain_text(&self) -> String {
        self.leaves()
            .iter()
            .filter_map(|path| self.block(path))
            .map(Block::text)
            .collect()
    }

    pub(crate) fn inlines_at(&self, block: &[usize]) -> Vec<Inline> {
        self.block(block)
            .map(|b| b.inlines().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn start_point(&self) -> Point {
        let block = self.leaves().into_iter().next().unwrap_or_else(|| vec![0]);
        Point::new(block, 0)
    }

    pub(crate) fn end_point(&self) -> Point {
        let block = self.leaves().pop().unwrap_or_else(|| vec![0]);
        let offset = self.block(&block).map(Block::text_len).unwrap_or(0);
        Point::new(block, offset)
    }

    /// Point for a position whose path is valid; the offset is clamped.
    pub(crate) fn point(&self, position: &Position) -> Option<Point> {
        if let Some(block) = self.block(&position.path)
            && block.kind == BlockKind::HorizontalRule
        {
            return Some(Point::new(position.path.clone(), 0));
        }
        let (last, parent) = position.path.split_last()?;
        let block = self.block(parent)?;
        if !block.kind.is_text() {
            return None;
        }
        match block.children.get(*last)? {
            Node::Inline(Inline::Text(_)) => {
                let inlines: Vec<Inline> = block.inlines().cloned().collect();
                Some(Point::new(
                    parent.to_vec(),
                    content::offset_of(&inlines, *last, position.offset),
                ))
            }
            _ => None,
        }
    }

    /// Canonical position for a point.
    pub(crate) fn position(&self, point: &Point) -> Position {
        match self.block(&point.block) {
            Some(block) if block.kind.is_text() => {
                let inlines: Vec<Inline> = block.inlines().cloned().collect();
                let (index, offset) = content::locate(&inlines, point.offset);
                let mut path = point.block.clone();
                path.push(index);
                Position { path, offset }
            }
            _ => Position {
                path: point.block.clone(),
                offset: 0,
            },
        }
    }

    /// Leaf ordinal and offset of a point; stable across list restructuring.
    pub(crate) fn leaf_address(&self, point: &Point) -> (usize, usize) {
        let ordinal = self
            .leaves()
            .iter()
            .position(|leaf| *leaf == point.block)
            .unwrap_or(0);
        (ordinal, point.offset)
    }

    pub(crate) fn leaf_point(&self, ordinal: usize, offset: usize) -> Point {
        let leaves = self.leaves();
        let block = leaves
            .get(ordinal)
            .or(leaves.last())
            .cloned()
            .unwrap_or_else(|| vec![0]);
        let len = self.block(&block).map(Block::text_len).unwrap_or(0);
        Point::new(block, offset.min(len))
    }

    fn collapsed(&self, point: &Point) -> Selection {
        Selection::collapsed(self.position(point))
    }

    fn resolve(&self, position: &Position) -> Point {
        selection::resolve_position(self, position)
    }

    fn ordered_points(&self, selection: &Selection) -> (Point, Point) {
        let anchor = self.resolve(&selection.anchor);
        let focus = self.resolve(&selection.focus);
        if anchor <= focus {
            (anchor, focus)
        } else {
            (focus, anchor)
        }
    }

    /// Rewrite the inline content of the text block at `block`.
    pub(crate) fn edit_inlines(&mut self, block: &[usize], f: impl FnOnce(Vec<Inline>) -> Vec<Inline>) {
        if let Some(target) = self.block_mut(block)
            && target.kind.is_text()
        {
            let inlines = target.take_inlines();
            target.set_inlines(f(inlines));
        }
    }

    pub(crate) fn insert_block(&mut self, path: &[usize], block: Block) {
        match path.split_last() {
            Some((&index, [])) => self.blocks.insert(index.min(self.blocks.len()), block),
            Some((&index, parent)) => {
                if let Some(parent) = self.block_mut(parent) {
                    let index = index.min(parent.children.len());
                    parent.children.insert(index, Node::Block(block));
                }
            }
            None => {}
        }
    }

    pub(crate) fn remove_block(&mut self, path: &[usize]) -> Option<Block> {
        match path.split_last()? {
            (&index, []) => (index < self.blocks.len()).then(|| self.blocks.remove(index)),
            (&index, parent) => {
                let parent = self.block_mut(parent)?;
                match parent.children.get(index)? {
                    Node::Block(_) => match parent.children.remove(index) {
                        Node::Block(block) => Some(block),
                        Node::Inline(_) => None,
                    },
                    Node::Inline(_) => None,
                }
            }
        }
    }

    pub(crate) fn splice_top(&mut self, at: usize, blocks: Vec<Block>) {
        let at = at.min(self.blocks.len());
        self.blocks.splice(at..at, blocks);
    }

    pub(crate) fn remove_top(&mut self, index: usize) -> Option<Block> {
        (index < self.blocks.len()).then(|| self.blocks.remove(index))
    }

    pub(crate) fn top_len(&self) -> usize {
        self.blocks.len()
    }

    /// A point that can take inline content. Rules cannot, so a point on a
    /// rule gets a new empty paragraph after it.
    fn text_point(&mut self, at: Point) -> Point {
        match self.block(&at.block) {
            Some(block) if block.kind == BlockKind::HorizontalRule => {
                let mut path = at.block.clone();
                if let Some(last) = path.last_mut() {
                    *last += 1;
                }
                self.insert_block(&path, Block::paragraph(Vec::new()));
                Point::new(path, 0)
            }
            _ => at,
        }
    }

    /// Insert `text` with `marks` at `at`. Inserted text never carries a link.
    pub fn insert_text(&mut self, at: &Position, text: &str, marks: Marks) -> Selection {
        let run = Inline::Text(TextRun::marked(text, marks));
        let at = self.resolve(at);
        self.insert_inlines(at, vec![run])
    }

    pub(crate) fn insert_inlines(&mut self, at: Point, inlines: Vec<Inline>) -> Selection {
        let at = self.text_point(at);
        let width = content::len(&inlines);
        self.edit_inlines(&at.block, |existing| content::insert(existing, at.offset, inlines));
        self.collapsed(&Point::new(at.block, at.offset + width))
    }

    /// Delete the content between the selection's ends and join what is
    /// left of the first and last block. Returns a caret at the join.
    pub fn delete_range(&mut self, selection: &Selection) -> Selection {
        let (start, end) = self.ordered_points(selection);
        self.delete_points(&start, &end);
        self.collapsed(&start)
    }

    pub(crate) fn delete_points(&mut self, start: &Point, end: &Point) {
        if start == end {
            return;
        }
        if start.block == end.block {
            let range = start.offset..end.offset;
            self.edit_inlines(&start.block, |inlines| content::remove(inlines, range));
            return;
        }

        let tail = match self.block(&end.block) {
            Some(block) if block.kind.is_text() => {
                let inlines: Vec<Inline> = block.inlines().cloned().collect();
                let len = content::len(&inlines);
                content::slice(&inlines, end.offset..len)
            }
            _ => Vec::new(),
        };

        if let Some(block) = self.block_mut(&start.block) {
            if block.kind == BlockKind::HorizontalRule {
                block.kind = BlockKind::Paragraph;
                block.set_inlines(Vec::new());
            } else {
                let inlines = block.take_inlines();
                block.set_inlines(content::split(inlines, start.offset).0);
            }
        }

        let leaves = self.leaves();
        let first = leaves.iter().position(|leaf| *leaf == start.block);
        let last = leaves.iter().position(|leaf| *leaf == end.block);
        if let (Some(first), Some(last)) = (first, last) {
            for path in leaves[first + 1..=last].iter().rev() {
                self.remove_leaf(path);
            }
        }

        self.edit_inlines(&start.block, |inlines| content::concat(inlines, tail));
    }

    /// Remove a leaf block. A removed list item hands its nested items to
    /// its own list; lists left empty disappear.
    pub(crate) fn remove_leaf(&mut self, path: &[usize]) {
        let Some((&index, parent)) = path.split_last() else {
            return;
        };
        if parent.is_empty() {
            self.remove_top(index);
            return;
        }
        let Some(mut item) = self.remove_block(path) else {
            return;
        };
        let lifted: Vec<Node> = item
            .take_blocks()
            .into_iter()
            .flat_map(|mut list| list.take_blocks())
            .map(Node::Block)
            .collect();
        let now_empty = match self.block_mut(parent) {
            Some(list) => {
                let index = index.min(list.children.len());
                list.children.splice(index..index, lifted);
                list.children.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.remove_block(parent);
        }
    }

    /// Apply `format` to the selected range.
    pub fn wrap_range(&mut self, selection: &Selection, format: &Format) -> Selection {
        self.format_range(selection, format, true)
    }

    /// Remove `format` from the selected range.
    pub fn unwrap_range(&mut self, selection: &Selection, format: &Format) -> Selection {
        self.format_range(selection, format, false)
    }

    /// Text leaves touched by `start..end` with their block-local ranges.
    pub(crate) fn touched(&self, start: &Point, end: &Point) -> Vec<(Vec<usize>, std::ops::Range<usize>)> {
        let leaves = self.leaves();
        let first = leaves.iter().position(|leaf| *leaf == start.block).unwrap_or(0);
        let last = leaves.iter().position(|leaf| *leaf == end.block).unwrap_or(first);
        leaves[first..=last.max(first)]
            .iter()
            .filter_map(|path| {
                let block = self.block(path)?;
                let from = if *path == start.block { start.offset } else { 0 };
                let to = if *path == end.block { end.offset } else { block.text_len() };
                Some((path.clone(), from..to.max(from)))
            })
            .collect()
    }

    fn format_range(&mut self, selection: &Selection, format: &Format, on: bool) -> Selection {
        let anchor = self.resolve(&selection.anchor);
        let focus = self.resolve(&selection.focus);
        let (start, end) = if anchor <= focus {
            (anchor.clone(), focus.clone())
        } else {
            (focus.clone(), anchor.clone())
        };

        // Editing an item's runs shifts the paths of its nested lists; leaves
        // are addressed by ordinal and looked up again for every edit.
        let anchor = self.leaf_address(&anchor);
        let focus = self.leaf_address(&focus);
        let leaves = self.leaves();
        let touched: Vec<(usize, std::ops::Range<usize>)> = self
            .touched(&start, &end)
            .into_iter()
            .filter_map(|(path, range)| {
                let ordinal = leaves.iter().position(|leaf| *leaf == path)?;
                Some((ordinal, range))
            })
            .collect();

        for (ordinal, range) in touched {
            let path = self.leaf_point(ordinal, 0).block;
            match format {
                Format::Mark(mark) => self.edit_inlines(&path, |inlines| {
                    content::map_runs(inlines, range, |run| run.marks = run.marks.with(*mark, on))
                }),
                Format::Link(url) => self.edit_inlines(&path, |inlines| {
                    content::map_runs(inlines, range, |run| run.href = on.then(|| url.clone()))
                }),
                Format::Alignment(alignment) => {
                    if let Some(block) = self.block_mut(&path)
                        && block.kind.is_text()
                    {
                        block.alignment = if on { *alignment } else { Alignment::Left };
                    }
                }
                Format::Block(block_type) => {
                    let block_type = if on { *block_type } else { BlockType::Paragraph };
                    self.set_block_type(ordinal, block_type);
                }
            }
        }

        let anchor = self.leaf_point(anchor.0, anchor.1);
        let focus = self.leaf_point(focus.0, focus.1);
        Selection::new(self.position(&anchor), self.position(&focus))
    }

    /// Split the text block at `at` into two siblings and return a caret at
    /// the start of the second.
    ///
    /// Splitting a heading at its end yields a paragraph; a split list item
    /// hands its nested lists to the new item; a rule gets an empty
    /// paragraph after it.
    pub fn split_block(&mut self, at: &Position) -> Selection {
        let at = self.resolve(at);
        let next = self.split_point(&at);
        self.collapsed(&next)
    }

    pub(crate) fn split_point(&mut self, at: &Point) -> Point {
        let mut next = at.block.clone();
        if let Some(last) = next.last_mut() {
            *last += 1;
        }

        let second = match self.block_mut(&at.block) {
            Some(block) if block.kind == BlockKind::HorizontalRule => Block::paragraph(Vec::new()),
            Some(block) => {
                let inlines = block.take_inlines();
                let (left, right) = content::split(inlines, at.offset);
                let at_end = content::len(&right) == 0;
                block.set_inlines(left);
                let kind = match block.kind {
                    BlockKind::Heading(_) if at_end => BlockKind::Paragraph,
                    kind => kind,
                };
                let mut second = Block::new(kind, Vec::new()).with_alignment(block.alignment);
                second.set_inlines(right);
                for nested in block.take_blocks() {
                    second.push_block(nested);
                }
                second
            }
            None => return at.clone(),
        };
        self.insert_block(&next, second);
        Point::new(next, 0)
    }

    /// Insert a node at `at`.
    ///
    /// Inline nodes go in at the offset. Block nodes go in between blocks:
    /// before the block when the caret is at its start, after it when at its
    /// end, and into a split of it otherwise. Inside a list a block goes
    /// after the whole top-level list. A rule inserted where nothing would
    /// follow it gets an empty paragraph after it for the caret.
    pub fn insert_node(&mut self, at: &Position, node: Node) -> Selection {
        let at = self.resolve(at);
        match node {
            Node::Inline(inline) => self.insert_inlines(at, vec![inline]),
            Node::Block(block) => self.insert_block_at(at, block),
        }
    }

    fn insert_block_at(&mut self, at: Point, block: Block) -> Selection {
        let top = at.block.first().copied().unwrap_or(0);
        let in_list = at.block.len() > 1;
        let (host_kind, host_len) = match self.block(&at.block) {
            Some(host) => (host.kind, host.text_len()),
            None => (BlockKind::Paragraph, 0),
        };
        let lands = block.kind.is_text() || block.list_kind().is_some();
        let (landing, landing_offset) = last_leaf_end(&block);

        let caret = if in_list || host_kind == BlockKind::HorizontalRule || (at.offset > 0 && at.offset >= host_len) {
            self.splice_top(top + 1, vec![block]);
            if lands {
                let mut path = vec![top + 1];
                path.extend(landing);
                Point::new(path, landing_offset)
            } else {
                self.splice_top(top + 2, vec![Block::paragraph(Vec::new())]);
                Point::new(vec![top + 2], 0)
            }
        } else if at.offset == 0 {
            // the host moves down one and keeps the caret
            self.splice_top(top, vec![block]);
            Point::new(shifted(&at.block, 1), 0)
        } else {
            self.split_point(&at);
            self.splice_top(top + 1, vec![block]);
            Point::new(vec![top + 2], 0)
        };
        self.collapsed(&caret)
    }

    /// Replace the node at `path` and return a caret at the end of the new
    /// node. An unknown path leaves the document untouched.
    pub fn replace_node(&mut self, path: &[usize], node: Node) -> Selection {
        match node {
            Node::Block(block) => {
                let landing = last_leaf_end(&block);
                let mut block = block;
                normalize_block(&mut block);
                match self.block_mut(path) {
                    Some(target) => *target = block,
                    None => {
                        log::warn!("replace_node: no block at {path:?}");
                        return Selection::collapsed(self.position(&self.start_point()));
                    }
                }
                let (sub, offset) = landing;
                let mut at = path.to_vec();
                at.extend(sub);
                self.collapsed(&Point::new(at, offset))
            }
            Node::Inline(inline) => {
                let Some((&index, parent)) = path.split_last() else {
                    return Selection::collapsed(self.position(&self.start_point()));
                };
                let inlines = self.inlines_at(parent);
                if index >= inlines.len() || !self.block(parent).is_some_and(|b| b.kind.is_text()) {
                    log::warn!("replace_node: no inline at {path:?}");
                    return Selection::collapsed(self.position(&self.start_point()));
                }
                let before = content::offset_of(&inlines, index, 0);
                let width = inline.len();
                self.edit_inlines(parent, |mut inlines| {
                    inlines[index] = inline;
                    inlines
                });
                self.collapsed(&Point::new(parent.to_vec(), before + width))
            }
        }
    }

    /// Insert a fragment of blocks at `at` (paste).
    ///
    /// A lone paragraph goes in as inline content. Otherwise the host block
    /// is split and a leading or trailing paragraph of the fragment merges
    /// into the half next to it. Inside a list item everything is flattened
    /// to inline content separated by line breaks.
    pub fn insert_fragment(&mut self, at: &Position, blocks: Vec<Block>) -> Selection {
        let at = self.resolve(at);
        let mut blocks = blocks;
        for block in &mut blocks {
            normalize_block(block);
        }
        if blocks.is_empty() {
            return self.collapsed(&at);
        }

        let in_list = at.block.len() > 1;
        let single_paragraph = matches!(blocks.as_slice(), [only] if only.kind == BlockKind::Paragraph);
        if in_list || single_paragraph {
            let inlines = flatten(&blocks);
            return self.insert_inlines(at, inlines);
        }

        let top = at.block.first().copied().unwrap_or(0);
        let Some(mut host) = self.remove_top(top) else {
            return self.collapsed(&at);
        };

        let (left, right) = if host.kind.is_text() {
            content::split(host.take_inlines(), at.offset)
        } else {
            (Vec::new(), Vec::new())
        };
        let host_is_rule = host.kind == BlockKind::HorizontalRule;
        let mut blocks: VecDeque<Block> = blocks.into();
        let mut out: Vec<Block> = Vec::new();
        // (index in `out`, path below that block, offset)
        let mut caret: Option<(usize, Vec<usize>, usize)> = None;

        if host_is_rule {
            out.push(host.clone());
        } else if blocks.front().is_some_and(|b| b.kind == BlockKind::Paragraph)
            && let Some(first) = blocks.pop_front()
        {
            let pasted: Vec<Inline> = first.inlines().cloned().collect();
            let width = content::len(&left) + content::len(&pasted);
            let mut merged = Block::new(host.kind, Vec::new()).with_alignment(host.alignment);
            merged.set_inlines(content::concat(left, pasted));
            out.push(merged);
            caret = Some((0, Vec::new(), width));
        } else if content::len(&left) > 0 {
            let mut head = Block::new(host.kind, Vec::new()).with_alignment(host.alignment);
            head.set_inlines(left);
            out.push(head);
        }

        let trailing = if !host_is_rule && blocks.back().is_some_and(|b| b.kind == BlockKind::Paragraph) {
            blocks.pop_back()
        } else {
            None
        };

        for block in blocks {
            let lands = block.kind.is_text() || block.list_kind().is_some();
            let (sub, offset) = last_leaf_end(&block);
            out.push(block);
            caret = lands.then(|| (out.len() - 1, sub, offset));
        }

        match trailing {
            Some(last) => {
                let pasted: Vec<Inline> = last.inlines().cloned().collect();
                let width = content::len(&pasted);
                let mut merged = Block::new(BlockKind::Paragraph, Vec::new()).with_alignment(last.alignment);
                merged.set_inlines(content::concat(pasted, right));
                out.push(merged);
                caret = Some((out.len() - 1, Vec::new(), width));
            }
            None if content::len(&right) > 0 || caret.is_none() => {
                let kind = if host.kind.is_text() { host.kind } else { BlockKind::Paragraph };
                let mut tail = Block::new(kind, Vec::new()).with_alignment(host.alignment);
                tail.set_inlines(right);
                out.push(tail);
                if caret.is_none() {
                    caret = Some((out.len() - 1, Vec::new(), 0));
                }
            }
            None => {}
        }

        let (index, sub, offset) = caret.unwrap_or((0, Vec::new(), 0));
        self.splice_top(top, out);
        let mut path = vec![top + index];
        path.extend(sub);
        self.collapsed(&Point::new(path, offset))
    }

    /// Check the structural invariants; returns a description of the first
    /// violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.blocks.is_empty() {
            return Err("document has no blocks".to_string());
        }
        for (index, block) in self.blocks.iter().enumerate() {
            if block.kind == BlockKind::ListItem {
                return Err(format!("list item at top level [{index}]"));
            }
            check_block(block, &mut vec![index])?;
        }
        Ok(())
    }
}

fn check_block(block: &Block, path: &mut Vec<usize>) -> Result<(), String> {
    match block.kind {
        BlockKind::Heading(level) if !(1..=6).contains(&level) => {
            return Err(format!("heading level {level} at {path:?}"));
        }
        BlockKind::HorizontalRule if !block.children.is_empty() => {
            return Err(format!("rule with children at {path:?}"));
        }
        BlockKind::List(_) => {
            if block.children.is_empty() {
                return Err(format!("empty list at {path:?}"));
            }
            let all_items = block
                .children
                .iter()
                .all(|child| matches!(child, Node::Block(b) if b.kind == BlockKind::ListItem));
            if !all_items {
                return Err(format!("list child that is not an item at {path:?}"));
            }
        }
        _ => {}
    }

    if block.kind.is_text() {
        let inlines: Vec<Inline> = block.inlines().cloned().collect();
        if inlines.is_empty() || !content::is_normalized(&inlines) {
            return Err(format!("inline content not canonical at {path:?}"));
        }
        let count = block.inline_count();
        let trailing_ok = block.children[count..].iter().all(|child| match child {
            Node::Block(b) => block.kind == BlockKind::ListItem && matches!(b.kind, BlockKind::List(_)),
            Node::Inline(_) => false,
        });
        if !trailing_ok {
            return Err(format!("unexpected block child at {path:?}"));
        }
    }

    for (index, child) in block.children.iter().enumerate() {
        if let Node::Block(child) = child {
            path.push(index);
            check_block(child, path)?;
            path.pop();
        }
    }
    Ok(())
}

fn normalize_block(block: &mut Block) {
    if block.kind.is_text() {
        let inlines = block.take_inlines();
        block.set_inlines(inlines);
    }
    for child in block.blocks_mut() {
        normalize_block(child);
    }
}

/// Relative path and offset of the end of the last leaf inside `block`.
fn last_leaf_end(block: &Block) -> (Vec<usize>, usize) {
    let mut path = Vec::new();
    let mut current = block;
    loop {
        let last_child = current
            .children
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, child)| match child {
                Node::Block(b) => Some((index, b)),
                Node::Inline(_) => None,
            });
        match last_child {
            Some((index, child)) => {
                path.push(index);
                current = child;
            }
            None => return (path, current.text_len()),
        }
    }
}

fn shifted(path: &[usize], by: usize) -> Vec<usize> {
    let mut path = path.to_vec();
    if let Some(first) = path.first_mut() {
        *first += by;
    }
    path
}

/// Inline content of every text leaf in `blocks`, joined by line breaks.
fn flatten(blocks: &[Block]) -> Vec<Inline> {
    fn collect(block: &Block, out: &mut Vec<Vec<Inline>>) {
        if block.kind.is_text() {
            out.push(block.inlines().cloned().collect());
        }
        for child in block.blocks() {
            collect(child, out);
        }
    }

    let mut segments = Vec::new();
    for block in blocks {
        collect(block, &mut segments);
    }
    let mut out = Vec::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if i > 0 {
            out.push(Inline::LineBreak);
        }
        out.extend(segment);
    }
    content::normalize(out)
}
