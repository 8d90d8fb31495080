//! List restructuring.
//!
//! None of these helpers change the order of leaf blocks, only their depth
//! and container. Callers that hold a caret therefore remember it as a leaf
//! ordinal plus offset (see `Document::leaf_address`) and resolve it again
//! afterwards.

use crate::editing::document::Document;
use crate::editing::node::{Block, BlockKind, BlockType, ListKind, Node};

impl Document {
    /// Move a list item into its previous sibling, as the last item of a
    /// nested list. The first item of a list cannot be indented.
    pub fn indent_item(&mut self, path: &[usize]) -> bool {
        let Some((&index, list_path)) = path.split_last() else {
            return false;
        };
        if index == 0 || !self.is_item(path) {
            return false;
        }
        let Some(kind) = self.block(list_path).and_then(Block::list_kind) else {
            return false;
        };
        let Some(item) = self.remove_block(path) else {
            return false;
        };

        let mut previous = list_path.to_vec();
        previous.push(index - 1);
        if let Some(previous) = self.block_mut(&previous) {
            match previous.children.last_mut() {
                Some(Node::Block(last)) if last.list_kind() == Some(kind) => last.push_block(item),
                _ => previous.push_block(Block::list(kind, vec![item])),
            }
        }
        true
    }

    /// Move a nested list item up one level, after the item that held it.
    /// The siblings that followed it become its children. A top-level item
    /// is lifted out of the list into a paragraph.
    pub fn outdent_item(&mut self, path: &[usize]) -> bool {
        if !self.is_item(path) {
            return false;
        }
        let n = path.len();
        if n == 2 {
            return self.lift_item(path, BlockKind::Paragraph);
        }

        let item_index = path[n - 1];
        let list_path = &path[..n - 1];
        let list_slot = path[n - 2];
        let parent_path = &path[..n - 2];
        let parent_index = path[n - 3];
        let grand_path = &path[..n - 3];

        let (mut item, kind, list_empty) = {
            let Some(list) = self.block_mut(list_path) else {
                return false;
            };
            let Some(kind) = list.list_kind() else {
                return false;
            };
            let followers = list.children.split_off(item_index + 1);
            let Node::Block(mut item) = list.children.remove(item_index) else {
                return false;
            };
            if !followers.is_empty() {
                item.push_block(Block::new(BlockKind::List(kind), followers));
            }
            (item, kind, list.children.is_empty())
        };

        if let Some(parent) = self.block_mut(parent_path) {
            let later = parent.children.split_off(list_slot + 1);
            item.children.extend(later);
            if list_empty {
                parent.children.remove(list_slot);
            }
        }

        let mut target = grand_path.to_vec();
        target.push(parent_index + 1);
        self.insert_block(&target, item);
        log::trace!("outdented {kind:?} item from {path:?} to {target:?}");
        true
    }

    /// Turn a top-level list item into a block of `kind`, splitting the
    /// list around it. Its nested lists follow it as top-level lists.
    pub fn lift_item(&mut self, path: &[usize], kind: BlockKind) -> bool {
        let &[list_index, item_index] = path else {
            return false;
        };
        let Some(list_kind) = self.block(&[list_index]).and_then(Block::list_kind) else {
            return false;
        };
        if !self.is_item(path) {
            return false;
        }
        let Some(mut list) = self.remove_top(list_index) else {
            return false;
        };

        let mut before = list.take_blocks();
        let after = before.split_off(item_index + 1);
        let Some(mut item) = before.pop() else {
            return false;
        };
        let nested = item.take_blocks();
        let mut lifted = Block::new(kind, Vec::new()).with_alignment(item.alignment);
        lifted.set_inlines(item.take_inlines());

        let mut out = Vec::new();
        if !before.is_empty() {
            out.push(Block::list(list_kind, before));
        }
        out.push(lifted);
        out.extend(nested);
        if !after.is_empty() {
            out.push(Block::list(list_kind, after));
        }
        self.splice_top(list_index, merge_lists(out));
        true
    }

    /// Wrap the top-level text block at `index` into a list of `kind`,
    /// joining neighbouring lists of the same kind.
    pub fn wrap_in_list(&mut self, index: usize, kind: ListKind) -> bool {
        match self.blocks().get(index) {
            Some(block) if matches!(block.kind, BlockKind::Paragraph | BlockKind::Heading(_)) => {}
            _ => return false,
        }
        let Some(mut block) = self.remove_top(index) else {
            return false;
        };
        let mut item = Block::new(BlockKind::ListItem, Vec::new()).with_alignment(block.alignment);
        item.set_inlines(block.take_inlines());
        self.splice_top(index, vec![Block::list(kind, vec![item])]);
        self.merge_lists_around(index);
        true
    }

    /// Merge the top-level list at `index` with same-kind lists right
    /// before and after it.
    pub fn merge_lists_around(&mut self, index: usize) {
        let Some(kind) = self.list_kind_at(index) else {
            return;
        };
        if self.list_kind_at(index + 1) == Some(kind)
            && let Some(mut next) = self.remove_top(index + 1)
            && let Some(list) = self.block_mut(&[index])
        {
            list.children.append(&mut next.children);
        }
        if index > 0
            && self.list_kind_at(index - 1) == Some(kind)
            && let Some(mut current) = self.remove_top(index)
            && let Some(previous) = self.block_mut(&[index - 1])
        {
            previous.children.append(&mut current.children);
        }
    }

    /// Change the type of the leaf block with ordinal `ordinal`.
    ///
    /// Paragraphs and headings switch kind in place or get wrapped into a
    /// list; list items switch their list's kind or are lifted all the way
    /// out before taking the new kind. Rules are left alone.
    pub fn set_block_type(&mut self, ordinal: usize, block_type: BlockType) {
        let Some(path) = self.leaves().get(ordinal).cloned() else {
            return;
        };
        let Some(kind) = self.block(&path).map(|b| b.kind) else {
            return;
        };

        match (kind, block_type) {
            (BlockKind::HorizontalRule, _) => {}
            (BlockKind::ListItem, BlockType::ListItem(list_kind)) => {
                if let Some(list) = self.block_mut(&path[..path.len() - 1]) {
                    list.kind = BlockKind::List(list_kind);
                }
                if path.len() == 2 {
                    self.merge_lists_around(path[0]);
                }
            }
            (BlockKind::ListItem, other) => {
                self.lift_out(ordinal);
                if let Some(path) = self.leaves().get(ordinal).cloned()
                    && let Some(block) = self.block_mut(&path)
                {
                    block.kind = text_kind(other);
                }
            }
            (_, BlockType::ListItem(list_kind)) => {
                self.wrap_in_list(path[0], list_kind);
            }
            (_, other) => {
                if let Some(block) = self.block_mut(&path) {
                    block.kind = text_kind(other);
                }
            }
        }
    }

    /// Outdent the list item with ordinal `ordinal` until it is a paragraph.
    pub(crate) fn lift_out(&mut self, ordinal: usize) {
        loop {
            let Some(path) = self.leaves().get(ordinal).cloned() else {
                return;
            };
            if !self.is_item(&path) || !self.outdent_item(&path) || path.len() == 2 {
                return;
            }
        }
    }

    fn list_kind_at(&self, index: usize) -> Option<ListKind> {
        self.blocks().get(index).and_then(Block::list_kind)
    }

    fn is_item(&self, path: &[usize]) -> bool {
        self.block(path)
            .is_some_and(|block| block.kind == BlockKind::ListItem)
    }
}

fn text_kind(block_type: BlockType) -> BlockKind {
    match block_type {
        BlockType::Heading(level) => BlockKind::Heading(level.clamp(1, 6)),
        BlockType::Paragraph | BlockType::ListItem(_) => BlockKind::Paragraph,
    }
}

/// Join consecutive lists of the same kind.
fn merge_lists(blocks: Vec<Block>) -> Vec<Block> {
    let mut out: Vec<Block> = Vec::with_capacity(blocks.len());
    for mut block in blocks {
        if let Some(last) = out.last_mut()
            && last.list_kind().is_some()
            && last.list_kind() == block.list_kind()
        {
            last.children.append(&mut block.children);
            continue;
        }
        out.push(block);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::node::Inline;
    use pretty_assertions::assert_eq;

    fn item(text: &str) -> Block {
        Block::item(vec![Inline::text(text)], vec![])
    }

    fn para(text: &str) -> Block {
        Block::paragraph(vec![Inline::text(text)])
    }

    /// `ul(a,b(ol(c)))` style outline of the document.
    fn outline(document: &Document) -> String {
        fn block(b: &Block) -> String {
            match b.kind {
                BlockKind::List(kind) => format!(
                    "{}({})",
                    kind.tag(),
                    b.blocks().map(block).collect::<Vec<_>>().join(",")
                ),
                BlockKind::ListItem => {
                    let nested: Vec<_> = b.blocks().map(block).collect();
                    if nested.is_empty() {
                        b.text()
                    } else {
                        format!("{}({})", b.text(), nested.join(","))
                    }
                }
                BlockKind::Heading(level) => format!("h{level}:{}", b.text()),
                BlockKind::HorizontalRule => "hr".to_string(),
                BlockKind::Paragraph => format!("p:{}", b.text()),
            }
        }
        document.blocks().iter().map(block).collect::<Vec<_>>().join(" ")
    }

    fn bullets(items: Vec<Block>) -> Block {
        Block::list(ListKind::Bullet, items)
    }

    #[test]
    fn indent_creates_nested_list() {
        let mut document = Document::from_blocks(vec![bullets(vec![item("a"), item("b"), item("c")])]);
        assert!(document.indent_item(&[0, 1]));
        assert_eq!(outline(&document), "ul(a(ul(b)),c)");
        // c joins the nested list b is in
        assert!(document.indent_item(&[0, 1]));
        assert_eq!(outline(&document), "ul(a(ul(b,c)))");
        assert_eq!(document.check_invariants(), Ok(()));
    }

    #[test]
    fn first_item_cannot_indent() {
        let mut document = Document::from_blocks(vec![bullets(vec![item("a")])]);
        assert!(!document.indent_item(&[0, 0]));
        assert!(!document.indent_item(&[5, 0]));
    }

    #[test]
    fn outdent_takes_followers_as_children() {
        let nested = bullets(vec![item("b"), item("c")]);
        let mut document = Document::from_blocks(vec![bullets(vec![
            Block::item(vec![Inline::text("a")], vec![nested]),
            item("d"),
        ])]);
        assert!(document.outdent_item(&[0, 0, 1, 0]));
        assert_eq!(outline(&document), "ul(a,b(ul(c)),d)");
        assert_eq!(document.check_invariants(), Ok(()));
    }

    #[test]
    fn outdent_top_level_item_lifts_to_paragraph() {
        let mut document = Document::from_blocks(vec![bullets(vec![item("a"), item("b"), item("c")])]);
        assert!(document.outdent_item(&[0, 1]));
        assert_eq!(outline(&document), "ul(a) p:b ul(c)");
        assert_eq!(document.check_invariants(), Ok(()));
    }

    #[test]
    fn lift_keeps_nested_lists_after_paragraph() {
        let nested = bullets(vec![item("x")]);
        let mut document = Document::from_blocks(vec![bullets(vec![
            Block::item(vec![Inline::text("a")], vec![nested]),
            item("b"),
        ])]);
        assert!(document.lift_item(&[0, 0], BlockKind::Paragraph));
        // the nested list and the remaining items are the same kind and merge
        assert_eq!(outline(&document), "p:a ul(x,b)");
    }

    #[test]
    fn wrap_joins_neighbouring_lists() {
        let mut document = Document::from_blocks(vec![
            bullets(vec![item("a")]),
            para("b"),
            bullets(vec![item("c")]),
        ]);
        assert!(document.wrap_in_list(1, ListKind::Bullet));
        assert_eq!(outline(&document), "ul(a,b,c)");
    }

    #[test]
    fn wrap_keeps_other_kind_separate() {
        let mut document = Document::from_blocks(vec![bullets(vec![item("a")]), para("b")]);
        assert!(document.wrap_in_list(1, ListKind::Ordered));
        assert_eq!(outline(&document), "ul(a) ol(b)");
    }

    #[test]
    fn set_block_type_round_trip() {
        let mut document = Document::from_blocks(vec![para("a"), para("b")]);
        document.set_block_type(1, BlockType::Heading(2));
        assert_eq!(outline(&document), "p:a h2:b");
        document.set_block_type(1, BlockType::ListItem(ListKind::Ordered));
        assert_eq!(outline(&document), "p:a ol(b)");
        document.set_block_type(1, BlockType::ListItem(ListKind::Bullet));
        assert_eq!(outline(&document), "p:a ul(b)");
        document.set_block_type(1, BlockType::Heading(1));
        assert_eq!(outline(&document), "p:a h1:b");
    }

    #[test]
    fn nested_item_lifts_all_the_way_out() {
        let nested = bullets(vec![item("b")]);
        let mut document = Document::from_blocks(vec![bullets(vec![Block::item(
            vec![Inline::text("a")],
            vec![nested],
        )])]);
        document.set_block_type(1, BlockType::Paragraph);
        assert_eq!(outline(&document), "ul(a) p:b");
        assert_eq!(document.check_invariants(), Ok(()));
    }
}
