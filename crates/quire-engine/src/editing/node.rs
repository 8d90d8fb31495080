use serde::{Deserialize, Serialize};

/// A character-level formatting attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

impl Mark {
    pub const ALL: [Mark; 3] = [Mark::Bold, Mark::Italic, Mark::Underline];
}

/// The set of marks carried by a text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Marks {
    pub const NONE: Marks = Marks {
        bold: false,
        italic: false,
        underline: false,
    };

    pub fn has(self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
        }
    }

    /// Copy with `mark` switched on or off.
    pub fn with(mut self, mark: Mark, on: bool) -> Marks {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
        }
        self
    }

    pub fn toggled(self, mark: Mark) -> Marks {
        self.with(mark, !self.has(mark))
    }

    pub fn is_empty(self) -> bool {
        self == Marks::NONE
    }
}

/// Horizontal alignment of a text-bearing block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Value of the CSS `text-align` property.
    pub fn as_css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    pub fn from_css(value: &str) -> Option<Alignment> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    Bullet,
    Ordered,
}

impl ListKind {
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// Structural type of a [`Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    /// Level 1 to 6
    Heading(u8),
    List(ListKind),
    ListItem,
    HorizontalRule,
}

impl BlockKind {
    /// Blocks whose direct children include inline content.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            BlockKind::Paragraph | BlockKind::Heading(_) | BlockKind::ListItem
        )
    }

    /// Blocks that hold a cursor: text blocks and rules.
    pub fn is_leaf(self) -> bool {
        self.is_text() || self == BlockKind::HorizontalRule
    }
}

/// Block type a command can switch text blocks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Paragraph,
    Heading(u8),
    ListItem(ListKind),
}

/// A run of text sharing one set of marks and one link target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub marks: Marks,
    pub href: Option<String>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        TextRun {
            text: text.into(),
            ..TextRun::default()
        }
    }

    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        TextRun {
            text: text.into(),
            marks,
            href: None,
        }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        TextRun {
            text: text.into(),
            marks: Marks::NONE,
            href: Some(href.into()),
        }
    }

    /// Same marks and link target, so the two can merge.
    pub fn same_format(&self, other: &TextRun) -> bool {
        self.marks == other.marks && self.href == other.href
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Inline {
    Text(TextRun),
    Image { src: String, alt: String },
    LineBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(TextRun::plain(text))
    }

    /// Width in block-local offsets: characters for text, one for atoms.
    pub fn len(&self) -> usize {
        match self {
            Inline::Text(run) => run.text.chars().count(),
            Inline::Image { .. } | Inline::LineBreak => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_atom(&self) -> bool {
        !matches!(self, Inline::Text(_))
    }

    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            Inline::Text(run) => Some(run),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub alignment: Alignment,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Node {
    Block(Block),
    Inline(Inline),
}

impl Block {
    pub fn new(kind: BlockKind, children: Vec<Node>) -> Self {
        Block {
            kind,
            alignment: Alignment::default(),
            children,
        }
    }

    pub fn paragraph(inlines: Vec<Inline>) -> Self {
        Block::text_block(BlockKind::Paragraph, inlines)
    }

    pub fn heading(level: u8, inlines: Vec<Inline>) -> Self {
        Block::text_block(BlockKind::Heading(level.clamp(1, 6)), inlines)
    }

    pub fn rule() -> Self {
        Block::new(BlockKind::HorizontalRule, Vec::new())
    }

    pub fn list(kind: ListKind, items: Vec<Block>) -> Self {
        Block::new(
            BlockKind::List(kind),
            items.into_iter().map(Node::Block).collect(),
        )
    }

    /// A list item with inline content and nested lists.
    pub fn item(inlines: Vec<Inline>, lists: Vec<Block>) -> Self {
        let mut block = Block::text_block(BlockKind::ListItem, inlines);
        block.children.extend(lists.into_iter().map(Node::Block));
        block
    }

    fn text_block(kind: BlockKind, inlines: Vec<Inline>) -> Self {
        let inlines = crate::editing::content::normalize(inlines);
        Block::new(kind, inlines.into_iter().map(Node::Inline).collect())
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Inline children, in order.
    pub fn inlines(&self) -> impl Iterator<Item = &Inline> {
        self.children.iter().filter_map(|child| match child {
            Node::Inline(inline) => Some(inline),
            Node::Block(_) => None,
        })
    }

    /// Block children (list items of a list, nested lists of an item).
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.children.iter().filter_map(|child| match child {
            Node::Block(block) => Some(block),
            Node::Inline(_) => None,
        })
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.children.iter_mut().filter_map(|child| match child {
            Node::Block(block) => Some(block),
            Node::Inline(_) => None,
        })
    }

    /// Number of inline children; block children of an item start here.
    pub fn inline_count(&self) -> usize {
        self.children
            .iter()
            .take_while(|child| matches!(child, Node::Inline(_)))
            .count()
    }

    /// Width of the inline content in block-local offsets.
    pub fn text_len(&self) -> usize {
        self.inlines().map(Inline::len).sum()
    }

    /// Concatenated text of the inline content.
    pub fn text(&self) -> String {
        self.inlines()
            .filter_map(Inline::as_text)
            .map(|run| run.text.as_str())
            .collect()
    }

    /// Remove and return the inline content, leaving block children.
    pub fn take_inlines(&mut self) -> Vec<Inline> {
        let count = self.inline_count();
        self.children
            .drain(..count)
            .filter_map(|child| match child {
                Node::Inline(inline) => Some(inline),
                Node::Block(_) => None,
            })
            .collect()
    }

    /// Replace the inline content with the canonical form of `inlines`.
    pub fn set_inlines(&mut self, inlines: Vec<Inline>) {
        let count = self.inline_count();
        let inlines = crate::editing::content::normalize(inlines);
        self.children
            .splice(..count, inlines.into_iter().map(Node::Inline));
    }

    /// Remove and return the block children.
    pub fn take_blocks(&mut self) -> Vec<Block> {
        let count = self.inline_count();
        self.children
            .drain(count..)
            .filter_map(|child| match child {
                Node::Block(block) => Some(block),
                Node::Inline(_) => None,
            })
            .collect()
    }

    pub fn push_block(&mut self, block: Block) {
        self.children.push(Node::Block(block));
    }

    pub fn list_kind(&self) -> Option<ListKind> {
        match self.kind {
            BlockKind::List(kind) => Some(kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn marks_toggle_one_flag() {
        let marks = Marks::NONE.toggled(Mark::Bold).toggled(Mark::Underline);
        assert!(marks.bold && marks.underline && !marks.italic);
        assert_eq!(marks.toggled(Mark::Bold).toggled(Mark::Underline), Marks::NONE);
    }

    #[test]
    fn alignment_css_names() {
        assert_eq!(Alignment::from_css(" Center "), Some(Alignment::Center));
        assert_eq!(Alignment::from_css("start"), Some(Alignment::Left));
        assert_eq!(Alignment::from_css("middle"), None);
        assert_eq!(Alignment::Justify.as_css(), "justify");
    }

    #[test]
    fn atoms_are_one_unit_wide() {
        assert_eq!(Inline::text("héllo").len(), 5);
        assert_eq!(Inline::LineBreak.len(), 1);
        assert!(Inline::LineBreak.is_atom());
    }

    #[test]
    fn item_keeps_inlines_before_lists() {
        let nested = Block::list(ListKind::Bullet, vec![Block::item(vec![Inline::text("b")], vec![])]);
        let mut item = Block::item(vec![Inline::text("a")], vec![nested.clone()]);
        assert_eq!(item.inline_count(), 1);
        assert_eq!(item.text(), "a");

        item.set_inlines(vec![Inline::text("x"), Inline::text("y")]);
        assert_eq!(item.text(), "xy");
        assert_eq!(item.blocks().cloned().collect::<Vec<_>>(), vec![nested]);
    }

    #[test]
    fn heading_level_is_clamped() {
        assert_eq!(Block::heading(9, vec![]).kind, BlockKind::Heading(6));
        assert_eq!(Block::heading(0, vec![]).kind, BlockKind::Heading(1));
    }
}
