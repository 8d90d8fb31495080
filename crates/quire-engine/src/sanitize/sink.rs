//! Second pass: fold the event stream into blocks.
//!
//! Loose inline content at the top level gets an implicit paragraph, loose
//! `li`s an implicit bullet list, inline content directly inside a list an
//! implicit item. Inside an item, paragraph and boundary edges become line
//! breaks. Whitespace-only text never creates anything on its own, and
//! non-breaking spaces come out as plain spaces.

use crate::editing::node::{Alignment, Block, BlockKind, Inline, ListKind, Node};
use crate::sanitize::events::Event;

/// Build blocks from a balanced event stream.
pub fn build(events: Vec<Event>) -> Vec<Block> {
    let mut sink = Sink::default();
    for event in events {
        sink.event(event);
    }
    let mut blocks = sink.finish();
    blocks.iter_mut().for_each(plain_spaces);
    blocks
}

/// `&nbsp;` only keeps a space from folding; blocks store plain spaces.
fn plain_spaces(block: &mut Block) {
    for child in &mut block.children {
        match child {
            Node::Inline(Inline::Text(run)) if run.text.contains('\u{a0}') => {
                run.text = run.text.replace('\u{a0}', " ");
            }
            Node::Block(nested) => plain_spaces(nested),
            Node::Inline(_) => {}
        }
    }
}

struct TextBlock {
    kind: BlockKind,
    alignment: Alignment,
    inlines: Vec<Inline>,
}

#[derive(Default)]
struct Item {
    alignment: Alignment,
    inlines: Vec<Inline>,
    lists: Vec<Block>,
    pending_break: bool,
    /// Not opened by a `li`; the next `li` closes it.
    implicit: bool,
}

impl Item {
    fn implicit(inlines: Vec<Inline>) -> Self {
        Item {
            inlines,
            implicit: true,
            ..Item::default()
        }
    }

    fn into_block(self) -> Block {
        Block::item(self.inlines, self.lists).with_alignment(self.alignment)
    }

    fn has_content(&self) -> bool {
        self.inlines.iter().any(|inline| !inline.is_empty())
    }
}

struct Frame {
    kind: ListKind,
    items: Vec<Block>,
    open: Option<Item>,
    /// Opened for a `li` that had no list around it.
    implicit: bool,
}

impl Frame {
    fn new(kind: ListKind, implicit: bool) -> Self {
        Frame {
            kind,
            items: Vec::new(),
            open: None,
            implicit,
        }
    }

    fn close_item(&mut self) {
        if let Some(item) = self.open.take() {
            self.items.push(item.into_block());
        }
    }
}

#[derive(Default)]
struct Sink {
    blocks: Vec<Block>,
    text: Option<TextBlock>,
    frames: Vec<Frame>,
}

impl Sink {
    fn event(&mut self, event: Event) {
        if let Event::InlineRun(inline) = &event
            && is_blank(inline)
            && self.frames.last().is_some_and(|f| f.implicit && f.open.is_none())
        {
            return;
        }
        if !matches!(event, Event::ItemStart(_)) {
            self.close_implicit_frames();
        }

        match event {
            Event::InlineRun(inline) => self.inline(inline),
            Event::TextBlockStart { kind, alignment } => {
                if self.frames.is_empty() {
                    self.flush_text();
                    self.text = Some(TextBlock {
                        kind,
                        alignment,
                        inlines: Vec::new(),
                    });
                } else {
                    self.break_item();
                }
            }
            Event::TextBlockEnd | Event::Boundary | Event::Rule if !self.frames.is_empty() => self.break_item(),
            Event::TextBlockEnd | Event::Boundary => self.flush_text(),
            Event::Rule => {
                self.flush_text();
                self.blocks.push(Block::rule());
            }
            Event::ListStart(kind) => self.open_list(kind, false),
            Event::ListEnd => self.close_list(),
            Event::ItemStart(alignment) => {
                // open item in the innermost list: None, or Some(implicit)
                let open = self.frames.last().map(|f| f.open.as_ref().map(|item| item.implicit));
                match open {
                    Some(None) => {}
                    Some(Some(true)) => {
                        if let Some(frame) = self.frames.last_mut() {
                            frame.close_item();
                        }
                    }
                    _ => self.open_list(ListKind::Bullet, true),
                }
                if let Some(frame) = self.frames.last_mut() {
                    frame.open = Some(Item {
                        alignment,
                        ..Item::default()
                    });
                }
            }
            Event::ItemEnd => {
                if let Some(frame) = self.frames.last_mut() {
                    frame.close_item();
                }
            }
        }
    }

    fn inline(&mut self, inline: Inline) {
        let Some(frame) = self.frames.last_mut() else {
            if let Some(text) = &mut self.text {
                push_inline(&mut text.inlines, inline);
            } else if !is_blank(&inline) {
                self.text = Some(TextBlock {
                    kind: BlockKind::Paragraph,
                    alignment: Alignment::Left,
                    inlines: vec![inline],
                });
            }
            return;
        };

        let blank = is_blank(&inline);
        match frame.open.as_mut() {
            Some(item) if item.lists.is_empty() => {
                if item.pending_break {
                    if blank {
                        return;
                    }
                    item.pending_break = false;
                    item.inlines.push(Inline::LineBreak);
                }
                push_inline(&mut item.inlines, inline);
                return;
            }
            _ if blank => return,
            _ => {}
        }
        // content after a nested list, or loose in the list
        frame.close_item();
        frame.open = Some(Item::implicit(vec![inline]));
    }

    fn break_item(&mut self) {
        if let Some(item) = self.frames.last_mut().and_then(|f| f.open.as_mut())
            && item.has_content()
        {
            item.pending_break = true;
        }
    }

    fn open_list(&mut self, kind: ListKind, implicit: bool) {
        match self.frames.last_mut() {
            Some(parent) => {
                if parent.open.is_none() {
                    parent.open = Some(Item::implicit(Vec::new()));
                }
            }
            None => self.flush_text(),
        }
        self.frames.push(Frame::new(kind, implicit));
    }

    fn close_list(&mut self) {
        let Some(mut frame) = self.frames.pop() else {
            return;
        };
        frame.close_item();
        if frame.items.is_empty() {
            log::debug!("sanitizer dropped empty {} list", frame.kind.tag());
            return;
        }
        let list = Block::list(frame.kind, frame.items);
        match self.frames.last_mut() {
            Some(parent) => {
                let item = parent.open.get_or_insert_with(|| Item::implicit(Vec::new()));
                item.pending_break = false;
                item.lists.push(list);
            }
            None => self.blocks.push(list),
        }
    }

    fn close_implicit_frames(&mut self) {
        while self
            .frames
            .last()
            .is_some_and(|f| f.implicit && f.open.is_none())
        {
            self.close_list();
        }
    }

    fn flush_text(&mut self) {
        if let Some(text) = self.text.take() {
            let mut block = Block::new(text.kind, Vec::new()).with_alignment(text.alignment);
            block.set_inlines(text.inlines);
            self.blocks.push(block);
        }
    }

    fn finish(mut self) -> Vec<Block> {
        while !self.frames.is_empty() {
            self.close_list();
        }
        self.flush_text();
        self.blocks
    }
}

fn is_blank(inline: &Inline) -> bool {
    inline.as_text().is_some_and(|run| run.text.trim_matches(' ').is_empty())
}

/// Append an inline, folding a space that follows a space.
fn push_inline(inlines: &mut Vec<Inline>, inline: Inline) {
    let mut inline = inline;
    if let Inline::Text(run) = &mut inline
        && run.text.starts_with(' ')
        && ends_with_space(inlines)
    {
        run.text.remove(0);
        if run.text.is_empty() {
            return;
        }
    }
    inlines.push(inline);
}

fn ends_with_space(inlines: &[Inline]) -> bool {
    inlines
        .iter()
        .rev()
        .find(|inline| !inline.is_empty())
        .and_then(Inline::as_text)
        .is_some_and(|run| run.text.ends_with(' '))
}
