//! Positions, selections and their resolution against a document.
//!
//! A [`Position`] addresses a text run child (`path` ends in the run's index
//! within its block) and a character offset inside it, or a horizontal rule
//! block with offset 0. Positions handed out by the document are canonical:
//! a boundary between two runs is the end of the left one. Canonical
//! positions compare in document order.

use serde::{Deserialize, Serialize};

use crate::editing::content;
use crate::editing::document::{Document, Point};
use crate::editing::node::{Block, Inline};

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl Position {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Position { path, offset }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Selection { anchor, focus }
    }

    pub fn collapsed(at: Position) -> Self {
        Selection {
            anchor: at.clone(),
            focus: at,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Focus before anchor.
    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }

    /// `(start, end)` in document order.
    pub fn ordered(&self) -> (&Position, &Position) {
        if self.is_backward() {
            (&self.focus, &self.anchor)
        } else {
            (&self.anchor, &self.focus)
        }
    }

    /// Both ends address live nodes of `document`.
    pub fn is_valid_in(&self, document: &Document) -> bool {
        document.point(&self.anchor).is_some() && document.point(&self.focus).is_some()
    }
}

/// One end of a range reported from outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawPoint {
    /// A path and offset that may be stale.
    Path { path: Vec<usize>, offset: usize },
    /// Character offset into the plain text projection.
    Text(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRange {
    pub anchor: RawPoint,
    pub focus: RawPoint,
}

impl RawRange {
    pub fn new(anchor: RawPoint, focus: RawPoint) -> Self {
        RawRange { anchor, focus }
    }

    /// Characters `start..end` of the plain text.
    pub fn text(start: usize, end: usize) -> Self {
        RawRange::new(RawPoint::Text(start), RawPoint::Text(end))
    }

    pub fn caret(offset: usize) -> Self {
        RawRange::text(offset, offset)
    }
}

impl From<Position> for RawPoint {
    fn from(position: Position) -> Self {
        RawPoint::Path {
            path: position.path,
            offset: position.offset,
        }
    }
}

impl From<Selection> for RawRange {
    fn from(selection: Selection) -> Self {
        RawRange::new(selection.anchor.into(), selection.focus.into())
    }
}

/// Map a raw range onto `document`. Never fails: offsets clamp, stale
/// paths walk to the nearest surviving sibling.
pub fn resolve(document: &Document, raw: &RawRange) -> Selection {
    let anchor = resolve_point(document, &raw.anchor);
    let focus = resolve_point(document, &raw.focus);
    Selection::new(document.position(&anchor), document.position(&focus))
}

/// The same range with anchor first.
pub fn normalize(selection: &Selection) -> Selection {
    let (start, end) = selection.ordered();
    Selection::new(start.clone(), end.clone())
}

/// A caret at the end of the last leaf inside the block at `path`.
pub fn collapse_to_end(document: &Document, path: &[usize]) -> Selection {
    let last = document
        .leaves()
        .into_iter()
        .filter(|leaf| leaf.starts_with(path))
        .last();
    let point = match last {
        Some(leaf) => {
            let offset = document.block(&leaf).map(Block::text_len).unwrap_or(0);
            Point::new(leaf, offset)
        }
        None => {
            log::warn!("collapse_to_end: no block at {path:?}, falling back to document start");
            document.start_point()
        }
    };
    Selection::collapsed(document.position(&point))
}

fn resolve_point(document: &Document, raw: &RawPoint) -> Point {
    match raw {
        RawPoint::Path { path, offset } => resolve_position(document, &Position::new(path.clone(), *offset)),
        RawPoint::Text(offset) => text_point(document, *offset),
    }
}

/// Resolve a possibly stale position to a point in `document`.
pub(crate) fn resolve_position(document: &Document, position: &Position) -> Point {
    if let Some(point) = document.point(position) {
        return point;
    }
    match walk_stale(document, position) {
        Some(point) => point,
        None => {
            log::warn!(
                "could not resolve {position:?}, falling back to document start"
            );
            document.start_point()
        }
    }
}

/// Follow `position.path` as far as it goes, clamping each index to the
/// nearest existing child. A clamped walk lands at the end of what it
/// reached, an exact one keeps the offset.
fn walk_stale(document: &Document, position: &Position) -> Option<Point> {
    let (&first, rest) = position.path.split_first()?;
    let top = document.top_len().checked_sub(1)?;
    let mut clamped = first > top;
    let mut path = vec![first.min(top)];

    for &index in rest {
        let block = document.block(&path)?;
        let inline_count = block.inline_count();
        if block.kind.is_text() && index < inline_count {
            let offset = if clamped {
                block.text_len()
            } else {
                let inlines: Vec<Inline> = block.inlines().cloned().collect();
                content::offset_of(&inlines, index, position.offset)
            };
            return Some(Point::new(path, offset));
        }
        let children: Vec<usize> = (inline_count..block.children.len()).collect();
        let Some(&last) = children.last() else {
            break;
        };
        if index > last {
            clamped = true;
        }
        path.push(index.clamp(inline_count, last));
    }

    let leaves: Vec<Vec<usize>> = document
        .leaves()
        .into_iter()
        .filter(|leaf| leaf.starts_with(&path))
        .collect();
    let leaf = if clamped { leaves.last() } else { leaves.first() };
    let leaf = leaf?.clone();
    let len = document.block(&leaf).map(Block::text_len).unwrap_or(0);
    let offset = if clamped {
        len
    } else if leaf == path {
        position.offset.min(len)
    } else {
        0
    };
    Some(Point::new(leaf, offset))
}

/// Point for a character offset into the plain text. Atoms are skipped and a
/// block end wins over the next block's start.
fn text_point(document: &Document, offset: usize) -> Point {
    let mut remaining = offset;
    for leaf in document.leaves() {
        let Some(block) = document.block(&leaf) else {
            continue;
        };
        if !block.kind.is_text() {
            continue;
        }
        let chars = block.text().chars().count();
        if remaining <= chars {
            let mut local = 0;
            for inline in block.inlines() {
                match inline {
                    Inline::Text(run) => {
                        let width = run.text.chars().count();
                        if remaining <= width {
                            return Point::new(leaf, local + remaining);
                        }
                        remaining -= width;
                        local += width;
                    }
                    _ => local += 1,
                }
            }
            return Point::new(leaf, local);
        }
        remaining -= chars;
    }
    document.end_point()
}
