//! Operations on the inline content of a single text block.
//!
//! Inline content is addressed by block-local offsets: each text run is as
//! wide as its character count, each atom (image, line break) is one unit.
//! Every function here returns content in canonical form (see [`normalize`]),
//! which is what makes two structurally equal documents render identically.

use crate::editing::node::{Inline, TextRun};

/// Bring inline content into canonical form.
///
/// - adjacent runs with the same marks and link target are merged
/// - empty runs are dropped
/// - the sequence starts with a text run and every atom is followed by one,
///   inserting empty runs where nothing else is there
pub fn normalize(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(inlines.len() + 1);
    for inline in inlines {
        match inline {
            Inline::Text(run) => {
                if run.text.is_empty() {
                    continue;
                }
                if let Some(Inline::Text(last)) = out.last_mut()
                    && last.same_format(&run)
                {
                    last.text.push_str(&run.text);
                    continue;
                }
                out.push(Inline::Text(run));
            }
            atom => {
                if !matches!(out.last(), Some(Inline::Text(_))) {
                    out.push(Inline::Text(TextRun::default()));
                }
                out.push(atom);
            }
        }
    }
    if !matches!(out.last(), Some(Inline::Text(_))) {
        out.push(Inline::Text(TextRun::default()));
    }
    out
}

pub fn is_normalized(inlines: &[Inline]) -> bool {
    normalize(inlines.to_vec()) == inlines
}

/// Total width in block-local offsets.
pub fn len(inlines: &[Inline]) -> usize {
    inlines.iter().map(Inline::len).sum()
}

/// Concatenated text of all runs.
pub fn text(inlines: &[Inline]) -> String {
    inlines
        .iter()
        .filter_map(Inline::as_text)
        .map(|run| run.text.as_str())
        .collect()
}

fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

fn split_run(run: TextRun, at: usize) -> (TextRun, TextRun) {
    let idx = byte_index(&run.text, at);
    let tail = TextRun {
        text: run.text[idx..].to_string(),
        marks: run.marks,
        href: run.href.clone(),
    };
    let mut head = run;
    head.text.truncate(idx);
    (head, tail)
}

/// Split content at `at`; both halves are canonical.
pub fn split(inlines: Vec<Inline>, at: usize) -> (Vec<Inline>, Vec<Inline>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0;
    for inline in inlines {
        let width = inline.len();
        if pos + width <= at {
            left.push(inline);
        } else if pos >= at {
            right.push(inline);
        } else if let Inline::Text(run) = inline {
            let (head, tail) = split_run(run, at - pos);
            left.push(Inline::Text(head));
            right.push(Inline::Text(tail));
        }
        pos += width;
    }
    (normalize(left), normalize(right))
}

/// Join two pieces of content.
pub fn concat(mut left: Vec<Inline>, right: Vec<Inline>) -> Vec<Inline> {
    left.extend(right);
    normalize(left)
}

/// Copy of the content within `range`.
pub fn slice(inlines: &[Inline], range: std::ops::Range<usize>) -> Vec<Inline> {
    let (_, rest) = split(inlines.to_vec(), range.start);
    let (middle, _) = split(rest, range.end.saturating_sub(range.start));
    middle
}

/// Remove the content within `range`.
pub fn remove(inlines: Vec<Inline>, range: std::ops::Range<usize>) -> Vec<Inline> {
    let (head, rest) = split(inlines, range.start);
    let (_, tail) = split(rest, range.end.saturating_sub(range.start));
    concat(head, tail)
}

/// Insert `insert` at offset `at`.
pub fn insert(inlines: Vec<Inline>, at: usize, insert: Vec<Inline>) -> Vec<Inline> {
    let (mut head, tail) = split(inlines, at);
    head.extend(insert);
    concat(head, tail)
}

/// Apply `f` to every text run inside `range`.
pub fn map_runs(
    inlines: Vec<Inline>,
    range: std::ops::Range<usize>,
    mut f: impl FnMut(&mut TextRun),
) -> Vec<Inline> {
    let (mut head, rest) = split(inlines, range.start);
    let (middle, tail) = split(rest, range.end.saturating_sub(range.start));
    for mut inline in middle {
        if let Inline::Text(run) = &mut inline {
            f(run);
        }
        head.push(inline);
    }
    concat(head, tail)
}

/// Non-empty text runs inside `range`.
pub fn runs_in(inlines: &[Inline], range: std::ops::Range<usize>) -> Vec<TextRun> {
    slice(inlines, range)
        .into_iter()
        .filter_map(|inline| match inline {
            Inline::Text(run) if !run.text.is_empty() => Some(run),
            _ => None,
        })
        .collect()
}

/// Map a block-local offset to `(child index, offset within that child)`.
///
/// Always lands on a text run. A boundary between a run and an atom resolves
/// to the end of the run before it; just after an atom resolves to the start
/// of the run that follows. Offsets past the end clamp to the end.
pub fn locate(inlines: &[Inline], offset: usize) -> (usize, usize) {
    let mut pos = 0;
    let mut last_text = (0, 0);
    for (index, inline) in inlines.iter().enumerate() {
        let width = inline.len();
        if let Inline::Text(_) = inline {
            if offset <= pos + width {
                return (index, offset.saturating_sub(pos));
            }
            last_text = (index, width);
        }
        pos += width;
    }
    last_text
}

/// Inverse of [`locate`]; the local offset is clamped to the child's width.
pub fn offset_of(inlines: &[Inline], index: usize, local: usize) -> usize {
    let before: usize = inlines.iter().take(index).map(Inline::len).sum();
    let width = inlines.get(index).map(Inline::len).unwrap_or(0);
    before + local.min(width)
}

/// The run a caret at `offset` types into, using the same affinity as
/// [`locate`].
pub fn run_at(inlines: &[Inline], offset: usize) -> Option<&TextRun> {
    let (index, _) = locate(inlines, offset);
    inlines.get(index).and_then(Inline::as_text)
}
