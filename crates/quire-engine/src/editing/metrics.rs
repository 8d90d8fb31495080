use serde::Serialize;

use crate::editing::document::Document;

/// Word and character counts of a document's plain text.
///
/// The plain text is every text run in document order with nothing added
/// between blocks; images, line breaks and rules count for nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub word_count: usize,
    pub char_count: usize,
}

impl Metrics {
    pub fn recompute(document: &Document) -> Self {
        Metrics::from_text(&document.plain_text())
    }

    pub fn from_text(text: &str) -> Self {
        Metrics {
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::node::{Block, Inline, ListKind, Marks, TextRun};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", 0, 0)]
    #[case("Hello world", 2, 11)]
    #[case("  spaced\tout \n words ", 3, 21)]
    #[case("héllo wörld", 2, 11)]
    fn counts_text(#[case] text: &str, #[case] words: usize, #[case] chars: usize) {
        assert_eq!(
            Metrics::from_text(text),
            Metrics {
                word_count: words,
                char_count: chars
            }
        );
    }

    #[test]
    fn atoms_and_rules_count_nothing() {
        let document = Document::from_blocks(vec![
            Block::paragraph(vec![
                Inline::text("Hello "),
                Inline::Text(TextRun::marked("big", Marks { bold: true, ..Marks::NONE })),
                Inline::LineBreak,
                Inline::Image {
                    src: "https://example.com/a.png".into(),
                    alt: "alt text".into(),
                },
            ]),
            Block::rule(),
            Block::list(ListKind::Bullet, vec![Block::item(vec![Inline::text(" world")], vec![])]),
        ]);
        assert_eq!(
            Metrics::recompute(&document),
            Metrics {
                word_count: 3,
                char_count: 15
            }
        );
    }

    #[test]
    fn blocks_join_without_separator() {
        let document = Document::from_blocks(vec![
            Block::paragraph(vec![Inline::text("one")]),
            Block::paragraph(vec![Inline::text("two")]),
        ]);
        assert_eq!(Metrics::recompute(&document).word_count, 1);
    }
}
