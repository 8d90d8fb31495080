//! # quire-syntax
//!
//! A lossless markup syntax tree using [Rowan] + [Logos], following the
//! [rust-analyzer] architecture model.
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! ## Why a Lossless CST?
//!
//! The editor receives markup from two untrusted places: the host (initial
//! content) and the clipboard. Both have to go through the sanitizer, and the
//! sanitizer has to see the same structure a browser would have rendered, no
//! matter how broken the input is. A concrete syntax tree that keeps **every
//! byte** gives us:
//!
//! - **Error tolerance**: any input produces a tree, never an error
//! - **Exact spans**: a node's text is precisely the source it came from
//! - **One structure**: nesting decisions (unclosed tags, stray end tags) are
//!   made once, here, rather than in every consumer
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Events → Sink → Rowan Tree
//!               (Logos)          (Grammar)        (GreenNodeBuilder)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! Splits input into tags, comments, declarations and text runs.
//!
//! ```text
//! "<p>Hi</p>" → [START_TAG("<p>"), TEXT("Hi"), END_TAG("</p>")]
//! ```
//!
//! ### 2. Parser ([`parser`] module)
//!
//! Consumes tokens and emits events; the grammar decides where each element
//! ends, including the implicit closes browsers apply.
//!
//! ### 3. Sink ([`parser::sink`] module)
//!
//! Replays the events into a `GreenNodeBuilder`.
//!
//! ### 4. Typed access ([`ast`] module)
//!
//! [`Element`] answers the questions consumers ask: tag name, attributes,
//! content.
//!
//! ## Module Structure
//!
//! ```text
//! quire-syntax/
//! ├── lib.rs           # This file - public API and tree-level tests
//! ├── syntax_kind.rs   # SyntaxKind enum (tokens + nodes) and Rowan integration
//! ├── lexer.rs         # Logos-based tokenizer, tag name and attribute scanning
//! ├── ast.rs           # Typed Element wrapper
//! └── parser/
//!     ├── mod.rs       # Parser struct, Marker system, public parse() function
//!     ├── event.rs     # Event enum (Start, Token, Finish, Placeholder)
//!     ├── sink.rs      # Converts events to Rowan GreenNode
//!     └── grammar/
//!         └── mod.rs   # Element nesting and recovery rules
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use quire_syntax::{parse, Element, SyntaxKind};
//!
//! let tree = parse("<p>Hello <b>world</b></p>");
//!
//! // The tree preserves all text
//! assert_eq!(tree.text().to_string(), "<p>Hello <b>world</b></p>");
//!
//! // Navigate the tree structure
//! assert_eq!(tree.kind(), SyntaxKind::ROOT);
//! let paragraph = tree.children().find_map(Element::cast).unwrap();
//! assert_eq!(paragraph.tag_name(), "p");
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod syntax_kind;

pub use ast::Element;
pub use lexer::Attribute;
pub use parser::parse;
pub use syntax_kind::{MarkupLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use rstest::rstest;

    /// Helper to format a syntax tree for snapshot testing.
    fn format_tree(node: &SyntaxNode, indent: usize) -> String {
        let mut result = String::new();
        let prefix = "  ".repeat(indent);

        result.push_str(&format!(
            "{}{:?}@{:?}\n",
            prefix,
            node.kind(),
            node.text_range()
        ));

        for child in node.children_with_tokens() {
            match child {
                rowan::NodeOrToken::Node(n) => {
                    result.push_str(&format_tree(&n, indent + 1));
                }
                rowan::NodeOrToken::Token(t) => {
                    result.push_str(&format!(
                        "{}  {:?}@{:?} {:?}\n",
                        prefix,
                        t.kind(),
                        t.text_range(),
                        t.text()
                    ));
                }
            }
        }

        result
    }

    #[test]
    fn snapshot_nested_inline() {
        let tree = parse("<p>Hi <b>x</b></p>");
        assert_snapshot!(format_tree(&tree, 0), @r#"
        ROOT@0..18
          ELEMENT@0..18
            START_TAG@0..3 "<p>"
            TEXT@3..6 "Hi "
            ELEMENT@6..14
              START_TAG@6..9 "<b>"
              TEXT@9..10 "x"
              END_TAG@10..14 "</b>"
            END_TAG@14..18 "</p>"
        "#);
    }

    #[test]
    fn snapshot_stray_end_tag_and_comment() {
        let tree = parse("a<!--c--></i>");
        assert_snapshot!(format_tree(&tree, 0), @r#"
        ROOT@0..13
          TEXT@0..1 "a"
          COMMENT@1..9 "<!--c-->"
          ERROR@9..13
            END_TAG@9..13 "</i>"
        "#);
    }

    // Clipboard markup from word processors and web pages is rarely
    // well-formed. Whatever the tree looks like, no byte may go missing.
    #[rstest]
    #[case::plain("Hello, world!")]
    #[case::unclosed("<p>one<p>two<b>bold")]
    #[case::misnested("<b><i>x</b></i>")]
    #[case::stray_lt("1 < 2 and 3 <= 4")]
    #[case::quoted_gt(r#"<a title="a > b" href='x'>t</a>"#)]
    #[case::office(
        "<html><head><style>p{}</style></head><body><!--StartFragment--><p class=MsoNormal>x</p><!--EndFragment--></body></html>"
    )]
    #[case::unterminated_comment("text<!-- never closed")]
    #[case::unterminated_tag("<p>text<b")]
    fn roundtrip_preserves_text(#[case] input: &str) {
        let tree = parse(input);
        assert_eq!(tree.text().to_string(), input);
    }
}
