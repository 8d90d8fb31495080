//! # Grammar Rules
//!
//! Markup has one composite construct, the element, so the grammar is a
//! single recursive rule plus the nesting policy that decides when an element
//! ends. Each function takes a `&mut Parser` and uses its methods to:
//!
//! 1. Inspect the current token (`p.current()`, `p.at()`, `p.current_text()`)
//! 2. Consume tokens (`p.bump()`)
//! 3. Build tree structure (`p.start()` → marker → `complete()`)
//!
//! ## Error Recovery
//!
//! The rules follow what browsers do with broken markup, closely enough for
//! the sanitizer to see the same nesting a user saw on screen:
//!
//! - Void elements (`br`, `img`, ...) never take children.
//! - An end tag closes the nearest open element with that name, implicitly
//!   closing everything opened after it.
//! - An end tag that matches no open element is wrapped in an ERROR node.
//! - `<li>` closes an open `li`; a block-level start tag closes an open `p`.
//! - The content of `script`, `style` and friends is not parsed at all; it is
//!   collected into a RAW_TEXT node up to the matching end tag. Empty
//!   content gets no RAW_TEXT node.
//!
//! Nothing here can fail; every input produces a tree containing every byte.

use crate::lexer::tag_name;
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Elements that can never have children.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text rather than markup.
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Start tags that implicitly close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "ul",
];

/// Parse the root document.
///
/// This is the entry point for parsing. It creates a ROOT node containing
/// all top-level elements and text in the document.
pub fn root(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let mut open = Vec::new();

    while !p.at_end() {
        match p.current() {
            SyntaxKind::START_TAG => element(p, &mut open),
            SyntaxKind::END_TAG => stray_end_tag(p),
            _ => p.bump(),
        }
    }

    m.complete(p, SyntaxKind::ROOT);
}

fn stray_end_tag(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump();
    m.complete(p, SyntaxKind::ERROR);
}

fn element(p: &mut Parser<'_, '_>, open: &mut Vec<String>) {
    let tag = tag_name(p.current_text());
    let m = p.start();
    p.bump();

    if VOID_ELEMENTS.contains(&tag.as_str()) {
        m.complete(p, SyntaxKind::ELEMENT);
        return;
    }

    if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
        let raw = p.start();
        let content_start = p.pos;
        while !p.at_end() && !(p.at(SyntaxKind::END_TAG) && tag_name(p.current_text()) == tag) {
            p.bump();
        }
        if p.pos == content_start {
            raw.abandon(p);
        } else {
            raw.complete(p, SyntaxKind::RAW_TEXT);
        }
        if p.at(SyntaxKind::END_TAG) {
            p.bump();
        }
        m.complete(p, SyntaxKind::ELEMENT);
        return;
    }

    open.push(tag.clone());
    while !p.at_end() {
        match p.current() {
            SyntaxKind::END_TAG => {
                let name = tag_name(p.current_text());
                if name == tag {
                    p.bump();
                    break;
                } else if open.contains(&name) {
                    // Closes an ancestor; we end here without consuming it
                    break;
                } else {
                    stray_end_tag(p);
                }
            }
            SyntaxKind::START_TAG => {
                let child = tag_name(p.current_text());
                if closes_implicitly(&tag, &child) {
                    break;
                }
                element(p, open);
            }
            _ => p.bump(),
        }
    }
    open.pop();

    m.complete(p, SyntaxKind::ELEMENT);
}

fn closes_implicitly(open_tag: &str, start_tag: &str) -> bool {
    match open_tag {
        "li" => start_tag == "li",
        "p" => CLOSES_PARAGRAPH.contains(&start_tag),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::syntax_kind::{SyntaxKind, SyntaxNode};
    use pretty_assertions::assert_eq;

    /// Compact outline of the element structure: `p(b())` etc.
    fn outline(node: &SyntaxNode) -> String {
        node.children()
            .map(|child| match child.kind() {
                SyntaxKind::ELEMENT => {
                    let tag = child
                        .first_token()
                        .map(|t| crate::lexer::tag_name(t.text()))
                        .unwrap_or_default();
                    format!("{tag}({})", outline(&child))
                }
                SyntaxKind::RAW_TEXT => "raw".to_string(),
                SyntaxKind::ERROR => "error".to_string(),
                other => format!("{other:?}"),
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn nested_elements() {
        assert_eq!(outline(&parse("<p>a<b>b</b></p>")), "p(b())");
    }

    #[test]
    fn void_elements_take_no_children() {
        assert_eq!(outline(&parse("<p>a<br>b<img src=x>c</p>")), "p(br(),img())");
    }

    #[test]
    fn end_tag_closes_ancestor() {
        // </p> closes the unclosed <b> as well
        assert_eq!(outline(&parse("<p><b>x</p>y")), "p(b())");
    }

    #[test]
    fn stray_end_tag_becomes_error() {
        assert_eq!(outline(&parse("a</i>b")), "error");
        assert_eq!(outline(&parse("<p>a</i>b</p>")), "p(error)");
    }

    #[test]
    fn list_items_close_each_other() {
        assert_eq!(outline(&parse("<ul><li>a<li>b</ul>")), "ul(li(),li())");
    }

    #[test]
    fn nested_list_items_do_not_close_outer_item() {
        assert_eq!(
            outline(&parse("<ul><li>a<ul><li>b</li></ul></li></ul>")),
            "ul(li(ul(li())))"
        );
    }

    #[test]
    fn block_start_closes_paragraph() {
        assert_eq!(outline(&parse("<p>a<div>b</div>")), "p(),div()");
        assert_eq!(outline(&parse("<p>a<p>b")), "p(),p()");
    }

    #[test]
    fn script_content_is_raw() {
        assert_eq!(
            outline(&parse("<script>if (a<b) { x() }</script><p>ok</p>")),
            "script(raw),p()"
        );
    }

    #[test]
    fn empty_script_has_no_raw_node() {
        assert_eq!(outline(&parse("<script></script><p>ok</p>")), "script(),p()");
    }

    #[test]
    fn unterminated_script_swallows_rest() {
        let input = "<script>evil()<p>hidden</p>";
        let tree = parse(input);
        assert_eq!(outline(&tree), "script(raw)");
        assert_eq!(tree.text().to_string(), input);
    }

    #[test]
    fn deeply_broken_markup_keeps_every_byte() {
        let input = "</x><li><li><p><ul></p><b><i></b></i><<>>&amp;<!--";
        assert_eq!(parse(input).text().to_string(), input);
    }
}
