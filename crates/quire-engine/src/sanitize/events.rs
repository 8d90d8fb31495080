//! First pass: walk the markup tree and emit a flat event stream.
//!
//! The walk decides what each element means (a mark, a link, a block, a
//! list, a boundary, nothing) and drops everything the policy does not
//! allow. It does not decide where blocks start and end; that is the sink's
//! job. The stream is balanced: every `*Start` has its `*End`.

use regex::Regex;
use std::sync::OnceLock;

use quire_syntax::{Element, SyntaxElement, SyntaxKind, SyntaxNode};
use rowan::NodeOrToken;

use crate::editing::node::{Alignment, BlockKind, Inline, ListKind, Mark, Marks, TextRun};
use crate::sanitize::SanitizePolicy;
use crate::sanitize::url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    InlineRun(Inline),
    TextBlockStart { kind: BlockKind, alignment: Alignment },
    TextBlockEnd,
    /// Edge of a block-level element that is not kept.
    Boundary,
    ListStart(ListKind),
    ListEnd,
    ItemStart(Alignment),
    ItemEnd,
    Rule,
}

/// Removed together with everything inside them.
const DROPPED: &[&str] = &[
    "script", "style", "template", "iframe", "object", "embed", "noscript", "head", "title", "svg",
    "math", "textarea", "select", "noembed", "noframes",
];

/// Not kept, but separate the content before and after them.
const BOUNDARIES: &[&str] = &[
    "div", "section", "article", "blockquote", "pre", "table", "tr", "td", "th", "header",
    "footer", "main", "nav", "aside", "figure", "figcaption", "address", "dl", "dt", "dd",
    "tbody", "thead", "tfoot", "xmp", "plaintext", "listing", "form", "fieldset", "body", "html",
];

/// Walk the tree produced by [`quire_syntax::parse`].
pub fn collect(root: &SyntaxNode, policy: &SanitizePolicy) -> Vec<Event> {
    let mut walker = Walker {
        policy,
        events: Vec::new(),
        marks: Marks::NONE,
        href: None,
    };
    for child in root.children_with_tokens() {
        walker.walk(child);
    }
    log::trace!("sanitizer events: {:?}", walker.events);
    walker.events
}

struct Walker<'a> {
    policy: &'a SanitizePolicy,
    events: Vec<Event>,
    marks: Marks,
    href: Option<String>,
}

impl Walker<'_> {
    fn walk(&mut self, child: SyntaxElement) {
        match child {
            NodeOrToken::Token(token) => {
                if token.kind() == SyntaxKind::TEXT {
                    let decoded = html_escape::decode_html_entities(token.text());
                    self.text(&decoded);
                }
            }
            NodeOrToken::Node(node) => match node.kind() {
                SyntaxKind::ELEMENT => {
                    if let Some(element) = Element::cast(node) {
                        self.element(&element);
                    }
                }
                SyntaxKind::RAW_TEXT => self.text(&node.text().to_string()),
                _ => {}
            },
        }
    }

    fn text(&mut self, text: &str) {
        let mut text = collapse_whitespace(text);
        // one space across unwrapped elements and comments
        let after_space = matches!(
            self.events.last(),
            Some(Event::InlineRun(Inline::Text(run))) if run.text.ends_with(' ')
        );
        if after_space && text.starts_with(' ') {
            text.remove(0);
        }
        if text.is_empty() {
            return;
        }
        self.events.push(Event::InlineRun(Inline::Text(TextRun {
            text,
            marks: self.marks,
            href: self.href.clone(),
        })));
    }

    fn children(&mut self, element: &Element) {
        for child in element.content() {
            self.walk(child);
        }
    }

    fn element(&mut self, element: &Element) {
        let tag = element.tag_name();
        match tag.as_str() {
            t if DROPPED.contains(&t) => {
                log::debug!("sanitizer dropped <{t}> with its content");
            }
            "b" | "strong" => self.marked(element, Mark::Bold),
            "i" | "em" => self.marked(element, Mark::Italic),
            "u" => self.marked(element, Mark::Underline),
            "a" => self.anchor(element),
            "br" => self.events.push(Event::InlineRun(Inline::LineBreak)),
            "img" => self.image(element),
            "hr" if self.policy.allow_rules => self.events.push(Event::Rule),
            "hr" => self.events.push(Event::Boundary),
            "p" => self.text_block(element, BlockKind::Paragraph),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse().unwrap_or(1);
                self.text_block(element, BlockKind::Heading(level));
            }
            "ul" | "ol" => {
                let kind = if tag == "ol" { ListKind::Ordered } else { ListKind::Bullet };
                self.events.push(Event::ListStart(kind));
                self.children(element);
                self.events.push(Event::ListEnd);
            }
            "li" => {
                self.events.push(Event::ItemStart(self.alignment(element)));
                self.children(element);
                self.events.push(Event::ItemEnd);
            }
            t if BOUNDARIES.contains(&t) => {
                self.events.push(Event::Boundary);
                self.children(element);
                self.events.push(Event::Boundary);
            }
            t => {
                log::trace!("sanitizer unwrapped <{t}>");
                self.children(element);
            }
        }
    }

    fn marked(&mut self, element: &Element, mark: Mark) {
        let saved = self.marks;
        self.marks = self.marks.with(mark, true);
        self.children(element);
        self.marks = saved;
    }

    fn anchor(&mut self, element: &Element) {
        let href = element
            .attribute("href")
            .map(|raw| html_escape::decode_html_entities(&raw).trim().to_string());
        match href {
            Some(href) if url::is_http_url(&href) => {
                let saved = self.href.replace(href);
                self.children(element);
                self.href = saved;
            }
            other => {
                log::debug!("sanitizer downgraded link with href {other:?} to text");
                self.children(element);
            }
        }
    }

    fn image(&mut self, element: &Element) {
        if !self.policy.allow_images {
            log::debug!("sanitizer dropped <img>: images not allowed here");
            return;
        }
        let src = element
            .attribute("src")
            .map(|raw| html_escape::decode_html_entities(&raw).trim().to_string())
            .unwrap_or_default();
        if !url::is_safe_image_src(&src, &self.policy.image_policy) {
            log::debug!("sanitizer dropped <img> with unsafe src");
            return;
        }
        let alt = element
            .attribute("alt")
            .map(|raw| html_escape::decode_html_entities(&raw).into_owned())
            .unwrap_or_default();
        self.events.push(Event::InlineRun(Inline::Image { src, alt }));
    }

    fn text_block(&mut self, element: &Element, kind: BlockKind) {
        self.events.push(Event::TextBlockStart {
            kind,
            alignment: self.alignment(element),
        });
        self.children(element);
        self.events.push(Event::TextBlockEnd);
    }

    fn alignment(&self, element: &Element) -> Alignment {
        if !self.policy.keep_alignment {
            return Alignment::Left;
        }
        element
            .attribute("style")
            .and_then(|style| text_align(&html_escape::decode_html_entities(&style)))
            .unwrap_or_default()
    }
}

/// The `text-align` declaration of an inline style.
fn text_align(style: &str) -> Option<Alignment> {
    static TEXT_ALIGN: OnceLock<Regex> = OnceLock::new();
    let regex = TEXT_ALIGN.get_or_init(|| {
        Regex::new(r"(?i)(?:^|;)\s*text-align\s*:\s*([a-z-]+)").expect("Invalid text-align regex")
    });
    let caps = regex.captures(style)?;
    Alignment::from_css(caps.get(1)?.as_str())
}

/// Collapse runs of ASCII whitespace to one space, as rendering does.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn events(markup: &str, policy: &SanitizePolicy) -> Vec<Event> {
        collect(&quire_syntax::parse(markup), policy)
    }

    fn run(text: &str, marks: Marks, href: Option<&str>) -> Event {
        Event::InlineRun(Inline::Text(TextRun {
            text: text.into(),
            marks,
            href: href.map(String::from),
        }))
    }

    #[test]
    fn marks_nest_and_restore() {
        let bold = Marks { bold: true, ..Marks::NONE };
        let both = Marks { italic: true, ..bold };
        assert_eq!(
            events("<b>a<em>b</em></b>c", &SanitizePolicy::paste()),
            vec![
                run("a", bold, None),
                run("b", both, None),
                run("c", Marks::NONE, None)
            ]
        );
    }

    #[test]
    fn dropped_elements_lose_content() {
        let out = events("a<script>evil()</script><style>p{}</style><svg><text>x</text></svg>b", &SanitizePolicy::paste());
        assert_eq!(out, vec![run("a", Marks::NONE, None), run("b", Marks::NONE, None)]);
    }

    #[test]
    fn unknown_elements_are_unwrapped() {
        let out = events(r#"<span onclick="x()">hi</span><!-- c -->"#, &SanitizePolicy::paste());
        assert_eq!(out, vec![run("hi", Marks::NONE, None)]);
    }

    #[test]
    fn anchors_need_http_urls() {
        let out = events(
            r#"<a href=" https://a.example/?x=1&amp;y=2 ">ok</a><a href="javascript:alert(1)">bad</a>"#,
            &SanitizePolicy::paste(),
        );
        assert_eq!(
            out,
            vec![
                run("ok", Marks::NONE, Some("https://a.example/?x=1&y=2")),
                run("bad", Marks::NONE, None),
            ]
        );
    }

    #[test]
    fn entities_decode_and_whitespace_collapses() {
        let out = events("a &amp;\n\n  b&lt;", &SanitizePolicy::paste());
        assert_eq!(out, vec![run("a & b<", Marks::NONE, None)]);
    }

    #[test]
    fn whitespace_collapses_across_unwrapped_elements() {
        let bold = Marks { bold: true, ..Marks::NONE };
        let out = events("a <span> b</span> <!-- c --> <b> c</b>", &SanitizePolicy::paste());
        assert_eq!(
            out,
            vec![
                run("a ", Marks::NONE, None),
                run("b", Marks::NONE, None),
                run(" ", Marks::NONE, None),
                run("c", bold, None),
            ]
        );
    }

    #[test]
    fn block_structure() {
        let out = events("<div><h2>t</h2><ul><li>x</li></ul></div>", &SanitizePolicy::paste());
        assert_eq!(
            out,
            vec![
                Event::Boundary,
                Event::TextBlockStart {
                    kind: BlockKind::Heading(2),
                    alignment: Alignment::Left
                },
                run("t", Marks::NONE, None),
                Event::TextBlockEnd,
                Event::ListStart(ListKind::Bullet),
                Event::ItemStart(Alignment::Left),
                run("x", Marks::NONE, None),
                Event::ItemEnd,
                Event::ListEnd,
                Event::Boundary,
            ]
        );
    }

    #[test]
    fn images_and_rules_follow_policy() {
        let markup = r#"<img src="https://a.example/i.png" alt="i"><hr><img src="javascript:x">"#;
        assert_eq!(events(markup, &SanitizePolicy::paste()), vec![Event::Boundary]);
        assert_eq!(
            events(markup, &SanitizePolicy::document()),
            vec![
                Event::InlineRun(Inline::Image {
                    src: "https://a.example/i.png".into(),
                    alt: "i".into()
                }),
                Event::Rule,
            ]
        );
    }

    #[test]
    fn alignment_only_with_document_policy() {
        let markup = r#"<p style="color: red; text-align: center">x</p>"#;
        let start = |policy: &SanitizePolicy| events(markup, policy).into_iter().next();
        assert_eq!(
            start(&SanitizePolicy::document()),
            Some(Event::TextBlockStart {
                kind: BlockKind::Paragraph,
                alignment: Alignment::Center
            })
        );
        assert_eq!(
            start(&SanitizePolicy::paste()),
            Some(Event::TextBlockStart {
                kind: BlockKind::Paragraph,
                alignment: Alignment::Left
            })
        );
    }
}
