//! Document to markup.
//!
//! The output uses only what [`crate::sanitize::SanitizePolicy::document`]
//! accepts, so `sanitize(serialize(doc))` gives back the same blocks.

use crate::editing::document::Document;
use crate::editing::node::{Alignment, Block, BlockKind, Inline, Marks, TextRun};

pub fn serialize(document: &Document) -> String {
    let mut out = String::new();
    for block in document.blocks() {
        write_block(&mut out, block);
    }
    out
}

/// Text of every run in document order, nothing between blocks.
pub fn plain_text(document: &Document) -> String {
    document.plain_text()
}

fn write_block(out: &mut String, block: &Block) {
    match block.kind {
        BlockKind::Paragraph => write_text_block(out, "p", block),
        BlockKind::Heading(level) => write_text_block(out, &format!("h{level}"), block),
        BlockKind::ListItem => {
            open_tag(out, "li", block.alignment);
            write_inlines(out, block.inlines());
            for nested in block.blocks() {
                write_block(out, nested);
            }
            out.push_str("</li>");
        }
        BlockKind::List(kind) => {
            out.push_str(&format!("<{}>", kind.tag()));
            for item in block.blocks() {
                write_block(out, item);
            }
            out.push_str(&format!("</{}>", kind.tag()));
        }
        BlockKind::HorizontalRule => out.push_str("<hr>"),
    }
}

fn write_text_block(out: &mut String, tag: &str, block: &Block) {
    open_tag(out, tag, block.alignment);
    write_inlines(out, block.inlines());
    out.push_str(&format!("</{tag}>"));
}

fn open_tag(out: &mut String, tag: &str, alignment: Alignment) {
    if alignment == Alignment::Left {
        out.push_str(&format!("<{tag}>"));
    } else {
        out.push_str(&format!(r#"<{tag} style="text-align: {}">"#, alignment.as_css()));
    }
}

/// Inline content; consecutive runs with one link target share an `<a>`.
fn write_inlines<'a>(out: &mut String, inlines: impl Iterator<Item = &'a Inline>) {
    let mut link: Option<&str> = None;
    let mut after_space = false;
    for inline in inlines {
        match inline {
            Inline::Text(run) if run.text.is_empty() => {}
            Inline::Text(run) => {
                let href = run.href.as_deref();
                if href != link {
                    if link.is_some() {
                        out.push_str("</a>");
                    }
                    if let Some(href) = href {
                        out.push_str(&format!(
                            r#"<a href="{}">"#,
                            html_escape::encode_double_quoted_attribute(href)
                        ));
                    }
                    link = href;
                }
                write_run(out, run, &mut after_space);
            }
            atom => {
                after_space = false;
                if link.take().is_some() {
                    out.push_str("</a>");
                }
                match atom {
                    Inline::Image { src, alt } => out.push_str(&format!(
                        r#"<img src="{}" alt="{}">"#,
                        html_escape::encode_double_quoted_attribute(src),
                        html_escape::encode_double_quoted_attribute(alt)
                    )),
                    _ => out.push_str("<br>"),
                }
            }
        }
    }
    if link.is_some() {
        out.push_str("</a>");
    }
}

fn write_run(out: &mut String, run: &TextRun, after_space: &mut bool) {
    let Marks {
        bold,
        italic,
        underline,
    } = run.marks;
    let tags: Vec<&str> = [(bold, "b"), (italic, "i"), (underline, "u")]
        .into_iter()
        .filter_map(|(on, tag)| on.then_some(tag))
        .collect();
    for tag in &tags {
        out.push_str(&format!("<{tag}>"));
    }
    write_text(out, &run.text, after_space);
    for tag in tags.iter().rev() {
        out.push_str(&format!("</{tag}>"));
    }
}

/// Escaped text where a space following another space is written as
/// `&nbsp;`, so reading the markup back keeps every space.
fn write_text(out: &mut String, text: &str, after_space: &mut bool) {
    for c in html_escape::encode_text(text).chars() {
        match c {
            c if c.is_ascii_whitespace() && *after_space => {
                out.push_str("&nbsp;");
                *after_space = false;
            }
            c if c.is_ascii_whitespace() => {
                out.push(' ');
                *after_space = true;
            }
            c => {
                out.push(c);
                *after_space = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::node::ListKind;
    use crate::sanitize::{SanitizePolicy, sanitize_document};
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    fn bold(text: &str) -> Inline {
        Inline::Text(TextRun::marked(text, Marks { bold: true, ..Marks::NONE }))
    }

    #[test]
    fn paragraphs_and_marks() {
        let all = Marks {
            bold: true,
            italic: true,
            underline: true,
        };
        let document = Document::from_blocks(vec![
            Block::paragraph(vec![Inline::text("Hi "), bold("there"), Inline::Text(TextRun::marked("!", all))]),
            Block::heading(2, vec![Inline::text("a < b & c")]).with_alignment(Alignment::Center),
        ]);
        assert_snapshot!(
            serialize(&document),
            @r#"<p>Hi <b>there</b><b><i><u>!</u></i></b></p><h2 style="text-align: center">a &lt; b &amp; c</h2>"#
        );
    }

    #[test]
    fn links_group_runs() {
        let href = "https://a.example/?x=1&y=\"2\"";
        let document = Document::from_blocks(vec![Block::paragraph(vec![
            Inline::Text(TextRun::link("go ", href)),
            Inline::Text(TextRun {
                text: "now".into(),
                marks: Marks { bold: true, ..Marks::NONE },
                href: Some(href.into()),
            }),
            Inline::text(" then"),
            Inline::LineBreak,
        ])]);
        assert_snapshot!(
            serialize(&document),
            @r#"<p><a href="https://a.example/?x=1&amp;y=&quot;2&quot;">go <b>now</b></a> then<br></p>"#
        );
    }

    #[test]
    fn lists_rules_and_images() {
        let nested = Block::list(ListKind::Ordered, vec![Block::item(vec![Inline::text("b")], vec![])]);
        let document = Document::from_blocks(vec![
            Block::list(ListKind::Bullet, vec![Block::item(vec![Inline::text("a")], vec![nested])]),
            Block::rule(),
            Block::paragraph(vec![Inline::Image {
                src: "https://a.example/i.png".into(),
                alt: "an \"i\"".into(),
            }]),
        ]);
        assert_snapshot!(
            serialize(&document),
            @r#"<ul><li>a<ol><li>b</li></ol></li></ul><hr><p><img src="https://a.example/i.png" alt="an &quot;i&quot;"></p>"#
        );
    }

    #[test]
    fn repeated_spaces_read_back_unchanged() {
        let document = Document::from_blocks(vec![Block::paragraph(vec![
            Inline::text("a  b "),
            bold(" c"),
            Inline::LineBreak,
            Inline::text("  d "),
        ])]);
        let markup = serialize(&document);
        assert_snapshot!(markup, @"<p>a &nbsp;b <b>&nbsp;c</b><br> &nbsp;d </p>");
        assert_eq!(sanitize_document(&markup, &SanitizePolicy::document()), document);
    }

    #[test]
    fn empty_document() {
        assert_snapshot!(serialize(&Document::new()), @"<p></p>");
    }
}
