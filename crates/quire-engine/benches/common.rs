// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_document_markup(size: usize) -> String {
    let base = r#"<h2>Section</h2><p>Paragraph with <b>bold</b>, <i>italic</i> and a <a href="https://example.com">link</a>.</p><ul><li>Bullet point<ul><li>Nested item</li></ul></li><li>Another item</li></ul><hr>"#;
    base.repeat(size)
}

/// Markup the way word processors put it on the clipboard.
#[allow(dead_code)]
pub fn generate_clipboard_markup(paragraphs: usize) -> String {
    let mut content = String::from(
        "<html><head><style>p{margin:0}</style></head><body><!--StartFragment-->",
    );
    for i in 0..paragraphs {
        content.push_str(&format!(
            r#"<div class="MsoNormal" style="color:#333"><span lang="EN-GB">Paragraph {i} with <strong>strong</strong> and <em>emphasis</em></span><script>track({i})</script></div>"#
        ));
        if i % 5 == 0 {
            content.push_str(r#"<table><tr><td onclick="x()">cell</td></tr></table>"#);
        }
    }
    content.push_str("<!--EndFragment--></body></html>");
    content
}
