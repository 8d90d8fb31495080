//! # Sanitizer
//!
//! Turns untrusted markup (clipboard content, the host's initial value) into
//! blocks the document can hold. Nothing here can fail: malformed input is
//! degraded, never rejected.
//!
//! ```text
//! markup → quire_syntax::parse → events::collect → sink::build → Vec<Block>
//!                                 (what it means)   (where blocks go)
//! ```
//!
//! - Elements outside the allowlist lose their wrapper; their content is
//!   promoted. Executable and non-rendered containers lose their content too.
//! - Links must point at `http(s)`; anything else becomes plain text.
//! - Attributes other than `href`, `src` and `alt` are dropped (the document
//!   policy also reads `text-align` from `style`).

pub mod events;
pub mod sink;
pub mod url;

use crate::editing::document::Document;
use crate::editing::node::Block;
use crate::image::ImagePolicy;

/// What survives sanitization beyond text, marks, links, paragraphs,
/// headings and lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizePolicy {
    pub allow_images: bool,
    pub allow_rules: bool,
    /// Read `text-align` from `style` on paragraphs, headings and items.
    pub keep_alignment: bool,
    pub image_policy: ImagePolicy,
}

impl SanitizePolicy {
    /// Clipboard content: the strict allowlist.
    pub fn paste() -> Self {
        SanitizePolicy {
            allow_images: false,
            allow_rules: false,
            keep_alignment: false,
            image_policy: ImagePolicy::default(),
        }
    }

    /// Content handed in by the host; accepts everything the serializer
    /// writes.
    pub fn document() -> Self {
        SanitizePolicy {
            allow_images: true,
            allow_rules: true,
            keep_alignment: true,
            image_policy: ImagePolicy::default(),
        }
    }

    pub fn with_images(mut self, allow: bool) -> Self {
        self.allow_images = allow;
        self
    }

    pub fn with_image_policy(mut self, image_policy: ImagePolicy) -> Self {
        self.image_policy = image_policy;
        self
    }
}

/// Sanitize markup into top-level blocks.
pub fn sanitize(markup: &str, policy: &SanitizePolicy) -> Vec<Block> {
    let tree = quire_syntax::parse(markup);
    let events = events::collect(&tree, policy);
    let blocks = sink::build(events);
    log::debug!("sanitized {} bytes into {} blocks", markup.len(), blocks.len());
    blocks
}

/// Sanitize markup into a document; empty input gives an empty paragraph.
pub fn sanitize_document(markup: &str, policy: &SanitizePolicy) -> Document {
    Document::from_blocks(sanitize(markup, policy))
}
