//! Typed views over the untyped CST.
//!
//! Consumers such as the sanitizer walk [`SyntaxNode`]s; these wrappers give
//! the few questions they ask of an element a name.

use crate::lexer::{self, Attribute};
use crate::syntax_kind::{SyntaxElement, SyntaxKind, SyntaxNode};

/// An `ELEMENT` node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element(SyntaxNode);

impl Element {
    /// Wrap a node if it is an element.
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        (node.kind() == SyntaxKind::ELEMENT).then_some(Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    fn start_tag(&self) -> Option<String> {
        self.0
            .first_token()
            .filter(|t| t.kind() == SyntaxKind::START_TAG)
            .map(|t| t.text().to_string())
    }

    /// Lowercased tag name.
    pub fn tag_name(&self) -> String {
        self.start_tag()
            .map(|tag| lexer::tag_name(&tag))
            .unwrap_or_default()
    }

    /// Attributes of the start tag, values still entity-encoded.
    pub fn attributes(&self) -> Vec<Attribute> {
        self.start_tag()
            .map(|tag| lexer::attributes(&tag))
            .unwrap_or_default()
    }

    /// Value of the first attribute with this (lowercase) name.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes()
            .into_iter()
            .find(|a| a.name == name)
            .map(|a| a.value)
    }

    /// Child nodes and tokens between the start and end tags.
    pub fn content(&self) -> impl Iterator<Item = SyntaxElement> + use<> {
        let last = self.0.children_with_tokens().count().saturating_sub(1);
        let has_end = self
            .0
            .last_token()
            .is_some_and(|t| t.kind() == SyntaxKind::END_TAG && t.parent().as_ref() == Some(&self.0));
        self.0
            .children_with_tokens()
            .enumerate()
            .skip(1)
            .filter(move |(i, _)| !(has_end && *i == last))
            .map(|(_, child)| child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    fn first_element(input: &str) -> Element {
        let root = parse(input);
        root.children().find_map(Element::cast).unwrap()
    }

    #[test]
    fn element_tag_and_attributes() {
        let element = first_element(r#"<A Href="https://example.com" class=x>link</A>"#);
        assert_eq!(element.tag_name(), "a");
        assert_eq!(
            element.attribute("href").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(element.attribute("missing"), None);
    }

    #[test]
    fn content_excludes_tags() {
        let element = first_element("<p>a<b>b</b>c</p>");
        let kinds: Vec<_> = element.content().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![SyntaxKind::TEXT, SyntaxKind::ELEMENT, SyntaxKind::TEXT]
        );
    }

    #[test]
    fn content_of_unclosed_element_keeps_last_child() {
        let element = first_element("<p>a<b>b</b>");
        let kinds: Vec<_> = element.content().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::TEXT, SyntaxKind::ELEMENT]);
    }

    #[test]
    fn cast_rejects_other_nodes() {
        let root = parse("a</b>");
        let error = root.children().next().unwrap();
        assert!(Element::cast(error).is_none());
    }
}
