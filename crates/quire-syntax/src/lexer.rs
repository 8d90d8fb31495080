//! # Lexer - Tokenizing Markup Source
//!
//! This module provides the first stage of parsing: breaking source text into
//! tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! The most important property of this lexer is that **every byte in the input
//! appears in exactly one token**. We never skip or discard characters, even
//! for markup that no browser would accept:
//!
//! ```
//! use quire_syntax::lexer::lex;
//!
//! let input = "<p class=\"x\">Hi <b>there</b></p>";
//! let tokens = lex(input);
//!
//! // Concatenating all token texts gives back the original
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Token Design
//!
//! Tags are lexed **whole**: `<a href="x" title='y'>` is a single `START_TAG`
//! token. Attribute values may contain `<` and `>` as long as they are quoted,
//! so the tag pattern understands quoting but nothing else. An unquoted `<`
//! ends the attempt, which keeps `if (a<b) { x() }</script>` from swallowing
//! the end tag. Splitting a tag into
//! attributes is done on demand by [`attributes`], which runs a second, tiny
//! lexer over the tag text. This keeps the main lexer context-free: text such
//! as `a="b"` outside a tag is just `TEXT`.
//!
//! A `<` that does not start a well-formed tag, comment or declaration is
//! lexed as `TEXT`, so `1 < 2` survives untouched.
//!
//! ## Public API
//!
//! - [`lex`] - Tokenize input, returning `Vec<Token>`
//! - [`lex_with_spans`] - Tokenize with byte offset spans
//! - [`attributes`] - Split the text of a `START_TAG` token into attributes
//! - [`Token`] - A token with its kind and text slice

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds produced by the Logos lexer.
///
/// This enum exists separately from [`SyntaxKind`] because Logos needs to
/// derive on it. Each variant maps to a corresponding `SyntaxKind` token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<name ...>` including quoted attribute values
    #[regex(r#"<[A-Za-z]([^<>"']|"[^"]*"|'[^']*')*>"#)]
    StartTag,

    /// `</name ...>`
    #[regex(r"</[A-Za-z][^<>]*>")]
    EndTag,

    /// `<!-- ... -->`, running to end of input when unterminated
    #[token("<!--", comment)]
    Comment,

    /// `<!doctype ...>` and `<?...>` processing instructions
    #[regex(r"<![^-][^>]*>")]
    #[regex(r"<\?[^>]*>")]
    Declaration,

    /// A `<` that starts nothing
    #[token("<")]
    Lt,

    /// Plain text - anything up to the next `<`
    #[regex(r"[^<]+")]
    Text,
}

fn comment(lex: &mut logos::Lexer<'_, TokenKind>) {
    let rest = lex.remainder();
    let len = rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
    lex.bump(len);
}

impl TokenKind {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TokenKind::StartTag => SyntaxKind::START_TAG,
            TokenKind::EndTag => SyntaxKind::END_TAG,
            TokenKind::Comment => SyntaxKind::COMMENT,
            TokenKind::Declaration => SyntaxKind::DECLARATION,
            TokenKind::Lt | TokenKind::Text => SyntaxKind::TEXT,
        }
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    lex_with_spans(input)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

/// Lex and return tokens along with their byte spans.
pub fn lex_with_spans(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let kind = match result {
            Ok(token_kind) => token_kind.to_syntax_kind(),
            // Logos error means unrecognized input - treat as TEXT
            Err(()) => SyntaxKind::TEXT,
        };
        tokens.push((Token { kind, text }, span));
    }

    tokens
}

/// Tag name of a `START_TAG` or `END_TAG` token, lowercased.
///
/// Returns an empty string for text that is not a tag.
pub fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// One `name=value` pair from a start tag.
///
/// The name is lowercased; the value is returned exactly as written (minus
/// quotes), so character references are still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum AttrToken {
    #[regex(r"\s+")]
    Whitespace,

    #[token("=")]
    Eq,

    #[token("/")]
    Slash,

    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    #[regex(r"'[^']*'")]
    SingleQuoted,

    #[regex(r#"[^\s"'=>/][^\s"'=>]*"#)]
    Word,
}

/// Split a `START_TAG` token's text into its attributes.
///
/// Malformed fragments (a stray `=`, a value with no name) are ignored; a
/// name without a value yields an empty value.
pub fn attributes(tag: &str) -> Vec<Attribute> {
    let name_len = 1 + tag
        .get(1..)
        .unwrap_or("")
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '>' && *c != '/')
        .map(char::len_utf8)
        .sum::<usize>();
    let inner = tag.get(name_len..).unwrap_or("");
    let inner = inner.strip_suffix('>').unwrap_or(inner);

    let tokens: Vec<(AttrToken, &str)> = {
        let mut lexer = AttrToken::lexer(inner);
        let mut out = Vec::new();
        while let Some(result) = lexer.next() {
            if let Ok(kind) = result
                && kind != AttrToken::Whitespace
            {
                out.push((kind, lexer.slice()));
            }
        }
        out
    };

    let mut attrs = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let (kind, text) = tokens[i];
        if kind != AttrToken::Word {
            i += 1;
            continue;
        }
        let name = text.to_ascii_lowercase();
        if let Some((AttrToken::Eq, _)) = tokens.get(i + 1) {
            let value = match tokens.get(i + 2) {
                Some((AttrToken::DoubleQuoted | AttrToken::SingleQuoted, quoted)) => {
                    i += 3;
                    quoted[1..quoted.len() - 1].to_string()
                }
                Some((AttrToken::Word, word)) => {
                    i += 3;
                    word.to_string()
                }
                _ => {
                    i += 2;
                    String::new()
                }
            };
            attrs.push(Attribute { name, value });
        } else {
            attrs.push(Attribute {
                name,
                value: String::new(),
            });
            i += 1;
        }
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn token(kind: SyntaxKind, text: &str) -> Token<'_> {
        Token { kind, text }
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn lex_plain_text() {
        let tokens = lex("hello world");
        assert_eq!(tokens, vec![token(SyntaxKind::TEXT, "hello world")]);
    }

    #[test]
    fn lex_simple_element() {
        let tokens = lex("<b>hi</b>");
        assert_eq!(
            tokens,
            vec![
                token(SyntaxKind::START_TAG, "<b>"),
                token(SyntaxKind::TEXT, "hi"),
                token(SyntaxKind::END_TAG, "</b>"),
            ]
        );
    }

    #[test]
    fn lex_quoted_gt_stays_inside_tag() {
        let tokens = lex(r#"<a title="a>b" href='x'>"#);
        assert_eq!(
            tokens,
            vec![token(SyntaxKind::START_TAG, r#"<a title="a>b" href='x'>"#)]
        );
    }

    #[test]
    fn lex_comment_and_doctype() {
        let tokens = lex("<!doctype html><!-- a > b -->x");
        assert_eq!(
            tokens,
            vec![
                token(SyntaxKind::DECLARATION, "<!doctype html>"),
                token(SyntaxKind::COMMENT, "<!-- a > b -->"),
                token(SyntaxKind::TEXT, "x"),
            ]
        );
    }

    #[test]
    fn lex_unterminated_comment_runs_to_end() {
        let tokens = lex("a<!-- never closed");
        assert_eq!(
            tokens,
            vec![
                token(SyntaxKind::TEXT, "a"),
                token(SyntaxKind::COMMENT, "<!-- never closed"),
            ]
        );
    }

    #[rstest]
    #[case("1 < 2")]
    #[case("<")]
    #[case("<a href=\"unterminated")]
    #[case("</>")]
    #[case("<<b>>")]
    #[case("<!>")]
    fn lex_is_lossless_for_broken_markup(#[case] input: &str) {
        let reconstructed: String = lex(input).iter().map(|t| t.text).collect();
        assert_eq!(reconstructed, input);
    }

    #[test]
    fn lex_stray_lt_is_text() {
        let tokens = lex("1 < 2");
        assert!(tokens.iter().all(|t| t.kind == SyntaxKind::TEXT));
    }

    #[test]
    fn lex_with_spans_are_contiguous() {
        let input = "<p>a</p><br/>";
        let spans: Vec<_> = lex_with_spans(input).into_iter().map(|(_, s)| s).collect();
        assert_eq!(spans, vec![0..3, 3..4, 4..8, 8..13]);
    }

    #[rstest]
    #[case("<P>", "p")]
    #[case("<h1 class=x>", "h1")]
    #[case("</LI >", "li")]
    #[case("<br/>", "br")]
    fn tag_names_are_lowercased(#[case] tag: &str, #[case] expected: &str) {
        assert_eq!(tag_name(tag), expected);
    }

    #[test]
    fn attributes_in_all_quoting_styles() {
        let attrs = attributes(r#"<a HREF="https://x.test/?a=1&amp;b=2" target='_blank' rel=noopener disabled>"#);
        assert_eq!(
            attrs,
            vec![
                Attribute {
                    name: "href".into(),
                    value: "https://x.test/?a=1&amp;b=2".into()
                },
                Attribute {
                    name: "target".into(),
                    value: "_blank".into()
                },
                Attribute {
                    name: "rel".into(),
                    value: "noopener".into()
                },
                Attribute {
                    name: "disabled".into(),
                    value: String::new()
                },
            ]
        );
    }

    #[test]
    fn attributes_of_self_closing_tag() {
        let attrs = attributes(r#"<img src="a.png" alt="A"/>"#);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[1].value, "A");
    }

    #[test]
    fn attributes_ignore_stray_equals() {
        let attrs = attributes("<p = x>");
        assert_eq!(
            attrs,
            vec![Attribute {
                name: "x".into(),
                value: String::new()
            }]
        );
    }
}
