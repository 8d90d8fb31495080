//! URL checks shared by the sanitizer and the link and image commands.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ValidationError;
use crate::image::ImagePolicy;

fn http_url_regex() -> &'static Regex {
    static HTTP_URL: OnceLock<Regex> = OnceLock::new();
    HTTP_URL.get_or_init(|| {
        Regex::new(r#"(?i)^https?://[^\s/?#<>"'`]+[^\s<>"'`]*$"#).expect("Invalid URL regex")
    })
}

fn data_image_regex() -> &'static Regex {
    static DATA_IMAGE: OnceLock<Regex> = OnceLock::new();
    DATA_IMAGE.get_or_init(|| {
        Regex::new(r"(?i)^data:image/([a-z0-9.+-]+);base64,[a-z0-9+/=\s]*$")
            .expect("Invalid data URI regex")
    })
}

/// An absolute `http` or `https` URL with a host.
pub fn is_http_url(url: &str) -> bool {
    http_url_regex().is_match(url)
}

/// Trim and check a link target.
pub fn validate_link(url: &str) -> Result<String, ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    if !is_http_url(url) {
        return Err(ValidationError::InvalidUrl(url.to_string()));
    }
    Ok(url.to_string())
}

/// An image source that may be rendered: `http(s)`, or a base64 `data:`
/// URI of a type the policy allows.
pub fn is_safe_image_src(src: &str, policy: &ImagePolicy) -> bool {
    if is_http_url(src) {
        return true;
    }
    data_image_regex()
        .captures(src)
        .and_then(|caps| caps.get(1))
        .is_some_and(|subtype| policy.allows_mime(&format!("image/{}", subtype.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com", true)]
    #[case("HTTP://example.com/a?b=c#d", true)]
    #[case("https://", false)]
    #[case("javascript:alert(1)", false)]
    #[case("ftp://example.com", false)]
    #[case("//example.com", false)]
    #[case("https://exa mple.com", false)]
    #[case("https://example.com/\"onmouseover", false)]
    fn http_urls(#[case] url: &str, #[case] ok: bool) {
        assert_eq!(is_http_url(url), ok);
    }

    #[test]
    fn validate_link_trims_and_reports() {
        assert_eq!(validate_link("  https://a.example/x "), Ok("https://a.example/x".into()));
        assert_eq!(validate_link("   "), Err(ValidationError::EmptyUrl));
        assert_eq!(
            validate_link("javascript:alert(1)"),
            Err(ValidationError::InvalidUrl("javascript:alert(1)".into()))
        );
    }

    #[rstest]
    #[case("https://example.com/a.png", true)]
    #[case("data:image/png;base64,aGk=", true)]
    #[case("data:image/svg+xml;base64,aGk=", false)]
    #[case("data:text/html;base64,aGk=", false)]
    #[case("javascript:alert(1)", false)]
    fn image_sources(#[case] src: &str, #[case] ok: bool) {
        assert_eq!(is_safe_image_src(src, &ImagePolicy::default()), ok);
    }
}
