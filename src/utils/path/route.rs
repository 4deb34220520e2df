//! URL processing utilities.
//!
//! Provides consistent handling of asset references found in markup:
//! - Link type detection (external vs local)
//! - Splitting a reference into path and `?query#fragment` suffix
//! - Percent-decoding of the path portion

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Check if a link is external (has a URL scheme like http:, data:, mailto:)
/// or is protocol-relative (`//cdn.example.com/x.js`).
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
///
/// # Examples
/// ```ignore
/// assert!(is_external_link("https://example.com"));
/// assert!(is_external_link("//cdn.example.com/lib.js"));
/// assert!(!is_external_link("/about"));
/// assert!(!is_external_link("./file.txt"));
/// ```
#[inline]
pub fn is_external_link(link: &str) -> bool {
    if link.starts_with("//") {
        return true;
    }
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Check if a link is a bare fragment (`#top`).
#[inline]
pub fn is_fragment(link: &str) -> bool {
    link.starts_with('#')
}

/// Split a reference into its path and `?query#fragment` suffix.
///
/// # Examples
/// ```ignore
/// assert_eq!(split_suffix("font.woff2?v=3#iefix"), ("font.woff2", "?v=3#iefix"));
/// assert_eq!(split_suffix("a.css"), ("a.css", ""));
/// ```
#[inline]
pub fn split_suffix(uri: &str) -> (&str, &str) {
    match uri.find(['?', '#']) {
        Some(pos) => (&uri[..pos], &uri[pos..]),
        None => (uri, ""),
    }
}

/// Percent-decode a path, falling back to the raw input on invalid UTF-8.
#[inline]
pub fn decode_path(path: &str) -> Cow<'_, str> {
    percent_decode_str(path)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_external_link() {
        assert!(is_external_link("https://example.com"));
        assert!(is_external_link("http://example.com"));
        assert!(is_external_link("data:image/png;base64,AAAA"));
        assert!(is_external_link("//cdn.example.com/lib.js"));
        assert!(!is_external_link("/about"));
        assert!(!is_external_link("./file.txt"));
        assert!(!is_external_link("#section"));
        assert!(!is_external_link(""));
    }

    #[test]
    fn test_split_suffix() {
        assert_eq!(split_suffix("font.woff2?v=3#iefix"), ("font.woff2", "?v=3#iefix"));
        assert_eq!(split_suffix("img.svg#icon"), ("img.svg", "#icon"));
        assert_eq!(split_suffix("a.css"), ("a.css", ""));
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("my%20file.css"), "my file.css");
        assert_eq!(decode_path("plain.css"), "plain.css");
    }
}
