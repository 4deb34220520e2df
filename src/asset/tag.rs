//! Tag ids and the placeholders that carry them through the working text.
//!
//! A placeholder is `DELIMITER + category + "(" + ordinal + ")" + DELIMITER`.
//! The delimiter is the ASCII record separator, a control character that is a
//! parse error in HTML, CSS and JSON source, so splitting the working text on
//! it yields alternating literal text and tag-id bodies.

use std::fmt;

use super::{AssetError, Category};

/// Placeholder delimiter.
pub const DELIMITER: char = '\u{1E}';

/// Stable per-category ordinal identifier, e.g. `css(3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId {
    pub category: Category,
    pub ordinal: usize,
}

impl TagId {
    /// Build a tag id, rejecting any encoding the splitter could misread.
    pub fn new(category: Category, ordinal: usize) -> Result<Self, AssetError> {
        let id = Self { category, ordinal };
        if id.to_string().contains(DELIMITER) {
            return Err(AssetError::InvalidTag(id.to_string()));
        }
        Ok(id)
    }

    /// Parse a placeholder body (`css(3)`).
    pub fn parse(body: &str) -> Option<Self> {
        let (label, rest) = body.split_once('(')?;
        let ordinal = rest.strip_suffix(')')?.parse().ok()?;
        Some(Self {
            category: Category::from_label(label)?,
            ordinal,
        })
    }

    /// Placeholder string written into the working text.
    pub fn placeholder(&self) -> String {
        format!("{DELIMITER}{self}{DELIMITER}")
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.category.label(), self.ordinal)
    }
}

/// One piece of the working text after splitting on the delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal document text.
    Text(&'a str),
    /// A placeholder that parsed as a tag id.
    Tag(TagId),
    /// A delimited body that is not a tag id (left as-is by callers).
    Unknown(&'a str),
}

/// Split the working text into literal and placeholder segments, in order.
///
/// Empty literal segments between adjacent placeholders are kept so callers
/// see exactly what separated two placeholders.
pub fn segments(text: &str) -> impl Iterator<Item = Segment<'_>> {
    text.split(DELIMITER).enumerate().map(|(i, part)| {
        if i % 2 == 0 {
            Segment::Text(part)
        } else {
            TagId::parse(part).map_or(Segment::Unknown(part), Segment::Tag)
        }
    })
}

/// Check whether source text is safe to receive placeholders.
#[inline]
pub fn is_placeholder_safe(text: &str) -> bool {
    !text.contains(DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let id = TagId::new(Category::Css, 3).unwrap();
        assert_eq!(id.to_string(), "css(3)");
        assert_eq!(TagId::parse("css(3)"), Some(id));
        assert_eq!(TagId::parse("css3"), None);
        assert_eq!(TagId::parse("nope(1)"), None);
        assert_eq!(TagId::parse("css(x)"), None);
    }

    #[test]
    fn test_placeholder_is_delimited() {
        let id = TagId::new(Category::Script, 12).unwrap();
        let placeholder = id.placeholder();
        assert!(placeholder.starts_with(DELIMITER));
        assert!(placeholder.ends_with(DELIMITER));
        assert_eq!(placeholder.matches(DELIMITER).count(), 2);
    }

    #[test]
    fn test_segments_in_order() {
        let css = TagId::new(Category::Css, 0).unwrap();
        let js = TagId::new(Category::Script, 0).unwrap();
        let text = format!("<head>{}{}\n</head>", css.placeholder(), js.placeholder());

        let parts: Vec<_> = segments(&text).collect();
        assert_eq!(
            parts,
            vec![
                Segment::Text("<head>"),
                Segment::Tag(css),
                Segment::Text(""),
                Segment::Tag(js),
                Segment::Text("\n</head>"),
            ]
        );
    }

    #[test]
    fn test_segments_without_placeholders() {
        let parts: Vec<_> = segments("<p>plain</p>").collect();
        assert_eq!(parts, vec![Segment::Text("<p>plain</p>")]);
    }

    #[test]
    fn test_placeholder_safety() {
        assert!(is_placeholder_safe("<link href=a.css>"));
        assert!(!is_placeholder_safe("bad\u{1E}text"));
    }
}
