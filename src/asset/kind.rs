//! Asset category definitions.

use std::fmt;

/// Kind of referenced asset, determines which transform applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// `<link rel="stylesheet" href>`
    Css,
    /// Classic `<script src>`
    Script,
    /// `<script type="module" src>`
    Esm,
    /// Any other `<link href>` (icons, manifests, preloads)
    Generic,
    /// `<img>`, `<video>`, `<audio>`, `<source>`, `<track>` sources
    Media,
    /// Nested references found inside a stylesheet or a manifest
    Extras,
}

impl Category {
    /// Order in which categories are extracted from a document.
    pub const EXTRACTION_ORDER: [Self; 5] = [
        Self::Css,
        Self::Generic,
        Self::Esm,
        Self::Script,
        Self::Media,
    ];

    /// Order in which top-level entities are transformed.
    ///
    /// `Extras` never appears: nested entities are processed by their parent.
    pub const TRANSFORM_ORDER: [Self; 5] = Self::EXTRACTION_ORDER;

    pub const ALL: [Self; 6] = [
        Self::Css,
        Self::Script,
        Self::Esm,
        Self::Generic,
        Self::Media,
        Self::Extras,
    ];

    /// Lowercase label used inside placeholders (`css(0)`).
    pub const fn label(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Script => "script",
            Self::Esm => "esm",
            Self::Generic => "generic",
            Self::Media => "media",
            Self::Extras => "extras",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Production defers these to the coalescing pass instead of rewriting
    /// them in place.
    #[inline]
    pub const fn is_coalesced(self) -> bool {
        matches!(self, Self::Css | Self::Script)
    }

    /// Extension of a coalesced bundle.
    pub const fn bundle_ext(self) -> Option<&'static str> {
        match self {
            Self::Css => Some(".css"),
            Self::Script => Some(".js"),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
        assert_eq!(Category::from_label("style"), None);
    }

    #[test]
    fn test_stylesheets_extracted_first() {
        assert_eq!(Category::EXTRACTION_ORDER[0], Category::Css);
        assert!(!Category::EXTRACTION_ORDER.contains(&Category::Extras));
    }

    #[test]
    fn test_only_css_and_script_coalesce() {
        let coalesced: Vec<_> = Category::ALL
            .into_iter()
            .filter(|c| c.is_coalesced())
            .collect();
        assert_eq!(coalesced, vec![Category::Css, Category::Script]);
    }
}
