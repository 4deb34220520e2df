//! Pattern-based reference scanning.
//!
//! Markup is never parsed into a tree. Each [`PatternSpec`] matches whole
//! tags with a regex and reads one attribute out of the matched text, so
//! everything outside a match is preserved byte for byte. Swapping this for
//! a real parser only means reimplementing [`find_references`].

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::asset::Category;

static LINK_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").unwrap());

/// Scripts with an empty body only; inline scripts have nothing to resolve.
static SCRIPT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>\s*</script\s*>").unwrap());

static MEDIA_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:img|video|audio|source|track)\b[^>]*>").unwrap()
});

/// `name`, `name=value`, `name="value"` or `name='value'`.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\s([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .unwrap()
});

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s]*))\s*\)"#).unwrap()
});

static MANIFEST_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""src"\s*:\s*"([^"]*)""#).unwrap());

/// Secondary attribute check: `attr`'s value must (or, negated, must not)
/// contain `value` as a whitespace-separated token.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    pub attr: &'static str,
    pub value: &'static str,
    pub negate: bool,
}

impl Gate {
    fn passes(&self, tag: &str) -> bool {
        let found = attribute(tag, self.attr).is_some_and(|span| {
            tag[span]
                .split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case(self.value))
        });
        found != self.negate
    }
}

/// What to look for in a document.
#[derive(Debug, Clone, Copy)]
pub struct PatternSpec {
    pub category: Category,
    element: &'static LazyLock<Regex>,
    /// Attribute that holds the reference.
    pub uri_attr: &'static str,
    pub gate: Option<Gate>,
}

impl PatternSpec {
    pub fn for_category(category: Category) -> Option<Self> {
        let spec = match category {
            Category::Css => Self {
                category,
                element: &LINK_TAG,
                uri_attr: "href",
                gate: Some(Gate {
                    attr: "rel",
                    value: "stylesheet",
                    negate: false,
                }),
            },
            Category::Generic => Self {
                category,
                element: &LINK_TAG,
                uri_attr: "href",
                gate: Some(Gate {
                    attr: "rel",
                    value: "stylesheet",
                    negate: true,
                }),
            },
            Category::Esm => Self {
                category,
                element: &SCRIPT_TAG,
                uri_attr: "src",
                gate: Some(Gate {
                    attr: "type",
                    value: "module",
                    negate: false,
                }),
            },
            Category::Script => Self {
                category,
                element: &SCRIPT_TAG,
                uri_attr: "src",
                gate: Some(Gate {
                    attr: "type",
                    value: "module",
                    negate: true,
                }),
            },
            Category::Media => Self {
                category,
                element: &MEDIA_TAG,
                uri_attr: "src",
                gate: None,
            },
            Category::Extras => return None,
        };
        Some(spec)
    }
}

/// One matched reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Byte range of the whole match in the scanned text.
    pub range: Range<usize>,
    /// Byte range of the reference, relative to `range.start`.
    pub uri: Range<usize>,
}

impl Reference {
    pub fn tag<'t>(&self, text: &'t str) -> &'t str {
        &text[self.range.clone()]
    }
}

/// Find every tag matching `spec`, in document order.
pub fn find_references(text: &str, spec: &PatternSpec) -> Vec<Reference> {
    spec.element
        .find_iter(text)
        .filter_map(|m| {
            let tag = m.as_str();
            if spec.gate.is_some_and(|gate| !gate.passes(tag)) {
                return None;
            }
            let uri = attribute(tag, spec.uri_attr)?;
            Some(Reference {
                range: m.range(),
                uri,
            })
        })
        .collect()
}

/// Nested references inside a stylesheet: every `url(...)`.
pub fn find_css_urls(text: &str) -> Vec<Reference> {
    find_captured(&CSS_URL, text)
}

/// Nested references inside a web app manifest: every `"src": "..."`.
pub fn find_manifest_sources(text: &str) -> Vec<Reference> {
    find_captured(&MANIFEST_SRC, text)
}

fn find_captured(re: &Regex, text: &str) -> Vec<Reference> {
    re.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let value = (1..caps.len()).find_map(|i| caps.get(i))?;
            Some(Reference {
                range: whole.range(),
                uri: value.start() - whole.start()..value.end() - whole.start(),
            })
        })
        .collect()
}

/// Span of an attribute's value inside a single tag.
fn attribute(tag: &str, name: &str) -> Option<Range<usize>> {
    ATTRIBUTE.captures_iter(tag).find_map(|caps| {
        if !caps.get(1)?.as_str().eq_ignore_ascii_case(name) {
            return None;
        }
        let value = caps.get(2).or(caps.get(3)).or(caps.get(4))?;
        Some(value.range())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uris(text: &str, category: Category) -> Vec<String> {
        let spec = PatternSpec::for_category(category).unwrap();
        find_references(text, &spec)
            .iter()
            .map(|r| r.tag(text)[r.uri.clone()].to_string())
            .collect()
    }

    #[test]
    fn test_stylesheet_gate() {
        let html = r#"<link rel="stylesheet" href="a.css"><link rel="icon" href="i.png">
            <LINK REL='alternate stylesheet' HREF='b.css'>"#;
        assert_eq!(uris(html, Category::Css), vec!["a.css", "b.css"]);
        assert_eq!(uris(html, Category::Generic), vec!["i.png"]);
    }

    #[test]
    fn test_module_vs_classic_script() {
        let html = r#"<script src="b.js"></script>
<script type="module" src="./m.js"></script>
<script>inline()</script>
<script src=c.js defer>
</script>"#;
        assert_eq!(uris(html, Category::Script), vec!["b.js", "c.js"]);
        assert_eq!(uris(html, Category::Esm), vec!["./m.js"]);
    }

    #[test]
    fn test_media_elements() {
        let html = r#"<img alt="x src=no" src="a.png"><video src="v.mp4"><source src="v.webm"></video>
<track kind="captions" src="c.vtt"><iframe src="x.html">"#;
        assert_eq!(
            uris(html, Category::Media),
            vec!["a.png", "v.mp4", "v.webm", "c.vtt"]
        );
    }

    #[test]
    fn test_attribute_without_value_is_skipped() {
        let html = r#"<img src alt="x">"#;
        assert!(uris(html, Category::Media).is_empty());
    }

    #[test]
    fn test_reference_ranges() {
        let html = r#"<p>hi</p><link href="a.css" rel=stylesheet>"#;
        let spec = PatternSpec::for_category(Category::Css).unwrap();
        let refs = find_references(html, &spec);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].range.start, 9);
        assert_eq!(&refs[0].tag(html)[refs[0].uri.clone()], "a.css");
    }

    #[test]
    fn test_css_urls() {
        let css = r#"a{background:url( "img/a.png" )} b{src:url(font.woff2?v=1#x)} c{x:URL('c.svg')}"#;
        let found: Vec<_> = find_css_urls(css)
            .iter()
            .map(|r| r.tag(css)[r.uri.clone()].to_string())
            .collect();
        assert_eq!(found, vec!["img/a.png", "font.woff2?v=1#x", "c.svg"]);
    }

    #[test]
    fn test_manifest_sources() {
        let json = r#"{"icons": [{"src": "icons/192.png", "sizes": "192x192"}, {"src":"512.png"}]}"#;
        let found: Vec<_> = find_manifest_sources(json)
            .iter()
            .map(|r| r.tag(json)[r.uri.clone()].to_string())
            .collect();
        assert_eq!(found, vec!["icons/192.png", "512.png"]);
    }
}
