//! Mode-specific removal directives.
//!
//! ```html
//! <!-- to-build remove production -->
//! <script src="./debug-panel.js"></script>
//! <!-- /to-build remove production -->
//! ```
//!
//! A region is dropped only when building for the named mode. An opener
//! without a matching closer is left in place, as are closers with no
//! opener.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::BuildMode;

static OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*to-build\s+remove\s+([\w-]+)\s*-->").unwrap());

/// Remove every `to-build remove <mode>` region for the active mode.
pub fn strip_directives(text: &str, mode: BuildMode) -> String {
    let Some(closer) = closer_for(mode.name()) else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut search = 0;

    while let Some(caps) = OPENER.captures_at(text, search) {
        let (Some(opener), Some(token)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        search = opener.end();
        if token.as_str() != mode.name() {
            continue;
        }
        let Some(close) = closer.find_at(text, opener.end()) else {
            continue;
        };

        out.push_str(&text[cursor..opener.start()]);
        cursor = close.end();
        search = close.end();
    }

    out.push_str(&text[cursor..]);
    out
}

fn closer_for(token: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"<!--\s*/to-build\s+remove\s+{}\s*-->",
        regex::escape(token)
    ))
    .ok()
}
