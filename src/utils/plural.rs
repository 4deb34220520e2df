//! Count formatting for summary lines.

/// Format a count with its noun, adding `s` unless the count is one.
///
/// `plural_count(1, "bundle")` is `"1 bundle"`, `plural_count(0, "bundle")`
/// is `"0 bundles"`.
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "document"), "0 documents");
        assert_eq!(plural_count(1, "asset"), "1 asset");
        assert_eq!(plural_count(3, "bundle"), "3 bundles");
    }
}
