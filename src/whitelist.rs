//! Whitelist filtering: protect matches whose span (or the line immediately
//! above it) carries a whitelist tag or a comment-style "keep" marker.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::scanner::LogMatch;

// A case-insensitive "keep" immediately after a line-comment token or a
// block-comment opener also protects the statement, tags aside.
static KEEP_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)//\s*keep",
        r"(?i)/\*\s*keep",
        r"(?i)#\s*keep",
        r"(?i)--\s*keep",
    ]
    .iter()
    .map(|source| Regex::new(source).expect("keep marker pattern"))
    .collect()
});

/// True when `line` contains a configured whitelist tag or a keep marker.
fn line_is_whitelisted(line: &str, tags: &[String]) -> bool {
    if tags.iter().any(|tag| line.contains(tag.as_str())) {
        return true;
    }
    KEEP_MARKERS.iter().any(|marker| marker.is_match(line))
}

/// True when any line in [start_line, end_line], or the single line
/// immediately preceding start_line, is whitelisted. Pure function of
/// (content, span, tags); stable across repeated evaluation.
pub fn span_is_whitelisted(
    content: &str,
    start_line: usize,
    end_line: usize,
    tags: &[String],
) -> bool {
    let lines: Vec<&str> = content.split('\n').collect();
    let first = start_line.saturating_sub(1);
    let last = end_line.min(lines.len().saturating_sub(1));

    for line in lines.iter().take(last + 1).skip(first) {
        if line_is_whitelisted(line, tags) {
            return true;
        }
    }
    false
}

/// Mark protected matches. Only descriptors that respect the whitelist are
/// inspected; everything else keeps `keep = false`.
pub fn apply_keep_flags(content: &str, matches: &mut [LogMatch], tags: &[String]) {
    for m in matches.iter_mut() {
        if m.respects_whitelist {
            m.keep = span_is_whitelisted(content, m.start_line, m.end_line, tags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> Vec<String> {
        vec!["@keep".to_string(), "@preserve".to_string()]
    }

    #[test]
    fn test_tag_on_same_line() {
        let content = "console.log('x'); // @keep";
        assert!(span_is_whitelisted(content, 0, 0, &tags()));
    }

    #[test]
    fn test_tag_on_preceding_line() {
        let content = "// @preserve\nconsole.log('x');";
        assert!(span_is_whitelisted(content, 1, 1, &tags()));
    }

    #[test]
    fn test_tag_two_lines_above_does_not_protect() {
        let content = "// @keep\nconst a = 1;\nconsole.log('x');";
        assert!(!span_is_whitelisted(content, 2, 2, &tags()));
    }

    #[test]
    fn test_keep_marker_case_insensitive() {
        assert!(span_is_whitelisted("print('x')  # KEEP", 0, 0, &tags()));
        assert!(span_is_whitelisted("SELECT 1; -- keep", 0, 0, &tags()));
        assert!(span_is_whitelisted("x(); /* Keep */", 0, 0, &tags()));
    }

    #[test]
    fn test_plain_line_is_not_whitelisted() {
        assert!(!span_is_whitelisted("console.log('x');", 0, 0, &tags()));
        // "keep" without a comment token does not protect
        assert!(!span_is_whitelisted("keepAlive(connection);", 0, 0, &tags()));
    }

    #[test]
    fn test_tag_inside_multiline_span() {
        let content = "console.log(\n  'x', // @keep\n);";
        assert!(span_is_whitelisted(content, 0, 2, &tags()));
    }

    #[test]
    fn test_out_of_range_lines_are_clamped() {
        assert!(!span_is_whitelisted("a\nb", 5, 9, &[]));
    }
}
