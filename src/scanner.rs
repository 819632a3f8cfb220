//! Match scanning: run every pattern descriptor over file content and record
//! raw matches with line/column spans.

use crate::catalog::{PatternDescriptor, SpanMode};

/// A detected log statement. Lines and columns are 0-indexed byte offsets.
#[derive(Debug, Clone)]
pub struct LogMatch {
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
    pub start_col: usize,
    pub end_col: usize,
    pub span_mode: SpanMode,
    pub description: String,
    pub respects_whitelist: bool,
    /// Set by the whitelist filter; protected matches are never rewritten.
    pub keep: bool,
}

impl LogMatch {
    /// Number of lines the match covers, for overlap-resolution tie-breaks.
    pub fn line_span(&self) -> usize {
        self.end_line - self.start_line
    }
}

/// Run all descriptors against `content` and collect one match per
/// occurrence. No deduplication across descriptors: a live pattern and a
/// commented pattern may both report overlapping spans over the same text;
/// resolution is the rewrite engine's job. Output order is not meaningful.
pub fn scan(content: &str, descriptors: &[PatternDescriptor]) -> Vec<LogMatch> {
    let mut matches = Vec::new();

    for descriptor in descriptors {
        for found in descriptor.regex.find_iter(content) {
            let text = found.as_str();
            let before = &content[..found.start()];

            let start_line = count_newlines(before);
            let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
            let start_col = found.start() - line_start;

            let newlines_within = count_newlines(text);
            let end_line = start_line + newlines_within;
            let end_col = match text.rfind('\n') {
                Some(i) => text.len() - i - 1,
                None => start_col + text.len(),
            };

            matches.push(LogMatch {
                text: text.to_string(),
                start_line,
                end_line,
                start_col,
                end_col,
                span_mode: descriptor.span_mode,
                description: descriptor.description.clone(),
                respects_whitelist: descriptor.respects_whitelist,
                keep: false,
            });
        }
    }

    matches
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::CleanerConfig;

    fn js_patterns() -> Vec<PatternDescriptor> {
        let catalog = Catalog::load().unwrap();
        catalog
            .rules_for_id("javascript")
            .unwrap()
            .build_patterns("javascript", &CleanerConfig::default())
            .unwrap()
    }

    #[test]
    fn test_single_match_span() {
        let content = "const a = 1;\nconsole.log('hi');\nconst b = 2;";
        let matches = scan(content, &js_patterns());
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.text, "console.log('hi');");
        assert_eq!(m.start_line, 1);
        assert_eq!(m.end_line, 1);
        assert_eq!(m.start_col, 0);
        assert_eq!(m.end_col, m.text.len());
    }

    #[test]
    fn test_indented_match_column() {
        let content = "function f() {\n    console.warn('x');\n}";
        let matches = scan(content, &js_patterns());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start_col, 4);
    }

    #[test]
    fn test_multiline_match_span() {
        let content = "a\nconsole.log(\n  'one',\n  'two'\n);\nb";
        let matches = scan(content, &js_patterns());
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.start_line, 1);
        assert_eq!(m.end_line, 4);
        assert_eq!(m.end_col, 2); // ");"
    }

    #[test]
    fn test_live_and_commented_both_reported() {
        // A commented console.log is hit by the commented-line pattern; the
        // scanner does not deduplicate.
        let content = "// console.log('old');";
        let matches = scan(content, &js_patterns());
        assert!(matches
            .iter()
            .any(|m| m.description.starts_with("Commented")));
    }

    #[test]
    fn test_scan_order_invariance() {
        // The discovered (span, description) set does not depend on
        // descriptor evaluation order.
        let content = "console.log('a');\ndebugger;\n// console.warn('b');\n";
        let mut forward = js_patterns();
        let matches_a = scan(content, &forward);
        forward.reverse();
        let matches_b = scan(content, &forward);

        let key = |m: &LogMatch| (m.start_line, m.start_col, m.end_line, m.text.clone());
        let mut set_a: Vec<_> = matches_a.iter().map(key).collect();
        let mut set_b: Vec<_> = matches_b.iter().map(key).collect();
        set_a.sort();
        set_b.sort();
        assert_eq!(set_a, set_b);
    }
}
