//! Unified-style diff generation for previewing a clean.
//!
//! The diff is a deterministic two-cursor approximation, not a minimal edit
//! script: hunks carry only the changed lines, with no surrounding context.

use std::fmt::Write;

#[derive(Debug)]
struct Hunk {
    original_start: usize,
    original_len: usize,
    modified_start: usize,
    modified_len: usize,
    lines: Vec<String>,
}

/// Generate a unified-style diff between `original` and `modified`.
/// `label` is used for both file header lines.
pub fn generate_unified_diff(original: &str, modified: &str, label: &str) -> String {
    let original_lines: Vec<&str> = original.split('\n').collect();
    let modified_lines: Vec<&str> = modified.split('\n').collect();

    let mut hunks: Vec<Hunk> = Vec::new();
    let mut current: Option<Hunk> = None;
    let mut i = 0;
    let mut j = 0;

    let open = |i: usize, j: usize| Hunk {
        original_start: i + 1,
        original_len: 0,
        modified_start: j + 1,
        modified_len: 0,
        lines: Vec::new(),
    };

    while i < original_lines.len() || j < modified_lines.len() {
        if i >= original_lines.len() {
            // insertions at end
            let hunk = current.get_or_insert_with(|| open(i, j));
            hunk.lines.push(format!("+{}", modified_lines[j]));
            hunk.modified_len += 1;
            j += 1;
        } else if j >= modified_lines.len() {
            // deletions at end
            let hunk = current.get_or_insert_with(|| open(i, j));
            hunk.lines.push(format!("-{}", original_lines[i]));
            hunk.original_len += 1;
            i += 1;
        } else if original_lines[i] == modified_lines[j] {
            // equal lines close any open hunk
            if let Some(hunk) = current.take() {
                hunks.push(hunk);
            }
            i += 1;
            j += 1;
        } else {
            let hunk = current.get_or_insert_with(|| open(i, j));
            if modified_lines[j..].contains(&original_lines[i]) {
                // original line reappears later: pure insertion
                hunk.lines.push(format!("+{}", modified_lines[j]));
                hunk.modified_len += 1;
                j += 1;
            } else if original_lines[i..].contains(&modified_lines[j]) {
                // modified line reappears later: pure deletion
                hunk.lines.push(format!("-{}", original_lines[i]));
                hunk.original_len += 1;
                i += 1;
            } else {
                // one-for-one substitution
                hunk.lines.push(format!("-{}", original_lines[i]));
                hunk.lines.push(format!("+{}", modified_lines[j]));
                hunk.original_len += 1;
                hunk.modified_len += 1;
                i += 1;
                j += 1;
            }
        }
    }

    if let Some(hunk) = current.take() {
        hunks.push(hunk);
    }

    let mut diff = format!("--- {label}\n+++ {label}");
    for hunk in &hunks {
        let _ = write!(
            diff,
            "\n@@ -{},{} +{},{} @@",
            hunk.original_start, hunk.original_len, hunk.modified_start, hunk.modified_len
        );
        for line in &hunk.lines {
            diff.push('\n');
            diff.push_str(line);
        }
    }

    diff
}

/// Format a one-line human summary of a batch ("2 files modified, 5 logs removed").
pub fn format_change_summary(removed: usize, commented: usize, files_modified: usize) -> String {
    if files_modified == 0 {
        return "No changes made".to_string();
    }

    let mut parts = vec![format!(
        "{} file{} modified",
        files_modified,
        if files_modified == 1 { "" } else { "s" }
    )];
    if removed > 0 {
        parts.push(format!(
            "{} log{} removed",
            removed,
            if removed == 1 { "" } else { "s" }
        ));
    }
    if commented > 0 {
        parts.push(format!(
            "{} log{} commented",
            commented,
            if commented == 1 { "" } else { "s" }
        ));
    }

    parts.join(", ")
}
