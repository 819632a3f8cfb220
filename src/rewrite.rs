//! Rewrite engine: resolve overlapping matches and mutate the document in a
//! single reverse-order pass.
//!
//! Processing spans from the highest line index down means a removal only
//! ever invalidates indices *after* the removal point in the original
//! numbering, so every not-yet-processed span's recorded indices stay valid
//! and no recomputation is needed between mutations.

use crate::config::Mode;
use crate::scanner::LogMatch;

/// Result of applying matches to a document.
#[derive(Debug)]
pub struct RewriteOutcome {
    pub new_content: String,
    /// Delete spans applied (one per span, not per line).
    pub removed: usize,
    /// Comment spans applied (a multi-line span counts once).
    pub commented: usize,
}

/// One span to mutate, after overlap resolution. Overlapping matches collapse
/// into a single span covering their union of lines; the matched text and
/// column of the smallest member drive the mutation.
#[derive(Debug)]
struct MergedSpan {
    start_line: usize,
    end_line: usize,
    start_col: usize,
    text: String,
}

impl MergedSpan {
    fn from_match(m: &LogMatch) -> Self {
        MergedSpan {
            start_line: m.start_line,
            end_line: m.end_line,
            start_col: m.start_col,
            text: m.text.clone(),
        }
    }
}

/// Group matches whose line ranges intersect and collapse each group into one
/// combined span. Independent descriptors may report overlapping spans over
/// the same text (a live pattern inside a block-commented one, for example);
/// without this step the mutation order would be undefined.
fn merge_overlapping(matches: &[LogMatch]) -> Vec<MergedSpan> {
    let mut candidates: Vec<&LogMatch> = matches.iter().filter(|m| !m.keep).collect();
    candidates.sort_by_key(|m| (m.start_line, m.start_col));

    let mut merged: Vec<MergedSpan> = Vec::new();
    // (line span, text length) of the current group's representative
    let mut rep_size = (0usize, 0usize);

    for m in candidates {
        if let Some(last) = merged.last_mut() {
            if m.start_line <= last.end_line {
                last.end_line = last.end_line.max(m.end_line);
                let size = (m.line_span(), m.text.len());
                if size < rep_size {
                    // smallest span wins; first in scan order on ties
                    last.text = m.text.clone();
                    rep_size = size;
                }
                continue;
            }
        }
        rep_size = (m.line_span(), m.text.len());
        merged.push(MergedSpan::from_match(m));
    }

    merged
}

/// Apply all non-kept matches to `content`. Preview mode performs the full
/// delete computation; not persisting the result is the caller's job.
pub fn apply(content: &str, matches: &[LogMatch], mode: Mode, comment_prefix: &str) -> RewriteOutcome {
    let mut spans = merge_overlapping(matches);
    // Reverse document order: highest start line (then column) first
    spans.sort_by(|a, b| {
        b.start_line
            .cmp(&a.start_line)
            .then(b.start_col.cmp(&a.start_col))
    });

    let mut lines: Vec<String> = content.split('\n').map(|l| l.to_string()).collect();
    let mut removed = 0usize;
    let mut commented = 0usize;

    for span in &spans {
        if span.start_line >= lines.len() {
            continue;
        }
        let end_line = span.end_line.min(lines.len() - 1);

        match mode {
            Mode::Delete | Mode::Preview => {
                if span.start_line == end_line {
                    let line = &lines[span.start_line];
                    let trimmed = line.trim();
                    let matched = span.text.trim();
                    if trimmed == matched || trimmed == format!("{matched};") {
                        // the line holds nothing but the statement
                        lines.remove(span.start_line);
                    } else {
                        lines[span.start_line] = line.replacen(&span.text, "", 1);
                    }
                } else {
                    lines.drain(span.start_line..=end_line);
                }
                removed += 1;
            }
            Mode::Comment => {
                for line in lines.iter_mut().take(end_line + 1).skip(span.start_line) {
                    line.insert_str(0, comment_prefix);
                }
                commented += 1;
            }
        }
    }

    RewriteOutcome {
        new_content: lines.join("\n"),
        removed,
        commented,
    }
}
