//! Batch cleaning driver: per-file pipeline (patterns, scan, whitelist,
//! rewrite) plus sequential aggregation across a file set.
//!
//! The core is pure with respect to the filesystem. Callers read file content
//! and persist `new_content`; a failed read or write is attached to the
//! file's result as an error kind rather than aborting the batch.

use std::time::Instant;

use anyhow::Result;
use thiserror::Error;
use tracing::debug;

use crate::catalog::Catalog;
use crate::config::{CleanerConfig, Mode};
use crate::rewrite;
use crate::scanner::{self, LogMatch};
use crate::whitelist;

/// Why a file produced no (or partial) changes. These are per-file outcomes,
/// not batch failures; the batch always runs to completion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CleanErrorKind {
    #[error("file is {size_kb} KB, over the {limit_kb} KB limit")]
    SizeExceeded { size_kb: u64, limit_kb: u64 },
    #[error("unsupported or disabled language: {0}")]
    UnsupportedLanguage(String),
    #[error("{0}")]
    Io(String),
    #[error("failed to restore {path}: {reason}")]
    Restore { path: String, reason: String },
}

/// Outcome of cleaning one file.
#[derive(Debug)]
pub struct FileCleanResult {
    pub path: String,
    pub original_content: String,
    pub new_content: String,
    /// Matches that survived the whitelist filter.
    pub matches: Vec<LogMatch>,
    pub removed_count: usize,
    pub commented_count: usize,
    /// True when new_content differs from original_content.
    pub modified: bool,
    pub error: Option<CleanErrorKind>,
}

impl FileCleanResult {
    /// A result carrying only an error, for files that never reached the
    /// pipeline (unreadable, oversized before reading, ...).
    pub fn failed(path: &str, error: CleanErrorKind) -> Self {
        FileCleanResult {
            path: path.to_string(),
            original_content: String::new(),
            new_content: String::new(),
            matches: Vec::new(),
            removed_count: 0,
            commented_count: 0,
            modified: false,
            error: Some(error),
        }
    }
}

/// Run the full per-file pipeline over in-memory content.
pub fn clean_content(
    path: &str,
    content: &str,
    language_id: &str,
    config: &CleanerConfig,
    catalog: &Catalog,
) -> Result<FileCleanResult> {
    let size_kb = content.len() as u64 / 1024;
    if size_kb > config.max_file_size_kb {
        return Ok(FileCleanResult::failed(
            path,
            CleanErrorKind::SizeExceeded {
                size_kb,
                limit_kb: config.max_file_size_kb,
            },
        ));
    }

    let rules = match catalog.rules_for_id(language_id) {
        Some(rules) => rules,
        None => {
            return Ok(FileCleanResult::failed(
                path,
                CleanErrorKind::UnsupportedLanguage(language_id.to_string()),
            ));
        }
    };

    let patterns = rules.build_patterns(language_id, config)?;
    let mut matches = scanner::scan(content, &patterns);
    whitelist::apply_keep_flags(content, &mut matches, &config.whitelist_tags);
    matches.retain(|m| !m.keep);

    let outcome = rewrite::apply(content, &matches, config.mode, &rules.comment_prefix());
    let modified = outcome.new_content != content;
    debug!(
        path,
        language_id,
        matches = matches.len(),
        removed = outcome.removed,
        commented = outcome.commented,
        "cleaned file content"
    );

    Ok(FileCleanResult {
        path: path.to_string(),
        original_content: content.to_string(),
        new_content: outcome.new_content,
        matches,
        removed_count: outcome.removed,
        commented_count: outcome.commented,
        modified,
        error: None,
    })
}

/// Aggregated outcome of one batch run.
#[derive(Debug)]
pub struct BatchResult {
    pub file_results: Vec<FileCleanResult>,
    pub total_removed: usize,
    pub total_commented: usize,
    pub total_files_modified: usize,
    pub elapsed_ms: u64,
}

impl BatchResult {
    pub fn aggregate(file_results: Vec<FileCleanResult>, elapsed_ms: u64) -> Self {
        let total_removed = file_results.iter().map(|r| r.removed_count).sum();
        let total_commented = file_results.iter().map(|r| r.commented_count).sum();
        let total_files_modified = file_results.iter().filter(|r| r.modified).count();
        BatchResult {
            file_results,
            total_removed,
            total_commented,
            total_files_modified,
            elapsed_ms,
        }
    }
}

/// Clean a set of in-memory files sequentially, in the order given.
/// Items are (path, content, language_id).
pub fn clean_batch(
    files: &[(String, String, String)],
    config: &CleanerConfig,
    catalog: &Catalog,
) -> Result<BatchResult> {
    let started = Instant::now();

    let mut results = Vec::with_capacity(files.len());
    for (path, content, language_id) in files {
        results.push(clean_content(path, content, language_id, config, catalog)?);
    }

    Ok(BatchResult::aggregate(
        results,
        started.elapsed().as_millis() as u64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::load().unwrap()
    }

    fn delete_config() -> CleanerConfig {
        CleanerConfig {
            mode: Mode::Delete,
            ..CleanerConfig::default()
        }
    }

    #[test]
    fn test_clean_removes_console_statement() {
        let content = "function total(items) {\n    console.log('Calculating total for', items.length, 'items');\n    return items.reduce((a, b) => a + b, 0);\n}\n";
        let result = clean_content("total.js", content, "javascript", &delete_config(), &catalog())
            .unwrap();
        assert!(result.error.is_none());
        assert!(result.modified);
        assert_eq!(result.removed_count, 1);
        assert_eq!(
            result.new_content,
            "function total(items) {\n    return items.reduce((a, b) => a + b, 0);\n}\n"
        );
    }

    #[test]
    fn test_clean_is_idempotent() {
        let content = "print('a')\nx = 1\nprint('b')\n";
        let config = delete_config();
        let first = clean_content("a.py", content, "python", &config, &catalog()).unwrap();
        assert_eq!(first.removed_count, 2);

        let second =
            clean_content("a.py", &first.new_content, "python", &config, &catalog()).unwrap();
        assert!(!second.modified);
        assert_eq!(second.removed_count, 0);
        assert_eq!(second.new_content, first.new_content);
    }

    #[test]
    fn test_whitelisted_match_is_dropped_from_results() {
        let content = "console.log('important'); // @keep\nconsole.log('noise');\n";
        let result =
            clean_content("a.js", content, "javascript", &delete_config(), &catalog()).unwrap();
        assert_eq!(result.removed_count, 1);
        assert!(result.new_content.contains("important"));
        assert!(!result.new_content.contains("noise"));
        assert!(result.matches.iter().all(|m| !m.keep));
    }

    #[test]
    fn test_oversized_file_yields_size_error() {
        let mut config = delete_config();
        config.max_file_size_kb = 1;
        let content = "x".repeat(3 * 1024);
        let result = clean_content("big.js", &content, "javascript", &config, &catalog()).unwrap();
        assert!(!result.modified);
        assert!(matches!(
            result.error,
            Some(CleanErrorKind::SizeExceeded { size_kb: 3, limit_kb: 1 })
        ));
    }

    #[test]
    fn test_unknown_language_yields_unsupported_error() {
        let result = clean_content(
            "a.cob",
            "DISPLAY 'X'.",
            "cobol",
            &delete_config(),
            &catalog(),
        )
        .unwrap();
        assert_eq!(
            result.error,
            Some(CleanErrorKind::UnsupportedLanguage("cobol".to_string()))
        );
    }

    #[test]
    fn test_disabled_language_leaves_content_untouched() {
        let mut config = delete_config();
        config.languages = vec!["python".to_string()];
        let result =
            clean_content("a.js", "console.log('x');", "javascript", &config, &catalog()).unwrap();
        assert!(result.error.is_none());
        assert!(!result.modified);
        assert_eq!(result.removed_count, 0);
    }

    #[test]
    fn test_comment_mode_counts_commented() {
        let mut config = delete_config();
        config.mode = Mode::Comment;
        let result =
            clean_content("a.go", "fmt.Println(\"x\")\n", "go", &config, &catalog()).unwrap();
        assert_eq!(result.commented_count, 1);
        assert_eq!(result.removed_count, 0);
        assert!(result.new_content.starts_with("// fmt.Println"));
    }

    #[test]
    fn test_preview_mode_computes_without_claiming_persistence() {
        let mut config = delete_config();
        config.mode = Mode::Preview;
        let result =
            clean_content("a.js", "console.log('x');\n", "javascript", &config, &catalog())
                .unwrap();
        assert!(result.modified);
        assert_eq!(result.removed_count, 1);
        assert_eq!(result.new_content, "");
    }

    #[test]
    fn test_batch_aggregation() {
        let files = vec![
            (
                "a.js".to_string(),
                "console.log('a');\nlet x = 1;\n".to_string(),
                "javascript".to_string(),
            ),
            ("b.js".to_string(), "let y = 2;\n".to_string(), "javascript".to_string()),
            (
                "c.py".to_string(),
                "print('c')\nprint('d')\n".to_string(),
                "python".to_string(),
            ),
        ];
        let batch = clean_batch(&files, &delete_config(), &catalog()).unwrap();
        assert_eq!(batch.file_results.len(), 3);
        assert_eq!(batch.total_removed, 3);
        assert_eq!(batch.total_files_modified, 2);
        assert!(!batch.file_results[1].modified);
    }
}
