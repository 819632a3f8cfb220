//! Cleaner configuration: enabled languages, mode, whitelist tags, log kinds.

use anyhow::{Context, Result};
use serde::Deserialize;

/// What to do with detected log statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Remove matched statements from the document.
    Delete,
    /// Prefix every matched line with the language's comment token.
    Comment,
    /// Compute the delete-mode result but never persist it.
    Preview,
}

/// Per-method toggles for the console.* family (JavaScript/TypeScript).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleKinds {
    pub log: bool,
    pub debug: bool,
    pub info: bool,
    pub warn: bool,
    pub error: bool,
    pub trace: bool,
    pub table: bool,
    pub dir: bool,
    pub assert: bool,
    pub count: bool,
    pub group: bool,
    pub time: bool,
}

impl Default for ConsoleKinds {
    fn default() -> Self {
        ConsoleKinds {
            log: true,
            debug: true,
            info: true,
            warn: true,
            error: true,
            trace: true,
            table: true,
            dir: true,
            assert: true,
            count: true,
            group: true,
            time: true,
        }
    }
}

impl ConsoleKinds {
    /// Expand the toggles into the concrete console method names to match.
    /// Grouped methods (dir/dirxml, time/timeEnd/timeLog, ...) share a toggle.
    pub fn enabled_methods(&self) -> Vec<&'static str> {
        let mut methods = Vec::new();
        if self.log {
            methods.push("log");
        }
        if self.debug {
            methods.push("debug");
        }
        if self.info {
            methods.push("info");
        }
        if self.warn {
            methods.push("warn");
        }
        if self.error {
            methods.push("error");
        }
        if self.trace {
            methods.push("trace");
        }
        if self.table {
            methods.push("table");
        }
        if self.dir {
            methods.extend(["dir", "dirxml"]);
        }
        if self.assert {
            methods.push("assert");
        }
        if self.count {
            methods.extend(["count", "countReset"]);
        }
        if self.group {
            methods.extend(["group", "groupCollapsed", "groupEnd"]);
        }
        if self.time {
            methods.extend(["time", "timeEnd", "timeLog"]);
        }
        methods
    }
}

/// Which categories of statements to detect.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogKinds {
    pub console: ConsoleKinds,
    /// `debugger;` statements in JavaScript/TypeScript.
    pub debugger_statements: bool,
    /// Catch-all for languages without granular kinds (print, echo, cout, ...).
    pub all_other_logs: bool,
}

impl Default for LogKinds {
    fn default() -> Self {
        LogKinds {
            console: ConsoleKinds::default(),
            debugger_statements: true,
            all_other_logs: true,
        }
    }
}

/// Top-level cleaner configuration. All fields have defaults, so a config
/// file only needs to name the values it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Language identifiers to process.
    pub languages: Vec<String>,
    pub mode: Mode,
    /// Also remove logs that are already commented out.
    pub remove_commented_logs: bool,
    /// Files larger than this are skipped with a SizeExceeded error result.
    pub max_file_size_kb: u64,
    /// Tag substrings that protect a matched statement from removal.
    pub whitelist_tags: Vec<String>,
    /// Directory names skipped during workspace walks.
    pub exclude: Vec<String>,
    /// Enable HTML/CSS/Markdown handling (markup and style families).
    pub markup_handling: bool,
    pub log_kinds: LogKinds,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        CleanerConfig {
            languages: [
                "javascript",
                "javascriptreact",
                "typescript",
                "typescriptreact",
                "python",
                "java",
                "php",
                "csharp",
                "go",
                "rust",
                "swift",
                "c",
                "cpp",
                "ruby",
                "dart",
                "shellscript",
                "sql",
                "html",
                "css",
                "scss",
                "less",
                "markdown",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            mode: Mode::Preview,
            remove_commented_logs: true,
            max_file_size_kb: 500,
            whitelist_tags: vec!["@keep".to_string(), "@preserve".to_string()],
            exclude: [
                "node_modules",
                "dist",
                "out",
                "build",
                ".git",
                "vendor",
                "target",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            markup_handling: true,
            log_kinds: LogKinds::default(),
        }
    }
}

impl CleanerConfig {
    /// Parse a configuration from TOML text. Reading the file is the
    /// caller's job; the core never touches the filesystem.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: CleanerConfig =
            toml::from_str(text).context("Failed to parse logsweep config")?;
        Ok(config)
    }

    /// Validate the configuration, returning a list of problems (empty when valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_file_size_kb == 0 {
            errors.push("max_file_size_kb must be positive".to_string());
        }
        if self.languages.is_empty() {
            errors.push("at least one language must be enabled".to_string());
        }

        errors
    }

    pub fn is_language_enabled(&self, language_id: &str) -> bool {
        self.languages.iter().any(|l| l == language_id)
    }
}
