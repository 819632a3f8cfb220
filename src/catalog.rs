//! Language rule tables and pattern construction from languages.toml.
//!
//! Each language is a data entry in the embedded TOML file; the catalog turns
//! an entry plus the current configuration into an ordered list of
//! [`PatternDescriptor`]s. New languages are new table entries, not new code,
//! except for the markup family which gets a dedicated extraction step.
//!
//! Known limitation: the matchers are permissive call-shaped regexes (name
//! plus a best-effort argument span up to the first unescaped terminator).
//! They cannot balance nested parentheses or string literals, so arguments
//! containing nested call expressions may be under- or over-matched.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::CleanerConfig;

// Embed the rule tables directly in the binary at compile time
const LANGUAGES_TOML: &str = include_str!("../languages.toml");

/// Whether a pattern is expected to stay on one line or may span several.
/// Descriptor metadata only; the rewrite engine decides from the actual span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanMode {
    SingleLine,
    MultiLine,
}

/// One detection rule for a category of log-like statement in one language.
#[derive(Debug, Clone)]
pub struct PatternDescriptor {
    pub regex: Regex,
    pub description: String,
    pub span_mode: SpanMode,
    /// Documentation-only ordering hint (higher = more specific rule).
    pub priority: u8,
    pub respects_whitelist: bool,
}

/// How a language's patterns are assembled from the table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Family {
    /// console.* methods assembled from per-method config toggles
    Console,
    /// Live patterns from the table, gated by the all_other_logs toggle
    Generic,
    /// Embedded-script extraction plus markup comment removal
    Markup,
    /// Comment removal only
    Style,
}

#[derive(Debug, Clone, Deserialize)]
struct LiveRule {
    regex: String,
    description: String,
    mode: SpanMode,
}

/// Rule data for one language, deserialized from languages.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageRules {
    pub name: String,
    pub ids: Vec<String>,
    pub extensions: Vec<String>,
    pub line_comment: String,
    pub block_comment: Option<[String; 2]>,
    family: Family,
    /// Keywords marking a commented-out log statement.
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    live: Vec<LiveRule>,
}

#[derive(Debug, Deserialize)]
struct LanguageTable {
    #[serde(flatten)]
    languages: HashMap<String, LanguageRules>,
}

/// The full pattern catalog: every language entry plus id and extension indexes.
pub struct Catalog {
    languages: Vec<LanguageRules>,
    by_id: HashMap<String, usize>,
    by_extension: HashMap<String, usize>,
}

impl Catalog {
    /// Parse the embedded rule tables and build the lookup indexes.
    pub fn load() -> Result<Catalog> {
        let table: LanguageTable =
            toml::from_str(LANGUAGES_TOML).context("Failed to parse languages TOML table")?;

        let mut languages: Vec<LanguageRules> = table.languages.into_values().collect();
        // HashMap iteration order is arbitrary; keep the catalog deterministic
        languages.sort_by(|a, b| a.ids[0].cmp(&b.ids[0]));

        let mut by_id = HashMap::new();
        let mut by_extension = HashMap::new();
        for (index, rules) in languages.iter().enumerate() {
            for id in &rules.ids {
                by_id.insert(id.clone(), index);
            }
            for ext in &rules.extensions {
                by_extension.insert(ext.to_ascii_lowercase(), index);
            }
            // Surface broken table regexes at load time, not mid-scan
            for rule in &rules.live {
                Regex::new(&rule.regex)
                    .with_context(|| format!("Invalid pattern for {}: {}", rules.name, rule.regex))?;
            }
        }

        Ok(Catalog {
            languages,
            by_id,
            by_extension,
        })
    }

    /// Look up the rule entry claiming a language identifier.
    pub fn rules_for_id(&self, language_id: &str) -> Option<&LanguageRules> {
        self.by_id.get(language_id).map(|&i| &self.languages[i])
    }

    /// Map a file extension (without the dot) to a canonical language id.
    pub fn language_id_for_extension(&self, extension: &str) -> Option<&str> {
        self.by_extension
            .get(&extension.to_ascii_lowercase())
            .map(|&i| self.languages[i].ids[0].as_str())
    }

    pub fn supported_language_ids(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().flat_map(|r| r.ids.iter()).map(|s| s.as_str())
    }
}

impl LanguageRules {
    /// The token prepended to a line in comment mode.
    pub fn comment_prefix(&self) -> String {
        format!("{} ", self.line_comment)
    }

    /// Build the ordered descriptor list for this language under `config`.
    /// Returns an empty list (not an error) when the language is disabled or
    /// no relevant log kinds are enabled.
    pub fn build_patterns(
        &self,
        language_id: &str,
        config: &CleanerConfig,
    ) -> Result<Vec<PatternDescriptor>> {
        let mut patterns = Vec::new();

        if !config.is_language_enabled(language_id) {
            return Ok(patterns);
        }

        match self.family {
            Family::Console => {
                let methods = config.log_kinds.console.enabled_methods();
                if !methods.is_empty() {
                    patterns.push(descriptor(
                        build_console_pattern(&methods)?,
                        format!("{} console.* statements", self.name),
                        SpanMode::SingleLine,
                        10,
                    ));
                }
                if config.log_kinds.debugger_statements {
                    patterns.push(descriptor(
                        Regex::new(r"\bdebugger\b[ \t]*;?").context("debugger pattern")?,
                        "Debugger statements".to_string(),
                        SpanMode::SingleLine,
                        5,
                    ));
                }
                if config.remove_commented_logs && !methods.is_empty() {
                    self.push_commented_patterns(&mut patterns)?;
                }
            }
            Family::Generic => {
                if !config.log_kinds.all_other_logs {
                    return Ok(patterns);
                }
                self.push_live_patterns(&mut patterns)?;
                if config.remove_commented_logs {
                    self.push_commented_patterns(&mut patterns)?;
                }
            }
            Family::Markup => {
                if !config.markup_handling {
                    return Ok(patterns);
                }
                self.push_live_patterns(&mut patterns)?;
                if config.remove_commented_logs {
                    self.push_comment_block_pattern(&mut patterns)?;
                }
            }
            Family::Style => {
                if !config.markup_handling || !config.remove_commented_logs {
                    return Ok(patterns);
                }
                if !self.keywords.is_empty() {
                    patterns.push(descriptor(
                        self.build_commented_line_pattern()?,
                        format!("{} single-line comments", self.name),
                        SpanMode::SingleLine,
                        5,
                    ));
                }
                self.push_comment_block_pattern(&mut patterns)?;
            }
        }

        Ok(patterns)
    }

    fn push_live_patterns(&self, patterns: &mut Vec<PatternDescriptor>) -> Result<()> {
        for rule in &self.live {
            patterns.push(descriptor(
                Regex::new(&rule.regex)
                    .with_context(|| format!("Invalid pattern for {}", self.name))?,
                rule.description.clone(),
                rule.mode,
                10,
            ));
        }
        Ok(())
    }

    /// Single-line and block-commented variants of this language's logs.
    fn push_commented_patterns(&self, patterns: &mut Vec<PatternDescriptor>) -> Result<()> {
        if self.keywords.is_empty() {
            return Ok(());
        }

        patterns.push(descriptor(
            self.build_commented_line_pattern()?,
            format!("Commented {} statements", self.name),
            SpanMode::SingleLine,
            8,
        ));

        if let Some([open, close]) = &self.block_comment {
            let keyword_alt = keyword_alternation(&self.keywords);
            let source = format!(
                r"{}[\s\S]*?(?:{})[\s\S]*?{}",
                regex::escape(open),
                keyword_alt,
                regex::escape(close)
            );
            patterns.push(descriptor(
                Regex::new(&source)
                    .with_context(|| format!("Invalid block pattern for {}", self.name))?,
                format!("Block commented {} statements", self.name),
                SpanMode::MultiLine,
                7,
            ));
        }

        Ok(())
    }

    fn build_commented_line_pattern(&self) -> Result<Regex> {
        let source = format!(
            r"(?m){}\s*(?:{}).*$",
            regex::escape(&self.line_comment),
            keyword_alternation(&self.keywords)
        );
        Regex::new(&source).with_context(|| format!("Invalid comment pattern for {}", self.name))
    }

    /// A pattern matching every block comment, keyword or not. Used for the
    /// markup and style families, where comments are the removal target.
    fn push_comment_block_pattern(&self, patterns: &mut Vec<PatternDescriptor>) -> Result<()> {
        if let Some([open, close]) = &self.block_comment {
            let source = format!(
                r"{}[\s\S]*?{}",
                regex::escape(open),
                regex::escape(close)
            );
            patterns.push(descriptor(
                Regex::new(&source)
                    .with_context(|| format!("Invalid comment pattern for {}", self.name))?,
                format!("{} comments", self.name),
                SpanMode::MultiLine,
                5,
            ));
        }
        Ok(())
    }
}

fn descriptor(
    regex: Regex,
    description: String,
    span_mode: SpanMode,
    priority: u8,
) -> PatternDescriptor {
    PatternDescriptor {
        regex,
        description,
        span_mode,
        priority,
        respects_whitelist: true,
    }
}

fn keyword_alternation(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|")
}

/// Build the console.* pattern for the currently enabled methods.
fn build_console_pattern(methods: &[&str]) -> Result<Regex> {
    let source = format!(r"\bconsole\.(?:{})\s*\([^)]*\)[ \t]*;?", methods.join("|"));
    Regex::new(&source).context("console pattern")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleanerConfig;

    fn catalog() -> Catalog {
        Catalog::load().expect("embedded table should parse")
    }

    #[test]
    fn test_catalog_loads_all_languages() {
        let catalog = catalog();
        for id in [
            "javascript",
            "typescript",
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
        ] {
            assert!(catalog.rules_for_id(id).is_some(), "missing entry for {id}");
        }
        assert!(catalog.rules_for_id("cobol").is_none());
    }

    #[test]
    fn test_extension_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.language_id_for_extension("ts"), Some("typescript"));
        assert_eq!(catalog.language_id_for_extension("PY"), Some("python"));
        assert_eq!(catalog.language_id_for_extension("md"), Some("markdown"));
        assert_eq!(catalog.language_id_for_extension("xyz"), None);
    }

    #[test]
    fn test_console_pattern_matches_enabled_methods() {
        let catalog = catalog();
        let config = CleanerConfig::default();
        let rules = catalog.rules_for_id("javascript").unwrap();
        let patterns = rules.build_patterns("javascript", &config).unwrap();

        let console = patterns
            .iter()
            .find(|p| p.description.contains("console"))
            .unwrap();
        for method in ["log", "debug", "info", "warn", "error", "trace"] {
            let code = format!("console.{method}('test');");
            assert!(console.regex.is_match(&code), "should match console.{method}");
        }
        assert!(patterns.iter().any(|p| p.description.contains("Debugger")));
        assert!(patterns
            .iter()
            .any(|p| p.description.starts_with("Commented")));
    }

    #[test]
    fn test_disabled_language_yields_no_patterns() {
        let catalog = catalog();
        let mut config = CleanerConfig::default();
        config.languages = vec!["python".to_string()];
        let rules = catalog.rules_for_id("javascript").unwrap();
        assert!(rules
            .build_patterns("javascript", &config)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_console_toggles_narrow_the_pattern() {
        let catalog = catalog();
        let mut config = CleanerConfig::default();
        config.log_kinds.console.log = false;
        let rules = catalog.rules_for_id("typescript").unwrap();
        let patterns = rules.build_patterns("typescript", &config).unwrap();
        let console = patterns
            .iter()
            .find(|p| p.description.contains("console"))
            .unwrap();
        assert!(!console.regex.is_match("console.log('x');"));
        assert!(console.regex.is_match("console.warn('x');"));
    }

    #[test]
    fn test_all_other_logs_gates_generic_languages() {
        let catalog = catalog();
        let mut config = CleanerConfig::default();
        config.log_kinds.all_other_logs = false;
        let rules = catalog.rules_for_id("python").unwrap();
        assert!(rules.build_patterns("python", &config).unwrap().is_empty());
    }

    #[test]
    fn test_markup_handling_gates_html() {
        let catalog = catalog();
        let mut config = CleanerConfig::default();
        config.markup_handling = false;
        let rules = catalog.rules_for_id("html").unwrap();
        assert!(rules.build_patterns("html", &config).unwrap().is_empty());

        config.markup_handling = true;
        let patterns = rules.build_patterns("html", &config).unwrap();
        assert!(patterns.iter().any(|p| p.description.contains("inline console")));
        assert!(patterns.iter().any(|p| p.span_mode == SpanMode::MultiLine));
    }

    #[test]
    fn test_rust_macro_pattern() {
        let catalog = catalog();
        let config = CleanerConfig::default();
        let rules = catalog.rules_for_id("rust").unwrap();
        let patterns = rules.build_patterns("rust", &config).unwrap();
        let live = &patterns[0];
        assert!(live.regex.is_match(r#"println!("hello")"#));
        assert!(live.regex.is_match("dbg!(value)"));
        assert!(live.regex.is_match(r#"eprintln!("err")"#));
    }

    #[test]
    fn test_commented_log_pattern() {
        let catalog = catalog();
        let config = CleanerConfig::default();
        let rules = catalog.rules_for_id("python").unwrap();
        let patterns = rules.build_patterns("python", &config).unwrap();
        let commented = patterns
            .iter()
            .find(|p| p.description.starts_with("Commented"))
            .unwrap();
        assert!(commented.regex.is_match("# print('debug')"));
        assert!(!commented.regex.is_match("# a plain comment"));
    }
}
