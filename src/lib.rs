//! logsweep - Multi-Language Log Statement Cleaner
//!
//! logsweep detects and removes (or comments out) debug log statements across
//! many languages: console.* calls in JavaScript/TypeScript, print in Python,
//! fmt.Println in Go, println! in Rust, and so on. Detection is driven by
//! per-language pattern tables (from languages.toml); statements carrying a
//! whitelist tag such as `@keep` are never touched.
//!
//! ## Architecture
//!
//! The pipeline for one file is catalog → scanner → whitelist → rewrite:
//! - `catalog` turns a language's table entry plus the configuration into
//!   pattern descriptors
//! - `scanner` runs the descriptors and records matches with line/column spans
//! - `whitelist` marks protected matches
//! - `rewrite` merges overlapping spans and mutates the document bottom-up
//!
//! `cleaner` drives the pipeline per file and aggregates batches; `diff`
//! renders previews; `undo` holds a single-slot snapshot of the previous run.
//! The library never touches the filesystem; all I/O lives in the binary.

pub mod catalog;
pub mod cleaner;
pub mod config;
pub mod diff;
pub mod rewrite;
pub mod scanner;
pub mod undo;
pub mod whitelist;

// Re-export commonly used items
pub use catalog::{Catalog, LanguageRules, PatternDescriptor};
pub use cleaner::{BatchResult, CleanErrorKind, FileCleanResult};
pub use config::{CleanerConfig, Mode};
pub use scanner::LogMatch;
