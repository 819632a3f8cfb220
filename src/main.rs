use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use ignore::WalkBuilder;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, warn};

use logsweep::catalog::Catalog;
use logsweep::cleaner::{self, BatchResult, CleanErrorKind, FileCleanResult};
use logsweep::config::{CleanerConfig, Mode};
use logsweep::diff::{format_change_summary, generate_unified_diff};
use logsweep::undo::{ContentSink, UndoEntry, UndoStore};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find and optionally remove log statements from source files in many languages",
    long_about = None
)]
struct Args {
    /// Directories or files to scan (defaults to current directory)
    #[arg(default_values_t = vec![String::from(".")])]
    paths: Vec<String>,

    /// Delete the found log statements
    #[arg(long, short, conflicts_with = "comment")]
    delete: bool,

    /// Comment out the found log statements instead of deleting them
    #[arg(long, short)]
    comment: bool,

    /// Show what would change, but don't modify any file
    #[arg(long)]
    dry_run: bool,

    /// Restore the files changed by the previous run, then exit
    #[arg(long)]
    undo: bool,

    /// Additional directory names to exclude from the scan
    #[arg(long, short = 'x')]
    exclude: Vec<String>,

    /// Show detailed information about found log statements
    #[arg(long, short)]
    verbose: bool,

    /// Show individual matches instead of a summary per file
    #[arg(long, short)]
    files: bool,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Where the undo snapshot of the previous run is persisted.
const UNDO_FILE: &str = ".logsweep-undo.json";

/// Default configuration file looked up in the working directory.
const CONFIG_FILE: &str = ".logsweep.toml";

/// Restore sink backed by the real filesystem.
struct FsSink;

impl ContentSink for FsSink {
    fn write(&mut self, path: &str, content: &str) -> Result<()> {
        fs::write(path, content).with_context(|| format!("Failed to write {path}"))
    }
}

fn load_config(args: &Args) -> Result<CleanerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            CleanerConfig::from_toml_str(&text)?
        }
        None => {
            if Path::new(CONFIG_FILE).exists() {
                let text = fs::read_to_string(CONFIG_FILE)
                    .with_context(|| format!("Failed to read {CONFIG_FILE}"))?;
                CleanerConfig::from_toml_str(&text)?
            } else {
                CleanerConfig::default()
            }
        }
    };

    // Command-line flags override the configured mode
    if args.delete {
        config.mode = Mode::Delete;
    } else if args.comment {
        config.mode = Mode::Comment;
    }
    config.exclude.extend(args.exclude.iter().cloned());

    let errors = config.validate();
    if !errors.is_empty() {
        anyhow::bail!("Invalid configuration: {}", errors.join("; "));
    }

    Ok(config)
}

/// Check whether any path component is an excluded directory name.
fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    path.components().any(|c| {
        if let std::path::Component::Normal(os_str) = c {
            exclude.iter().any(|e| os_str.to_string_lossy() == *e)
        } else {
            false
        }
    })
}

/// Walk the start paths and collect (path, language id) pairs for every
/// supported file that survives exclusion filtering.
fn collect_files(paths: &[String], config: &CleanerConfig, catalog: &Catalog) -> Vec<(PathBuf, String)> {
    let mut files = Vec::new();

    for start_path_str in paths {
        let start_path = PathBuf::from(start_path_str);

        let walker = WalkBuilder::new(&start_path)
            .hidden(false) // Include hidden files/dirs by default
            .git_ignore(true)
            .build();

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    eprintln!("Warning: Failed to access entry: {}", err);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if is_excluded(path, &config.exclude) {
                debug!(path = %path.display(), "excluded by directory filter");
                continue;
            }

            let extension = match path.extension().and_then(|e| e.to_str()) {
                Some(ext) => ext,
                None => continue,
            };
            let language_id = match catalog.language_id_for_extension(extension) {
                Some(id) => id.to_string(),
                None => continue,
            };
            if !config.is_language_enabled(&language_id) {
                continue;
            }

            files.push((path.to_path_buf(), language_id));
        }
    }

    files
}

/// Clean one file on disk: size precheck, read, pipeline, optional write.
fn clean_file(
    path: &Path,
    language_id: &str,
    config: &CleanerConfig,
    catalog: &Catalog,
    persist: bool,
) -> FileCleanResult {
    let display = path.display().to_string();

    // Oversized files are skipped without reading them at all
    match fs::metadata(path) {
        Ok(metadata) => {
            let size_kb = metadata.len() / 1024;
            if size_kb > config.max_file_size_kb {
                return FileCleanResult::failed(
                    &display,
                    CleanErrorKind::SizeExceeded {
                        size_kb,
                        limit_kb: config.max_file_size_kb,
                    },
                );
            }
        }
        Err(err) => {
            return FileCleanResult::failed(&display, CleanErrorKind::Io(err.to_string()));
        }
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            return FileCleanResult::failed(&display, CleanErrorKind::Io(err.to_string()));
        }
    };

    let mut result = match cleaner::clean_content(&display, &content, language_id, config, catalog)
    {
        Ok(result) => result,
        Err(err) => return FileCleanResult::failed(&display, CleanErrorKind::Io(err.to_string())),
    };

    if persist && result.modified && result.error.is_none() {
        // A failed write keeps the computed result; the error field tells the
        // caller what would have changed without claiming it was persisted
        if let Err(err) = fs::write(path, &result.new_content) {
            eprintln!("Error writing {}: {}. Skipping.", path.display(), err);
            result.error = Some(CleanErrorKind::Io(err.to_string()));
        }
    }

    result
}

fn report_file(result: &FileCleanResult, args: &Args, config: &CleanerConfig, persisted: bool) {
    if let Some(error) = &result.error {
        eprintln!("Warning: {}: {}", result.path, error);
        return;
    }
    if !result.modified {
        return;
    }

    let action = match config.mode {
        Mode::Delete if persisted => "cleaned",
        Mode::Comment if persisted => "commented",
        _ => "would clean",
    };
    println!(
        "{}",
        format!(
            "{}: {} ({} removed, {} commented)",
            result.path, action, result.removed_count, result.commented_count
        )
        .bold()
    );

    if args.files || args.verbose {
        for m in &result.matches {
            println!(
                "  - line {}: {} [{}]",
                m.start_line + 1,
                m.text.lines().next().unwrap_or(""),
                m.description
            );
        }
    }

    if !persisted {
        let diff = generate_unified_diff(&result.original_content, &result.new_content, &result.path);
        for line in diff.lines() {
            if line.starts_with('-') && !line.starts_with("---") {
                println!("{}", line.red());
            } else if line.starts_with('+') && !line.starts_with("+++") {
                println!("{}", line.green());
            } else {
                println!("{}", line);
            }
        }
        println!();
    }
}

fn save_undo_snapshot(batch: &BatchResult) -> Result<()> {
    let entries: Vec<UndoEntry> = batch
        .file_results
        .iter()
        .filter(|r| r.modified && r.error.is_none())
        .map(|r| UndoEntry {
            path: r.path.clone(),
            original_content: r.original_content.clone(),
        })
        .collect();
    if entries.is_empty() {
        return Ok(());
    }

    let mut store = UndoStore::default();
    store.save_snapshot(
        entries,
        format_change_summary(batch.total_removed, batch.total_commented, batch.total_files_modified),
    );
    let json = serde_json::to_string_pretty(&store).context("Failed to serialize undo snapshot")?;
    fs::write(UNDO_FILE, json).with_context(|| format!("Failed to write {UNDO_FILE}"))?;
    Ok(())
}

fn run_undo() -> Result<()> {
    let json = fs::read_to_string(UNDO_FILE)
        .map_err(|_| anyhow::anyhow!("No previous run to undo"))?;
    let mut store: UndoStore =
        serde_json::from_str(&json).with_context(|| format!("Failed to parse {UNDO_FILE}"))?;

    let mut sink = FsSink;
    let report = store.restore(&mut sink).context("No previous run to undo")?;

    for (path, reason) in &report.failures {
        eprintln!(
            "Warning: {}",
            CleanErrorKind::Restore {
                path: path.clone(),
                reason: reason.clone(),
            }
        );
    }
    println!(
        "{}",
        format!(
            "Restored {} file{}",
            report.restored,
            if report.restored == 1 { "" } else { "s" }
        )
        .green()
    );

    // The snapshot is spent whether or not every write succeeded
    if let Err(err) = fs::remove_file(UNDO_FILE) {
        warn!(error = %err, "could not remove undo file");
    }
    Ok(())
}

fn run_clean(args: &Args) -> Result<()> {
    let started = Instant::now();
    let config = load_config(args)?;
    let catalog = Catalog::load()?;

    let persist = matches!(config.mode, Mode::Delete | Mode::Comment) && !args.dry_run;

    let files = collect_files(&args.paths, &config, &catalog);
    debug!(count = files.len(), "files selected for cleaning");

    let mut results = Vec::with_capacity(files.len());
    for (path, language_id) in &files {
        let result = clean_file(path, language_id, &config, &catalog, persist);
        report_file(&result, args, &config, persist);
        results.push(result);
    }

    let batch = BatchResult::aggregate(results, started.elapsed().as_millis() as u64);

    if persist {
        save_undo_snapshot(&batch)?;
    }

    println!("========================================");
    let summary = format_change_summary(
        batch.total_removed,
        batch.total_commented,
        batch.total_files_modified,
    );
    if persist {
        println!("{} in {} ms", summary.bold(), batch.elapsed_ms);
    } else {
        println!("{} in {} ms (no files were modified)", summary.bold(), batch.elapsed_ms);
    }

    let skipped = batch
        .file_results
        .iter()
        .filter(|r| r.error.is_some())
        .count();
    if skipped > 0 {
        println!("{} file{} skipped", skipped, if skipped == 1 { "" } else { "s" });
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.undo {
        return run_undo();
    }

    run_clean(&args)
}
