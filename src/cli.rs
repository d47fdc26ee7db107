//! Command-line interface for pygauge.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::analysis::DEFAULT_RECURSION_LIMIT;
use crate::batch::{self, BatchOptions};
use crate::report::{self, SortKey};
use crate::summary;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Structural complexity metrics for Python source.
///
/// pygauge walks each file's syntax tree and reports per-function nesting
/// depth and branch/call/return/raise/assertion counts next to an
/// independently measured cyclomatic complexity number.
#[derive(Parser)]
#[command(name = "pygauge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a file or directory tree
    #[command(visible_alias = "run")]
    Analyze(AnalyzeArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Output format: pretty, json, or csv
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Column to sort each file's functions by
    #[arg(short, long, default_value = "start_line")]
    pub sort: String,

    /// Sort descending instead of ascending
    #[arg(long)]
    pub descending: bool,

    /// Analyze __init__.py files instead of skipping them
    #[arg(long)]
    pub include_init: bool,

    /// Recursion limit for pathologically nested source
    #[arg(long, default_value_t = DEFAULT_RECURSION_LIMIT)]
    pub recursion_limit: usize,
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" && args.format != "csv" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty', 'json', or 'csv'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    // Validate sort key
    let sort_key: SortKey = match args.sort.parse() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Check path exists
    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let options = BatchOptions {
        include_init: args.include_init,
        recursion_limit: args.recursion_limit,
    };

    // Collect files to analyze
    let files = if metadata.is_dir() {
        batch::collect_python_files(&args.path, options.include_init)?
    } else {
        vec![args.path.clone()]
    };

    if files.is_empty() {
        eprintln!("Warning: no Python files found");
        return Ok(EXIT_SUCCESS);
    }

    let progress = start_progress(files.len());
    let mut result = batch::analyze_paths(&files, &options);
    progress.finish_and_clear();

    report::sort_functions(&mut result.files, sort_key, args.descending);
    let run_summary = summary::summarize(&result.files);

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, &result, &run_summary)?,
        "csv" => report::write_csv(&result),
        _ => report::write_pretty(&result, &run_summary),
    }

    if result.failures.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Spinner on stderr while the batch runs; cleared before any output.
fn start_progress(file_count: usize) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.set_message(format!("analyzing {} files", file_count));
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
