//! Multi-file analysis with per-file failure isolation.
//!
//! Each file's analysis is independent, so the batch layer fans out over
//! a rayon pool; every record stays confined to the worker that produced
//! it. A file that fails - unreadable, unparseable, nested beyond the
//! recursion guard - becomes a [`FileFailure`] reported next to the
//! successes instead of aborting the run.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::analysis::DEFAULT_RECURSION_LIMIT;
use crate::assemble::{self, FileAnalysis};
use crate::error::AnalysisError;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Analyze `__init__.py` files instead of skipping them.
    pub include_init: bool,
    /// Recursion guard handed to the reducer.
    pub recursion_limit: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            include_init: false,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

/// A file that failed analysis.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: AnalysisError,
}

/// Outcome of a batch run: every input file shows up exactly once, either
/// as a record or as a failure.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub files: Vec<FileAnalysis>,
    pub failures: Vec<FileFailure>,
}

/// Collect the Python files beneath `root`, skipping hidden directories.
///
/// Excluding package initializers is the caller's policy, applied here at
/// collection time rather than inside the per-file assembler.
pub fn collect_python_files(root: &Path, include_init: bool) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            // The root is always walked, even when the directory the
            // caller named happens to be hidden.
            if e.depth() == 0 {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !(e.file_type().is_dir() && name.starts_with('.'))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("py") {
            continue;
        }
        if !include_init && is_package_init(path) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Package-initializer convention (`__init__.py`).
pub fn is_package_init(path: &Path) -> bool {
    path.file_stem().and_then(|s| s.to_str()) == Some("__init__")
}

/// Analyze a set of files in parallel.
pub fn analyze_paths(paths: &[PathBuf], options: &BatchOptions) -> BatchResult {
    let results: Vec<(PathBuf, Result<FileAnalysis, AnalysisError>)> = paths
        .par_iter()
        .map(|path| (path.clone(), assemble::assemble(path, options.recursion_limit)))
        .collect();

    let mut batch = BatchResult::default();
    for (path, result) in results {
        match result {
            Ok(file) => batch.files.push(file),
            Err(error) => {
                log::warn!("{}: {}", path.display(), error);
                batch.failures.push(FileFailure { path, error });
            }
        }
    }

    // Sort for deterministic output regardless of worker scheduling.
    batch.files.sort_by(|a, b| a.path.cmp(&b.path));
    batch.failures.sort_by(|a, b| a.path.cmp(&b.path));
    batch
}

/// Walk `root` and analyze everything found.
pub fn analyze_tree(root: &Path, options: &BatchOptions) -> anyhow::Result<BatchResult> {
    let paths = collect_python_files(root, options.include_init)?;
    Ok(analyze_paths(&paths, options))
}
