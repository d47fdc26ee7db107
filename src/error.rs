//! Error taxonomy for per-file analysis failures.

use thiserror::Error;

/// Errors that can fail the analysis of a single file.
///
/// Every variant is a per-file failure: the batch layer records it next to
/// the results of the files that succeeded instead of aborting the run.
/// An unrecognized syntax construct is deliberately *not* represented
/// here - the reducer logs it and moves on.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The file could not be opened or read.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The Python grammar could not be loaded into the parser.
    #[error("python grammar failed to load: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    /// A tree-sitter query failed to compile.
    #[error("query compilation failed: {0}")]
    Query(#[from] tree_sitter::QueryError),

    /// The source text is not valid Python.
    #[error("syntax error near line {line}")]
    Parse { line: usize },

    /// The recursion guard tripped on pathologically nested source.
    #[error("nesting exceeds the recursion limit of {limit}")]
    DepthExceeded { limit: usize },
}
