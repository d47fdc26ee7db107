//! pygauge - structural complexity metrics for Python source.
//!
//! pygauge walks each Python file's syntax tree and accumulates
//! per-function statistics: nesting depth, branch count, call count,
//! return count, raise count, and assertion count. An independent
//! measurement pass supplies per-function line counts and McCabe
//! cyclomatic complexity; the two are joined by `(name, start_line)`.
//!
//! # Architecture
//!
//! The codebase uses tree-sitter for AST-based analysis:
//!
//! - `analysis`: the structural pass - scope builder, statement reducer,
//!   nested-function flattener
//! - `cyclomatic`: the independent CCN/line/token measurement pass
//! - `assemble`: per-file outer join of the two passes
//! - `batch`: directory walking and parallel per-file analysis with
//!   failure isolation
//! - `summary`: run-level aggregation
//! - `report`: output formatting (pretty, JSON, CSV)

pub mod analysis;
pub mod assemble;
pub mod batch;
pub mod cli;
pub mod cyclomatic;
pub mod error;
pub mod report;
pub mod summary;

pub use analysis::{FileRecord, FunctionRecord, NodeKind, ParsedSource};
pub use assemble::{assemble, FileAnalysis, FunctionAnalysis};
pub use batch::{BatchOptions, BatchResult, FileFailure};
pub use cyclomatic::{FileCyclomatic, FunctionCcn};
pub use error::AnalysisError;
pub use summary::{summarize, RunSummary};
