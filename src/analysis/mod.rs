//! AST-backed structural metrics extraction.
//!
//! This module owns the structural pass: parse one Python file, discover
//! function scopes, reduce each body into a per-function record, and
//! flatten nested functions into a flat list.
//!
//! ```text
//! ┌─────────────┐     ┌────────────────┐     ┌────────────────┐
//! │ Source file │────▶│ Scope builder  │────▶│ FunctionRecord │
//! └─────────────┘     │ + reducer      │     │ (flat, post-   │
//!                     │ (mutually      │     │  flatten)      │
//!                     │  recursive)    │     └────────────────┘
//!                     └────────────────┘
//! ```
//!
//! The pass is synchronous and single-threaded; callers parallelize
//! across files, never within one.

mod node;
mod record;
mod reduce;
mod scope;
mod source;

pub use node::NodeKind;
pub use record::{FileRecord, FunctionRecord};
pub use reduce::{Reducer, DEFAULT_RECURSION_LIMIT};
pub use scope::{build_module, flatten};
pub use source::{parse, read_source, ParsedSource};

use crate::error::AnalysisError;

/// Run the structural pass over one parsed file.
pub fn analyze_source(
    parsed: &ParsedSource,
    recursion_limit: usize,
) -> Result<FileRecord, AnalysisError> {
    let mut reducer = Reducer::new(&parsed.source, recursion_limit);
    let mut functions = scope::build_module(&mut reducer, parsed.tree.root_node())?;
    scope::flatten(&mut functions);
    Ok(FileRecord {
        total_lines: parsed.total_lines(),
        functions,
    })
}
