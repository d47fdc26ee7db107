//! Per-file assembly: run both passes over one file and join the rows.
//!
//! The structural pass and the cyclomatic pass each produce rows keyed by
//! `(name, start_line)`. Either side may hold keys the other does not -
//! nested functions are dot-qualified on the structural side and bare on
//! the cyclomatic side - so the two are combined with a full outer join:
//!
//! - both sides present: one row carrying both metric sections;
//! - structural only: row kept, cyclomatic section unset;
//! - cyclomatic only: row kept, structural section unset, appended after
//!   the structural rows in line order.
//!
//! A join miss never drops a row; silently dropping one would corrupt
//! downstream aggregates.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::analysis::{self, FunctionRecord};
use crate::cyclomatic::{self, FunctionCcn};
use crate::error::AnalysisError;

/// Structural metrics section of a joined row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureMetrics {
    pub line_count: usize,
    pub enclosing_class: Option<String>,
    pub max_depth: usize,
    pub branch_count: usize,
    pub call_count: usize,
    pub return_count: usize,
    pub raise_count: usize,
    pub assertion_count: usize,
}

impl From<&FunctionRecord> for StructureMetrics {
    fn from(record: &FunctionRecord) -> Self {
        Self {
            line_count: record.line_count,
            enclosing_class: record.enclosing_class.clone(),
            max_depth: record.max_depth,
            branch_count: record.branch_count,
            call_count: record.call_count,
            return_count: record.return_count,
            raise_count: record.raise_count,
            assertion_count: record.assertion_count,
        }
    }
}

/// Cyclomatic metrics section of a joined row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CyclomaticMetrics {
    pub nloc: usize,
    pub ccn: usize,
    pub token_count: usize,
}

impl From<&FunctionCcn> for CyclomaticMetrics {
    fn from(row: &FunctionCcn) -> Self {
        Self {
            nloc: row.nloc,
            ccn: row.ccn,
            token_count: row.token_count,
        }
    }
}

/// One function after the outer join. An unset section marks a join miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionAnalysis {
    pub name: String,
    pub start_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cyclomatic: Option<CyclomaticMetrics>,
}

/// A fully analyzed file, ready for the report layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAnalysis {
    pub path: String,
    pub total_lines: usize,
    pub functions: Vec<FunctionAnalysis>,
    /// Whole-file figures from the cyclomatic pass.
    pub nloc: usize,
    pub ccn: usize,
    pub token_count: usize,
}

/// Analyze one file end to end: read it, parse once, run the structural
/// and the cyclomatic passes, and join their rows.
pub fn assemble(path: &Path, recursion_limit: usize) -> Result<FileAnalysis, AnalysisError> {
    let source = analysis::read_source(path)?;
    let parsed = analysis::parse(path, source)?;

    let record = analysis::analyze_source(&parsed, recursion_limit)?;
    let measured = cyclomatic::measure(&parsed)?;

    Ok(FileAnalysis {
        path: parsed.path.clone(),
        total_lines: record.total_lines,
        functions: join(record.functions, measured.functions),
        nloc: measured.nloc,
        ccn: measured.ccn,
        token_count: measured.token_count,
    })
}

/// Full outer join on `(name, start_line)`.
fn join(structural: Vec<FunctionRecord>, cyclomatic: Vec<FunctionCcn>) -> Vec<FunctionAnalysis> {
    let mut right: HashMap<(String, usize), FunctionCcn> = cyclomatic
        .into_iter()
        .map(|row| ((row.name.clone(), row.start_line), row))
        .collect();

    let mut rows = Vec::new();
    for record in structural {
        let matched = right.remove(&(record.name.clone(), record.start_line));
        rows.push(FunctionAnalysis {
            name: record.name.clone(),
            start_line: record.start_line,
            structure: Some(StructureMetrics::from(&record)),
            cyclomatic: matched.as_ref().map(CyclomaticMetrics::from),
        });
    }

    // Rows the structural pass never saw are kept as sentinels.
    let mut unmatched: Vec<FunctionCcn> = right.into_values().collect();
    unmatched.sort_by(|a, b| (a.start_line, &a.name).cmp(&(b.start_line, &b.name)));
    for row in unmatched {
        rows.push(FunctionAnalysis {
            name: row.name.clone(),
            start_line: row.start_line,
            structure: None,
            cyclomatic: Some(CyclomaticMetrics::from(&row)),
        });
    }

    rows
}
