//! Run-level aggregation over assembled file records.

use serde::Serialize;

use crate::assemble::FileAnalysis;

/// Totals and per-file averages over one analysis run. The per-file
/// figures come from the cyclomatic pass; averages are rounded to two
/// decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub file_count: usize,
    pub function_count: usize,
    pub total_lines: usize,
    pub total_nloc: usize,
    pub mean_nloc: f64,
    pub mean_ccn: f64,
    pub max_ccn: usize,
    pub mean_token_count: f64,
}

/// Aggregate the successful files of a run.
pub fn summarize(files: &[FileAnalysis]) -> RunSummary {
    let file_count = files.len();
    let total_nloc: usize = files.iter().map(|f| f.nloc).sum();
    let total_ccn: usize = files.iter().map(|f| f.ccn).sum();
    let total_tokens: usize = files.iter().map(|f| f.token_count).sum();

    let mean = |total: usize| {
        if file_count == 0 {
            0.0
        } else {
            round2(total as f64 / file_count as f64)
        }
    };

    RunSummary {
        file_count,
        function_count: files.iter().map(|f| f.functions.len()).sum(),
        total_lines: files.iter().map(|f| f.total_lines).sum(),
        total_nloc,
        mean_nloc: mean(total_nloc),
        mean_ccn: mean(total_ccn),
        max_ccn: files.iter().map(|f| f.ccn).max().unwrap_or(0),
        mean_token_count: mean(total_tokens),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
