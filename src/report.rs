//! Output formatting for analysis results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - CSV: per-function rows for spreadsheet/dataframe import

use colored::*;
use serde::Serialize;

use crate::assemble::{FileAnalysis, FunctionAnalysis};
use crate::batch::BatchResult;
use crate::summary::RunSummary;

/// Column to order each file's function rows by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    StartLine,
    Name,
    Nloc,
    Ccn,
    MaxDepth,
    Branches,
    Calls,
    Returns,
    Raises,
    Assertions,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::StartLine => "start_line",
            SortKey::Name => "name",
            SortKey::Nloc => "nloc",
            SortKey::Ccn => "ccn",
            SortKey::MaxDepth => "max_depth",
            SortKey::Branches => "branches",
            SortKey::Calls => "calls",
            SortKey::Returns => "returns",
            SortKey::Raises => "raises",
            SortKey::Assertions => "assertions",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start_line" | "line" => Ok(SortKey::StartLine),
            "name" => Ok(SortKey::Name),
            "nloc" => Ok(SortKey::Nloc),
            "ccn" => Ok(SortKey::Ccn),
            "max_depth" | "depth" => Ok(SortKey::MaxDepth),
            "branches" => Ok(SortKey::Branches),
            "calls" => Ok(SortKey::Calls),
            "returns" => Ok(SortKey::Returns),
            "raises" => Ok(SortKey::Raises),
            "assertions" => Ok(SortKey::Assertions),
            _ => Err(format!("unknown sort key: {}", s)),
        }
    }
}

/// Order every file's function rows by `key`. Rows missing the relevant
/// metric section sort as zero so sentinels stay visible.
pub fn sort_functions(files: &mut [FileAnalysis], key: SortKey, descending: bool) {
    for file in files {
        file.functions.sort_by(|a, b| {
            let ordering = match key {
                SortKey::Name => a.name.cmp(&b.name),
                SortKey::StartLine => a.start_line.cmp(&b.start_line),
                _ => metric(a, key).cmp(&metric(b, key)),
            };
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
}

fn metric(row: &FunctionAnalysis, key: SortKey) -> usize {
    let structure = row.structure.as_ref();
    let cyclomatic = row.cyclomatic.as_ref();
    match key {
        SortKey::Nloc => cyclomatic.map_or(0, |c| c.nloc),
        SortKey::Ccn => cyclomatic.map_or(0, |c| c.ccn),
        SortKey::MaxDepth => structure.map_or(0, |s| s.max_depth),
        SortKey::Branches => structure.map_or(0, |s| s.branch_count),
        SortKey::Calls => structure.map_or(0, |s| s.call_count),
        SortKey::Returns => structure.map_or(0, |s| s.return_count),
        SortKey::Raises => structure.map_or(0, |s| s.raise_count),
        SortKey::Assertions => structure.map_or(0, |s| s.assertion_count),
        SortKey::Name | SortKey::StartLine => 0,
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON report structure.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub version: String,
    pub path: String,
    pub files: &'a [FileAnalysis],
    pub failures: Vec<JsonFailure>,
    pub summary: &'a RunSummary,
}

/// A failed file in JSON output.
#[derive(Serialize)]
pub struct JsonFailure {
    pub path: String,
    pub error: String,
}

/// Render the JSON report.
pub fn render_json(
    path: &str,
    result: &BatchResult,
    summary: &RunSummary,
) -> anyhow::Result<String> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        files: &result.files,
        failures: result
            .failures
            .iter()
            .map(|f| JsonFailure {
                path: f.path.to_string_lossy().to_string(),
                error: f.error.to_string(),
            })
            .collect(),
        summary,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Write the JSON report to stdout.
pub fn write_json(path: &str, result: &BatchResult, summary: &RunSummary) -> anyhow::Result<()> {
    println!("{}", render_json(path, result, summary)?);
    Ok(())
}

// =============================================================================
// CSV Format
// =============================================================================

/// One row per function; the key columns lead, metric columns follow.
const CSV_HEADER: &str =
    "file,name,start_line,nloc,ccn,enclosing_class,max_depth,branches,calls,returns,raises,assertions";

/// Render per-function rows as CSV. A missing metric section leaves its
/// cells empty rather than inventing zeros.
pub fn render_csv(result: &BatchResult) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for file in &result.files {
        for row in &file.functions {
            let structure = row.structure.as_ref();
            let cyclomatic = row.cyclomatic.as_ref();
            let cells = [
                csv_field(&file.path),
                csv_field(&row.name),
                row.start_line.to_string(),
                opt_cell(cyclomatic.map(|c| c.nloc)),
                opt_cell(cyclomatic.map(|c| c.ccn)),
                structure
                    .and_then(|s| s.enclosing_class.as_deref())
                    .map(csv_field)
                    .unwrap_or_default(),
                opt_cell(structure.map(|s| s.max_depth)),
                opt_cell(structure.map(|s| s.branch_count)),
                opt_cell(structure.map(|s| s.call_count)),
                opt_cell(structure.map(|s| s.return_count)),
                opt_cell(structure.map(|s| s.raise_count)),
                opt_cell(structure.map(|s| s.assertion_count)),
            ];
            out.push_str(&cells.join(","));
            out.push('\n');
        }
    }

    out
}

/// Write the CSV report to stdout.
pub fn write_csv(result: &BatchResult) {
    print!("{}", render_csv(result));
}

fn opt_cell(value: Option<usize>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Quote a field when it contains a separator, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write human-readable results to stdout.
pub fn write_pretty(result: &BatchResult, summary: &RunSummary) {
    println!();
    print!("  ");
    print!("{}", "pygauge".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    for file in &result.files {
        write_file(file);
    }

    if !result.failures.is_empty() {
        write_failures(result);
    }

    write_summary(summary);
}

fn write_file(file: &FileAnalysis) {
    print!("  {}", file.path.bold());
    println!(
        " {}",
        format!(
            "({} lines, nloc {}, ccn {}, tokens {})",
            file.total_lines, file.nloc, file.ccn, file.token_count
        )
        .dimmed()
    );

    if file.functions.is_empty() {
        println!("    {}", "no functions".dimmed());
        println!();
        return;
    }

    println!(
        "    {:<32} {:>5} {:>5} {:>4} {:>6} {:>9} {:>6} {:>8} {:>7} {:>11}",
        "function", "line", "nloc", "ccn", "depth", "branches", "calls", "returns", "raises",
        "assertions"
    );
    for row in &file.functions {
        write_function(row);
    }
    println!();
}

fn write_function(row: &FunctionAnalysis) {
    let structure = row.structure.as_ref();
    let cyclomatic = row.cyclomatic.as_ref();
    let dash = || "-".to_string();

    let name = structure
        .and_then(|s| s.enclosing_class.as_deref())
        .map(|class| format!("{}::{}", class, row.name))
        .unwrap_or_else(|| row.name.clone());

    println!(
        "    {:<32} {:>5} {:>5} {:>4} {:>6} {:>9} {:>6} {:>8} {:>7} {:>11}",
        name,
        row.start_line,
        cyclomatic.map(|c| c.nloc.to_string()).unwrap_or_else(dash),
        cyclomatic.map(|c| c.ccn.to_string()).unwrap_or_else(dash),
        structure
            .map(|s| s.max_depth.to_string())
            .unwrap_or_else(dash),
        structure
            .map(|s| s.branch_count.to_string())
            .unwrap_or_else(dash),
        structure
            .map(|s| s.call_count.to_string())
            .unwrap_or_else(dash),
        structure
            .map(|s| s.return_count.to_string())
            .unwrap_or_else(dash),
        structure
            .map(|s| s.raise_count.to_string())
            .unwrap_or_else(dash),
        structure
            .map(|s| s.assertion_count.to_string())
            .unwrap_or_else(dash),
    );
}

fn write_failures(result: &BatchResult) {
    println!("  {}", "failures:".red().bold());
    for failure in &result.failures {
        println!("    {}: {}", failure.path.display(), failure.error);
    }
    println!();
}

fn write_summary(summary: &RunSummary) {
    println!(
        "  {} {} files, {} functions, {} lines",
        "summary:".dimmed(),
        summary.file_count,
        summary.function_count,
        summary.total_lines
    );
    println!(
        "  {} nloc {} (mean {}), ccn mean {} max {}, tokens mean {}",
        "        ".dimmed(),
        summary.total_nloc,
        summary.mean_nloc,
        summary.mean_ccn,
        summary.max_ccn,
        summary.mean_token_count
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{CyclomaticMetrics, StructureMetrics};
    use crate::summary::summarize;

    fn row(name: &str, start_line: usize, ccn: usize) -> FunctionAnalysis {
        FunctionAnalysis {
            name: name.to_string(),
            start_line,
            structure: Some(StructureMetrics {
                line_count: 3,
                enclosing_class: None,
                max_depth: 1,
                branch_count: ccn.saturating_sub(1),
                call_count: 0,
                return_count: 1,
                raise_count: 0,
                assertion_count: 0,
            }),
            cyclomatic: Some(CyclomaticMetrics {
                nloc: 3,
                ccn,
                token_count: 12,
            }),
        }
    }

    fn batch() -> BatchResult {
        BatchResult {
            files: vec![FileAnalysis {
                path: "pkg/mod.py".to_string(),
                total_lines: 10,
                functions: vec![row("beta", 5, 1), row("alpha", 1, 4)],
                nloc: 8,
                ccn: 5,
                token_count: 40,
            }],
            failures: Vec::new(),
        }
    }

    #[test]
    fn test_sort_by_ccn_descending() {
        let mut result = batch();
        sort_functions(&mut result.files, SortKey::Ccn, true);
        let names: Vec<&str> = result.files[0]
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_sort_by_name() {
        let mut result = batch();
        sort_functions(&mut result.files, SortKey::Name, false);
        let names: Vec<&str> = result.files[0]
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_sort_key_round_trips_from_str() {
        for key in [
            SortKey::StartLine,
            SortKey::Name,
            SortKey::Nloc,
            SortKey::Ccn,
            SortKey::MaxDepth,
            SortKey::Branches,
            SortKey::Calls,
            SortKey::Returns,
            SortKey::Raises,
            SortKey::Assertions,
        ] {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
        assert!("bogus".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_json_report_shape() {
        let result = batch();
        let summary = summarize(&result.files);
        let rendered = render_json("pkg", &result, &summary).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(value["path"], "pkg");
        assert_eq!(value["files"][0]["functions"][0]["name"], "beta");
        assert_eq!(value["files"][0]["functions"][0]["cyclomatic"]["ccn"], 1);
        assert_eq!(value["summary"]["file_count"], 1);
        assert!(value["failures"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_csv_has_one_row_per_function() {
        let result = batch();
        let rendered = render_csv(&result);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("file,name,start_line"));
        assert!(lines[1].starts_with("pkg/mod.py,beta,5,3,1"));
    }

    #[test]
    fn test_csv_leaves_missing_sections_empty() {
        let mut result = batch();
        result.files[0].functions = vec![FunctionAnalysis {
            name: "ghost".to_string(),
            start_line: 9,
            structure: None,
            cyclomatic: Some(CyclomaticMetrics {
                nloc: 2,
                ccn: 1,
                token_count: 5,
            }),
        }];
        let rendered = render_csv(&result);
        let data_line = rendered.lines().nth(1).unwrap();
        assert_eq!(data_line, "pkg/mod.py,ghost,9,2,1,,,,,,,");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
