//! The independent cyclomatic and line measurement pass.
//!
//! This module plays the role of an external per-function line/CCN
//! counter: given a parsed file it reports `(name, start_line, nloc,
//! ccn, token_count)` rows keyed by the *bare* identifier, plus
//! whole-file totals. It shares nothing with the structural reducer - it
//! queries the tree afresh and does its own line accounting - so the
//! assembler treats it as an outer-join partner whose keys may not line
//! up with the structural pass's (a nested function appears here under
//! its bare name, there under its dot-qualified one).

use once_cell::sync::Lazy;
use serde::Serialize;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor};

use crate::analysis::ParsedSource;
use crate::error::AnalysisError;

/// Finds every function definition, nested ones included.
const FUNCTION_QUERY: &str = r#"
(function_definition
  name: (identifier) @name
) @function
"#;

/// Decision points for McCabe complexity: one per alternate path through
/// the code, boolean short-circuits included.
const DECISION_QUERY: &str = r#"
(if_statement) @decision
(elif_clause) @decision
(for_statement) @decision
(while_statement) @decision
(conditional_expression) @decision
(except_clause) @decision
(case_clause) @decision
(if_clause) @decision
(boolean_operator) @decision
"#;

static LANGUAGE: Lazy<tree_sitter::Language> = Lazy::new(|| tree_sitter_python::LANGUAGE.into());

/// Per-function figures from the measurement pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCcn {
    /// Bare identifier, unqualified even for nested functions.
    pub name: String,
    /// 1-based line of the `def` keyword.
    pub start_line: usize,
    /// Non-blank, non-comment lines in the function span.
    pub nloc: usize,
    /// McCabe cyclomatic complexity: 1 + decision points.
    pub ccn: usize,
    /// Leaf tokens in the function span, comments excluded.
    pub token_count: usize,
}

/// Whole-file figures plus the per-function rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCyclomatic {
    pub functions: Vec<FunctionCcn>,
    /// Non-blank, non-comment lines in the whole file.
    pub nloc: usize,
    /// Sum of the per-function complexities.
    pub ccn: usize,
    /// Leaf tokens in the whole file, comments excluded.
    pub token_count: usize,
}

/// Measure one parsed file.
pub fn measure(parsed: &ParsedSource) -> Result<FileCyclomatic, AnalysisError> {
    let function_query = Query::new(&LANGUAGE, FUNCTION_QUERY)?;
    let decision_query = Query::new(&LANGUAGE, DECISION_QUERY)?;

    let root = parsed.tree.root_node();
    let mut functions = Vec::new();

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&function_query, root, &parsed.source[..]);
    while let Some(m) = matches.next() {
        let mut name = "";
        let mut func_node = None;
        for capture in m.captures {
            match function_query.capture_names()[capture.index as usize] {
                "name" => name = parsed.node_text(capture.node),
                "function" => func_node = Some(capture.node),
                _ => {}
            }
        }

        if let Some(node) = func_node {
            if name.is_empty() {
                continue;
            }
            functions.push(FunctionCcn {
                name: name.to_string(),
                start_line: node.start_position().row + 1,
                nloc: span_nloc(parsed, node),
                ccn: 1 + count_decisions(&decision_query, node, &parsed.source),
                token_count: count_tokens(node),
            });
        }
    }

    functions.sort_by_key(|f| f.start_line);

    let ccn = functions.iter().map(|f| f.ccn).sum();
    Ok(FileCyclomatic {
        functions,
        nloc: file_nloc(parsed),
        ccn,
        token_count: count_tokens(root),
    })
}

/// Count decision-point matches within `node`.
fn count_decisions(query: &Query, node: Node, source: &[u8]) -> usize {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, node, source);
    let mut count = 0;
    while matches.next().is_some() {
        count += 1;
    }
    count
}

/// Non-blank, non-comment lines across the node's span.
fn span_nloc(parsed: &ParsedSource, node: Node) -> usize {
    let start = node.start_position().row;
    let end = node.end_position().row;
    parsed
        .source_str()
        .split('\n')
        .skip(start)
        .take(end - start + 1)
        .filter(|line| is_code_line(line))
        .count()
}

fn file_nloc(parsed: &ParsedSource) -> usize {
    parsed
        .source_str()
        .split('\n')
        .filter(|line| is_code_line(line))
        .count()
}

fn is_code_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Leaf tokens under `node`, comments excluded.
fn count_tokens(node: Node) -> usize {
    if node.child_count() == 0 {
        return usize::from(node.kind() != "comment");
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).map(count_tokens).sum()
}
