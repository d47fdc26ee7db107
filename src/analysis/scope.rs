//! Scope discovery and nested-function flattening.
//!
//! Function definitions produce one record each; class definitions
//! produce none of their own and instead tag the functions found inside
//! with the class name. Module scope is the degenerate class case: no
//! name, depth 0.

use std::collections::VecDeque;

use tree_sitter::Node;

use crate::analysis::node::NodeKind;
use crate::analysis::record::FunctionRecord;
use crate::analysis::reduce::Reducer;
use crate::error::AnalysisError;

/// Collect every function defined at module scope, including methods of
/// module-level classes.
pub fn build_module(
    reducer: &mut Reducer,
    root: Node,
) -> Result<Vec<FunctionRecord>, AnalysisError> {
    let mut functions = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        collect_item(reducer, child, &mut functions, None, 0)?;
    }
    Ok(functions)
}

/// Route one module-level or class-body item: function definitions
/// produce a record, class definitions recurse, anything else is not a
/// scope and is ignored here.
fn collect_item(
    reducer: &mut Reducer,
    node: Node,
    functions: &mut Vec<FunctionRecord>,
    enclosing_class: Option<&str>,
    depth: usize,
) -> Result<(), AnalysisError> {
    match NodeKind::of(&node) {
        NodeKind::FunctionDef => {
            functions.push(build_function(reducer, node, enclosing_class, depth)?);
        }
        NodeKind::ClassDef => {
            functions.extend(build_class(reducer, node, depth)?);
        }
        NodeKind::DecoratedDef => {
            if let Some(definition) = node.child_by_field_name("definition") {
                collect_item(reducer, definition, functions, enclosing_class, depth)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Build the record for one function definition and reduce its body into
/// it at the given depth.
pub fn build_function(
    reducer: &mut Reducer,
    node: Node,
    enclosing_class: Option<&str>,
    depth: usize,
) -> Result<FunctionRecord, AnalysisError> {
    let name = node
        .child_by_field_name("name")
        .map(|n| reducer.node_text(n))
        .unwrap_or("")
        .to_string();
    let start_line = node.start_position().row + 1;
    let end_line = node.end_position().row + 1;

    let mut record = FunctionRecord::new(name, start_line, end_line - start_line + 1, enclosing_class);

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            reducer.reduce(child, &mut record, depth)?;
        }
    }

    Ok(record)
}

/// Discover the member functions of a class body. A class nested inside
/// another class tags its members with its own name; the outer name is
/// discarded.
pub fn build_class(
    reducer: &mut Reducer,
    node: Node,
    depth: usize,
) -> Result<Vec<FunctionRecord>, AnalysisError> {
    reducer.enter()?;
    let result = class_members(reducer, node, depth);
    reducer.leave();
    result
}

fn class_members(
    reducer: &mut Reducer,
    node: Node,
    depth: usize,
) -> Result<Vec<FunctionRecord>, AnalysisError> {
    let class_name = node
        .child_by_field_name("name")
        .map(|n| reducer.node_text(n).to_string());

    let mut functions = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            collect_item(reducer, child, &mut functions, class_name.as_deref(), depth)?;
        }
    }
    Ok(functions)
}

/// Lift nested functions to the top level, dot-qualifying each name with
/// its parent's (already qualified) name.
///
/// A function lifted from three levels down re-enters the work queue
/// before it drains, so flattening is transitive. Postcondition: no
/// record in the output has a non-empty `nested_functions`.
pub fn flatten(functions: &mut Vec<FunctionRecord>) {
    let mut queue: VecDeque<FunctionRecord> = functions.drain(..).collect();
    while let Some(mut function) = queue.pop_front() {
        for mut nested in function.nested_functions.drain(..) {
            nested.name = format!("{}.{}", function.name, nested.name);
            queue.push_back(nested);
        }
        functions.push(function);
    }
}
