//! Metric records produced by the structural pass.

use serde::Serialize;

/// Statistics and identifying information for a single discovered function.
///
/// A record is created the moment its `def` is encountered, mutated in
/// place while the reducer visits the body, and immutable afterwards
/// except for having its `nested_functions` flattened away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionRecord {
    /// Identifier as written; dot-qualified after flattening
    /// (`outer.inner`).
    pub name: String,
    /// 1-based line of the `def` keyword. Part of the disambiguating key
    /// because two classes may define same-named methods.
    pub start_line: usize,
    /// Inclusive line span of the definition.
    pub line_count: usize,
    /// Name of the lexically enclosing class, if any. The innermost class
    /// wins when classes nest.
    pub enclosing_class: Option<String>,
    /// Deepest branch-nesting level reached anywhere in the body.
    pub max_depth: usize,
    /// Branch-introducing constructs: `if`, loops, handlers, ternaries,
    /// comprehension filters.
    pub branch_count: usize,
    /// Call sites.
    pub call_count: usize,
    /// `return` and `yield` statements.
    pub return_count: usize,
    /// `raise` statements.
    pub raise_count: usize,
    /// `assert` statements.
    pub assertion_count: usize,
    /// Functions defined directly inside this body, in discovery order.
    /// Drained by flattening; always empty in final output.
    #[serde(skip)]
    pub nested_functions: Vec<FunctionRecord>,
}

impl FunctionRecord {
    /// Seed a record for a function spanning `line_count` lines.
    pub fn new(
        name: String,
        start_line: usize,
        line_count: usize,
        enclosing_class: Option<&str>,
    ) -> Self {
        Self {
            name,
            start_line,
            line_count,
            enclosing_class: enclosing_class.map(str::to_string),
            max_depth: 0,
            branch_count: 0,
            call_count: 0,
            return_count: 0,
            raise_count: 0,
            assertion_count: 0,
            nested_functions: Vec::new(),
        }
    }

    /// Raise `max_depth` to at least `depth`. Called for every node the
    /// reducer visits, not only at branch points, so the deepest point
    /// reached by any statement is what gets recorded.
    pub(crate) fn observe_depth(&mut self, depth: usize) {
        if depth > self.max_depth {
            self.max_depth = depth;
        }
    }
}

/// The structural pass's view of one whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Total source lines; a file ending in `\n` counts a final empty
    /// line.
    pub total_lines: usize,
    /// Flat, post-flatten function records in discovery order.
    pub functions: Vec<FunctionRecord>,
}
