//! The statement reducer: recursive syntax-tree traversal accumulating
//! structural metrics into the enclosing function's record.
//!
//! The reducer visits one node at a time, threading the current
//! branch-nesting depth through the recursion. Branch-introducing
//! constructs recurse into their bodies one level deeper; everything else
//! recurses at the caller's depth. A nested `def` or `class` is a scope
//! boundary: it is handed to the scope builder and never folded into the
//! current accumulator.

use tree_sitter::Node;

use crate::analysis::node::NodeKind;
use crate::analysis::record::FunctionRecord;
use crate::analysis::scope;
use crate::error::AnalysisError;

/// Recursion limit applied when the caller does not configure one.
pub const DEFAULT_RECURSION_LIMIT: usize = 500;

/// Walks statements and expressions, mutating the current accumulator.
///
/// The accumulator and depth travel as ordinary parameters; the only
/// state the reducer itself owns is the recursion guard.
pub struct Reducer<'a> {
    source: &'a [u8],
    recursion_limit: usize,
    recursion: usize,
}

impl<'a> Reducer<'a> {
    pub fn new(source: &'a [u8], recursion_limit: usize) -> Self {
        Self {
            source,
            recursion_limit,
            recursion: 0,
        }
    }

    /// Get text for a node.
    pub(crate) fn node_text(&self, node: Node) -> &str {
        node.utf8_text(self.source).unwrap_or("")
    }

    /// Recursion guard. Pathological nesting is the one resource risk in
    /// an otherwise linear traversal; tripping it fails the file, not the
    /// process.
    pub(crate) fn enter(&mut self) -> Result<(), AnalysisError> {
        self.recursion += 1;
        if self.recursion > self.recursion_limit {
            return Err(AnalysisError::DepthExceeded {
                limit: self.recursion_limit,
            });
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.recursion -= 1;
    }

    /// Visit `node` and everything below it, updating `acc` in place.
    ///
    /// `depth` is the branch-nesting level of the surrounding block, not
    /// the tree recursion depth; only branch bodies increase it.
    pub fn reduce(
        &mut self,
        node: Node,
        acc: &mut FunctionRecord,
        depth: usize,
    ) -> Result<(), AnalysisError> {
        self.enter()?;
        let result = self.dispatch(node, acc, depth);
        self.leave();
        result
    }

    fn dispatch(
        &mut self,
        node: Node,
        acc: &mut FunctionRecord,
        depth: usize,
    ) -> Result<(), AnalysisError> {
        acc.observe_depth(depth);

        match NodeKind::of(&node) {
            // Nothing to count, nothing below worth visiting.
            NodeKind::Leaf | NodeKind::NoOpStatement | NodeKind::Lambda => {}

            // Plumbing: recurse into every child at the same depth.
            NodeKind::Module
            | NodeKind::Block
            | NodeKind::ExpressionStatement
            | NodeKind::List
            | NodeKind::Tuple
            | NodeKind::Set
            | NodeKind::Dictionary
            | NodeKind::ExpressionList
            | NodeKind::Parenthesized
            | NodeKind::ListSplat
            | NodeKind::DictionarySplat
            | NodeKind::Slice
            | NodeKind::CompareOp
            | NodeKind::Await
            | NodeKind::ArgumentList
            | NodeKind::With
            | NodeKind::WithClause => self.reduce_children(node, acc, depth)?,

            NodeKind::Pair => {
                self.reduce_field(node, "key", acc, depth)?;
                self.reduce_field(node, "value", acc, depth)?;
            }

            NodeKind::Assignment | NodeKind::AugmentedAssignment => {
                self.reduce_field(node, "left", acc, depth)?;
                self.reduce_field(node, "right", acc, depth)?;
            }

            // Only the bound value matters for `x := v`, `with ... as x`,
            // and `f(kw=v)`; the binding target is a plain name.
            NodeKind::NamedExpression | NodeKind::WithItem | NodeKind::KeywordArgument => {
                self.reduce_field(node, "value", acc, depth)?;
            }

            NodeKind::BinaryOp | NodeKind::BooleanOp => {
                self.reduce_field(node, "left", acc, depth)?;
                self.reduce_field(node, "right", acc, depth)?;
            }

            NodeKind::UnaryOp | NodeKind::NotOp => {
                self.reduce_field(node, "argument", acc, depth)?;
            }

            NodeKind::Attribute => self.reduce_field(node, "object", acc, depth)?,

            NodeKind::Subscript => {
                self.reduce_field(node, "value", acc, depth)?;
                let mut cursor = node.walk();
                for index in node.children_by_field_name("subscript", &mut cursor) {
                    self.reduce(index, acc, depth)?;
                }
            }

            NodeKind::Call => {
                acc.call_count += 1;
                self.reduce_field(node, "function", acc, depth)?;
                self.reduce_field(node, "arguments", acc, depth)?;
            }

            NodeKind::If => {
                acc.branch_count += 1;
                self.reduce_field(node, "condition", acc, depth)?;
                self.reduce_field(node, "consequence", acc, depth + 1)?;
                // An elif continues the chain at the same depth; the else
                // arm adds its own branch and level.
                let mut cursor = node.walk();
                for alternative in node.children_by_field_name("alternative", &mut cursor) {
                    self.reduce(alternative, acc, depth)?;
                }
            }

            NodeKind::ElifClause => {
                acc.branch_count += 1;
                self.reduce_field(node, "condition", acc, depth)?;
                self.reduce_field(node, "consequence", acc, depth + 1)?;
            }

            NodeKind::ElseClause => {
                acc.branch_count += 1;
                self.reduce_field(node, "body", acc, depth + 1)?;
            }

            NodeKind::For => {
                acc.branch_count += 1;
                self.reduce_field(node, "right", acc, depth)?;
                self.reduce_field(node, "body", acc, depth + 1)?;
                self.reduce_field(node, "alternative", acc, depth)?;
            }

            NodeKind::While => {
                acc.branch_count += 1;
                // The condition is evaluated at the loop's own level,
                // consistent with `if` and `for`.
                self.reduce_field(node, "condition", acc, depth)?;
                self.reduce_field(node, "body", acc, depth + 1)?;
                self.reduce_field(node, "alternative", acc, depth)?;
            }

            NodeKind::Try => {
                acc.branch_count += 1;
                self.reduce_field(node, "body", acc, depth + 1)?;
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    match NodeKind::of(&child) {
                        NodeKind::ExceptClause
                        | NodeKind::ElseClause
                        | NodeKind::FinallyClause => self.reduce(child, acc, depth)?,
                        // The body block was already visited.
                        _ => {}
                    }
                }
            }

            NodeKind::ExceptClause | NodeKind::FinallyClause => {
                acc.branch_count += 1;
                // Only the handler body counts; the exception pattern is
                // not traversed.
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if NodeKind::of(&child) == NodeKind::Block {
                        self.reduce(child, acc, depth + 1)?;
                    }
                }
            }

            NodeKind::Conditional => {
                acc.branch_count += 1;
                // Children in source order: value `if` condition `else`
                // alternative.
                let mut cursor = node.walk();
                let parts: Vec<Node> = node
                    .named_children(&mut cursor)
                    .filter(|n| n.kind() != "comment")
                    .collect();
                if let Some(condition) = parts.get(1) {
                    self.reduce(*condition, acc, depth)?;
                }
                if let Some(value) = parts.first() {
                    self.reduce(*value, acc, depth + 1)?;
                }
                if let Some(alternative) = parts.get(2) {
                    self.reduce(*alternative, acc, depth + 1)?;
                }
            }

            NodeKind::Return | NodeKind::Yield => {
                acc.return_count += 1;
                self.reduce_children(node, acc, depth)?;
            }

            NodeKind::Raise => {
                acc.raise_count += 1;
                // `raise X from Y` visits X; the cause is not traversed.
                let cause = node.child_by_field_name("cause");
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if Some(child) != cause {
                        self.reduce(child, acc, depth)?;
                    }
                }
            }

            NodeKind::Assert => {
                acc.assertion_count += 1;
                // Only the condition; a failure message is not traversed.
                if let Some(condition) = node.named_child(0) {
                    self.reduce(condition, acc, depth)?;
                }
            }

            NodeKind::ListComp | NodeKind::SetComp | NodeKind::DictComp
            | NodeKind::GeneratorExp => {
                self.reduce_field(node, "body", acc, depth)?;
                let mut cursor = node.walk();
                for clause in node.named_children(&mut cursor) {
                    match NodeKind::of(&clause) {
                        NodeKind::ForInClause | NodeKind::IfClause => {
                            self.reduce(clause, acc, depth)?;
                        }
                        // The body was already visited.
                        _ => {}
                    }
                }
            }

            NodeKind::ForInClause => self.reduce_field(node, "right", acc, depth)?,

            // Each filter clause is a branch that does not nest.
            NodeKind::IfClause => acc.branch_count += 1,

            // Scope boundaries: the nested definition gets its own record
            // instead of feeding this accumulator.
            NodeKind::FunctionDef => {
                let nested = scope::build_function(self, node, None, depth)?;
                acc.nested_functions.push(nested);
            }

            NodeKind::ClassDef => {
                let mut members = scope::build_class(self, node, depth)?;
                acc.nested_functions.append(&mut members);
            }

            NodeKind::DecoratedDef => {
                if let Some(definition) = node.child_by_field_name("definition") {
                    self.reduce(definition, acc, depth)?;
                }
            }

            NodeKind::Other => {
                log::debug!("skipping unrecognized node kind {:?}", node.kind());
            }
        }

        Ok(())
    }

    /// Recurse into every named child at the same depth.
    fn reduce_children(
        &mut self,
        node: Node,
        acc: &mut FunctionRecord,
        depth: usize,
    ) -> Result<(), AnalysisError> {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.reduce(child, acc, depth)?;
        }
        Ok(())
    }

    /// Recurse into a named field if it is present.
    fn reduce_field(
        &mut self,
        node: Node,
        field: &str,
        acc: &mut FunctionRecord,
        depth: usize,
    ) -> Result<(), AnalysisError> {
        if let Some(child) = node.child_by_field_name(field) {
            self.reduce(child, acc, depth)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::analysis::source;

    /// Parse a snippet and return the flat, post-flatten function records.
    fn analyze(src: &str) -> Vec<FunctionRecord> {
        let parsed = source::parse(Path::new("test.py"), src.as_bytes().to_vec()).unwrap();
        let mut reducer = Reducer::new(&parsed.source, DEFAULT_RECURSION_LIMIT);
        let mut functions = scope::build_module(&mut reducer, parsed.tree.root_node()).unwrap();
        scope::flatten(&mut functions);
        functions
    }

    fn find<'a>(functions: &'a [FunctionRecord], name: &str) -> &'a FunctionRecord {
        functions
            .iter()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("no function named {name}"))
    }

    #[test]
    fn test_empty_function_counts_nothing() {
        let functions = analyze("def f():\n    pass\n");
        let f = find(&functions, "f");
        assert_eq!(f.branch_count, 0);
        assert_eq!(f.call_count, 0);
        assert_eq!(f.return_count, 0);
        assert_eq!(f.raise_count, 0);
        assert_eq!(f.assertion_count, 0);
        assert_eq!(f.max_depth, 0);
        assert_eq!(f.line_count, 2);
    }

    #[test]
    fn test_elif_chain_counts_one_branch_per_condition() {
        let functions = analyze(
            r#"
def classify(x):
    if x > 0:
        return "pos"
    elif x < 0:
        return "neg"
    else:
        return "zero"
"#,
        );
        let f = find(&functions, "classify");
        // if + elif + trailing else
        assert_eq!(f.branch_count, 3);
        // The chain stays flat.
        assert_eq!(f.max_depth, 1);
        assert_eq!(f.return_count, 3);
    }

    #[test]
    fn test_triple_nested_for() {
        let functions = analyze(
            r#"
def grid():
    for i in range(3):
        for j in range(3):
            for k in range(3):
                print(i, j, k)
"#,
        );
        let f = find(&functions, "grid");
        assert_eq!(f.branch_count, 3);
        assert_eq!(f.max_depth, 3);
        assert_eq!(f.call_count, 4);
    }

    #[test]
    fn test_nested_function_gets_its_own_record() {
        let functions = analyze(
            r#"
def outer(x):
    if x > 0:
        return inner(x)
    def inner(y):
        return y + 1
"#,
        );
        assert_eq!(functions.len(), 2);

        let outer = find(&functions, "outer");
        assert_eq!(outer.branch_count, 1);
        assert_eq!(outer.return_count, 1);
        assert_eq!(outer.call_count, 1);
        assert_eq!(outer.max_depth, 1);
        assert!(outer.nested_functions.is_empty());

        let inner = find(&functions, "outer.inner");
        assert_eq!(inner.branch_count, 0);
        assert_eq!(inner.return_count, 1);
        assert_eq!(inner.call_count, 0);
        assert_eq!(inner.max_depth, 0);
    }

    #[test]
    fn test_try_blocks_count_each_path() {
        let functions = analyze(
            r#"
def guarded():
    try:
        risky()
    except ValueError:
        handle()
    except KeyError:
        pass
    else:
        after()
    finally:
        cleanup()
"#,
        );
        let f = find(&functions, "guarded");
        // try + two handlers + else + finally
        assert_eq!(f.branch_count, 5);
        assert_eq!(f.call_count, 4);
        assert_eq!(f.max_depth, 1);
    }

    #[test]
    fn test_comprehension_filters_branch_without_nesting() {
        let functions = analyze(
            r#"
def evens(xs):
    return [x for x in xs if x % 2 == 0 if x > 0]
"#,
        );
        let f = find(&functions, "evens");
        assert_eq!(f.branch_count, 2);
        assert_eq!(f.max_depth, 0);
        assert_eq!(f.return_count, 1);
        assert_eq!(f.call_count, 0);
    }

    #[test]
    fn test_ternary_is_a_branch() {
        let functions = analyze(
            r#"
def pick(a, b, flag):
    return a if flag else b
"#,
        );
        let f = find(&functions, "pick");
        assert_eq!(f.branch_count, 1);
        assert_eq!(f.max_depth, 1);
        assert_eq!(f.return_count, 1);
    }

    #[test]
    fn test_while_counts_like_other_loops() {
        let functions = analyze(
            r#"
def spin(n):
    while n > 0:
        n -= 1
    else:
        return n
"#,
        );
        let f = find(&functions, "spin");
        // while + loop else
        assert_eq!(f.branch_count, 2);
        assert_eq!(f.max_depth, 1);
        assert_eq!(f.return_count, 1);
    }

    #[test]
    fn test_calls_count_callee_and_arguments() {
        let functions = analyze(
            r#"
def send(client, payload):
    client.post(url(), data=payload, timeout=5)
"#,
        );
        let f = find(&functions, "send");
        assert_eq!(f.call_count, 2);
        assert_eq!(f.max_depth, 0);
    }

    #[test]
    fn test_assert_and_raise() {
        let functions = analyze(
            r#"
def check(x):
    assert x >= 0, "negative"
    if x == 0:
        raise ValueError("zero")
    return x
"#,
        );
        let f = find(&functions, "check");
        assert_eq!(f.assertion_count, 1);
        assert_eq!(f.raise_count, 1);
        assert_eq!(f.branch_count, 1);
        assert_eq!(f.return_count, 1);
        assert_eq!(f.call_count, 1);
    }

    #[test]
    fn test_yield_counts_as_return() {
        let functions = analyze(
            r#"
def emit(xs):
    for x in xs:
        yield x
    yield from xs
"#,
        );
        let f = find(&functions, "emit");
        assert_eq!(f.return_count, 2);
        assert_eq!(f.branch_count, 1);
    }

    #[test]
    fn test_with_neither_branches_nor_nests() {
        let functions = analyze(
            r#"
def load(path):
    with open(path) as fp:
        return fp.read()
"#,
        );
        let f = find(&functions, "load");
        assert_eq!(f.branch_count, 0);
        assert_eq!(f.max_depth, 0);
        assert_eq!(f.call_count, 2);
        assert_eq!(f.return_count, 1);
    }

    #[test]
    fn test_lambda_is_a_boundary() {
        let functions = analyze(
            r#"
def sorter(items):
    return sorted(items, key=lambda x: x.rank() if x else 0)
"#,
        );
        let f = find(&functions, "sorter");
        // Nothing inside the lambda is counted.
        assert_eq!(f.call_count, 1);
        assert_eq!(f.branch_count, 0);
    }

    #[test]
    fn test_unrecognized_construct_contributes_nothing() {
        // match statements are outside the closed kind set; the reducer
        // must skip them without failing.
        let functions = analyze(
            r#"
def dispatch(x):
    match x:
        case 1:
            return 1
    return 0
"#,
        );
        let f = find(&functions, "dispatch");
        assert_eq!(f.return_count, 1);
        assert_eq!(f.branch_count, 0);
    }

    #[test]
    fn test_recursion_guard_trips_on_pathological_nesting() {
        let mut src = String::from("def deep(x):\n");
        let levels = 40;
        for i in 0..levels {
            let indent = "    ".repeat(i + 1);
            src.push_str(&format!("{indent}if x:\n"));
        }
        src.push_str(&format!("{}pass\n", "    ".repeat(levels + 1)));

        let parsed = source::parse(Path::new("deep.py"), src.into_bytes()).unwrap();
        let mut reducer = Reducer::new(&parsed.source, 16);
        let err = scope::build_module(&mut reducer, parsed.tree.root_node()).unwrap_err();
        match err {
            AnalysisError::DepthExceeded { limit } => assert_eq!(limit, 16),
            other => panic!("expected DepthExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_module_level_code_is_not_attributed() {
        let functions = analyze(
            r#"
print("import side effect")

def quiet():
    pass
"#,
        );
        assert_eq!(functions.len(), 1);
        assert_eq!(find(&functions, "quiet").call_count, 0);
    }
}
