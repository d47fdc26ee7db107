//! Closed set of Python grammar node kinds the reducer dispatches on.

/// One variant per tree-sitter-python node kind (or family of kinds) that
/// the reducer knows how to handle. Everything else maps to
/// [`NodeKind::Other`], which the reducer logs and skips, so new grammar
/// constructs degrade to "contributes nothing" instead of breaking
/// analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Module,
    Block,

    // Scope boundaries, handed to the scope builder.
    FunctionDef,
    ClassDef,
    DecoratedDef,

    // Branch-introducing constructs.
    If,
    ElifClause,
    ElseClause,
    For,
    While,
    Try,
    ExceptClause,
    FinallyClause,
    Conditional,

    // Context managers recurse without branching.
    With,
    WithClause,
    WithItem,

    // Counters.
    Call,
    Return,
    Yield,
    Raise,
    Assert,

    // Plumbing that recurses into operands at the same depth.
    ExpressionStatement,
    Assignment,
    AugmentedAssignment,
    NamedExpression,
    BinaryOp,
    BooleanOp,
    CompareOp,
    UnaryOp,
    NotOp,
    Attribute,
    Subscript,
    Slice,
    ArgumentList,
    KeywordArgument,

    // Container literals.
    List,
    Tuple,
    Set,
    Dictionary,
    Pair,
    ExpressionList,
    Parenthesized,
    ListSplat,
    DictionarySplat,

    // Comprehensions and their clauses.
    ListComp,
    SetComp,
    DictComp,
    GeneratorExp,
    ForInClause,
    IfClause,

    Await,

    /// Anonymous-function literal; a boundary the reducer does not cross.
    Lambda,
    /// Identifiers, literals, strings, comments.
    Leaf,
    /// Statements with nothing to count or recurse into: `pass`, loop
    /// control, imports, `del`, `global`, `nonlocal`.
    NoOpStatement,
    /// Anything the reducer does not recognize.
    Other,
}

impl NodeKind {
    /// Classify a tree-sitter node by its kind string.
    pub fn of(node: &tree_sitter::Node) -> Self {
        Self::from_kind(node.kind())
    }

    /// Map a grammar kind string onto the closed variant set.
    pub fn from_kind(kind: &str) -> Self {
        match kind {
            "module" => NodeKind::Module,
            "block" => NodeKind::Block,

            "function_definition" => NodeKind::FunctionDef,
            "class_definition" => NodeKind::ClassDef,
            "decorated_definition" => NodeKind::DecoratedDef,

            "if_statement" => NodeKind::If,
            "elif_clause" => NodeKind::ElifClause,
            "else_clause" => NodeKind::ElseClause,
            "for_statement" => NodeKind::For,
            "while_statement" => NodeKind::While,
            "try_statement" => NodeKind::Try,
            "except_clause" | "except_group_clause" => NodeKind::ExceptClause,
            "finally_clause" => NodeKind::FinallyClause,
            "conditional_expression" => NodeKind::Conditional,

            "with_statement" => NodeKind::With,
            "with_clause" => NodeKind::WithClause,
            "with_item" => NodeKind::WithItem,

            "call" => NodeKind::Call,
            "return_statement" => NodeKind::Return,
            "yield" => NodeKind::Yield,
            "raise_statement" => NodeKind::Raise,
            "assert_statement" => NodeKind::Assert,

            "expression_statement" => NodeKind::ExpressionStatement,
            "assignment" => NodeKind::Assignment,
            "augmented_assignment" => NodeKind::AugmentedAssignment,
            "named_expression" => NodeKind::NamedExpression,
            "binary_operator" => NodeKind::BinaryOp,
            "boolean_operator" => NodeKind::BooleanOp,
            "comparison_operator" => NodeKind::CompareOp,
            "unary_operator" => NodeKind::UnaryOp,
            "not_operator" => NodeKind::NotOp,
            "attribute" => NodeKind::Attribute,
            "subscript" => NodeKind::Subscript,
            "slice" => NodeKind::Slice,
            "argument_list" => NodeKind::ArgumentList,
            "keyword_argument" => NodeKind::KeywordArgument,

            "list" => NodeKind::List,
            "tuple" | "tuple_pattern" => NodeKind::Tuple,
            "set" => NodeKind::Set,
            "dictionary" => NodeKind::Dictionary,
            "pair" => NodeKind::Pair,
            "expression_list" | "pattern_list" => NodeKind::ExpressionList,
            "parenthesized_expression" => NodeKind::Parenthesized,
            "list_splat" | "list_splat_pattern" => NodeKind::ListSplat,
            "dictionary_splat" => NodeKind::DictionarySplat,

            "list_comprehension" => NodeKind::ListComp,
            "set_comprehension" => NodeKind::SetComp,
            "dictionary_comprehension" => NodeKind::DictComp,
            "generator_expression" => NodeKind::GeneratorExp,
            "for_in_clause" => NodeKind::ForInClause,
            "if_clause" => NodeKind::IfClause,

            "await" => NodeKind::Await,
            "lambda" => NodeKind::Lambda,

            "identifier" | "string" | "concatenated_string" | "integer" | "float" | "true"
            | "false" | "none" | "ellipsis" | "comment" => NodeKind::Leaf,

            "pass_statement" | "break_statement" | "continue_statement" | "import_statement"
            | "import_from_statement" | "future_import_statement" | "delete_statement"
            | "global_statement" | "nonlocal_statement" => NodeKind::NoOpStatement,

            _ => NodeKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kinds() {
        assert_eq!(NodeKind::from_kind("if_statement"), NodeKind::If);
        assert_eq!(NodeKind::from_kind("function_definition"), NodeKind::FunctionDef);
        assert_eq!(NodeKind::from_kind("except_group_clause"), NodeKind::ExceptClause);
        assert_eq!(NodeKind::from_kind("pass_statement"), NodeKind::NoOpStatement);
        assert_eq!(NodeKind::from_kind("string"), NodeKind::Leaf);
    }

    #[test]
    fn test_unknown_kind_falls_through() {
        assert_eq!(NodeKind::from_kind("match_statement"), NodeKind::Other);
        assert_eq!(NodeKind::from_kind("some_future_construct"), NodeKind::Other);
    }
}
