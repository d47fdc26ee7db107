//! AST acquisition: read one Python file and parse it into a syntax tree.

use std::fs;
use std::path::Path;

use tree_sitter::Parser;

use crate::error::AnalysisError;

/// A parsed source file: the tree plus the bytes it indexes into.
#[derive(Debug)]
pub struct ParsedSource {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The decoded source (kept for node text extraction and line
    /// accounting).
    pub source: Vec<u8>,
    /// The file path, for reporting.
    pub path: String,
}

impl ParsedSource {
    /// Get the source as a string slice.
    pub fn source_str(&self) -> &str {
        std::str::from_utf8(&self.source).unwrap_or("")
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Total line count. A file ending in `\n` counts a final empty line.
    pub fn total_lines(&self) -> usize {
        self.source_str().split('\n').count()
    }
}

/// Read a file leniently: bytes that do not decode as UTF-8 are replaced
/// rather than failing the file, so a stray mis-encoded literal cannot
/// take a whole analysis run down with it.
pub fn read_source(path: &Path) -> Result<Vec<u8>, AnalysisError> {
    let raw = fs::read(path)?;
    match String::from_utf8(raw) {
        Ok(text) => Ok(text.into_bytes()),
        Err(err) => Ok(String::from_utf8_lossy(err.as_bytes())
            .into_owned()
            .into_bytes()),
    }
}

/// Parse Python source. A tree containing error nodes counts as rejected:
/// the malformed file surfaces as a per-file [`AnalysisError::Parse`] and
/// the rest of the batch continues.
pub fn parse(path: &Path, source: Vec<u8>) -> Result<ParsedSource, AnalysisError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_python::LANGUAGE.into())?;

    let tree = parser
        .parse(&source, None)
        .ok_or(AnalysisError::Parse { line: 1 })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(AnalysisError::Parse {
            line: first_error_line(root),
        });
    }

    Ok(ParsedSource {
        tree,
        source,
        path: path.to_string_lossy().to_string(),
    })
}

/// Find the line of the first error or missing node in the tree.
fn first_error_line(node: tree_sitter::Node) -> usize {
    if node.is_error() || node.is_missing() {
        return node.start_position().row + 1;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            return first_error_line(child);
        }
    }
    node.start_position().row + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_source() {
        let source = b"def hello():\n    return 1\n".to_vec();
        let parsed = parse(Path::new("test.py"), source).unwrap();
        assert_eq!(parsed.tree.root_node().kind(), "module");
        assert_eq!(parsed.total_lines(), 3);
    }

    #[test]
    fn test_parse_invalid_source() {
        let source = b"def broken(:\n    pass\n".to_vec();
        let err = parse(Path::new("test.py"), source).unwrap_err();
        match err {
            AnalysisError::Parse { line } => assert_eq!(line, 1),
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_total_lines_counts_trailing_newline() {
        let parsed = parse(Path::new("test.py"), b"x = 1\n".to_vec()).unwrap();
        assert_eq!(parsed.total_lines(), 2);
    }

    #[test]
    fn test_read_source_tolerates_bad_encoding() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("latin1.py");
        // A latin-1 encoded comment; the file itself is valid Python.
        std::fs::write(&path, b"# caf\xe9\ndef f():\n    pass\n").unwrap();

        let source = read_source(&path).unwrap();
        let parsed = parse(&path, source).unwrap();
        assert_eq!(parsed.tree.root_node().kind(), "module");
        assert!(!parsed.tree.root_node().has_error());
    }
}
