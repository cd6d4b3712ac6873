//! Python fragment extraction using tree-sitter
//!
//! Walks the syntax tree in pre-order and emits every class and function
//! definition as a [`Fragment`]. The walk always descends into an emitted
//! node, so a class fragment and the fragments of its methods overlap.

use super::{children, ParseError};
use crate::models::{Fragment, FragmentKind};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tree_sitter::{Node, Parser, Tree};
use tracing::debug;

/// A parsed Python source file
pub struct ParsedSource {
    source: String,
    tree: Tree,
}

/// Parse Python source text, rejecting trees with syntax errors
pub fn parse(source: &str) -> Result<ParsedSource, ParseError> {
    let tree = parse_tree(source)?;
    Ok(ParsedSource {
        source: source.to_string(),
        tree,
    })
}

/// Read a file and extract the fragments of the requested kinds
pub fn extract_file(path: &Path, kinds: &[FragmentKind]) -> Result<Vec<Fragment>, ParseError> {
    let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse(&source)?;
    let fragments = parsed.extract(kinds);
    debug!(
        "Extracted {} fragments from {}",
        fragments.len(),
        path.display()
    );
    Ok(fragments)
}

/// Parse source into a tree-sitter tree; used by the metric analyzers too
pub(crate) fn parse_tree(source: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_python::LANGUAGE.into())?;

    let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(ParseError::Syntax {
            line: first_error_line(root),
        });
    }
    Ok(tree)
}

fn first_error_line(root: Node) -> usize {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return node.start_position().row + 1;
        }
        if node.has_error() {
            stack.extend(children(node).into_iter().rev());
        }
    }
    root.start_position().row + 1
}

fn fragment_kind(node_kind: &str) -> Option<FragmentKind> {
    match node_kind {
        "class_definition" => Some(FragmentKind::Class),
        // tree-sitter-python models `async def` as a function_definition too
        "function_definition" => Some(FragmentKind::Function),
        _ => None,
    }
}

impl ParsedSource {
    /// Source text the tree was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Collect fragments of the requested kinds in document order.
    ///
    /// Pre-order walk over an explicit stack: a matching node is emitted
    /// first, then its children are visited whether or not it matched.
    pub fn extract(&self, kinds: &[FragmentKind]) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        let mut stack = vec![self.tree.root_node()];

        while let Some(node) = stack.pop() {
            if let Some(kind) = fragment_kind(node.kind()).filter(|k| kinds.contains(k)) {
                let text = super::node_text(node, &self.source);
                if !text.is_empty() {
                    fragments.push(Fragment {
                        kind,
                        text: text.to_string(),
                        start_line: node.start_position().row as u32 + 1,
                        end_line: node.end_position().row as u32 + 1,
                    });
                }
            }

            // Reversed so the leftmost child is popped first
            stack.extend(children(node).into_iter().rev());
        }

        fragments
    }

    pub fn extract_classes(&self) -> Vec<Fragment> {
        self.extract(&[FragmentKind::Class])
    }

    pub fn extract_functions(&self) -> Vec<Fragment> {
        self.extract(&[FragmentKind::Function])
    }

    /// Classes and functions in a single pass (fragments overlap)
    pub fn extract_entities(&self) -> Vec<Fragment> {
        self.extract(&FragmentKind::ALL)
    }
}

fn class_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^class\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*(?:\(|:)").expect("valid regex")
    })
}

fn function_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:async\s+)?def\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\(").expect("valid regex")
    })
}

/// Recover the declared identifier from the start of a fragment.
///
/// Returns `None` when the declaration pattern does not match at offset 0.
pub fn entity_name(text: &str, kind: FragmentKind) -> Option<String> {
    let pattern = match kind {
        FragmentKind::Class => class_name_pattern(),
        FragmentKind::Function => function_name_pattern(),
    };
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
