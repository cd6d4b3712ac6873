//! Source code parsing using tree-sitter
//!
//! Parses Python source into a syntax tree and extracts the class and
//! function definitions that the scoring pipeline works on.

pub mod python;

pub use python::{entity_name, extract_file, parse, ParsedSource};

use std::path::PathBuf;
use thiserror::Error;
use tree_sitter::Node;

/// Errors raised while reading or parsing source text
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to set Python language: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("Parser produced no syntax tree")]
    NoTree,

    #[error("Syntax error at line {line}")]
    Syntax { line: usize },
}

/// Collect the direct children of a node
pub(crate) fn children<'tree>(node: Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Source text covered by a node ("" for non UTF-8 slices)
pub(crate) fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}
