//! Raw line counts (loc, sloc, lloc, comments, docstrings, blanks)

use crate::parsers::children;
use std::collections::HashSet;
use tree_sitter::Node;

/// Line counts for one piece of source text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawCounts {
    /// Physical lines
    pub loc: usize,
    /// Logical lines (statements and clause headers)
    pub lloc: usize,
    /// Source lines: loc minus blanks, docstring lines and comment-only lines
    pub sloc: usize,
    /// Lines holding at least one comment token
    pub comments: usize,
    /// Lines covered by string-expression statements
    pub multi: usize,
    pub blank: usize,
    /// Lines holding nothing but a comment
    pub single_comments: usize,
}

/// Clause nodes that tree-sitter does not name `*_statement` but that
/// still open a logical line.
const LOGICAL_CLAUSES: &[&str] = &[
    "function_definition",
    "class_definition",
    "decorator",
    "elif_clause",
    "else_clause",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "case_clause",
];

fn is_logical_line(kind: &str) -> bool {
    kind.ends_with("_statement") || LOGICAL_CLAUSES.contains(&kind)
}

fn is_string_statement(node: Node) -> bool {
    if node.kind() != "expression_statement" {
        return false;
    }
    let parts = children(node);
    !parts.is_empty()
        && parts
            .iter()
            .all(|child| matches!(child.kind(), "string" | "concatenated_string"))
}

/// Count raw line metrics over a parsed tree
pub fn analyze(root: Node, source: &str) -> RawCounts {
    let lines: Vec<&str> = source.lines().collect();

    let mut lloc = 0;
    let mut docstring_rows: HashSet<usize> = HashSet::new();
    let mut comment_rows: HashSet<usize> = HashSet::new();
    let mut comment_only_rows: HashSet<usize> = HashSet::new();

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let kind = node.kind();

        if is_logical_line(kind) {
            lloc += 1;
        }

        if is_string_statement(node) {
            docstring_rows.extend(node.start_position().row..=node.end_position().row);
            continue;
        }

        if kind == "comment" {
            let position = node.start_position();
            comment_rows.insert(position.row);
            let prefix = lines
                .get(position.row)
                .and_then(|line| line.get(..position.column))
                .unwrap_or("");
            if prefix.trim().is_empty() {
                comment_only_rows.insert(position.row);
            }
            continue;
        }

        stack.extend(children(node));
    }

    let blank = lines
        .iter()
        .enumerate()
        .filter(|(row, line)| line.trim().is_empty() && !docstring_rows.contains(row))
        .count();

    // Docstring lines already count as multi
    let single_comments = comment_only_rows
        .iter()
        .filter(|row| !docstring_rows.contains(row))
        .count();

    let loc = lines.len();
    let multi = docstring_rows.iter().filter(|row| **row < loc).count();
    let sloc = loc
        .saturating_sub(blank)
        .saturating_sub(multi)
        .saturating_sub(single_comments);

    RawCounts {
        loc,
        lloc,
        sloc,
        comments: comment_rows.len(),
        multi,
        blank,
        single_comments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::python::parse_tree;

    fn counts(source: &str) -> RawCounts {
        let tree = parse_tree(source).expect("should parse");
        analyze(tree.root_node(), source)
    }

    #[test]
    fn test_plain_function() {
        let raw = counts("def f(x):\n    y = x * 2\n    return y");
        assert_eq!(raw.loc, 3);
        assert_eq!(raw.sloc, 3);
        assert_eq!(raw.lloc, 3);
        assert_eq!(raw.blank, 0);
        assert_eq!(raw.comments, 0);
    }

    #[test]
    fn test_comments_and_blanks() {
        let source = "def f(x):\n    # leading\n\n    y = x  # trailing\n    return y";
        let raw = counts(source);
        assert_eq!(raw.loc, 5);
        assert_eq!(raw.comments, 2);
        assert_eq!(raw.single_comments, 1);
        assert_eq!(raw.blank, 1);
        assert_eq!(raw.sloc, 3);
    }

    #[test]
    fn test_docstring_lines_are_multi() {
        let source = "class A:\n    \"\"\"Docs.\n\n    More docs.\n    \"\"\"\n    x = 1";
        let raw = counts(source);
        assert_eq!(raw.loc, 6);
        assert_eq!(raw.multi, 4);
        // The blank line inside the docstring is not a blank line
        assert_eq!(raw.blank, 0);
        assert_eq!(raw.sloc, 2);
    }

    #[test]
    fn test_clause_headers_are_logical_lines() {
        let source = "def f(x):\n    try:\n        g()\n    except ValueError:\n        pass\n    else:\n        h()\n    finally:\n        done()";
        let raw = counts(source);
        // def, try, g(), except, pass, else, h(), finally, done()
        assert_eq!(raw.lloc, 9);
    }

    #[test]
    fn test_hash_inside_string_is_not_a_comment() {
        let raw = counts("def f():\n    return '# not a comment'");
        assert_eq!(raw.comments, 0);
        assert_eq!(raw.single_comments, 0);
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(counts(""), RawCounts::default());
    }
}
