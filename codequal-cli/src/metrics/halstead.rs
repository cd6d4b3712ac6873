//! Halstead operator/operand counting
//!
//! Counts operators and operands of binary, unary, boolean, comparison and
//! augmented-assignment expressions over the whole tree. Operators are keyed
//! by token; unary tokens are kept apart from their binary homonyms, and an
//! augmented assignment shares the identity of its binary operator. Operands
//! are keyed by their source text.

use crate::parsers::{children, node_text};
use std::collections::HashSet;
use tree_sitter::Node;

/// Halstead totals for one piece of source text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HalsteadCounts {
    /// Distinct operators
    pub h1: usize,
    /// Distinct operands
    pub h2: usize,
    /// Total operators
    pub n1: usize,
    /// Total operands
    pub n2: usize,
    pub volume: f64,
    pub difficulty: f64,
}

impl HalsteadCounts {
    fn from_totals(h1: usize, h2: usize, n1: usize, n2: usize) -> Self {
        let vocabulary = h1 + h2;
        let length = n1 + n2;
        let volume = if vocabulary > 0 {
            length as f64 * (vocabulary as f64).log2()
        } else {
            0.0
        };
        let difficulty = if h2 > 0 {
            (h1 as f64 * n2 as f64) / (2.0 * h2 as f64)
        } else {
            0.0
        };
        Self {
            h1,
            h2,
            n1,
            n2,
            volume,
            difficulty,
        }
    }

    pub fn vocabulary(&self) -> usize {
        self.h1 + self.h2
    }

    pub fn length(&self) -> usize {
        self.n1 + self.n2
    }

    /// Estimated program length `h1·log2 h1 + h2·log2 h2`
    pub fn calculated_length(&self) -> f64 {
        if self.h1 == 0 || self.h2 == 0 {
            return 0.0;
        }
        let h1 = self.h1 as f64;
        let h2 = self.h2 as f64;
        h1 * h1.log2() + h2 * h2.log2()
    }

    pub fn effort(&self) -> f64 {
        self.difficulty * self.volume
    }

    /// Seconds to write, by the Stroud number 18
    pub fn time(&self) -> f64 {
        self.effort() / 18.0
    }

    pub fn bugs(&self) -> f64 {
        self.volume / 3000.0
    }
}

#[derive(Default)]
struct Tally<'s> {
    operators: HashSet<String>,
    operands: HashSet<&'s str>,
    total_operators: usize,
    total_operands: usize,
}

impl<'s> Tally<'s> {
    fn operator(&mut self, token: impl Into<String>) {
        self.total_operators += 1;
        self.operators.insert(token.into());
    }

    fn operand(&mut self, text: &'s str) {
        self.total_operands += 1;
        self.operands.insert(text);
    }
}

/// Count Halstead metrics over a parsed tree
pub fn analyze(root: Node, source: &str) -> HalsteadCounts {
    let mut tally = Tally::default();

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "binary_operator" => binary(node, source, &mut tally, None),
            "augmented_assignment" => {
                let op = field_text(node, "operator", source);
                binary(node, source, &mut tally, Some(op.trim_end_matches('=')));
            }
            "unary_operator" => {
                let op = field_text(node, "operator", source);
                tally.operator(format!("unary {op}"));
                if let Some(argument) = node.child_by_field_name("argument") {
                    tally.operand(node_text(argument, source));
                }
            }
            "not_operator" => {
                tally.operator("not");
                if let Some(argument) = node.child_by_field_name("argument") {
                    tally.operand(node_text(argument, source));
                }
            }
            "boolean_operator" => boolean_chain(node, source, &mut tally),
            "comparison_operator" => comparison(node, source, &mut tally),
            _ => {}
        }

        stack.extend(children(node));
    }

    HalsteadCounts::from_totals(
        tally.operators.len(),
        tally.operands.len(),
        tally.total_operators,
        tally.total_operands,
    )
}

fn field_text<'s>(node: Node, field: &str, source: &'s str) -> &'s str {
    node.child_by_field_name(field)
        .map(|child| node_text(child, source))
        .unwrap_or("")
}

fn binary<'s>(node: Node, source: &'s str, tally: &mut Tally<'s>, op: Option<&str>) {
    let op = op.unwrap_or_else(|| field_text(node, "operator", source));
    tally.operator(op);
    for field in ["left", "right"] {
        if let Some(side) = node.child_by_field_name(field) {
            tally.operand(node_text(side, source));
        }
    }
}

/// `a and b and c` nests left-deep in the tree but counts as one operator
/// over three operands.
fn boolean_chain<'s>(node: Node, source: &'s str, tally: &mut Tally<'s>) {
    let op = field_text(node, "operator", source);

    if let Some(parent) = node.parent() {
        let continues_parent = parent.kind() == "boolean_operator"
            && field_text(parent, "operator", source) == op
            && parent.child_by_field_name("left").map(|left| left.id()) == Some(node.id());
        if continues_parent {
            return;
        }
    }

    tally.operator(op);

    let mut operands = Vec::new();
    let mut current = node;
    loop {
        if let Some(right) = current.child_by_field_name("right") {
            operands.push(right);
        }
        match current.child_by_field_name("left") {
            Some(left)
                if left.kind() == "boolean_operator"
                    && field_text(left, "operator", source) == op =>
            {
                current = left;
            }
            Some(left) => {
                operands.push(left);
                break;
            }
            None => break,
        }
    }

    for operand in operands.into_iter().rev() {
        tally.operand(node_text(operand, source));
    }
}

/// `a < b <= c`: every operator token counts, every compared value is an
/// operand.
fn comparison<'s>(node: Node, source: &'s str, tally: &mut Tally<'s>) {
    for (index, child) in children(node).into_iter().enumerate() {
        if child.is_extra() {
            continue;
        }
        if node.field_name_for_child(index as u32) == Some("operators") {
            // `not in` / `is not` span two tokens
            let token = node_text(child, source).split_whitespace().collect::<Vec<_>>().join(" ");
            tally.operator(token);
        } else {
            tally.operand(node_text(child, source));
        }
    }
}
