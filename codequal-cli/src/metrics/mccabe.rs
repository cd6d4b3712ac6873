//! McCabe cyclomatic complexity per function, method and class block

use crate::parsers::children;
use tree_sitter::Node;

/// One measured unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexityBlock {
    pub name: String,
    pub complexity: u32,
    pub is_method: bool,
}

/// Result of a complexity pass over a module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexityReport {
    /// Top-level functions, then each class followed by its methods
    pub blocks: Vec<ComplexityBlock>,
    /// Module decisions + top-level functions + class real complexities
    pub total_complexity: u32,
}

impl ComplexityReport {
    /// Mean complexity of the blocks that are not methods
    pub fn mean_complexity(&self) -> Option<f64> {
        let values: Vec<u32> = self
            .blocks
            .iter()
            .filter(|block| !block.is_method)
            .map(|block| block.complexity)
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
    }
}

/// Decision points contributed by a single node
fn decision_weight(node: Node) -> u32 {
    match node.kind() {
        "if_statement" | "elif_clause" | "conditional_expression" => 1,
        "for_statement" | "while_statement" | "with_statement" => 1,
        "except_clause" | "except_group_clause" => 1,
        "for_in_clause" | "if_clause" => 1,
        "boolean_operator" | "case_clause" | "assert_statement" => 1,
        // Loop and try `else` branches; an if's `else` adds nothing
        "else_clause" => match node.parent().map(|p| p.kind()) {
            Some("for_statement" | "while_statement" | "try_statement") => 1,
            _ => 0,
        },
        _ => 0,
    }
}

fn is_definition(kind: &str) -> bool {
    matches!(kind, "function_definition" | "class_definition")
}

/// Sum the decisions under `nodes`, stopping at nested definitions, which
/// are returned in document order instead.
fn decisions_in<'t>(nodes: Vec<Node<'t>>) -> (u32, Vec<Node<'t>>) {
    let mut decisions = 0;
    let mut nested = Vec::new();

    let mut stack: Vec<Node<'t>> = nodes.into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if is_definition(node.kind()) {
            nested.push(node);
            continue;
        }
        decisions += decision_weight(node);
        stack.extend(children(node).into_iter().rev());
    }

    (decisions, nested)
}

fn body_children(node: Node) -> Vec<Node> {
    node.child_by_field_name("body")
        .map(children)
        .unwrap_or_default()
}

fn definition_name(node: Node, source: &str) -> String {
    node.child_by_field_name("name")
        .map(|name| crate::parsers::node_text(name, source).to_string())
        .unwrap_or_default()
}

/// Complexity of a function: 1 + decisions in its body. Nested functions
/// and classes are measured on their own and not added here.
fn function_complexity(node: Node) -> u32 {
    let (decisions, _nested) = decisions_in(body_children(node));
    1 + decisions
}

/// Measure the function and class blocks of a module
pub fn analyze(root: Node, source: &str) -> ComplexityReport {
    let (module_decisions, definitions) = decisions_in(children(root));

    let mut functions = Vec::new();
    let mut classes = Vec::new();
    let mut total = module_decisions;

    for definition in definitions {
        if definition.kind() == "function_definition" {
            let complexity = function_complexity(definition);
            total += complexity;
            functions.push(ComplexityBlock {
                name: definition_name(definition, source),
                complexity,
                is_method: false,
            });
        } else {
            let (real, methods) = class_complexity(definition);
            total += real;

            let method_count = methods.len() as u32;
            let reported = if method_count == 0 {
                real
            } else {
                real / method_count + u32::from(method_count > 1)
            };

            classes.push(ComplexityBlock {
                name: definition_name(definition, source),
                complexity: reported,
                is_method: false,
            });
            classes.extend(methods.into_iter().map(|(method, complexity)| ComplexityBlock {
                name: definition_name(method, source),
                complexity,
                is_method: true,
            }));
        }
    }

    functions.extend(classes);
    ComplexityReport {
        blocks: functions,
        total_complexity: total,
    }
}

/// Real complexity of a class (1 + body decisions + method complexities)
/// and its methods with their own complexities
fn class_complexity(node: Node) -> (u32, Vec<(Node, u32)>) {
    let (decisions, nested) = decisions_in(body_children(node));

    let methods: Vec<(Node, u32)> = nested
        .into_iter()
        .filter(|def| def.kind() == "function_definition")
        .map(|def| (def, function_complexity(def)))
        .collect();

    let real = 1 + decisions + methods.iter().map(|(_, c)| c).sum::<u32>();
    (real, methods)
}
