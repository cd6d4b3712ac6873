//! Size, Halstead, McCabe and maintainability metrics for Python fragments
//!
//! [`MetricCalculator::compute`] re-parses a fragment and runs four
//! analyzers over the same syntax tree, then normalizes their output into
//! a [`MetricVector`].

pub mod halstead;
pub mod maintainability;
pub mod mccabe;
pub mod raw;

use crate::models::{Fragment, MetricVector};
use crate::parsers::{python::parse_tree, ParseError};
use thiserror::Error;
use tracing::debug;

/// Errors raised while deriving metrics
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Failed to parse fragment: {0}")]
    Parse(#[from] ParseError),

    #[error("Fragment contains no function or class block to measure")]
    NoComplexityBlocks,
}

/// Stateless metric calculator
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricCalculator;

impl MetricCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Compute the metric vector of one fragment
    pub fn compute(&self, fragment: &Fragment) -> Result<MetricVector, MetricsError> {
        compute_text(&fragment.text)
    }
}

/// Compute metrics for arbitrary Python text
pub fn compute_text(text: &str) -> Result<MetricVector, MetricsError> {
    let tree = parse_tree(text)?;
    let root = tree.root_node();

    let raw = raw::analyze(root, text);
    let halstead = halstead::analyze(root, text);
    let complexity = mccabe::analyze(root, text);

    let mean_complexity = complexity
        .mean_complexity()
        .ok_or(MetricsError::NoComplexityBlocks)?;

    // Zero difficulty (no operands) would zero out intelligence
    let difficulty = if halstead.difficulty == 0.0 {
        1.0
    } else {
        halstead.difficulty
    };

    let maintainability = maintainability::index(
        halstead.volume,
        complexity.total_complexity as f64,
        raw.lloc,
        raw.comments,
        raw.sloc,
    );

    debug!(
        "Metrics: sloc={} volume={:.2} complexity={:.2} mi={:.2}",
        raw.sloc, halstead.volume, mean_complexity, maintainability
    );

    Ok(MetricVector {
        total_lines: raw.loc,
        total_lines_of_code: raw.loc,
        lines_of_code: raw.sloc,
        logical_lines_of_code: raw.lloc,
        comments: raw.comments,
        single_comments: raw.single_comments,
        multi_comments: raw.multi,
        blanks: raw.blank,
        unique_operators: halstead.h1,
        unique_operands: halstead.h2,
        total_operators: halstead.n1,
        total_operands: halstead.n2,
        vocabulary: halstead.vocabulary(),
        length: halstead.length(),
        program_length: halstead.length(),
        calculated_length: halstead.calculated_length(),
        volume: halstead.volume,
        difficulty,
        intelligence: halstead.volume / difficulty,
        effort: halstead.effort(),
        bugs: halstead.bugs(),
        time: halstead.time(),
        complexity: mean_complexity,
        maintainability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FragmentKind;

    fn fragment(kind: FragmentKind, text: &str) -> Fragment {
        Fragment {
            kind,
            text: text.to_string(),
            start_line: 1,
            end_line: text.lines().count() as u32,
        }
    }

    #[test]
    fn test_difficulty_clamped_when_no_operators() {
        let metrics = MetricCalculator::new()
            .compute(&fragment(FragmentKind::Function, "def f():\n    pass"))
            .unwrap();

        assert_eq!(metrics.unique_operators, 0);
        assert_eq!(metrics.difficulty, 1.0);
        assert_eq!(metrics.volume, 0.0);
        assert_eq!(metrics.intelligence, 0.0);
        assert_eq!(metrics.complexity, 1.0);
        assert_eq!(metrics.maintainability, 100.0);
    }

    #[test]
    fn test_simple_function_vector() {
        let text = "def add(a, b):\n    # sum\n    return a + b";
        let metrics = MetricCalculator::new()
            .compute(&fragment(FragmentKind::Function, text))
            .unwrap();

        assert_eq!(metrics.total_lines, 3);
        assert_eq!(metrics.total_lines_of_code, 3);
        assert_eq!(metrics.lines_of_code, 2);
        assert_eq!(metrics.single_comments, 1);
        assert_eq!(metrics.comments, 1);
        assert_eq!(metrics.unique_operators, 1);
        assert_eq!(metrics.unique_operands, 2);
        assert_eq!(metrics.total_operators, 1);
        assert_eq!(metrics.total_operands, 2);
        assert_eq!(metrics.vocabulary, 3);
        assert_eq!(metrics.length, 3);
        assert_eq!(metrics.program_length, 3);
        assert!((metrics.volume - 3.0 * 3f64.log2()).abs() < 1e-9);
        assert!((metrics.difficulty - 0.5).abs() < 1e-9);
        assert!(metrics.maintainability > 0.0 && metrics.maintainability <= 100.0);
    }

    #[test]
    fn test_class_complexity_is_reported_value() {
        let text = "class A:\n    def one(self, x):\n        if x:\n            return 1\n        return 0\n\n    def two(self):\n        return 2";
        let metrics = MetricCalculator::new()
            .compute(&fragment(FragmentKind::Class, text))
            .unwrap();

        // real = 1 + 2 + 1 = 4, two methods: floor(4 / 2) + 1
        assert_eq!(metrics.complexity, 3.0);
    }

    #[test]
    fn test_indented_method_fragment_parses() {
        let text = "def method(self):\n        if self.x:\n            return 1\n        return 2";
        let metrics = compute_text(text).unwrap();
        assert_eq!(metrics.complexity, 2.0);
    }

    #[test]
    fn test_no_blocks_is_an_error() {
        let result = compute_text("x = 1 + 2\n");
        assert!(matches!(result, Err(MetricsError::NoComplexityBlocks)));
    }

    #[test]
    fn test_unparsable_fragment_is_an_error() {
        let result = compute_text("def f(:\n    pass");
        assert!(matches!(result, Err(MetricsError::Parse(_))));
    }

    #[test]
    fn test_all_fields_finite_and_non_negative() {
        let text = r#"def process(items, limit=10):
    """Process items.

    Returns totals.
    """
    total = 0
    for item in items:
        if item > limit and not item.skip:
            total += item.value * 2
        elif item < 0:
            total -= 1
    return [t for t in range(total) if t % 2 == 0]"#;
        let m = compute_text(text).unwrap();

        for value in [
            m.calculated_length,
            m.volume,
            m.difficulty,
            m.intelligence,
            m.effort,
            m.bugs,
            m.time,
            m.complexity,
            m.maintainability,
        ] {
            assert!(value.is_finite());
            assert!(value >= 0.0);
        }
        assert_eq!(m.multi_comments, 4);
    }
}
