//! Maintainability index (single-metric variant, 0-100)

/// Compute the maintainability index.
///
/// `comments` and `sloc` give the comment percentage; docstring lines are
/// not counted as comments. Degenerate inputs (no volume or no logical
/// lines) score a perfect 100.
pub fn index(volume: f64, complexity: f64, lloc: usize, comments: usize, sloc: usize) -> f64 {
    if volume <= 0.0 || lloc == 0 {
        return 100.0;
    }

    let comment_percent = if sloc == 0 {
        0.0
    } else {
        comments as f64 / sloc as f64 * 100.0
    };

    let unnormalized = 171.0 - 5.2 * volume.ln() - 0.23 * complexity - 16.2 * (lloc as f64).ln()
        + 50.0 * (2.46 * comment_percent.to_radians()).sqrt().sin();

    (unnormalized * 100.0 / 171.0).clamp(0.0, 100.0)
}
