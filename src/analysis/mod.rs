//! Analysis modules.
//!
//! Filtering, aggregation, task cross-tabulation, taxonomy roll-ups and
//! the automation matrix. Everything here is pure: inputs are borrowed
//! from the shared dataset and outputs are fresh values.

pub mod aggregator;
pub mod filter;
pub mod matrix;
pub mod rollup;
pub mod tasks;

pub use aggregator::*;
pub use filter::{filter, resolve_level, View};
pub use matrix::{automation_matrix, Quadrant, QuadrantEntry};
pub use rollup::{build_hierarchy, TaxonomyNode};
pub use tasks::{analyze_tasks, extract_tasks, TaskAnalysis};

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / whole * 100`, rounded to one decimal; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round1(part as f64 / whole as f64 * 100.0)
}

/// Arithmetic mean rounded to one decimal; 0 for an empty input.
pub fn mean1(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return 0.0;
    }
    round1(sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round1() {
        assert_eq!(round1(60.0), 60.0);
        assert_eq!(round1(66.66666), 66.7);
        assert_eq!(round1(12.34), 12.3);
    }

    #[test]
    fn test_percentage_guards_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 2), 100.0);
    }

    #[test]
    fn test_mean1_of_empty_is_zero() {
        assert_eq!(mean1(std::iter::empty()), 0.0);
        assert_eq!(mean1([1.0, 2.0].into_iter()), 1.5);
    }
}
