//! Record-level aggregation and statistics.
//!
//! Scalar score statistics, per-category counts and risk buckets over a
//! filtered view.

use super::mean1;
use crate::models::{JobRecord, TaxonomyLevel};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Upper bound (exclusive) of the low-risk bucket.
pub const LOW_RISK_CEILING: f64 = 30.0;

/// Lower bound (inclusive) of the high-risk bucket.
pub const HIGH_RISK_FLOOR: f64 = 60.0;

/// Job count and mean scores of a view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalarStats {
    pub total_jobs: usize,
    pub avg_auto_score: f64,
    pub avg_manual_score: f64,
}

impl ScalarStats {
    pub fn from_records(records: &[&JobRecord]) -> Self {
        Self {
            total_jobs: records.len(),
            avg_auto_score: mean1(records.iter().map(|r| r.auto_score)),
            avg_manual_score: mean1(records.iter().map(|r| r.manual_score)),
        }
    }
}

/// Number of records sharing one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Count records per distinct name at `level`, most frequent first.
///
/// Ties keep first-encountered order. Records without a name at that
/// level are not counted.
pub fn category_counts(records: &[&JobRecord], level: TaxonomyLevel) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for name in records.iter().filter_map(|r| r.level_name(level)) {
        match index.get(name) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(name, counts.len());
                counts.push(CategoryCount {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by_key(|c| std::cmp::Reverse(c.count));
    counts
}

/// Number of distinct non-empty values produced by `key`.
pub fn distinct_count<'a>(
    records: &[&'a JobRecord],
    key: impl Fn(&'a JobRecord) -> Option<&'a str>,
) -> usize {
    records
        .iter()
        .filter_map(|r| key(*r))
        .collect::<HashSet<_>>()
        .len()
}

/// Risk bucket of an automation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

impl RiskBucket {
    /// Closed-open bins: `[.., 30)`, `[30, 60)`, `[60, ..]`.
    pub fn classify(score: f64) -> Self {
        if score < LOW_RISK_CEILING {
            RiskBucket::Low
        } else if score < HIGH_RISK_FLOOR {
            RiskBucket::Medium
        } else {
            RiskBucket::High
        }
    }
}

/// Counts of records per risk bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    pub low_risk: usize,
    pub medium_risk: usize,
    pub high_risk: usize,
    pub total: usize,
}

impl RiskDistribution {
    pub fn from_records(records: &[&JobRecord]) -> Self {
        let mut dist = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            match RiskBucket::classify(record.auto_score) {
                RiskBucket::Low => dist.low_risk += 1,
                RiskBucket::Medium => dist.medium_risk += 1,
                RiskBucket::High => dist.high_risk += 1,
            }
        }

        dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaxonomyEntry;

    fn create_test_record(l4: Option<&str>, auto_score: f64, manual_score: f64) -> JobRecord {
        let mut taxonomy: [TaxonomyEntry; 4] = Default::default();
        taxonomy[3].name = l4.map(String::from);
        JobRecord {
            title: "job".to_string(),
            description: String::new(),
            taxonomy,
            auto_score,
            manual_score,
            sector: None,
            tasks: Vec::new(),
        }
    }

    #[test]
    fn test_scalar_stats() {
        let records = vec![
            create_test_record(Some("A"), 10.0, 20.0),
            create_test_record(Some("A"), 15.0, 25.0),
            create_test_record(Some("B"), 20.55, 30.0),
        ];
        let view: Vec<&JobRecord> = records.iter().collect();
        let stats = ScalarStats::from_records(&view);

        assert_eq!(stats.total_jobs, 3);
        assert_eq!(stats.avg_auto_score, 15.2);
        assert_eq!(stats.avg_manual_score, 25.0);
    }

    #[test]
    fn test_scalar_stats_of_empty_view_are_zero() {
        let stats = ScalarStats::from_records(&[]);
        assert_eq!(stats.total_jobs, 0);
        assert_eq!(stats.avg_auto_score, 0.0);
        assert_eq!(stats.avg_manual_score, 0.0);
    }

    #[test]
    fn test_category_counts_descending_with_stable_ties() {
        let mut records = Vec::new();
        // Encounter order: A, C, B. Counts: A=3, B=5, C=3.
        for name in ["A", "C", "B", "A", "B", "C", "B", "A", "B", "C", "B"] {
            records.push(create_test_record(Some(name), 50.0, 50.0));
        }
        records.push(create_test_record(None, 50.0, 50.0));
        let view: Vec<&JobRecord> = records.iter().collect();

        let counts = category_counts(&view, TaxonomyLevel::Level4);
        let names: Vec<_> = counts.iter().map(|c| (c.name.as_str(), c.count)).collect();
        assert_eq!(names, vec![("B", 5), ("A", 3), ("C", 3)]);
    }

    #[test]
    fn test_distinct_count_skips_missing() {
        let records = vec![
            create_test_record(Some("A"), 1.0, 1.0),
            create_test_record(Some("A"), 1.0, 1.0),
            create_test_record(Some("B"), 1.0, 1.0),
            create_test_record(None, 1.0, 1.0),
        ];
        let view: Vec<&JobRecord> = records.iter().collect();
        assert_eq!(
            distinct_count(&view, |r| r.level_name(TaxonomyLevel::Level4)),
            2
        );
    }

    #[test]
    fn test_risk_bucket_boundaries() {
        assert_eq!(RiskBucket::classify(29.9), RiskBucket::Low);
        assert_eq!(RiskBucket::classify(30.0), RiskBucket::Medium);
        assert_eq!(RiskBucket::classify(59.99), RiskBucket::Medium);
        assert_eq!(RiskBucket::classify(60.0), RiskBucket::High);
        assert_eq!(RiskBucket::classify(0.0), RiskBucket::Low);
        assert_eq!(RiskBucket::classify(100.0), RiskBucket::High);
    }

    #[test]
    fn test_risk_distribution_sums_to_total() {
        let records: Vec<JobRecord> = [0.0, 29.9, 30.0, 45.0, 60.0, 99.0, 12.0]
            .into_iter()
            .map(|s| create_test_record(Some("A"), s, 0.0))
            .collect();
        let view: Vec<&JobRecord> = records.iter().collect();
        let dist = RiskDistribution::from_records(&view);

        assert_eq!(dist.low_risk, 3);
        assert_eq!(dist.medium_risk, 2);
        assert_eq!(dist.high_risk, 2);
        assert_eq!(
            dist.low_risk + dist.medium_risk + dist.high_risk,
            dist.total
        );
    }
}
