//! Taxonomy-level filtering of the record store.

use crate::error::{QueryError, QueryResult};
use crate::models::{JobRecord, TaxonomyLevel};
use std::ops::Deref;

/// A borrowed selection of records, in store order.
#[derive(Debug, Clone, Default)]
pub struct View<'a> {
    records: Vec<&'a JobRecord>,
}

impl<'a> View<'a> {
    /// View over every record.
    pub fn all(records: &'a [JobRecord]) -> Self {
        Self {
            records: records.iter().collect(),
        }
    }
}

impl<'a> Deref for View<'a> {
    type Target = [&'a JobRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl<'a> FromIterator<&'a JobRecord> for View<'a> {
    fn from_iter<I: IntoIterator<Item = &'a JobRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Select records whose name at `level` equals `category` exactly.
///
/// An absent or empty category selects everything.
pub fn filter<'a>(
    records: &'a [JobRecord],
    level: TaxonomyLevel,
    category: Option<&str>,
) -> View<'a> {
    match category.filter(|c| !c.is_empty()) {
        None => View::all(records),
        Some(category) => records
            .iter()
            .filter(|r| r.level_name(level) == Some(category))
            .collect(),
    }
}

/// Parse a caller-supplied level, falling back to `default` when absent.
pub fn resolve_level(raw: Option<&str>, default: TaxonomyLevel) -> QueryResult<TaxonomyLevel> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| QueryError::InvalidLevel(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaxonomyEntry;

    fn record(title: &str, l1: &str, l4: &str) -> JobRecord {
        JobRecord {
            title: title.to_string(),
            description: String::new(),
            taxonomy: [
                TaxonomyEntry::new(l1, "1"),
                TaxonomyEntry::default(),
                TaxonomyEntry::default(),
                TaxonomyEntry::new(l4, "4"),
            ],
            auto_score: 50.0,
            manual_score: 50.0,
            sector: None,
            tasks: Vec::new(),
        }
    }

    fn records() -> Vec<JobRecord> {
        vec![
            record("a", "Services", "Clerks"),
            record("b", "Industry", "Operators"),
            record("c", "Services", "Clerks Senior"),
            record("d", "Services", "Clerks"),
        ]
    }

    #[test]
    fn test_no_category_selects_all() {
        let records = records();
        assert_eq!(filter(&records, TaxonomyLevel::Level4, None).len(), 4);
        assert_eq!(filter(&records, TaxonomyLevel::Level4, Some("")).len(), 4);
    }

    #[test]
    fn test_exact_match_only() {
        let records = records();
        let view = filter(&records, TaxonomyLevel::Level4, Some("Clerks"));
        let titles: Vec<_> = view.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "d"]);

        assert!(filter(&records, TaxonomyLevel::Level4, Some("clerks")).is_empty());
        assert!(filter(&records, TaxonomyLevel::Level4, Some("Clerk")).is_empty());
    }

    #[test]
    fn test_filter_by_other_level() {
        let records = records();
        let view = filter(&records, TaxonomyLevel::Level1, Some("Services"));
        assert_eq!(view.len(), 3);
        assert!(filter(&records, TaxonomyLevel::Level2, Some("Services")).is_empty());
    }

    #[test]
    fn test_resolve_level() {
        assert_eq!(
            resolve_level(None, TaxonomyLevel::Level4),
            Ok(TaxonomyLevel::Level4)
        );
        assert_eq!(
            resolve_level(Some("2"), TaxonomyLevel::Level4),
            Ok(TaxonomyLevel::Level2)
        );
        assert_eq!(
            resolve_level(Some("7"), TaxonomyLevel::Level4),
            Err(QueryError::InvalidLevel("7".to_string()))
        );
    }
}
