//! Automation matrix: level-4 categories placed on a 2x2 grid of overall
//! versus primary-task automation.

use super::percentage;
use super::tasks::extract_tasks;
use crate::models::{Importance, JobRecord, TaxonomyLevel};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Threshold, in percent, splitting both axes.
pub const QUADRANT_THRESHOLD: f64 = 50.0;

/// Position of a category on the automation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// Low overall, high primary automation.
    UpperLeft,
    /// High overall, high primary automation.
    UpperRight,
    /// Low overall, low primary automation.
    LowerLeft,
    /// High overall, low primary automation.
    LowerRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::UpperLeft,
        Quadrant::UpperRight,
        Quadrant::LowerLeft,
        Quadrant::LowerRight,
    ];

    pub fn classify(overall: f64, primary: f64) -> Self {
        match (overall >= QUADRANT_THRESHOLD, primary >= QUADRANT_THRESHOLD) {
            (false, true) => Quadrant::UpperLeft,
            (true, true) => Quadrant::UpperRight,
            (false, false) => Quadrant::LowerLeft,
            (true, false) => Quadrant::LowerRight,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::UpperLeft => "Niche",
            Quadrant::UpperRight => "High Risk",
            Quadrant::LowerLeft => "Safe",
            Quadrant::LowerRight => "Transformative",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Matrix placement of one level-4 category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadrantEntry {
    pub category: String,
    pub job_count: usize,
    pub total_tasks: usize,
    pub primary_tasks: usize,
    pub overall_automation: f64,
    pub primary_automation: f64,
    pub quadrant: Quadrant,
    pub label: &'static str,
}

/// Classify every level-4 category of the view that has tasks.
///
/// Categories appear in first-seen order. Percentages are rounded before
/// classification so the reported numbers agree with the quadrant.
pub fn automation_matrix(records: &[&JobRecord]) -> Vec<QuadrantEntry> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_category: HashMap<&str, Vec<&JobRecord>> = HashMap::new();

    for record in records.iter().copied() {
        let Some(name) = record.level_name(TaxonomyLevel::Level4) else {
            continue;
        };
        by_category
            .entry(name)
            .or_insert_with(|| {
                order.push(name);
                Vec::new()
            })
            .push(record);
    }

    order
        .into_iter()
        .filter_map(|name| classify_category(name, &by_category[name]))
        .collect()
}

fn classify_category(name: &str, records: &[&JobRecord]) -> Option<QuadrantEntry> {
    let table = extract_tasks(records);
    if table.tasks.is_empty() {
        return None;
    }

    let automatable = table.tasks.iter().filter(|t| t.is_automatable()).count();
    let primary: Vec<_> = table
        .tasks
        .iter()
        .filter(|t| t.importance() == Some(Importance::Primary))
        .collect();
    let primary_automatable = primary.iter().filter(|t| t.is_automatable()).count();

    let overall_automation = percentage(automatable, table.tasks.len());
    let primary_automation = percentage(primary_automatable, primary.len());
    let quadrant = Quadrant::classify(overall_automation, primary_automation);

    Some(QuadrantEntry {
        category: name.to_string(),
        job_count: table.job_count,
        total_tasks: table.tasks.len(),
        primary_tasks: primary.len(),
        overall_automation,
        primary_automation,
        quadrant,
        label: quadrant.label(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Task, TaxonomyEntry};

    fn task(automatable: bool, importance: &str) -> Task {
        Task {
            automatability_flag: if automatable { "Automatable" } else { "Not Automatable" }
                .to_string(),
            importance_classification: importance.to_string(),
            ..Task::default()
        }
    }

    fn record(l4: Option<&str>, tasks: Vec<Task>) -> JobRecord {
        let mut taxonomy: [TaxonomyEntry; 4] = Default::default();
        taxonomy[3].name = l4.map(String::from);
        JobRecord {
            title: "job".to_string(),
            description: String::new(),
            taxonomy,
            auto_score: 0.0,
            manual_score: 0.0,
            sector: None,
            tasks,
        }
    }

    /// `n` tasks of which `auto` are automatable.
    fn tasks(n: usize, auto: usize, importance: &str) -> Vec<Task> {
        (0..n).map(|i| task(i < auto, importance)).collect()
    }

    #[test]
    fn test_quadrant_classification() {
        assert_eq!(Quadrant::classify(70.0, 80.0), Quadrant::UpperRight);
        assert_eq!(Quadrant::classify(40.0, 30.0), Quadrant::LowerLeft);
        assert_eq!(Quadrant::classify(40.0, 50.0), Quadrant::UpperLeft);
        assert_eq!(Quadrant::classify(50.0, 49.9), Quadrant::LowerRight);
        assert_eq!(Quadrant::classify(90.0, 0.0), Quadrant::LowerRight);
    }

    #[test]
    fn test_matrix_entries() {
        // High risk: overall 70%, primary 80%.
        let mut high = tasks(5, 4, "Primary");
        high.extend(tasks(5, 3, "secondary"));
        // Safe: overall 40%, primary 30%.
        let mut safe = tasks(10, 3, "primary");
        safe.extend(tasks(5, 3, "ancillary"));
        // No primary tasks: overall 90%.
        let mut transformative = tasks(9, 9, "Secondary");
        transformative.push(task(false, "Ancillary"));

        let records = vec![
            record(Some("High"), high),
            record(Some("Safe"), safe),
            record(Some("Empty"), Vec::new()),
            record(Some("Transformative"), transformative),
            record(None, tasks(3, 3, "primary")),
        ];
        let view: Vec<&JobRecord> = records.iter().collect();
        let matrix = automation_matrix(&view);

        let summary: Vec<_> = matrix
            .iter()
            .map(|e| (e.category.as_str(), e.overall_automation, e.primary_automation, e.quadrant))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("High", 70.0, 80.0, Quadrant::UpperRight),
                ("Safe", 40.0, 30.0, Quadrant::LowerLeft),
                ("Transformative", 90.0, 0.0, Quadrant::LowerRight),
            ]
        );
        assert_eq!(matrix[2].primary_tasks, 0);
        assert_eq!(matrix[2].label, "Transformative");
    }

    #[test]
    fn test_categories_pool_their_jobs() {
        let records = vec![
            record(Some("A"), tasks(2, 2, "primary")),
            record(Some("B"), tasks(1, 0, "primary")),
            record(Some("A"), tasks(2, 0, "primary")),
        ];
        let view: Vec<&JobRecord> = records.iter().collect();
        let matrix = automation_matrix(&view);

        assert_eq!(matrix[0].category, "A");
        assert_eq!(matrix[0].job_count, 2);
        assert_eq!(matrix[0].total_tasks, 4);
        assert_eq!(matrix[0].overall_automation, 50.0);
        assert_eq!(matrix[0].quadrant, Quadrant::UpperRight);
        assert_eq!(matrix[1].quadrant, Quadrant::LowerLeft);
    }

    #[test]
    fn test_quadrant_serializes_snake_case() {
        let json = serde_json::to_string(&Quadrant::UpperLeft).unwrap();
        assert_eq!(json, "\"upper_left\"");
    }
}
