//! Task-level extraction and classification cross-tabulation.

use super::{percentage, round1};
use crate::models::{Importance, JobRecord, Task};
use serde::Serialize;
use std::collections::HashMap;

/// Number of reason codes reported per automation subset.
pub const TOP_REASONS: usize = 10;

/// Flat task table of a view, with the job count it was drawn from.
#[derive(Debug, Clone, Default)]
pub struct TaskTable<'a> {
    pub tasks: Vec<&'a Task>,
    pub job_count: usize,
}

/// Concatenate every record's tasks, in record order.
pub fn extract_tasks<'a>(records: &[&'a JobRecord]) -> TaskTable<'a> {
    TaskTable {
        tasks: records.iter().copied().flat_map(|r| r.tasks.iter()).collect(),
        job_count: records.len(),
    }
}

/// One value per fixed importance class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ImportanceBreakdown<T> {
    pub primary: T,
    pub secondary: T,
    pub ancillary: T,
}

impl<T> ImportanceBreakdown<T> {
    pub fn get(&self, importance: Importance) -> &T {
        match importance {
            Importance::Primary => &self.primary,
            Importance::Secondary => &self.secondary,
            Importance::Ancillary => &self.ancillary,
        }
    }

    pub fn get_mut(&mut self, importance: Importance) -> &mut T {
        match importance {
            Importance::Primary => &mut self.primary,
            Importance::Secondary => &mut self.secondary,
            Importance::Ancillary => &mut self.ancillary,
        }
    }
}

/// Occurrences of a normalized reason code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonCount {
    pub reason: String,
    pub count: usize,
}

/// Automation and importance cross-tab over a task table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskAnalysis {
    pub job_count: usize,
    pub total_tasks: usize,
    pub avg_tasks_per_job: f64,
    pub automatable: usize,
    pub non_automatable: usize,
    /// Tasks per importance class; unrecognized classes are left out.
    pub importance_counts: ImportanceBreakdown<usize>,
    /// Automatable share of each class, in percent.
    pub automation_by_importance: ImportanceBreakdown<f64>,
    pub top_automatable_reasons: Vec<ReasonCount>,
    pub top_non_automatable_reasons: Vec<ReasonCount>,
}

/// Compute the cross-tab. An empty table yields an all-zero analysis.
pub fn analyze_tasks(table: &TaskTable<'_>) -> TaskAnalysis {
    let total_tasks = table.tasks.len();
    let automatable = table.tasks.iter().filter(|t| t.is_automatable()).count();

    let mut importance_counts = ImportanceBreakdown::<usize>::default();
    let mut automatable_by_class = ImportanceBreakdown::<usize>::default();
    for task in &table.tasks {
        if let Some(class) = task.importance() {
            *importance_counts.get_mut(class) += 1;
            if task.is_automatable() {
                *automatable_by_class.get_mut(class) += 1;
            }
        }
    }

    let mut automation_by_importance = ImportanceBreakdown::<f64>::default();
    for class in Importance::ALL {
        *automation_by_importance.get_mut(class) = percentage(
            *automatable_by_class.get(class),
            *importance_counts.get(class),
        );
    }

    let avg_tasks_per_job = if table.job_count == 0 {
        0.0
    } else {
        round1(total_tasks as f64 / table.job_count as f64)
    };

    TaskAnalysis {
        job_count: table.job_count,
        total_tasks,
        avg_tasks_per_job,
        automatable,
        non_automatable: total_tasks - automatable,
        importance_counts,
        automation_by_importance,
        top_automatable_reasons: top_reasons(
            table.tasks.iter().filter(|t| t.is_automatable()).copied(),
            TOP_REASONS,
        ),
        top_non_automatable_reasons: top_reasons(
            table.tasks.iter().filter(|t| !t.is_automatable()).copied(),
            TOP_REASONS,
        ),
    }
}

/// Most frequent normalized reason codes, ties in first-seen order.
pub fn top_reasons<'a>(tasks: impl Iterator<Item = &'a Task>, n: usize) -> Vec<ReasonCount> {
    let mut counts: Vec<ReasonCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for code in tasks.flat_map(|t| t.question.iter()) {
        let reason = normalize_reason(code);
        if reason.is_empty() {
            continue;
        }
        match index.get(&reason) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(reason.clone(), counts.len());
                counts.push(ReasonCount { reason, count: 1 });
            }
        }
    }

    counts.sort_by_key(|c| std::cmp::Reverse(c.count));
    counts.truncate(n);
    counts
}

/// `repetitive_work` -> `Repetitive Work`.
pub fn normalize_reason(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut prev_alpha = false;

    for c in code.trim().chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}
