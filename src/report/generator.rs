//! Markdown and JSON summary report generation.
//!
//! This module renders a one-shot overview of the loaded dataset:
//! headline statistics, the busiest categories, risk distribution, task
//! automation and the automation matrix.

use crate::analysis::{
    CategoryCount, Quadrant, QuadrantEntry, RiskDistribution, TaskAnalysis,
};
use crate::error::{QueryError, QueryResult};
use crate::service::{DatasetStats, FilterParams, LevelInfo, QueryService};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Categories listed in the report.
const TOP_CATEGORIES: usize = 10;

/// Metadata about the summary report.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryMetadata {
    /// Where the dataset was loaded from.
    pub data_source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
}

/// Number of level-4 categories in one quadrant.
#[derive(Debug, Clone, Serialize)]
pub struct QuadrantCount {
    pub quadrant: Quadrant,
    pub label: &'static str,
    pub categories: usize,
}

/// The complete dataset summary.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub metadata: SummaryMetadata,
    pub stats: DatasetStats,
    pub levels: Vec<LevelInfo>,
    pub top_categories: Vec<CategoryCount>,
    pub risk: RiskDistribution,
    pub tasks: TaskAnalysis,
    pub quadrants: Vec<QuadrantCount>,
    pub matrix: Vec<QuadrantEntry>,
}

/// Collect every section of the summary from the query service.
pub fn build_summary(service: &QueryService, data_source: &str) -> QueryResult<DatasetSummary> {
    let all = FilterParams::default();
    // Sources without a level 4 column have no categories to list.
    let mut top_categories = match service.categories(None) {
        Err(QueryError::InvalidLevel(_)) => Vec::new(),
        other => other?,
    };
    top_categories.truncate(TOP_CATEGORIES);

    let matrix = service.automation_matrix(&all)?;
    let quadrants = Quadrant::ALL
        .into_iter()
        .map(|quadrant| QuadrantCount {
            quadrant,
            label: quadrant.label(),
            categories: matrix.iter().filter(|e| e.quadrant == quadrant).count(),
        })
        .collect();

    Ok(DatasetSummary {
        metadata: SummaryMetadata {
            data_source: data_source.to_string(),
            generated_at: Utc::now(),
        },
        stats: service.stats()?,
        levels: service.levels()?,
        top_categories,
        risk: service.risk_distribution(&all)?,
        tasks: service.task_analysis(&all)?,
        quadrants,
        matrix,
    })
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(summary: &DatasetSummary) -> String {
    let mut output = String::new();

    output.push_str("# JobScope Dataset Summary\n\n");
    output.push_str(&generate_metadata_section(summary));
    output.push_str(&generate_levels_section(&summary.levels));
    output.push_str(&generate_categories_section(&summary.top_categories));
    output.push_str(&generate_risk_section(&summary.risk));
    output.push_str(&generate_tasks_section(&summary.tasks));
    output.push_str(&generate_matrix_section(&summary.quadrants, &summary.matrix));
    output.push_str("---\n\n*Report generated by JobScope*\n");

    output
}

fn generate_metadata_section(summary: &DatasetSummary) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str(&format!("- **Data Source:** `{}`\n", summary.metadata.data_source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        summary.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Jobs:** {}\n", summary.stats.total_jobs));
    section.push_str(&format!(
        "- **Level 4 Categories:** {}\n",
        summary.stats.unique_level_4_categories
    ));
    section.push_str(&format!("- **Sectors:** {}\n", summary.stats.sector_count));
    section.push_str(&format!(
        "- **Average Automation Score:** {:.1}\n",
        summary.stats.avg_auto_score
    ));
    section.push_str(&format!(
        "- **Average Manual Score:** {:.1}\n\n",
        summary.stats.avg_manual_score
    ));

    section
}

fn generate_levels_section(levels: &[LevelInfo]) -> String {
    if levels.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Taxonomy Levels\n\n");
    section.push_str("| Level | Categories |\n");
    section.push_str("|:---|:---:|\n");
    for level in levels {
        section.push_str(&format!("| {} | {} |\n", level.name, level.count));
    }
    section.push('\n');
    section
}

fn generate_categories_section(categories: &[CategoryCount]) -> String {
    let mut section = String::new();
    section.push_str("## Largest Categories\n\n");

    if categories.is_empty() {
        section.push_str("No level 4 categories in the dataset.\n\n");
        return section;
    }

    section.push_str("| Category | Jobs |\n");
    section.push_str("|:---|:---:|\n");
    for category in categories {
        section.push_str(&format!("| {} | {} |\n", category.name, category.count));
    }
    section.push('\n');
    section
}

fn generate_risk_section(risk: &RiskDistribution) -> String {
    let mut section = String::new();

    section.push_str("## Risk Distribution\n\n");
    section.push_str("| Low (<30) | Medium (30-60) | High (>=60) | **Total** |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | **{}** |\n\n",
        risk.low_risk, risk.medium_risk, risk.high_risk, risk.total
    ));

    section
}

fn generate_tasks_section(tasks: &TaskAnalysis) -> String {
    let mut section = String::new();
    section.push_str("## Task Automation\n\n");

    if tasks.total_tasks == 0 {
        section.push_str("No task analysis available.\n\n");
        return section;
    }

    section.push_str(&format!(
        "{} tasks across {} jobs ({:.1} per job): {} automatable, {} not automatable.\n\n",
        tasks.total_tasks,
        tasks.job_count,
        tasks.avg_tasks_per_job,
        tasks.automatable,
        tasks.non_automatable
    ));

    section.push_str("| Importance | Tasks | Automatable % |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for (name, count, pct) in [
        ("Primary", tasks.importance_counts.primary, tasks.automation_by_importance.primary),
        ("Secondary", tasks.importance_counts.secondary, tasks.automation_by_importance.secondary),
        ("Ancillary", tasks.importance_counts.ancillary, tasks.automation_by_importance.ancillary),
    ] {
        section.push_str(&format!("| {} | {} | {:.1} |\n", name, count, pct));
    }
    section.push('\n');

    for (title, reasons) in [
        ("Top Reasons: Automatable", &tasks.top_automatable_reasons),
        ("Top Reasons: Not Automatable", &tasks.top_non_automatable_reasons),
    ] {
        if reasons.is_empty() {
            continue;
        }
        section.push_str(&format!("### {}\n\n", title));
        for (i, reason) in reasons.iter().enumerate() {
            section.push_str(&format!("{}. {} ({})\n", i + 1, reason.reason, reason.count));
        }
        section.push('\n');
    }

    section
}

fn generate_matrix_section(quadrants: &[QuadrantCount], matrix: &[QuadrantEntry]) -> String {
    let mut section = String::new();
    section.push_str("## Automation Matrix\n\n");

    if matrix.is_empty() {
        section.push_str("No categories with task data.\n\n");
        return section;
    }

    section.push_str("| Quadrant | Categories |\n");
    section.push_str("|:---|:---:|\n");
    for q in quadrants {
        section.push_str(&format!("| {} | {} |\n", q.label, q.categories));
    }
    section.push('\n');

    section.push_str("| Category | Overall % | Primary % | Quadrant |\n");
    section.push_str("|:---|:---:|:---:|:---|\n");
    for entry in matrix {
        section.push_str(&format!(
            "| {} | {:.1} | {:.1} | {} |\n",
            entry.category, entry.overall_automation, entry.primary_automation, entry.label
        ));
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(summary: &DatasetSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}
