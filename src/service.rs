//! Query operations over the shared record store.
//!
//! Each operation acquires the dataset, validates its raw parameters,
//! filters and hands the view to the analysis modules. Parameters arrive
//! as the optional strings a request handler would see.

use crate::analysis::{
    self, analyze_tasks, automation_matrix, build_hierarchy, category_counts, distinct_count,
    extract_tasks, resolve_level, QuadrantEntry, RiskDistribution, ScalarStats, TaskAnalysis,
    TaxonomyNode, View,
};
use crate::error::{QueryError, QueryResult};
use crate::models::{Dataset, JobRecord, Task, TaxonomyLevel};
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Level used when a request names none.
pub const DEFAULT_LEVEL: TaxonomyLevel = TaxonomyLevel::Level4;

/// Pagination bounds applied to job listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_per_page: usize,
    pub max_per_page: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_per_page: 4,
            max_per_page: 100,
        }
    }
}

/// Category filter shared by most operations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub category: Option<String>,
    pub level: Option<String>,
}

/// Parameters of the job listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobsParams {
    pub category: Option<String>,
    pub level: Option<String>,
    pub fetch_all: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_jobs: usize,
    pub unique_level_4_categories: usize,
    pub sector_count: usize,
    pub avg_auto_score: f64,
    pub avg_manual_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub level: TaxonomyLevel,
    pub name: String,
    /// Distinct category names at this level.
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreOnly {
    pub auto_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub title: String,
    pub description: String,
    pub level: TaxonomyLevel,
    pub level_name: String,
    pub level_code: String,
    pub auto_score: f64,
    pub manual_score: f64,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPage {
    pub jobs: Vec<JobSummary>,
    pub page: usize,
    pub per_page: usize,
    pub has_more: bool,
    pub category_stats: ScalarStats,
}

/// Either the score-only list (`fetch_all`) or one page of jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobsResponse {
    Scores(Vec<ScoreOnly>),
    Page(JobPage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyDetail {
    pub level: TaxonomyLevel,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    pub title: String,
    pub description: String,
    pub sector: Option<String>,
    pub taxonomy: Vec<TaxonomyDetail>,
    pub auto_score: f64,
    pub manual_score: f64,
    pub tasks: Vec<Task>,
}

/// Read-only query façade over a record store.
pub struct QueryService {
    store: RecordStore,
    limits: PageLimits,
}

impl QueryService {
    pub fn new(store: RecordStore, limits: PageLimits) -> Self {
        Self { store, limits }
    }

    /// Load eagerly; returns whether data is available.
    pub fn warm_up(&self) -> bool {
        self.store.acquire().is_ok()
    }

    pub fn data_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    pub fn stats(&self) -> QueryResult<DatasetStats> {
        let dataset = self.store.acquire()?;
        let view = View::all(&dataset.records);
        let scalar = ScalarStats::from_records(&view);

        Ok(DatasetStats {
            total_jobs: scalar.total_jobs,
            unique_level_4_categories: distinct_count(&view, |r| {
                r.level_name(TaxonomyLevel::Level4)
            }),
            sector_count: distinct_count(&view, |r| r.sector.as_deref()),
            avg_auto_score: scalar.avg_auto_score,
            avg_manual_score: scalar.avg_manual_score,
        })
    }

    pub fn levels(&self) -> QueryResult<Vec<LevelInfo>> {
        let dataset = self.store.acquire()?;
        let view = View::all(&dataset.records);

        Ok(TaxonomyLevel::ALL
            .into_iter()
            .filter(|level| dataset.has_level(*level))
            .map(|level| LevelInfo {
                level,
                name: level.to_string(),
                count: distinct_count(&view, |r| r.level_name(level)),
            })
            .collect())
    }

    pub fn categories(&self, level: Option<&str>) -> QueryResult<Vec<analysis::CategoryCount>> {
        let dataset = self.store.acquire()?;
        let level = resolve_level(level, DEFAULT_LEVEL)?;
        if !dataset.has_level(level) {
            return Err(QueryError::InvalidLevel(level.number().to_string()));
        }

        Ok(category_counts(&View::all(&dataset.records), level))
    }

    pub fn risk_distribution(&self, params: &FilterParams) -> QueryResult<RiskDistribution> {
        let dataset = self.store.acquire()?;
        let view = filtered(&dataset, params.category.as_deref(), params.level.as_deref())?;
        Ok(RiskDistribution::from_records(&view))
    }

    pub fn jobs(&self, params: &JobsParams) -> QueryResult<JobsResponse> {
        let dataset = self.store.acquire()?;
        let level = resolve_level(params.level.as_deref(), DEFAULT_LEVEL)?;
        let view = filtered(&dataset, params.category.as_deref(), params.level.as_deref())?;

        if params.fetch_all.as_deref() == Some("true") {
            return Ok(JobsResponse::Scores(
                view.iter()
                    .map(|r| ScoreOnly {
                        auto_score: r.auto_score,
                    })
                    .collect(),
            ));
        }

        let page = parse_positive("page", params.page.as_deref(), 1)?;
        let per_page = parse_positive(
            "per_page",
            params.per_page.as_deref(),
            self.limits.default_per_page,
        )?
        .min(self.limits.max_per_page);

        let start = (page - 1).saturating_mul(per_page);
        let end = start.saturating_add(per_page);
        let jobs = view
            .get(start.min(view.len())..end.min(view.len()))
            .unwrap_or_default()
            .iter()
            .map(|r| job_summary(r, level))
            .collect();

        debug!(
            "Jobs page {} (per_page {}) of {} filtered records",
            page,
            per_page,
            view.len()
        );

        Ok(JobsResponse::Page(JobPage {
            jobs,
            page,
            per_page,
            has_more: end < view.len(),
            category_stats: ScalarStats::from_records(&view),
        }))
    }

    pub fn job_detail(&self, title: &str) -> QueryResult<JobDetail> {
        let dataset = self.store.acquire()?;
        let record = dataset
            .find_by_title(title)
            .ok_or_else(|| QueryError::NotFound(title.to_string()))?;

        Ok(JobDetail {
            title: record.title.clone(),
            description: record.description.clone(),
            sector: record.sector.clone(),
            taxonomy: TaxonomyLevel::ALL
                .into_iter()
                .map(|level| TaxonomyDetail {
                    level,
                    name: record.level_name(level).unwrap_or_default().to_string(),
                    code: record.level_code(level).unwrap_or_default().to_string(),
                })
                .collect(),
            auto_score: analysis::round1(record.auto_score),
            manual_score: analysis::round1(record.manual_score),
            tasks: record.tasks.clone(),
        })
    }

    pub fn task_analysis(&self, params: &FilterParams) -> QueryResult<TaskAnalysis> {
        let dataset = self.store.acquire()?;
        let view = filtered(&dataset, params.category.as_deref(), params.level.as_deref())?;
        Ok(analyze_tasks(&extract_tasks(&view)))
    }

    pub fn automation_matrix(&self, params: &FilterParams) -> QueryResult<Vec<QuadrantEntry>> {
        let dataset = self.store.acquire()?;
        let view = filtered(&dataset, params.category.as_deref(), params.level.as_deref())?;
        Ok(automation_matrix(&view))
    }

    pub fn hierarchy(&self) -> QueryResult<TaxonomyNode> {
        let dataset = self.store.acquire()?;
        Ok(build_hierarchy(&View::all(&dataset.records)))
    }
}

/// Resolve the level and select the matching records.
fn filtered<'a>(
    dataset: &'a Arc<Dataset>,
    category: Option<&str>,
    level: Option<&str>,
) -> QueryResult<View<'a>> {
    let level = resolve_level(level, DEFAULT_LEVEL)?;
    let category = category.filter(|c| !c.is_empty());
    if category.is_some() && !dataset.has_level(level) {
        return Err(QueryError::InvalidLevel(level.number().to_string()));
    }
    debug!("Filtering on {} = {:?}", level, category);
    Ok(analysis::filter(&dataset.records, level, category))
}

/// Parse a positive integer parameter, or use `default` when absent.
fn parse_positive(name: &'static str, raw: Option<&str>, default: usize) -> QueryResult<usize> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(QueryError::InvalidParameter {
            name,
            value: raw.to_string(),
        }),
    }
}

fn job_summary(record: &JobRecord, level: TaxonomyLevel) -> JobSummary {
    JobSummary {
        title: record.title.clone(),
        description: record.description.clone(),
        level,
        level_name: record.level_name(level).unwrap_or_default().to_string(),
        level_code: record.level_code(level).unwrap_or_default().to_string(),
        auto_score: analysis::round1(record.auto_score),
        manual_score: analysis::round1(record.manual_score),
        tasks: record.tasks.clone(),
    }
}
