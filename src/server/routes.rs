use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::AppState;
use crate::analysis::{CategoryCount, QuadrantEntry, RiskDistribution, TaskAnalysis, TaxonomyNode};
use crate::error::{QueryError, QueryResult};
use crate::service::{
    DatasetStats, FilterParams, JobDetail, JobsParams, JobsResponse, LevelInfo, QueryService,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/levels", get(levels))
        .route("/api/categories", get(categories))
        .route("/api/risk_distribution", get(risk_distribution))
        .route("/api/jobs", get(jobs))
        .route("/api/job/{title}", get(job_detail))
        .route("/api/task_analysis", get(task_analysis))
        .route("/api/automation_matrix", get(automation_matrix))
        .route("/api/hierarchy", get(hierarchy))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LevelParams {
    level: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    data_loaded: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        data_loaded: state.service.data_loaded(),
    })
}

/// Run a query, moving it to the blocking pool while the dataset still
/// has to be read from its source.
async fn query<T, F>(state: AppState, op: F) -> Result<Json<T>, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&QueryService) -> QueryResult<T> + Send + 'static,
{
    if state.service.data_loaded() {
        return Ok(Json(op(&state.service)?));
    }

    let service = Arc::clone(&state.service);
    let result = tokio::task::spawn_blocking(move || op(&service))
        .await
        .map_err(|e| {
            warn!("Query task failed: {}", e);
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "Query task failed",
            )
        })?;
    Ok(Json(result?))
}

async fn stats(State(state): State<AppState>) -> Result<Json<DatasetStats>, ApiError> {
    query(state, |service| service.stats()).await
}

async fn levels(State(state): State<AppState>) -> Result<Json<Vec<LevelInfo>>, ApiError> {
    query(state, |service| service.levels()).await
}

async fn categories(
    State(state): State<AppState>,
    Query(params): Query<LevelParams>,
) -> Result<Json<Vec<CategoryCount>>, ApiError> {
    query(state, move |service| service.categories(params.level.as_deref())).await
}

async fn risk_distribution(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<RiskDistribution>, ApiError> {
    query(state, move |service| service.risk_distribution(&params)).await
}

async fn jobs(
    State(state): State<AppState>,
    Query(params): Query<JobsParams>,
) -> Result<Json<JobsResponse>, ApiError> {
    debug!("GET /api/jobs {:?}", params);
    query(state, move |service| service.jobs(&params)).await
}

async fn job_detail(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<JobDetail>, ApiError> {
    query(state, move |service| service.job_detail(&title)).await
}

async fn task_analysis(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<TaskAnalysis>, ApiError> {
    query(state, move |service| service.task_analysis(&params)).await
}

async fn automation_matrix(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<QuadrantEntry>>, ApiError> {
    query(state, move |service| service.automation_matrix(&params)).await
}

async fn hierarchy(State(state): State<AppState>) -> Result<Json<TaxonomyNode>, ApiError> {
    query(state, |service| service.hierarchy()).await
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error_code: String,
    message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error_code: String,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        let message = err.to_string();
        match err {
            QueryError::DataUnavailable => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "no_data", message)
            }
            QueryError::InvalidLevel(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, "invalid_level", message)
            }
            QueryError::InvalidParameter { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, "invalid_parameter", message)
            }
            QueryError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, "not_found", message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error_code: self.error_code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
