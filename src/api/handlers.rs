use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::indexing::{IndexDetails, RebuildOutcome, RebuildStatus};
use crate::search::{IndexDocument, LogicOperator, SearchRequest};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// List indexes, sorted by name
pub async fn list_indexes(
    State(state): State<AppState>,
    Query(params): Query<ListIndexesQuery>,
) -> Result<Json<ListIndexesResponse>> {
    let skip = params.skip.unwrap_or(0);
    let take = state.search_config.clamp_page_size(params.take);

    let (total, items) = state.rebuilder.list_indexes(skip, take).await;

    Ok(Json(ListIndexesResponse {
        items,
        total,
        skip,
        take,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListIndexesQuery {
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListIndexesResponse {
    pub items: Vec<IndexDetails>,
    pub total: usize,
    pub skip: usize,
    pub take: usize,
}

/// Details of one index
pub async fn get_index(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<IndexDetails>> {
    state
        .rebuilder
        .index_details(&name)
        .await
        .map(Json)
        .ok_or_else(|| unknown_index(&name))
}

/// Start a background rebuild
///
/// 400 when the index or its populator cannot be validated, 409 when a
/// rebuild is already running or could not be scheduled.
pub async fn rebuild_index(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RebuildResponse>> {
    let outcome = state.rebuilder.try_rebuild(&name).await;

    match outcome {
        RebuildOutcome::Scheduled => Ok(Json(RebuildResponse {
            index: name,
            outcome,
            message: "Rebuild scheduled".to_string(),
        })),
        RebuildOutcome::UnknownIndex | RebuildOutcome::NoPopulator => Err(AppError::Validation(
            format!("The populator for index {} could not be validated", name),
        )),
        RebuildOutcome::AlreadyRunning => Err(AppError::Conflict(format!(
            "Index {} is already being rebuilt",
            name
        ))),
        RebuildOutcome::SchedulingFailed => Err(AppError::Conflict(format!(
            "Rebuild of index {} could not be scheduled",
            name
        ))),
    }
}

#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub index: String,
    pub outcome: RebuildOutcome,
    pub message: String,
}

/// Poll the rebuild state of an index
pub async fn rebuild_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RebuildStatusResponse>> {
    let status = state
        .rebuilder
        .rebuild_status(&name)
        .await
        .ok_or_else(|| unknown_index(&name))?;

    Ok(Json(RebuildStatusResponse {
        is_rebuilding: state.rebuilder.is_rebuilding(&name),
        index: name,
        status,
    }))
}

#[derive(Debug, Serialize)]
pub struct RebuildStatusResponse {
    pub index: String,
    pub is_rebuilding: bool,
    #[serde(flatten)]
    pub status: RebuildStatus,
}

/// Search an index with filter and sort tokens
pub async fn search(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>> {
    body.validate()?;

    let index = state
        .registry()
        .get(&name)
        .ok_or_else(|| unknown_index(&name))?;

    let skip = body.skip.unwrap_or(0);
    let take = state.search_config.clamp_page_size(body.take);

    let compiled = SearchRequest::from_tokens(
        body.term.unwrap_or_default(),
        &body.filter,
        &body.sort,
        &state.filter_handlers,
        &state.sort_handlers,
    );
    let request = compiled
        .request
        .with_filters_logic_operator(body.filters_logic_operator)
        .with_preview(body.preview)
        .with_skip_take(skip, take);

    let results = index.search(&request).await?;

    Ok(Json(SearchResponse {
        total: results.total,
        skip: request.skip(),
        take: request.take(),
        items: results.items,
        unrecognized_filters: compiled.unrecognized_filters,
        unrecognized_sorts: compiled.unrecognized_sorts,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchBody {
    #[validate(length(max = 1000))]
    pub term: Option<String>,

    /// Filter tokens, e.g. `contentType:blogPost`
    #[serde(default)]
    #[validate(length(max = 50))]
    pub filter: Vec<String>,

    /// Sort tokens, e.g. `updateDate:desc`
    #[serde(default)]
    #[validate(length(max = 10))]
    pub sort: Vec<String>,

    pub skip: Option<usize>,

    #[validate(range(min = 1))]
    pub take: Option<usize>,

    #[serde(default)]
    pub preview: bool,

    #[serde(default)]
    pub filters_logic_operator: LogicOperator,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub total: usize,
    pub skip: usize,
    pub take: usize,
    pub items: Vec<IndexDocument>,
    pub unrecognized_filters: Vec<String>,
    pub unrecognized_sorts: Vec<String>,
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    let metrics = crate::metrics::gather_metrics();
    (StatusCode::OK, metrics)
}

fn unknown_index(name: &str) -> AppError {
    AppError::Validation(format!("Index not found: {}", name))
}
