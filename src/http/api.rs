//! API handlers.
//!
//! Each handler validates its payload, inspects the original text for
//! threats, and returns the sanitized request envelope a downstream service
//! would consume.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::http::response::{ApiError, ApiResponse};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::{detect_threats, sanitize_value, SanitizeOptions, Threat};

const MAX_SEARCH_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFilter {
    #[default]
    All,
    Jira,
    Backstage,
    Documents,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Technical,
    Business,
    Product,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRangeFilter {
    #[default]
    All,
    Week,
    Month,
    Quarter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchFilters {
    pub source: SourceFilter,
    pub category: CategoryFilter,
    pub date_range: DateRangeFilter,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Value,
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub source: Option<SourceFilter>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AcceptedSearch {
    pub query: String,
    pub filters: SearchFilters,
    pub limit: u32,
    pub offset: u32,
    pub threats: Vec<Threat>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Value,
    pub conversation_id: Option<Uuid>,
    #[serde(default)]
    pub include_history: bool,
}

#[derive(Debug, Serialize)]
pub struct AcceptedChat {
    pub message: String,
    pub conversation_id: Uuid,
    pub include_history: bool,
    pub threats: Vec<Threat>,
}

#[derive(Debug, Deserialize)]
pub struct InspectRequest {
    #[serde(default)]
    pub text: Value,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub sanitized: String,
    pub threats: Vec<Threat>,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AcceptedSearch>>, ApiError> {
    let Json(request) = payload?;
    accept_search(&state, request).map(ApiResponse::ok)
}

pub async fn search_by_params(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<ApiResponse<AcceptedSearch>>, ApiError> {
    let Query(params) = params?;
    let request = SearchRequest {
        query: params.q.map(Value::String).unwrap_or_default(),
        filters: SearchFilters {
            source: params.source.unwrap_or_default(),
            ..SearchFilters::default()
        },
        limit: params.limit.unwrap_or_else(default_limit),
        offset: 0,
    };
    accept_search(&state, request).map(ApiResponse::ok)
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AcceptedChat>>, ApiError> {
    let Json(request) = payload?;
    let max_length = state.config.sanitization.chat_max_length;

    let (message, threats) = accept_text("message", &request.message, max_length)?;

    Ok(ApiResponse::ok(AcceptedChat {
        message,
        conversation_id: request.conversation_id.unwrap_or_else(Uuid::new_v4),
        include_history: request.include_history,
        threats,
    }))
}

/// Full threat report for arbitrary text.
pub async fn inspect(
    State(state): State<AppState>,
    payload: Result<Json<InspectRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<InspectReport>>, ApiError> {
    let Json(request) = payload?;
    let max_length = state.config.sanitization.default_max_length;
    let options = SanitizeOptions::with_max_length(max_length);

    let sanitized = sanitize_value(&request.text, &options)?;
    let threats = detect_threats(request.text.as_str().unwrap_or_default());
    report_threats("text", &threats);

    Ok(ApiResponse::ok(InspectReport { sanitized, threats }))
}

fn accept_search(state: &AppState, request: SearchRequest) -> Result<AcceptedSearch, ApiError> {
    if !(1..=MAX_SEARCH_LIMIT).contains(&request.limit) {
        return Err(ApiError::Validation(format!(
            "limit must be between 1 and {MAX_SEARCH_LIMIT}"
        )));
    }

    let max_length = state.config.sanitization.search_max_length;
    let (query, threats) = accept_text("query", &request.query, max_length)?;

    tracing::info!(
        query = %query,
        filters = ?request.filters,
        limit = request.limit,
        offset = request.offset,
        "Search accepted"
    );

    Ok(AcceptedSearch {
        query,
        filters: request.filters,
        limit: request.limit,
        offset: request.offset,
        threats,
    })
}

/// Validate a free-text field, inspect it and sanitize it.
fn accept_text(
    field: &'static str,
    value: &Value,
    max_length: usize,
) -> Result<(String, Vec<Threat>), ApiError> {
    let sanitized = sanitize_value(value, &SanitizeOptions::with_max_length(max_length))?;
    let raw = value.as_str().unwrap_or_default();

    if raw.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} must not be empty")));
    }
    if raw.chars().count() > max_length {
        return Err(ApiError::Validation(format!(
            "{field} is too long (max {max_length} characters)"
        )));
    }

    let threats = detect_threats(raw);
    report_threats(field, &threats);
    Ok((sanitized, threats))
}

fn report_threats(field: &'static str, threats: &[Threat]) {
    if threats.is_empty() {
        return;
    }
    for threat in threats {
        metrics::record_threat(threat.kind());
    }
    let labels: Vec<String> = threats.iter().map(ToString::to_string).collect();
    tracing::warn!(field, threats = ?labels, "Suspicious input");
}
