use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::security::RateLimitStats;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub rate_limit_enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetParams {
    pub identifier: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResetOutcome {
    /// The cleared key, or `"all"`.
    pub cleared: String,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        rate_limit_enabled: state.config.rate_limit.enabled,
    })
}

pub async fn get_rate_limits(State(state): State<AppState>) -> Json<RateLimitStats> {
    Json(state.limiter.stats())
}

pub async fn reset_rate_limits(
    State(state): State<AppState>,
    Query(params): Query<ResetParams>,
) -> Json<ResetOutcome> {
    let identifier = params.identifier.as_deref();
    let category = params.category.as_deref();
    state.limiter.reset(identifier, category);

    let cleared = match (identifier, category) {
        (Some(identifier), Some(category)) => format!("{category}:{identifier}"),
        _ => "all".to_string(),
    };
    tracing::info!(cleared = %cleared, "Rate limit entries reset");

    Json(ResetOutcome { cleared })
}
