//! Admission control for `/api/*`.

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::{category_for_path, client_identifier};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::RateLimitDecision;

const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Check the caller against its category before the handler runs.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_identifier(&request);
    // Nested routers see the path without its `/api` prefix.
    let category = match request.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => category_for_path(uri.path()),
        None => category_for_path(request.uri().path()),
    };

    let decision = state.limiter.check(&client, category);
    if let Some(denied) = decision.denial() {
        tracing::warn!(
            client = %client,
            category,
            retry_after_secs = denied.retry_after_secs,
            "Rate limit exceeded"
        );
        metrics::record_rate_limited(category);
        let mut response = ApiError::RateLimited(denied).into_response();
        insert_rate_limit_headers(response.headers_mut(), &decision);
        return response;
    }

    let mut response = next.run(request).await;
    insert_rate_limit_headers(response.headers_mut(), &decision);
    response
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(
        X_RATELIMIT_RESET,
        HeaderValue::from(decision.window_reset_at.div_ceil(1000)),
    );
}
