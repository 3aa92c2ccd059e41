//! End-to-end tests for the public API surface.

mod common;

use axum::http::{header, Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use oracle_gateway::config::validation::validate_config;
use oracle_gateway::security::RateLimitPolicy;

use common::{get_request, json_request, read_json, server_with_clock, spawn_gateway, test_config};

#[tokio::test]
async fn test_health_carries_security_headers() {
    let (server, _clock) = server_with_clock(test_config());

    let response = server
        .router()
        .oneshot(get_request("/health", "10.0.0.1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
    assert!(headers.contains_key("x-request-id"));
    // Not rate limited and not an API response.
    assert!(!headers.contains_key("x-ratelimit-limit"));
    assert!(!headers.contains_key(header::STRICT_TRANSPORT_SECURITY));
}

#[tokio::test]
async fn test_search_returns_sanitized_envelope() {
    let (server, _clock) = server_with_clock(test_config());

    let response = server
        .router()
        .oneshot(json_request(
            Method::POST,
            "/api/search",
            "10.0.0.1",
            json!({ "query": "  rust   & tokio ", "filters": { "source": "jira" } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-ratelimit-limit"], "30");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "29");
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "no-cache, no-store, must-revalidate"
    );

    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["query"], "rust &amp; tokio");
    assert_eq!(body["data"]["filters"]["source"], "jira");
    assert_eq!(body["data"]["filters"]["category"], "all");
    assert_eq!(body["data"]["limit"], 10);
    assert_eq!(body["data"]["threats"], json!(["command injection attempt"]));
}

#[tokio::test]
async fn test_search_by_query_string() {
    let (server, _clock) = server_with_clock(test_config());

    let response = server
        .router()
        .oneshot(get_request("/api/search?q=release%20notes&limit=5", "10.0.0.1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["query"], "release notes");
    assert_eq!(body["data"]["limit"], 5);
    assert_eq!(body["data"]["threats"], json!([]));
}

#[tokio::test]
async fn test_window_exhaustion_and_recovery() {
    let mut config = test_config();
    config
        .rate_limit
        .categories
        .insert("search".to_string(), RateLimitPolicy::new(60_000, 3));
    let (server, clock) = server_with_clock(config);
    let router = server.router();
    let search = || {
        json_request(
            Method::POST,
            "/api/search",
            "203.0.113.7",
            json!({ "query": "hello" }),
        )
    };

    for remaining in ["2", "1", "0"] {
        let response = router.clone().oneshot(search()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-remaining"], remaining);
    }

    clock.advance(15_500);
    let response = router.clone().oneshot(search()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "45");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(response.headers()[header::PRAGMA], "no-cache");
    let body = read_json(response).await;
    assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(body["retry_after"], 45);

    // Other callers and other categories are unaffected.
    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/search",
            "203.0.113.8",
            json!({ "query": "hello" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/chat",
            "203.0.113.7",
            json!({ "message": "hello" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-ratelimit-limit"], "20");

    clock.advance(44_501);
    let response = router.oneshot(search()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-ratelimit-remaining"], "2");
}

#[tokio::test]
async fn test_non_string_query_is_rejected() {
    let (server, _clock) = server_with_clock(test_config());

    let response = server
        .router()
        .oneshot(json_request(
            Method::POST,
            "/api/search",
            "10.0.0.1",
            json!({ "query": { "$ne": "" } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["details"], "input must be a string, got object");
}

#[tokio::test]
async fn test_validation_errors() {
    let (server, _clock) = server_with_clock(test_config());
    let router = server.router();

    let cases = [
        ("/api/search", json!({ "query": "   " })),
        ("/api/search", json!({ "query": "ok", "limit": 0 })),
        ("/api/search", json!({ "query": "ok", "limit": 51 })),
        ("/api/search", json!({ "query": "x".repeat(501) })),
        ("/api/chat", json!({ "message": "" })),
        ("/api/chat", json!({ "message": "hi", "conversation_id": "nope" })),
    ];

    for (uri, payload) in cases {
        let response = router
            .clone()
            .oneshot(json_request(Method::POST, uri, "10.0.0.2", payload.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri} {payload}");
        let body = read_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR", "{uri} {payload}");
    }
}

#[tokio::test]
async fn test_chat_reports_threats_but_accepts() {
    let (server, _clock) = server_with_clock(test_config());

    let response = server
        .router()
        .oneshot(json_request(
            Method::POST,
            "/api/chat",
            "10.0.0.3",
            json!({ "message": "It's 1 OR 1=1", "include_history": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["message"], "It&#x27;s 1 OR 1&#x3D;1");
    assert_eq!(body["data"]["include_history"], true);
    assert!(body["data"]["conversation_id"].is_string());
    assert_eq!(body["data"]["threats"], json!(["SQL injection attempt"]));
}

#[tokio::test]
async fn test_inspect_strips_script_openers() {
    let (server, _clock) = server_with_clock(test_config());

    let response = server
        .router()
        .oneshot(json_request(
            Method::POST,
            "/api/inspect",
            "10.0.0.4",
            json!({ "text": "<script>alert(1)</script>hi" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let sanitized = body["data"]["sanitized"].as_str().unwrap();
    assert!(!sanitized.contains('<'));
    assert!(sanitized.ends_with("hi"));
    let threats = body["data"]["threats"].as_array().unwrap();
    assert!(threats.contains(&json!("dangerous pattern #5")));
    assert!(threats.contains(&json!("command injection attempt")));
}

#[tokio::test]
async fn test_disabled_rate_limit_sends_no_headers() {
    let mut config = test_config();
    config.rate_limit.enabled = false;
    let (server, _clock) = server_with_clock(config);

    let response = server
        .router()
        .oneshot(json_request(
            Method::POST,
            "/api/chat",
            "10.0.0.5",
            json!({ "message": "hello" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("x-ratelimit-limit"));
}

#[tokio::test]
async fn test_cors_echoes_configured_origin_with_credentials() {
    let (server, _clock) = server_with_clock(test_config());

    let mut request = get_request("/health", "10.0.0.6");
    request.headers_mut().insert(
        header::ORIGIN,
        "http://localhost:3000".parse().unwrap(),
    );
    let response = server.router().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

#[tokio::test]
async fn test_wildcard_origin_allows_any_without_credentials() {
    let mut config = test_config();
    config.security.allowed_origins = vec!["*".to_string()];
    assert_eq!(validate_config(&config), Ok(()));

    let (server, _clock) = server_with_clock(config);

    let mut request = get_request("/health", "10.0.0.7");
    request.headers_mut().insert(
        header::ORIGIN,
        "https://elsewhere.example".parse().unwrap(),
    );
    let response = server.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_CREDENTIALS));
}

#[tokio::test]
async fn test_served_over_tcp_until_shutdown() {
    let (addr, shutdown) = spawn_gateway(test_config()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{addr}/api/search"))
        .json(&json!({ "query": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert_eq!(res.headers()["x-ratelimit-limit"], "30");

    let res = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "ok");

    shutdown.trigger();
}
