//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
};
use serde_json::Value;
use tokio::net::TcpListener;

use oracle_gateway::config::GatewayConfig;
use oracle_gateway::http::HttpServer;
use oracle_gateway::lifecycle::Shutdown;
use oracle_gateway::security::{ManualClock, RateLimiter};

pub const ADMIN_KEY: &str = "test-admin-key";

/// Defaults with metrics off and the admin API enabled on a test key.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.observability.metrics_enabled = false;
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.to_string();
    config.admin.bind_address = "127.0.0.1:0".to_string();
    config
}

/// A server whose limiter runs on a clock the test controls.
pub fn server_with_clock(config: GatewayConfig) -> (HttpServer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let limiter = Arc::new(RateLimiter::from_config_with_clock(
        &config.rate_limit,
        clock.clone(),
    ));
    (HttpServer::with_limiter(config, limiter), clock)
}

pub fn json_request(method: Method, uri: &str, client: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str, client: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", client)
        .body(Body::empty())
        .unwrap()
}

pub fn admin_request(method: Method, uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {key}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serve the gateway on an ephemeral port until the returned coordinator fires.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let mut config = config;
    config.admin.enabled = false;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        HttpServer::new(config).run(listener, rx).await.unwrap();
    });

    (addr, shutdown)
}
