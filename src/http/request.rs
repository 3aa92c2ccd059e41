//! Request inspection.
//!
//! # Responsibilities
//! - Request ID generation and propagation (`x-request-id`, UUID v4)
//! - Caller identification for admission control
//! - Mapping request paths to rate-limit categories

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, HeaderName, Request},
};
use tracing::Span;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Identifier used when nothing else names the caller.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// The request's ID, or `"unknown"` when the layer has not run.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span for one request, tagged with its ID.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request.headers()),
    )
}

/// Who is calling: first `X-Forwarded-For` hop, then `X-Real-IP`, then the
/// peer address.
pub fn client_identifier(request: &Request<Body>) -> String {
    let headers = request.headers();

    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = headers
        .get(X_REAL_IP)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Rate-limit category for an API path.
pub fn category_for_path(path: &str) -> &'static str {
    if path.starts_with("/api/chat") {
        "chat"
    } else if path.starts_with("/api/search") {
        "search"
    } else {
        "default"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/search");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let req = request(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]);
        assert_eq!(client_identifier(&req), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_fallback() {
        let req = request(&[("x-real-ip", "10.0.0.2")]);
        assert_eq!(client_identifier(&req), "10.0.0.2");
    }

    #[test]
    fn test_peer_address_fallback() {
        let mut req = request(&[]);
        req.extensions_mut()
            .insert(ConnectInfo("192.0.2.4:5555".parse::<SocketAddr>().unwrap()));
        assert_eq!(client_identifier(&req), "192.0.2.4");
    }

    #[test]
    fn test_unknown_without_any_source() {
        assert_eq!(client_identifier(&request(&[])), "unknown");
    }

    #[test]
    fn test_categories() {
        assert_eq!(category_for_path("/api/chat"), "chat");
        assert_eq!(category_for_path("/api/search"), "search");
        assert_eq!(category_for_path("/api/inspect"), "default");
    }
}
