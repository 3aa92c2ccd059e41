//! Security response headers.
//!
//! Applied to every response when `security.enable_headers` is set. HSTS is
//! opt-in because it is only meaningful behind TLS.

use axum::http::{header, HeaderName, HeaderValue};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     script-src 'self'; \
     style-src 'self' 'unsafe-inline'; \
     img-src 'self' data: https:; \
     font-src 'self'; \
     connect-src 'self'; \
     frame-src 'none'; \
     object-src 'none'; \
     base-uri 'self'; \
     form-action 'self'";

const HSTS: &str = "max-age=31536000; includeSubDomains; preload";

/// Headers sent on every response.
pub fn security_headers(hsts: bool) -> Vec<(HeaderName, HeaderValue)> {
    let mut headers = vec![
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
        (
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ),
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ),
    ];

    if hsts {
        headers.push((
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS),
        ));
    }

    headers
}

/// Extra headers for API responses, which must never be cached.
pub fn api_headers() -> Vec<(HeaderName, HeaderValue)> {
    vec![
        (
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ),
        (header::PRAGMA, HeaderValue::from_static("no-cache")),
        (header::EXPIRES, HeaderValue::from_static("0")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsts_is_opt_in() {
        let without = security_headers(false);
        assert!(!without
            .iter()
            .any(|(name, _)| name == header::STRICT_TRANSPORT_SECURITY));

        let with = security_headers(true);
        assert_eq!(with.len(), without.len() + 1);
    }

    #[test]
    fn test_csp_forbids_frames_and_objects() {
        let headers = security_headers(false);
        let (_, csp) = headers
            .iter()
            .find(|(name, _)| name == header::CONTENT_SECURITY_POLICY)
            .unwrap();
        let csp = csp.to_str().unwrap();
        assert!(csp.contains("frame-src 'none'"));
        assert!(csp.contains("object-src 'none'"));
    }
}
