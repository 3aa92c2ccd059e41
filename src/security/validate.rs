//! Field-level validators.
//!
//! `is_valid_url` checks configured CORS origins. `is_valid_email` is not
//! used by the gateway itself; it is exported for callers embedding the
//! library.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern"));

/// Loose shape check: `local@domain.tld` without whitespace.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// True for absolute `http` and `https` URLs only.
pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("ana@brpartners.com.br"));
        assert!(!is_valid_email("ana@localhost"));
        assert!(!is_valid_email("ana maria@x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn test_url_schemes() {
        assert!(is_valid_url("https://oracle.brpartners.com.br/search"));
        assert!(is_valid_url("http://localhost:3000"));
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url("ftp://files.example.com"));
        assert!(!is_valid_url("not a url"));
    }
}
