//! CORS header set shared by preflight responses and proxied responses.

use axum::http::header::{
    InvalidHeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::HeaderValue;

use crate::config::CorsConfig;
use crate::proxy::headers::HeaderBag;

/// Pre-validated CORS headers, built once per configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsHeaders {
    headers: HeaderBag,
}

impl CorsHeaders {
    pub fn from_config(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
        let mut headers = HeaderBag::new();
        headers.set(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_str(&config.allow_origin)?,
        );
        headers.set(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_str(&config.allow_methods)?,
        );
        headers.set(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_str(&config.allow_headers)?,
        );
        Ok(Self { headers })
    }

    /// Merge the CORS set onto `target`, overwriting same-named entries.
    pub fn apply(&self, target: &mut HeaderBag) {
        target.merge(&self.headers);
    }

    pub fn headers(&self) -> &HeaderBag {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;

    fn default_cors() -> CorsHeaders {
        CorsHeaders::from_config(&CorsConfig::default()).unwrap()
    }

    #[test]
    fn test_default_set() {
        let cors = default_cors();
        let headers = cors.headers();

        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
        assert_eq!(
            headers.get("access-control-allow-methods").unwrap(),
            "GET, POST, PUT, PATCH, DELETE, OPTIONS"
        );
        assert_eq!(
            headers.get("access-control-allow-headers").unwrap(),
            "Content-Type, Authorization, X-Requested-With"
        );
    }

    #[test]
    fn test_apply_keeps_upstream_headers() {
        let mut upstream = HeaderBag::new();
        upstream.set(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        upstream.set(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("https://script.example"),
        );

        default_cors().apply(&mut upstream);

        assert_eq!(upstream.len(), 4);
        assert_eq!(upstream.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(upstream.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    }

    #[test]
    fn test_rejects_invalid_value() {
        let config = CorsConfig {
            allow_origin: "line\nbreak".into(),
            ..CorsConfig::default()
        };
        assert!(CorsHeaders::from_config(&config).is_err());
    }
}
