//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream URL is usable as a forwarding target
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check CORS values can be sent as header values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use url::Url;

use crate::config::schema::{GatewayConfig, RedirectPolicy};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("upstream.url {url:?} is invalid: {reason}")]
    UpstreamUrl { url: String, reason: String },

    #[error("proxy.path {0:?} must start with '/' and must not be '/'")]
    ProxyPath(String),

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("{field} {value:?} is not a valid socket address")]
    Address { field: &'static str, value: String },

    #[error("{field} {value:?} is not a valid header value")]
    HeaderValue { field: &'static str, value: String },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(reason) = check_upstream_url(&config.upstream.url) {
        errors.push(ValidationError::UpstreamUrl {
            url: config.upstream.url.clone(),
            reason,
        });
    }

    let path = &config.proxy.path;
    if !path.starts_with('/') || path == "/" {
        errors.push(ValidationError::ProxyPath(path.clone()));
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "upstream.timeout_secs" });
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "upstream.connect_timeout_secs" });
    }
    if config.upstream.redirect == RedirectPolicy::Follow && config.upstream.max_redirects == 0 {
        errors.push(ValidationError::ZeroValue { field: "upstream.max_redirects" });
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    for (field, value) in [
        ("cors.allow_origin", &config.cors.allow_origin),
        ("cors.allow_methods", &config.cors.allow_methods),
        ("cors.allow_headers", &config.cors.allow_headers),
    ] {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::HeaderValue {
                field,
                value: value.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_upstream_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {:?}", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(())
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field,
            value: value.to_string(),
        });
    }
}
