//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream every proxied request is forwarded to.
    pub upstream: UpstreamConfig,

    /// Forwarding policy for requests on the proxy path.
    pub proxy: ProxyConfig,

    /// CORS headers injected into proxied responses and preflights.
    pub cors: CorsConfig,

    /// Static asset host serving every non-proxy path.
    pub static_files: StaticFilesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream. Its own query string acts as a set of defaults.
    pub url: String,

    /// Time allowed until the upstream's response headers arrive, in seconds.
    /// The response body may keep streaming after it.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// How 3xx upstream responses are handled.
    pub redirect: RedirectPolicy,

    /// Maximum hops when `redirect = "follow"`.
    pub max_redirects: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000/".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            redirect: RedirectPolicy::Manual,
            max_redirects: 10,
        }
    }
}

/// Redirect handling for upstream responses.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RedirectPolicy {
    /// Relay 3xx responses untouched; the caller decides whether to follow.
    #[default]
    Manual,
    /// Follow redirects inside the gateway and relay the final response.
    Follow,
}

/// Proxy path and forwarding policy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Path that triggers forwarding (e.g., "/api").
    pub path: String,

    /// Whether sub-paths of `path` are proxied too.
    pub match_mode: PathMatch,

    /// Which inbound headers reach the upstream.
    pub header_policy: HeaderPolicy,

    /// Which methods carry the inbound body upstream.
    pub body_policy: BodyPolicy,

    /// Overwrite `accept` with `application/json` after sanitization.
    pub force_json_accept: bool,

    /// Append the part of the path after `path` to the upstream URL path.
    pub append_subpath: bool,

    /// Also drop hop-by-hop headers under the block-list policy.
    pub strip_hop_by_hop: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            path: "/api".to_string(),
            match_mode: PathMatch::Prefix,
            header_policy: HeaderPolicy::AllowList,
            body_policy: BodyPolicy::ExceptGetHead,
            force_json_accept: false,
            append_subpath: false,
            strip_hop_by_hop: true,
        }
    }
}

/// Path matching mode for the proxy path.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PathMatch {
    /// Only the configured path itself.
    Exact,
    /// The configured path and every path below it.
    #[default]
    Prefix,
}

/// Header sanitization policy for outbound requests.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeaderPolicy {
    /// Forward only `content-type` and `accept`.
    #[default]
    AllowList,
    /// Forward everything except `content-length` and `host`.
    BlockList,
}

/// Body inclusion policy for outbound requests.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BodyPolicy {
    /// Every method except GET and HEAD carries the body.
    #[default]
    ExceptGetHead,
    /// Only POST, PUT and PATCH carry the body.
    PayloadMethods,
}

/// CORS header values.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "GET, POST, PUT, PATCH, DELETE, OPTIONS".to_string(),
            allow_headers: "Content-Type, Authorization, X-Requested-With".to_string(),
        }
    }
}

/// Static asset host configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory served for non-proxy paths. Unset means every miss is a 404.
    pub root: Option<PathBuf>,

    /// File served with status 404 when nothing under `root` matches.
    pub not_found_page: Option<PathBuf>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
