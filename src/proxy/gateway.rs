//! The proxy gateway: routes one request and produces its response.

use std::time::Instant;

use axum::body::Body;
use axum::http::header::InvalidHeaderValue;
use axum::http::{Method, Request};
use axum::response::Response;

use crate::config::{GatewayConfig, ProxyConfig};
use crate::observability::metrics::{self, Outcome};
use crate::proxy::cors::CorsHeaders;
use crate::proxy::{forward, relay};
use crate::routing::ProxyPathMatcher;
use crate::static_files::StaticAssets;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Error building a gateway from configuration.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("invalid CORS header value: {0}")]
    Cors(#[from] InvalidHeaderValue),
}

/// Immutable, compiled form of a `GatewayConfig`.
///
/// One instance serves any number of concurrent requests; nothing in it is
/// mutated after construction.
#[derive(Debug, Clone)]
pub struct Gateway {
    matcher: ProxyPathMatcher,
    forwarding: ProxyConfig,
    upstream: UpstreamClient,
    cors: CorsHeaders,
    assets: StaticAssets,
}

impl Gateway {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            matcher: ProxyPathMatcher::new(&config.proxy.path, config.proxy.match_mode),
            forwarding: config.proxy.clone(),
            upstream: UpstreamClient::from_config(&config.upstream)?,
            cors: CorsHeaders::from_config(&config.cors)?,
            assets: StaticAssets::from_config(&config.static_files),
        })
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// Handle one inbound request end to end.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();

        let Some(subpath) = self
            .matcher
            .remainder(request.uri().path())
            .map(str::to_owned)
        else {
            let response = self.assets.serve(request).await;
            tracing::debug!(status = %response.status(), "Served static asset");
            metrics::record_request(&method, response.status(), Outcome::Static, start);
            return response;
        };

        if method == Method::OPTIONS {
            tracing::debug!("Answered CORS preflight");
            let response = relay::preflight(&self.cors);
            metrics::record_request(&method, response.status(), Outcome::Preflight, start);
            return response;
        }

        let (parts, body) = request.into_parts();
        let outbound = forward::build_outbound(
            &parts,
            body,
            self.upstream.base_url(),
            &self.forwarding,
            &subpath,
        );
        tracing::debug!(
            upstream = %outbound.url,
            forwards_body = outbound.body.is_some(),
            "Forwarding request"
        );

        match self.upstream.dispatch(outbound).await {
            Ok(upstream) => {
                let response = relay::relay(upstream, &self.cors);
                tracing::debug!(
                    status = %response.status(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Relayed upstream response"
                );
                metrics::record_request(&method, response.status(), Outcome::Proxied, start);
                response
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "Upstream error");
                let response =
                    relay::upstream_failure(&format!("proxy failed to reach upstream: {e}"));
                metrics::record_request(&method, response.status(), Outcome::UpstreamError, start);
                response
            }
        }
    }
}
