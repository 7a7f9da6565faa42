//! HTTP client for the single upstream.
//!
//! # Responsibilities
//! - Own the pooled `reqwest` client built from `UpstreamConfig`
//! - Apply the redirect policy (manual or follow)
//! - Bound every call with connect and response timeouts
//! - Classify transport failures for logging and metrics

use std::error::Error as StdError;
use std::time::Duration;

use reqwest::redirect;
use url::Url;

use crate::config::{RedirectPolicy, UpstreamConfig};
use crate::proxy::forward::OutboundRequest;

/// Failure to obtain a response from the upstream.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid upstream url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("{}", error_chain(.0))]
    Transport(#[source] reqwest::Error),
}

impl UpstreamError {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::InvalidUrl(_) | UpstreamError::Client(_) => "config",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Transport(e) if e.is_timeout() => "timeout",
            UpstreamError::Transport(e) if e.is_connect() => "connect",
            UpstreamError::Transport(e) if e.is_redirect() => "redirect",
            UpstreamError::Transport(_) => "transport",
        }
    }
}

/// Render an error with its full source chain, e.g.
/// `error sending request: client error (Connect): Connection refused`.
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(&config.url)?;

        let redirect = match config.redirect {
            RedirectPolicy::Manual => redirect::Policy::none(),
            RedirectPolicy::Follow => redirect::Policy::limited(config.max_redirects),
        };

        let client = reqwest::Client::builder()
            .redirect(redirect)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(UpstreamError::Client)?;

        Ok(Self {
            client,
            base_url,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send one request upstream. Exactly one attempt is made.
    ///
    /// The timeout covers the wait for response headers only, so long
    /// response bodies keep streaming after it. Dropping the returned future
    /// cancels the call and releases its connection.
    pub async fn dispatch(&self, request: OutboundRequest) -> Result<reqwest::Response, UpstreamError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers.into_inner());

        if let Some(body) = request.body {
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        // The error text reaches the client; keep the upstream URL out of it.
        match tokio::time::timeout(self.timeout, builder.send()).await {
            Ok(result) => result.map_err(|e| UpstreamError::Transport(e.without_url())),
            Err(_) => Err(UpstreamError::Timeout(self.timeout)),
        }
    }
}
