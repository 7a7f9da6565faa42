//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (tracing)
//! - Bind server to listener
//! - Hand every request to the current Gateway
//! - Swap in a rebuilt Gateway when a new configuration arrives

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::proxy::{Gateway, GatewayError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ArcSwap<Gateway>>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    gateway: Arc<ArcSwap<Gateway>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let gateway = Arc::new(ArcSwap::from_pointee(Gateway::from_config(&config)?));
        let state = AppState {
            gateway: gateway.clone(),
        };

        Ok(Self {
            router: Self::build_router(state),
            config,
            gateway,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires, applying configuration updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            proxy_path = %self.config.proxy.path,
            "HTTP server starting"
        );

        let reloader = tokio::spawn(apply_updates(
            self.gateway.clone(),
            self.config.listener.bind_address.clone(),
            config_updates,
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

async fn apply_updates(
    gateway: Arc<ArcSwap<Gateway>>,
    bind_address: String,
    mut updates: mpsc::UnboundedReceiver<GatewayConfig>,
) {
    while let Some(config) = updates.recv().await {
        if config.listener.bind_address != bind_address {
            tracing::warn!(
                current = %bind_address,
                requested = %config.listener.bind_address,
                "Bind address changes require a restart; keeping current listener"
            );
        }
        match Gateway::from_config(&config) {
            Ok(next) => {
                gateway.store(Arc::new(next));
                tracing::info!(upstream = %config.upstream.url, "Configuration reloaded");
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected configuration update");
            }
        }
    }
}

/// Catch-all handler; the gateway decides between proxy and static.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let gateway = state.gateway.load_full();
    let span = tracing::info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path()
    );
    async move { gateway.handle(request).await }
        .instrument(span)
        .await
}
