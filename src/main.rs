//! cors-proxy
//!
//! Forwarding proxy that relays `/api` to a single upstream and serves
//! everything else from a static asset directory.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                  CORS PROXY                   │
//!   Client Request     │  ┌────────┐    ┌──────────┐    ┌───────────┐  │
//!   ───────────────────┼─▶│  http  │───▶│ routing  │───▶│  proxy    │──┼──▶ Upstream
//!                      │  │ server │    │ matcher  │    │ forward   │  │
//!                      │  └────────┘    └────┬─────┘    └─────┬─────┘  │
//!                      │                     │ miss           │        │
//!                      │                     ▼                ▼        │
//!   Client Response    │              ┌────────────┐   ┌───────────┐   │
//!   ◀──────────────────┼──────────────│   static   │   │  relay +  │◀──┼─── Upstream
//!                      │              │   files    │   │   CORS    │   │    Response
//!                      │              └────────────┘   └───────────┘   │
//!                      │                                               │
//!                      │  config (toml, watch) · observability · life  │
//!                      └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use cors_proxy::config::{read_config, validate_config, ConfigError, ConfigWatcher, GatewayConfig};
use cors_proxy::lifecycle::{signals, Shutdown};
use cors_proxy::observability::{logging, metrics};
use cors_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "cors-proxy", version)]
#[command(about = "Forward /api to a single upstream with CORS, serve static files for the rest")]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override upstream.url.
    #[arg(long)]
    upstream: Option<String>,

    /// Override listener.bind_address.
    #[arg(long)]
    bind: Option<String>,

    /// Override static_files.root.
    #[arg(long)]
    static_root: Option<PathBuf>,

    /// Reload the configuration file when it changes.
    #[arg(long, requires = "config")]
    watch: bool,
}

/// Command-line values that take precedence over the file, including on reload.
#[derive(Debug, Clone, Default)]
struct Overrides {
    upstream: Option<String>,
    bind: Option<String>,
    static_root: Option<PathBuf>,
}

impl Overrides {
    fn apply(&self, config: &mut GatewayConfig) {
        if let Some(url) = &self.upstream {
            config.upstream.url = url.clone();
        }
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(root) = &self.static_root {
            config.static_files.root = Some(root.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        upstream: cli.upstream.clone(),
        bind: cli.bind.clone(),
        static_root: cli.static_root.clone(),
    };

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => GatewayConfig::default(),
    };
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cors-proxy starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        proxy_path = %config.proxy.path,
        match_mode = ?config.proxy.match_mode,
        header_policy = ?config.proxy.header_policy,
        body_policy = ?config.proxy.body_policy,
        redirect = ?config.upstream.redirect,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let _watcher = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, mut file_updates) = ConfigWatcher::new(path);
            let handle = watcher.run()?;
            tokio::spawn(async move {
                while let Some(mut next) = file_updates.recv().await {
                    overrides.apply(&mut next);
                    if let Err(errors) = validate_config(&next) {
                        tracing::error!(
                            error = %ConfigError::Validation(errors),
                            "Reloaded configuration rejected after overrides"
                        );
                        continue;
                    }
                    if update_tx.send(next).is_err() {
                        break;
                    }
                }
            });
            Some(handle)
        }
        _ => {
            drop(update_tx);
            None
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            signals::wait_for_shutdown_signal().await;
            shutdown.trigger();
        }
    });

    let server = HttpServer::new(config)?;
    server.run(listener, update_rx, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
