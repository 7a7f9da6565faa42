//! Forwarding proxy with CORS for a single upstream.
//!
//! Requests on the proxy path (`/api` by default) are relayed to one fixed
//! upstream URL with CORS headers added to the response; everything else is
//! served by the static asset host.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod static_files;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::Gateway;
