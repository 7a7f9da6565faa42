//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → request span (request_id, method, path) via tracing
//!     → logging.rs (structured log events, EnvFilter)
//!     → metrics.rs (counter + latency histogram by outcome)
//!
//! Consumers:
//!     → stdout log lines
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID lives on the span only; it is never forwarded upstream
//! - Metrics are cheap no-ops until the exporter is installed

pub mod logging;
pub mod metrics;
