//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all handler, request span)
//!     → proxy::Gateway (proxy path or static asset host)
//!     → Send to client
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
