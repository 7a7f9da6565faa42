//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! OutboundRequest
//!     → client.rs (reqwest, redirect policy, timeouts)
//!     → reqwest::Response (status, headers, body stream)
//!     → or UpstreamError (timeout, connect, redirect, transport)
//! ```
//!
//! # Design Decisions
//! - Exactly one attempt per request; no retries
//! - Connection pooling is left to reqwest
//! - Timeout errors are distinct from other errors

pub mod client;

pub use client::{UpstreamClient, UpstreamError};
