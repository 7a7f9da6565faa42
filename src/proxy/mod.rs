//! Proxy gateway subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → gateway.rs (proxy path? preflight?)
//!     → forward.rs (query merge, header sanitization, body policy)
//!     → upstream client (single attempt, bounded wait)
//!     → relay.rs (status + upstream headers ∪ CORS + streamed body)
//!
//! Routing miss → static asset host, response untouched
//! Transport failure → relay.rs synthesizes 500 {"ok":false,"error":...}
//! ```
//!
//! # Design Decisions
//! - Stateless per request; the compiled Gateway is shared read-only
//! - Every policy axis is explicit configuration, never inferred
//! - headers.rs is the single header value type all policies operate on

pub mod cors;
pub mod forward;
pub mod gateway;
pub mod headers;
pub mod relay;

pub use cors::CorsHeaders;
pub use forward::OutboundRequest;
pub use gateway::{Gateway, GatewayError};
pub use headers::HeaderBag;
