//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → matcher.rs (proxy path, exact or prefix)
//!     → Return: proxy (with sub-path remainder) or static
//! ```
//!
//! # Design Decisions
//! - Matcher compiled at startup, immutable at runtime
//! - Deterministic: same path always routes the same way
//! - A miss is not an error; the request goes to the static asset host

pub mod matcher;

pub use matcher::ProxyPathMatcher;
