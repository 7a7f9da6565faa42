//! Proxy path matching.
//!
//! # Responsibilities
//! - Decide whether a request path belongs to the proxy
//! - Extract the sub-path remainder for upstream path appending
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Prefix mode matches on segment boundaries: `/api` and `/api/x`, never `/apix`
//! - No regex to guarantee O(n) matching

use crate::config::PathMatch;

/// Matches request paths against the configured proxy path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyPathMatcher {
    path: String,
    mode: PathMatch,
}

impl ProxyPathMatcher {
    /// Create a new matcher. A trailing slash on `path` is ignored.
    pub fn new(path: impl Into<String>, mode: PathMatch) -> Self {
        let mut path = path.into();
        while path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
        Self { path, mode }
    }

    /// Returns true if `path` should be forwarded to the upstream.
    pub fn matches(&self, path: &str) -> bool {
        self.remainder(path).is_some()
    }

    /// The part of `path` after the proxy path, if it matches.
    ///
    /// Returns `Some("")` for the proxy path itself and `Some("/x/y")` for a
    /// sub-path in prefix mode.
    pub fn remainder<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.path.as_str())?;
        match self.mode {
            PathMatch::Exact if rest.is_empty() => Some(rest),
            PathMatch::Exact => None,
            PathMatch::Prefix if rest.is_empty() || rest.starts_with('/') => Some(rest),
            PathMatch::Prefix => None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}
