//! Header bag used for every header transformation the gateway performs.
//!
//! Keys compare case-insensitively. All policy logic (allow-list, block-list,
//! CORS merge) is expressed through `set`, `remove` and `merge` so it can be
//! tested without any network call.

use axum::http::header::{AsHeaderName, HeaderMap, HeaderName, HeaderValue};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBag(HeaderMap);

impl HeaderBag {
    pub fn new() -> Self {
        Self(HeaderMap::new())
    }

    /// Look up the first value for `name`.
    pub fn get<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.0.get(name)
    }

    pub fn contains<K: AsHeaderName>(&self, name: K) -> bool {
        self.0.contains_key(name)
    }

    /// Set `name` to a single value, replacing any existing values.
    pub fn set(&mut self, name: HeaderName, value: HeaderValue) {
        self.0.insert(name, value);
    }

    /// Remove `name` if present. Returns whether anything was removed.
    pub fn remove<K: AsHeaderName>(&mut self, name: K) -> bool {
        self.0.remove(name).is_some()
    }

    /// Copy every entry of `other` into `self`.
    ///
    /// Names present in `other` replace the same names in `self`; every other
    /// entry of `self` is kept.
    pub fn merge(&mut self, other: &HeaderBag) {
        for name in other.0.keys() {
            self.0.remove(name);
            for value in other.0.get_all(name) {
                self.0.append(name.clone(), value.clone());
            }
        }
    }

    /// Copy `name` from `source` if it is present there.
    pub fn copy_from(&mut self, source: &HeaderMap, name: HeaderName) {
        if let Some(value) = source.get(&name) {
            self.set(name, value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &HeaderMap {
        &self.0
    }

    pub fn into_inner(self) -> HeaderMap {
        self.0
    }
}

impl From<HeaderMap> for HeaderBag {
    fn from(map: HeaderMap) -> Self {
        Self(map)
    }
}

impl From<HeaderBag> for HeaderMap {
    fn from(bag: HeaderBag) -> Self {
        bag.0
    }
}
