//! Outbound request construction.
//!
//! # Responsibilities
//! - Merge inbound query parameters onto the upstream URL (set, not append)
//! - Sanitize headers per the configured allow-list or block-list policy
//! - Decide whether the inbound body travels upstream
//!
//! # Design Decisions
//! - The inbound body is handed over as a stream, never collected
//! - An excluded body is absent, not an empty stream
//! - Everything except body handling is a pure function of the inbound parts

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{request, Method};
use url::Url;

use crate::config::{BodyPolicy, HeaderPolicy, ProxyConfig};
use crate::proxy::headers::HeaderBag;

/// Connection-scoped headers that never make sense on a new hop.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
];

/// A fully derived request, ready to dispatch to the upstream.
#[derive(Debug)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderBag,
    pub body: Option<Body>,
}

/// Build the outbound request from an inbound request on the proxy path.
///
/// `subpath` is the remainder of the inbound path after the proxy path; it is
/// only used when `append_subpath` is enabled.
pub fn build_outbound(
    parts: &request::Parts,
    body: Body,
    base: &Url,
    config: &ProxyConfig,
    subpath: &str,
) -> OutboundRequest {
    let subpath = if config.append_subpath { subpath } else { "" };
    let url = upstream_url(base, parts.uri.query(), subpath);
    let headers = sanitize_headers(&parts.headers, config);
    let body = include_body(&parts.method, config.body_policy).then_some(body);

    OutboundRequest {
        method: parts.method.clone(),
        url,
        headers,
        body,
    }
}

/// Compute the upstream URL for one request.
///
/// Each inbound pair is set on the upstream query: the first existing entry
/// with that key takes the new value and any later duplicates are dropped.
/// Upstream defaults whose keys never appear inbound are kept as they are.
///
/// A non-empty `subpath` is appended below the base path with its dot
/// segments removed, so the result never leaves the base path.
pub fn upstream_url(base: &Url, inbound_query: Option<&str>, subpath: &str) -> Url {
    let mut url = base.clone();

    let segments: Vec<&str> = subpath
        .split(['/', '\\'])
        .filter(|segment| !is_dot_segment(segment))
        .collect();
    if !segments.is_empty() {
        let joined = format!("{}/{}", url.path().trim_end_matches('/'), segments.join("/"));
        url.set_path(&joined);
    }

    let Some(query) = inbound_query.filter(|q| !q.is_empty()) else {
        return url;
    };

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        set_pair(&mut pairs, &key, &value);
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&pairs);
    }
    url
}

/// Empty, `.` and `..` segments, including percent-encoded dots. The URL
/// parser would resolve these and climb out of the upstream base path.
fn is_dot_segment(segment: &str) -> bool {
    let lower = segment.to_ascii_lowercase();
    matches!(lower.as_str(), "" | "." | ".." | "%2e" | "%2e%2e" | ".%2e" | "%2e.")
}

fn set_pair(pairs: &mut Vec<(String, String)>, key: &str, value: &str) {
    match pairs.iter().position(|(k, _)| k == key) {
        Some(first) => {
            pairs[first].1 = value.to_string();
            let mut index = 0;
            pairs.retain(|(k, _)| {
                let keep = index <= first || k != key;
                index += 1;
                keep
            });
        }
        None => pairs.push((key.to_string(), value.to_string())),
    }
}

/// Derive the outbound header set from the inbound headers.
pub fn sanitize_headers(inbound: &HeaderMap, config: &ProxyConfig) -> HeaderBag {
    let mut headers = match config.header_policy {
        HeaderPolicy::AllowList => {
            let mut bag = HeaderBag::new();
            bag.copy_from(inbound, header::CONTENT_TYPE);
            bag.copy_from(inbound, header::ACCEPT);
            bag
        }
        HeaderPolicy::BlockList => {
            let mut bag = HeaderBag::from(inbound.clone());
            bag.remove(header::CONTENT_LENGTH);
            bag.remove(header::HOST);
            if config.strip_hop_by_hop {
                strip_hop_by_hop(&mut bag, inbound);
            }
            bag
        }
    };

    if config.force_json_accept {
        headers.set(header::ACCEPT, HeaderValue::from_static("application/json"));
    }
    headers
}

fn strip_hop_by_hop(bag: &mut HeaderBag, inbound: &HeaderMap) {
    for name in HOP_BY_HOP {
        bag.remove(*name);
    }
    // Headers nominated by `Connection` are connection-scoped too.
    for value in inbound.get_all(header::CONNECTION) {
        let Ok(value) = value.to_str() else { continue };
        for token in value.split(',').map(str::trim) {
            if let Ok(name) = HeaderName::from_bytes(token.as_bytes()) {
                bag.remove(&name);
            }
        }
    }
}

/// Whether a request with `method` carries its body upstream.
pub fn include_body(method: &Method, policy: BodyPolicy) -> bool {
    match policy {
        BodyPolicy::ExceptGetHead => *method != Method::GET && *method != Method::HEAD,
        BodyPolicy::PayloadMethods => {
            *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    fn inbound_headers() -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        map.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
        map.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        map.insert(header::COOKIE, HeaderValue::from_static("session=1"));
        map.insert(header::HOST, HeaderValue::from_static("dashboard.example"));
        map.insert(header::CONTENT_LENGTH, HeaderValue::from_static("7"));
        map.insert("x-requested-with", HeaderValue::from_static("fetch"));
        map
    }

    #[test]
    fn test_query_pairs_are_propagated() {
        let url = upstream_url(
            &base("https://script.example/exec"),
            Some("token=abc&limit=10"),
            "",
        );
        assert_eq!(url.as_str(), "https://script.example/exec?token=abc&limit=10");
    }

    #[test]
    fn test_query_overwrites_upstream_defaults() {
        let url = upstream_url(
            &base("https://script.example/exec?mode=read&token=default&token=stale"),
            Some("token=abc"),
            "",
        );
        assert_eq!(url.as_str(), "https://script.example/exec?mode=read&token=abc");
    }

    #[test]
    fn test_repeated_inbound_key_last_wins() {
        let url = upstream_url(&base("http://up.example/"), Some("a=1&b=2&a=3"), "");
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("a".to_string(), "3".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_query_values_are_decoded_then_reencoded() {
        let url = upstream_url(&base("http://up.example/exec"), Some("q=a%20b&x=%26"), "");
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("q".to_string(), "a b".to_string()), ("x".to_string(), "&".to_string())]
        );
    }

    #[test]
    fn test_no_query_keeps_base() {
        let base = base("https://script.example/exec?mode=read");
        assert_eq!(upstream_url(&base, None, ""), base);
        assert_eq!(upstream_url(&base, Some(""), ""), base);
    }

    #[test]
    fn test_subpath_is_appended() {
        let url = upstream_url(&base("https://up.example/v1/"), Some("token=t"), "/whoami");
        assert_eq!(url.as_str(), "https://up.example/v1/whoami?token=t");

        let url = upstream_url(&base("https://up.example/v1"), None, "/");
        assert_eq!(url.as_str(), "https://up.example/v1");
    }

    #[test]
    fn test_subpath_cannot_climb_above_base() {
        let base = base("https://up.example/macros/s/ID/exec");
        for subpath in [
            "/../../../admin",
            "/%2e%2e/%2E%2E/%2e%2e/admin",
            "/.%2e/%2e./admin",
            "/..\\..\\admin",
            "/./admin/.",
        ] {
            let url = upstream_url(&base, None, subpath);
            assert_eq!(url.path(), "/macros/s/ID/exec/admin", "subpath {subpath}");
        }

        let url = upstream_url(&base, Some("token=t"), "/../..");
        assert_eq!(url.as_str(), "https://up.example/macros/s/ID/exec?token=t");
    }

    #[test]
    fn test_allow_list_keeps_only_content_type_and_accept() {
        let headers = sanitize_headers(&inbound_headers(), &ProxyConfig::default());

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "text/html");
        assert!(!headers.contains(header::AUTHORIZATION));
    }

    #[test]
    fn test_allow_list_with_nothing_present() {
        let headers = sanitize_headers(&HeaderMap::new(), &ProxyConfig::default());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_block_list_drops_host_and_length() {
        let config = ProxyConfig {
            header_policy: HeaderPolicy::BlockList,
            ..ProxyConfig::default()
        };
        let headers = sanitize_headers(&inbound_headers(), &config);

        assert_eq!(headers.len(), 5);
        assert!(!headers.contains(header::HOST));
        assert!(!headers.contains(header::CONTENT_LENGTH));
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer secret");
        assert_eq!(headers.get(header::COOKIE).unwrap(), "session=1");
    }

    #[test]
    fn test_block_list_strips_hop_by_hop() {
        let mut inbound = inbound_headers();
        inbound.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-session"));
        inbound.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        inbound.insert("x-session", HeaderValue::from_static("abc"));
        inbound.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));

        let mut config = ProxyConfig {
            header_policy: HeaderPolicy::BlockList,
            ..ProxyConfig::default()
        };
        let stripped = sanitize_headers(&inbound, &config);
        assert!(!stripped.contains(header::CONNECTION));
        assert!(!stripped.contains("keep-alive"));
        assert!(!stripped.contains("x-session"));
        assert!(!stripped.contains(header::TRANSFER_ENCODING));
        assert!(stripped.contains(header::AUTHORIZATION));

        config.strip_hop_by_hop = false;
        let kept = sanitize_headers(&inbound, &config);
        assert!(kept.contains(header::CONNECTION));
        assert!(kept.contains("x-session"));
    }

    #[test]
    fn test_force_json_accept() {
        let config = ProxyConfig {
            force_json_accept: true,
            ..ProxyConfig::default()
        };
        let headers = sanitize_headers(&inbound_headers(), &config);
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "application/json");

        let headers = sanitize_headers(&HeaderMap::new(), &config);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "application/json");
    }

    #[test]
    fn test_body_policy_except_get_head() {
        let policy = BodyPolicy::ExceptGetHead;
        assert!(!include_body(&Method::GET, policy));
        assert!(!include_body(&Method::HEAD, policy));
        assert!(include_body(&Method::POST, policy));
        assert!(include_body(&Method::PUT, policy));
        assert!(include_body(&Method::PATCH, policy));
        assert!(include_body(&Method::DELETE, policy));
    }

    #[test]
    fn test_body_policy_payload_methods() {
        let policy = BodyPolicy::PayloadMethods;
        assert!(include_body(&Method::POST, policy));
        assert!(include_body(&Method::PUT, policy));
        assert!(include_body(&Method::PATCH, policy));
        assert!(!include_body(&Method::DELETE, policy));
        assert!(!include_body(&Method::GET, policy));
    }

    #[test]
    fn test_build_outbound() {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("http://dashboard.example/api/rows?token=abc&id=7")
            .header(header::AUTHORIZATION, "Bearer secret")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (parts, body) = request.into_parts();

        let config = ProxyConfig {
            body_policy: BodyPolicy::PayloadMethods,
            ..ProxyConfig::default()
        };
        let outbound = build_outbound(
            &parts,
            body,
            &base("https://script.example/exec"),
            &config,
            "/rows",
        );

        assert_eq!(outbound.method, Method::DELETE);
        assert_eq!(outbound.url.as_str(), "https://script.example/exec?token=abc&id=7");
        assert_eq!(outbound.headers.len(), 1);
        assert!(outbound.body.is_none());
    }
}
