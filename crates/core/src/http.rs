//! Request and response model shared by the controller, the store and the network.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::hash::compute_request_key;

/// How the page issued a request.
///
/// Only [`RequestMode::Navigate`] is treated as a page navigation when
/// choosing an offline fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Navigate,
    #[default]
    SameOrigin,
    NoCors,
    Cors,
}

/// An outgoing resource request from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
}

impl Request {
    /// A plain subresource `GET`.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".into(), url, mode: RequestMode::SameOrigin }
    }

    /// A top-level page navigation.
    pub fn navigate(url: Url) -> Self {
        Self { method: "GET".into(), url, mode: RequestMode::Navigate }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into().to_ascii_uppercase();
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// Normalized cache key for this request (method + URL without fragment).
    pub fn key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        compute_request_key(&self.method, url.as_str())
    }
}

/// Response type as seen by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseKind {
    /// Same-origin response.
    Basic,
    /// Cross-origin response readable by the page.
    Cors,
    /// Cross-origin response the page cannot read.
    Opaque,
    /// Built locally, never came from the network.
    Synthetic,
}

impl ResponseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::Cors => "cors",
            ResponseKind::Opaque => "opaque",
            ResponseKind::Synthetic => "synthetic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(ResponseKind::Basic),
            "cors" => Some(ResponseKind::Cors),
            "opaque" => Some(ResponseKind::Opaque),
            "synthetic" => Some(ResponseKind::Synthetic),
            _ => None,
        }
    }
}

/// A response snapshot: what the network returned or what the cache holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: Option<String>,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub kind: ResponseKind,
}

impl Response {
    /// A same-origin `200 OK` with the given body.
    pub fn ok(url: &Url, body: impl Into<Bytes>) -> Self {
        Self {
            url: Some(url.to_string()),
            status: 200,
            status_text: "OK".into(),
            headers: Vec::new(),
            body: body.into(),
            kind: ResponseKind::Basic,
        }
    }

    /// The response returned when nothing, not even a fallback, can answer.
    pub fn service_unavailable() -> Self {
        Self {
            url: None,
            status: 503,
            status_text: "Service Unavailable".into(),
            headers: Vec::new(),
            body: Bytes::new(),
            kind: ResponseKind::Synthetic,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Eligible to overwrite an existing entry during revalidation.
    pub fn is_refreshable(&self) -> bool {
        self.status == 200
    }

    /// Eligible to be stored on a cache miss.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_key_ignores_fragment() {
        let a = Request::get(url("http://localhost:8080/about.html#team"));
        let b = Request::get(url("http://localhost:8080/about.html"));
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_key_depends_on_method() {
        let get = Request::get(url("http://localhost:8080/"));
        let head = Request::get(url("http://localhost:8080/")).with_method("head");
        assert_eq!(head.method, "HEAD");
        assert_ne!(get.key(), head.key());
    }

    #[test]
    fn test_navigation_flag() {
        assert!(Request::navigate(url("http://localhost:8080/")).is_navigation());
        assert!(!Request::get(url("http://localhost:8080/")).is_navigation());
    }

    #[test]
    fn test_service_unavailable_has_no_body() {
        let resp = Response::service_unavailable();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.status_text, "Service Unavailable");
        assert!(resp.body.is_empty());
        assert_eq!(resp.kind, ResponseKind::Synthetic);
        assert!(!resp.is_cacheable());
    }

    #[test]
    fn test_cacheability() {
        let ok = Response::ok(&url("http://localhost:8080/"), "<html>");
        assert!(ok.is_cacheable());

        let cors = Response { kind: ResponseKind::Cors, ..ok.clone() };
        assert!(!cors.is_cacheable());
        assert!(cors.is_refreshable());

        let missing = Response { status: 404, ..ok };
        assert!(!missing.is_cacheable());
        assert!(!missing.is_refreshable());
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let resp = Response::ok(&url("http://localhost:8080/"), "").with_header("Content-Type", "text/html");
        assert_eq!(resp.content_type(), Some("text/html"));
        assert_eq!(resp.header("x-missing"), None);
    }

    #[test]
    fn test_kind_round_names() {
        for kind in [ResponseKind::Basic, ResponseKind::Cors, ResponseKind::Opaque, ResponseKind::Synthetic] {
            assert_eq!(ResponseKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ResponseKind::parse("default"), None);
    }
}
