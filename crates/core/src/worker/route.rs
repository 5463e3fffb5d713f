//! Request routing decisions.
//!
//! Pure functions of the request and the configuration; no store or network
//! access happens here.

use serde::{Deserialize, Serialize};
use url::Url;

use super::WorkerConfig;
use crate::http::Request;

/// Why a request was left to the page's own networking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case", tag = "reason")]
pub enum PassThrough {
    /// Different origin. `allow_listed` is informational only: every
    /// cross-origin request is passed through the same way.
    CrossOrigin { allow_listed: bool },
    /// Only GET requests are stored.
    NonGet,
    /// No generation is active yet, so the controller controls no pages.
    NotControlling,
}

/// Outcome of routing one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    PassThrough(PassThrough),
    Handle,
}

/// True when `host` equals `domain` or is one of its subdomains.
pub fn matches_domain(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.');
    if host.eq_ignore_ascii_case(domain) {
        return true;
    }
    host.len() > domain.len()
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
        && host[host.len() - domain.len()..].eq_ignore_ascii_case(domain)
}

pub fn is_allow_listed(config: &WorkerConfig, url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| config.allowlist.iter().any(|domain| matches_domain(host, domain)))
}

/// Decide whether the controller handles a request at all.
pub fn route(request: &Request, config: &WorkerConfig) -> Route {
    if request.url.origin() != config.origin.origin() {
        return Route::PassThrough(PassThrough::CrossOrigin { allow_listed: is_allow_listed(config, &request.url) });
    }
    if !request.is_get() {
        return Route::PassThrough(PassThrough::NonGet);
    }
    Route::Handle
}

/// Documents to try, in order, when a request fails with no network.
pub fn offline_candidates<'a>(request: &Request, config: &'a WorkerConfig) -> Vec<&'a Url> {
    if request.is_navigation() { vec![&config.offline_url, &config.fallback_url] } else { Vec::new() }
}
