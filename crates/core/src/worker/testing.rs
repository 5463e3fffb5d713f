//! In-process network double for controller tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use url::Url;

use crate::Error;
use crate::config::AppConfig;
use crate::http::{Request, Response};
use crate::store::Network;

use super::WorkerConfig;

pub(crate) const ORIGIN: &str = "http://localhost:8080";

pub(crate) fn site_url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

pub(crate) fn worker_config(generation: &str, precache: &[&str]) -> WorkerConfig {
    AppConfig {
        origin: ORIGIN.into(),
        generation: generation.into(),
        precache: precache.iter().map(|p| p.to_string()).collect(),
        ..Default::default()
    }
    .worker_config()
    .unwrap()
}

/// Serves scripted responses keyed by absolute URL; unknown URLs get a 404.
#[derive(Default)]
pub(crate) struct ScriptedNetwork {
    responses: Mutex<HashMap<String, Response>>,
    failing: Mutex<HashSet<String>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedNetwork {
    pub(crate) fn serve(&self, path: &str, body: &str) {
        let url = site_url(path);
        let response = Response::ok(&url, body.to_string()).with_header("Content-Type", "text/html");
        self.responses.lock().unwrap().insert(url.to_string(), response);
    }

    pub(crate) fn respond(&self, url: &str, response: Response) {
        self.responses.lock().unwrap().insert(url.to_string(), response);
    }

    pub(crate) fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(site_url(path).to_string());
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.url.to_string();
        if self.offline.load(Ordering::SeqCst) || self.failing.lock().unwrap().contains(&url) {
            return Err(Error::Network(format!("{url}: unreachable")));
        }
        let found = self.responses.lock().unwrap().get(&url).cloned();
        let not_found = || Response { status: 404, status_text: "Not Found".into(), ..Response::ok(&request.url, "") };
        Ok(found.unwrap_or_else(not_found))
    }
}
