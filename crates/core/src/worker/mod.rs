//! Offline cache controller.
//!
//! Intercepts page requests and answers them from the active cache
//! generation, the network, or an offline fallback:
//!
//! - **Install** fetches the app shell into a new generation, all-or-nothing.
//! - **Activate** promotes the current generation and deletes every other one.
//! - **Intercept** serves cache hits immediately and refreshes them in the
//!   background; misses go to the network and are stored when cacheable;
//!   failed navigations fall back to the offline document.
//!
//! All durable state lives in the [`CacheStore`]; a controller can be
//! dropped and rebuilt between events.

pub mod event;
pub mod lifecycle;
pub mod revalidate;
pub mod route;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use url::Url;

use crate::Error;
use crate::http::{Request, Response};
use crate::store::{CacheStore, Network};

pub use event::{ControlMessage, EventOutcome, MessageOutcome, Notification, WorkerEvent};
pub use lifecycle::LifecycleState;
pub use revalidate::Revalidation;
pub use route::{PassThrough, Route};

use lifecycle::Lifecycle;

/// Controller configuration, resolved against the site origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub origin: Url,
    /// Identifier of the generation this controller installs and serves.
    pub generation: String,
    pub precache: Vec<Url>,
    /// Lower-cased host names, matched exactly or as a parent domain.
    pub allowlist: Vec<String>,
    pub offline_url: Url,
    pub fallback_url: Url,
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseSource {
    Cache,
    Network,
    OfflineFallback,
    Unavailable,
    PassThrough,
}

/// A response produced for an intercepted request.
#[derive(Debug)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
    /// Present on cache hits; the refresh runs whether or not this is awaited.
    pub revalidation: Option<Revalidation>,
}

/// What the controller did with one request.
#[derive(Debug)]
pub enum Interception {
    PassThrough(PassThrough),
    Respond(Served),
}

/// Result of an activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ActivationReport {
    pub generation: String,
    /// Stale generations deleted.
    pub removed: Vec<String>,
    /// Stale generations whose deletion failed; they stay behind.
    pub failed: Vec<String>,
}

/// Serves page requests from a generational cache with network refresh.
pub struct OfflineCacheController<S, N> {
    config: Arc<WorkerConfig>,
    store: Arc<S>,
    network: Arc<N>,
    lifecycle: Arc<Mutex<Lifecycle>>,
}

impl<S, N> Clone for OfflineCacheController<S, N> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
            network: Arc::clone(&self.network),
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }
}

impl<S: CacheStore, N: Network> OfflineCacheController<S, N> {
    pub fn new(config: WorkerConfig, store: S, network: N) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            network: Arc::new(network),
            lifecycle: Arc::new(Mutex::new(Lifecycle::default())),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.lock().await.state
    }

    /// Route one event to its handler.
    pub async fn dispatch(&self, event: WorkerEvent) -> Result<EventOutcome, Error> {
        match event {
            WorkerEvent::Install => {
                self.install().await?;
                let skip_waiting = self.lifecycle.lock().await.skip_waiting;
                Ok(EventOutcome::Installed { skip_waiting })
            }
            WorkerEvent::Activate => Ok(EventOutcome::Activated(self.activate().await?)),
            WorkerEvent::Fetch(request) => Ok(EventOutcome::Fetched(self.intercept(request).await)),
            WorkerEvent::Message(message) => Ok(EventOutcome::Acknowledged(self.handle_message(message).await?)),
            WorkerEvent::Sync { tag, periodic } => Ok(EventOutcome::Synced { ran: self.sync(&tag, periodic).await }),
            WorkerEvent::Push { data } => Ok(EventOutcome::Notify(self.push(data.as_deref()))),
            WorkerEvent::NotificationClick { action } => {
                Ok(EventOutcome::NotificationClicked { open_window: self.notification_click(action.as_deref()) })
            }
        }
    }

    /// Install, then activate straight away if install asked to skip waiting.
    ///
    /// Returns the activation report when activation ran.
    pub async fn register(&self) -> Result<Option<ActivationReport>, Error> {
        match self.dispatch(WorkerEvent::Install).await? {
            EventOutcome::Installed { skip_waiting: true } => Ok(Some(self.activate().await?)),
            _ => Ok(None),
        }
    }

    /// Fetch every manifest URL and store them as the current generation.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallFailed` if any manifest URL cannot be fetched or
    /// does not answer with a 2xx; nothing is written in that case and the
    /// active generation is untouched.
    pub async fn install(&self) -> Result<(), Error> {
        let previous = self.lifecycle.lock().await.begin_install()?;
        tracing::info!(generation = %self.config.generation, "installing");

        let result = self.populate().await;

        let mut lifecycle = self.lifecycle.lock().await;
        match result {
            Ok(count) => {
                lifecycle.install_succeeded();
                tracing::info!(generation = %self.config.generation, entries = count, "install complete");
                Ok(())
            }
            Err(err) => {
                lifecycle.state = previous;
                tracing::error!(generation = %self.config.generation, error = %err, "install failed");
                Err(err)
            }
        }
    }

    async fn populate(&self) -> Result<usize, Error> {
        tracing::info!(urls = self.config.precache.len(), "caching app shell");

        let mut fetches = JoinSet::new();
        for url in &self.config.precache {
            let network = Arc::clone(&self.network);
            let request = Request::get(url.clone());
            fetches.spawn(async move {
                let response = network.fetch(&request).await.map_err(|e| Error::InstallFailed {
                    url: request.url.to_string(),
                    reason: e.to_string(),
                })?;
                if !(200..300).contains(&response.status) {
                    return Err(Error::InstallFailed {
                        url: request.url.to_string(),
                        reason: format!("status {}", response.status),
                    });
                }
                Ok((request, response))
            });
        }

        let mut entries = Vec::with_capacity(self.config.precache.len());
        while let Some(joined) = fetches.join_next().await {
            let entry = joined.map_err(|e| Error::InstallFailed { url: "<manifest>".into(), reason: e.to_string() })??;
            entries.push(entry);
        }

        let count = entries.len();
        self.store
            .install_generation(&self.config.generation, entries)
            .await
            .map_err(|e| Error::InstallFailed { url: "<store>".into(), reason: e.to_string() })?;
        Ok(count)
    }

    /// Promote the current generation, delete every other one, claim pages.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInstalled` if the current generation is not in the
    /// store. Failing to delete a stale generation is not an error; it is
    /// listed in [`ActivationReport::failed`].
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        let previous = self.lifecycle.lock().await.begin_activate()?;
        tracing::info!(generation = %self.config.generation, "activating");

        let result = self.promote_and_clean().await;

        let mut lifecycle = self.lifecycle.lock().await;
        match result {
            Ok(report) => {
                lifecycle.activate_succeeded();
                tracing::info!(
                    generation = %report.generation,
                    removed = report.removed.len(),
                    failed = report.failed.len(),
                    "activation complete; claiming clients"
                );
                Ok(report)
            }
            Err(err) => {
                lifecycle.state = previous;
                Err(err)
            }
        }
    }

    async fn promote_and_clean(&self) -> Result<ActivationReport, Error> {
        let current = &self.config.generation;
        self.store.promote(current).await?;

        let mut report = ActivationReport { generation: current.clone(), removed: Vec::new(), failed: Vec::new() };
        let stale = self.store.generations().await?.into_iter().filter(|g| &g.name != current);

        for generation in stale {
            tracing::info!(generation = %generation.name, "removing old cache");
            match self.store.delete_generation(&generation.name).await {
                Ok(_) => report.removed.push(generation.name),
                Err(err) => {
                    tracing::warn!(generation = %generation.name, error = %err, "failed to remove old cache");
                    report.failed.push(generation.name);
                }
            }
        }

        Ok(report)
    }

    /// Decide how to answer one request. Never fails: network and store
    /// errors end in a fallback or a synthetic 503.
    pub async fn intercept(&self, request: Request) -> Interception {
        if let Route::PassThrough(reason) = route::route(&request, &self.config) {
            tracing::trace!(url = %request.url, ?reason, "passing through");
            return Interception::PassThrough(reason);
        }

        let generation = match self.store.active_generation().await {
            Ok(Some(generation)) => generation,
            Ok(None) => return Interception::PassThrough(PassThrough::NotControlling),
            Err(err) => {
                tracing::warn!(error = %err, "cannot read active generation; passing through");
                return Interception::PassThrough(PassThrough::NotControlling);
            }
        };

        match self.store.match_entry(&generation, &request).await {
            Ok(Some(cached)) => {
                tracing::debug!(url = %request.url, "cache hit");
                let revalidation = Revalidation::spawn(
                    Arc::clone(&self.store),
                    Arc::clone(&self.network),
                    generation,
                    request,
                );
                return Interception::Respond(Served {
                    response: cached,
                    source: ResponseSource::Cache,
                    revalidation: Some(revalidation),
                });
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(url = %request.url, error = %err, "cache read failed; treating as miss"),
        }

        match self.network.fetch(&request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.store
                        .put_entry(&generation, &request, &response)
                        .await
                        .unwrap_or_else(|err| tracing::debug!(url = %request.url, error = %err, "cache write failed"));
                }
                Interception::Respond(Served { response, source: ResponseSource::Network, revalidation: None })
            }
            Err(err) => {
                tracing::debug!(url = %request.url, error = %err, "network failed; using offline response");
                Interception::Respond(self.offline_response(&generation, &request).await)
            }
        }
    }

    async fn offline_response(&self, generation: &str, request: &Request) -> Served {
        for url in route::offline_candidates(request, &self.config) {
            if let Ok(Some(response)) = self.store.match_entry(generation, &Request::get(url.clone())).await {
                return Served { response, source: ResponseSource::OfflineFallback, revalidation: None };
            }
        }
        Served { response: Response::service_unavailable(), source: ResponseSource::Unavailable, revalidation: None }
    }

    /// Intercept a request and perform pass-throughs on the page's behalf.
    ///
    /// Only pass-through network failures are returned as errors.
    pub async fn respond(&self, request: Request) -> Result<Served, Error> {
        match self.intercept(request.clone()).await {
            Interception::Respond(served) => Ok(served),
            Interception::PassThrough(_) => {
                let response = self.network.fetch(&request).await?;
                Ok(Served { response, source: ResponseSource::PassThrough, revalidation: None })
            }
        }
    }

    /// Handle a control message posted by a page. Both commands are idempotent.
    ///
    /// `CLEAR_CACHE` empties this controller's own generation, not whichever
    /// one is serving. After a failed upgrade the older generation keeps
    /// serving and the clear removes nothing.
    pub async fn handle_message(&self, message: ControlMessage) -> Result<MessageOutcome, Error> {
        match message {
            ControlMessage::SkipWaiting => {
                let waiting = self.lifecycle.lock().await.request_skip_waiting();
                let activation = if waiting { Some(self.activate().await?) } else { None };
                Ok(MessageOutcome::SkipWaiting { activation })
            }
            ControlMessage::ClearCache => {
                let removed = self.store.clear_generation(&self.config.generation).await?;
                tracing::info!(generation = %self.config.generation, removed, "cache cleared");
                Ok(MessageOutcome::CacheCleared { removed })
            }
        }
    }

    /// Handle a (periodic) background sync. Returns whether the tag was known.
    pub async fn sync(&self, tag: &str, periodic: bool) -> bool {
        if !event::is_known_sync(tag, periodic) {
            tracing::debug!(tag, periodic, "ignoring sync event");
            return false;
        }
        if periodic {
            tracing::info!(tag, "periodic sync: updating legislation data");
        } else {
            tracing::info!(tag, "background sync triggered");
        }
        self.sync_data().await;
        true
    }

    /// Build the notification to show for a push message.
    pub fn push(&self, payload: Option<&str>) -> Notification {
        let notification = Notification::for_push(payload, chrono::Utc::now());
        tracing::info!(body = %notification.body, "showing push notification");
        notification
    }

    /// Handle a click on a push notification. Returns the page to open.
    ///
    /// Only the `view` action opens a window (the site root); any other
    /// action, or a click on the body, just closes the notification.
    pub fn notification_click(&self, action: Option<&str>) -> Option<Url> {
        match action {
            Some(event::VIEW_ACTION) => {
                let root = self.config.origin.join("/").unwrap_or_else(|_| self.config.origin.clone());
                Some(root)
            }
            _ => {
                tracing::debug!(?action, "notification closed");
                None
            }
        }
    }

    /// Data sync hook. There is no backend to pull from yet.
    async fn sync_data(&self) {
        tracing::info!("syncing data");
    }
}
