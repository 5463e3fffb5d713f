//! Capabilities the controller consumes: a generational cache store and a network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::http::{Request, Response};

/// Whether a generation is serving traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GenerationState {
    Installed,
    Active,
}

impl GenerationState {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationState::Installed => "installed",
            GenerationState::Active => "active",
        }
    }
}

/// One versioned snapshot of cached resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Generation {
    pub name: String,
    pub state: GenerationState,
    pub created_at: String,
    pub activated_at: Option<String>,
    pub entry_count: u64,
}

/// Storage for cache generations and their entries.
///
/// Entries are replaced wholesale; concurrent writers to one key race
/// last-writer-wins.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Every stored generation, oldest first.
    async fn generations(&self) -> Result<Vec<Generation>, Error>;

    /// Name of the generation currently serving, if any.
    async fn active_generation(&self) -> Result<Option<String>, Error>;

    /// Create `name` (if absent) and replace its contents with `entries`.
    ///
    /// All-or-nothing: on error the store is left as it was.
    async fn install_generation(&self, name: &str, entries: Vec<(Request, Response)>) -> Result<(), Error>;

    /// Make `name` the only active generation.
    async fn promote(&self, name: &str) -> Result<(), Error>;

    /// Drop a generation and its entries. Returns false if it did not exist.
    async fn delete_generation(&self, name: &str) -> Result<bool, Error>;

    /// Drop every entry of a generation, keeping the generation itself.
    async fn clear_generation(&self, name: &str) -> Result<u64, Error>;

    async fn match_entry(&self, generation: &str, request: &Request) -> Result<Option<Response>, Error>;

    async fn put_entry(&self, generation: &str, request: &Request, response: &Response) -> Result<(), Error>;
}

/// Live network access.
///
/// `Err` means no response arrived at all. HTTP error statuses are `Ok`.
#[async_trait]
pub trait Network: Send + Sync + 'static {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

#[async_trait]
impl<T: Network + ?Sized> Network for std::sync::Arc<T> {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        (**self).fetch(request).await
    }
}
