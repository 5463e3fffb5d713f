//! cache_get tool implementation.
//!
//! Without a URL, reports the stored generations and lifecycle state.
//! With a URL, looks the request up in the active generation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::canonicalize;
use shellcache_core::worker::LifecycleState;
use shellcache_core::{CacheStore, Error, Generation, Network, OfflineCacheController, Request, ResponseKind};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// URL or site-relative path to look up. Omit to list generations.
    #[serde(default)]
    pub url: Option<String>,
}

/// Overview of the store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheOverview {
    pub state: LifecycleState,
    pub active: Option<String>,
    pub generations: Vec<Generation>,
}

/// Metadata of one cached entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheEntryOutput {
    pub generation: String,
    pub url: String,
    pub status: u16,
    pub kind: ResponseKind,
    pub content_type: Option<String>,
    pub bytes: usize,
}

/// Implementation of the cache_get tool.
pub async fn get_impl<S: CacheStore, N: Network>(
    controller: &OfflineCacheController<S, N>, params: CacheGetParams,
) -> Result<CallToolResult, McpError> {
    let store = controller.store();
    let active = store.active_generation().await?;

    let Some(raw) = params.url else {
        let generations = store.generations().await?;
        let overview = CacheOverview { state: controller.state().await, active, generations };
        return json_result(&overview);
    };

    let url = canonicalize(&controller.config().origin, &raw).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let generation = active.ok_or_else(|| Error::CacheMiss(format!("{url}: no active generation")))?;
    let request = Request::get(url);
    let response = store
        .match_entry(&generation, &request)
        .await?
        .ok_or_else(|| Error::CacheMiss(request.url.to_string()))?;

    let output = CacheEntryOutput {
        generation,
        url: request.url.to_string(),
        status: response.status,
        kind: response.kind,
        content_type: response.content_type().map(str::to_string),
        bytes: response.body.len(),
    };
    json_result(&output)
}
