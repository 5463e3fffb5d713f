//! sw_fetch tool implementation.
//!
//! Sends one request through the controller as if the page had issued it.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::canonicalize;
use shellcache_core::{CacheStore, Error, Network, OfflineCacheController, Request, ResponseKind, ResponseSource};

use super::json_result;

/// Input parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// URL or site-relative path (e.g. "/about.html").
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Treat the request as a page navigation.
    #[serde(default)]
    pub navigate: bool,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// Canonical request URL.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    /// Where the response came from.
    pub source: ResponseSource,
    pub kind: ResponseKind,
    pub content_type: Option<String>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    /// Body size in bytes.
    pub bytes: usize,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl<S: CacheStore, N: Network>(
    controller: &OfflineCacheController<S, N>, params: SwFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let url = canonicalize(&controller.config().origin, &params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let request = if params.navigate { Request::navigate(url) } else { Request::get(url) };
    let request = request.with_method(params.method);

    let served = controller.respond(request.clone()).await?;
    let response = served.response;

    let output = SwFetchOutput {
        url: request.url.to_string(),
        status: response.status,
        status_text: response.status_text.clone(),
        source: served.source,
        kind: response.kind,
        content_type: response.content_type().map(str::to_string),
        body: String::from_utf8_lossy(&response.body).to_string(),
        bytes: response.body.len(),
    };
    json_result(&output)
}
