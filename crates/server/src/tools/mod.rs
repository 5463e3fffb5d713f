//! MCP tool implementations.
//!
//! Each tool drives one controller operation. Implementations are generic
//! over the store and network so tests can run them without a live site.

pub mod cache;
pub mod fetch;
pub mod lifecycle;
pub mod message;
pub mod notify;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use shellcache_core::Error;

/// Render a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;
    use shellcache_core::{
        AppConfig, CacheDb, Error, Network, OfflineCacheController, Request, Response, WorkerConfig,
    };

    /// Answers every request with a small HTML page echoing its path.
    pub(crate) struct EchoNetwork;

    #[async_trait]
    impl Network for EchoNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, Error> {
            Ok(Response::ok(&request.url, format!("<p>{}</p>", request.url.path()))
                .with_header("Content-Type", "text/html"))
        }
    }

    /// Fails every request as if the machine were offline.
    pub(crate) struct OfflineNetwork;

    #[async_trait]
    impl Network for OfflineNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, Error> {
            Err(Error::Network(format!("{}: unreachable", request.url)))
        }
    }

    pub(crate) fn worker_config(precache: &[&str]) -> WorkerConfig {
        AppConfig { precache: precache.iter().map(|p| p.to_string()).collect(), ..Default::default() }
            .worker_config()
            .unwrap()
    }

    pub(crate) async fn controller<N: Network>(network: N, precache: &[&str]) -> OfflineCacheController<CacheDb, N> {
        let db = CacheDb::open_in_memory().await.unwrap();
        OfflineCacheController::new(worker_config(precache), db, network)
    }

    pub(crate) fn parse<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
