//! sw_message and sw_sync tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::worker::{ControlMessage, MessageOutcome};
use shellcache_core::{CacheStore, Network, OfflineCacheController};

use super::json_result;

/// Parameters for the sw_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageParams {
    /// Message type: "SKIP_WAITING" or "CLEAR_CACHE". Others are ignored.
    #[serde(rename = "type")]
    pub message_type: String,
}

/// Output from the sw_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageOutput {
    /// False when the message type was not recognised.
    pub handled: bool,
    pub outcome: Option<MessageOutcome>,
}

/// Implementation of the sw_message tool.
pub async fn message_impl<S: CacheStore, N: Network>(
    controller: &OfflineCacheController<S, N>, params: SwMessageParams,
) -> Result<CallToolResult, McpError> {
    let message = ControlMessage::from_json(&serde_json::json!({ "type": params.message_type }));

    let outcome = match message {
        Some(message) => Some(controller.handle_message(message).await?),
        None => {
            tracing::debug!(message_type = %params.message_type, "ignoring unknown message");
            None
        }
    };

    json_result(&SwMessageOutput { handled: outcome.is_some(), outcome })
}

/// Parameters for the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    /// Sync tag, e.g. "sync-data" or "update-legislation".
    pub tag: String,

    /// Deliver as a periodic sync rather than a one-off.
    #[serde(default)]
    pub periodic: bool,
}

/// Output from the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncOutput {
    /// Whether the tag triggered the data sync.
    pub ran: bool,
}

/// Implementation of the sw_sync tool.
pub async fn sync_impl<S: CacheStore, N: Network>(
    controller: &OfflineCacheController<S, N>, params: SwSyncParams,
) -> Result<CallToolResult, McpError> {
    let ran = controller.sync(&params.tag, params.periodic).await;
    json_result(&SwSyncOutput { ran })
}
