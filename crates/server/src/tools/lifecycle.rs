//! sw_install and sw_activate tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{CacheStore, Network, OfflineCacheController};

use super::json_result;

/// Output from the sw_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwInstallOutput {
    /// Generation that was installed.
    pub generation: String,
    /// Whether activation ran right after install.
    pub activated: bool,
    /// Stale generations deleted during activation.
    pub removed: Vec<String>,
    /// Stale generations that could not be deleted.
    pub failed: Vec<String>,
}

/// Implementation of the sw_install tool: install, then activate.
pub async fn install_impl<S: CacheStore, N: Network>(
    controller: &OfflineCacheController<S, N>,
) -> Result<CallToolResult, McpError> {
    let activation = controller.register().await?;

    let output = SwInstallOutput {
        generation: controller.config().generation.clone(),
        activated: activation.is_some(),
        removed: activation.as_ref().map(|r| r.removed.clone()).unwrap_or_default(),
        failed: activation.map(|r| r.failed).unwrap_or_default(),
    };
    json_result(&output)
}

/// Implementation of the sw_activate tool.
pub async fn activate_impl<S: CacheStore, N: Network>(
    controller: &OfflineCacheController<S, N>,
) -> Result<CallToolResult, McpError> {
    let report = controller.activate().await?;
    json_result(&report)
}
