//! MCP server handler implementation.
//!
//! Routes tool calls to the offline cache controller.

use crate::tools::cache::{CacheGetParams, get_impl};
use crate::tools::fetch::{SwFetchParams, fetch_impl};
use crate::tools::lifecycle::{activate_impl, install_impl};
use crate::tools::message::{SwMessageParams, SwSyncParams, message_impl, sync_impl};
use crate::tools::notify::{SwNotificationClickParams, SwPushParams, click_impl, push_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use shellcache_client::FetchClient;
use shellcache_core::{CacheDb, OfflineCacheController};

pub type Controller = OfflineCacheController<CacheDb, FetchClient>;

/// The MCP server handler for shellcache.
#[derive(Clone)]
pub struct ShellcacheServer {
    controller: Controller,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ShellcacheServer {
    pub fn new(controller: Controller) -> Self {
        Self { controller, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Install the current cache generation by fetching every precache URL, then activate it and delete stale generations."
    )]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.controller).await
    }

    #[tool(description = "Activate the installed generation and delete every other generation.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.controller).await
    }

    /// Intercept a request the way a page load would.
    ///
    /// Cache hits are answered immediately and refreshed in the background.
    /// Misses go to the network; offline navigations fall back to the offline page.
    #[tool(
        description = "Send a request through the offline cache. Returns the response and whether it came from cache, network, offline fallback or pass-through."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.controller, params.0).await
    }

    #[tool(description = "Post a control message (SKIP_WAITING or CLEAR_CACHE) to the cache controller.")]
    async fn sw_message(&self, params: Parameters<SwMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.controller, params.0).await
    }

    #[tool(description = "Deliver a background sync event ('sync-data', or periodic 'update-legislation').")]
    async fn sw_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.controller, params.0).await
    }

    #[tool(description = "Deliver a push message. Returns the 'MP Tracker' notification to display.")]
    async fn sw_push(&self, params: Parameters<SwPushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.controller, params.0).await
    }

    #[tool(
        description = "Deliver a notification click. The 'view' action opens the site root; anything else just closes."
    )]
    async fn sw_notification_click(
        &self, params: Parameters<SwNotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        click_impl(&self.controller, params.0).await
    }

    #[tool(
        description = "Inspect the cache. Without a url, lists generations and lifecycle state; with a url, returns the cached entry's metadata."
    )]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.controller, params.0).await
    }
}

impl ServerHandler for ShellcacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "shellcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
