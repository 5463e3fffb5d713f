//! sw_push and sw_notification_click tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::worker::Notification;
use shellcache_core::{CacheStore, Network, OfflineCacheController};

use super::json_result;

/// Parameters for the sw_push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    /// Push payload text, shown as the notification body.
    #[serde(default)]
    pub data: Option<String>,
}

/// Implementation of the sw_push tool. Returns the notification to display.
pub async fn push_impl<S: CacheStore, N: Network>(
    controller: &OfflineCacheController<S, N>, params: SwPushParams,
) -> Result<CallToolResult, McpError> {
    let notification: Notification = controller.push(params.data.as_deref());
    json_result(&notification)
}

/// Parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickParams {
    /// Action button clicked ("view" or "close"); omit for a click on the body.
    #[serde(default)]
    pub action: Option<String>,
}

/// Output from the sw_notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickOutput {
    /// Page to open in a new window, if any.
    pub open_window: Option<String>,
}

/// Implementation of the sw_notification_click tool.
pub async fn click_impl<S: CacheStore, N: Network>(
    controller: &OfflineCacheController<S, N>, params: SwNotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let open_window = controller.notification_click(params.action.as_deref());
    json_result(&SwNotificationClickOutput { open_window: open_window.map(|url| url.to_string()) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{EchoNetwork, controller, parse};

    #[tokio::test]
    async fn test_push_with_payload() {
        let controller = controller(EchoNetwork, &["/"]).await;
        let params = SwPushParams { data: Some("Vote tonight".into()) };

        let notification: Notification = parse(&push_impl(&controller, params).await.unwrap());
        assert_eq!(notification.title, "MP Tracker");
        assert_eq!(notification.body, "Vote tonight");
        assert_eq!(notification.icon, "/icons/icon-192x192.png");
        assert_eq!(notification.actions.len(), 2);
    }

    #[tokio::test]
    async fn test_push_without_payload() {
        let controller = controller(EchoNetwork, &["/"]).await;
        let notification: Notification = parse(&push_impl(&controller, SwPushParams::default()).await.unwrap());
        assert_eq!(notification.body, "New updates available!");
    }

    #[tokio::test]
    async fn test_view_click_opens_root() {
        let controller = controller(EchoNetwork, &["/"]).await;
        let params = SwNotificationClickParams { action: Some("view".into()) };

        let output: SwNotificationClickOutput = parse(&click_impl(&controller, params).await.unwrap());
        assert_eq!(output.open_window.as_deref(), Some("http://localhost:8080/"));
    }

    #[tokio::test]
    async fn test_other_clicks_open_nothing() {
        let controller = controller(EchoNetwork, &["/"]).await;
        for action in [Some("close".to_string()), None] {
            let params = SwNotificationClickParams { action };
            let output: SwNotificationClickOutput = parse(&click_impl(&controller, params).await.unwrap());
            assert!(output.open_window.is_none());
        }
    }
}
