//! Events the host delivers to the controller and what each produces.

use serde::{Deserialize, Serialize};

use super::{ActivationReport, Interception};
use url::Url;

use crate::http::Request;

/// Tag of the one-off background sync that refreshes data.
pub const SYNC_DATA_TAG: &str = "sync-data";

/// Tag of the periodic background sync that refreshes legislation data.
pub const UPDATE_LEGISLATION_TAG: &str = "update-legislation";

/// Commands posted to the controller by a page.
///
/// Parsed from `{"type": "SKIP_WAITING"}` / `{"type": "CLEAR_CACHE"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    SkipWaiting,
    ClearCache,
}

impl ControlMessage {
    /// Parse a posted message. Anything unrecognised yields `None` and is ignored.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// Result of handling a control message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum MessageOutcome {
    /// Skip-waiting recorded; `activation` is set when a waiting install was promoted.
    SkipWaiting { activation: Option<ActivationReport> },
    CacheCleared { removed: u64 },
}

/// Title of every notification shown on push.
pub const NOTIFICATION_TITLE: &str = "MP Tracker";

/// Body used when a push carries no payload.
pub const DEFAULT_PUSH_BODY: &str = "New updates available!";

/// Notification action that opens the app.
pub const VIEW_ACTION: &str = "view";

/// Button offered on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Data attached to a notification for the click handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// A notification the host should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Vibration pattern in milliseconds: on, off, on.
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// The notification shown for a push; `payload` becomes the body when present.
    pub fn for_push(payload: Option<&str>, arrived_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            title: NOTIFICATION_TITLE.into(),
            body: payload.unwrap_or(DEFAULT_PUSH_BODY).into(),
            icon: "/icons/icon-192x192.png".into(),
            badge: "/icons/icon-72x72.png".into(),
            vibrate: vec![100, 50, 100],
            data: NotificationData { date_of_arrival: arrived_at.timestamp_millis(), primary_key: 1 },
            actions: vec![
                NotificationAction { action: VIEW_ACTION.into(), title: "View Updates".into() },
                NotificationAction { action: "close".into(), title: "Close".into() },
            ],
        }
    }
}

/// Everything the host can wake the controller for.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
    Message(ControlMessage),
    Sync { tag: String, periodic: bool },
    Push { data: Option<String> },
    /// A notification was clicked; `action` is `None` for a click on the body.
    NotificationClick { action: Option<String> },
}

/// What a dispatched event produced.
#[derive(Debug)]
pub enum EventOutcome {
    Installed { skip_waiting: bool },
    Activated(ActivationReport),
    Fetched(Interception),
    Acknowledged(MessageOutcome),
    Synced { ran: bool },
    Notify(Notification),
    /// The notification is closed; `open_window` is the page to open, if any.
    NotificationClicked { open_window: Option<Url> },
}

/// Whether a sync event with this tag triggers the data sync hook.
pub fn is_known_sync(tag: &str, periodic: bool) -> bool {
    if periodic { tag == UPDATE_LEGISLATION_TAG } else { tag == SYNC_DATA_TAG }
}
