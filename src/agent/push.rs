//! Push payload decoding and notification relay.
//!
//! Shapes an optional JSON payload into a displayable notification with
//! fixed defaults for every missing field, then hands it to a [`Notifier`].
//! This path never touches the storage tiers.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_TITLE: &str = "Notification";
pub const DEFAULT_BODY: &str = "You have a new notification!";
pub const DEFAULT_ICON: &str = "/img/bell.svg";
pub const DEFAULT_BADGE: &str = "/img/badge.png";

/// The JSON shape a push payload may carry. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
    icon: Option<String>,
    badge: Option<String>,
}

/// A fully shaped notification, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
}

/// Decode an optional push payload into a notification.
///
/// An absent or malformed payload shapes as if it were an empty object.
pub fn shape_notification(payload: Option<&[u8]>) -> Notification {
    let parsed = match payload {
        Some(bytes) => match serde_json::from_slice::<PushPayload>(bytes) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Malformed push payload, using defaults");
                PushPayload::default()
            }
        },
        None => PushPayload::default(),
    };

    Notification {
        title: parsed.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        body: parsed.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
        icon: parsed.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        badge: parsed.badge.unwrap_or_else(|| DEFAULT_BADGE.to_string()),
    }
}

/// The platform display call.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Notifier that logs the notification instead of displaying it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn show(&self, notification: &Notification) -> anyhow::Result<()> {
        info!(
            title = %notification.title,
            body = %notification.body,
            icon = %notification.icon,
            badge = %notification.badge,
            "Notification"
        );
        Ok(())
    }
}
