//! Outbound notification configuration.

use serde::{Deserialize, Serialize};

/// Notification relay configuration.
///
/// Rendering and delivery of actual emails is the notification
/// collaborator's concern; this service relays structured payloads to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Whether outbound notifications are enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Webhook endpoint of the notification collaborator.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Request timeout for the relay in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Base URL used to build invitation links in template data.
    #[serde(default = "default_app_base_url")]
    pub app_base_url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            webhook_url: None,
            timeout_seconds: default_timeout(),
            app_base_url: default_app_base_url(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    10
}

fn default_app_base_url() -> String {
    "https://app.kidtrack.example".to_string()
}
