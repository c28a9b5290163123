//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Maintenance worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the maintenance worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron schedule for the expired-share sweep.
    #[serde(default = "default_share_sweep")]
    pub share_sweep_schedule: String,
    /// Cron schedule for the expired-invitation sweep.
    #[serde(default = "default_invitation_sweep")]
    pub invitation_sweep_schedule: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            share_sweep_schedule: default_share_sweep(),
            invitation_sweep_schedule: default_invitation_sweep(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_share_sweep() -> String {
    // Hourly on the hour
    "0 0 * * * *".to_string()
}

fn default_invitation_sweep() -> String {
    // Hourly on the half hour
    "0 30 * * * *".to_string()
}
