//! Outbound notification configuration.

use serde::{Deserialize, Serialize};

/// Email notification configuration.
///
/// Transport is owned by the deployment; Keyward only hands messages to an
/// `EmailSender` implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Whether notices are dispatched at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Sender address placed on every notice.
    #[serde(default = "default_from")]
    pub from: String,
    /// Upper bound for a single dispatch, in seconds.
    #[serde(default = "default_dispatch_timeout")]
    pub dispatch_timeout_seconds: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            from: default_from(),
            dispatch_timeout_seconds: default_dispatch_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_from() -> String {
    "no-reply@keyward.local".to_string()
}

fn default_dispatch_timeout() -> u64 {
    10
}
