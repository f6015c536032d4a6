//! Live-update status and transient user-facing messages

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Health of the live change subscription
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Never started; the model only changes on snapshot loads
    #[default]
    Inactive,
    /// Registered and forwarding change events
    Live,
    /// Registration failed; updates degrade to snapshot-only
    SetupFailed(String),
    /// The signal stream closed on its own
    Ended(String),
    /// Stopped through its handle
    Stopped,
}

impl SubscriptionStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

/// A short message shown to the user until it expires
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub at: DateTime<Utc>,
}

impl StatusMessage {
    /// How long a message stays visible
    pub const TTL_SECONDS: i64 = 5;

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            at: Utc::now(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.at >= Duration::seconds(Self::TTL_SECONDS)
    }
}
