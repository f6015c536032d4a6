//! Main application state, owned by the event loop

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{
    merge::{merge, MergeEvent, SyncedState},
    status::{StatusMessage, SubscriptionStatus},
    timer_state::{ProgressRatio, TimerState},
};

/// Everything the front-end draws. Only the event loop mutates it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub synced: SyncedState,
    pub subscription: SubscriptionStatus,
    pub status: Option<StatusMessage>,
    /// Last action tracking
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timer(&self) -> &TimerState {
        &self.synced.timer
    }

    pub fn ratio(&self) -> ProgressRatio {
        self.synced.ratio
    }

    /// Fold a snapshot or change event into the model
    pub fn apply(&mut self, event: MergeEvent) {
        debug!("Merging {:?}", event);
        self.synced = merge(&self.synced, event);
    }

    pub fn record_action(&mut self, action: &str) {
        self.last_action = Some(action.to_string());
        self.last_action_time = Some(Utc::now());
    }

    pub fn set_subscription(&mut self, status: SubscriptionStatus) {
        match &status {
            SubscriptionStatus::SetupFailed(reason) => {
                warn!("Live updates unavailable, falling back to snapshots: {}", reason);
                self.status = Some(StatusMessage::error(format!("live updates unavailable: {}", reason)));
            }
            SubscriptionStatus::Ended(reason) => {
                warn!("Live updates ended: {}", reason);
                self.status = Some(StatusMessage::error(format!("live updates ended: {}", reason)));
            }
            SubscriptionStatus::Live => info!("Live updates active"),
            SubscriptionStatus::Inactive | SubscriptionStatus::Stopped => {}
        }
        self.subscription = status;
    }

    pub fn report(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage::info(text));
    }

    pub fn report_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage::error(text));
    }

    /// Drop the status message once it has been visible long enough
    pub fn expire_status(&mut self, now: DateTime<Utc>) -> bool {
        if self.status.as_ref().is_some_and(|s| s.is_expired(now)) {
            self.status = None;
            return true;
        }
        false
    }
}
