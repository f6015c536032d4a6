//! State management module
//!
//! This module contains the local timer mirror, the merge reducer, and the
//! application state the event loop owns.

pub mod app_state;
pub mod merge;
pub mod status;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use merge::{merge, MergeEvent, SyncedState};
pub use status::{StatusMessage, SubscriptionStatus};
pub use timer_state::{PhaseKind, ProgressRatio, TimerState};
