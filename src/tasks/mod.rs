//! Background tasks module
//!
//! This module contains the live subscription task and the event loop that
//! owns the application state.

pub mod event_loop;
pub mod subscription;

// Re-export main types
pub use event_loop::{AppEvent, EventLoop, UserCommand};
pub use subscription::{spawn_subscription, subscription_task, SubscriptionHandle};
