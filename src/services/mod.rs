//! Timer service access module
//!
//! This module contains the request/response side of the timer service:
//! control commands, notifications, and on-demand snapshots.

pub mod commands;

// Re-export main types
pub use commands::{CommandIssuer, SnapshotError};
