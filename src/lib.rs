//! Pomodoro TUI - mirror and control a desktop pomodoro timer over D-Bus
//!
//! This library keeps a local copy of the remote timer in sync from two
//! sources, on-demand snapshots and a live change subscription, and exposes
//! the commands that drive the timer.

pub mod bus;
pub mod codec;
pub mod config;
pub mod frontend;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use bus::{MemoryTransport, Transport, ZbusTransport};
pub use codec::{decode_delta, decode_snapshot, ChangeEvent, DecodeError};
pub use config::Config;
pub use services::CommandIssuer;
pub use state::{merge, AppState, MergeEvent, ProgressRatio, SyncedState, TimerState};
pub use tasks::{AppEvent, EventLoop, UserCommand};
pub use utils::signals::shutdown_signal;
