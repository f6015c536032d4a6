//! Thin terminal front-end: key input and the status line.
//!
//! Nothing here touches the model directly; input becomes [`crate::tasks::AppEvent`]s
//! and output is drawn from published [`crate::state::AppState`] snapshots.

pub mod input;
pub mod render;

pub use input::{parse_key, read_keys, spawn_stdin_reader};
pub use render::{render_line, render_task};
