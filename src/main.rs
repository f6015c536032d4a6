//! Pomodoro TUI - mirror and control a desktop pomodoro timer over D-Bus
//!
//! This is the main entry point for the pomodoro-tui application.

use std::sync::Arc;
use tracing::{info, warn};

use pomodoro_tui::{
    bus::ZbusTransport,
    config::{Config, OneShot},
    frontend::{render_task, spawn_stdin_reader},
    services::CommandIssuer,
    state::SyncedState,
    tasks::{AppEvent, EventLoop, UserCommand},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so the status line owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_tui={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting pomodoro-tui v{}", env!("CARGO_PKG_VERSION"));

    let transport = Arc::new(ZbusTransport::session().await?);
    let commands = CommandIssuer::new(transport, config.call_timeout());

    match config.one_shot() {
        Some(OneShot::Start) => commands.start().await?,
        Some(OneShot::Stop) => commands.stop().await?,
        None => {}
    }

    if config.silent {
        if config.json {
            let snapshot = commands.load_snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&SyncedState::new(snapshot))?);
        }
        return Ok(());
    }

    let event_loop = EventLoop::new(commands);
    let events = event_loop.sender();

    tokio::spawn(render_task(event_loop.watch()));
    spawn_stdin_reader(events.clone())?;

    let quit = events.clone();
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => {
                let _ = quit.send(AppEvent::Command(UserCommand::Quit));
            }
            Err(e) => warn!("Signal handling unavailable: {}", e),
        }
    });

    let _ = events.send(UserCommand::LoadSnapshot.into());
    if config.monitor {
        let _ = events.send(UserCommand::Subscribe.into());
    }

    let final_state = event_loop.run().await;
    info!(
        "Shutdown complete (last action: {})",
        final_state.last_action.as_deref().unwrap_or("none")
    );
    Ok(())
}
