//! The single consumer that owns [`AppState`]

use std::{ops::ControlFlow, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    watch,
};
use tracing::{debug, error, info};

use super::subscription::{spawn_subscription, SubscriptionHandle};
use crate::{
    bus::Transport,
    codec::ChangeEvent,
    services::CommandIssuer,
    state::{AppState, MergeEvent, SubscriptionStatus, TimerState},
};

/// Something the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Start,
    Pause,
    /// Resume when paused, start otherwise
    Toggle,
    Stop,
    LoadSnapshot,
    Notify { title: String, body: String },
    Subscribe,
    Quit,
}

impl UserCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Toggle => "toggle",
            Self::Stop => "stop",
            Self::LoadSnapshot => "load",
            Self::Notify { .. } => "notify",
            Self::Subscribe => "subscribe",
            Self::Quit => "quit",
        }
    }
}

/// Everything that can reach the event loop's channel
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Command(UserCommand),
    /// Result of a successful snapshot load
    Snapshot(TimerState),
    Change(ChangeEvent),
    Subscription(SubscriptionStatus),
}

impl From<UserCommand> for AppEvent {
    fn from(command: UserCommand) -> Self {
        Self::Command(command)
    }
}

impl From<ChangeEvent> for AppEvent {
    fn from(event: ChangeEvent) -> Self {
        Self::Change(event)
    }
}

impl From<SubscriptionStatus> for AppEvent {
    fn from(status: SubscriptionStatus) -> Self {
        Self::Subscription(status)
    }
}

/// Drains one channel of [`AppEvent`]s and applies them one at a time.
///
/// This is the only writer of the model. Every applied event is published
/// on a watch channel for the renderer.
pub struct EventLoop<T: Transport> {
    commands: CommandIssuer<T>,
    state: AppState,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    state_tx: watch::Sender<AppState>,
    subscription: Option<SubscriptionHandle>,
}

impl<T: Transport> EventLoop<T> {
    pub fn new(commands: CommandIssuer<T>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let state = AppState::new();
        let (state_tx, _) = watch::channel(state.clone());
        Self {
            commands,
            state,
            events_tx,
            events_rx,
            state_tx,
            subscription: None,
        }
    }

    /// Handle for producers (input, signals, the subscription)
    pub fn sender(&self) -> UnboundedSender<AppEvent> {
        self.events_tx.clone()
    }

    /// Receiver of every published model
    pub fn watch(&self) -> watch::Receiver<AppState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run until a quit command; returns the final model
    pub async fn run(mut self) -> AppState {
        info!("Starting event loop");
        let mut tick = tokio::time::interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                Some(event) = self.events_rx.recv() => {
                    if self.handle(event).await.is_break() {
                        break;
                    }
                }
                _ = tick.tick() => {
                    if self.state.expire_status(Utc::now()) {
                        self.publish();
                    }
                }
            }
        }

        self.shutdown().await
    }

    /// Apply one event. Breaks on [`UserCommand::Quit`].
    pub async fn handle(&mut self, event: AppEvent) -> ControlFlow<()> {
        match event {
            AppEvent::Command(command) => {
                if self.run_command(command).await.is_break() {
                    return ControlFlow::Break(());
                }
            }
            AppEvent::Snapshot(snapshot) => self.state.apply(MergeEvent::SnapshotLoaded(snapshot)),
            AppEvent::Change(change) => self.state.apply(change.into()),
            AppEvent::Subscription(status) => self.state.set_subscription(status),
        }
        self.publish();
        ControlFlow::Continue(())
    }

    /// Stop the subscription, if any, and hand back the model
    pub async fn shutdown(mut self) -> AppState {
        if let Some(handle) = self.subscription.take() {
            let status = handle.shutdown().await;
            debug!("Subscription exited with {:?}", status);
        }
        info!("Event loop stopped");
        self.state
    }

    async fn run_command(&mut self, command: UserCommand) -> ControlFlow<()> {
        debug!("Handling command {:?}", command);
        let name = command.name();
        let outcome = match command {
            UserCommand::Quit => return ControlFlow::Break(()),
            UserCommand::Subscribe => {
                self.subscribe();
                return ControlFlow::Continue(());
            }
            UserCommand::Start => done(self.commands.start().await, "started"),
            UserCommand::Pause => done(self.commands.pause().await, "paused"),
            UserCommand::Toggle => {
                if self.state.timer().is_paused {
                    done(self.commands.resume().await, "resumed")
                } else {
                    done(self.commands.start().await, "started")
                }
            }
            UserCommand::Stop => done(self.commands.stop().await, "stopped"),
            UserCommand::Notify { title, body } => {
                done(self.commands.notify(&title, &body).await, "notification sent")
            }
            // The result is queued behind whatever arrived during the call
            UserCommand::LoadSnapshot => match self.commands.load_snapshot().await {
                Ok(snapshot) => {
                    let _ = self.events_tx.send(AppEvent::Snapshot(snapshot));
                    Ok("snapshot loaded")
                }
                Err(e) => Err(e.to_string()),
            },
        };

        self.state.record_action(name);
        match outcome {
            Ok(message) => self.state.report(message),
            Err(e) => {
                error!("Command {} failed: {}", name, e);
                self.state.report_error(format!("{} failed: {}", name, e));
            }
        }
        ControlFlow::Continue(())
    }

    fn subscribe(&mut self) {
        if self.subscription.as_ref().is_some_and(|h| !h.is_finished()) {
            self.state.report("already monitoring");
            return;
        }
        let transport = Arc::clone(self.commands.transport());
        self.subscription = Some(spawn_subscription(transport, self.events_tx.clone()));
        self.state.record_action(UserCommand::Subscribe.name());
        self.state.report("monitoring");
    }

    fn publish(&self) {
        // send_replace never fails, even with no renderer attached.
        self.state_tx.send_replace(self.state.clone());
    }
}

fn done<E: std::fmt::Display>(
    result: Result<(), E>,
    message: &'static str,
) -> Result<&'static str, String> {
    result.map(|_| message).map_err(|e| e.to_string())
}
