//! Control requests and on-demand snapshots against the timer service

use std::{future::Future, sync::Arc, time::Duration};

use tracing::{debug, info};

use crate::{
    bus::{Notification, TimerMethod, Transport, TransportError, TIMER_INTERFACE},
    codec::{decode_snapshot, DecodeError},
    state::TimerState,
};

/// Failure of an on-demand snapshot load
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid timer snapshot: {0}")]
    Decode(#[from] DecodeError),
}

/// Issues requests over the call connection.
///
/// Commands never touch the local model; their effect shows up through the
/// next snapshot or change event.
#[derive(Debug)]
pub struct CommandIssuer<T> {
    transport: Arc<T>,
    call_timeout: Option<Duration>,
}

impl<T> Clone for CommandIssuer<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            call_timeout: self.call_timeout,
        }
    }
}

impl<T: Transport> CommandIssuer<T> {
    /// Create an issuer; `call_timeout` of `None` waits on the service indefinitely
    pub fn new(transport: Arc<T>, call_timeout: Option<Duration>) -> Self {
        Self {
            transport,
            call_timeout,
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub async fn start(&self) -> Result<(), TransportError> {
        self.invoke(TimerMethod::Start).await
    }

    pub async fn pause(&self) -> Result<(), TransportError> {
        self.invoke(TimerMethod::Pause).await
    }

    /// Only meaningful while paused; callers pick between this and [`Self::start`]
    pub async fn resume(&self) -> Result<(), TransportError> {
        self.invoke(TimerMethod::Resume).await
    }

    pub async fn stop(&self) -> Result<(), TransportError> {
        self.invoke(TimerMethod::Stop).await
    }

    /// Send a desktop notification
    pub async fn notify(&self, title: &str, body: &str) -> Result<(), TransportError> {
        let notification = Notification::new(title, body);
        debug!("Sending notification: {}", title);
        self.bounded(
            "org.freedesktop.Notifications.Notify",
            self.transport.notify(&notification),
        )
        .await
    }

    /// Fetch and decode the full timer state
    pub async fn load_snapshot(&self) -> Result<TimerState, SnapshotError> {
        let props = self
            .bounded(
                "org.freedesktop.DBus.Properties.GetAll",
                self.transport.get_all(TIMER_INTERFACE),
            )
            .await?;
        let state = decode_snapshot(&props)?;
        debug!("Loaded snapshot: {:?}", state);
        Ok(state)
    }

    async fn invoke(&self, method: TimerMethod) -> Result<(), TransportError> {
        let name = method.qualified();
        self.bounded(&name, self.transport.call(method)).await?;
        info!("{} issued", name);
        Ok(())
    }

    async fn bounded<R>(
        &self,
        method: &str,
        call: impl Future<Output = Result<R, TransportError>>,
    ) -> Result<R, TransportError> {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| TransportError::Timeout {
                    method: method.to_string(),
                    seconds: limit.as_secs(),
                })?,
            None => call.await,
        }
    }
}
