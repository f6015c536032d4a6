//! Live subscription to timer property changes

use std::sync::Arc;

use futures::StreamExt;
use tokio::{
    sync::{mpsc::UnboundedSender, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    bus::{MatchRule, Transport},
    codec::{decode_delta, ChangeEvent},
    state::SubscriptionStatus,
};

/// Owner's side of a running subscription task
#[derive(Debug)]
pub struct SubscriptionHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<SubscriptionStatus>,
}

impl SubscriptionHandle {
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Stop the task and wait for it to exit
    pub async fn shutdown(self) -> SubscriptionStatus {
        let _ = self.stop_tx.send(true);
        match self.join.await {
            Ok(status) => status,
            Err(e) => SubscriptionStatus::Ended(format!("subscription task failed: {}", e)),
        }
    }
}

/// Spawn [`subscription_task`] on the runtime.
///
/// `sink` receives every decoded change event, plus the subscription's
/// status transitions so the owner can show when live updates are down.
pub fn spawn_subscription<T, E>(transport: Arc<T>, sink: UnboundedSender<E>) -> SubscriptionHandle
where
    T: Transport,
    E: From<ChangeEvent> + From<SubscriptionStatus> + Send + 'static,
{
    let (stop_tx, stop_rx) = watch::channel(false);
    let join = tokio::spawn(subscription_task(transport, sink, stop_rx));
    SubscriptionHandle { stop_tx, join }
}

/// Register as a monitor for the timer's `PropertiesChanged` signal and
/// forward decoded change events into `sink` in arrival order.
///
/// Registration failure is reported once and not retried. Runs until the
/// stream closes, `stop` fires (or its sender is dropped), or the sink's
/// receiver goes away.
pub async fn subscription_task<T, E>(
    transport: Arc<T>,
    sink: UnboundedSender<E>,
    mut stop: watch::Receiver<bool>,
) -> SubscriptionStatus
where
    T: Transport,
    E: From<ChangeEvent> + From<SubscriptionStatus> + Send + 'static,
{
    info!("Starting subscription task");

    let rules = [MatchRule::timer_properties()];
    let registered = tokio::select! {
        result = transport.monitor(&rules) => result,
        _ = stop.changed() => return finish(&sink, SubscriptionStatus::Stopped),
    };
    let mut signals = match registered {
        Ok(signals) => signals,
        Err(e) => {
            error!("Failed to become monitor: {}", e);
            return finish(&sink, SubscriptionStatus::SetupFailed(e.to_string()));
        }
    };

    if sink.send(SubscriptionStatus::Live.into()).is_err() {
        return SubscriptionStatus::Stopped;
    }

    let status = loop {
        tokio::select! {
            biased;

            _ = stop.changed() => {
                debug!("Subscription stop requested");
                break SubscriptionStatus::Stopped;
            }

            next = signals.next() => match next {
                Some(message) => {
                    let events = decode_delta(&message);
                    debug!("Received change notification with {} event(s)", events.len());
                    if !forward(&sink, events) {
                        debug!("Event sink closed, ending subscription");
                        break SubscriptionStatus::Stopped;
                    }
                }
                None => {
                    warn!("Signal stream closed");
                    break SubscriptionStatus::Ended("signal stream closed".to_string());
                }
            },
        }
    };

    finish(&sink, status)
}

/// Send events in order; false once the receiver is gone
fn forward<E: From<ChangeEvent>>(sink: &UnboundedSender<E>, events: Vec<ChangeEvent>) -> bool {
    events.into_iter().all(|event| sink.send(event.into()).is_ok())
}

fn finish<E: From<SubscriptionStatus>>(
    sink: &UnboundedSender<E>,
    status: SubscriptionStatus,
) -> SubscriptionStatus {
    info!("Subscription task finished: {:?}", status);
    // The owner may already be gone during shutdown.
    let _ = sink.send(status.clone().into());
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusMessage, DynamicValue, MemoryTransport, PropertyMap};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Debug, PartialEq)]
    enum Seen {
        Change(ChangeEvent),
        Status(SubscriptionStatus),
    }

    impl From<ChangeEvent> for Seen {
        fn from(event: ChangeEvent) -> Self {
            Self::Change(event)
        }
    }

    impl From<SubscriptionStatus> for Seen {
        fn from(status: SubscriptionStatus) -> Self {
            Self::Status(status)
        }
    }

    async fn wait_for_monitor(transport: &MemoryTransport) {
        for _ in 0..100 {
            if transport.monitor_count() > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("monitor never registered");
    }

    #[tokio::test]
    async fn forwards_events_in_arrival_order() {
        let transport = MemoryTransport::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<Seen>();
        let handle = spawn_subscription(Arc::new(transport.clone()), tx);

        assert_eq!(rx.recv().await, Some(Seen::Status(SubscriptionStatus::Live)));
        wait_for_monitor(&transport).await;

        let mut first = PropertyMap::new();
        first.insert("Elapsed".into(), DynamicValue::F64(1.0));
        transport.emit_changed(first);
        transport.emit(BusMessage::default());
        let mut second = PropertyMap::new();
        second.insert("IsPaused".into(), DynamicValue::Bool(true));
        transport.emit_changed(second);

        assert_eq!(rx.recv().await, Some(Seen::Change(ChangeEvent::ElapsedChanged(1.0))));
        assert_eq!(rx.recv().await, Some(Seen::Change(ChangeEvent::IsPausedChanged(true))));

        assert_eq!(handle.shutdown().await, SubscriptionStatus::Stopped);
        assert_eq!(rx.recv().await, Some(Seen::Status(SubscriptionStatus::Stopped)));
    }

    #[tokio::test]
    async fn registers_the_properties_changed_rule() {
        let transport = MemoryTransport::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<Seen>();
        let handle = spawn_subscription(Arc::new(transport.clone()), tx);
        assert_eq!(rx.recv().await, Some(Seen::Status(SubscriptionStatus::Live)));
        assert_eq!(transport.monitor_rules(), vec![MatchRule::timer_properties()]);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn setup_failure_is_reported_and_final() {
        let transport = MemoryTransport::new();
        transport.refuse_monitor(true);
        let (tx, mut rx) = mpsc::unbounded_channel::<Seen>();
        let handle = spawn_subscription(Arc::new(transport), tx);

        let expected = SubscriptionStatus::SetupFailed("monitor registration failed: access denied".into());
        assert_eq!(rx.recv().await, Some(Seen::Status(expected.clone())));
        assert_eq!(handle.shutdown().await, expected);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn closed_stream_ends_subscription() {
        let transport = MemoryTransport::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<Seen>();
        let handle = spawn_subscription(Arc::new(transport.clone()), tx);
        assert_eq!(rx.recv().await, Some(Seen::Status(SubscriptionStatus::Live)));
        wait_for_monitor(&transport).await;

        transport.disconnect_monitors();
        let ended = SubscriptionStatus::Ended("signal stream closed".into());
        assert_eq!(rx.recv().await, Some(Seen::Status(ended.clone())));
        assert_eq!(handle.shutdown().await, ended);
    }
}
