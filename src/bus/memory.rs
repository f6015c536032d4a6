//! In-process fake of the timer service for tests

use std::sync::{Arc, Mutex, MutexGuard};

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};

use super::{
    transport::{BusMessage, MatchRule, Notification, TimerMethod, Transport, TransportError},
    value::{DynamicValue, PropertyMap},
    TIMER_INTERFACE,
};

#[derive(Debug, Default)]
struct Inner {
    properties: PropertyMap,
    calls: Vec<TimerMethod>,
    notifications: Vec<Notification>,
    monitors: Vec<UnboundedSender<BusMessage>>,
    monitor_rules: Vec<MatchRule>,
    failing_calls: bool,
    refuse_monitor: bool,
}

/// Fake timer service. Clones share the same remote state.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the service with the four timer properties
    pub fn with_timer(is_paused: bool, elapsed: f64, state: &str, state_duration: f64) -> Self {
        let transport = Self::new();
        transport.set_property("IsPaused", is_paused);
        transport.set_property("Elapsed", elapsed);
        transport.set_property("State", state);
        transport.set_property("StateDuration", state_duration);
        transport
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_property(&self, name: &str, value: impl Into<DynamicValue>) {
        self.lock().properties.insert(name.to_string(), value.into());
    }

    pub fn remove_property(&self, name: &str) {
        self.lock().properties.remove(name);
    }

    /// Make every request/response call fail at the transport level
    pub fn fail_calls(&self, failing: bool) {
        self.lock().failing_calls = failing;
    }

    /// Make monitor registration fail
    pub fn refuse_monitor(&self, refuse: bool) {
        self.lock().refuse_monitor = refuse;
    }

    /// Deliver a message to every open monitor; returns how many received it
    pub fn emit(&self, message: BusMessage) -> usize {
        let mut inner = self.lock();
        inner.monitors.retain(|tx| !tx.is_closed());
        inner
            .monitors
            .iter()
            .filter(|tx| tx.unbounded_send(message.clone()).is_ok())
            .count()
    }

    /// Emit a well-formed `PropertiesChanged` for the timer interface
    pub fn emit_changed(&self, changed: PropertyMap) -> usize {
        self.emit(BusMessage::new(vec![
            DynamicValue::from(TIMER_INTERFACE),
            DynamicValue::Dict(changed),
            DynamicValue::Array(Vec::new()),
        ]))
    }

    /// Close every monitor stream, as a dropped bus connection would
    pub fn disconnect_monitors(&self) {
        self.lock().monitors.clear();
    }

    pub fn calls(&self) -> Vec<TimerMethod> {
        self.lock().calls.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    pub fn monitor_rules(&self) -> Vec<MatchRule> {
        self.lock().monitor_rules.clone()
    }

    pub fn monitor_count(&self) -> usize {
        let mut inner = self.lock();
        inner.monitors.retain(|tx| !tx.is_closed());
        inner.monitors.len()
    }
}

impl Transport for MemoryTransport {
    type Signals = UnboundedReceiver<BusMessage>;

    async fn get_all(&self, interface: &str) -> Result<PropertyMap, TransportError> {
        let inner = self.lock();
        if inner.failing_calls {
            return Err(TransportError::Call {
                method: "org.freedesktop.DBus.Properties.GetAll".to_string(),
                reason: "service unavailable".to_string(),
            });
        }
        if interface != TIMER_INTERFACE {
            return Err(TransportError::Call {
                method: "org.freedesktop.DBus.Properties.GetAll".to_string(),
                reason: format!("unknown interface {}", interface),
            });
        }
        Ok(inner.properties.clone())
    }

    async fn call(&self, method: TimerMethod) -> Result<(), TransportError> {
        let mut inner = self.lock();
        if inner.failing_calls {
            return Err(TransportError::Call {
                method: method.qualified(),
                reason: "service unavailable".to_string(),
            });
        }
        inner.calls.push(method);
        Ok(())
    }

    async fn notify(&self, notification: &Notification) -> Result<(), TransportError> {
        let mut inner = self.lock();
        if inner.failing_calls {
            return Err(TransportError::Call {
                method: "org.freedesktop.Notifications.Notify".to_string(),
                reason: "service unavailable".to_string(),
            });
        }
        inner.notifications.push(notification.clone());
        Ok(())
    }

    async fn monitor(&self, rules: &[MatchRule]) -> Result<Self::Signals, TransportError> {
        let mut inner = self.lock();
        if inner.refuse_monitor {
            return Err(TransportError::Monitor("access denied".to_string()));
        }
        let (tx, rx) = unbounded();
        inner.monitors.push(tx);
        inner.monitor_rules.extend(rules.iter().cloned());
        Ok(rx)
    }
}
