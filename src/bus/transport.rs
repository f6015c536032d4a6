//! The narrow transport seam between the sync core and the message bus

use std::future::Future;

use futures::Stream;

use super::{
    value::{DynamicValue, PropertyMap},
    TIMER_INTERFACE, TIMER_PATH,
};

/// A message received on a monitor connection, body already decoded into tagged values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BusMessage {
    pub body: Vec<DynamicValue>,
}

impl BusMessage {
    pub fn new(body: Vec<DynamicValue>) -> Self {
        Self { body }
    }
}

/// Match rule string handed to the monitor registration call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRule(String);

impl MatchRule {
    /// Rule selecting `PropertiesChanged` signals emitted for `path`
    pub fn properties_changed(path: &str) -> Self {
        Self(format!(
            "type='signal',path='{}',interface='org.freedesktop.DBus.Properties',member='PropertiesChanged'",
            path
        ))
    }

    /// Rule for the timer service's own object
    pub fn timer_properties() -> Self {
        Self::properties_changed(TIMER_PATH)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Control methods exposed by the timer service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMethod {
    Start,
    Pause,
    Resume,
    Stop,
}

impl TimerMethod {
    /// Member name on the timer interface
    pub fn member(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Pause => "Pause",
            Self::Resume => "Resume",
            Self::Stop => "Stop",
        }
    }

    /// Fully-qualified name for logs and errors
    pub fn qualified(&self) -> String {
        format!("{}.{}", TIMER_INTERFACE, self.member())
    }
}

/// Desktop notification request
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub summary: String,
    pub body: String,
    pub expire_timeout_ms: i32,
}

impl Notification {
    pub const DEFAULT_TIMEOUT_MS: i32 = 5000;

    pub fn new(summary: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            body: body.into(),
            expire_timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Transport-level failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("bus connection failed: {0}")]
    Connect(String),

    #[error("call to {method} failed: {reason}")]
    Call { method: String, reason: String },

    #[error("unexpected reply from {method}: {reason}")]
    Reply { method: String, reason: String },

    #[error("call to {method} timed out after {seconds}s")]
    Timeout { method: String, seconds: u64 },

    #[error("monitor registration failed: {0}")]
    Monitor(String),
}

/// What the sync core needs from a bus connection.
///
/// Request/response calls go over the connection the implementor holds.
/// [`Transport::monitor`] must open a separate connection so the signal
/// stream never interleaves with blocking calls.
pub trait Transport: Send + Sync + 'static {
    type Signals: Stream<Item = BusMessage> + Send + Unpin + 'static;

    /// `org.freedesktop.DBus.Properties.GetAll` on the timer object
    fn get_all(
        &self,
        interface: &str,
    ) -> impl Future<Output = Result<PropertyMap, TransportError>> + Send;

    fn call(&self, method: TimerMethod) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn notify(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Register as a monitor for `rules` (flags are reserved and always 0)
    fn monitor(
        &self,
        rules: &[MatchRule],
    ) -> impl Future<Output = Result<Self::Signals, TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_rule_targets_pomodoro_object() {
        let rule = MatchRule::timer_properties();
        assert_eq!(
            rule.as_str(),
            "type='signal',path='/org/gnome/Pomodoro',interface='org.freedesktop.DBus.Properties',member='PropertiesChanged'"
        );
    }

    #[test]
    fn method_names() {
        assert_eq!(TimerMethod::Resume.member(), "Resume");
        assert_eq!(TimerMethod::Stop.qualified(), "org.gnome.Pomodoro.Stop");
    }
}
