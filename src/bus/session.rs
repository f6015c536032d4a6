//! Session bus transport backed by zbus

use std::collections::HashMap;

use futures::{future, stream::BoxStream, StreamExt};
use tracing::{debug, info, warn};
use zbus::{
    message::Type as MessageType,
    zvariant::{OwnedValue, Value},
    Connection, Message, MessageStream,
};

use super::{
    transport::{BusMessage, MatchRule, Notification, TimerMethod, Transport, TransportError},
    value::{DynamicValue, PropertyMap},
    NOTIFICATIONS_INTERFACE, NOTIFICATIONS_PATH, NOTIFICATIONS_SERVICE, PROPERTIES_INTERFACE,
    TIMER_INTERFACE, TIMER_PATH, TIMER_SERVICE,
};

const BUS_SERVICE: &str = "org.freedesktop.DBus";
const BUS_PATH: &str = "/org/freedesktop/DBus";
const MONITORING_INTERFACE: &str = "org.freedesktop.DBus.Monitoring";

/// Transport over the user's session bus
#[derive(Debug, Clone)]
pub struct ZbusTransport {
    conn: Connection,
}

impl ZbusTransport {
    /// Connect to the session bus for request/response calls
    pub async fn session() -> Result<Self, TransportError> {
        let conn = Connection::session()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        debug!("Connected to session bus for calls");
        Ok(Self { conn })
    }
}

impl Transport for ZbusTransport {
    type Signals = BoxStream<'static, BusMessage>;

    async fn get_all(&self, interface: &str) -> Result<PropertyMap, TransportError> {
        let method = format!("{}.GetAll", PROPERTIES_INTERFACE);
        let reply = self
            .conn
            .call_method(
                Some(TIMER_SERVICE),
                TIMER_PATH,
                Some(PROPERTIES_INTERFACE),
                "GetAll",
                &(interface,),
            )
            .await
            .map_err(|e| TransportError::Call {
                method: method.clone(),
                reason: e.to_string(),
            })?;

        let body = reply.body();
        let props: HashMap<String, OwnedValue> =
            body.deserialize().map_err(|e| TransportError::Reply {
                method,
                reason: e.to_string(),
            })?;

        Ok(props
            .iter()
            .map(|(name, value)| (name.clone(), to_dynamic(value)))
            .collect())
    }

    async fn call(&self, method: TimerMethod) -> Result<(), TransportError> {
        debug!("Calling {}", method.qualified());
        self.conn
            .call_method(
                Some(TIMER_SERVICE),
                TIMER_PATH,
                Some(TIMER_INTERFACE),
                method.member(),
                &(),
            )
            .await
            .map_err(|e| TransportError::Call {
                method: method.qualified(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn notify(&self, notification: &Notification) -> Result<(), TransportError> {
        let actions: Vec<&str> = Vec::new();
        let hints: HashMap<&str, Value<'_>> = HashMap::new();
        self.conn
            .call_method(
                Some(NOTIFICATIONS_SERVICE),
                NOTIFICATIONS_PATH,
                Some(NOTIFICATIONS_INTERFACE),
                "Notify",
                &(
                    "",
                    0u32,
                    "",
                    notification.summary.as_str(),
                    notification.body.as_str(),
                    actions,
                    hints,
                    notification.expire_timeout_ms,
                ),
            )
            .await
            .map_err(|e| TransportError::Call {
                method: format!("{}.Notify", NOTIFICATIONS_INTERFACE),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn monitor(&self, rules: &[MatchRule]) -> Result<Self::Signals, TransportError> {
        // A monitor connection can no longer make ordinary calls, so it gets its own.
        let conn = Connection::session()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let rules: Vec<&str> = rules.iter().map(MatchRule::as_str).collect();
        conn.call_method(
            Some(BUS_SERVICE),
            BUS_PATH,
            Some(MONITORING_INTERFACE),
            "BecomeMonitor",
            &(rules, 0u32),
        )
        .await
        .map_err(|e| TransportError::Monitor(e.to_string()))?;
        info!("Registered as bus monitor");

        let stream = MessageStream::from(conn)
            .filter_map(|item| {
                future::ready(match item {
                    Ok(msg) => properties_changed(&msg),
                    Err(e) => {
                        warn!("Dropping unreadable bus message: {}", e);
                        None
                    }
                })
            })
            .boxed();
        Ok(stream)
    }
}

/// Convert a `PropertiesChanged` signal into a tagged message; other traffic is ignored
fn properties_changed(msg: &Message) -> Option<BusMessage> {
    let header = msg.header();
    if header.message_type() != MessageType::Signal {
        return None;
    }
    if header.member().map(|m| m.as_str()) != Some("PropertiesChanged") {
        return None;
    }

    let body = msg.body();
    let parsed: Result<(String, HashMap<String, OwnedValue>, Vec<String>), _> = body.deserialize();
    match parsed {
        Ok((interface, changed, invalidated)) => {
            let changed: PropertyMap = changed
                .iter()
                .map(|(name, value)| (name.clone(), to_dynamic(value)))
                .collect();
            Some(BusMessage::new(vec![
                DynamicValue::Str(interface),
                DynamicValue::Dict(changed),
                DynamicValue::Array(invalidated.into_iter().map(DynamicValue::Str).collect()),
            ]))
        }
        Err(e) => {
            // Let the decoder see a short body rather than losing the arrival entirely.
            debug!("PropertiesChanged body did not match sa{{sv}}as: {}", e);
            Some(BusMessage::default())
        }
    }
}

fn to_dynamic(value: &Value<'_>) -> DynamicValue {
    match value {
        Value::Bool(v) => DynamicValue::Bool(*v),
        Value::F64(v) => DynamicValue::F64(*v),
        Value::U8(v) => DynamicValue::U64(u64::from(*v)),
        Value::U16(v) => DynamicValue::U64(u64::from(*v)),
        Value::U32(v) => DynamicValue::U64(u64::from(*v)),
        Value::U64(v) => DynamicValue::U64(*v),
        Value::I16(v) => DynamicValue::I64(i64::from(*v)),
        Value::I32(v) => DynamicValue::I64(i64::from(*v)),
        Value::I64(v) => DynamicValue::I64(*v),
        Value::Str(v) => DynamicValue::Str(v.to_string()),
        Value::Value(inner) => to_dynamic(inner),
        // Containers and handles carry nothing the timer model reads.
        _ => DynamicValue::Array(Vec::new()),
    }
}
