//! Decoding of `PropertiesChanged` notifications into typed change events

use tracing::debug;

use super::snapshot::{truncate_duration, ELAPSED, IS_PAUSED, STATE, STATE_DURATION};
use crate::bus::{BusMessage, DynamicValue};

/// Position of the changed-properties map in a `PropertiesChanged` body
const CHANGED_PROPERTIES_INDEX: usize = 1;

/// Order in which present fields are emitted, whatever order the map iterates in
const FIELD_ORDER: [&str; 4] = [ELAPSED, IS_PAUSED, STATE, STATE_DURATION];

/// One changed timer field
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    ElapsedChanged(f64),
    IsPausedChanged(bool),
    PhaseChanged(String),
    PhaseDurationChanged(u64),
}

/// Decode every present, well-typed timer field of a change notification.
///
/// Events come out in a fixed field order (`Elapsed`, `IsPaused`, `State`,
/// `StateDuration`) so folding one message always gives the same ratio.
/// Wrong-typed fields are skipped and a body without a property map at
/// position 1 yields nothing; a malformed message must never stop the
/// subscription.
pub fn decode_delta(message: &BusMessage) -> Vec<ChangeEvent> {
    let Some(changed) = message
        .body
        .get(CHANGED_PROPERTIES_INDEX)
        .and_then(DynamicValue::as_dict)
    else {
        debug!("Ignoring change notification without a property map");
        return Vec::new();
    };

    let mut events = Vec::with_capacity(FIELD_ORDER.len());
    for name in FIELD_ORDER {
        let Some(value) = changed.get(name) else {
            continue;
        };
        match decode_field(name, value) {
            Some(event) => events.push(event),
            None => debug!("Skipping property {} ({})", name, value.kind()),
        }
    }
    events
}

fn decode_field(name: &str, value: &DynamicValue) -> Option<ChangeEvent> {
    match name {
        ELAPSED => value.as_f64().map(ChangeEvent::ElapsedChanged),
        IS_PAUSED => value.as_bool().map(ChangeEvent::IsPausedChanged),
        STATE => value
            .as_str()
            .map(|phase| ChangeEvent::PhaseChanged(phase.to_string())),
        STATE_DURATION => value
            .as_f64()
            .map(|seconds| ChangeEvent::PhaseDurationChanged(truncate_duration(seconds))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::PropertyMap;

    fn message(changed: PropertyMap) -> BusMessage {
        BusMessage::new(vec![
            DynamicValue::from("org.gnome.Pomodoro"),
            DynamicValue::Dict(changed),
            DynamicValue::Array(Vec::new()),
        ])
    }

    #[test]
    fn partial_update_yields_only_present_fields() {
        let mut changed = PropertyMap::new();
        changed.insert(ELAPSED.into(), DynamicValue::F64(42.5));
        changed.insert(STATE.into(), DynamicValue::from("short_break"));

        let events = decode_delta(&message(changed));
        assert_eq!(
            events,
            vec![
                ChangeEvent::ElapsedChanged(42.5),
                ChangeEvent::PhaseChanged("short_break".into()),
            ]
        );
    }

    #[test]
    fn all_four_fields() {
        let mut changed = PropertyMap::new();
        changed.insert(ELAPSED.into(), DynamicValue::F64(1.0));
        changed.insert(IS_PAUSED.into(), DynamicValue::Bool(true));
        changed.insert(STATE.into(), DynamicValue::from("pomodoro"));
        changed.insert(STATE_DURATION.into(), DynamicValue::F64(1500.7));

        assert_eq!(
            decode_delta(&message(changed)),
            vec![
                ChangeEvent::ElapsedChanged(1.0),
                ChangeEvent::IsPausedChanged(true),
                ChangeEvent::PhaseChanged("pomodoro".into()),
                ChangeEvent::PhaseDurationChanged(1500),
            ]
        );
    }

    #[test]
    fn wrong_typed_and_unknown_fields_are_skipped() {
        let mut changed = PropertyMap::new();
        changed.insert(ELAPSED.into(), DynamicValue::from("soon"));
        changed.insert(IS_PAUSED.into(), DynamicValue::Bool(false));
        changed.insert("Unrelated".into(), DynamicValue::U64(3));

        assert_eq!(
            decode_delta(&message(changed)),
            vec![ChangeEvent::IsPausedChanged(false)]
        );
    }

    #[test]
    fn short_body_yields_nothing() {
        assert!(decode_delta(&BusMessage::default()).is_empty());
        assert!(decode_delta(&BusMessage::new(vec![DynamicValue::from("x")])).is_empty());
    }

    #[test]
    fn second_element_not_a_map_yields_nothing() {
        let msg = BusMessage::new(vec![
            DynamicValue::from("org.gnome.Pomodoro"),
            DynamicValue::F64(3.0),
        ]);
        assert!(decode_delta(&msg).is_empty());
    }
}
