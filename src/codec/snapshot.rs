//! Full-snapshot decoding of the timer properties

use crate::{
    bus::{DynamicValue, PropertyMap},
    state::TimerState,
};

pub const ELAPSED: &str = "Elapsed";
pub const IS_PAUSED: &str = "IsPaused";
pub const STATE: &str = "State";
pub const STATE_DURATION: &str = "StateDuration";

/// Why a property map could not be read as a [`TimerState`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("missing property {0}")]
    MissingField(&'static str),

    #[error("property {name} is not {expected}")]
    TypeMismatch {
        name: &'static str,
        expected: &'static str,
    },
}

/// Decode a `GetAll` reply. All four properties must be present and well-typed.
pub fn decode_snapshot(props: &PropertyMap) -> Result<TimerState, DecodeError> {
    let elapsed = field(props, ELAPSED, "numeric", DynamicValue::as_f64)?;
    let is_paused = field(props, IS_PAUSED, "boolean", DynamicValue::as_bool)?;
    let phase = field(props, STATE, "string", |v| v.as_str().map(str::to_string))?;
    let duration = field(props, STATE_DURATION, "numeric", DynamicValue::as_f64)?;

    Ok(TimerState {
        is_paused,
        elapsed,
        phase,
        phase_duration: truncate_duration(duration),
    })
}

/// Seconds as reported by the service, truncated toward zero.
/// Negative and NaN durations collapse to 0, the "unknown" duration.
pub fn truncate_duration(seconds: f64) -> u64 {
    seconds as u64
}

fn field<T>(
    props: &PropertyMap,
    name: &'static str,
    expected: &'static str,
    read: impl Fn(&DynamicValue) -> Option<T>,
) -> Result<T, DecodeError> {
    let value = props.get(name).ok_or(DecodeError::MissingField(name))?;
    read(value).ok_or(DecodeError::TypeMismatch { name, expected })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> PropertyMap {
        let mut props = PropertyMap::new();
        props.insert(ELAPSED.into(), DynamicValue::F64(30.0));
        props.insert(IS_PAUSED.into(), DynamicValue::Bool(false));
        props.insert(STATE.into(), DynamicValue::from("pomodoro"));
        props.insert(STATE_DURATION.into(), DynamicValue::F64(1500.0));
        props
    }

    #[test]
    fn decodes_complete_map() {
        let state = decode_snapshot(&props()).unwrap();
        assert_eq!(
            state,
            TimerState {
                is_paused: false,
                elapsed: 30.0,
                phase: "pomodoro".into(),
                phase_duration: 1500,
            }
        );
    }

    #[test]
    fn duration_is_truncated() {
        let mut props = props();
        props.insert(STATE_DURATION.into(), DynamicValue::F64(125.9));
        assert_eq!(decode_snapshot(&props).unwrap().phase_duration, 125);
    }

    #[test]
    fn integer_tags_count_as_numeric() {
        let mut props = props();
        props.insert(STATE_DURATION.into(), DynamicValue::U64(300));
        props.insert(ELAPSED.into(), DynamicValue::I64(12));
        let state = decode_snapshot(&props).unwrap();
        assert_eq!(state.phase_duration, 300);
        assert_eq!(state.elapsed, 12.0);
    }

    #[test]
    fn each_missing_field_is_named() {
        for name in [ELAPSED, IS_PAUSED, STATE, STATE_DURATION] {
            let mut props = props();
            props.remove(name);
            assert_eq!(decode_snapshot(&props), Err(DecodeError::MissingField(name)));
        }
    }

    #[test]
    fn wrong_type_is_reported() {
        let mut props = props();
        props.insert(IS_PAUSED.into(), DynamicValue::from("no"));
        assert_eq!(
            decode_snapshot(&props),
            Err(DecodeError::TypeMismatch {
                name: IS_PAUSED,
                expected: "boolean"
            })
        );
    }

    #[test]
    fn negative_duration_means_unknown() {
        assert_eq!(truncate_duration(-4.0), 0);
        assert_eq!(truncate_duration(f64::NAN), 0);
    }
}
