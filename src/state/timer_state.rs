//! Timer state structure and derived progress

use serde::Serialize;

/// Local mirror of the remote timer
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TimerState {
    pub is_paused: bool,
    /// Seconds into the current phase
    pub elapsed: f64,
    /// Remote phase name, e.g. "pomodoro" or "short_break"; empty until known
    pub phase: String,
    /// Target length of the current phase in seconds; 0 while unknown
    pub phase_duration: u64,
}

impl TimerState {
    /// Create the initial, not-yet-synchronized state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase_kind(&self) -> PhaseKind {
        PhaseKind::from(self.phase.as_str())
    }

    /// Whether the phase length has been learned from the service
    pub fn has_duration(&self) -> bool {
        self.phase_duration > 0
    }

    /// Seconds left in the phase, if the duration is known
    pub fn remaining_seconds(&self) -> Option<f64> {
        if self.has_duration() {
            Some((self.phase_duration as f64 - self.elapsed).max(0.0))
        } else {
            None
        }
    }

    /// Progress through the phase under the zero-duration guard
    pub fn ratio(&self) -> ProgressRatio {
        ProgressRatio::compute(self.elapsed, self.phase_duration)
    }
}

/// Phase of the timer cycle, as used for labelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseKind {
    Pomodoro,
    ShortBreak,
    LongBreak,
    Unknown(String),
}

impl PhaseKind {
    pub fn is_break(&self) -> bool {
        matches!(self, Self::ShortBreak | Self::LongBreak)
    }

    /// Short label for the phase; empty when the phase is not one we know
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pomodoro => "pomodoro",
            Self::ShortBreak | Self::LongBreak => "break",
            Self::Unknown(_) => "",
        }
    }
}

impl From<&str> for PhaseKind {
    fn from(phase: &str) -> Self {
        match phase {
            "pomodoro" => Self::Pomodoro,
            "short_break" => Self::ShortBreak,
            "long_break" => Self::LongBreak,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Fraction of the current phase that has elapsed.
///
/// Always finite. Not clamped: the service may report an elapsed time past
/// the phase length, and clamping is left to whoever draws it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ProgressRatio(f64);

impl ProgressRatio {
    pub const ZERO: ProgressRatio = ProgressRatio(0.0);

    /// Wrap a raw ratio, replacing NaN and infinities with 0
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value)
        } else {
            Self::ZERO
        }
    }

    /// `elapsed / duration`, or 0 when the duration is unknown
    pub fn compute(elapsed: f64, duration: u64) -> Self {
        if duration == 0 {
            return Self::ZERO;
        }
        Self::new(elapsed / duration as f64)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Value bounded to `[0, 1]` for progress bars
    pub fn clamped(&self) -> f64 {
        self.0.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn initial_state_is_unknown_phase() {
        let state = TimerState::new();
        assert!(!state.is_paused);
        assert_eq!(state.phase_kind(), PhaseKind::Unknown(String::new()));
        assert_eq!(state.ratio(), ProgressRatio::ZERO);
        assert_eq!(state.remaining_seconds(), None);
    }

    #[test]
    fn phase_labels() {
        assert_eq!(PhaseKind::from("pomodoro").label(), "pomodoro");
        assert_eq!(PhaseKind::from("short_break").label(), "break");
        assert!(PhaseKind::from("long_break").is_break());
        assert_eq!(PhaseKind::from("null").label(), "");
    }

    #[test]
    fn ratio_of_known_duration() {
        assert_eq!(ProgressRatio::compute(30.0, 1500).value(), 0.02);
        assert_eq!(ProgressRatio::compute(3000.0, 1500).value(), 2.0);
        assert_eq!(ProgressRatio::compute(3000.0, 1500).clamped(), 1.0);
        assert_eq!(ProgressRatio::compute(-10.0, 1500).clamped(), 0.0);
    }

    #[test]
    fn non_finite_values_become_zero() {
        assert_eq!(ProgressRatio::new(f64::NAN), ProgressRatio::ZERO);
        assert_eq!(ProgressRatio::new(f64::INFINITY), ProgressRatio::ZERO);
        assert_eq!(ProgressRatio::compute(f64::NAN, 10), ProgressRatio::ZERO);
    }

    #[test]
    fn remaining_never_negative() {
        let state = TimerState {
            is_paused: false,
            elapsed: 1600.0,
            phase: "pomodoro".into(),
            phase_duration: 1500,
        };
        assert_eq!(state.remaining_seconds(), Some(0.0));
    }

    proptest! {
        #[test]
        fn zero_duration_always_yields_zero(elapsed in proptest::num::f64::ANY) {
            prop_assert_eq!(ProgressRatio::compute(elapsed, 0).value(), 0.0);
        }

        #[test]
        fn ratio_is_always_finite(elapsed in proptest::num::f64::ANY, duration in any::<u64>()) {
            prop_assert!(ProgressRatio::compute(elapsed, duration).value().is_finite());
        }
    }
}
