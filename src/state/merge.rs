//! The reducer folding snapshots and change events into the local model

use serde::Serialize;

use super::timer_state::{ProgressRatio, TimerState};
use crate::codec::ChangeEvent;

/// Input to [`merge`]
#[derive(Debug, Clone, PartialEq)]
pub enum MergeEvent {
    /// A full `GetAll` result; replaces the local state entirely
    SnapshotLoaded(TimerState),
    /// One field pushed by the subscription
    Change(ChangeEvent),
}

impl From<ChangeEvent> for MergeEvent {
    fn from(event: ChangeEvent) -> Self {
        Self::Change(event)
    }
}

/// Timer state together with the progress ratio last derived for it.
///
/// The ratio is kept alongside rather than recomputed on demand: a pause
/// toggle leaves it untouched and a phase change zeroes it even though the
/// elapsed time still belongs to the old phase.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SyncedState {
    pub timer: TimerState,
    pub ratio: ProgressRatio,
}

impl SyncedState {
    pub fn new(timer: TimerState) -> Self {
        let ratio = timer.ratio();
        Self { timer, ratio }
    }
}

/// Compute the next state and ratio. Pure; the same inputs always give the same output.
pub fn merge(current: &SyncedState, event: MergeEvent) -> SyncedState {
    let mut next = current.clone();
    match event {
        MergeEvent::SnapshotLoaded(snapshot) => return SyncedState::new(snapshot),
        MergeEvent::Change(ChangeEvent::ElapsedChanged(elapsed)) => {
            next.timer.elapsed = elapsed;
            next.ratio = ProgressRatio::compute(elapsed, current.timer.phase_duration);
        }
        MergeEvent::Change(ChangeEvent::PhaseChanged(phase)) => {
            next.timer.phase = phase;
            next.ratio = ProgressRatio::ZERO;
        }
        MergeEvent::Change(ChangeEvent::IsPausedChanged(is_paused)) => {
            next.timer.is_paused = is_paused;
        }
        MergeEvent::Change(ChangeEvent::PhaseDurationChanged(duration)) => {
            next.timer.phase_duration = duration;
            next.ratio = ProgressRatio::compute(current.timer.elapsed, duration);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn running(elapsed: f64, duration: u64) -> SyncedState {
        SyncedState::new(TimerState {
            is_paused: false,
            elapsed,
            phase: "pomodoro".into(),
            phase_duration: duration,
        })
    }

    #[test]
    fn snapshot_replaces_everything() {
        let snapshot = TimerState {
            is_paused: true,
            elapsed: 60.0,
            phase: "long_break".into(),
            phase_duration: 900,
        };
        let next = merge(&running(10.0, 1500), MergeEvent::SnapshotLoaded(snapshot.clone()));
        assert_eq!(next.timer, snapshot);
        assert_eq!(next.ratio, ProgressRatio::compute(60.0, 900));
    }

    #[test]
    fn elapsed_uses_current_duration() {
        let next = merge(&running(0.0, 100), ChangeEvent::ElapsedChanged(25.0).into());
        assert_eq!(next.timer.elapsed, 25.0);
        assert_eq!(next.ratio.value(), 0.25);
    }

    #[test]
    fn phase_change_resets_ratio_only() {
        let current = running(750.0, 1500);
        let next = merge(&current, ChangeEvent::PhaseChanged("short_break".into()).into());
        assert_eq!(next.timer.phase, "short_break");
        assert_eq!(next.ratio, ProgressRatio::ZERO);
        assert_eq!(next.timer.elapsed, 750.0);
        assert_eq!(next.timer.phase_duration, 1500);
    }

    #[test]
    fn pause_keeps_ratio() {
        let current = merge(&running(750.0, 1500), ChangeEvent::PhaseChanged("x".into()).into());
        let next = merge(&current, ChangeEvent::IsPausedChanged(true).into());
        assert!(next.timer.is_paused);
        assert_eq!(next.ratio, current.ratio);
    }

    #[test]
    fn duration_change_recomputes_against_elapsed() {
        let next = merge(&running(750.0, 1500), ChangeEvent::PhaseDurationChanged(3000).into());
        assert_eq!(next.ratio.value(), 0.25);
        let next = merge(&next, ChangeEvent::PhaseDurationChanged(0).into());
        assert_eq!(next.ratio, ProgressRatio::ZERO);
    }

    #[test]
    fn elapsed_against_unknown_duration() {
        let next = merge(&SyncedState::default(), ChangeEvent::ElapsedChanged(12.0).into());
        assert_eq!(next.ratio, ProgressRatio::ZERO);
    }

    #[test]
    fn non_finite_elapsed_gives_zero_ratio() {
        let next = merge(&running(0.0, 100), ChangeEvent::ElapsedChanged(f64::INFINITY).into());
        assert_eq!(next.ratio, ProgressRatio::ZERO);
    }

    fn arb_timer() -> impl Strategy<Value = TimerState> {
        (any::<bool>(), 0.0f64..10_000.0, "[a-z_]{0,12}", 0u64..10_000).prop_map(
            |(is_paused, elapsed, phase, phase_duration)| TimerState {
                is_paused,
                elapsed,
                phase,
                phase_duration,
            },
        )
    }

    proptest! {
        #[test]
        fn snapshot_merge_is_idempotent(start in arb_timer(), snapshot in arb_timer()) {
            let start = SyncedState::new(start);
            let once = merge(&start, MergeEvent::SnapshotLoaded(snapshot.clone()));
            let twice = merge(&once, MergeEvent::SnapshotLoaded(snapshot.clone()));
            prop_assert_eq!(&once.timer, &snapshot);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn phase_change_always_zeroes(start in arb_timer(), phase in "[a-z_]{0,12}") {
            let next = merge(&SyncedState::new(start), ChangeEvent::PhaseChanged(phase).into());
            prop_assert_eq!(next.ratio, ProgressRatio::ZERO);
        }

        #[test]
        fn zero_duration_never_divides(start in arb_timer(), elapsed in proptest::num::f64::ANY) {
            let mut start = SyncedState::new(start);
            start.timer.phase_duration = 0;
            let next = merge(&start, ChangeEvent::ElapsedChanged(elapsed).into());
            prop_assert_eq!(next.ratio, ProgressRatio::ZERO);
        }
    }
}
