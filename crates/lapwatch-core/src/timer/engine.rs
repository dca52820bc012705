//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` on every
//! display refresh while the timer is running.
//!
//! ## State Transitions
//!
//! ```text
//!            start()
//! Stopped ───────────► Running
//!    ▲  ◄───────────      │
//!    │      stop()        │
//!    └──── reset() ◄──────┘   (reset also loops Stopped -> Stopped)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(SystemClock);
//! engine.start();
//! // In a loop:
//! engine.tick(); // Returns Some(Event::AlertRaised) on a goal transition
//! ```

use serde::{Deserialize, Serialize};

use super::alert::{AlertStatus, AlertTracker, ThresholdConfig};
use super::lap::{Lap, LapAnalysis, LapBook};
use crate::clock::Clock;
use crate::events::{at_ms, Event};
use crate::storage::PersistedSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Stopped,
    Running,
}

/// Core stopwatch engine.
///
/// Operates on wall-clock deltas -- no internal thread. None of the commands
/// can fail; an invalid command is a no-op that returns `None`.
#[derive(Debug)]
pub struct TimerEngine<C: Clock> {
    clock: C,
    /// Time accumulated by completed runs.
    elapsed_before_ms: u64,
    /// Epoch ms at which the current run began. `Some` iff running.
    run_started_ms: Option<u64>,
    laps: LapBook,
    threshold: ThresholdConfig,
    alert: AlertTracker,
}

impl<C: Clock> TimerEngine<C> {
    /// Create a stopped engine with zero elapsed time and the default goal.
    pub fn new(clock: C) -> Self {
        Self::with_threshold(clock, ThresholdConfig::default())
    }

    pub fn with_threshold(clock: C, threshold: ThresholdConfig) -> Self {
        Self {
            clock,
            elapsed_before_ms: 0,
            run_started_ms: None,
            laps: LapBook::new(),
            threshold,
            alert: AlertTracker::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        if self.run_started_ms.is_some() {
            TimerState::Running
        } else {
            TimerState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_started_ms.is_some()
    }

    /// Total elapsed time, excluding paused intervals.
    pub fn sample_elapsed(&self) -> u64 {
        match self.run_started_ms {
            Some(start) => self
                .elapsed_before_ms
                .saturating_add(self.clock.now_ms().saturating_sub(start)),
            None => self.elapsed_before_ms,
        }
    }

    /// Status last observed by `tick()`. Always `None` while stopped.
    pub fn alert_status(&self) -> AlertStatus {
        self.alert.status()
    }

    /// Pure evaluation against the current goal; does not touch the tracker.
    pub fn evaluate_threshold(&self, total_ms: u64) -> AlertStatus {
        AlertStatus::evaluate(total_ms, self.threshold.goal_ms())
    }

    pub fn threshold(&self) -> ThresholdConfig {
        self.threshold
    }

    pub fn laps(&self) -> &[Lap] {
        self.laps.laps()
    }

    pub fn previous_lap_total_ms(&self) -> u64 {
        self.laps.previous_total_ms()
    }

    pub fn lap_analysis(&self) -> Option<LapAnalysis> {
        self.laps.analysis()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            elapsed_ms: self.sample_elapsed(),
            goal_ms: self.threshold.goal_ms(),
            alert: self.alert.status(),
            lap_count: self.laps.len(),
            at: at_ms(self.clock.now_ms()),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.is_running() {
            return None;
        }
        let now = self.clock.now_ms();
        self.run_started_ms = Some(now);
        tracing::debug!(elapsed_ms = self.elapsed_before_ms, "timer started");
        Some(Event::TimerStarted {
            elapsed_ms: self.elapsed_before_ms,
            at: at_ms(now),
        })
    }

    pub fn stop(&mut self) -> Option<Event> {
        let start = self.run_started_ms.take()?;
        let now = self.clock.now_ms();
        self.elapsed_before_ms = self
            .elapsed_before_ms
            .saturating_add(now.saturating_sub(start));
        // Stopping cancels any in-flight goal alert.
        self.alert.clear();
        tracing::debug!(elapsed_ms = self.elapsed_before_ms, "timer stopped");
        Some(Event::TimerStopped {
            elapsed_ms: self.elapsed_before_ms,
            at: at_ms(now),
        })
    }

    /// Valid in any state. Persisted state is purged by the owner of the store.
    pub fn reset(&mut self) -> Option<Event> {
        self.run_started_ms = None;
        self.elapsed_before_ms = 0;
        self.laps.clear();
        self.alert.clear();
        tracing::info!("timer reset");
        Some(Event::TimerReset {
            at: at_ms(self.clock.now_ms()),
        })
    }

    /// Capture a lap. Not recordable while stopped at zero.
    pub fn record_lap(&mut self) -> Option<Event> {
        let total = self.sample_elapsed();
        if !self.is_running() && total == 0 {
            return None;
        }
        let lap = self.laps.capture(total);
        Some(Event::LapRecorded {
            lap,
            lap_number: self.laps.len(),
            at: at_ms(self.clock.now_ms()),
        })
    }

    /// Call on every sampling tick while running.
    ///
    /// Returns `Some(Event::AlertRaised)` only when the status changes into
    /// `Hit`, or into `Warning` from `None`. Staying in an alerting status
    /// returns `None` no matter how many times this is called.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        let total = self.sample_elapsed();
        let current = self.evaluate_threshold(total);
        let fired = self.alert.observe(current)?;
        tracing::debug!(status = ?fired, elapsed_ms = total, "goal alert");
        Some(Event::AlertRaised {
            status: fired,
            elapsed_ms: total,
            goal_ms: self.threshold.goal_ms(),
            at: at_ms(self.clock.now_ms()),
        })
    }

    /// Change the goal. Non-positive values clamp to one minute.
    /// The next `tick()` sees the new goal.
    pub fn set_goal_minutes(&mut self, goal_minutes: i64) {
        self.threshold = ThresholdConfig::new(goal_minutes);
    }

    /// Load persisted state. A restore never resumes a live run.
    pub fn restore(&mut self, snapshot: &PersistedSnapshot) {
        self.run_started_ms = None;
        self.alert.clear();
        self.elapsed_before_ms = snapshot.elapsed_ms;
        self.laps = LapBook::from_parts(snapshot.laps.clone(), snapshot.previous_total_ms);
        self.threshold = ThresholdConfig::new(snapshot.threshold_minutes);
        tracing::info!(
            elapsed_ms = snapshot.elapsed_ms,
            laps = snapshot.laps.len(),
            "restored stopwatch state"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use proptest::prelude::*;

    fn engine() -> (TimerEngine<ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        (TimerEngine::new(clock.clone()), clock)
    }

    #[test]
    fn start_stop_start_stop_accumulates_runs() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::new(clock.clone());
        engine.start();
        clock.set(3_000);
        engine.stop();
        clock.set(5_000);
        engine.start();
        clock.set(7_000);
        engine.stop();
        assert_eq!(engine.sample_elapsed(), 5_000);
        assert_eq!(engine.state(), TimerState::Stopped);
    }

    #[test]
    fn start_while_running_is_noop() {
        let (mut engine, clock) = engine();
        assert!(engine.start().is_some());
        clock.advance(1_000);
        assert!(engine.start().is_none());
        clock.advance(1_000);
        assert_eq!(engine.sample_elapsed(), 2_000);
    }

    #[test]
    fn stop_while_stopped_is_noop() {
        let (mut engine, _clock) = engine();
        assert!(engine.stop().is_none());
        assert_eq!(engine.sample_elapsed(), 0);
    }

    #[test]
    fn sample_is_pure() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(400);
        assert_eq!(engine.sample_elapsed(), 400);
        assert_eq!(engine.sample_elapsed(), 400);
        assert!(engine.is_running());
    }

    #[test]
    fn reset_clears_everything_from_running() {
        let (mut engine, clock) = engine();
        engine.set_goal_minutes(1);
        engine.start();
        clock.advance(61_000);
        engine.record_lap();
        engine.tick();
        assert_eq!(engine.alert_status(), AlertStatus::Hit);

        assert!(engine.reset().is_some());
        assert_eq!(engine.sample_elapsed(), 0);
        assert!(engine.laps().is_empty());
        assert_eq!(engine.previous_lap_total_ms(), 0);
        assert_eq!(engine.alert_status(), AlertStatus::None);
        assert_eq!(engine.state(), TimerState::Stopped);
        clock.advance(5_000);
        assert_eq!(engine.sample_elapsed(), 0);
    }

    #[test]
    fn lap_not_recordable_at_zero_while_stopped() {
        let (mut engine, _clock) = engine();
        assert!(engine.record_lap().is_none());
        assert!(engine.laps().is_empty());
    }

    #[test]
    fn lap_recordable_while_stopped_with_time() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(2_000);
        engine.stop();
        clock.advance(9_000);
        match engine.record_lap() {
            Some(Event::LapRecorded { lap, lap_number, .. }) => {
                assert_eq!(lap.total_ms, 2_000);
                assert_eq!(lap_number, 1);
            }
            other => panic!("expected LapRecorded, got {other:?}"),
        }
    }

    #[test]
    fn lap_recordable_immediately_after_start() {
        let (mut engine, _clock) = engine();
        engine.start();
        assert!(engine.record_lap().is_some());
        assert_eq!(engine.laps()[0].duration_ms, 0);
    }

    #[test]
    fn back_to_back_laps_have_zero_duration() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(1_234);
        engine.record_lap();
        engine.record_lap();
        let laps = engine.laps();
        assert_eq!(laps[0].duration_ms, 0);
        assert_eq!(laps[0].total_ms, laps[1].total_ms);
    }

    #[test]
    fn goal_scenario_fires_once_per_boundary() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::new(clock.clone());
        engine.set_goal_minutes(1);
        engine.start();

        let mut statuses = Vec::new();
        let mut fired = Vec::new();
        for t in [0, 50_000, 55_000, 61_000] {
            clock.set(t);
            if let Some(Event::AlertRaised { status, elapsed_ms, .. }) = engine.tick() {
                fired.push((elapsed_ms, status));
            }
            statuses.push(engine.alert_status());
        }

        assert_eq!(
            statuses,
            vec![
                AlertStatus::None,
                AlertStatus::Warning,
                AlertStatus::Warning,
                AlertStatus::Hit
            ]
        );
        assert_eq!(
            fired,
            vec![(50_000, AlertStatus::Warning), (61_000, AlertStatus::Hit)]
        );
    }

    #[test]
    fn past_hit_never_refires() {
        let (mut engine, clock) = engine();
        engine.set_goal_minutes(1);
        engine.start();
        clock.advance(60_000);
        assert!(engine.tick().is_some());
        for _ in 0..100 {
            clock.advance(16);
            assert!(engine.tick().is_none());
        }
        assert_eq!(engine.alert_status(), AlertStatus::Hit);
    }

    #[test]
    fn stop_cancels_alert_and_restart_refires() {
        let (mut engine, clock) = engine();
        engine.set_goal_minutes(1);
        engine.start();
        clock.advance(65_000);
        assert!(engine.tick().is_some());
        engine.stop();
        assert_eq!(engine.alert_status(), AlertStatus::None);
        assert!(engine.tick().is_none());
        engine.start();
        assert!(matches!(
            engine.tick(),
            Some(Event::AlertRaised { status: AlertStatus::Hit, .. })
        ));
    }

    #[test]
    fn raising_goal_mid_run_drops_status_silently() {
        let (mut engine, clock) = engine();
        engine.set_goal_minutes(1);
        engine.start();
        clock.advance(60_000);
        engine.tick();
        engine.set_goal_minutes(10);
        assert!(engine.tick().is_none());
        assert_eq!(engine.alert_status(), AlertStatus::None);
    }

    #[test]
    fn goal_minutes_clamp_to_one() {
        let (mut engine, _clock) = engine();
        engine.set_goal_minutes(0);
        assert_eq!(engine.threshold().goal_minutes(), 1);
        engine.set_goal_minutes(-3);
        assert_eq!(engine.threshold().goal_ms(), 60_000);
    }

    #[test]
    fn restore_never_resumes() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(500);
        let snapshot = PersistedSnapshot {
            elapsed_ms: 12_345,
            previous_total_ms: 10_000,
            laps: vec![Lap { id: 1, duration_ms: 10_000, total_ms: 10_000 }],
            threshold_minutes: 2,
            ..PersistedSnapshot::default()
        };
        engine.restore(&snapshot);
        assert!(!engine.is_running());
        clock.advance(10_000);
        assert_eq!(engine.sample_elapsed(), 12_345);
        assert_eq!(engine.laps().len(), 1);
        assert_eq!(engine.threshold().goal_minutes(), 2);

        engine.start();
        clock.advance(655);
        match engine.record_lap() {
            Some(Event::LapRecorded { lap, .. }) => {
                assert_eq!(lap.total_ms, 13_000);
                assert_eq!(lap.duration_ms, 3_000);
                assert_eq!(lap.id, 2);
            }
            other => panic!("expected LapRecorded, got {other:?}"),
        }
    }

    #[test]
    fn clock_going_backwards_does_not_underflow() {
        let clock = ManualClock::new(10_000);
        let mut engine = TimerEngine::new(clock.clone());
        engine.start();
        clock.set(9_000);
        assert_eq!(engine.sample_elapsed(), 0);
        engine.stop();
        assert_eq!(engine.sample_elapsed(), 0);
    }

    #[test]
    fn snapshot_reports_running_state() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(750);
        match engine.snapshot() {
            Event::StateSnapshot { state, elapsed_ms, goal_ms, .. } => {
                assert_eq!(state, TimerState::Running);
                assert_eq!(elapsed_ms, 750);
                assert_eq!(goal_ms, 5 * 60_000);
            }
            other => panic!("expected StateSnapshot, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn elapsed_is_sum_of_runs(runs in prop::collection::vec((0u64..100_000, 0u64..100_000), 1..20)) {
            let clock = ManualClock::new(0);
            let mut engine = TimerEngine::new(clock.clone());
            let mut expected = 0;
            for (run, pause) in runs {
                engine.start();
                clock.advance(run);
                engine.stop();
                expected += run;
                clock.advance(pause);
            }
            prop_assert_eq!(engine.sample_elapsed(), expected);
        }

        #[test]
        fn lap_durations_telescope(gaps in prop::collection::vec(0u64..50_000, 1..30)) {
            let clock = ManualClock::new(0);
            let mut engine = TimerEngine::new(clock.clone());
            engine.start();
            for gap in gaps {
                clock.advance(gap);
                engine.record_lap();
            }
            let sum: u64 = engine.laps().iter().map(|l| l.duration_ms).sum();
            prop_assert_eq!(sum, engine.laps()[0].total_ms);
            let totals: Vec<u64> = engine.laps().iter().rev().map(|l| l.total_ms).collect();
            prop_assert!(totals.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn reset_always_zeroes(ops in prop::collection::vec(0u8..4, 0..40)) {
            let clock = ManualClock::new(0);
            let mut engine = TimerEngine::new(clock.clone());
            for op in ops {
                clock.advance(1_000);
                match op {
                    0 => { engine.start(); }
                    1 => { engine.stop(); }
                    2 => { engine.record_lap(); }
                    _ => { engine.tick(); }
                }
            }
            engine.reset();
            prop_assert_eq!(engine.sample_elapsed(), 0);
            prop_assert!(engine.laps().is_empty());
            prop_assert_eq!(engine.alert_status(), AlertStatus::None);
        }
    }
}
