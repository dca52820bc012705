use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{AlertStatus, Lap, TimerState};

/// Every state change of the timer engine produces an Event.
/// The presentation layer renders them; the notifier turns them into pulses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    LapRecorded {
        lap: Lap,
        lap_number: usize,
        at: DateTime<Utc>,
    },
    /// Edge-triggered: emitted once on entry into `Warning` or `Hit`.
    AlertRaised {
        status: AlertStatus,
        elapsed_ms: u64,
        goal_ms: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        elapsed_ms: u64,
        goal_ms: u64,
        alert: AlertStatus,
        lap_count: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The haptic/audio cue this event asks for, if any.
    pub fn feedback(&self) -> Option<FeedbackKind> {
        match self {
            Event::TimerStarted { .. }
            | Event::TimerStopped { .. }
            | Event::TimerReset { .. }
            | Event::LapRecorded { .. } => Some(FeedbackKind::Generic),
            Event::AlertRaised { status, .. } => match status {
                AlertStatus::Warning => Some(FeedbackKind::ShortPulse),
                AlertStatus::Hit => Some(FeedbackKind::TriplePulse),
                AlertStatus::None => None,
            },
            Event::StateSnapshot { .. } => None,
        }
    }
}

/// Kind tag handed to the external notifier. The core does not own the
/// notification mechanism, only the tag and its vibration pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    /// Button-press tap.
    Generic,
    /// Goal approaching.
    ShortPulse,
    /// Goal reached.
    TriplePulse,
}

impl FeedbackKind {
    /// Vibration pattern in the `navigator.vibrate` convention: on, off, on...
    pub fn pattern_ms(self) -> &'static [u64] {
        match self {
            FeedbackKind::Generic => &[50],
            FeedbackKind::ShortPulse => &[200],
            FeedbackKind::TriplePulse => &[200, 100, 200, 100, 200],
        }
    }
}

pub(crate) fn at_ms(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}
