//! Goal threshold and edge-triggered alert tracking.
//!
//! [`AlertStatus::evaluate`] is a pure function of `(total_ms, goal_ms)`.
//! [`AlertTracker`] remembers the previous status so that a sampling loop
//! calling it every frame fires at most once per transition.

use serde::{Deserialize, Serialize};

/// Time before the goal at which `Warning` starts.
pub const WARNING_WINDOW_MS: u64 = 10_000;

/// Goal used when nothing else is configured.
pub const DEFAULT_GOAL_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    None,
    Warning,
    Hit,
}

impl AlertStatus {
    pub fn evaluate(total_ms: u64, goal_ms: u64) -> Self {
        if total_ms >= goal_ms {
            AlertStatus::Hit
        } else if goal_ms - total_ms <= WARNING_WINDOW_MS {
            AlertStatus::Warning
        } else {
            AlertStatus::None
        }
    }

    pub fn is_alerting(self) -> bool {
        self != AlertStatus::None
    }
}

/// Countdown goal configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    goal_minutes: u32,
}

impl ThresholdConfig {
    /// Non-positive values clamp to one minute.
    pub fn new(goal_minutes: i64) -> Self {
        let clamped = goal_minutes.clamp(1, i64::from(u32::MAX));
        if clamped != goal_minutes {
            tracing::warn!(requested = goal_minutes, used = clamped, "goal minutes clamped");
        }
        Self {
            goal_minutes: u32::try_from(clamped).unwrap_or(u32::MAX),
        }
    }

    pub fn goal_minutes(&self) -> u32 {
        self.goal_minutes
    }

    pub fn goal_ms(&self) -> u64 {
        u64::from(self.goal_minutes).saturating_mul(60_000)
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            goal_minutes: DEFAULT_GOAL_MINUTES,
        }
    }
}

/// Edge detector over [`AlertStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertTracker {
    previous: AlertStatus,
}

impl AlertTracker {
    pub fn new() -> Self {
        Self {
            previous: AlertStatus::None,
        }
    }

    pub fn status(&self) -> AlertStatus {
        self.previous
    }

    /// Record `current` and report whether a feedback side effect should fire.
    ///
    /// Fires on entry into `Hit`, and on entry into `Warning` from `None`.
    /// Dropping back (goal raised mid-run) updates the status silently.
    pub fn observe(&mut self, current: AlertStatus) -> Option<AlertStatus> {
        let previous = std::mem::replace(&mut self.previous, current);
        match (previous, current) {
            (p, c) if p == c => None,
            (_, AlertStatus::Hit) => Some(AlertStatus::Hit),
            (AlertStatus::None, AlertStatus::Warning) => Some(AlertStatus::Warning),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.previous = AlertStatus::None;
    }
}

impl Default for AlertTracker {
    fn default() -> Self {
        Self::new()
    }
}
