//! Lap records.
//!
//! Laps are stored newest first, which is also the display order. Capture
//! order is the reverse of storage order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lap {
    pub id: u64,
    /// Time since the previous lap (or since zero for the first lap).
    pub duration_ms: u64,
    /// Total elapsed time when the lap was captured.
    pub total_ms: u64,
}

/// Fastest and slowest lap durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapAnalysis {
    pub best_ms: u64,
    pub worst_ms: u64,
}

impl LapAnalysis {
    /// Whether the lap at `duration_ms` should be highlighted as best.
    pub fn is_best(&self, duration_ms: u64) -> bool {
        duration_ms == self.best_ms
    }

    /// Best wins ties, so a lap is only "worst" when it is not also best.
    pub fn is_worst(&self, duration_ms: u64) -> bool {
        duration_ms == self.worst_ms && !self.is_best(duration_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LapBook {
    laps: Vec<Lap>,
    previous_total_ms: u64,
}

impl LapBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts. `laps` must already be newest first.
    pub fn from_parts(laps: Vec<Lap>, previous_total_ms: u64) -> Self {
        Self {
            laps,
            previous_total_ms,
        }
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    pub fn previous_total_ms(&self) -> u64 {
        self.previous_total_ms
    }

    /// Capture a lap at `total_ms`.
    ///
    /// `total_ms` below the previous capture (a restored snapshot with a
    /// stale previous total) yields a zero-length lap rather than wrapping.
    pub fn capture(&mut self, total_ms: u64) -> Lap {
        let lap = Lap {
            id: self.next_id(),
            duration_ms: total_ms.saturating_sub(self.previous_total_ms),
            total_ms,
        };
        self.previous_total_ms = total_ms;
        self.laps.insert(0, lap);
        lap
    }

    pub fn clear(&mut self) {
        self.laps.clear();
        self.previous_total_ms = 0;
    }

    /// 1-based lap number in capture order for the lap at display `index`.
    pub fn number_at(&self, index: usize) -> usize {
        self.laps.len().saturating_sub(index)
    }

    /// `None` until there are two laps to compare.
    pub fn analysis(&self) -> Option<LapAnalysis> {
        if self.laps.len() < 2 {
            return None;
        }
        let durations = self.laps.iter().map(|l| l.duration_ms);
        Some(LapAnalysis {
            best_ms: durations.clone().min()?,
            worst_ms: durations.max()?,
        })
    }

    fn next_id(&self) -> u64 {
        self.laps.iter().map(|l| l.id).max().map_or(1, |max| max.saturating_add(1))
    }
}
