//! The persisted stopwatch record.
//!
//! One JSON object per store:
//!
//! ```json
//! {
//!   "elapsedTime": 12345,
//!   "previousTotalTime": 10000,
//!   "laps": [{ "id": 1, "duration": 10000, "totalTime": 10000 }],
//!   "customMessage": "MY STOPWATCH",
//!   "thresholdMinutes": 5,
//!   "bgImage": null,
//!   "bgColor": "#121212"
//! }
//! ```
//!
//! Every field is optional on load. A record that cannot be decoded at all is
//! treated as absent.

use serde::{Deserialize, Serialize};

use super::settings::CosmeticSettings;
use super::store::SnapshotStore;
use crate::clock::Clock;
use crate::error::PersistenceError;
use crate::timer::{Lap, TimerEngine, DEFAULT_GOAL_MINUTES};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    #[serde(rename = "elapsedTime", default, deserialize_with = "lenient::u64")]
    pub elapsed_ms: u64,
    #[serde(rename = "previousTotalTime", default, deserialize_with = "lenient::u64")]
    pub previous_total_ms: u64,
    /// Newest first.
    #[serde(default, with = "wire_laps")]
    pub laps: Vec<Lap>,
    /// Signed so a stored zero or negative value can be clamped instead of
    /// failing the whole record.
    #[serde(default = "default_threshold", deserialize_with = "lenient::i64")]
    pub threshold_minutes: i64,
    #[serde(flatten)]
    pub settings: CosmeticSettings,
}

fn default_threshold() -> i64 {
    i64::from(DEFAULT_GOAL_MINUTES)
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        Self {
            elapsed_ms: 0,
            previous_total_ms: 0,
            laps: Vec::new(),
            threshold_minutes: default_threshold(),
            settings: CosmeticSettings::default(),
        }
    }
}

impl PersistedSnapshot {
    /// Point-in-time copy of the engine. Elapsed is sampled now, so a
    /// mid-run capture keeps the time accrued so far.
    pub fn capture<C: Clock>(engine: &TimerEngine<C>, settings: &CosmeticSettings) -> Self {
        Self {
            elapsed_ms: engine.sample_elapsed(),
            previous_total_ms: engine.previous_lap_total_ms(),
            laps: engine.laps().to_vec(),
            threshold_minutes: i64::from(engine.threshold().goal_minutes()),
            settings: settings.clone(),
        }
    }

    /// # Errors
    /// Returns `ReadCorrupt` if `json` is not a valid record.
    pub fn decode(json: &str) -> Result<Self, PersistenceError> {
        serde_json::from_str(json).map_err(|e| PersistenceError::ReadCorrupt {
            message: e.to_string(),
        })
    }

    /// # Errors
    /// Returns `WriteFailed` if serialization fails.
    pub fn encode(&self) -> Result<String, PersistenceError> {
        serde_json::to_string(self).map_err(|e| PersistenceError::WriteFailed {
            message: e.to_string(),
        })
    }

    /// Whether there is anything worth keeping.
    pub fn has_content(&self) -> bool {
        self.elapsed_ms > 0
            || !self.laps.is_empty()
            || self.threshold_minutes != default_threshold()
            || !self.settings.is_default()
    }

    /// Read the stored record. Missing, unreadable and corrupt records all
    /// come back as `None`. Never fails.
    pub fn load<S: SnapshotStore + ?Sized>(store: &S) -> Option<Self> {
        match store.load() {
            Ok(Some(json)) => match Self::decode(&json) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring stored stopwatch state");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored stopwatch state");
                None
            }
        }
    }

    pub fn load_or_default<S: SnapshotStore + ?Sized>(store: &S) -> Self {
        Self::load(store).unwrap_or_default()
    }
}

/// Numeric fields accept any JSON number. Fractions truncate, and values
/// outside the target range saturate.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Number;

    pub fn u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let n = Number::deserialize(deserializer)?;
        Ok(match (n.as_u64(), n.as_i64()) {
            (Some(v), _) => v,
            (None, Some(_)) => 0,
            // `as` truncates toward zero, saturates, and maps NaN to 0.
            (None, None) => n.as_f64().map_or(0, |f| f as u64),
        })
    }

    pub fn i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let n = Number::deserialize(deserializer)?;
        Ok(match (n.as_i64(), n.as_u64()) {
            (Some(v), _) => v,
            (None, Some(_)) => i64::MAX,
            (None, None) => n.as_f64().map_or(0, |f| f as i64),
        })
    }
}

mod wire_laps {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::timer::Lap;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct WireLap {
        #[serde(deserialize_with = "super::lenient::u64")]
        id: u64,
        #[serde(deserialize_with = "super::lenient::u64")]
        duration: u64,
        #[serde(deserialize_with = "super::lenient::u64")]
        total_time: u64,
    }

    pub fn serialize<S: Serializer>(laps: &[Lap], serializer: S) -> Result<S::Ok, S::Error> {
        laps.iter()
            .map(|l| WireLap {
                id: l.id,
                duration: l.duration_ms,
                total_time: l.total_ms,
            })
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Lap>, D::Error> {
        let wire = Vec::<WireLap>::deserialize(deserializer)?;
        Ok(wire
            .into_iter()
            .map(|w| Lap {
                id: w.id,
                duration_ms: w.duration,
                total_ms: w.total_time,
            })
            .collect())
    }
}
