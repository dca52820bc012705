//! Background color cycling while the stopwatch runs.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::timer::AlertStatus;

/// What the presentation layer should paint behind the timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Backdrop {
    /// The user's chosen color; shown while stopped.
    Base(String),
    /// A cycling color; shown while running without an alert.
    Cycling(String),
    /// Goal alert in progress; cycling is suspended.
    Alert(AlertStatus),
}

impl Backdrop {
    /// CSS color for this backdrop.
    pub fn css(&self) -> String {
        match self {
            Backdrop::Base(color) | Backdrop::Cycling(color) => color.clone(),
            Backdrop::Alert(AlertStatus::Hit) => "#7f1d1d".into(),
            Backdrop::Alert(_) => "#78350f".into(),
        }
    }
}

/// Random dark hues, reproducible from a seed.
#[derive(Debug, Clone)]
pub struct Palette {
    rng: Pcg64,
}

impl Palette {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Pcg64::from_entropy(),
        }
    }

    /// Next color, `hsl(<hue>, 60%, 20%)`.
    pub fn next_color(&mut self) -> String {
        let hue: u16 = self.rng.gen_range(0..360);
        format!("hsl({hue}, 60%, 20%)")
    }
}
