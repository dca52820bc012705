mod alert;
mod engine;
mod lap;

pub use alert::{AlertStatus, AlertTracker, ThresholdConfig, DEFAULT_GOAL_MINUTES, WARNING_WINDOW_MS};
pub use engine::{TimerEngine, TimerState};
pub use lap::{Lap, LapAnalysis, LapBook};
