//! # Lapwatch Core Library
//!
//! This library provides the core logic for the Lapwatch stopwatch. The
//! CLI is a thin presentation layer over the same library; any other front
//! end (a GUI, a web view) would call into it the same way.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that derives elapsed
//!   time, laps and goal alerts. It has no threads; the caller invokes
//!   `tick()` on every display refresh.
//! - **Session**: A single-threaded loop that owns the engine and runs the
//!   sampling, color cycling and debounced persistence around it.
//! - **Storage**: One JSON record in a SQLite key-value table, plus a TOML
//!   configuration file.
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core stopwatch state machine
//! - [`Session`]: Periodic tasks and command handling
//! - [`PersistedSnapshot`]: The stored record
//! - [`Config`]: Application configuration management
//! - [`Notifier`]: Haptic/audio feedback hook

pub mod clock;
pub mod error;
pub mod events;
pub mod feedback;
pub mod format;
pub mod session;
pub mod storage;
pub mod timer;
pub mod voice;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use error::{ConfigError, CoreError, PersistenceError};
pub use events::{Event, FeedbackKind};
pub use feedback::{LogNotifier, Notifier, RecordingNotifier};
pub use format::{format_time, format_time_parts, TimeParts};
pub use session::{Backdrop, Frame, Session, SessionCommand, SessionHandle, SessionObserver, SessionOptions};
pub use storage::{Config, CosmeticSettings, Database, MemoryStore, PersistedSnapshot, SnapshotStore};
pub use timer::{AlertStatus, Lap, LapAnalysis, ThresholdConfig, TimerEngine, TimerState};
pub use voice::VoiceCommand;
