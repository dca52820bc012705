//! Single-threaded session loop.
//!
//! One task owns the [`TimerEngine`] and everything periodic around it:
//!
//! - the sampling interval (one frame per tick, goal evaluation),
//! - the color cycling interval,
//! - the persistence debounce deadline,
//! - the command channel from the presentation layer.
//!
//! Intervals exist only while the engine runs. They are created by `start`
//! and dropped by `stop`, `reset` and teardown, so a second sampler can never
//! exist and nothing fires once the loop has returned.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::debounce::Debounce;
use super::palette::{Backdrop, Palette};
use crate::clock::Clock;
use crate::events::Event;
use crate::feedback::{LogNotifier, Notifier};
use crate::storage::{Config, CosmeticSettings, PersistedSnapshot, SnapshotStore};
use crate::timer::{AlertStatus, ThresholdConfig, TimerEngine};
use crate::voice::VoiceCommand;

/// Requests from the presentation layer.
#[derive(Debug)]
pub enum SessionCommand {
    Start,
    Stop,
    /// Start if stopped, stop if running (the big button).
    Toggle,
    Lap,
    Reset,
    /// Raw recognizer transcript.
    Voice(String),
    SetGoal(i64),
    SetMessage(String),
    SetColor(String),
    /// `data:` URI, or `None` to remove the image.
    SetImage(Option<String>),
    /// Reply with a `StateSnapshot` event.
    Query(oneshot::Sender<Event>),
    Shutdown,
}

/// What the presentation layer sees on every refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub elapsed_ms: u64,
    pub running: bool,
    pub alert: AlertStatus,
}

/// Presentation layer hooks. Every method defaults to a no-op.
pub trait SessionObserver {
    fn on_frame(&mut self, _frame: &Frame) {}
    fn on_event(&mut self, _event: &Event) {}
    fn on_backdrop(&mut self, _backdrop: &Backdrop) {}
    fn on_settings(&mut self, _settings: &CosmeticSettings) {}
    /// Transient, non-fatal status message (e.g. a failed save).
    fn on_status(&mut self, _message: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SessionObserver for NullObserver {}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub tick_interval: Duration,
    pub color_interval: Duration,
    pub debounce_delay: Duration,
    pub debounce_max_wait: Duration,
    /// Goal used when the store holds no record.
    pub default_threshold: ThresholdConfig,
    pub feedback_enabled: bool,
    pub voice_enabled: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            color_interval: config.color_interval(),
            debounce_delay: config.debounce_delay(),
            debounce_max_wait: config.debounce_max_wait(),
            default_threshold: config.threshold(),
            feedback_enabled: config.feedback.enabled,
            voice_enabled: config.voice.enabled,
        }
    }
}

/// Cloneable sender side of a session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Returns `false` once the session has shut down.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn start(&self) -> bool {
        self.send(SessionCommand::Start)
    }

    pub fn stop(&self) -> bool {
        self.send(SessionCommand::Stop)
    }

    pub fn lap(&self) -> bool {
        self.send(SessionCommand::Lap)
    }

    pub fn reset(&self) -> bool {
        self.send(SessionCommand::Reset)
    }

    pub fn shutdown(&self) -> bool {
        self.send(SessionCommand::Shutdown)
    }

    /// Current engine state, or `None` if the session is gone.
    pub async fn query(&self) -> Option<Event> {
        let (tx, rx) = oneshot::channel();
        if !self.send(SessionCommand::Query(tx)) {
            return None;
        }
        rx.await.ok()
    }
}

pub struct Session<C: Clock, S: SnapshotStore> {
    engine: TimerEngine<C>,
    store: S,
    settings: CosmeticSettings,
    options: SessionOptions,
    notifier: Box<dyn Notifier>,
    observer: Box<dyn SessionObserver>,
    palette: Palette,
    backdrop: Backdrop,
    debounce: Debounce,
    sampler: Option<Interval>,
    cycler: Option<Interval>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
}

impl<C: Clock, S: SnapshotStore> Session<C, S> {
    /// Build a session, restoring whatever the store holds.
    ///
    /// A restored session is always stopped.
    pub fn new(clock: C, store: S, options: SessionOptions) -> (Self, SessionHandle) {
        let mut engine = TimerEngine::with_threshold(clock, options.default_threshold);
        let settings = match PersistedSnapshot::load(&store) {
            Some(snapshot) => {
                engine.restore(&snapshot);
                snapshot.settings
            }
            None => CosmeticSettings::default(),
        };
        let debounce = Debounce::new(options.debounce_delay).with_max_wait(options.debounce_max_wait);
        let (tx, commands) = mpsc::unbounded_channel();
        let session = Self {
            engine,
            store,
            backdrop: Backdrop::Base(settings.bg_color.clone()),
            settings,
            options,
            notifier: Box::new(LogNotifier),
            observer: Box::new(NullObserver),
            palette: Palette::from_entropy(),
            debounce,
            sampler: None,
            cycler: None,
            commands,
        };
        (session, SessionHandle { tx })
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_observer(mut self, observer: impl SessionObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn engine(&self) -> &TimerEngine<C> {
        &self.engine
    }

    pub fn settings(&self) -> &CosmeticSettings {
        &self.settings
    }

    /// Drive the session until `Shutdown` or until every handle is dropped.
    ///
    /// Returns the final state. A pending write is flushed before returning.
    pub async fn run(mut self) -> PersistedSnapshot {
        self.observer.on_settings(&self.settings);
        self.observer.on_backdrop(&self.backdrop);
        self.emit_frame();

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
                () = next_tick(&mut self.sampler) => self.on_sample(),
                () = next_tick(&mut self.cycler) => self.on_cycle(),
                () = sleep_until(self.debounce.deadline()) => {
                    if self.debounce.take_if_due(Instant::now()) {
                        self.flush();
                    }
                }
            }
        }

        self.teardown()
    }

    fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start => self.start(),
            SessionCommand::Stop => self.stop(),
            SessionCommand::Toggle => {
                if self.engine.is_running() {
                    self.stop();
                } else {
                    self.start();
                }
            }
            SessionCommand::Lap => self.lap(),
            SessionCommand::Reset => self.reset(),
            SessionCommand::Voice(transcript) => self.voice(&transcript),
            SessionCommand::SetGoal(minutes) => {
                self.engine.set_goal_minutes(minutes);
                self.schedule_write();
            }
            SessionCommand::SetMessage(message) => {
                self.settings.custom_message = message;
                self.settings_changed();
            }
            SessionCommand::SetColor(color) => {
                self.settings.bg_color = color;
                if !self.engine.is_running() {
                    self.set_backdrop(Backdrop::Base(self.settings.bg_color.clone()));
                }
                self.settings_changed();
            }
            SessionCommand::SetImage(image) => {
                self.settings.bg_image = image;
                self.settings_changed();
            }
            SessionCommand::Query(reply) => {
                let _ = reply.send(self.engine.snapshot());
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn start(&mut self) {
        let Some(event) = self.engine.start() else {
            return;
        };
        let now = Instant::now();
        let mut sampler = tokio::time::interval_at(now, self.options.tick_interval);
        sampler.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut cycler =
            tokio::time::interval_at(now + self.options.color_interval, self.options.color_interval);
        cycler.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.sampler = Some(sampler);
        self.cycler = Some(cycler);

        let color = self.palette.next_color();
        self.set_backdrop(Backdrop::Cycling(color));
        self.dispatch(event);
        self.mark_dirty();
    }

    fn stop(&mut self) {
        let Some(event) = self.engine.stop() else {
            return;
        };
        self.cancel_periodic();
        self.set_backdrop(Backdrop::Base(self.settings.bg_color.clone()));
        self.dispatch(event);
        self.emit_frame();
        self.mark_dirty();
    }

    fn lap(&mut self) {
        if let Some(event) = self.engine.record_lap() {
            self.dispatch(event);
            self.mark_dirty();
        }
    }

    fn reset(&mut self) {
        self.cancel_periodic();
        self.debounce.cancel();
        if let Some(event) = self.engine.reset() {
            self.dispatch(event);
        }
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to purge stored stopwatch state");
            self.observer.on_status(&e.to_string());
        }
        self.set_backdrop(Backdrop::Base(self.settings.bg_color.clone()));
        self.emit_frame();
    }

    fn voice(&mut self, transcript: &str) {
        if !self.options.voice_enabled {
            return;
        }
        let Some(command) = VoiceCommand::recognize(transcript, self.engine.is_running()) else {
            return;
        };
        match command {
            VoiceCommand::Start => self.start(),
            VoiceCommand::Stop => self.stop(),
            VoiceCommand::Lap => self.lap(),
        }
    }

    fn on_sample(&mut self) {
        if let Some(event) = self.engine.tick() {
            self.dispatch(event);
        }
        self.sync_alert_backdrop();
        self.emit_frame();
        // Long runs are saved at least every `debounce_max_wait`.
        self.schedule_write();
    }

    fn on_cycle(&mut self) {
        if self.engine.alert_status().is_alerting() {
            return;
        }
        let color = self.palette.next_color();
        self.set_backdrop(Backdrop::Cycling(color));
    }

    fn sync_alert_backdrop(&mut self) {
        let status = self.engine.alert_status();
        let shown = match self.backdrop {
            Backdrop::Alert(shown) => Some(shown),
            _ => None,
        };
        match (shown, status.is_alerting()) {
            (Some(shown), true) if shown == status => {}
            (_, true) => self.set_backdrop(Backdrop::Alert(status)),
            (Some(_), false) => {
                let color = self.palette.next_color();
                self.set_backdrop(Backdrop::Cycling(color));
            }
            (None, false) => {}
        }
    }

    fn dispatch(&mut self, event: Event) {
        if self.options.feedback_enabled {
            if let Some(kind) = event.feedback() {
                self.notifier.notify(kind);
            }
        }
        self.observer.on_event(&event);
    }

    fn set_backdrop(&mut self, backdrop: Backdrop) {
        if self.backdrop != backdrop {
            self.backdrop = backdrop;
            self.observer.on_backdrop(&self.backdrop);
        }
    }

    fn settings_changed(&mut self) {
        self.observer.on_settings(&self.settings);
        self.schedule_write();
    }

    fn emit_frame(&mut self) {
        let frame = Frame {
            elapsed_ms: self.engine.sample_elapsed(),
            running: self.engine.is_running(),
            alert: self.engine.alert_status(),
        };
        self.observer.on_frame(&frame);
    }

    /// Schedule a write if there is anything worth keeping.
    fn mark_dirty(&mut self) {
        if self.engine.is_running() || self.current_snapshot().has_content() {
            self.schedule_write();
        }
    }

    /// Explicit edits are always written, even back to the defaults.
    fn schedule_write(&mut self) {
        self.debounce.schedule(Instant::now());
    }

    fn current_snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot::capture(&self.engine, &self.settings)
    }

    /// Fire-and-forget write. Failure is reported, never rolled back.
    fn flush(&mut self) {
        let result = self
            .current_snapshot()
            .encode()
            .and_then(|json| self.store.save(&json));
        match result {
            Ok(()) => tracing::debug!("stopwatch state saved"),
            Err(e) => {
                tracing::warn!(error = %e, "failed to save stopwatch state");
                self.observer.on_status(&e.to_string());
            }
        }
    }

    fn cancel_periodic(&mut self) {
        self.sampler = None;
        self.cycler = None;
    }

    fn teardown(mut self) -> PersistedSnapshot {
        self.cancel_periodic();
        if self.debounce.take_pending() {
            self.flush();
        }
        tracing::debug!("session ended");
        self.current_snapshot()
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::clock::TokioClock;
    use crate::events::FeedbackKind;
    use crate::feedback::RecordingNotifier;
    use crate::storage::MemoryStore;

    #[derive(Default)]
    struct Seen {
        frames: Vec<Frame>,
        events: Vec<Event>,
        backdrops: Vec<Backdrop>,
        statuses: Vec<String>,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Seen>>);

    impl Recorder {
        fn frames(&self) -> usize {
            self.0.borrow().frames.len()
        }

        fn alerts(&self) -> Vec<AlertStatus> {
            self.0
                .borrow()
                .events
                .iter()
                .filter_map(|e| match e {
                    Event::AlertRaised { status, .. } => Some(*status),
                    _ => None,
                })
                .collect()
        }
    }

    impl SessionObserver for Recorder {
        fn on_frame(&mut self, frame: &Frame) {
            self.0.borrow_mut().frames.push(*frame);
        }
        fn on_event(&mut self, event: &Event) {
            self.0.borrow_mut().events.push(event.clone());
        }
        fn on_backdrop(&mut self, backdrop: &Backdrop) {
            self.0.borrow_mut().backdrops.push(backdrop.clone());
        }
        fn on_status(&mut self, message: &str) {
            self.0.borrow_mut().statuses.push(message.to_string());
        }
    }

    fn options() -> SessionOptions {
        SessionOptions {
            tick_interval: Duration::from_millis(100),
            color_interval: Duration::from_millis(1_000),
            debounce_delay: Duration::from_millis(500),
            debounce_max_wait: Duration::from_millis(5_000),
            ..SessionOptions::default()
        }
    }

    fn session(store: MemoryStore) -> (Session<TokioClock, MemoryStore>, SessionHandle, Recorder) {
        let recorder = Recorder::default();
        let (session, handle) = Session::new(TokioClock::anchored_at(0), store, options());
        let session = session
            .with_observer(recorder.clone())
            .with_palette(Palette::seeded(1));
        (session, handle, recorder)
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn paused_runs_accumulate() {
        let (session, handle, _recorder) = session(MemoryStore::new());
        let script = async {
            handle.start();
            sleep_ms(3_000).await;
            handle.stop();
            sleep_ms(2_000).await;
            handle.start();
            sleep_ms(2_000).await;
            handle.stop();
            handle.shutdown();
        };
        let (result, ()) = tokio::join!(session.run(), script);
        assert_eq!(result.elapsed_ms, 5_000);
    }

    #[tokio::test(start_paused = true)]
    async fn sampling_stops_with_the_timer() {
        let (session, handle, recorder) = session(MemoryStore::new());
        let script = async {
            handle.start();
            sleep_ms(1_050).await;
            handle.stop();
            // Let the session apply Stop and emit its final frame.
            sleep_ms(1).await;
            let after_stop = recorder.frames();
            sleep_ms(5_000).await;
            assert_eq!(recorder.frames(), after_stop);
            handle.shutdown();
        };
        tokio::join!(session.run(), script);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_keeps_one_sampler() {
        let (session, handle, recorder) = session(MemoryStore::new());
        let script = async {
            handle.start();
            handle.start();
            sleep_ms(1_050).await;
            let before = recorder.frames();
            sleep_ms(1_000).await;
            assert_eq!(recorder.frames() - before, 10);
            handle.start();
            sleep_ms(1_000).await;
            handle.shutdown();
        };
        tokio::join!(session.run(), script);
    }

    #[tokio::test(start_paused = true)]
    async fn goal_alerts_fire_once_each() {
        let notifier = RecordingNotifier::new();
        let (session, handle, recorder) = session(MemoryStore::new());
        let session = session.with_notifier(notifier.clone());
        let script = async {
            handle.send(SessionCommand::SetGoal(1));
            handle.start();
            sleep_ms(65_000).await;
            handle.shutdown();
        };
        tokio::join!(session.run(), script);

        assert_eq!(recorder.alerts(), vec![AlertStatus::Warning, AlertStatus::Hit]);
        assert_eq!(notifier.count(FeedbackKind::ShortPulse), 1);
        assert_eq!(notifier.count(FeedbackKind::TriplePulse), 1);
        assert_eq!(notifier.count(FeedbackKind::Generic), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn color_cycling_suspends_during_alert() {
        let (session, handle, recorder) = session(MemoryStore::new());
        let script = async {
            handle.send(SessionCommand::SetGoal(1));
            handle.start();
            sleep_ms(70_000).await;
            handle.stop();
            handle.shutdown();
        };
        tokio::join!(session.run(), script);

        let seen = recorder.0.borrow();
        let alert_at = seen
            .backdrops
            .iter()
            .position(|b| *b == Backdrop::Alert(AlertStatus::Warning))
            .unwrap();
        assert!(seen.backdrops[..alert_at]
            .iter()
            .skip(1)
            .all(|b| matches!(b, Backdrop::Cycling(_))));
        assert!(seen.backdrops[alert_at..seen.backdrops.len() - 1]
            .iter()
            .all(|b| matches!(b, Backdrop::Alert(_))));
        assert_eq!(seen.backdrops.last(), Some(&Backdrop::Base("#121212".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_changes_coalesce_into_one_write() {
        let store = MemoryStore::new();
        let (session, handle, _recorder) = session(store.clone());
        let script = async {
            handle.send(SessionCommand::SetMessage("A".into()));
            sleep_ms(100).await;
            handle.send(SessionCommand::SetMessage("B".into()));
            sleep_ms(100).await;
            handle.send(SessionCommand::SetMessage("C".into()));
            assert_eq!(store.write_count(), 0);
            sleep_ms(600).await;
            assert_eq!(store.write_count(), 1);
            handle.shutdown();
        };
        tokio::join!(session.run(), script);

        let stored = PersistedSnapshot::decode(&store.contents().unwrap()).unwrap();
        assert_eq!(stored.settings.custom_message, "C");
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_written_for_untouched_session() {
        let store = MemoryStore::new();
        let (session, handle, _recorder) = session(store.clone());
        let script = async {
            handle.lap();
            handle.stop();
            sleep_ms(10_000).await;
            handle.shutdown();
        };
        tokio::join!(session.run(), script);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn long_runs_are_saved_periodically() {
        let store = MemoryStore::new();
        let (session, handle, _recorder) = session(store.clone());
        let script = async {
            handle.start();
            sleep_ms(5_050).await;
            assert_eq!(store.write_count(), 1);
            let stored = PersistedSnapshot::decode(&store.contents().unwrap()).unwrap();
            assert_eq!(stored.elapsed_ms, 5_000);
            handle.shutdown();
        };
        tokio::join!(session.run(), script);
    }

    #[tokio::test(start_paused = true)]
    async fn write_failure_is_reported_and_state_kept() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let (session, handle, recorder) = session(store.clone());
        let script = async {
            handle.start();
            sleep_ms(1_000).await;
            handle.lap();
            handle.stop();
            sleep_ms(1_000).await;
            handle.shutdown();
        };
        let (result, ()) = tokio::join!(session.run(), script);

        assert!(!recorder.0.borrow().statuses.is_empty());
        assert!(recorder.0.borrow().statuses[0].contains("quota"));
        assert_eq!(result.laps.len(), 1);
        assert_eq!(result.elapsed_ms, 1_000);
        assert!(store.contents().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_purges_store_and_zeroes() {
        let store = MemoryStore::with_contents(
            r#"{"elapsedTime": 9000, "laps": [{"id": 1, "duration": 9000, "totalTime": 9000}]}"#,
        );
        let (session, handle, recorder) = session(store.clone());
        let script = async {
            handle.start();
            sleep_ms(200).await;
            handle.reset();
            sleep_ms(10_000).await;
            handle.shutdown();
        };
        let (result, ()) = tokio::join!(session.run(), script);

        assert!(store.contents().is_none());
        assert_eq!(result.elapsed_ms, 0);
        assert!(result.laps.is_empty());
        let last = *recorder.0.borrow().frames.last().unwrap();
        assert_eq!(
            last,
            Frame {
                elapsed_ms: 0,
                running: false,
                alert: AlertStatus::None
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn restored_session_is_stopped() {
        let store = MemoryStore::with_contents(
            r##"{"elapsedTime": 12345, "thresholdMinutes": 2, "bgColor": "#0000ff",
                "laps": [{"id": 1, "duration": 12000, "totalTime": 12000}]}"##,
        );
        let (session, handle, recorder) = session(store);
        assert!(!session.engine().is_running());
        assert_eq!(session.settings().bg_color, "#0000ff");

        let script = async {
            sleep_ms(3_000).await;
            let snapshot = handle.query().await.unwrap();
            handle.shutdown();
            snapshot
        };
        let (result, snapshot) = tokio::join!(session.run(), script);

        assert_eq!(result.elapsed_ms, 12_345);
        assert_eq!(result.threshold_minutes, 2);
        assert!(matches!(
            snapshot,
            Event::StateSnapshot { elapsed_ms: 12_345, .. }
        ));
        assert_eq!(
            recorder.0.borrow().backdrops.first(),
            Some(&Backdrop::Base("#0000ff".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn corrupt_store_starts_fresh() {
        let (session, handle, _recorder) = session(MemoryStore::with_contents("{{{"));
        handle.shutdown();
        let result = session.run().await;
        assert_eq!(result, PersistedSnapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn voice_commands_respect_guards() {
        let (session, handle, recorder) = session(MemoryStore::new());
        let script = async {
            handle.send(SessionCommand::Voice("lap".into()));
            handle.send(SessionCommand::Voice("okay go".into()));
            sleep_ms(500).await;
            handle.send(SessionCommand::Voice("start".into()));
            handle.send(SessionCommand::Voice("lap".into()));
            handle.send(SessionCommand::Voice("stop".into()));
            handle.send(SessionCommand::Voice("stop".into()));
            handle.shutdown();
        };
        let (result, ()) = tokio::join!(session.run(), script);

        assert_eq!(result.laps.len(), 1);
        assert_eq!(result.elapsed_ms, 500);
        let events = recorder.0.borrow().events.len();
        assert_eq!(events, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_write_is_flushed_on_shutdown() {
        let store = MemoryStore::new();
        let (session, handle, _recorder) = session(store.clone());
        handle.send(SessionCommand::SetColor("#333333".into()));
        handle.shutdown();
        session.run().await;
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_all_handles_ends_session() {
        let (session, handle, recorder) = session(MemoryStore::new());
        handle.start();
        drop(handle);
        let result = session.run().await;
        assert_eq!(result.elapsed_ms, 0);
        let frames = recorder.frames();
        sleep_ms(5_000).await;
        assert_eq!(recorder.frames(), frames);
    }

    #[tokio::test(start_paused = true)]
    async fn background_image_is_stored_and_removable() {
        let store = MemoryStore::new();
        let (session, handle, _recorder) = session(store.clone());
        let script = async {
            handle.send(SessionCommand::SetImage(Some("data:image/png;base64,AAAA".into())));
            sleep_ms(600).await;
            let stored = PersistedSnapshot::load(&store).unwrap();
            assert_eq!(stored.settings.bg_image.as_deref(), Some("data:image/png;base64,AAAA"));

            handle.send(SessionCommand::SetImage(None));
            sleep_ms(600).await;
            handle.shutdown();
        };
        tokio::join!(session.run(), script);
        assert!(PersistedSnapshot::load(&store).unwrap().settings.bg_image.is_none());
    }
}
