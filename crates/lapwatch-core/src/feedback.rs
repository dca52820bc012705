use std::cell::RefCell;
use std::rc::Rc;

use crate::events::FeedbackKind;

/// Haptic/audio feedback hook.
///
/// The engine only decides *which* cue to give; the host decides how
/// (vibration motor, beep, terminal bell).
pub trait Notifier {
    fn notify(&mut self, kind: FeedbackKind);
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&mut self, kind: FeedbackKind) {
        (**self).notify(kind);
    }
}

/// Writes each cue to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, kind: FeedbackKind) {
        tracing::info!(?kind, pattern = ?kind.pattern_ms(), "feedback");
    }
}

/// Keeps every cue; clones share the list.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    seen: Rc<RefCell<Vec<FeedbackKind>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> Vec<FeedbackKind> {
        self.seen.borrow().clone()
    }

    pub fn count(&self, kind: FeedbackKind) -> usize {
        self.seen.borrow().iter().filter(|k| **k == kind).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, kind: FeedbackKind) {
        self.seen.borrow_mut().push(kind);
    }
}
