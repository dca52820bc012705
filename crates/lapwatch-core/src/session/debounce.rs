//! Trailing debounce with a maximum wait.
//!
//! ```text
//!  schedule()   schedule()        quiet for `delay`
//!  ──┬────────────┬──────────────────────────────► due
//!    └ first ─────┴── deadline keeps moving, capped at first + max_wait
//! ```
//!
//! The primitive holds no timer of its own; the owner asks for the
//! [`deadline`](Debounce::deadline) and sleeps until it.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    max_wait: Option<Duration>,
    first_pending: Option<Instant>,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            max_wait: None,
            first_pending: None,
            deadline: None,
        }
    }

    /// Bound how long continuous activity can postpone the flush.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Note a change at `now`. Coalesces with any pending change.
    pub fn schedule(&mut self, now: Instant) {
        let first = *self.first_pending.get_or_insert(now);
        let mut deadline = now + self.delay;
        if let Some(max_wait) = self.max_wait {
            deadline = deadline.min(first + max_wait);
        }
        self.deadline = Some(deadline);
    }

    /// Drop the pending change, if any.
    pub fn cancel(&mut self) {
        self.first_pending = None;
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Returns `true` and clears the pending change if it is due.
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.cancel();
            true
        } else {
            false
        }
    }

    /// Clears the pending change and reports whether there was one.
    pub fn take_pending(&mut self) -> bool {
        let pending = self.is_pending();
        self.cancel();
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_after_quiet_period() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(500));
        debounce.schedule(t0);
        assert!(!debounce.is_due(t0 + ms(499)));
        assert!(debounce.take_if_due(t0 + ms(500)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn reschedule_moves_deadline() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(500));
        debounce.schedule(t0);
        debounce.schedule(t0 + ms(300));
        assert!(!debounce.is_due(t0 + ms(500)));
        assert_eq!(debounce.deadline(), Some(t0 + ms(800)));
    }

    #[test]
    fn max_wait_caps_postponement() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(500)).with_max_wait(ms(1_000));
        for step in 0..10 {
            debounce.schedule(t0 + ms(step * 200));
        }
        assert_eq!(debounce.deadline(), Some(t0 + ms(1_000)));
        assert!(debounce.take_if_due(t0 + ms(1_000)));

        // The next burst starts a fresh window.
        debounce.schedule(t0 + ms(1_900));
        assert_eq!(debounce.deadline(), Some(t0 + ms(2_400)));
    }

    #[test]
    fn cancel_drops_pending_change() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(10));
        debounce.schedule(t0);
        debounce.cancel();
        assert!(!debounce.take_if_due(t0 + ms(100)));
        assert!(!debounce.take_pending());
    }

    #[test]
    fn take_pending_reports_and_clears() {
        let mut debounce = Debounce::new(ms(10));
        debounce.schedule(Instant::now());
        assert!(debounce.take_pending());
        assert!(!debounce.is_pending());
    }
}
