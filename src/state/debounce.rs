//! Cancellable delayed commit.
//!
//! Every [`Debouncer::schedule`] replaces whatever was pending and restarts the
//! quiet period, so only the most recently scheduled value can ever fire. Time is
//! passed in by the caller; the event loop polls on its timer tick.

use std::time::{Duration, Instant};

/// Quiet period for search input.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    due: Instant,
}

/// Holds at most one pending value until its quiet period elapses.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    /// Debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the quiet period from `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            due: now + self.delay,
        });
    }

    /// Drop the pending value, returning it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Pending value, if any.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    /// True while a value waits.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left until the pending value fires. Zero when overdue.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.due.saturating_duration_since(now))
    }

    /// Take the pending value if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.due);
        if due {
            self.cancel()
        } else {
            None
        }
    }

    /// Take the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.cancel()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn does_not_fire_before_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.schedule("a", start);

        assert_eq!(debouncer.poll(start + ms(299)), None);
        assert!(debouncer.is_pending());
    }

    #[test]
    fn fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.schedule("a", start);

        assert_eq!(debouncer.poll(start + ms(300)), Some("a"));
        assert_eq!(debouncer.poll(start + ms(900)), None);
    }

    #[test]
    fn rescheduling_restarts_the_timer_and_replaces_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.schedule("a", start);
        debouncer.schedule("ab", start + ms(200));

        assert_eq!(debouncer.poll(start + ms(350)), None, "timer restarted");
        assert_eq!(debouncer.poll(start + ms(500)), Some("ab"));
    }

    #[test]
    fn cancel_prevents_firing() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.schedule("a", start);

        assert_eq!(debouncer.cancel(), Some("a"));
        assert_eq!(debouncer.poll(start + ms(1000)), None);
    }

    #[test]
    fn flush_fires_immediately() {
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.schedule(7, Instant::now());
        assert_eq!(debouncer.flush(), Some(7));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn remaining_counts_down_and_saturates() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(300));
        assert_eq!(debouncer.remaining(start), None);

        debouncer.schedule((), start);
        assert_eq!(debouncer.remaining(start + ms(100)), Some(ms(200)));
        assert_eq!(debouncer.remaining(start + ms(400)), Some(Duration::ZERO));
    }

    #[test]
    fn default_uses_search_delay() {
        let debouncer: Debouncer<String> = Debouncer::default();
        assert_eq!(debouncer.delay(), DEFAULT_SEARCH_DEBOUNCE);
    }
}
