//! Clock-driven debouncing.
//!
//! The debouncer never reads the clock or spawns timers itself: callers pass
//! `now` in and ask for the next deadline. That keeps every detector timer
//! owned by the detector instance and makes timing deterministic under test.

use std::time::Duration;
use tokio::time::Instant;

/// Which edge of a burst produces the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Fire once, immediately, at the start of a burst; swallow the rest.
    Leading,
    /// Fire with the latest value once the burst goes quiet.
    Trailing,
}

/// Last-write-wins debouncer holding at most one pending value.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    wait: Duration,
    max_wait: Option<Duration>,
    edge: Edge,
    pending: Option<T>,
    last_call: Option<Instant>,
    /// First call of the current burst; `max_wait` is measured from here.
    burst_start: Option<Instant>,
}

impl<T> Debouncer<T> {
    /// Trailing debouncer: fires `wait` after the last push.
    pub fn trailing(wait: Duration) -> Self {
        Self {
            wait,
            max_wait: None,
            edge: Edge::Trailing,
            pending: None,
            last_call: None,
            burst_start: None,
        }
    }

    /// Leading debouncer: a push fires only after `wait` of quiet.
    pub fn leading(wait: Duration) -> Self {
        Self {
            edge: Edge::Leading,
            ..Self::trailing(wait)
        }
    }

    /// Force a trailing fire at least every `max_wait` of continuous pushes.
    /// Never shorter than `wait`.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait.max(self.wait));
        self
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Record a value. Leading debouncers return it when it fires right away;
    /// trailing debouncers always return `None` and replace any pending value.
    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        match self.edge {
            Edge::Leading => {
                let quiet = self
                    .last_call
                    .map_or(true, |last| now.saturating_duration_since(last) >= self.wait);
                self.last_call = Some(now);
                quiet.then_some(value)
            }
            Edge::Trailing => {
                if self.pending.is_none() {
                    self.burst_start = Some(now);
                }
                self.pending = Some(value);
                self.last_call = Some(now);
                None
            }
        }
    }

    /// When the pending value is due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        let quiet_at = self.last_call? + self.wait;
        match (self.max_wait, self.burst_start) {
            (Some(max_wait), Some(start)) => Some(quiet_at.min(start + max_wait)),
            _ => Some(quiet_at),
        }
    }

    /// Take the pending value if its deadline has passed, together with the
    /// instant it was scheduled to fire at.
    pub fn poll(&mut self, now: Instant) -> Option<(Instant, T)> {
        let due = self.deadline()?;
        if now < due {
            return None;
        }
        self.burst_start = None;
        self.pending.take().map(|value| (due, value))
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending value and forget the current burst.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.burst_start = None;
        self.last_call = None;
    }
}
