//! Sliding-window rate limiting for credential changes.
//!
//! Tracks event timestamps per caller identity and rejects an event once the
//! trailing window is full. Expired timestamps are pruned on every check, so
//! the map never grows beyond one entry per caller with at most `max_events`
//! timestamps each.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Returned when a caller has exhausted its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAfter {
    /// Whole seconds until the oldest in-window event expires.
    pub secs: u64,
}

/// Per-caller sliding window of accepted events.
///
/// Invariant: for every caller, the number of recorded timestamps newer than
/// `now - window` never exceeds `max_events`.
///
/// The clock is passed in by the caller (`now`) rather than read internally,
/// so tests can drive time without sleeping.
#[derive(Debug)]
pub struct RateLimitWindow {
    max_events: usize,
    window: Duration,
    entries: HashMap<String, VecDeque<Instant>>,
}

impl RateLimitWindow {
    #[must_use]
    pub fn new(max_events: usize, window: Duration) -> Self {
        Self {
            max_events,
            window,
            entries: HashMap::new(),
        }
    }

    /// Records an event for `caller` at `now` if the window has room.
    ///
    /// # Errors
    ///
    /// Returns [`RetryAfter`] without recording when the caller already has
    /// `max_events` events inside the trailing window.
    pub fn check(&mut self, caller: &str, now: Instant) -> Result<(), RetryAfter> {
        let events = self.entries.entry(caller.to_string()).or_default();

        while let Some(front) = events.front() {
            if now.duration_since(*front) >= self.window {
                events.pop_front();
            } else {
                break;
            }
        }

        if events.len() >= self.max_events {
            // Oldest in-window event determines when a slot frees up.
            let oldest = *events.front().expect("non-empty after len check");
            let remaining = self.window.saturating_sub(now.duration_since(oldest));
            return Err(RetryAfter {
                secs: remaining.as_secs().max(1),
            });
        }

        events.push_back(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> RateLimitWindow {
        RateLimitWindow::new(5, Duration::from_secs(300))
    }

    #[test]
    fn allows_up_to_max_events() {
        let mut w = window();
        let now = Instant::now();
        for i in 0..5 {
            assert!(w.check("ui", now + Duration::from_secs(i)).is_ok());
        }
    }

    #[test]
    fn sixth_event_in_window_is_rejected() {
        let mut w = window();
        let now = Instant::now();
        for i in 0..5 {
            w.check("ui", now + Duration::from_secs(i)).unwrap();
        }
        let result = w.check("ui", now + Duration::from_secs(10));
        assert!(result.is_err(), "sixth change inside the window must fail");
        assert!(result.unwrap_err().secs > 0);
    }

    #[test]
    fn window_slides_as_old_events_expire() {
        let mut w = window();
        let now = Instant::now();
        for i in 0..5 {
            w.check("ui", now + Duration::from_secs(i)).unwrap();
        }
        // First event (t=0) has expired at t=301; exactly one slot opens.
        let later = now + Duration::from_secs(301);
        assert!(w.check("ui", later).is_ok());
        assert!(w.check("ui", later).is_err());
    }

    #[test]
    fn callers_are_tracked_independently() {
        let mut w = window();
        let now = Instant::now();
        for _ in 0..5 {
            w.check("tab-a", now).unwrap();
        }
        assert!(w.check("tab-a", now).is_err());
        assert!(w.check("tab-b", now).is_ok());
    }

    #[test]
    fn retry_after_reflects_oldest_event() {
        let mut w = RateLimitWindow::new(1, Duration::from_secs(100));
        let now = Instant::now();
        w.check("ui", now).unwrap();
        let err = w.check("ui", now + Duration::from_secs(40)).unwrap_err();
        assert_eq!(err.secs, 60);
    }
}
