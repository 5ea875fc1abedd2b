#![forbid(unsafe_code)]

//! One-shot deadline timers.
//!
//! A [`Timer`] holds at most one pending deadline. Arming an armed timer
//! replaces the deadline, so callers never accumulate overlapping timeouts.
//! [`Timer::fire`] returns `true` exactly once per arming.

use web_time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    /// A disarmed timer.
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Schedule the timer `delay` after `now`, replacing any pending deadline.
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Drop the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline (zero when overdue).
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Fire if due: returns `true` once and disarms.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fires_once_at_deadline() {
        let start = Instant::now();
        let mut timer = Timer::new();
        timer.arm(start, Duration::from_millis(100));

        assert!(!timer.fire(start + Duration::from_millis(99)));
        assert!(timer.fire(start + Duration::from_millis(100)));
        assert!(!timer.fire(start + Duration::from_millis(500)));
        assert!(!timer.is_armed());
    }

    #[test]
    fn rearm_replaces_deadline() {
        let start = Instant::now();
        let mut timer = Timer::new();
        timer.arm(start, Duration::from_millis(100));
        timer.arm(start + Duration::from_millis(50), Duration::from_millis(100));

        assert!(!timer.fire(start + Duration::from_millis(120)));
        assert!(timer.fire(start + Duration::from_millis(150)));
    }

    #[test]
    fn cancel_reports_pending() {
        let mut timer = Timer::new();
        assert!(!timer.cancel());
        timer.arm(Instant::now(), Duration::ZERO);
        assert!(timer.cancel());
        assert!(!timer.fire(Instant::now()));
    }

    #[test]
    fn remaining_saturates() {
        let start = Instant::now();
        let mut timer = Timer::new();
        assert_eq!(timer.remaining(start), None);
        timer.arm(start, Duration::from_millis(10));
        assert_eq!(
            timer.remaining(start + Duration::from_millis(30)),
            Some(Duration::ZERO)
        );
    }

    proptest! {
        #[test]
        fn fires_exactly_once_for_any_poll_sequence(
            delay in 0u64..1_000,
            polls in proptest::collection::vec(0u64..2_000, 1..20),
        ) {
            let start = Instant::now();
            let mut timer = Timer::new();
            timer.arm(start, Duration::from_millis(delay));
            let mut sorted = polls.clone();
            sorted.sort_unstable();
            let fired = sorted
                .iter()
                .filter(|&&t| timer.fire(start + Duration::from_millis(t)))
                .count();
            let due = sorted.iter().any(|&t| t >= delay);
            prop_assert_eq!(fired, usize::from(due));
        }
    }
}
