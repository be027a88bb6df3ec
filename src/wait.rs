//! Readiness polling
//!
//! Waits poll a predicate with a doubling interval and give up at a timeout,
//! instead of sleeping a fixed duration and hoping the page caught up.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Bounded back-off for polling a readiness predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitPolicy {
    /// First poll interval in milliseconds
    pub poll_ms: u64,
    /// Upper bound for the doubled interval
    pub max_poll_ms: u64,
    /// Give up after this many milliseconds
    pub timeout_ms: u64,
}

impl WaitPolicy {
    pub const fn new(poll_ms: u64, max_poll_ms: u64, timeout_ms: u64) -> Self {
        Self {
            poll_ms,
            max_poll_ms,
            timeout_ms,
        }
    }

    /// Check the predicate once and never sleep.
    pub const fn immediate() -> Self {
        Self::new(0, 0, 0)
    }

    /// Poll `ready` until it returns true or the timeout passes.
    ///
    /// Returns whether the predicate was satisfied.
    pub fn until<F>(&self, mut ready: F) -> bool
    where
        F: FnMut() -> bool,
    {
        // None: the timeout is too large to represent, poll without a deadline
        let deadline = Instant::now().checked_add(Duration::from_millis(self.timeout_ms));
        let mut interval = self.poll_ms.max(1);

        loop {
            if ready() {
                return true;
            }

            let mut sleep = Duration::from_millis(interval);
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                sleep = sleep.min(deadline - now);
            }

            std::thread::sleep(sleep);
            interval = interval.saturating_mul(2).min(self.max_poll_ms.max(interval));
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::new(100, 1000, 5000)
    }
}

/// Fixed pause, used between click retries.
pub fn pause(ms: u64) {
    if ms > 0 {
        std::thread::sleep(Duration::from_millis(ms));
    }
}
