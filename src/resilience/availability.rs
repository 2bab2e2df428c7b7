//! Availability tracker for the proxy server.
//!
//! # States
//! - Online: calls pass through unconditionally
//! - Error: calls pass only once the backoff window since the last failure has elapsed
//!
//! # State Transitions
//! ```text
//! Online → Error: record_failure()
//! Error  → Error: record_failure() (retry_count + 1, window grows)
//! Error  → Online: record_success()
//! ```
//!
//! # Backoff
//! `window = min(retry_count, 6)^2` seconds: 0, 1, 4, 9, 16, 25, 36, 36, ...
//! A call is attempted only when strictly more than `window` has elapsed.
//!
//! # Design Decisions
//! - No probing: the next real call after the window is the probe
//! - One mutex guards all three fields; it is never held across I/O
//! - Uses `tokio::time::Instant` so paused test clocks drive the window

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// `retry_count` beyond which the backoff window stops growing.
pub const MAX_BACKOFF_STEP: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Online,
    Error,
}

/// Point-in-time copy of the tracker fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilitySnapshot {
    pub status: Availability,
    pub retry_count: u32,
    pub last_check: Option<Instant>,
}

#[derive(Debug)]
struct TrackerState {
    status: Availability,
    last_check: Option<Instant>,
    retry_count: u32,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self {
            status: Availability::Online,
            last_check: None,
            retry_count: 0,
        }
    }
}

/// Backoff window for a given number of consecutive failures.
pub fn backoff_window(retry_count: u32) -> Duration {
    let step = u64::from(retry_count.min(MAX_BACKOFF_STEP));
    Duration::from_secs(step * step)
}

/// Fail-fast gate shared by every call issued through one client.
#[derive(Debug, Default)]
pub struct AvailabilityTracker {
    state: Mutex<TrackerState>,
}

impl AvailabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_try(&self) -> bool {
        self.should_try_at(Instant::now())
    }

    pub fn should_try_at(&self, now: Instant) -> bool {
        let state = self.lock();
        match (state.status, state.last_check) {
            (Availability::Online, _) | (Availability::Error, None) => true,
            (Availability::Error, Some(last)) => {
                now.saturating_duration_since(last) > backoff_window(state.retry_count)
            }
        }
    }

    /// Time left in the current backoff window, `None` when a call may go out.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after_at(Instant::now())
    }

    pub fn retry_after_at(&self, now: Instant) -> Option<Duration> {
        let state = self.lock();
        let last = match (state.status, state.last_check) {
            (Availability::Error, Some(last)) => last,
            _ => return None,
        };
        let elapsed = now.saturating_duration_since(last);
        let window = backoff_window(state.retry_count);
        if elapsed > window {
            None
        } else {
            Some(window - elapsed)
        }
    }

    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now());
    }

    pub fn record_failure_at(&self, now: Instant) {
        let mut state = self.lock();
        state.status = Availability::Error;
        state.retry_count = state.retry_count.saturating_add(1);
        state.last_check = Some(now);
    }

    pub fn record_success(&self) {
        let mut state = self.lock();
        state.status = Availability::Online;
        state.last_check = None;
        state.retry_count = 0;
    }

    pub fn is_failing(&self) -> bool {
        self.lock().status == Availability::Error
    }

    pub fn retry_count(&self) -> u32 {
        self.lock().retry_count
    }

    pub fn snapshot(&self) -> AvailabilitySnapshot {
        let state = self.lock();
        AvailabilitySnapshot {
            status: state.status,
            retry_count: state.retry_count,
            last_check: state.last_check,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
