//! Time sources.
//!
//! The core never reads the clock on its own. Round timing needs a
//! monotonic clock (a buzz time must not jump if NTP adjusts the wall
//! clock mid-round); session expiry needs wall time because the session
//! start is persisted across restarts. [`Clock`] hands out both.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime};

/// Source of "now".
pub trait Clock: Send + Sync + 'static {
    /// Monotonic time, for round timing and rate limiting.
    fn monotonic(&self) -> Instant;

    /// Wall-clock time, for session and lockout expiry only.
    fn wall(&self) -> SystemTime;
}

/// The real clocks.
///
/// Monotonic time comes from Tokio's clock, which is the OS monotonic
/// clock except under a paused test runtime, where it follows the
/// runtime's virtual time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn monotonic(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn wall(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one copy and hand the
/// other to the system.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<(Instant, SystemTime)>>,
}

impl ManualClock {
    /// Starts at the current real time.
    pub fn new() -> Self {
        Self::starting_at(SystemTime::now())
    }

    /// Starts at a chosen wall time.
    pub fn starting_at(wall: SystemTime) -> Self {
        Self {
            now: Arc::new(Mutex::new((Instant::now(), wall))),
        }
    }

    /// Moves both clocks forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        now.0 += by;
        now.1 += by;
    }

    /// Moves only the wall clock, as when the system time is adjusted.
    pub fn set_wall(&self, wall: SystemTime) {
        self.now.lock().unwrap_or_else(PoisonError::into_inner).1 = wall;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn monotonic(&self) -> Instant {
        self.now.lock().unwrap_or_else(PoisonError::into_inner).0
    }

    fn wall(&self) -> SystemTime {
        self.now.lock().unwrap_or_else(PoisonError::into_inner).1
    }
}
