//! Restartable fixed-rate tick scheduler for Quizbuzz.
//!
//! The buzzer has two periodic jobs, and both run only some of the time:
//!
//! - the round clock redraws at ~30 Hz, but only while buzzers are armed
//! - the session countdown ticks at 1 Hz, but only while the host is
//!   logged in
//!
//! A [`TickScheduler`] is one such job. It is created once and then
//! [paused](TickScheduler::pause) and [resumed](TickScheduler::resume) as
//! the state it follows comes and goes. Because there is only ever one
//! scheduler per job, re-entering a state can never start a second timer
//! alongside the first.
//!
//! # Integration
//!
//! The scheduler sits inside the controller's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(intent) = intents.recv() => { /* dispatch */ }
//!         _ = display.wait_for_tick() => { /* emit Elapsed */ }
//!         _ = session.wait_for_tick() => { /* count down */ }
//!     }
//! }
//! ```
//!
//! A paused scheduler's `wait_for_tick` never resolves, so its branch
//! simply never wins.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for one tick scheduler.
///
/// A late tick (the task was busy or the machine slept) never fires a
/// backlog: the missed periods are reported in [`TickInfo`] and the next
/// tick is one full period from when the late one fired.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Tick rate in Hz. 0 disables ticking entirely.
    pub tick_rate_hz: u32,
    /// Create the scheduler paused. The controller's schedulers start
    /// paused and are resumed when their state is entered.
    pub start_paused: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 0,
            start_paused: false,
        }
    }
}

impl TickConfig {
    /// Maximum supported tick rate. Nothing in a buzzer needs more than a
    /// display refresh.
    pub const MAX_TICK_RATE_HZ: u32 = 120;

    /// A running config for a specific rate.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// A paused config for a specific rate.
    pub fn paused(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            start_paused: true,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TickScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum; clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self
    }

    /// Duration of a single tick. `None` when ticking is disabled.
    pub fn tick_duration(&self) -> Option<Duration> {
        if self.tick_rate_hz == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64))
        }
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Information about a fired tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number over the scheduler's life
    /// (starts at 1; not reset by pause/resume).
    pub tick: u64,
    /// The fixed period.
    pub dt: Duration,
    /// `true` if this tick fired more than 10% of a period late.
    pub overrun: bool,
    /// Whole periods missed before this tick fired.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-rate tick scheduler with pause and resume.
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Option<Duration>,
    tick_count: u64,
    /// When the next tick should fire.
    next_tick: Option<Instant>,
    paused: bool,
}

impl TickScheduler {
    /// Creates a scheduler from config.
    ///
    /// A running scheduler's first tick is one period from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();
        let next_tick = tick_duration.map(|d| Instant::now() + d);

        if tick_duration.is_none() {
            debug!("tick scheduler created with ticking disabled");
        } else {
            debug!(
                rate_hz = config.tick_rate_hz,
                paused = config.start_paused,
                "tick scheduler created"
            );
        }

        Self {
            paused: config.start_paused,
            config,
            tick_duration,
            tick_count: 0,
            next_tick,
        }
    }

    /// A running scheduler for a specific rate.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits until the next tick is due.
    ///
    /// While paused, or with ticking disabled, this future never resolves.
    /// It is cancel-safe: dropping it (as `select!` does when another
    /// branch wins) loses nothing, because state only changes after the
    /// sleep completes.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let (next, tick_dur) = match (self.next_tick, self.tick_duration) {
            (Some(next), Some(dur)) if !self.paused => (next, dur),
            _ => std::future::pending().await,
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > tick_dur / 10;
        let ticks_skipped = if overrun {
            (late_by.as_nanos() / tick_dur.as_nanos()) as u64
        } else {
            0
        };

        if ticks_skipped > 0 {
            debug!(
                tick = self.tick_count,
                skipped = ticks_skipped,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick overrun; skipping ahead"
            );
        }
        self.next_tick = Some(now + tick_dur);

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: tick_dur,
            overrun,
            ticks_skipped,
        }
    }

    /// Stops ticking. `wait_for_tick` pends until [`resume`](Self::resume).
    ///
    /// Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "tick scheduler paused");
        }
    }

    /// Starts ticking again, one full period from now.
    ///
    /// Resuming a running scheduler changes nothing: its deadline is kept,
    /// so calling `resume` on every state entry can't shorten or double a
    /// period.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if let Some(dur) = self.tick_duration {
                self.next_tick = Some(Instant::now() + dur);
            }
            debug!(tick = self.tick_count, "tick scheduler resumed");
        }
    }

    /// Whether the scheduler is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether ticking is disabled (rate 0).
    pub fn is_disabled(&self) -> bool {
        self.tick_duration.is_none()
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured tick rate in Hz.
    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    /// The fixed tick duration, or `None` when disabled.
    pub fn tick_duration(&self) -> Option<Duration> {
        self.tick_duration
    }
}
