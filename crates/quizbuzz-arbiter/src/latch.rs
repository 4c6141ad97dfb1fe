//! The round latch: a three-state atomic that decides the winner.
//!
//! Inside one process the controller already serializes presses, so the
//! latch never actually races there. It exists so that "exactly one
//! winner per armed round" holds no matter how presses arrive: several
//! threads calling [`RoundLatch::try_lock`] at once still produce exactly
//! one `true`.

use std::sync::atomic::{AtomicU8, Ordering};

use quizbuzz_protocol::RoundPhase;

const IDLE: u8 = 0;
const ARMED: u8 = 1;
const LOCKED: u8 = 2;

/// Shared-claim latch for one round.
///
/// ```text
/// IDLE ──arm()──→ ARMED ──try_lock()──→ LOCKED
///   ↑                                      │
///   └────────────── reset() ───────────────┘
/// ```
///
/// Every transition except `reset` is a compare-and-swap, so a transition
/// from the wrong state is a no-op that reports `false`.
#[derive(Debug, Default)]
pub struct RoundLatch {
    state: AtomicU8,
}

impl RoundLatch {
    /// A latch in the idle state.
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
        }
    }

    /// `IDLE → ARMED`. Returns `false` if the latch wasn't idle.
    pub fn arm(&self) -> bool {
        self.transition(IDLE, ARMED)
    }

    /// `ARMED → LOCKED`. Exactly one caller per armed period gets `true`.
    pub fn try_lock(&self) -> bool {
        self.transition(ARMED, LOCKED)
    }

    /// Back to `IDLE` from anywhere.
    pub fn reset(&self) {
        self.state.store(IDLE, Ordering::Release);
    }

    /// Current phase.
    pub fn phase(&self) -> RoundPhase {
        match self.state.load(Ordering::Acquire) {
            ARMED => RoundPhase::Armed,
            LOCKED => RoundPhase::Locked,
            _ => RoundPhase::Idle,
        }
    }

    fn transition(&self, from: u8, to: u8) -> bool {
        self.state
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
