//! Round arbitration for Quizbuzz.
//!
//! This crate decides who buzzed in first. It owns everything about a
//! round and nothing about the host:
//!
//! - [`BuzzArbiter`]: the enable → buzz → lock → reset state machine
//! - [`RoundLatch`]: the atomic claim that makes "first press wins" exact
//! - [`RateLimiter`]: drops button mashing before it reaches the latch
//! - [`sanitize`]: cleans player names before they are stored or shown
//!
//! Host-only operations take a [`HostGate`](quizbuzz_protocol::HostGate)
//! so the arbiter can refuse them without knowing how login works.
//!
//! All operations are synchronous and take `now` as a parameter. The
//! caller owns the clock.

mod arbiter;
mod config;
mod error;
mod latch;
mod rate_limit;
mod sanitize;

pub use arbiter::{BuzzArbiter, BuzzOutcome, Player};
pub use config::{
    ArbiterConfig, DEFAULT_KEY_BINDINGS, RESERVED_KEYS, RoundState, checked_key_bindings,
};
pub use error::ArbiterError;
pub use latch::RoundLatch;
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use sanitize::{NameRules, display_name, sanitize};
