//! Error types shared across the Quizbuzz crates.
//!
//! The buzzer has a small, closed set of failure conditions. Each one is a
//! named variant the presentation adapter can render (a message, a
//! countdown, or nothing at all). None of them is fatal.
//!
//! The errors derive `Serialize` so they can travel inside an
//! [`Event`](crate::Event) to an out-of-process renderer.

use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// Why a host login or a host-only action was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum AuthError {
    /// A host-only intent (enable, reset) arrived without a live session.
    /// Adapters re-open the login prompt instead of showing this text.
    #[error("host is not authenticated")]
    NotAuthenticated,

    /// The PIN is not 4 to 6 ASCII digits. No attempt is consumed.
    #[error("PIN must be 4-6 digits")]
    InvalidFormat,

    /// The PIN was well-formed but wrong.
    #[error("incorrect PIN, {attempts_remaining} attempts remaining")]
    WrongPin {
        /// How many more wrong attempts trigger a lockout.
        attempts_remaining: u32,
    },

    /// Too many wrong attempts; logins are refused until the lockout ends.
    #[error("too many failed attempts, locked out for {remaining_secs}s")]
    Lockout {
        /// Seconds until the lockout ends, rounded up.
        remaining_secs: u64,
    },
}

/// Why a buzz press did not win the round.
///
/// All of them are silent from the players' point of view: the adapter
/// shows no change. They exist for logging and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum BuzzError {
    /// Buzzers are not enabled.
    #[error("buzzers are not armed")]
    NotArmed,

    /// Someone else already won this round.
    #[error("round already locked")]
    AlreadyLocked,

    /// The player exceeded the per-window press limit.
    #[error("buzz rate limit exceeded")]
    RateLimited,

    /// The id does not name one of the three podiums.
    #[error("no such player: {0}")]
    UnknownPlayer(PlayerId),
}

/// A round transition that is not legal from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum StateError {
    /// `enable` was requested while a round is already armed or locked.
    #[error("buzzers are already armed or locked; reset first")]
    AlreadyArmedOrLocked,
}

/// Errors produced while encoding or decoding protocol values.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, wrong types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The value decoded but violates a protocol rule, e.g. a player id
    /// outside `1..=3`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
