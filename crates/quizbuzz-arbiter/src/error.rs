//! Error types for the arbiter layer.

use quizbuzz_protocol::{AuthError, StateError};

/// Why [`BuzzArbiter::enable`](crate::BuzzArbiter::enable) refused.
///
/// Enabling can fail two ways: the caller isn't the host, or the round
/// isn't idle. Buzz failures use [`BuzzError`](quizbuzz_protocol::BuzzError)
/// directly since they never involve the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArbiterError {
    /// The host gate said no.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The round is not in a state that allows this.
    #[error(transparent)]
    State(#[from] StateError),
}
