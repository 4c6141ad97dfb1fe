//! Arbiter configuration and the round state machine.

use std::time::{Duration, Instant};

use quizbuzz_protocol::{PLAYER_COUNT, PlayerId, RoundPhase};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{NameRules, RateLimitConfig};

/// Buzz keys for podiums 1, 2 and 3: left hand, right hand, thumb.
pub const DEFAULT_KEY_BINDINGS: [char; PLAYER_COUNT] = ['q', 'p', 'm'];

/// Keys the host controls own: space arms, escape resets.
pub const RESERVED_KEYS: [char; 2] = [' ', '\u{1b}'];

/// Lowercases a set of buzz keys, or returns `None` if some podium could
/// never buzz with them: a key is reserved, blank or a control character,
/// or two podiums share a key.
pub fn checked_key_bindings(keys: [char; PLAYER_COUNT]) -> Option<[char; PLAYER_COUNT]> {
    let keys = keys.map(|k| k.to_ascii_lowercase());
    let usable = keys
        .iter()
        .all(|k| !k.is_whitespace() && !k.is_control() && !RESERVED_KEYS.contains(k));
    let [a, b, c] = keys;
    (usable && a != b && b != c && a != c).then_some(keys)
}

// ---------------------------------------------------------------------------
// ArbiterConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`BuzzArbiter`](crate::BuzzArbiter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbiterConfig {
    /// One key per podium, in podium order. Matched case-insensitively.
    pub key_bindings: [char; PLAYER_COUNT],

    /// Anti-mashing limits.
    pub rate_limit: RateLimitConfig,

    /// What a player name may contain.
    pub name_rules: NameRules,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            key_bindings: DEFAULT_KEY_BINDINGS,
            rate_limit: RateLimitConfig::default(),
            name_rules: NameRules::default(),
        }
    }
}

impl ArbiterConfig {
    /// Fixes any out-of-range values so the config is safe to use.
    ///
    /// Key bindings are lowercased. If any podium could never buzz (see
    /// [`checked_key_bindings`]) the whole set falls back to
    /// [`DEFAULT_KEY_BINDINGS`].
    pub fn validated(mut self) -> Self {
        match checked_key_bindings(self.key_bindings) {
            Some(keys) => self.key_bindings = keys,
            None => {
                warn!(
                    keys = ?self.key_bindings,
                    "buzz keys must be distinct and not space or escape; using defaults"
                );
                self.key_bindings = DEFAULT_KEY_BINDINGS;
            }
        }
        self.rate_limit = self.rate_limit.validated();
        self.name_rules = self.name_rules.validated();
        self
    }
}

// ---------------------------------------------------------------------------
// RoundState
// ---------------------------------------------------------------------------

/// The state of the current round.
///
/// ```text
///            enable()           first buzz()
///   Idle ──────────────→ Armed ──────────────→ Locked
///    ↑                     │                     │
///    └────── reset() ──────┴────── reset() ──────┘
/// ```
///
/// - **Idle**: buzzers off. Only the host can move the round forward.
/// - **Armed**: buzzers live. The clock runs from `started_at`.
/// - **Locked**: one player won. Their time is frozen in `elapsed` and
///   every later press is ignored until the host resets.
///
/// `winner` only exists in `Locked`, so a winner without a lock (or a lock
/// without a winner) can't be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Idle,
    Armed {
        /// When the host enabled the buzzers (monotonic).
        started_at: Instant,
    },
    Locked {
        winner: PlayerId,
        /// `press time - started_at`, computed once when the lock is taken.
        elapsed: Duration,
    },
}

impl RoundState {
    /// The coarse phase, for snapshots and logs.
    pub fn phase(&self) -> RoundPhase {
        match self {
            Self::Idle => RoundPhase::Idle,
            Self::Armed { .. } => RoundPhase::Armed,
            Self::Locked { .. } => RoundPhase::Locked,
        }
    }

    /// Returns `true` while presses can still win.
    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed { .. })
    }

    /// The winning player, present only when locked.
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            Self::Locked { winner, .. } => Some(*winner),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked { winner, .. } => write!(f, "Locked({winner})"),
            other => write!(f, "{}", other.phase()),
        }
    }
}
