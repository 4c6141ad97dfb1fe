//! Core Quizbuzz types: identities, intents, events, and snapshots.
//!
//! Everything here is plain data. Intents flow *into* the core, events and
//! snapshots flow *out* to whatever renders the game (a terminal, a web
//! page, a test).

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AuthError, ProtocolError};

/// Number of buzzers in a game. Fixed: the game is built for three podiums.
pub const PLAYER_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identifies one of the three players (1-based, like the podium labels).
///
/// A newtype around `u8` so a player id can't be confused with an index or
/// a count. Serialized as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// All valid player ids in podium order.
    pub const ALL: [PlayerId; PLAYER_COUNT] = [PlayerId(1), PlayerId(2), PlayerId(3)];

    /// Returns the id if it names one of the three podiums.
    pub fn new(id: u8) -> Option<Self> {
        (1..=PLAYER_COUNT as u8).contains(&id).then_some(Self(id))
    }

    /// Zero-based slot index, or `None` for an out-of-range id.
    pub fn index(self) -> Option<usize> {
        Self::new(self.0).map(|id| usize::from(id.0) - 1)
    }

    /// The name shown when the player hasn't set one: `Player 2`.
    pub fn default_name(self) -> String {
        format!("Player {}", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// HostGate
// ---------------------------------------------------------------------------

/// Answers "is the host logged in right now?".
///
/// The arbiter asks this before any host-only transition. The session guard
/// implements it; tests can simply pass a `bool`.
pub trait HostGate {
    /// `true` while a host session is live.
    fn is_authenticated(&self) -> bool;
}

impl HostGate for bool {
    fn is_authenticated(&self) -> bool {
        *self
    }
}

// ---------------------------------------------------------------------------
// Intent: adapter → core
// ---------------------------------------------------------------------------

/// A discrete request from the presentation adapter.
///
/// Raw key presses and form submits are translated into intents before they
/// reach the core, so the core never sees a keyboard or a DOM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Intent {
    /// Host arms the buzzers.
    Enable,
    /// Host clears the round back to idle.
    Reset,
    /// A player pressed their buzzer.
    Buzz {
        /// Who pressed.
        player: PlayerId,
    },
    /// Host asked for the login prompt.
    RequestLogin,
    /// Host submitted a PIN.
    Login {
        /// The PIN exactly as typed.
        pin: String,
    },
    /// Host closed the login prompt without submitting.
    CancelLogin,
    /// Host ended the session.
    Logout,
    /// A player's name field changed.
    SetPlayerName {
        /// Whose name.
        player: PlayerId,
        /// Unsanitized text.
        name: String,
    },
    /// The sound toggle changed.
    SetSoundEnabled {
        /// New toggle value.
        enabled: bool,
    },
    /// Stop the controller loop.
    Shutdown,
}

impl Intent {
    /// Checks rules the type system can't express, for intents that arrived
    /// as bytes rather than from the key map.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] for a player id outside
    /// `1..=3`.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::Buzz { player } | Self::SetPlayerName { player, .. }
                if player.index().is_none() =>
            {
                Err(ProtocolError::InvalidMessage(format!(
                    "player id {} is not a podium",
                    player.0
                )))
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots: core → adapter
// ---------------------------------------------------------------------------

/// Coarse round phase, for lights and status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Buzzers disabled, waiting for the host.
    Idle,
    /// Buzzers live, clock running.
    Armed,
    /// Someone buzzed in; the clock is frozen.
    Locked,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Armed => write!(f, "Armed"),
            Self::Locked => write!(f, "Locked"),
        }
    }
}

/// What the adapter needs to draw one podium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Podium id.
    pub id: PlayerId,
    /// The key that buzzes for this player.
    pub key: char,
    /// Sanitized display name, already defaulted to `Player N` when empty.
    pub name: String,
    /// Winning time of the last round this player won, if any.
    #[serde(with = "option_duration_ms")]
    pub last_elapsed: Option<Duration>,
}

/// Read-only picture of the round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    /// Current phase.
    pub phase: RoundPhase,
    /// The winner, present exactly when `phase == Locked`.
    pub winner: Option<PlayerId>,
    /// Live elapsed time while armed, frozen time when locked, zero when idle.
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
    /// All three podiums in id order.
    pub players: Vec<PlayerView>,
}

impl RoundSnapshot {
    /// Looks up one podium.
    pub fn player(&self, id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The winning podium, if the round is locked.
    pub fn winner_view(&self) -> Option<&PlayerView> {
        self.winner.and_then(|id| self.player(id))
    }
}

/// Read-only picture of the host session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Whether host-only intents are currently allowed.
    pub authenticated: bool,
    /// Time left before the session expires (only while authenticated).
    #[serde(with = "option_duration_ms")]
    pub remaining: Option<Duration>,
    /// `true` when less than two minutes remain.
    pub warning: bool,
    /// Seconds left on an active lockout.
    pub lockout_remaining_secs: Option<u64>,
    /// Wrong PINs entered since the last success or lockout.
    pub failed_attempts: u32,
}

/// Discrete sound triggers. The adapter owns the actual tones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Buzzers just armed (rising tone).
    Enable,
    /// Someone buzzed in (descending buzz).
    Buzz,
}

// ---------------------------------------------------------------------------
// Event: core → adapter
// ---------------------------------------------------------------------------

/// Something the adapter should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The round changed phase (armed, locked, reset).
    RoundChanged(RoundSnapshot),
    /// Periodic timer refresh while armed.
    Elapsed {
        /// Time since the buzzers were armed.
        #[serde(with = "duration_ms")]
        elapsed: Duration,
    },
    /// A name was sanitized and stored.
    PlayerRenamed {
        /// Whose name changed.
        player: PlayerId,
        /// The stored display name.
        name: String,
    },
    /// Play a tone.
    Sound {
        /// Which tone.
        cue: SoundCue,
    },
    /// Show the PIN prompt (or the lockout countdown instead of it).
    LoginRequested {
        /// Present while logins are locked out.
        lockout_remaining_secs: Option<u64>,
    },
    /// Login worked; close the prompt.
    LoginSucceeded,
    /// Login refused; show the error in the prompt.
    LoginFailed {
        /// Why.
        error: AuthError,
    },
    /// The prompt was dismissed.
    LoginPromptClosed,
    /// Once-per-second session countdown.
    SessionTicked(SessionSnapshot),
    /// The session timed out; the host must log in again.
    SessionExpired,
    /// The host logged out.
    LoggedOut,
    /// The sound toggle changed.
    SoundToggled {
        /// New toggle value.
        enabled: bool,
    },
    /// A host intent was refused for a state reason.
    Rejected {
        /// Human-readable reason.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

// Durations travel as whole milliseconds, which is what a renderer wants
// for a three-decimal seconds display.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod option_duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        d: &Option<Duration>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|ms| ms.map(Duration::from_millis))
    }
}

// =========================================================================
// Tests
// =========================================================================
