//! The buzz arbiter: one round, three podiums, one winner.

use std::time::{Duration, Instant};

use quizbuzz_protocol::{
    AuthError, BuzzError, HostGate, PLAYER_COUNT, PlayerId, PlayerView, RoundPhase,
    RoundSnapshot, StateError,
};
use tracing::{debug, info};

use crate::{
    ArbiterConfig, ArbiterError, NameRules, RateLimiter, RoundLatch, RoundState,
    display_name,
};

/// One podium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Podium id, 1 to 3.
    pub id: PlayerId,
    /// Buzz key, lowercase.
    pub key: char,
    /// Sanitized display name, never empty.
    pub name: String,
    /// Winning time of the last round this player won.
    pub last_elapsed: Option<Duration>,
}

impl Player {
    fn new(id: PlayerId, key: char) -> Self {
        Self {
            id,
            key,
            name: id.default_name(),
            last_elapsed: None,
        }
    }

    /// Rendering view of this podium.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            key: self.key,
            name: self.name.clone(),
            last_elapsed: self.last_elapsed,
        }
    }
}

/// A winning press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuzzOutcome {
    /// Who won.
    pub player: PlayerId,
    /// Time from enable to the winning press.
    pub elapsed: Duration,
}

/// Owns the round and decides who buzzed first.
///
/// ## Usage
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use quizbuzz_arbiter::{ArbiterConfig, BuzzArbiter};
/// use quizbuzz_protocol::{BuzzError, PlayerId};
///
/// let mut arbiter = BuzzArbiter::new(ArbiterConfig::default());
/// let t0 = Instant::now();
///
/// arbiter.enable(&true, t0).unwrap();
/// let won = arbiter.buzz(PlayerId(2), t0 + Duration::from_millis(750)).unwrap();
/// assert_eq!(won.elapsed, Duration::from_millis(750));
///
/// let late = arbiter.buzz(PlayerId(1), t0 + Duration::from_millis(751));
/// assert_eq!(late, Err(BuzzError::AlreadyLocked));
/// ```
#[derive(Debug)]
pub struct BuzzArbiter {
    state: RoundState,
    latch: RoundLatch,
    players: [Player; PLAYER_COUNT],
    limiter: RateLimiter,
    name_rules: NameRules,
}

impl BuzzArbiter {
    /// Creates an idle arbiter with default names.
    pub fn new(config: ArbiterConfig) -> Self {
        let config = config.validated();
        let [k1, k2, k3] = config.key_bindings;
        let [p1, p2, p3] = PlayerId::ALL;
        Self {
            state: RoundState::Idle,
            latch: RoundLatch::new(),
            players: [Player::new(p1, k1), Player::new(p2, k2), Player::new(p3, k3)],
            limiter: RateLimiter::new(config.rate_limit),
            name_rules: config.name_rules,
        }
    }

    // -- Host operations --------------------------------------------------

    /// Arms the buzzers and starts the clock at `now`.
    ///
    /// Clears the press ledger and every podium's last time, so a new
    /// round starts from a clean slate.
    ///
    /// # Errors
    /// - [`AuthError::NotAuthenticated`] if `gate` says no
    /// - [`StateError::AlreadyArmedOrLocked`] unless the round is idle
    pub fn enable(&mut self, gate: &impl HostGate, now: Instant) -> Result<(), ArbiterError> {
        if !gate.is_authenticated() {
            return Err(AuthError::NotAuthenticated.into());
        }
        if !self.latch.arm() {
            debug!(state = %self.state, "enable ignored; round not idle");
            return Err(StateError::AlreadyArmedOrLocked.into());
        }

        self.limiter.clear();
        for player in &mut self.players {
            player.last_elapsed = None;
        }
        self.state = RoundState::Armed { started_at: now };
        info!("buzzers armed");
        Ok(())
    }

    /// Returns the round to idle from any state. Idempotent.
    ///
    /// # Errors
    /// [`AuthError::NotAuthenticated`] if `gate` says no.
    pub fn reset(&mut self, gate: &impl HostGate) -> Result<(), AuthError> {
        if !gate.is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }
        self.latch.reset();
        self.limiter.clear();
        for player in &mut self.players {
            player.last_elapsed = None;
        }
        if self.state != RoundState::Idle {
            info!(from = %self.state, "round reset");
        }
        self.state = RoundState::Idle;
        Ok(())
    }

    // -- Player operations ------------------------------------------------

    /// Handles a press from `player` at `now`.
    ///
    /// Checks, in order: the id is a podium, the round is armed, the
    /// player has press budget left, and finally the latch. Only the press
    /// that claims the latch computes a time.
    ///
    /// # Errors
    /// - [`BuzzError::UnknownPlayer`] for an id outside 1..=3
    /// - [`BuzzError::NotArmed`] while idle
    /// - [`BuzzError::AlreadyLocked`] once someone has won
    /// - [`BuzzError::RateLimited`] when the player is mashing
    pub fn buzz(&mut self, player: PlayerId, now: Instant) -> Result<BuzzOutcome, BuzzError> {
        let Some(index) = player.index() else {
            return Err(BuzzError::UnknownPlayer(player));
        };

        let started_at = match self.state {
            RoundState::Idle => return Err(BuzzError::NotArmed),
            RoundState::Locked { .. } => return Err(BuzzError::AlreadyLocked),
            RoundState::Armed { started_at } => started_at,
        };

        if !self.limiter.check_and_record(player, now) {
            return Err(BuzzError::RateLimited);
        }

        if !self.latch.try_lock() {
            return Err(BuzzError::AlreadyLocked);
        }

        let elapsed = now.saturating_duration_since(started_at);
        self.players[index].last_elapsed = Some(elapsed);
        self.state = RoundState::Locked {
            winner: player,
            elapsed,
        };
        info!(
            player_id = %player,
            elapsed_ms = elapsed.as_millis() as u64,
            "buzzed in"
        );
        Ok(BuzzOutcome { player, elapsed })
    }

    /// Sanitizes and stores a display name.
    ///
    /// Returns the stored name (defaulted to `Player N` if nothing
    /// survived sanitizing), or `None` for an unknown id.
    pub fn rename(&mut self, player: PlayerId, raw: &str) -> Option<&str> {
        let index = player.index()?;
        let name = display_name(raw, player, &self.name_rules);
        let slot = &mut self.players[index];
        if slot.name != name {
            debug!(player_id = %player, name = %name, "player renamed");
            slot.name = name;
        }
        Some(slot.name.as_str())
    }

    // -- Queries ----------------------------------------------------------

    /// Time on the round clock: live while armed, frozen once locked,
    /// zero while idle.
    pub fn current_elapsed(&self, now: Instant) -> Duration {
        match self.state {
            RoundState::Idle => Duration::ZERO,
            RoundState::Armed { started_at } => now.saturating_duration_since(started_at),
            RoundState::Locked { elapsed, .. } => elapsed,
        }
    }

    /// Which podium `key` buzzes for, ignoring case.
    pub fn player_for_key(&self, key: char) -> Option<PlayerId> {
        let key = key.to_ascii_lowercase();
        self.players.iter().find(|p| p.key == key).map(|p| p.id)
    }

    /// Current round state.
    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Current phase.
    pub fn phase(&self) -> RoundPhase {
        self.state.phase()
    }

    /// One podium, or `None` for an unknown id.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index()?)
    }

    /// All podiums in id order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Rendering view of the round.
    pub fn snapshot(&self, now: Instant) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.phase(),
            winner: self.state.winner(),
            elapsed: self.current_elapsed(now),
            players: self.players.iter().map(Player::view).collect(),
        }
    }
}

impl Default for BuzzArbiter {
    fn default() -> Self {
        Self::new(ArbiterConfig::default())
    }
}

// =========================================================================
// Tests
// =========================================================================
