//! The session guard: PIN login, attempt counting, lockout, and expiry.
//!
//! The guard is the single owner of the host's [`SessionState`]. The
//! application asks it two questions (`is_authenticated`, `snapshot`) and
//! feeds it three kinds of input (`attempt_login`, `tick`, `logout`).
//!
//! # Time
//!
//! Every operation takes `now` as a wall-clock `SystemTime` instead of
//! reading the clock itself. The caller decides what "now" is, so tests
//! can jump ahead five minutes without sleeping. A clock that steps
//! backwards is treated as "no time has passed", never as negative time.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use quizbuzz_protocol::{AuthError, HostGate, SessionSnapshot};
use tracing::{debug, info, warn};

use crate::store::{AUTH_KEY, SESSION_START_KEY};
use crate::{SessionConfig, SessionState, SessionStore, SessionTick, is_valid_pin_format};

/// Owns the host login lifecycle.
///
/// ## Lifecycle
///
/// ```text
/// attempt_login() ──ok──→ [LoggedIn] ──tick() past timeout──→ [LoggedOut]
///        │                    │
///        │                    └──logout()──→ [LoggedOut]
///        │
///        └──wrong × max──→ [LockedOut] ──until passes──→ [LoggedOut]
/// ```
pub struct SessionGuard {
    config: SessionConfig,
    state: SessionState,
    /// Wrong PINs since the last success or lockout.
    /// Always `< config.max_login_attempts`.
    failed_attempts: u32,
    store: Box<dyn SessionStore>,
}

impl SessionGuard {
    /// Creates a logged-out guard. Nothing is read from `store`.
    pub fn new(config: SessionConfig, store: impl SessionStore + 'static) -> Self {
        let config = config.validated();
        if config.host_pin.is_default() {
            warn!("host PIN is still the default; change it before game night");
        }
        Self {
            config,
            state: SessionState::LoggedOut,
            failed_attempts: 0,
            store: Box::new(store),
        }
    }

    /// Creates a guard and resumes a stored session if one is still live.
    ///
    /// A stored session older than the timeout is deleted. Missing,
    /// partial, or unparsable entries simply mean "logged out".
    pub fn restore(
        config: SessionConfig,
        store: impl SessionStore + 'static,
        now: SystemTime,
    ) -> Self {
        let mut guard = Self::new(config, store);

        let Some(since) = guard.stored_session_start() else {
            return guard;
        };

        if elapsed_since(since, now) < guard.config.session_timeout {
            guard.state = SessionState::LoggedIn { since };
            info!(
                remaining_secs = guard.remaining(now).map_or(0, |d| d.as_secs()),
                "resumed stored host session"
            );
        } else {
            debug!("stored host session has expired; discarding");
            guard.clear_store();
        }
        guard
    }

    // -- Login ------------------------------------------------------------

    /// Checks a PIN and logs the host in if it matches.
    ///
    /// Evaluation order:
    /// 1. An active lockout refuses the attempt outright, without counting it.
    /// 2. A malformed PIN is refused without counting it.
    /// 3. A matching PIN starts a session and clears the counter.
    /// 4. A wrong PIN is counted; hitting the limit starts a lockout.
    ///
    /// Returns the session start on success.
    ///
    /// # Errors
    /// - [`AuthError::Lockout`]: inside a lockout, or this attempt caused one
    /// - [`AuthError::InvalidFormat`]: not 4–6 digits
    /// - [`AuthError::WrongPin`]: well-formed but wrong
    pub fn attempt_login(
        &mut self,
        pin: &str,
        now: SystemTime,
    ) -> Result<SystemTime, AuthError> {
        if let Some(remaining_secs) = self.lockout_remaining(now) {
            debug!(remaining_secs, "login refused during lockout");
            return Err(AuthError::Lockout { remaining_secs });
        }
        if let SessionState::LockedOut { .. } = self.state {
            info!("lockout elapsed; logins open again");
            self.state = SessionState::LoggedOut;
        }

        if !is_valid_pin_format(pin) {
            return Err(AuthError::InvalidFormat);
        }

        if self.config.host_pin.matches(pin) {
            self.failed_attempts = 0;
            self.state = SessionState::LoggedIn { since: now };
            self.persist(now);
            info!("host logged in");
            return Ok(now);
        }

        self.failed_attempts += 1;
        if self.failed_attempts >= self.config.max_login_attempts {
            let until = now + self.config.lockout_time;
            self.failed_attempts = 0;
            if matches!(self.state, SessionState::LoggedIn { .. }) {
                self.clear_store();
            }
            self.state = SessionState::LockedOut { until };
            warn!(
                lockout_secs = self.config.lockout_time.as_secs(),
                "too many wrong PINs; host login locked out"
            );
            return Err(AuthError::Lockout {
                remaining_secs: ceil_secs(self.config.lockout_time),
            });
        }

        let attempts_remaining = self.config.max_login_attempts - self.failed_attempts;
        info!(attempts_remaining, "wrong host PIN");
        Err(AuthError::WrongPin { attempts_remaining })
    }

    /// Ends the session. Safe to call when already logged out.
    ///
    /// A pending lockout is left in place: logging out can't be used to
    /// dodge it.
    pub fn logout(&mut self) {
        if let SessionState::LoggedIn { .. } = self.state {
            self.state = SessionState::LoggedOut;
            info!("host logged out");
        }
        self.clear_store();
    }

    // -- Expiry -----------------------------------------------------------

    /// Advances the session countdown. Call at ~1 Hz while logged in.
    ///
    /// When the timeout has passed the guard logs the host out and returns
    /// [`SessionTick::Expired`].
    pub fn tick(&mut self, now: SystemTime) -> SessionTick {
        let Some(remaining) = self.remaining(now) else {
            return SessionTick::Inactive;
        };

        if remaining.is_zero() {
            self.state = SessionState::LoggedOut;
            self.clear_store();
            info!("host session expired");
            return SessionTick::Expired;
        }

        tracing::trace!(remaining_secs = remaining.as_secs(), "session tick");
        SessionTick::Active {
            remaining,
            warning: remaining < self.config.warning_threshold,
        }
    }

    // -- Queries ----------------------------------------------------------

    /// `true` while host controls are allowed.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn { .. })
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Wrong PINs counted toward the next lockout.
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// The active configuration (after validation).
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Time left in the session, `None` when not logged in.
    /// Saturates at zero; it is up to [`tick`](Self::tick) to expire.
    pub fn remaining(&self, now: SystemTime) -> Option<Duration> {
        match self.state {
            SessionState::LoggedIn { since } => Some(
                self.config
                    .session_timeout
                    .saturating_sub(elapsed_since(since, now)),
            ),
            _ => None,
        }
    }

    /// Whole seconds (rounded up) left on an active lockout.
    pub fn lockout_remaining(&self, now: SystemTime) -> Option<u64> {
        match self.state {
            SessionState::LockedOut { until } => until
                .duration_since(now)
                .ok()
                .filter(|left| !left.is_zero())
                .map(ceil_secs),
            _ => None,
        }
    }

    /// Rendering view of the session.
    pub fn snapshot(&self, now: SystemTime) -> SessionSnapshot {
        let remaining = self.remaining(now);
        SessionSnapshot {
            authenticated: self.is_authenticated(),
            remaining,
            warning: remaining.is_some_and(|r| r < self.config.warning_threshold),
            lockout_remaining_secs: self.lockout_remaining(now),
            failed_attempts: self.failed_attempts,
        }
    }

    // -- Storage ----------------------------------------------------------

    fn stored_session_start(&self) -> Option<SystemTime> {
        if self.store.get(AUTH_KEY).as_deref() != Some("true") {
            return None;
        }
        let millis: u64 = self.store.get(SESSION_START_KEY)?.trim().parse().ok()?;
        Some(UNIX_EPOCH + Duration::from_millis(millis))
    }

    fn persist(&mut self, since: SystemTime) {
        let millis = since
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        let result = self
            .store
            .set(AUTH_KEY, "true")
            .and_then(|()| self.store.set(SESSION_START_KEY, &millis.to_string()));
        if let Err(err) = result {
            warn!(error = %err, "could not persist host session; a restart will require login");
        }
    }

    fn clear_store(&mut self) {
        for key in [AUTH_KEY, SESSION_START_KEY] {
            if let Err(err) = self.store.remove(key) {
                warn!(key, error = %err, "could not clear stored host session");
            }
        }
    }
}

impl HostGate for SessionGuard {
    fn is_authenticated(&self) -> bool {
        SessionGuard::is_authenticated(self)
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("state", &self.state)
            .field("failed_attempts", &self.failed_attempts)
            .finish_non_exhaustive()
    }
}

/// Wall time between `since` and `now`; zero if the clock went backwards.
fn elapsed_since(since: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(since).unwrap_or(Duration::ZERO)
}

/// Whole seconds, rounded up. Any nonzero duration is at least 1.
fn ceil_secs(d: Duration) -> u64 {
    d.as_nanos().div_ceil(1_000_000_000) as u64
}

// =========================================================================
// Tests
// =========================================================================
