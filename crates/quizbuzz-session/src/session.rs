//! Session types: configuration, the host's login state, and tick results.

use std::time::{Duration, SystemTime};

use tracing::warn;

use crate::HostPin;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for host login behavior.
///
/// Every duration is policy, not a constant: a long game night can raise
/// the timeout, a classroom can shorten the lockout.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The PIN the host types. Default `1234`: change it per deployment.
    pub host_pin: HostPin,

    /// How long a login lasts. Default: 30 minutes.
    pub session_timeout: Duration,

    /// Wrong PINs allowed before a lockout. Default: 5.
    pub max_login_attempts: u32,

    /// How long logins are refused after too many wrong PINs. Default: 5 minutes.
    pub lockout_time: Duration,

    /// Below this much remaining time the countdown is flagged as a
    /// warning. Default: 2 minutes.
    pub warning_threshold: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host_pin: HostPin::default(),
            session_timeout: Duration::from_secs(30 * 60),
            max_login_attempts: 5,
            lockout_time: Duration::from_secs(5 * 60),
            warning_threshold: Duration::from_secs(2 * 60),
        }
    }
}

impl SessionConfig {
    /// Fixes any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`SessionGuard::new`](crate::SessionGuard::new). Rules:
    /// - `max_login_attempts` is at least 1.
    /// - `session_timeout` is at least one second.
    pub fn validated(mut self) -> Self {
        if self.max_login_attempts == 0 {
            warn!("max_login_attempts is 0; raising to 1");
            self.max_login_attempts = 1;
        }
        if self.session_timeout < Duration::from_secs(1) {
            warn!(
                timeout_ms = self.session_timeout.as_millis() as u64,
                "session_timeout below 1s; raising to 1s"
            );
            self.session_timeout = Duration::from_secs(1);
        }
        self
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The host's login state.
///
/// ```text
///   LoggedOut ──(correct PIN)──→ LoggedIn ──(logout / expiry)──→ LoggedOut
///       │                                                          ↑
///       └──(too many wrong PINs)──→ LockedOut ──(lockout ends)─────┘
/// ```
///
/// Instants here are wall-clock (`SystemTime`) because the session start is
/// persisted and must mean the same thing after a restart. Round timing
/// never uses these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No host session. Host intents re-open the login prompt.
    LoggedOut,

    /// Logins are refused until `until`, whatever PIN is typed.
    LockedOut {
        /// When logins open again.
        until: SystemTime,
    },

    /// Host controls are live.
    LoggedIn {
        /// When the PIN was accepted. The session ends at
        /// `since + session_timeout`.
        since: SystemTime,
    },
}

/// Result of one session tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTick {
    /// Nobody is logged in; nothing to count down.
    Inactive,

    /// The session is live.
    Active {
        /// Time left before expiry.
        remaining: Duration,
        /// `true` when `remaining` is under the warning threshold.
        warning: bool,
    },

    /// The session just ran out and the guard logged the host out.
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default_values() {
        let config = SessionConfig::default();
        assert!(config.host_pin.is_default());
        assert_eq!(config.session_timeout, Duration::from_millis(1_800_000));
        assert_eq!(config.max_login_attempts, 5);
        assert_eq!(config.lockout_time, Duration::from_millis(300_000));
        assert_eq!(config.warning_threshold, Duration::from_secs(120));
    }

    #[test]
    fn test_session_config_validated_raises_zero_attempts() {
        let config = SessionConfig {
            max_login_attempts: 0,
            session_timeout: Duration::ZERO,
            ..SessionConfig::default()
        }
        .validated();
        assert_eq!(config.max_login_attempts, 1);
        assert_eq!(config.session_timeout, Duration::from_secs(1));
    }
}
