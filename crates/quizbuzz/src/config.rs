//! Buzzer configuration: one JSON file, every key optional.
//!
//! ```json
//! {
//!   "hostPin": "4821",
//!   "sessionTimeoutMs": 3600000,
//!   "keyBindings": ["a", "l", "b"],
//!   "playerNames": ["Red", "Green", "Blue"]
//! }
//! ```
//!
//! Keys that are missing take their defaults. A file that is missing takes
//! all defaults; a file that can't be read or parsed does too, with a
//! warning, so a typo never keeps the game from starting.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io::ErrorKind};

use quizbuzz_arbiter::{
    ArbiterConfig, DEFAULT_KEY_BINDINGS, NameRules, RateLimitConfig, checked_key_bindings,
};
use quizbuzz_session::{HostPin, SessionConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ConfigError;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/quizbuzz.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "QUIZBUZZ_CONFIG_PATH";

/// Everything that can be tuned without recompiling.
///
/// Durations are whole milliseconds so the file stays plain JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuzzerConfig {
    /// Host PIN, 4 to 6 digits.
    pub host_pin: String,
    pub session_timeout_ms: u64,
    pub max_login_attempts: u32,
    pub lockout_time_ms: u64,
    pub rate_limit_window_ms: u64,
    pub max_buzzes_per_window: usize,
    pub max_name_length: usize,
    /// Symbols allowed in names besides letters, digits and spaces.
    pub allowed_name_symbols: String,
    /// One buzz key per podium, in podium order.
    pub key_bindings: Vec<char>,
    /// Initial names; missing or empty entries use `Player N`.
    pub player_names: Vec<String>,
    pub sound_enabled: bool,
    /// Round clock redraw rate while armed.
    pub display_refresh_hz: u32,
}

impl Default for BuzzerConfig {
    fn default() -> Self {
        Self {
            host_pin: HostPin::DEFAULT.to_string(),
            session_timeout_ms: 30 * 60 * 1000,
            max_login_attempts: 5,
            lockout_time_ms: 5 * 60 * 1000,
            rate_limit_window_ms: 1000,
            max_buzzes_per_window: 3,
            max_name_length: 20,
            allowed_name_symbols: "-_".to_string(),
            key_bindings: DEFAULT_KEY_BINDINGS.to_vec(),
            player_names: Vec::new(),
            sound_enabled: true,
            display_refresh_hz: 30,
        }
    }
}

impl BuzzerConfig {
    /// Loads from [`CONFIG_PATH_ENV`] or [`DEFAULT_CONFIG_PATH`]. Never fails.
    pub fn load() -> Self {
        Self::load_from(resolve_config_path())
    }

    /// Loads from `path`, falling back to defaults on any problem. Never
    /// fails.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded buzzer config");
                config.validated()
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to load config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Reads and parses `path` without validation or fallback.
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file can't be read, [`ConfigError::Parse`]
    /// if it isn't a valid config object.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fixes out-of-range values, logging a warning for each fix.
    ///
    /// Only checks that need the whole config live here. Per-component
    /// limits are clamped again by each component's own `validated()`.
    pub fn validated(mut self) -> Self {
        if HostPin::new(self.host_pin.as_str()).is_err() {
            warn!("hostPin is not 4-6 digits; using the default PIN");
            self.host_pin = HostPin::DEFAULT.to_string();
        }
        if self.key_bindings.len() != DEFAULT_KEY_BINDINGS.len() {
            warn!(
                count = self.key_bindings.len(),
                "keyBindings must name exactly three keys; using defaults"
            );
            self.key_bindings = DEFAULT_KEY_BINDINGS.to_vec();
        }
        let keys =
            <[char; 3]>::try_from(self.key_bindings.as_slice()).unwrap_or(DEFAULT_KEY_BINDINGS);
        match checked_key_bindings(keys) {
            Some(keys) => self.key_bindings = keys.to_vec(),
            None => {
                warn!(
                    keys = ?self.key_bindings,
                    "keyBindings must be distinct and not space or escape; using defaults"
                );
                self.key_bindings = DEFAULT_KEY_BINDINGS.to_vec();
            }
        }
        if self.display_refresh_hz == 0 {
            warn!("displayRefreshHz is 0; using 30");
            self.display_refresh_hz = 30;
        }
        self
    }

    /// The session guard's slice of the config.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            host_pin: HostPin::new(self.host_pin.as_str()).unwrap_or_default(),
            session_timeout: Duration::from_millis(self.session_timeout_ms),
            max_login_attempts: self.max_login_attempts,
            lockout_time: Duration::from_millis(self.lockout_time_ms),
            ..SessionConfig::default()
        }
    }

    /// The arbiter's slice of the config.
    pub fn arbiter_config(&self) -> ArbiterConfig {
        let key_bindings = <[char; 3]>::try_from(self.key_bindings.as_slice())
            .unwrap_or(DEFAULT_KEY_BINDINGS);
        ArbiterConfig {
            key_bindings,
            rate_limit: RateLimitConfig {
                window: Duration::from_millis(self.rate_limit_window_ms),
                max_buzzes_per_window: self.max_buzzes_per_window,
            },
            name_rules: NameRules {
                max_length: self.max_name_length,
                allowed_symbols: self.allowed_name_symbols.clone(),
            },
        }
    }
}

/// Resolves the config path, honoring the environment override.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
