//! Unified error type for Quizbuzz.

use std::path::PathBuf;

use quizbuzz_arbiter::ArbiterError;
use quizbuzz_protocol::{AuthError, ProtocolError};
use quizbuzz_session::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so `?`
/// converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuizbuzzError {
    /// Encoding or decoding an intent or event failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The config file couldn't be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A host operation was refused.
    #[error(transparent)]
    Arbiter(#[from] ArbiterError),

    /// A login was refused.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The controller task has stopped and can't take intents.
    #[error("buzzer controller is not running")]
    ControllerClosed,
}

/// Errors that can occur while loading the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file couldn't be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file isn't a valid config object.
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
