//! Error types for the session layer.

/// Errors that can occur while reading or writing the session store.
///
/// These never reach the host: the guard logs them and carries on, because
/// losing the store only means the host logs in again after a restart.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("session store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but isn't a JSON object of strings.
    #[error("session store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// No storage is available at all.
    #[error("session storage unavailable")]
    Unavailable,
}
