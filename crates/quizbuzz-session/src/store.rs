//! Session storage port.
//!
//! The guard mirrors a live login into a small key-value store so that a
//! restart inside the timeout window doesn't force the host to type the
//! PIN again. The store is best-effort: if it is missing, unreadable, or
//! full, the only consequence is a fresh login.
//!
//! Layout is two string entries:
//!
//! | key                    | value                         |
//! |------------------------|-------------------------------|
//! | `buzzer_auth`          | `"true"`                      |
//! | `buzzer_session_start` | session start, ms since epoch |

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::StoreError;

/// Key holding the authenticated flag.
pub const AUTH_KEY: &str = "buzzer_auth";
/// Key holding the session start (milliseconds since the Unix epoch).
pub const SESSION_START_KEY: &str = "buzzer_session_start";

/// A tiny string key-value store.
///
/// `Send` so the guard that owns it can live inside the controller task.
pub trait SessionStore: Send {
    /// Reads an entry. Unreadable storage reads as absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes an entry.
    ///
    /// # Errors
    /// Returns a [`StoreError`] if the entry could not be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes an entry. Deleting a missing entry is not an error.
    ///
    /// # Errors
    /// Returns a [`StoreError`] if the deletion could not be persisted.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process store. Survives nothing, which makes it ideal for tests and
/// for adapters that don't want persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NullStore
// ---------------------------------------------------------------------------

/// Storage that isn't there. Reads find nothing and writes fail, so every
/// run starts logged out.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl SessionStore for NullStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// A JSON object of strings in a single file.
///
/// The default location is the per-user runtime directory
/// (`$XDG_RUNTIME_DIR`, falling back to the temp directory), which the OS
/// clears on logout or reboot. That's the closest thing a process has to
/// a browser tab's session storage.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// File name used by [`FileStore::in_runtime_dir`].
    pub const FILE_NAME: &'static str = "quizbuzz-session.json";

    /// Uses the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses [`Self::FILE_NAME`] inside the runtime (or temp) directory.
    pub fn in_runtime_dir() -> Self {
        let dir = std::env::var_os("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        Self::new(dir.join(Self::FILE_NAME))
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
                _ => Ok(()),
            };
        }
        let json = serde_json::to_vec(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "session store unreadable; treating as empty"
                );
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking the write.
        let mut entries = self.load().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.load().unwrap_or_default();
        if entries.remove(key).is_some() || entries.is_empty() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
