//! Host session management for Quizbuzz.
//!
//! This crate gates the host-only controls (enable, reset) behind a short
//! PIN:
//!
//! 1. **PIN check**: format validation and comparison ([`HostPin`])
//! 2. **Attempt counting and lockout**: too many wrong PINs locks logins
//!    out for a while ([`SessionGuard::attempt_login`])
//! 3. **Session expiry**: a login lasts a fixed time, counted down by a
//!    1 Hz tick ([`SessionGuard::tick`])
//! 4. **Session storage**: the login is mirrored into a short-lived store
//!    so a restart inside the timeout resumes it ([`SessionStore`])
//!
//! The PIN is a UX gate that keeps players from pressing the host's keys.
//! It is not a security boundary.
//!
//! # How it fits in the stack
//!
//! ```text
//! Application (above)  ← asks is_authenticated() before host intents
//!     ↕
//! Session Layer (this crate)  ← PIN, attempts, lockout, expiry
//!     ↕
//! Protocol Layer (below)  ← AuthError, SessionSnapshot, HostGate
//! ```

mod error;
mod guard;
mod pin;
mod session;
mod store;

pub use error::StoreError;
pub use guard::SessionGuard;
pub use pin::{HostPin, is_valid_pin_format};
pub use session::{SessionConfig, SessionState, SessionTick};
pub use store::{
    AUTH_KEY, FileStore, MemoryStore, NullStore, SESSION_START_KEY, SessionStore,
};
