//! Shared vocabulary for Quizbuzz.
//!
//! This crate defines the "language" that the buzzer core and its
//! presentation adapter speak:
//!
//! - **Identity** ([`PlayerId`]): which of the three buzzers pressed.
//! - **Intents** ([`Intent`]): what the adapter asks the core to do.
//! - **Events** ([`Event`], [`RoundSnapshot`], [`SessionSnapshot`]): what the
//!   core reports back for rendering.
//! - **Errors** ([`AuthError`], [`BuzzError`], [`StateError`]): the named
//!   failure conditions the adapter renders as feedback.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events and intents are
//!   converted to/from bytes for adapters that live outside the process.
//!
//! # Architecture
//!
//! ```text
//! Adapter (keys) → Intent → Core (session + arbiter) → Event → Adapter (render)
//! ```
//!
//! The protocol crate knows nothing about timing or state machines; it only
//! names things.

mod codec;
pub mod display;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{AuthError, BuzzError, ProtocolError, StateError};
pub use types::{
    Event, HostGate, Intent, PLAYER_COUNT, PlayerId, PlayerView, RoundPhase,
    RoundSnapshot, SessionSnapshot, SoundCue,
};
