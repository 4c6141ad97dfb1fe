//! # Quizbuzz
//!
//! A local buzzer for in-person trivia: three players race to press their
//! key, the first press locks the others out and records a time, and a
//! host unlocks and resets rounds after a PIN check.
//!
//! Everything runs in one process. This crate wires the layers together:
//!
//! - [`BuzzerConfig`]: the JSON config file
//! - [`BuzzerSystem`]: session guard + arbiter behind one `dispatch`
//! - [`Controller`]: the task that serializes intents and runs the ticks
//! - [`KeyMap`]: which key means which intent
//! - [`Clock`]: where "now" comes from
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizbuzz::prelude::*;
//!
//! # async fn run() -> Result<(), QuizbuzzError> {
//! let config = BuzzerConfig::load();
//! let system = BuzzerSystem::new(&config, FileStore::in_runtime_dir(), SystemClock.wall());
//! let mut controller = Controller::spawn(system, SystemClock);
//!
//! controller.handle.send(Intent::Login { pin: "1234".into() }).await?;
//! controller.handle.send(Intent::Enable).await?;
//! while let Some(event) = controller.events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod clock;
mod config;
pub mod controller;
mod error;
mod keymap;
mod system;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BuzzerConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
pub use controller::{BuzzerHandle, Controller, EventReceiver};
pub use error::{ConfigError, QuizbuzzError};
pub use keymap::{Key, KeyMap};
pub use system::BuzzerSystem;

/// Everything an adapter needs, in one import.
pub mod prelude {
    pub use crate::{
        BuzzerConfig, BuzzerHandle, BuzzerSystem, Clock, Controller, EventReceiver, Key,
        KeyMap, ManualClock, QuizbuzzError, SystemClock,
    };
    pub use quizbuzz_protocol::display::{
        format_elapsed, format_podium_time, format_session_remaining, status_text,
    };
    pub use quizbuzz_protocol::{
        AuthError, Codec, Event, Intent, JsonCodec, PlayerId, PlayerView, ProtocolError,
        RoundPhase, RoundSnapshot, SessionSnapshot, SoundCue,
    };
    pub use quizbuzz_session::{FileStore, MemoryStore, NullStore, SessionStore};
}
