//! Terminal front end for the buzzer.
//!
//! ```text
//! cargo run -p quizbuzz-terminal
//! ```
//!
//! Players buzz with their podium keys (`q`, `p`, `m` by default). The
//! host presses `h` to log in, space to arm the buzzers, escape to reset,
//! `o` to log out and `s` to toggle sound. Ctrl+C quits.
//!
//! Two environment switches turn it into a pipe-friendly process:
//!
//! - `QUIZBUZZ_OUTPUT=json` writes every event as one JSON line.
//! - `QUIZBUZZ_INPUT=json` reads intents as JSON lines from stdin instead
//!   of the keyboard, e.g. `{"type":"Buzz","player":2}`.
//!
//! Logs go to stderr; set `RUST_LOG=quizbuzz=debug` to watch every intent.

mod input;
mod render;

use std::env;
use std::error::Error;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use crossterm::terminal;
use quizbuzz::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::input::UiState;
use crate::render::Renderer;

const OUTPUT_ENV: &str = "QUIZBUZZ_OUTPUT";
const INPUT_ENV: &str = "QUIZBUZZ_INPUT";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = BuzzerConfig::load();
    let system = BuzzerSystem::new(&config, FileStore::in_runtime_dir(), SystemClock.wall());
    let key_map = system.key_map().clone();
    let ui = Arc::new(Mutex::new(UiState::new(system.sound_enabled())));

    let Controller {
        handle,
        mut events,
        task,
    } = Controller::spawn(system, SystemClock);

    let keyboard = !env_is(INPUT_ENV, "json");
    let _raw = if keyboard {
        let guard = RawMode::enable()?;
        input::spawn_key_reader(handle.clone(), key_map.clone(), Arc::clone(&ui));
        Some(guard)
    } else {
        tokio::spawn(input::read_json_intents(handle.clone()));
        None
    };
    // The readers own the remaining handles; when they stop, so does the actor.
    drop(handle);

    let renderer = Renderer::new(key_map, env_is(OUTPUT_ENV, "json"), keyboard);
    let mut stdout = io::stdout();
    renderer.banner(&mut stdout)?;

    while let Some(event) = events.recv().await {
        ui.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(&event);
        renderer.write(&mut stdout, &event)?;
    }

    let system = task.await?;
    info!(phase = %system.phase(), "buzzer stopped");
    Ok(())
}

/// Logs to stderr so they never mix with rendered events on stdout.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn env_is(name: &str, expected: &str) -> bool {
    env::var(name).is_ok_and(|value| value.eq_ignore_ascii_case(expected))
}

/// Raw terminal mode for the lifetime of the guard.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
