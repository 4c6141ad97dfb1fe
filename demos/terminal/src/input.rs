//! Input sources: the keyboard (a blocking reader thread) or JSON lines on
//! stdin. Both end up as intents on the controller handle.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use quizbuzz::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Longest PIN the prompt accepts.
const MAX_PIN_DIGITS: usize = 6;

/// What the key reader needs to know about the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub phase: RoundPhase,
    /// Digits typed so far while the PIN prompt is open.
    pub pin: Option<String>,
    pub sound: bool,
}

impl UiState {
    pub fn new(sound: bool) -> Self {
        Self {
            phase: RoundPhase::Idle,
            pin: None,
            sound,
        }
    }

    /// Follows the controller's events so key handling matches the screen.
    pub fn observe(&mut self, event: &Event) {
        match event {
            Event::RoundChanged(round) => self.phase = round.phase,
            Event::LoginRequested {
                lockout_remaining_secs: None,
            } => self.pin = Some(String::new()),
            Event::LoginRequested { .. }
            | Event::LoginSucceeded
            | Event::LoginPromptClosed
            | Event::LoginFailed {
                error: AuthError::Lockout { .. },
            } => self.pin = None,
            Event::SoundToggled { enabled } => self.sound = *enabled,
            _ => {}
        }
    }

    /// Turns one key press into an intent, editing the PIN buffer on the way.
    ///
    /// Podium keys always buzz, even with the prompt open, so a player is
    /// never locked out of a round by the host typing.
    pub fn translate(&mut self, key: KeyEvent, key_map: &KeyMap) -> Option<Intent> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Intent::Shutdown);
        }

        if let KeyCode::Char(c) = key.code {
            if let Some(player) = key_map.player_for(c) {
                return Some(Intent::Buzz { player });
            }
        }

        if let Some(buffer) = self.pin.as_mut() {
            return match key.code {
                KeyCode::Char(d) if d.is_ascii_digit() && buffer.len() < MAX_PIN_DIGITS => {
                    buffer.push(d);
                    None
                }
                KeyCode::Backspace => {
                    buffer.pop();
                    None
                }
                KeyCode::Enter => Some(Intent::Login {
                    pin: std::mem::take(buffer),
                }),
                KeyCode::Esc => {
                    self.pin = None;
                    Some(Intent::CancelLogin)
                }
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('h') => Some(Intent::RequestLogin),
            KeyCode::Char('o') => Some(Intent::Logout),
            KeyCode::Char('s') => Some(Intent::SetSoundEnabled {
                enabled: !self.sound,
            }),
            code => key_map.intent_for(to_key(code), self.phase),
        }
    }
}

fn to_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Esc => Key::Escape,
        _ => Key::Other,
    }
}

/// Reads keys on a plain thread; `crossterm::event::read` blocks.
pub fn spawn_key_reader(
    handle: BuzzerHandle,
    key_map: KeyMap,
    ui: Arc<Mutex<UiState>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        loop {
            let key = match event::read() {
                Ok(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => key,
                Ok(_) => continue,
                Err(err) => {
                    warn!(error = %err, "terminal input failed; shutting down");
                    let _ = handle.blocking_send(Intent::Shutdown);
                    return;
                }
            };

            let intent = ui
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .translate(key, &key_map);
            let Some(intent) = intent else { continue };

            let stop = intent == Intent::Shutdown;
            if handle.blocking_send(intent).is_err() || stop {
                return;
            }
        }
    })
}

/// Feeds JSON intents from stdin until EOF, then shuts the controller down.
pub async fn read_json_intents(handle: BuzzerHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) => match decode_intent(&line) {
                Ok(intent) => {
                    if handle.send(intent).await.is_err() {
                        return;
                    }
                }
                Err(err) => warn!(error = %err, "ignoring malformed intent"),
            },
            Ok(None) => {
                debug!("stdin closed");
                break;
            }
            Err(err) => {
                warn!(error = %err, "failed to read stdin");
                break;
            }
        }
    }
    let _ = handle.shutdown().await;
}

fn decode_intent(line: &str) -> Result<Intent, ProtocolError> {
    let intent: Intent = JsonCodec.decode(line.trim().as_bytes())?;
    intent.validate()?;
    Ok(intent)
}
