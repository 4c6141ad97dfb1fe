//! Turns events into terminal output.
//!
//! Most events print a line. The running round clock and the session
//! countdown redraw a single status line in place, since they arrive many
//! times a second.

use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use quizbuzz::prelude::*;

/// One piece of terminal output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// A line that stays in the scrollback.
    Line(String),
    /// Redrawn in place; the next output overwrites it.
    Status(String),
    /// Terminal bell, for sound cues.
    Bell,
}

pub struct Renderer {
    key_map: KeyMap,
    json: bool,
    line_end: &'static str,
}

impl Renderer {
    /// `raw` means the terminal is in raw mode, where a bare `\n` does not
    /// return the cursor.
    pub fn new(key_map: KeyMap, json: bool, raw: bool) -> Self {
        Self {
            key_map,
            json,
            line_end: if raw { "\r\n" } else { "\n" },
        }
    }

    pub fn banner(&self, out: &mut impl Write) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        let keys: Vec<String> = PlayerId::ALL
            .iter()
            .filter_map(|&id| self.key_map.key_for(id).map(|k| format!("{id}={k}")))
            .collect();
        let lines = [
            "QUIZBUZZ".to_string(),
            format!("Buzz keys: {}", keys.join("  ")),
            "Host: h login, space enable, esc reset, o logout, s sound. Ctrl+C quits.".to_string(),
        ];
        for line in lines {
            self.put(out, Output::Line(line))?;
        }
        out.flush()
    }

    pub fn write(&self, out: &mut impl Write, event: &Event) -> io::Result<()> {
        if self.json {
            let bytes = JsonCodec.encode(event).map_err(io::Error::other)?;
            out.write_all(&bytes)?;
            out.write_all(self.line_end.as_bytes())?;
            return out.flush();
        }

        for output in outputs(event) {
            self.put(out, output)?;
        }
        out.flush()
    }

    fn put(&self, out: &mut impl Write, output: Output) -> io::Result<()> {
        match output {
            Output::Line(text) => queue!(
                out,
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(text),
                Print(self.line_end)
            ),
            Output::Status(text) => queue!(
                out,
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(text)
            ),
            Output::Bell => queue!(out, Print('\x07')),
        }
    }
}

/// What to show for one event.
pub fn outputs(event: &Event) -> Vec<Output> {
    match event {
        Event::RoundChanged(round) => vec![
            Output::Line(status_text(round)),
            Output::Line(podiums(round)),
        ],
        Event::Elapsed { elapsed } => vec![Output::Status(format_elapsed(*elapsed))],
        Event::PlayerRenamed { player, name } => {
            vec![Output::Line(format!("{player} is now {name}"))]
        }
        Event::Sound { .. } => vec![Output::Bell],
        Event::LoginRequested {
            lockout_remaining_secs: Some(secs),
        } => vec![Output::Line(format!(
            "Host login locked. Try again in {secs}s."
        ))],
        Event::LoginRequested { .. } => vec![Output::Line(
            "Host PIN (Enter to submit, Esc to cancel):".to_string(),
        )],
        Event::LoginSucceeded => vec![Output::Line("Host logged in.".to_string())],
        Event::LoginFailed { error } => vec![Output::Line(format!("Login failed: {error}"))],
        Event::LoginPromptClosed => vec![Output::Line("Login cancelled.".to_string())],
        Event::SessionTicked(session) => match session.remaining {
            Some(remaining) if session.warning => vec![Output::Status(format!(
                "{} (expiring soon)",
                format_session_remaining(remaining)
            ))],
            Some(remaining) => vec![Output::Status(format_session_remaining(remaining))],
            None => Vec::new(),
        },
        Event::SessionExpired => vec![Output::Line(
            "Host session expired. Press h to log in again.".to_string(),
        )],
        Event::LoggedOut => vec![Output::Line("Host logged out.".to_string())],
        Event::SoundToggled { enabled } => vec![Output::Line(format!(
            "Sound {}.",
            if *enabled { "on" } else { "off" }
        ))],
        Event::Rejected { reason } => vec![Output::Line(reason.clone())],
    }
}

fn podiums(round: &RoundSnapshot) -> String {
    round
        .players
        .iter()
        .map(|p| {
            let marker = if round.winner == Some(p.id) { "*" } else { " " };
            format!(
                "{marker}[{}] {} {}",
                p.key,
                p.name,
                format_podium_time(p.last_elapsed)
            )
        })
        .collect::<Vec<_>>()
        .join("   ")
}
