//! Text formatting shared by every renderer.
//!
//! These are the exact strings the buzzer has always shown: a three-decimal
//! seconds timer, an `M:SS` session countdown, and the status banner.

use std::time::Duration;

use crate::{RoundPhase, RoundSnapshot};

/// Placeholder shown on a podium that has no time yet.
pub const NO_TIME: &str = "--";

/// Formats a round time as seconds with millisecond precision: `0.750s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.3}s", elapsed.as_secs_f64())
}

/// Formats an optional podium time, falling back to [`NO_TIME`].
pub fn format_podium_time(elapsed: Option<Duration>) -> String {
    elapsed.map_or_else(|| NO_TIME.to_string(), format_elapsed)
}

/// Formats the session countdown: `Session: 29:59`.
///
/// Seconds are truncated, so 59.9 s left shows as `0:59`.
pub fn format_session_remaining(remaining: Duration) -> String {
    let total = remaining.as_secs();
    format!("Session: {}:{:02}", total / 60, total % 60)
}

/// The status banner for a round.
pub fn status_text(round: &RoundSnapshot) -> String {
    match round.phase {
        RoundPhase::Idle => "Buzzers Disabled - Host: Press ENABLE".to_string(),
        RoundPhase::Armed => "BUZZERS ACTIVE - GO!".to_string(),
        RoundPhase::Locked => match round.winner_view() {
            Some(winner) => format!("{} BUZZED IN!", winner.name.to_uppercase()),
            None => "BUZZED IN!".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlayerId, PlayerView};

    fn locked_by(name: &str) -> RoundSnapshot {
        RoundSnapshot {
            phase: RoundPhase::Locked,
            winner: Some(PlayerId(1)),
            elapsed: Duration::from_millis(1234),
            players: vec![PlayerView {
                id: PlayerId(1),
                key: 'q',
                name: name.into(),
                last_elapsed: Some(Duration::from_millis(1234)),
            }],
        }
    }

    #[test]
    fn test_format_elapsed_three_decimals() {
        assert_eq!(format_elapsed(Duration::from_millis(750)), "0.750s");
        assert_eq!(format_elapsed(Duration::ZERO), "0.000s");
        assert_eq!(format_elapsed(Duration::from_millis(12_345)), "12.345s");
    }

    #[test]
    fn test_format_podium_time_placeholder() {
        assert_eq!(format_podium_time(None), "--");
        assert_eq!(format_podium_time(Some(Duration::from_millis(5))), "0.005s");
    }

    #[test]
    fn test_format_session_remaining_pads_seconds() {
        assert_eq!(
            format_session_remaining(Duration::from_secs(30 * 60)),
            "Session: 30:00"
        );
        assert_eq!(
            format_session_remaining(Duration::from_millis(65_900)),
            "Session: 1:05"
        );
    }

    #[test]
    fn test_status_text_locked_uppercases_winner() {
        assert_eq!(status_text(&locked_by("Bob")), "BOB BUZZED IN!");
    }

    #[test]
    fn test_status_text_idle_and_armed() {
        let mut round = locked_by("x");
        round.phase = RoundPhase::Idle;
        round.winner = None;
        assert_eq!(status_text(&round), "Buzzers Disabled - Host: Press ENABLE");
        round.phase = RoundPhase::Armed;
        assert_eq!(status_text(&round), "BUZZERS ACTIVE - GO!");
    }
}
