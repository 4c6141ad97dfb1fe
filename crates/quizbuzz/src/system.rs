//! `BuzzerSystem`: the whole buzzer behind one `dispatch` function.
//!
//! The system ties the layers together:
//!
//! ```text
//! Intent ──→ dispatch ──→ SessionGuard (may the host do this?)
//!                   └───→ BuzzArbiter  (who buzzed first?)
//!                                 ↓
//!                            Vec<Event>
//! ```
//!
//! It is plain synchronous state. The [controller](crate::controller)
//! wraps it in a task and adds the periodic ticks; tests drive it
//! directly with a [`ManualClock`](crate::ManualClock).

use std::time::{Instant, SystemTime};

use quizbuzz_arbiter::{ArbiterError, BuzzArbiter};
use quizbuzz_protocol::{
    AuthError, Event, Intent, PlayerId, RoundPhase, RoundSnapshot, SessionSnapshot, SoundCue,
};
use quizbuzz_session::{SessionGuard, SessionStore, SessionTick};
use tracing::{debug, info};

use crate::{BuzzerConfig, Clock, KeyMap};

/// The buzzer's entire state.
///
/// Built explicitly from a config and a session store; there are no
/// globals, so several systems can live side by side in one test.
#[derive(Debug)]
pub struct BuzzerSystem {
    arbiter: BuzzArbiter,
    session: SessionGuard,
    key_map: KeyMap,
    sound_enabled: bool,
    display_refresh_hz: u32,
}

impl BuzzerSystem {
    /// Builds a system, resuming a stored host session if one is live.
    pub fn new(config: &BuzzerConfig, store: impl SessionStore + 'static, wall: SystemTime) -> Self {
        let config = config.clone().validated();
        // The key map and the arbiter must agree on the podium keys.
        let arbiter_config = config.arbiter_config().validated();
        let key_map = KeyMap::new(arbiter_config.key_bindings);

        let mut arbiter = BuzzArbiter::new(arbiter_config);
        for (player, name) in PlayerId::ALL.into_iter().zip(&config.player_names) {
            arbiter.rename(player, name);
        }

        let session = SessionGuard::restore(config.session_config(), store, wall);

        info!(
            keys = ?config.key_bindings,
            sound = config.sound_enabled,
            host_logged_in = session.is_authenticated(),
            "buzzer system ready"
        );

        Self {
            arbiter,
            session,
            key_map,
            sound_enabled: config.sound_enabled,
            display_refresh_hz: config.display_refresh_hz,
        }
    }

    /// Applies one intent and returns what the adapter should render.
    ///
    /// Never fails: every refusal becomes an event (or, for presses that
    /// lost, nothing at all).
    pub fn dispatch(&mut self, intent: Intent, clock: &impl Clock) -> Vec<Event> {
        let now = clock.monotonic();
        let wall = clock.wall();

        match intent {
            Intent::Enable => self.enable(now, wall),
            Intent::Reset => self.reset(now, wall),
            Intent::Buzz { player } => self.buzz(player, now),
            Intent::RequestLogin => {
                if self.session.is_authenticated() {
                    debug!("login requested while already logged in");
                    Vec::new()
                } else {
                    vec![self.login_prompt(wall)]
                }
            }
            Intent::Login { pin } => {
                let was_authenticated = self.session.is_authenticated();
                match self.session.attempt_login(&pin, wall) {
                    Ok(_) => vec![
                        Event::LoginSucceeded,
                        Event::SessionTicked(self.session.snapshot(wall)),
                    ],
                    Err(error) => {
                        let mut events = vec![Event::LoginFailed { error }];
                        // A lockout ends the running session too.
                        if was_authenticated && !self.session.is_authenticated() {
                            info!("host session ended by lockout");
                            events.push(Event::LoggedOut);
                        }
                        events
                    }
                }
            }
            Intent::CancelLogin => vec![Event::LoginPromptClosed],
            Intent::Logout => {
                self.session.logout();
                vec![Event::LoggedOut]
            }
            Intent::SetPlayerName { player, name } => self
                .arbiter
                .rename(player, &name)
                .map(|name| Event::PlayerRenamed {
                    player,
                    name: name.to_string(),
                })
                .into_iter()
                .collect(),
            Intent::SetSoundEnabled { enabled } => {
                self.sound_enabled = enabled;
                debug!(enabled, "sound toggled");
                vec![Event::SoundToggled { enabled }]
            }
            Intent::Shutdown => Vec::new(),
        }
    }

    /// One step of the session countdown. Call at 1 Hz while logged in.
    pub fn session_tick(&mut self, wall: SystemTime) -> Vec<Event> {
        match self.session.tick(wall) {
            SessionTick::Inactive => Vec::new(),
            SessionTick::Active { .. } => vec![Event::SessionTicked(self.session.snapshot(wall))],
            SessionTick::Expired => vec![Event::SessionExpired],
        }
    }

    /// The round clock, while armed.
    pub fn display_tick(&self, now: Instant) -> Option<Event> {
        (self.arbiter.phase() == RoundPhase::Armed).then(|| Event::Elapsed {
            elapsed: self.arbiter.current_elapsed(now),
        })
    }

    // -- Queries ----------------------------------------------------------

    /// Current round phase.
    pub fn phase(&self) -> RoundPhase {
        self.arbiter.phase()
    }

    /// `true` while host controls are live.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Whether sound cues are emitted.
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Round clock redraw rate.
    pub fn display_refresh_hz(&self) -> u32 {
        self.display_refresh_hz
    }

    /// The keyboard layout.
    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    /// Rendering view of the round.
    pub fn round_snapshot(&self, now: Instant) -> RoundSnapshot {
        self.arbiter.snapshot(now)
    }

    /// Rendering view of the host session.
    pub fn session_snapshot(&self, wall: SystemTime) -> SessionSnapshot {
        self.session.snapshot(wall)
    }

    // -- Intent handlers --------------------------------------------------

    fn enable(&mut self, now: Instant, wall: SystemTime) -> Vec<Event> {
        match self.arbiter.enable(&self.session, now) {
            Ok(()) => {
                let mut events = vec![Event::RoundChanged(self.arbiter.snapshot(now))];
                self.push_sound(&mut events, SoundCue::Enable);
                events
            }
            Err(ArbiterError::Auth(_)) => vec![self.login_prompt(wall)],
            Err(ArbiterError::State(err)) => vec![Event::Rejected {
                reason: err.to_string(),
            }],
        }
    }

    fn reset(&mut self, now: Instant, wall: SystemTime) -> Vec<Event> {
        match self.arbiter.reset(&self.session) {
            Ok(()) => vec![Event::RoundChanged(self.arbiter.snapshot(now))],
            Err(AuthError::NotAuthenticated) => vec![self.login_prompt(wall)],
            Err(other) => vec![Event::Rejected {
                reason: other.to_string(),
            }],
        }
    }

    fn buzz(&mut self, player: PlayerId, now: Instant) -> Vec<Event> {
        match self.arbiter.buzz(player, now) {
            Ok(_) => {
                let mut events = vec![Event::RoundChanged(self.arbiter.snapshot(now))];
                self.push_sound(&mut events, SoundCue::Buzz);
                events
            }
            Err(err) => {
                debug!(player_id = %player, reason = %err, "buzz ignored");
                Vec::new()
            }
        }
    }

    fn login_prompt(&self, wall: SystemTime) -> Event {
        Event::LoginRequested {
            lockout_remaining_secs: self.session.lockout_remaining(wall),
        }
    }

    fn push_sound(&self, events: &mut Vec<Event>, cue: SoundCue) {
        if self.sound_enabled {
            events.push(Event::Sound { cue });
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `BuzzerSystem::dispatch`.
    //!
    //! Each test builds a fresh system over a `MemoryStore` and drives it
    //! with a `ManualClock`.

    use std::time::Duration;

    use quizbuzz_session::MemoryStore;

    use super::*;
    use crate::ManualClock;

    fn system(clock: &ManualClock) -> BuzzerSystem {
        BuzzerSystem::new(&BuzzerConfig::default(), MemoryStore::new(), clock.wall())
    }

    fn logged_in(clock: &ManualClock) -> BuzzerSystem {
        let mut sys = system(clock);
        sys.dispatch(Intent::Login { pin: "1234".into() }, clock);
        sys
    }

    #[test]
    fn test_dispatch_enable_logged_out_requests_login() {
        let clock = ManualClock::new();
        let mut sys = system(&clock);

        let events = sys.dispatch(Intent::Enable, &clock);

        assert_eq!(
            events,
            vec![Event::LoginRequested {
                lockout_remaining_secs: None
            }]
        );
        assert_eq!(sys.phase(), RoundPhase::Idle);
    }

    #[test]
    fn test_dispatch_enable_emits_round_and_sound() {
        let clock = ManualClock::new();
        let mut sys = logged_in(&clock);

        let events = sys.dispatch(Intent::Enable, &clock);

        assert!(matches!(&events[0], Event::RoundChanged(s) if s.phase == RoundPhase::Armed));
        assert_eq!(events[1], Event::Sound { cue: SoundCue::Enable });
    }

    #[test]
    fn test_dispatch_enable_twice_rejected() {
        let clock = ManualClock::new();
        let mut sys = logged_in(&clock);
        sys.dispatch(Intent::Enable, &clock);

        let events = sys.dispatch(Intent::Enable, &clock);

        assert!(matches!(&events[..], [Event::Rejected { .. }]));
    }

    #[test]
    fn test_dispatch_buzz_not_armed_is_silent() {
        let clock = ManualClock::new();
        let mut sys = logged_in(&clock);

        let events = sys.dispatch(Intent::Buzz { player: PlayerId(1) }, &clock);

        assert!(events.is_empty());
    }

    #[test]
    fn test_dispatch_sound_disabled_suppresses_cues() {
        let clock = ManualClock::new();
        let mut sys = logged_in(&clock);
        sys.dispatch(Intent::SetSoundEnabled { enabled: false }, &clock);

        let enable = sys.dispatch(Intent::Enable, &clock);
        clock.advance(Duration::from_millis(300));
        let buzz = sys.dispatch(Intent::Buzz { player: PlayerId(3) }, &clock);

        assert_eq!(enable.len(), 1);
        assert_eq!(buzz.len(), 1);
        assert!(!sys.sound_enabled());
    }

    #[test]
    fn test_dispatch_wrong_pin_reports_failure() {
        let clock = ManualClock::new();
        let mut sys = system(&clock);

        let events = sys.dispatch(Intent::Login { pin: "9999".into() }, &clock);

        assert_eq!(
            events,
            vec![Event::LoginFailed {
                error: AuthError::WrongPin {
                    attempts_remaining: 4
                }
            }]
        );
    }

    #[test]
    fn test_dispatch_request_login_during_lockout_carries_countdown() {
        let clock = ManualClock::new();
        let mut sys = system(&clock);
        for _ in 0..5 {
            sys.dispatch(Intent::Login { pin: "0000".into() }, &clock);
        }
        clock.advance(Duration::from_secs(60));

        let events = sys.dispatch(Intent::RequestLogin, &clock);

        assert_eq!(
            events,
            vec![Event::LoginRequested {
                lockout_remaining_secs: Some(240)
            }]
        );
    }

    #[test]
    fn test_dispatch_logout_keeps_round() {
        let clock = ManualClock::new();
        let mut sys = logged_in(&clock);
        sys.dispatch(Intent::Enable, &clock);

        let events = sys.dispatch(Intent::Logout, &clock);

        assert_eq!(events, vec![Event::LoggedOut]);
        assert!(!sys.is_authenticated());
        assert_eq!(sys.phase(), RoundPhase::Armed);
    }

    #[test]
    fn test_dispatch_rename_sanitizes() {
        let clock = ManualClock::new();
        let mut sys = system(&clock);

        let events = sys.dispatch(
            Intent::SetPlayerName {
                player: PlayerId(1),
                name: "<b>Ann</b>".into(),
            },
            &clock,
        );

        assert_eq!(
            events,
            vec![Event::PlayerRenamed {
                player: PlayerId(1),
                name: "Ann".into()
            }]
        );
    }

    #[test]
    fn test_dispatch_rename_unknown_player_is_silent() {
        let clock = ManualClock::new();
        let mut sys = system(&clock);

        let events = sys.dispatch(
            Intent::SetPlayerName {
                player: PlayerId(0),
                name: "Ghost".into(),
            },
            &clock,
        );

        assert!(events.is_empty());
    }

    #[test]
    fn test_new_applies_configured_names() {
        let clock = ManualClock::new();
        let config = BuzzerConfig {
            player_names: vec!["Red".into(), "".into()],
            ..BuzzerConfig::default()
        };

        let sys = BuzzerSystem::new(&config, MemoryStore::new(), clock.wall());
        let snap = sys.round_snapshot(clock.monotonic());

        assert_eq!(snap.players[0].name, "Red");
        assert_eq!(snap.players[1].name, "Player 2");
        assert_eq!(snap.players[2].name, "Player 3");
    }

    #[test]
    fn test_session_tick_expires_session() {
        let clock = ManualClock::new();
        let mut sys = logged_in(&clock);

        clock.advance(Duration::from_secs(60));
        assert!(matches!(
            sys.session_tick(clock.wall())[..],
            [Event::SessionTicked(_)]
        ));

        clock.advance(Duration::from_secs(30 * 60));
        assert_eq!(sys.session_tick(clock.wall()), vec![Event::SessionExpired]);
        assert!(!sys.is_authenticated());
    }

    #[test]
    fn test_display_tick_only_while_armed() {
        let clock = ManualClock::new();
        let mut sys = logged_in(&clock);
        assert_eq!(sys.display_tick(clock.monotonic()), None);

        sys.dispatch(Intent::Enable, &clock);
        clock.advance(Duration::from_millis(120));

        assert_eq!(
            sys.display_tick(clock.monotonic()),
            Some(Event::Elapsed {
                elapsed: Duration::from_millis(120)
            })
        );
    }
}
