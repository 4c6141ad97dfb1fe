//! Key-to-intent mapping.
//!
//! Adapters translate their own key events into [`Key`] and ask the
//! [`KeyMap`] what, if anything, the press means. Keys that mean nothing
//! map to `None` and are dropped.

use quizbuzz_protocol::{Intent, PLAYER_COUNT, PlayerId, RoundPhase};

/// An adapter-neutral key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character (space included).
    Char(char),
    Escape,
    /// Anything else: arrows, function keys, modifiers on their own.
    Other,
}

/// The game's keyboard layout.
///
/// | key                   | intent              |
/// |-----------------------|---------------------|
/// | podium keys (any case)| `Buzz`              |
/// | space                 | `Enable` (not while locked) |
/// | escape                | `Reset`             |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    buzz_keys: [char; PLAYER_COUNT],
}

impl KeyMap {
    /// Builds a map from one buzz key per podium.
    pub fn new(buzz_keys: [char; PLAYER_COUNT]) -> Self {
        Self {
            buzz_keys: buzz_keys.map(|k| k.to_ascii_lowercase()),
        }
    }

    /// The intent for `key`, given the current round phase.
    pub fn intent_for(&self, key: Key, phase: RoundPhase) -> Option<Intent> {
        match key {
            Key::Char(' ') if phase != RoundPhase::Locked => Some(Intent::Enable),
            Key::Char(c) => self.player_for(c).map(|player| Intent::Buzz { player }),
            Key::Escape => Some(Intent::Reset),
            Key::Other => None,
        }
    }

    /// Which podium a character buzzes for, ignoring case.
    pub fn player_for(&self, c: char) -> Option<PlayerId> {
        let c = c.to_ascii_lowercase();
        self.buzz_keys
            .iter()
            .position(|&k| k == c)
            .and_then(|i| PlayerId::ALL.get(i).copied())
    }

    /// The buzz key for a podium.
    pub fn key_for(&self, player: PlayerId) -> Option<char> {
        player.index().map(|i| self.buzz_keys[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> KeyMap {
        KeyMap::new(['q', 'p', 'm'])
    }

    #[test]
    fn test_intent_for_buzz_keys_any_case() {
        let m = map();
        assert_eq!(
            m.intent_for(Key::Char('q'), RoundPhase::Armed),
            Some(Intent::Buzz { player: PlayerId(1) })
        );
        assert_eq!(
            m.intent_for(Key::Char('P'), RoundPhase::Armed),
            Some(Intent::Buzz { player: PlayerId(2) })
        );
        assert_eq!(
            m.intent_for(Key::Char('M'), RoundPhase::Idle),
            Some(Intent::Buzz { player: PlayerId(3) })
        );
    }

    #[test]
    fn test_intent_for_space_enables_unless_locked() {
        let m = map();
        assert_eq!(m.intent_for(Key::Char(' '), RoundPhase::Idle), Some(Intent::Enable));
        assert_eq!(m.intent_for(Key::Char(' '), RoundPhase::Armed), Some(Intent::Enable));
        assert_eq!(m.intent_for(Key::Char(' '), RoundPhase::Locked), None);
    }

    #[test]
    fn test_intent_for_escape_resets() {
        assert_eq!(
            map().intent_for(Key::Escape, RoundPhase::Locked),
            Some(Intent::Reset)
        );
    }

    #[test]
    fn test_intent_for_unbound_keys_is_none() {
        let m = map();
        assert_eq!(m.intent_for(Key::Char('z'), RoundPhase::Armed), None);
        assert_eq!(m.intent_for(Key::Other, RoundPhase::Armed), None);
    }

    #[test]
    fn test_key_for_round_trips() {
        let m = KeyMap::new(['A', 'L', 'B']);
        assert_eq!(m.key_for(PlayerId(2)), Some('l'));
        assert_eq!(m.player_for('B'), Some(PlayerId(3)));
        assert_eq!(m.key_for(PlayerId(7)), None);
    }
}
