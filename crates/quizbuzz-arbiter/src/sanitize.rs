//! Player name cleaning.
//!
//! Names come straight from a text field and end up on a big screen, so
//! they are cut down to a short run of letters, digits, spaces and a few
//! symbols. Markup-looking fragments are dropped whole rather than
//! character by character: `<b>Ann</b>` becomes `Ann`, not `bAnnb`.

use quizbuzz_protocol::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What a player name may contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRules {
    /// Longest name kept, in characters. Default: 20.
    pub max_length: usize,

    /// Symbols allowed besides ASCII letters, digits and whitespace.
    /// Default: `-_`.
    pub allowed_symbols: String,
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            max_length: 20,
            allowed_symbols: "-_".to_string(),
        }
    }
}

impl NameRules {
    /// Fixes any out-of-range values so the rules are safe to use.
    ///
    /// - `max_length` is at least 1.
    /// - `<` and `>` can't be allowed symbols; they would defeat tag
    ///   stripping.
    pub fn validated(mut self) -> Self {
        if self.max_length == 0 {
            warn!("max name length is 0; raising to 1");
            self.max_length = 1;
        }
        if self.allowed_symbols.contains(['<', '>']) {
            warn!(
                symbols = %self.allowed_symbols,
                "angle brackets are never allowed in names; dropping them"
            );
            self.allowed_symbols.retain(|c| c != '<' && c != '>');
        }
        self
    }

    fn allows(&self, c: char) -> bool {
        c.is_ascii_alphanumeric() || c.is_whitespace() || self.allowed_symbols.contains(c)
    }
}

/// Cleans a raw name.
///
/// Steps, in order:
/// 1. keep the first `max_length` characters
/// 2. remove every `<...>` fragment (an unclosed `<` is left for step 3)
/// 3. drop characters that [`NameRules`] doesn't allow
/// 4. trim surrounding whitespace
///
/// Total: any input gives a (possibly empty) name.
///
/// ```rust
/// use quizbuzz_arbiter::{NameRules, sanitize};
///
/// assert_eq!(sanitize("<script>Bob</script>!!", &NameRules::default()), "Bob");
/// ```
pub fn sanitize(raw: &str, rules: &NameRules) -> String {
    let truncated: String = raw.chars().take(rules.max_length).collect();
    strip_tags(&truncated)
        .chars()
        .filter(|&c| rules.allows(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// [`sanitize`], falling back to `Player N` when nothing survives.
pub fn display_name(raw: &str, player: PlayerId, rules: &NameRules) -> String {
    let clean = sanitize(raw, rules);
    if clean.is_empty() {
        player.default_name()
    } else {
        clean
    }
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str) -> String {
        sanitize(raw, &NameRules::default())
    }

    #[test]
    fn test_sanitize_strips_script_tags() {
        assert_eq!(clean("<script>Bob</script>!!"), "Bob");
    }

    #[test]
    fn test_sanitize_truncates_to_max_length() {
        let name = clean(&"A".repeat(30));
        assert_eq!(name, "A".repeat(20));
    }

    #[test]
    fn test_sanitize_counts_characters_not_bytes() {
        // Ten two-byte characters fit; they are then filtered out.
        let raw = format!("{}Zoe", "é".repeat(10));
        let rules = NameRules {
            max_length: 13,
            ..NameRules::default()
        };
        assert_eq!(sanitize(&raw, &rules), "Zoe");
    }

    #[test]
    fn test_sanitize_truncates_before_stripping() {
        // The closing `>` falls past the limit, so the `<` is unterminated
        // and only the bracket itself is dropped.
        let rules = NameRules {
            max_length: 6,
            ..NameRules::default()
        };
        assert_eq!(sanitize("ab<cdefgh>", &rules), "abcde");
    }

    #[test]
    fn test_sanitize_keeps_allowed_symbols_and_spaces() {
        assert_eq!(clean("  Team-Blue_2 "), "Team-Blue_2");
        assert_eq!(clean("Ann & Bo!"), "Ann  Bo");
    }

    #[test]
    fn test_sanitize_custom_symbols() {
        let rules = NameRules {
            allowed_symbols: "!".to_string(),
            ..NameRules::default()
        };
        assert_eq!(sanitize("Go-Team!", &rules), "GoTeam!");
    }

    #[test]
    fn test_sanitize_everything_removed_is_empty() {
        assert_eq!(clean("<<>>"), "");
        assert_eq!(clean("???"), "");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_display_name_defaults_when_empty() {
        let rules = NameRules::default();
        assert_eq!(display_name("<b></b>", PlayerId(2), &rules), "Player 2");
        assert_eq!(display_name("Kim", PlayerId(2), &rules), "Kim");
    }

    #[test]
    fn test_name_rules_validated_drops_angle_brackets() {
        let rules = NameRules {
            max_length: 0,
            allowed_symbols: "<-_>".to_string(),
        }
        .validated();
        assert_eq!(rules.max_length, 1);
        assert_eq!(rules.allowed_symbols, "-_");
    }
}
