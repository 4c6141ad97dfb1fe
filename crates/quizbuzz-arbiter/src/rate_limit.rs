//! Sliding-window buzz limiter.
//!
//! A player who hammers their key before the host has even finished
//! reading the question shouldn't be able to flood the arbiter. Each
//! player gets a small budget of presses per window; presses past the
//! budget are dropped silently.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use quizbuzz_protocol::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Press budget per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Length of the sliding window. Default: 1 second.
    pub window: Duration,

    /// Presses accepted inside one window. Default: 3.
    pub max_buzzes_per_window: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(1000),
            max_buzzes_per_window: 3,
        }
    }
}

impl RateLimitConfig {
    /// Fixes any out-of-range values so the config is safe to use.
    ///
    /// A zero budget or zero window would make every press fail (or every
    /// press pass), so both are raised to a minimum.
    pub fn validated(mut self) -> Self {
        if self.max_buzzes_per_window == 0 {
            warn!("max_buzzes_per_window is 0; raising to 1");
            self.max_buzzes_per_window = 1;
        }
        if self.window.is_zero() {
            warn!("rate limit window is 0; raising to 1ms");
            self.window = Duration::from_millis(1);
        }
        self
    }
}

/// Per-player press ledger.
///
/// Each entry is the list of accepted press instants that are still inside
/// the window. Rejected presses are never recorded, so mashing doesn't
/// extend a player's penalty.
#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    config: RateLimitConfig,
    ledger: HashMap<PlayerId, Vec<Instant>>,
}

impl RateLimiter {
    /// Creates an empty limiter.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config: config.validated(),
            ledger: HashMap::new(),
        }
    }

    /// Records a press if the player still has budget.
    ///
    /// Entries at least one window old are pruned first. Returns `false`
    /// (and changes nothing else) when the budget is spent.
    pub fn check_and_record(&mut self, player: PlayerId, now: Instant) -> bool {
        let window = self.config.window;
        let presses = self.ledger.entry(player).or_default();
        presses.retain(|&t| now.saturating_duration_since(t) < window);

        if presses.len() >= self.config.max_buzzes_per_window {
            debug!(
                player_id = %player,
                presses = presses.len(),
                "buzz rate limited"
            );
            return false;
        }

        presses.push(now);
        true
    }

    /// Forgets every recorded press.
    pub fn clear(&mut self) {
        self.ledger.clear();
    }

    /// Presses currently held for `player` (not pruned).
    pub fn presses(&self, player: PlayerId) -> usize {
        self.ledger.get(&player).map_or(0, Vec::len)
    }

    /// The active configuration.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P1: PlayerId = PlayerId(1);
    const P2: PlayerId = PlayerId(2);

    fn ms(base: Instant, n: u64) -> Instant {
        base + Duration::from_millis(n)
    }

    #[test]
    fn test_check_and_record_fourth_press_in_window_rejected() {
        let mut limiter = RateLimiter::default();
        let t = Instant::now();

        assert!(limiter.check_and_record(P1, ms(t, 0)));
        assert!(limiter.check_and_record(P1, ms(t, 1)));
        assert!(limiter.check_and_record(P1, ms(t, 2)));
        assert!(!limiter.check_and_record(P1, ms(t, 3)));
        assert_eq!(limiter.presses(P1), 3);
    }

    #[test]
    fn test_check_and_record_accepts_after_window_slides() {
        let mut limiter = RateLimiter::default();
        let t = Instant::now();
        for n in 0..3 {
            limiter.check_and_record(P1, ms(t, n));
        }
        assert!(!limiter.check_and_record(P1, ms(t, 3)));

        // t+1001: the presses at t and t+1 are a full window old.
        assert!(limiter.check_and_record(P1, ms(t, 1001)));
        assert_eq!(limiter.presses(P1), 2);
    }

    #[test]
    fn test_check_and_record_press_exactly_one_window_old_is_pruned() {
        let mut limiter = RateLimiter::new(RateLimitConfig {
            window: Duration::from_millis(100),
            max_buzzes_per_window: 1,
        });
        let t = Instant::now();

        assert!(limiter.check_and_record(P1, ms(t, 0)));
        assert!(!limiter.check_and_record(P1, ms(t, 99)));
        assert!(limiter.check_and_record(P1, ms(t, 100)));
    }

    #[test]
    fn test_check_and_record_players_are_independent() {
        let mut limiter = RateLimiter::default();
        let t = Instant::now();
        for n in 0..3 {
            limiter.check_and_record(P1, ms(t, n));
        }

        assert!(limiter.check_and_record(P2, ms(t, 3)));
        assert_eq!(limiter.presses(P2), 1);
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut limiter = RateLimiter::default();
        let t = Instant::now();
        for n in 0..3 {
            limiter.check_and_record(P1, ms(t, n));
        }

        limiter.clear();

        assert_eq!(limiter.presses(P1), 0);
        assert!(limiter.check_and_record(P1, ms(t, 4)));
    }

    #[test]
    fn test_rate_limit_config_validated_raises_zeroes() {
        let config = RateLimitConfig {
            window: Duration::ZERO,
            max_buzzes_per_window: 0,
        }
        .validated();
        assert_eq!(config.max_buzzes_per_window, 1);
        assert_eq!(config.window, Duration::from_millis(1));
    }
}
