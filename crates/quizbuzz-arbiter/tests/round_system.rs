//! Integration tests for whole rounds driven through the public API.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use quizbuzz_arbiter::{ArbiterConfig, BuzzArbiter, RateLimitConfig, RoundLatch, RoundState};
use quizbuzz_protocol::{BuzzError, PlayerId, RoundPhase};

// =========================================================================
// Helpers
// =========================================================================

fn at(base: Instant, ms: u64) -> Instant {
    base + Duration::from_millis(ms)
}

/// Deterministic press schedule: (player, offset ms) pairs generated by a
/// small linear congruential generator so every run sees the same mix of
/// players, bursts, and gaps.
fn press_schedule(seed: u64, len: usize) -> Vec<(PlayerId, u64)> {
    let mut x = seed;
    let mut offset = 0;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let player = PlayerId((x >> 33) as u8 % 3 + 1);
            offset += (x >> 40) % 400;
            (player, offset)
        })
        .collect()
}

// =========================================================================
// First press wins
// =========================================================================

#[test]
fn test_any_press_sequence_has_exactly_one_winner() {
    for seed in 0..200 {
        let mut arbiter = BuzzArbiter::default();
        let t0 = Instant::now();
        arbiter.enable(&true, t0).unwrap();

        let mut wins = 0;
        for (player, offset) in press_schedule(seed, 25) {
            match arbiter.buzz(player, at(t0, offset)) {
                Ok(_) => wins += 1,
                Err(BuzzError::AlreadyLocked | BuzzError::RateLimited) => {}
                Err(other) => panic!("seed {seed}: unexpected {other:?}"),
            }
        }

        assert_eq!(wins, 1, "seed {seed}");
        assert_eq!(arbiter.phase(), RoundPhase::Locked);
        assert!(arbiter.state().winner().is_some());
    }
}

#[test]
fn test_winner_is_the_earliest_unthrottled_press() {
    let mut arbiter = BuzzArbiter::default();
    let t0 = Instant::now();
    arbiter.enable(&true, t0).unwrap();

    let presses = [(PlayerId(3), 120), (PlayerId(1), 121), (PlayerId(2), 122)];
    let results: Vec<_> = presses
        .iter()
        .map(|&(p, ms)| arbiter.buzz(p, at(t0, ms)))
        .collect();

    assert!(results[0].is_ok());
    assert_eq!(results[1], Err(BuzzError::AlreadyLocked));
    assert_eq!(results[2], Err(BuzzError::AlreadyLocked));
    assert_eq!(
        arbiter.state(),
        RoundState::Locked {
            winner: PlayerId(3),
            elapsed: Duration::from_millis(120),
        }
    );
}

#[test]
fn test_many_rounds_back_to_back() {
    let mut arbiter = BuzzArbiter::default();
    let t0 = Instant::now();

    for round in 0..10u64 {
        let start = at(t0, round * 10_000);
        arbiter.enable(&true, start).unwrap();
        let winner = PlayerId::ALL[(round % 3) as usize];

        let outcome = arbiter.buzz(winner, at(start, 50 + round)).unwrap();

        assert_eq!(outcome.player, winner);
        assert_eq!(outcome.elapsed, Duration::from_millis(50 + round));
        arbiter.reset(&true).unwrap();
        assert_eq!(arbiter.state(), RoundState::Idle);
    }
}

// =========================================================================
// Rate limiting inside a round
// =========================================================================

#[test]
fn test_enable_clears_press_budget_between_rounds() {
    // A budget of zero presses is raised to one by validation, so each
    // player gets exactly one press per window.
    let mut arbiter = BuzzArbiter::new(ArbiterConfig {
        rate_limit: RateLimitConfig {
            window: Duration::from_millis(1000),
            max_buzzes_per_window: 0,
        },
        ..ArbiterConfig::default()
    });
    let t0 = Instant::now();
    arbiter.enable(&true, t0).unwrap();

    // Player 1 wins the first round.
    arbiter.buzz(PlayerId(1), at(t0, 10)).unwrap();
    arbiter.reset(&true).unwrap();

    // Well inside the same window, but the new round starts with an
    // empty ledger.
    arbiter.enable(&true, at(t0, 20)).unwrap();
    assert!(arbiter.buzz(PlayerId(1), at(t0, 30)).is_ok());
}

// =========================================================================
// Threads racing one latch
// =========================================================================

#[test]
fn test_round_latch_shared_between_threads_one_winner() {
    const PRESSERS: usize = 3;

    let latch = Arc::new(RoundLatch::new());
    for _ in 0..100 {
        latch.reset();
        assert!(latch.arm());
        let barrier = Arc::new(Barrier::new(PRESSERS));

        let winners: Vec<bool> = (0..PRESSERS)
            .map(|_| {
                let latch = Arc::clone(&latch);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    latch.try_lock()
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        assert_eq!(winners.iter().filter(|&&w| w).count(), 1);
    }
}

// =========================================================================
// Names
// =========================================================================

#[test]
fn test_renamed_players_show_up_in_snapshot() {
    let mut arbiter = BuzzArbiter::default();
    arbiter.rename(PlayerId(1), "  Ada  ");
    arbiter.rename(PlayerId(3), "<b>Cy</b>");

    let snap = arbiter.snapshot(Instant::now());
    let names: Vec<_> = snap.players.iter().map(|p| p.name.as_str()).collect();

    assert_eq!(names, ["Ada", "Player 2", "Cy"]);
}
