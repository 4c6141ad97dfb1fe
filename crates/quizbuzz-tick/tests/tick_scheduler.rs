//! Integration tests for the tick scheduler.
//!
//! Async tests run with `start_paused = true`: Tokio's clock only moves
//! when every task is idle, and then jumps straight to the next timer, so
//! a 30-minute session countdown runs in microseconds.

use std::time::Duration;

use quizbuzz_tick::{TickConfig, TickScheduler};
use tokio::time::{Instant, advance, timeout};

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_config_is_disabled() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.tick_rate_hz, 0);
    assert_eq!(cfg.tick_duration(), None);
    assert!(!cfg.start_paused);
}

#[test]
fn test_with_rate_sets_duration() {
    let cfg = TickConfig::with_rate(1);
    assert_eq!(cfg.tick_duration(), Some(Duration::from_secs(1)));
}

#[test]
fn test_tick_duration_30hz() {
    let dur = TickConfig::with_rate(30).tick_duration().unwrap();
    assert_eq!(dur, Duration::from_secs_f64(1.0 / 30.0));
}

#[test]
fn test_validated_clamps_rate() {
    let cfg = TickConfig::with_rate(10_000).validated();
    assert_eq!(cfg.tick_rate_hz, TickConfig::MAX_TICK_RATE_HZ);
}

// =========================================================================
// Scheduler creation and accessors
// =========================================================================

#[tokio::test]
async fn test_scheduler_initial_state() {
    let s = TickScheduler::with_rate(20);
    assert_eq!(s.tick_count(), 0);
    assert_eq!(s.tick_rate_hz(), 20);
    assert!(!s.is_disabled());
    assert!(!s.is_paused());
    assert_eq!(s.tick_duration(), Some(Duration::from_millis(50)));
}

#[tokio::test]
async fn test_paused_config_starts_paused() {
    let s = TickScheduler::new(TickConfig::paused(30));
    assert!(s.is_paused());
}

// =========================================================================
// Tick firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_tick_fires_after_one_period() {
    let start = Instant::now();
    let mut s = TickScheduler::with_rate(20);

    let info = s.wait_for_tick().await;

    assert_eq!(info.tick, 1);
    assert_eq!(info.dt, Duration::from_millis(50));
    assert!(!info.overrun);
    assert_eq!(info.ticks_skipped, 0);
    assert_eq!(start.elapsed(), Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_one_hz_ticks_once_per_second() {
    let start = Instant::now();
    let mut s = TickScheduler::with_rate(1);

    for expected in 1..=5 {
        let info = s.wait_for_tick().await;
        assert_eq!(info.tick, expected);
    }

    assert_eq!(start.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_disabled_never_fires() {
    let mut s = TickScheduler::with_rate(0);

    let result = timeout(Duration::from_secs(5), s.wait_for_tick()).await;

    assert!(result.is_err(), "disabled scheduler should pend forever");
}

// =========================================================================
// Overruns
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_overrun_reports_missed_ticks_and_reschedules_from_now() {
    let mut s = TickScheduler::with_rate(10);

    // The task was busy for 350ms past the first deadline.
    advance(Duration::from_millis(450)).await;
    let info = s.wait_for_tick().await;
    assert!(info.overrun);
    assert_eq!(info.ticks_skipped, 3);

    let before = Instant::now();
    s.wait_for_tick().await;
    assert_eq!(before.elapsed(), Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_overrun_never_fires_backlog() {
    let mut s = TickScheduler::with_rate(10);

    advance(Duration::from_millis(150)).await;
    let info = s.wait_for_tick().await;
    assert!(info.overrun);

    // The next deadline is a full period after the late tick, not the
    // 200ms mark of the old cadence.
    let before = Instant::now();
    s.wait_for_tick().await;
    assert_eq!(before.elapsed(), Duration::from_millis(100));
}

// =========================================================================
// Pause / Resume
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_pause_prevents_ticks() {
    let mut s = TickScheduler::with_rate(20);
    s.wait_for_tick().await;

    s.pause();
    assert!(s.is_paused());

    let result = timeout(Duration::from_secs(1), s.wait_for_tick()).await;
    assert!(result.is_err(), "paused scheduler should pend");
}

#[tokio::test(start_paused = true)]
async fn test_resume_rebases_deadline() {
    let mut s = TickScheduler::new(TickConfig::paused(1));

    // Paused for a long time; resuming must not fire a backlog.
    advance(Duration::from_secs(90)).await;
    s.resume();
    let resumed_at = Instant::now();

    let info = s.wait_for_tick().await;

    assert_eq!(info.tick, 1);
    assert!(!info.overrun);
    assert_eq!(resumed_at.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_resume_while_running_keeps_deadline() {
    let start = Instant::now();
    let mut s = TickScheduler::with_rate(1);

    advance(Duration::from_millis(600)).await;
    // A redundant resume (e.g. a second login) must not push the tick out.
    s.resume();

    s.wait_for_tick().await;
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_pause_resume_idempotent() {
    let mut s = TickScheduler::with_rate(20);

    s.pause();
    s.pause();
    assert!(s.is_paused());

    s.resume();
    s.resume();
    assert!(!s.is_paused());

    let info = s.wait_for_tick().await;
    assert_eq!(info.tick, 1);
}

// =========================================================================
// Integration: select! loop pattern (mirrors controller usage)
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_loop_ticks_only_while_resumed() {
    let mut s = TickScheduler::new(TickConfig::paused(20));
    let (tx, mut rx) = tokio::sync::mpsc::channel::<&str>(10);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send("start").await.ok();
        tokio::time::sleep(Duration::from_millis(160)).await;
        tx.send("stop").await.ok();
        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send("quit").await.ok();
    });

    let mut ticks_fired = 0u64;
    loop {
        tokio::select! {
            Some(cmd) = rx.recv() => match cmd {
                "start" => s.resume(),
                "stop" => s.pause(),
                _ => break,
            },
            info = s.wait_for_tick() => {
                ticks_fired += 1;
                assert_eq!(info.tick, ticks_fired);
            }
        }
    }

    // Resumed at 100ms, paused at 260ms: ticks at 150, 200 and 250.
    assert_eq!(ticks_fired, 3);
}
