//! Integration tests for the tick scheduler.
//!
//! Time-dependent tests run with Tokio's clock paused; sleeping advances
//! the mock clock instantly.

use std::time::Duration;

use phalanx_tick::{OverrunPolicy, TickConfig, TickScheduler};

fn steady(rate: u32) -> TickConfig {
    TickConfig {
        initial_jitter_us: 0,
        ..TickConfig::with_rate(rate)
    }
}

// =========================================================================
// Config
// =========================================================================

#[test]
fn test_default_config_is_manual() {
    let config = TickConfig::default();
    assert_eq!(config.tick_rate_hz, 0);
    assert_eq!(config.period(), None);
}

#[test]
fn test_period_for_rate() {
    assert_eq!(TickConfig::with_rate(20).period(), Some(Duration::from_millis(50)));
    assert_eq!(
        TickConfig::with_rate(60).period(),
        Some(Duration::from_secs_f64(1.0 / 60.0))
    );
}

#[test]
fn test_validated_clamps_rate_and_budget() {
    let config = TickConfig {
        tick_rate_hz: 1_000,
        budget_warn_fraction: 3.0,
        ..TickConfig::default()
    }
    .validated();
    assert_eq!(config.tick_rate_hz, TickConfig::MAX_TICK_RATE_HZ);
    assert_eq!(config.budget_warn_fraction, 1.0);
}

// =========================================================================
// Scheduler
// =========================================================================

#[test]
fn test_new_scheduler_accessors() {
    let s = TickScheduler::new(steady(20));
    assert_eq!(s.tick_count(), 0);
    assert_eq!(s.tick_rate_hz(), 20);
    assert!(!s.is_manual());
    assert!(!s.is_paused());
    assert_eq!(s.period(), Some(Duration::from_millis(50)));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_are_numbered_with_fixed_dt() {
    let mut s = TickScheduler::new(steady(20));
    for expected in 1..=4 {
        let tick = s.wait_for_tick().await;
        assert_eq!(tick.index, expected);
        assert_eq!(tick.dt, Duration::from_millis(50));
        assert!(!tick.late);
        assert_eq!(tick.skipped, 0);
    }
    assert_eq!(s.tick_count(), 4);
    assert_eq!(s.stats().ticks, 4);
}

#[tokio::test(start_paused = true)]
async fn test_dt_secs_matches_period() {
    let mut s = TickScheduler::new(steady(10));
    let tick = s.wait_for_tick().await;
    assert!((tick.dt_secs() - 0.1).abs() < 1e-6);
}

#[tokio::test(start_paused = true)]
async fn test_manual_mode_never_fires() {
    let mut s = TickScheduler::new(TickConfig::default());
    assert!(s.is_manual());
    let waited = tokio::time::timeout(Duration::from_secs(5), s.wait_for_tick()).await;
    assert!(waited.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_paused_scheduler_does_not_fire() {
    let mut s = TickScheduler::new(steady(20));
    s.pause();
    s.pause();
    assert!(s.is_paused());
    let waited = tokio::time::timeout(Duration::from_secs(1), s.wait_for_tick()).await;
    assert!(waited.is_err());

    s.resume();
    let tick = s.wait_for_tick().await;
    assert_eq!(tick.index, 1);
}

#[tokio::test(start_paused = true)]
async fn test_late_tick_is_reported_and_skipped() {
    let mut s = TickScheduler::new(TickConfig {
        policy: OverrunPolicy::Skip,
        ..steady(20)
    });
    s.wait_for_tick().await;

    // Stall for three and a half periods before waiting again.
    tokio::time::advance(Duration::from_millis(225)).await;
    let tick = s.wait_for_tick().await;
    assert!(tick.late);
    assert_eq!(tick.skipped, 3);
    assert_eq!(s.stats().late_ticks, 1);
    assert_eq!(s.stats().skipped_ticks, 3);

    // Skip reschedules from now: the following tick is on time.
    let next = s.wait_for_tick().await;
    assert!(!next.late);
}

#[tokio::test(start_paused = true)]
async fn test_record_tick_end_without_tick_is_harmless() {
    let mut s = TickScheduler::new(steady(20));
    s.record_tick_end();
    assert_eq!(s.stats().over_budget, 0);
}
