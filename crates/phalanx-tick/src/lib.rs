//! Fixed-timestep tick scheduler for Phalanx matches.
//!
//! Soldiers move by `speed * dt`, so the match loop needs a steady `dt`.
//! [`TickScheduler`] fires at a configured rate (1–128 Hz), hands out a
//! fixed `dt` every tick, and warns when the work done inside a tick eats
//! too much of its budget.
//!
//! A rate of 0 puts the scheduler in *manual* mode: [`TickScheduler::wait_for_tick`]
//! never resolves and the owner is expected to step the match itself
//! (tests, replays, headless tools).
//!
//! ```ignore
//! let mut scheduler = TickScheduler::with_rate(30);
//! loop {
//!     let tick = scheduler.wait_for_tick().await;
//!     let events = game.tick(tick.dt_secs());
//!     scheduler.record_tick_end();
//! }
//! ```

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when a tick fires late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverrunPolicy {
    /// Forget the missed ticks and schedule the next one from now.
    #[default]
    Skip,
    /// Keep the original cadence; the next tick is due one period after
    /// the one that was missed, which may already be in the past.
    Drop,
}

/// Scheduler settings.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Tick rate in Hz. 0 = manual stepping.
    pub tick_rate_hz: u32,
    pub policy: OverrunPolicy,
    /// Fraction of the tick period (0.0–1.0) above which a tick's work is
    /// reported as over budget.
    pub budget_warn_fraction: f64,
    /// Random delay (0–max µs) before the first tick, so several matches
    /// started together do not tick in lockstep.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 0,
            policy: OverrunPolicy::default(),
            budget_warn_fraction: 0.8,
            initial_jitter_us: 1_000,
        }
    }
}

impl TickConfig {
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamps the rate to [`Self::MAX_TICK_RATE_HZ`] and the budget
    /// fraction to `0.0..=1.0`.
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick rate above maximum, clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self.budget_warn_fraction = self.budget_warn_fraction.clamp(0.0, 1.0);
        self
    }

    /// Length of one tick, or `None` in manual mode.
    pub fn period(&self) -> Option<Duration> {
        (self.tick_rate_hz > 0).then(|| Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64))
    }
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// One fired tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// 1-based, monotonically increasing.
    pub index: u64,
    /// Fixed step, always one period regardless of lateness.
    pub dt: Duration,
    /// The tick woke up more than 10% of a period after its deadline.
    pub late: bool,
    /// Whole periods that were skipped because of lateness.
    pub skipped: u64,
}

impl Tick {
    /// `dt` in seconds, the unit movement code works in.
    pub fn dt_secs(&self) -> f32 {
        self.dt.as_secs_f32()
    }
}

/// Counters kept across the scheduler's lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickStats {
    pub ticks: u64,
    pub late_ticks: u64,
    pub skipped_ticks: u64,
    pub over_budget: u64,
    /// Longest work time reported through `record_tick_end`.
    pub max_work: Duration,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fires ticks at a fixed rate.
pub struct TickScheduler {
    config: TickConfig,
    period: Option<Duration>,
    index: u64,
    deadline: Option<TokioInstant>,
    /// Set when a tick fires, consumed by `record_tick_end`.
    work_started: Option<Instant>,
    paused: bool,
    stats: TickStats,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let period = config.period();

        let deadline = period.map(|period| {
            let jitter = match config.initial_jitter_us {
                0 => Duration::ZERO,
                max => Duration::from_micros(rand::rng().random_range(0..max)),
            };
            TokioInstant::now() + period + jitter
        });

        match period {
            Some(period) => debug!(
                rate_hz = config.tick_rate_hz,
                period_ms = period.as_secs_f64() * 1000.0,
                policy = ?config.policy,
                "tick scheduler created"
            ),
            None => debug!("tick scheduler created in manual mode"),
        }

        Self {
            config,
            period,
            index: 0,
            deadline,
            work_started: None,
            paused: false,
            stats: TickStats::default(),
        }
    }

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Sleeps until the next tick is due.
    ///
    /// Pends forever in manual mode or while paused.
    pub async fn wait_for_tick(&mut self) -> Tick {
        let (deadline, period) = match (self.deadline, self.period) {
            (Some(deadline), Some(period)) if !self.paused => (deadline, period),
            _ => std::future::pending().await,
        };

        time::sleep_until(deadline).await;

        let now = TokioInstant::now();
        let late_by = now.saturating_duration_since(deadline);
        let late = late_by > period / 10;
        let skipped = if late {
            (late_by.as_nanos() / period.as_nanos()) as u64
        } else {
            0
        };

        self.deadline = Some(match self.config.policy {
            OverrunPolicy::Skip => now + period,
            OverrunPolicy::Drop => deadline + period,
        });

        self.index += 1;
        self.work_started = Some(Instant::now());
        self.stats.ticks += 1;
        if late {
            self.stats.late_ticks += 1;
            self.stats.skipped_ticks += skipped;
            warn!(
                tick = self.index,
                late_ms = late_by.as_secs_f64() * 1000.0,
                skipped,
                policy = ?self.config.policy,
                "tick fired late"
            );
        }
        trace!(tick = self.index, "tick");

        Tick {
            index: self.index,
            dt: period,
            late,
            skipped,
        }
    }

    /// Marks the end of the work done for the current tick.
    ///
    /// Without this call no budget warnings are emitted.
    pub fn record_tick_end(&mut self) {
        let Some(started) = self.work_started.take() else {
            return;
        };
        let work = started.elapsed();
        if work > self.stats.max_work {
            self.stats.max_work = work;
        }

        let Some(period) = self.period else {
            return;
        };
        let used = work.as_secs_f64() / period.as_secs_f64();
        if used >= self.config.budget_warn_fraction {
            self.stats.over_budget += 1;
            warn!(
                tick = self.index,
                work_ms = work.as_secs_f64() * 1000.0,
                budget_ms = period.as_secs_f64() * 1000.0,
                "tick work over budget"
            );
        }
    }

    /// Stops firing until [`resume`](Self::resume). Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.index, "tick scheduler paused");
        }
    }

    /// Resumes firing one period from now, so no burst of ticks follows a
    /// pause.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.deadline = self.period.map(|period| TokioInstant::now() + period);
            debug!(tick = self.index, "tick scheduler resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_manual(&self) -> bool {
        self.period.is_none()
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.index
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }
}
