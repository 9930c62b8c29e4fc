//! Simulation time model.
//!
//! # Design
//!
//! Time advances in fixed base ticks of `tick_ms` milliseconds (default
//! 50 ms, i.e. 20 Hz).  Every periodic activity of an agent (heading,
//! arrival/stall, compliance) runs on a [`Cadence`] derived from the base
//! tick, so all cycles are driven by one integer counter and never drift
//! against each other:
//!
//!   period_ticks = max(1, round(1000 / (hz * tick_ms)))
//!   fires(tick)  = tick % period_ticks == 0
//!
//! Durations handed to movers and timers are `std::time::Duration`, computed
//! from whole ticks, so timer arithmetic is exact.

use std::fmt;
use std::time::Duration;

use crate::error::{ensure_positive, CoreResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Maps tick counts to simulated elapsed time.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Milliseconds of simulated time per base tick.
    pub tick_ms:      u32,
    /// Advanced by [`SimClock::advance`] once per `Sim::tick`.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_ms: u32) -> Self {
        Self { tick_ms, current_tick: Tick::ZERO }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Duration of one base tick.
    #[inline]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_ms))
    }

    /// Simulated time since tick 0.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.duration_of(self.current_tick.0)
    }

    /// Duration spanned by `ticks` base ticks.
    #[inline]
    pub fn duration_of(&self, ticks: u64) -> Duration {
        Duration::from_millis(ticks.saturating_mul(u64::from(self.tick_ms)))
    }

    /// How many ticks cover `d`? Rounds up so timers never fire early.
    pub fn ticks_for(&self, d: Duration) -> u64 {
        let ms = d.as_millis();
        let tick = u128::from(self.tick_ms.max(1));
        u64::try_from(ms.div_ceil(tick)).unwrap_or(u64::MAX)
    }

    /// Cadence for an activity that should run at `hz` times per second.
    pub fn cadence(&self, hz: f64) -> Cadence {
        Cadence::from_hz(hz, self.tick_ms)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}s)", self.current_tick, self.elapsed().as_secs_f64())
    }
}

// ── Cadence ───────────────────────────────────────────────────────────────────

/// A periodic sub-cycle expressed in whole base ticks.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Cadence {
    period: u64,
}

impl Cadence {
    /// Run on every base tick.
    pub const EVERY_TICK: Cadence = Cadence { period: 1 };

    pub fn from_hz(hz: f64, tick_ms: u32) -> Self {
        if hz <= 0.0 || tick_ms == 0 {
            return Self::EVERY_TICK;
        }
        let ticks = (1000.0 / (hz * f64::from(tick_ms))).round();
        let period = if ticks.is_finite() && ticks >= 1.0 { ticks as u64 } else { 1 };
        Self { period }
    }

    #[inline]
    pub fn period_ticks(self) -> u64 {
        self.period
    }

    #[inline]
    pub fn fires(self, tick: Tick) -> bool {
        tick.0 % self.period == 0
    }

    /// Simulated time between two firings.
    #[inline]
    pub fn interval(self, tick_ms: u32) -> Duration {
        Duration::from_millis(self.period * u64::from(tick_ms))
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Milliseconds per base tick.  Default: 50 (20 Hz).
    pub tick_ms: u32,

    /// Total ticks for `Sim::run`.  Default: 1200 (one simulated minute).
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Heading/steering cycle rate.
    pub heading_hz: f64,

    /// Arrival and stall check rate.
    pub nav_hz: f64,

    /// Signal compliance and arbitration poll rate.
    pub compliance_hz: f64,

    /// Emit an agent snapshot every N ticks.  0 disables snapshots.
    /// Default: 20 (once per simulated second).
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms:       50,
            total_ticks:   1_200,
            seed:          0,
            heading_hz:    20.0,
            nav_hz:        10.0,
            compliance_hz: 5.0,
            output_interval_ticks: 20,
        }
    }
}

impl SimConfig {
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Whether `tick` is a snapshot tick.
    pub fn is_output_tick(&self, tick: Tick) -> bool {
        self.output_interval_ticks > 0 && tick.0.is_multiple_of(self.output_interval_ticks)
    }

    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_ms)
    }

    pub fn validate(&self) -> CoreResult<()> {
        ensure_positive("tick_ms", f64::from(self.tick_ms))?;
        ensure_positive("heading_hz", self.heading_hz)?;
        ensure_positive("nav_hz", self.nav_hz)?;
        ensure_positive("compliance_hz", self.compliance_hz)?;
        Ok(())
    }
}
