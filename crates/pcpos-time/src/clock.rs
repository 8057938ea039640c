//! Clock implementations for the animation timeline

use std::time::{Duration, Instant};

use pcpos_core::{cap_step, TickTime, MAX_TICK_STEP};
use serde::{Deserialize, Serialize};

/// Lowest supported tick rate
pub const MIN_TICK_HZ: f32 = 20.0;
/// Highest supported tick rate
pub const MAX_TICK_HZ: f32 = 120.0;

/// Clock configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Target tick rate in Hz, clamped to [20, 120]
    pub target_hz: f32,
    /// Largest delta a single tick may report
    pub max_step: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            target_hz: 60.0,
            max_step: MAX_TICK_STEP,
        }
    }
}

impl ClockConfig {
    /// ProMotion-class displays
    pub fn high_refresh() -> Self {
        ClockConfig {
            target_hz: MAX_TICK_HZ,
            ..Self::default()
        }
    }

    /// Low-power reference rate (50 ms period)
    pub fn low_power() -> Self {
        ClockConfig {
            target_hz: MIN_TICK_HZ,
            ..Self::default()
        }
    }

    /// Effective tick rate
    pub fn rate_hz(&self) -> f32 {
        if self.target_hz.is_nan() {
            return MIN_TICK_HZ;
        }
        self.target_hz.clamp(MIN_TICK_HZ, MAX_TICK_HZ)
    }

    /// Interval between ticks at the effective rate
    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros((1_000_000.0 / self.rate_hz()) as u64)
    }

    /// Per-tick budget (one interval)
    pub fn tick_budget(&self) -> Duration {
        self.tick_interval()
    }
}

/// One step of the timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    /// Timeline position after this tick
    pub now: TickTime,
    /// Capped elapsed time since the previous tick (zero while paused)
    pub dt: Duration,
}

/// Source of ticks for the animation loop
pub trait ClockSource {
    /// Advance and return the next tick
    fn next_tick(&mut self) -> Tick;

    /// Current timeline position without advancing
    fn now(&self) -> TickTime;

    /// Freeze the timeline
    fn pause(&mut self);

    /// Continue the timeline without replaying paused time
    fn resume(&mut self);

    fn is_paused(&self) -> bool;
}

/// Wall-clock driven source
/// INVARIANT: the timeline is monotonic and never advances more than
/// `max_step` in one tick
pub struct FrameClock {
    /// Current timeline position
    value: TickTime,
    /// Last update instant
    last_update: Instant,
    /// Frozen?
    paused: bool,
    config: ClockConfig,
}

impl FrameClock {
    /// Create a new frame clock starting at zero
    pub fn new(config: ClockConfig) -> Self {
        FrameClock {
            value: TickTime::ZERO,
            last_update: Instant::now(),
            paused: false,
            config,
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Advance using an explicit instant (lets tests control wall time)
    pub fn tick_at(&mut self, now: Instant) -> Tick {
        if self.paused {
            return Tick {
                now: self.value,
                dt: Duration::ZERO,
            };
        }

        let elapsed = now.saturating_duration_since(self.last_update);

        // Clamp to prevent large jumps (e.g., after app suspension)
        let dt = cap_step(elapsed, self.config.max_step);

        self.value = self.value.saturating_add(dt);
        self.last_update = now;
        Tick { now: self.value, dt }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}

impl ClockSource for FrameClock {
    fn next_tick(&mut self) -> Tick {
        self.tick_at(Instant::now())
    }

    fn now(&self) -> TickTime {
        self.value
    }

    fn pause(&mut self) {
        if !self.paused {
            tracing::debug!(at = ?self.value, "frame clock paused");
        }
        self.paused = true;
    }

    fn resume(&mut self) {
        if self.paused {
            tracing::debug!(at = ?self.value, "frame clock resumed");
            // Re-anchor so the paused wall time is never replayed
            self.last_update = Instant::now();
        }
        self.paused = false;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Deterministic fixed-step source for tests and simulation
#[derive(Clone, Debug)]
pub struct ManualClock {
    value: TickTime,
    step: Duration,
    max_step: Duration,
    paused: bool,
}

impl ManualClock {
    /// Clock that advances `step` per tick
    pub fn new(step: Duration) -> Self {
        ManualClock {
            value: TickTime::ZERO,
            step,
            max_step: MAX_TICK_STEP,
            paused: false,
        }
    }

    /// Clock stepping at the given config's tick interval
    pub fn from_config(config: &ClockConfig) -> Self {
        ManualClock {
            max_step: config.max_step,
            ..Self::new(config.tick_interval())
        }
    }

    /// Advance by an arbitrary delta (still capped)
    pub fn advance(&mut self, dt: Duration) -> Tick {
        if self.paused {
            return Tick {
                now: self.value,
                dt: Duration::ZERO,
            };
        }
        let dt = cap_step(dt, self.max_step);
        self.value = self.value.saturating_add(dt);
        Tick { now: self.value, dt }
    }

    pub fn step(&self) -> Duration {
        self.step
    }
}

impl ClockSource for ManualClock {
    fn next_tick(&mut self) -> Tick {
        self.advance(self.step)
    }

    fn now(&self) -> TickTime {
        self.value
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_monotonic() {
        let mut clock = FrameClock::default();
        let start = Instant::now();

        let t1 = clock.tick_at(start + Duration::from_millis(5));
        let t2 = clock.tick_at(start + Duration::from_millis(21));

        assert!(t2.now > t1.now);
    }

    #[test]
    fn test_frame_clock_caps_large_gap() {
        let mut clock = FrameClock::default();
        let start = Instant::now();

        let tick = clock.tick_at(start + Duration::from_secs(30));
        assert_eq!(tick.dt, Duration::from_millis(100));
        assert_eq!(tick.now, TickTime::from_millis(100));
    }

    #[test]
    fn test_paused_clock_reports_zero_dt() {
        let mut clock = FrameClock::default();
        let start = Instant::now();
        clock.tick_at(start + Duration::from_millis(10));

        clock.pause();
        let before = clock.now();
        let tick = clock.tick_at(start + Duration::from_millis(500));
        assert_eq!(tick.dt, Duration::ZERO);
        assert_eq!(tick.now, before);
        assert!(clock.is_paused());
    }

    #[test]
    fn test_resume_does_not_replay_pause() {
        let mut clock = FrameClock::default();
        clock.pause();
        std::thread::sleep(Duration::from_millis(30));
        clock.resume();

        let tick = clock.next_tick();
        // Only the time since resume counts, well under the 30ms paused
        assert!(tick.dt < Duration::from_millis(30));
    }

    #[test]
    fn test_rate_is_clamped() {
        let fast = ClockConfig {
            target_hz: 1000.0,
            ..ClockConfig::default()
        };
        assert_eq!(fast.rate_hz(), MAX_TICK_HZ);

        let slow = ClockConfig {
            target_hz: 1.0,
            ..ClockConfig::default()
        };
        assert_eq!(slow.tick_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_manual_clock_fixed_step() {
        let mut clock = ManualClock::new(Duration::from_millis(50));
        for _ in 0..4 {
            clock.next_tick();
        }
        assert_eq!(clock.now(), TickTime::from_millis(200));

        let tick = clock.advance(Duration::from_secs(2));
        assert_eq!(tick.dt, MAX_TICK_STEP);
    }

    #[test]
    fn test_manual_clock_pause() {
        let mut clock = ManualClock::new(Duration::from_millis(10));
        clock.pause();
        assert_eq!(clock.next_tick().dt, Duration::ZERO);
        clock.resume();
        assert_eq!(clock.next_tick().dt, Duration::from_millis(10));
    }
}
