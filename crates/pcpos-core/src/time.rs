//! Time primitives for the animation timeline
//!
//! Every continuous component advances on one logical timeline. Time is kept
//! as microseconds since the timeline started, never as wall-clock instants,
//! so a paused or replayed session behaves identically.

use std::ops::{Add, Sub};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default cap on a single tick's elapsed time.
/// Larger gaps (app suspended, debugger break) are treated as this long.
pub const MAX_TICK_STEP: Duration = Duration::from_millis(100);

/// Tick time - monotonic position on the animation timeline
/// Represented as microseconds since timeline start
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TickTime(pub u64);

impl TickTime {
    pub const ZERO: TickTime = TickTime(0);

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        TickTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        TickTime(millis * 1000)
    }

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        TickTime((secs.max(0.0) * 1_000_000.0) as u64)
    }

    #[inline]
    pub fn as_micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0 / 1000
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Seconds as f32, the precision every animation curve works in
    #[inline]
    pub fn as_secs_f32(self) -> f32 {
        self.as_secs_f64() as f32
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        TickTime(self.0.saturating_add(duration.as_micros() as u64))
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    #[inline]
    pub fn since(self, earlier: TickTime) -> Duration {
        self - earlier
    }
}

impl Add<Duration> for TickTime {
    type Output = TickTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<TickTime> for TickTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: TickTime) -> Self::Output {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

impl std::fmt::Debug for TickTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.0 as f64 / 1000.0)
    }
}

/// Clamp a raw elapsed duration to the per-tick cap
#[inline]
pub fn cap_step(dt: Duration, max_step: Duration) -> Duration {
    dt.min(max_step)
}
