//! PCPOS Time - the single animation timeline
//!
//! This crate implements the timing primitives every animation component
//! shares:
//! - Clock sources producing capped per-tick deltas (wall clock or manual)
//! - Pause/resume without replaying paused time
//! - A scheduler of deferred events keyed by absolute tick time

pub mod clock;
pub mod scheduler;

pub use clock::*;
pub use scheduler::*;
