//! PCPOS Runtime - Companion orchestration and main loop
//!
//! This crate implements the per-tick companion loop:
//! 1. Advance companion time, fire due gestures
//! 2. Read the shared emotion state
//! 3. Classify mood and movement pattern
//! 4. Movement tick
//! 5. Head tick
//! 6. Compositor tick
//! 7. Speech and gesture deformation
//! 8. Expression parameters
//! 9. Publish the frame snapshot and haptic descriptors
//!
//! Around the loop: the shared `EmotionHandle` producers write into,
//! `CompanionConfig` loading, a tokio driver and tracing setup.

pub mod companion;
pub mod config;
pub mod driver;
pub mod emotion;
pub mod snapshot;
pub mod telemetry;

pub use companion::*;
pub use config::*;
pub use driver::*;
pub use emotion::*;
pub use snapshot::*;
pub use telemetry::*;
