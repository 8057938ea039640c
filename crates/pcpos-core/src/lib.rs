//! PCPOS Core - Fundamental types for the companion animation core
//!
//! This crate defines the types shared by every animation component:
//! - Time primitives (TickTime)
//! - Emotion state (PAD triple, discrete mood label)
//! - Expression parameters and colours handed to the renderer
//! - Movement pattern classification
//! - Haptic events, sinks and the PAD → haptic mapper
//! - Error types for the configuration surface

pub mod time;
pub mod emotion;
pub mod params;
pub mod pattern;
pub mod haptic;
pub mod error;

pub use time::*;
pub use emotion::*;
pub use params::*;
pub use pattern::*;
pub use haptic::*;
pub use error::*;
