//! PCPOS Motion - the avatar's body and head
//!
//! Motion is STATE integrated on the shared timeline, not canned clips:
//! - Pattern selection from mood, arousal and curiosity
//! - Exponential smoothing toward closed-form pattern targets
//! - Velocity squash/stretch and boundary collision response
//! - Constrained pitch/yaw/roll with anticipation, overshoot and settle
//! - Pure deformation generators for speech, blink and surprise gestures

pub mod affine;
pub mod easing;
pub mod head;
pub mod movement;
pub mod selector;
pub mod squash;

pub use affine::*;
pub use easing::*;
pub use head::*;
pub use movement::*;
pub use selector::*;
pub use squash::*;
