//! Squash & stretch generators
//!
//! Every generator is a pure function of its inputs: no time-keeping, no
//! hidden state. Callers own playback timing.

use serde::{Deserialize, Serialize};

use crate::easing::lerp;

/// Scale change at full squash or stretch
const SQUASH_RANGE: f32 = 0.3;
/// Offset of the anticipation pose, in points
const ANTICIPATION_DISTANCE: f32 = 6.0;
/// Lean of the anticipation pose, in radians
const ANTICIPATION_LEAN: f32 = 0.05;

/// Blink segment boundaries
const BLINK_ANTICIPATION_END: f32 = 0.3;
const BLINK_CLOSED_START: f32 = 0.7;
/// Fully closed eye: flat and laterally over-stretched
const BLINK_CLOSED_X: f32 = 1.2;
const BLINK_CLOSED_Y: f32 = 0.1;

/// Deformation applied on top of a pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deformation {
    pub scale_x: f32,
    pub scale_y: f32,
    /// Radians
    pub rotation: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for Deformation {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl Deformation {
    pub const NEUTRAL: Deformation = Deformation {
        scale_x: 1.0,
        scale_y: 1.0,
        rotation: 0.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    pub fn scale(scale_x: f32, scale_y: f32) -> Self {
        Deformation {
            scale_x,
            scale_y,
            ..Self::NEUTRAL
        }
    }

    /// Layer another deformation on top: scales multiply, the rest adds
    pub fn combine(&self, other: &Deformation) -> Deformation {
        Deformation {
            scale_x: self.scale_x * other.scale_x,
            scale_y: self.scale_y * other.scale_y,
            rotation: self.rotation + other.rotation,
            offset_x: self.offset_x + other.offset_x,
            offset_y: self.offset_y + other.offset_y,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.approx_eq(&Self::NEUTRAL, 1e-6)
    }

    pub fn approx_eq(&self, other: &Deformation, eps: f32) -> bool {
        (self.scale_x - other.scale_x).abs() <= eps
            && (self.scale_y - other.scale_y).abs() <= eps
            && (self.rotation - other.rotation).abs() <= eps
            && (self.offset_x - other.offset_x).abs() <= eps
            && (self.offset_y - other.offset_y).abs() <= eps
    }
}

#[inline]
fn unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Widen and flatten, `amount` in [0, 1]
pub fn squash(amount: f32) -> Deformation {
    let k = unit(amount) * SQUASH_RANGE;
    Deformation::scale(1.0 + k, 1.0 - k)
}

/// Narrow and elongate, `amount` in [0, 1]
pub fn stretch(amount: f32) -> Deformation {
    let k = unit(amount) * SQUASH_RANGE;
    Deformation::scale(1.0 - k, 1.0 + k)
}

/// Small pre-motion pose opposite the eventual direction of travel
pub fn anticipation(dx: f32, dy: f32) -> Deformation {
    let len = (dx * dx + dy * dy).sqrt();
    if !len.is_finite() || len < 1e-6 {
        return Deformation::NEUTRAL;
    }
    let (ux, uy) = (dx / len, dy / len);
    Deformation {
        // Compress along the axis of travel
        scale_x: 1.0 - 0.05 * ux.abs() + 0.05 * uy.abs(),
        scale_y: 1.0 - 0.05 * uy.abs() + 0.05 * ux.abs(),
        rotation: -ux * ANTICIPATION_LEAN,
        offset_x: -ux * ANTICIPATION_DISTANCE,
        offset_y: -uy * ANTICIPATION_DISTANCE,
    }
}

/// Uniform over/under-scale for pop-and-settle, clamped to [0.5, 1.5]
pub fn overshoot(factor: f32) -> Deformation {
    let f = if factor.is_nan() { 1.0 } else { factor.clamp(0.5, 1.5) };
    Deformation::scale(f, f)
}

/// One squash → stretch cycle per phase period, gated by audio level
pub fn speech_animation(audio_level: f32, phase: f32) -> Deformation {
    let level = unit(audio_level);
    let phase = unit(phase);
    if phase < 0.5 {
        squash(level * (phase * 2.0))
    } else {
        stretch(level * (1.0 - (phase - 0.5) * 2.0))
    }
}

/// Eye deformation for `blink` in [0, 1] (0 = open, 1 = closed)
pub fn blink_animation(blink: f32) -> Deformation {
    let b = unit(blink);
    if b < BLINK_ANTICIPATION_END {
        // Eyes widen slightly before closing
        let t = b / BLINK_ANTICIPATION_END;
        Deformation::scale(1.0 - 0.05 * t, 1.0 + 0.05 * t)
    } else if b < BLINK_CLOSED_START {
        let t = (b - BLINK_ANTICIPATION_END) / (BLINK_CLOSED_START - BLINK_ANTICIPATION_END);
        Deformation::scale(lerp(0.95, BLINK_CLOSED_X, t), lerp(1.05, BLINK_CLOSED_Y, t))
    } else {
        Deformation::scale(BLINK_CLOSED_X, BLINK_CLOSED_Y)
    }
}

/// Surprise pop: squash → overshoot → undershoot → rest
pub fn surprise_animation(intensity: f32) -> [Deformation; 4] {
    let i = unit(intensity);
    [
        squash(i),
        overshoot(1.0 + 0.2 * i),
        overshoot(1.0 - 0.2 * i),
        Deformation::NEUTRAL,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_squash_stretch_are_opposite() {
        let s = squash(0.5);
        let t = stretch(0.5);
        assert!((s.scale_x - t.scale_y).abs() < 1e-6);
        assert!((s.scale_y - t.scale_x).abs() < 1e-6);
        assert!(s.scale_x > 1.0 && s.scale_y < 1.0);
    }

    #[test]
    fn test_speech_cycle_peaks() {
        let mid_squash = speech_animation(1.0, 0.49);
        assert!(mid_squash.scale_x > 1.25);

        let start_stretch = speech_animation(1.0, 0.5);
        assert!((start_stretch.scale_y - 1.3).abs() < 1e-5);

        assert!(speech_animation(1.0, 0.0).is_neutral());
        assert!(speech_animation(1.0, 1.0).is_neutral());
    }

    #[test]
    fn test_blink_segments() {
        let open = blink_animation(0.0);
        assert!(open.is_neutral());

        let anticipating = blink_animation(0.2);
        assert!(anticipating.scale_y > 1.0);

        let closed = blink_animation(0.9);
        assert_eq!(closed, Deformation::scale(1.2, 0.1));
    }

    #[test]
    fn test_blink_is_continuous() {
        let eps = 1e-3;
        let a = blink_animation(BLINK_ANTICIPATION_END - 1e-4);
        let b = blink_animation(BLINK_ANTICIPATION_END);
        assert!(a.approx_eq(&b, eps));

        let c = blink_animation(BLINK_CLOSED_START - 1e-4);
        let d = blink_animation(BLINK_CLOSED_START);
        assert!(c.approx_eq(&d, eps));
    }

    #[test]
    fn test_surprise_sequence() {
        let steps = surprise_animation(1.0);
        assert!(steps[0].scale_x > 1.0 && steps[0].scale_y < 1.0);
        assert!((steps[1].scale_x - 1.2).abs() < 1e-6);
        assert!((steps[2].scale_x - 0.8).abs() < 1e-6);
        assert!(steps[3].is_neutral());
    }

    #[test]
    fn test_anticipation_points_backwards() {
        let a = anticipation(10.0, 0.0);
        assert!(a.offset_x < 0.0);
        assert!(a.offset_y.abs() < 1e-6);
        assert!(anticipation(0.0, 0.0).is_neutral());
    }

    #[test]
    fn test_overshoot_clamped() {
        assert_eq!(overshoot(3.0), Deformation::scale(1.5, 1.5));
        assert_eq!(overshoot(0.1), Deformation::scale(0.5, 0.5));
    }

    #[test]
    fn test_combine_layers() {
        let c = squash(1.0).combine(&anticipation(0.0, 5.0));
        assert!((c.scale_x - 1.3 * 1.05).abs() < 1e-5);
        assert!(c.offset_y < 0.0);
    }

    proptest! {
        #[test]
        fn prop_silent_speech_is_neutral(phase in -1.0f32..2.0) {
            let d = speech_animation(0.0, phase);
            prop_assert_eq!(d.scale_x, 1.0);
            prop_assert_eq!(d.scale_y, 1.0);
        }

        #[test]
        fn prop_generators_are_deterministic(level in 0.0f32..=1.0, phase in 0.0f32..=1.0) {
            prop_assert_eq!(speech_animation(level, phase), speech_animation(level, phase));
            prop_assert_eq!(blink_animation(phase), blink_animation(phase));
            prop_assert_eq!(surprise_animation(level), surprise_animation(level));
        }
    }
}
