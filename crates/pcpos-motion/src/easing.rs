//! Easing curves over normalized progress

use std::f32::consts::PI;

/// Overshoot amount for the back curve (~10% past the target)
const BACK_OVERSHOOT: f32 = 1.701_58;
/// Natural frequency of the spring curve over normalized time
const SPRING_OMEGA: f32 = 14.0;

/// Interpolation curve, maps progress [0, 1] to eased progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear,
    /// Decelerating quadratic
    EaseOut,
    /// Sine in-out
    EaseInOut,
    /// Passes the target then settles back
    Back,
    /// Damped spring, `damping` is the damping ratio (0, 1)
    Spring { damping: f32 },
}

impl Curve {
    /// Evaluate at `t`, clamped into [0, 1]
    /// Starts at exactly 0 and ends at exactly 1
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Curve::Linear => t,
            Curve::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Curve::EaseInOut => -((PI * t).cos() - 1.0) * 0.5,
            Curve::Back => {
                let u = t - 1.0;
                1.0 + (BACK_OVERSHOOT + 1.0) * u * u * u + BACK_OVERSHOOT * u * u
            }
            Curve::Spring { damping } => spring(t, damping),
        }
    }

    /// Soft spring used for tilts
    pub fn bouncy() -> Self {
        Curve::Spring { damping: 0.45 }
    }

    /// Heavily damped spring used for returning to rest
    pub fn damped() -> Self {
        Curve::Spring { damping: 0.8 }
    }
}

fn spring(t: f32, damping: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let zeta = damping.clamp(0.05, 0.99);
    let wd = SPRING_OMEGA * (1.0 - zeta * zeta).sqrt();
    let decay = (-zeta * SPRING_OMEGA * t).exp();
    1.0 - decay * ((wd * t).cos() + (zeta * SPRING_OMEGA / wd) * (wd * t).sin())
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
