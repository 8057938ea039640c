//! Expression parameters - what the renderer paints the face with
//!
//! The core writes these every tick; the rendering front-end owns how they
//! are drawn.

use serde::{Deserialize, Serialize};

use crate::emotion::clamp_unit;
use crate::PadEmotion;

/// Color in RGB (0.0 - 1.0 range)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Build from a packed 0xRRGGBB value
    pub fn from_hex(rgb: u32) -> Self {
        Self::new(
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
        )
    }

    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    pub fn clamped(&self) -> Color {
        Color::new(clamp_unit(self.r), clamp_unit(self.g), clamp_unit(self.b))
    }
}

/// Tint used at full displeasure
const COOL_TINT: Color = Color::new(0.35, 0.55, 1.0);
/// Tint used at full pleasure
const WARM_TINT: Color = Color::new(1.0, 0.7, 0.35);

/// Continuous facial expression parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationParams {
    /// Eye openness [0, 1]
    pub eye_open: f32,
    /// Brow raise [0, 1]
    pub brow_raise: f32,
    /// Mouth curve [-1 frown, 1 smile]
    pub mouth_smile: f32,
    /// Mouth openness [0, 1]
    pub mouth_open: f32,
    /// Head tilt [-1 left, 1 right]
    pub head_tilt: f32,
    /// Glow strength, >= 0
    pub glow: f32,
    /// Body tint
    pub color_tint: Color,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            eye_open: 0.6,
            brow_raise: 0.35,
            mouth_smile: 0.0,
            mouth_open: 0.0,
            head_tilt: 0.0,
            glow: 0.5,
            color_tint: COOL_TINT.lerp(&WARM_TINT, 0.5),
        }
    }
}

impl AnimationParams {
    /// Derive expression parameters from emotion and the live speech level
    pub fn from_emotion(pad: &PadEmotion, audio_level: f32) -> Self {
        let pad = pad.clamped();
        let audio = clamp_unit(audio_level);
        let (p, a, d) = (pad.pleasure, pad.arousal, pad.dominance);

        AnimationParams {
            eye_open: 0.6 + a * 0.35,
            brow_raise: 0.35 + a * 0.25 - d * 0.15,
            mouth_smile: p * 0.8 + d * 0.1,
            mouth_open: audio * 0.9 + a.max(0.0) * 0.1,
            // Submissive moods tilt the head
            head_tilt: -d * 0.4,
            glow: 0.5 + a * 0.5 + audio * 0.3,
            color_tint: COOL_TINT.lerp(&WARM_TINT, (p + 1.0) * 0.5),
        }
        .clamped()
    }

    /// Force every field into its own domain
    pub fn clamped(&self) -> Self {
        AnimationParams {
            eye_open: clamp_unit(self.eye_open),
            brow_raise: clamp_unit(self.brow_raise),
            mouth_smile: clamp_signed(self.mouth_smile),
            mouth_open: clamp_unit(self.mouth_open),
            head_tilt: clamp_signed(self.head_tilt),
            glow: if self.glow.is_nan() { 0.0 } else { self.glow.max(0.0) },
            color_tint: self.color_tint.clamped(),
        }
    }
}

#[inline]
fn clamp_signed(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_happy_smiles_sad_frowns() {
        let happy = AnimationParams::from_emotion(&PadEmotion::new(0.9, 0.3, 0.0), 0.0);
        let sad = AnimationParams::from_emotion(&PadEmotion::new(-0.9, -0.3, 0.0), 0.0);
        assert!(happy.mouth_smile > 0.5, "got {}", happy.mouth_smile);
        assert!(sad.mouth_smile < -0.5, "got {}", sad.mouth_smile);
        assert!(happy.color_tint.r > sad.color_tint.r);
    }

    #[test]
    fn test_speech_opens_mouth() {
        let quiet = AnimationParams::from_emotion(&PadEmotion::neutral(), 0.0);
        let loud = AnimationParams::from_emotion(&PadEmotion::neutral(), 1.0);
        assert_eq!(quiet.mouth_open, 0.0);
        assert!(loud.mouth_open > 0.8);
        assert!(loud.glow > quiet.glow);
    }

    #[test]
    fn test_clamped_fixes_out_of_range() {
        let raw = AnimationParams {
            eye_open: 3.0,
            brow_raise: -1.0,
            mouth_smile: -7.0,
            mouth_open: f32::NAN,
            head_tilt: 2.0,
            glow: -4.0,
            color_tint: Color::new(2.0, -1.0, 0.5),
        };
        let c = raw.clamped();
        assert_eq!(c.eye_open, 1.0);
        assert_eq!(c.brow_raise, 0.0);
        assert_eq!(c.mouth_smile, -1.0);
        assert_eq!(c.mouth_open, 0.0);
        assert_eq!(c.head_tilt, 1.0);
        assert_eq!(c.glow, 0.0);
        assert_eq!(c.color_tint, Color::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex(0xff8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    proptest! {
        #[test]
        fn prop_params_always_in_domain(
            p in -1.0f32..=1.0,
            a in -1.0f32..=1.0,
            d in -1.0f32..=1.0,
            level in -1.0f32..2.0,
        ) {
            let params = AnimationParams::from_emotion(&PadEmotion::new(p, a, d), level);
            prop_assert!((0.0..=1.0).contains(&params.eye_open));
            prop_assert!((0.0..=1.0).contains(&params.brow_raise));
            prop_assert!((0.0..=1.0).contains(&params.mouth_open));
            prop_assert!((-1.0..=1.0).contains(&params.mouth_smile));
            prop_assert!((-1.0..=1.0).contains(&params.head_tilt));
            prop_assert!(params.glow >= 0.0);
        }
    }
}
