//! Emotion State - Pleasure/Arousal/Dominance as continuous state
//!
//! Producers (speech level, vision, chat sentiment) overwrite this at their
//! own rate. The animation core only reads it, once per tick.

use serde::{Deserialize, Serialize};

/// Radius in the pleasure/arousal plane treated as "no particular mood"
const NEUTRAL_DEAD_ZONE: f32 = 0.15;

/// PAD emotion triple, every axis in [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PadEmotion {
    /// Pleasure / valence
    pub pleasure: f32,
    /// Arousal / activation
    pub arousal: f32,
    /// Dominance / control
    pub dominance: f32,
}

impl PadEmotion {
    /// Create a PAD triple, clamping each axis into [-1, 1]
    pub fn new(pleasure: f32, arousal: f32, dominance: f32) -> Self {
        Self {
            pleasure: clamp_axis(pleasure),
            arousal: clamp_axis(arousal),
            dominance: clamp_axis(dominance),
        }
    }

    /// Neutral emotion
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Re-clamp every axis (fields are public, producers may write raw values)
    pub fn clamped(&self) -> Self {
        Self::new(self.pleasure, self.arousal, self.dominance)
    }

    /// Blend toward another emotion
    pub fn blend(&self, other: &PadEmotion, factor: f32) -> PadEmotion {
        let f = factor.clamp(0.0, 1.0);
        PadEmotion::new(
            self.pleasure + (other.pleasure - self.pleasure) * f,
            self.arousal + (other.arousal - self.arousal) * f,
            self.dominance + (other.dominance - self.dominance) * f,
        )
    }

    /// Discrete mood label for this triple
    pub fn mood(&self) -> Mood {
        Mood::from_pad(self)
    }
}

#[inline]
fn clamp_axis(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}

/// Discrete mood label derived from PAD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Neutral,
    Happy,
    Excited,
    Content,
    Calm,
    Sad,
    Bored,
    Angry,
    Anxious,
}

impl Mood {
    /// Classify a PAD triple
    pub fn from_pad(pad: &PadEmotion) -> Mood {
        let pad = pad.clamped();
        let (p, a) = (pad.pleasure, pad.arousal);

        if (p * p + a * a).sqrt() < NEUTRAL_DEAD_ZONE {
            return Mood::Neutral;
        }

        if p >= 0.0 {
            if a >= 0.4 {
                Mood::Excited
            } else if a >= -0.2 {
                Mood::Happy
            } else if a >= -0.5 {
                Mood::Content
            } else {
                Mood::Calm
            }
        } else if a >= 0.2 {
            // Dominance decides between fight and flight
            if pad.dominance >= 0.0 {
                Mood::Angry
            } else {
                Mood::Anxious
            }
        } else if a < -0.5 {
            Mood::Bored
        } else {
            Mood::Sad
        }
    }

    /// Activation level of the mood in [0, 1]
    pub fn energy(self) -> f32 {
        match self {
            Mood::Excited => 0.95,
            Mood::Angry => 0.85,
            Mood::Anxious => 0.75,
            Mood::Happy => 0.65,
            Mood::Neutral => 0.5,
            Mood::Content => 0.35,
            Mood::Sad => 0.25,
            Mood::Calm => 0.2,
            Mood::Bored => 0.1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
            Mood::Excited => "excited",
            Mood::Content => "content",
            Mood::Calm => "calm",
            Mood::Sad => "sad",
            Mood::Bored => "bored",
            Mood::Angry => "angry",
            Mood::Anxious => "anxious",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything external producers feed into the animation core
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionState {
    /// Current PAD triple
    pub pad: PadEmotion,
    /// Personality trait driving exploratory motion [0, 1]
    pub curiosity: f32,
    /// Instantaneous speech level [0, 1]
    pub audio_level: f32,
}

impl EmotionState {
    pub fn new(pad: PadEmotion, curiosity: f32, audio_level: f32) -> Self {
        Self {
            pad: pad.clamped(),
            curiosity: clamp_unit(curiosity),
            audio_level: clamp_unit(audio_level),
        }
    }

    /// Copy with every field forced into its domain
    pub fn clamped(&self) -> Self {
        Self::new(self.pad, self.curiosity, self.audio_level)
    }

    pub fn mood(&self) -> Mood {
        self.pad.mood()
    }
}

#[inline]
pub(crate) fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
