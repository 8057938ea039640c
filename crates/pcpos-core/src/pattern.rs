//! Movement pattern classification

use serde::{Deserialize, Serialize};

use crate::Mood;

/// Arousal above which the avatar becomes energetic
pub const ENERGETIC_AROUSAL: f32 = 0.7;
/// Curiosity above which the avatar explores
pub const CURIOUS_TRAIT: f32 = 0.6;
/// Mood energy below which the avatar calms down
pub const CALM_ENERGY: f32 = 0.3;

/// Named body movement pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPattern {
    #[default]
    Idle,
    Curious,
    Energetic,
    Calm,
}

impl MovementPattern {
    /// Classify by priority: arousal, then curiosity, then mood energy
    pub fn classify(mood: Mood, arousal: f32, curiosity: f32) -> MovementPattern {
        if arousal > ENERGETIC_AROUSAL {
            MovementPattern::Energetic
        } else if curiosity > CURIOUS_TRAIT {
            MovementPattern::Curious
        } else if mood.energy() < CALM_ENERGY {
            MovementPattern::Calm
        } else {
            MovementPattern::Idle
        }
    }

    /// All patterns
    pub fn all() -> &'static [MovementPattern] {
        &[
            MovementPattern::Idle,
            MovementPattern::Curious,
            MovementPattern::Energetic,
            MovementPattern::Calm,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            MovementPattern::Idle => "idle",
            MovementPattern::Curious => "curious",
            MovementPattern::Energetic => "energetic",
            MovementPattern::Calm => "calm",
        }
    }
}

impl std::fmt::Display for MovementPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arousal_wins_over_curiosity() {
        assert_eq!(
            MovementPattern::classify(Mood::Calm, 0.9, 0.9),
            MovementPattern::Energetic
        );
    }

    #[test]
    fn test_curiosity_wins_over_mood() {
        assert_eq!(
            MovementPattern::classify(Mood::Bored, 0.2, 0.7),
            MovementPattern::Curious
        );
    }

    #[test]
    fn test_low_energy_is_calm() {
        assert_eq!(
            MovementPattern::classify(Mood::Sad, 0.0, 0.1),
            MovementPattern::Calm
        );
        assert_eq!(
            MovementPattern::classify(Mood::Happy, 0.0, 0.1),
            MovementPattern::Idle
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(
            MovementPattern::classify(Mood::Neutral, ENERGETIC_AROUSAL, CURIOUS_TRAIT),
            MovementPattern::Idle
        );
    }
}
