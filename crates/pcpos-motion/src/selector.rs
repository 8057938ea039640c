//! Motion pattern selection with change detection

use pcpos_core::{Mood, MovementPattern};

/// Result of one classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternSelection {
    pub pattern: MovementPattern,
    /// Differs from the previous classification
    pub changed: bool,
}

/// Classifies every tick, remembering only the previous pattern
#[derive(Debug, Clone, Default)]
pub struct MotionPatternSelector {
    previous: MovementPattern,
}

impl MotionPatternSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, mood: Mood, arousal: f32, curiosity: f32) -> PatternSelection {
        let pattern = MovementPattern::classify(mood, arousal, curiosity);
        let changed = pattern != self.previous;
        self.previous = pattern;
        PatternSelection { pattern, changed }
    }

    pub fn current(&self) -> MovementPattern {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = MovementPattern::default();
    }
}
