//! Haptic side channel
//!
//! The core never talks to a platform haptics engine. Components emit
//! one-shot `HapticEvent`s into an injected `HapticSink`; the mapper turns
//! events and PAD into abstract `HapticPattern` descriptors that a platform
//! layer can play.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::{MovementPattern, PadEmotion};

/// Body axis an event happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

/// One-shot haptic trigger emitted by an animation component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum HapticEvent {
    /// Movement pattern changed (never emitted for idle)
    PatternChanged { pattern: MovementPattern },
    /// Body hit the movement boundary
    Collision { axis: Axis, speed: f32 },
    /// Energetic bounce touched the floor
    FloorContact,
    /// Head nod gesture started
    HeadNod,
    /// Lock/scan/unlock state changed
    StateTransition { intensity: f32 },
}

/// Receiver for haptic events
pub trait HapticSink: Send + Sync {
    fn emit(&self, event: HapticEvent);
}

/// Shared sink handle injected into components
pub type SharedHapticSink = Arc<dyn HapticSink>;

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl HapticSink for NullSink {
    fn emit(&self, _event: HapticEvent) {}
}

/// Sink that buffers events until drained
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<HapticEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<HapticEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Copy of the recorded events
    pub fn events(&self) -> Vec<HapticEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl HapticSink for RecordingSink {
    fn emit(&self, event: HapticEvent) {
        tracing::trace!(?event, "haptic event");
        self.events.lock().push(event);
    }
}

/// Feel of a haptic pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticStyle {
    /// Steady double pulse, neutral presence
    Heartbeat,
    /// Soft rolling pulses, content
    Purr,
    /// Quick light taps, delight
    Sparkle,
    /// Single sharp hit, agitation
    Jolt,
    /// Fast faint pulses, nervousness
    Flutter,
    /// Slow heavy pulse, low mood
    Thud,
    /// Crisp impact
    Impact,
    /// Selection tick
    Tick,
}

/// Abstract haptic pattern descriptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HapticPattern {
    pub style: HapticStyle,
    /// Strength [0, 1]
    pub intensity: f32,
    /// Crispness [0, 1]
    pub sharpness: f32,
    /// Number of pulses
    pub pulses: u8,
    /// Gap between pulses
    pub interval: Duration,
}

impl HapticPattern {
    pub fn new(style: HapticStyle, intensity: f32, sharpness: f32, pulses: u8, interval_ms: u64) -> Self {
        Self {
            style,
            intensity: intensity.clamp(0.0, 1.0),
            sharpness: sharpness.clamp(0.0, 1.0),
            pulses: pulses.max(1),
            interval: Duration::from_millis(interval_ms),
        }
    }

    /// Copy with intensity scaled by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            intensity: (self.intensity * factor).clamp(0.0, 1.0),
            ..*self
        }
    }
}

/// Maps emotion and engine events to haptic descriptors
#[derive(Debug, Clone, Copy)]
pub struct HapticMoodMapper {
    /// Floor for mapped intensity so quiet moods still register
    pub min_intensity: f32,
}

impl Default for HapticMoodMapper {
    fn default() -> Self {
        Self { min_intensity: 0.2 }
    }
}

impl HapticMoodMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick a pattern for a PAD triple
    pub fn map(&self, pad: &PadEmotion) -> HapticPattern {
        let pad = pad.clamped();
        let (p, a, d) = (pad.pleasure, pad.arousal, pad.dominance);

        let intensity = ((a + 1.0) * 0.5).max(self.min_intensity);
        let sharpness = (d + 1.0) * 0.5;

        if p.abs() < 0.2 && a.abs() < 0.2 {
            return HapticPattern::new(HapticStyle::Heartbeat, intensity, sharpness, 2, 180);
        }

        match (p >= 0.0, a >= 0.0) {
            (true, true) => HapticPattern::new(HapticStyle::Sparkle, intensity, sharpness, 3, 60),
            (true, false) => HapticPattern::new(HapticStyle::Purr, intensity, sharpness * 0.5, 4, 120),
            (false, true) if d >= 0.0 => {
                HapticPattern::new(HapticStyle::Jolt, intensity, sharpness.max(0.7), 1, 0)
            }
            (false, true) => HapticPattern::new(HapticStyle::Flutter, intensity * 0.7, sharpness, 5, 40),
            (false, false) => HapticPattern::new(HapticStyle::Thud, intensity, 0.2, 1, 0),
        }
    }

    /// Pattern for an engine event, coloured by the current emotion
    pub fn pattern_for(&self, event: &HapticEvent, pad: &PadEmotion) -> HapticPattern {
        match *event {
            HapticEvent::PatternChanged { pattern } => match pattern {
                MovementPattern::Energetic => HapticPattern::new(HapticStyle::Sparkle, 0.8, 0.8, 2, 50),
                MovementPattern::Curious => HapticPattern::new(HapticStyle::Tick, 0.5, 0.6, 2, 90),
                MovementPattern::Calm => HapticPattern::new(HapticStyle::Purr, 0.3, 0.2, 2, 200),
                MovementPattern::Idle => HapticPattern::new(HapticStyle::Tick, 0.2, 0.3, 1, 0),
            },
            HapticEvent::Collision { speed, .. } => {
                HapticPattern::new(HapticStyle::Impact, 0.4 + speed * 0.1, 0.9, 1, 0)
            }
            HapticEvent::FloorContact => HapticPattern::new(HapticStyle::Impact, 0.35, 0.5, 1, 0),
            HapticEvent::HeadNod => HapticPattern::new(HapticStyle::Tick, 0.3, 0.4, 1, 0),
            HapticEvent::StateTransition { intensity } => {
                self.map(pad).scaled(0.5 + intensity.clamp(0.0, 1.0) * 0.5)
            }
        }
    }
}
