//! Companion configuration
//!
//! Every component keeps its own tuning struct; `CompanionConfig` bundles
//! them with the RNG seeds and loads from JSON. Missing fields fall back to
//! defaults.

use std::time::Duration;

use pcpos_core::{ensure_positive, PcposError, PcposResult};
use pcpos_motion::{HeadConfig, MovementConfig};
use pcpos_time::ClockConfig;
use pcpos_visual::CompositorConfig;
use serde::{Deserialize, Serialize};

/// Loop-level tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub clock: ClockConfig,
    /// Ticks slower than this are counted as overruns (120 Hz frame)
    pub tick_budget: Duration,
    /// Speech squash/stretch cycles per second
    pub speech_cycle_hz: f32,
    /// Spacing of gesture keyframes
    pub gesture_step: Duration,
    /// Base symbol size handed to the compositor
    pub symbol_size: f32,
    /// Pivot of the head projection, points from body center
    pub head_anchor: (f32, f32),
    /// Compositor rotation period at intensity 0
    pub calm_rotation_period: Duration,
    /// Compositor rotation period at intensity 1
    pub intense_rotation_period: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            clock: ClockConfig::default(),
            tick_budget: Duration::from_micros(8_300),
            speech_cycle_hz: 4.0,
            gesture_step: Duration::from_millis(100),
            symbol_size: 24.0,
            head_anchor: (0.0, -40.0),
            calm_rotation_period: Duration::from_secs(20),
            intense_rotation_period: Duration::from_secs(4),
        }
    }
}

impl RuntimeConfig {
    /// Rotation period for a motion intensity, linear between the two ends
    pub fn rotation_period(&self, intensity: f32) -> Duration {
        let i = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };
        let calm = self.calm_rotation_period.as_secs_f32();
        let intense = self.intense_rotation_period.as_secs_f32();
        Duration::from_secs_f32((calm + (intense - calm) * i).max(0.0))
    }

    pub fn validate(&self) -> PcposResult<()> {
        ensure_positive("runtime.speech_cycle_hz", self.speech_cycle_hz)?;
        ensure_positive("runtime.clock.target_hz", self.clock.target_hz)?;
        if self.tick_budget.is_zero() || self.gesture_step.is_zero() {
            return Err(PcposError::InvalidConfig(
                "runtime.tick_budget and runtime.gesture_step must be positive".into(),
            ));
        }
        if self.calm_rotation_period.is_zero() || self.intense_rotation_period.is_zero() {
            return Err(PcposError::InvalidConfig(
                "runtime rotation periods must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Complete companion configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    pub runtime: RuntimeConfig,
    pub movement: MovementConfig,
    pub head: HeadConfig,
    pub compositor: CompositorConfig,
    /// Seed for symbol placement
    pub compositor_seed: u64,
    /// Seed for symbol selection
    pub face_id_seed: u64,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        CompanionConfig {
            runtime: RuntimeConfig::default(),
            movement: MovementConfig::default(),
            head: HeadConfig::default(),
            compositor: CompositorConfig::default(),
            compositor_seed: 0x5eed,
            face_id_seed: 0xface,
        }
    }
}

impl CompanionConfig {
    /// Parse and validate
    pub fn from_json_str(json: &str) -> PcposResult<Self> {
        let config: CompanionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> PcposResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> PcposResult<()> {
        self.runtime.validate()?;
        self.movement.validate()?;
        self.head.validate()?;
        self.compositor.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CompanionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CompanionConfig::from_json_str(
            r#"{ "movement": { "smoothing": 0.2, "boundary_x": 70.0 }, "face_id_seed": 9 }"#,
        )
        .unwrap();
        assert_eq!(config.movement.smoothing, 0.2);
        assert_eq!(config.movement.boundary_x, 70.0);
        assert_eq!(config.movement.boundary_y, 40.0);
        assert_eq!(config.face_id_seed, 9);
        assert_eq!(config.head, HeadConfig::default());
    }

    #[test]
    fn test_rejects_bad_smoothing() {
        let err = CompanionConfig::from_json_str(r#"{ "movement": { "smoothing": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, PcposError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = CompanionConfig::from_json_str(
            r#"{ "head": { "constraints": { "pitch": { "min": 20.0, "max": -20.0 } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, PcposError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = CompanionConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, PcposError::ConfigParse(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = CompanionConfig::default();
        let json = config.to_json_string().unwrap();
        assert_eq!(CompanionConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_rotation_period_by_intensity() {
        let runtime = RuntimeConfig::default();
        assert_eq!(runtime.rotation_period(0.0), Duration::from_secs(20));
        assert_eq!(runtime.rotation_period(1.0), Duration::from_secs(4));
        let mid = runtime.rotation_period(0.5).as_secs_f32();
        assert!((mid - 12.0).abs() < 1e-3);
    }
}
