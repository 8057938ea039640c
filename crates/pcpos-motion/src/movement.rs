//! Avatar Movement Engine - body position, scale and squash/stretch
//!
//! Each tick the engine computes a target pose as a closed-form function of
//! elapsed time and the active pattern, then eases toward it with a
//! first-order exponential filter. That filter is the only integrator: it
//! converges without overshoot, so the body never rings.
//!
//! Stage order inside a tick is fixed:
//! target → smooth → velocity → deformation constraints → commit.

use std::time::Duration;

use pcpos_core::{
    cap_step, ensure_positive, ensure_unit_factor, Axis, HapticEvent, Mood, MovementPattern,
    PcposResult, SharedHapticSink, TickTime, MAX_TICK_STEP,
};
use pcpos_time::Scheduler;
use serde::{Deserialize, Serialize};

use crate::selector::MotionPatternSelector;

/// Deformation never leaves this range on either axis
pub const DEFORMATION_MIN: f32 = 0.5;
pub const DEFORMATION_MAX: f32 = 1.5;

/// Shake impulse spacing
const SHAKE_STEP: Duration = Duration::from_millis(100);
/// Relative magnitudes of the three shake impulses
const SHAKE_PROFILE: [f32; 3] = [1.0, -0.6, 0.3];

/// Movement engine configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Reference tick period the smoothing factors are tuned for
    pub tick_interval: Duration,
    /// Largest delta a single tick may integrate
    pub max_step: Duration,
    /// Position/scale smoothing per reference tick
    pub smoothing: f32,
    /// Deformation smoothing per reference tick (spring compliance)
    pub deformation_smoothing: f32,
    /// Deformation per point of speed
    pub velocity_sensitivity: f32,
    /// Cap on velocity-driven deformation
    pub max_velocity_deformation: f32,
    /// Horizontal boundary (points from center)
    pub boundary_x: f32,
    /// Vertical boundary (points from center)
    pub boundary_y: f32,
    /// Extra squash per point of penetration
    pub penetration_factor: f32,
    /// Axis speed (points per reference tick) needed to fire a collision
    pub collision_velocity_threshold: f32,
    /// First shake impulse offset in points
    pub shake_magnitude: f32,
    /// Multiplier on every pattern amplitude
    pub amplitude: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        MovementConfig {
            tick_interval: Duration::from_millis(50),
            max_step: MAX_TICK_STEP,
            smoothing: 0.1,
            deformation_smoothing: 0.3,
            velocity_sensitivity: 0.02,
            max_velocity_deformation: 0.3,
            boundary_x: 50.0,
            boundary_y: 40.0,
            penetration_factor: 0.05,
            collision_velocity_threshold: 2.0,
            shake_magnitude: 12.0,
            amplitude: 1.0,
        }
    }
}

impl MovementConfig {
    /// Bouncier body for expressive characters
    pub fn lively() -> Self {
        MovementConfig {
            smoothing: 0.15,
            deformation_smoothing: 0.4,
            velocity_sensitivity: 0.03,
            amplitude: 1.2,
            ..Self::default()
        }
    }

    /// Subdued body for reserved characters
    pub fn gentle() -> Self {
        MovementConfig {
            smoothing: 0.07,
            deformation_smoothing: 0.2,
            velocity_sensitivity: 0.012,
            amplitude: 0.7,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> PcposResult<()> {
        ensure_unit_factor("movement.smoothing", self.smoothing)?;
        ensure_unit_factor("movement.deformation_smoothing", self.deformation_smoothing)?;
        ensure_positive("movement.boundary_x", self.boundary_x)?;
        ensure_positive("movement.boundary_y", self.boundary_y)?;
        ensure_positive(
            "movement.tick_interval",
            self.tick_interval.as_secs_f32(),
        )?;
        ensure_positive("movement.max_step", self.max_step.as_secs_f32())?;
        if self.velocity_sensitivity < 0.0
            || self.penetration_factor < 0.0
            || self.collision_velocity_threshold < 0.0
            || self.amplitude < 0.0
        {
            return Err(pcpos_core::PcposError::InvalidConfig(
                "movement sensitivities, thresholds and amplitude must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Per-tick blend factor for `dt`, equal to `factor` at the reference
    /// period so behaviour does not depend on the display rate
    pub fn blend(&self, factor: f32, dt: Duration) -> f32 {
        let reference = self.tick_interval.as_secs_f32();
        if reference <= 0.0 {
            return factor.clamp(0.0, 1.0);
        }
        let ticks = dt.as_secs_f32() / reference;
        1.0 - (1.0 - factor.clamp(0.0, 1.0)).powf(ticks)
    }
}

/// Body pose owned by the movement engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementState {
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale: f32,
    pub deformation_x: f32,
    pub deformation_y: f32,
    pub last_offset_x: f32,
    pub last_offset_y: f32,
    pub last_scale: f32,
}

impl Default for MovementState {
    fn default() -> Self {
        Self::neutral()
    }
}

impl MovementState {
    pub fn neutral() -> Self {
        MovementState {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
            deformation_x: 1.0,
            deformation_y: 1.0,
            last_offset_x: 0.0,
            last_offset_y: 0.0,
            last_scale: 1.0,
        }
    }

    /// Per-tick velocity (current - last)
    pub fn velocity(&self) -> (f32, f32) {
        (
            self.offset_x - self.last_offset_x,
            self.offset_y - self.last_offset_y,
        )
    }

    /// Close the tick: last = current
    fn commit(&mut self) {
        self.last_offset_x = self.offset_x;
        self.last_offset_y = self.offset_y;
        self.last_scale = self.scale;
    }
}

/// Target pose for one instant of a pattern
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementTarget {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl MovementTarget {
    /// Closed-form target for `pattern` at `t` seconds
    pub fn for_pattern(pattern: MovementPattern, t: f32, amplitude: f32) -> MovementTarget {
        let a = amplitude;
        match pattern {
            MovementPattern::Idle => MovementTarget {
                x: 6.0 * a * (0.8 * t).sin(),
                y: 4.0 * a * (0.6 * t + 0.5).sin(),
                scale: 1.0 + 0.02 * a * (1.1 * t).sin(),
            },
            MovementPattern::Curious => MovementTarget {
                x: a * (22.0 * (1.3 * t).sin() + 6.0 * (3.1 * t).sin()),
                y: a * (10.0 * (0.9 * t).sin() - 4.0),
                scale: 1.03 + 0.03 * a * (1.7 * t).sin(),
            },
            MovementPattern::Energetic => MovementTarget {
                x: 80.0 * a * (2.0 * t).sin(),
                // Rectified bounce, floor at y = 0, upward is negative
                y: -36.0 * a * bounce_phase(t).abs(),
                scale: 1.05 + 0.06 * a * (10.0 * t).sin(),
            },
            MovementPattern::Calm => MovementTarget {
                x: 3.0 * a * (0.35 * t).sin(),
                y: 2.0 * a * (0.25 * t).sin(),
                scale: 0.98 + 0.01 * a * (0.5 * t).sin(),
            },
        }
    }
}

/// Unrectified energetic bounce; every sign change is a floor contact
#[inline]
fn bounce_phase(t: f32) -> f32 {
    (5.0 * t).sin()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ShakeImpulse {
    Offset(f32),
    Release,
}

/// Avatar Movement Engine
pub struct AvatarMovementEngine {
    config: MovementConfig,
    state: MovementState,
    selector: MotionPatternSelector,
    /// Engine-local timeline (drives pattern phases)
    elapsed: TickTime,
    /// Deformation the spring is pulling toward
    deformation_target: (f32, f32),
    /// Velocity measured in the last tick
    last_velocity: (f32, f32),
    /// Axis currently past its boundary
    penetrating: (bool, bool),
    /// Sign of the energetic bounce at the previous tick
    bounce_sign: Option<bool>,
    /// Shake gesture overlay, never fed back into the physics state
    shake_offset: f32,
    impulses: Scheduler<ShakeImpulse>,
    haptics: SharedHapticSink,
}

impl AvatarMovementEngine {
    pub fn new(config: MovementConfig, haptics: SharedHapticSink) -> Self {
        AvatarMovementEngine {
            config,
            state: MovementState::neutral(),
            selector: MotionPatternSelector::new(),
            elapsed: TickTime::ZERO,
            deformation_target: (1.0, 1.0),
            last_velocity: (0.0, 0.0),
            penetrating: (false, false),
            bounce_sign: None,
            shake_offset: 0.0,
            impulses: Scheduler::new(),
            haptics,
        }
    }

    /// Classify the movement pattern; fires one haptic per change
    pub fn update_movement(&mut self, mood: Mood, arousal: f32, curiosity: f32) -> MovementPattern {
        let selection = self.selector.select(mood, arousal, curiosity);
        if selection.changed {
            tracing::debug!(pattern = %selection.pattern, %mood, arousal, curiosity, "movement pattern changed");
            if selection.pattern == MovementPattern::Energetic {
                self.bounce_sign = None;
            }
            if selection.pattern != MovementPattern::Idle {
                self.haptics.emit(HapticEvent::PatternChanged {
                    pattern: selection.pattern,
                });
            }
        }
        selection.pattern
    }

    /// Advance the body by `dt`
    pub fn tick(&mut self, dt: Duration) -> &MovementState {
        let dt = cap_step(dt, self.config.max_step);
        if dt.is_zero() {
            return &self.state;
        }
        self.elapsed = self.elapsed + dt;

        // Gesture overlay first, it never touches the physics below
        self.process_impulses();

        // 1. Target
        let t = self.elapsed.as_secs_f32();
        let pattern = self.selector.current();
        let target = MovementTarget::for_pattern(pattern, t, self.config.amplitude);
        if pattern == MovementPattern::Energetic {
            self.detect_floor_contact(t);
        }

        // 2. Smooth
        let alpha = self.config.blend(self.config.smoothing, dt);
        self.state.offset_x += (target.x - self.state.offset_x) * alpha;
        self.state.offset_y += (target.y - self.state.offset_y) * alpha;
        self.state.scale += (target.scale - self.state.scale) * alpha;

        // 3. Velocity, normalised to the reference period
        let (vx, vy) = self.state.velocity();
        let per_reference = self.config.tick_interval.as_secs_f32() / dt.as_secs_f32();
        let velocity = (vx * per_reference, vy * per_reference);
        self.last_velocity = velocity;

        // 4. Constraints
        self.deformation_target = self.deformation_target_for(velocity.0, velocity.1);

        let beta = self.config.blend(self.config.deformation_smoothing, dt);
        self.state.deformation_x += (self.deformation_target.0 - self.state.deformation_x) * beta;
        self.state.deformation_y += (self.deformation_target.1 - self.state.deformation_y) * beta;

        // 5. Commit
        self.state.commit();
        tracing::trace!(elapsed = ?self.elapsed, x = self.state.offset_x, y = self.state.offset_y, "movement tick");
        &self.state
    }

    /// Target deformation for the current offsets and velocity.
    /// Fires a collision haptic on boundary entry above the speed threshold.
    fn deformation_target_for(&mut self, vx: f32, vy: f32) -> (f32, f32) {
        let cfg = &self.config;

        // Stretch along the dominant axis of travel, squash across it
        let speed = (vx * vx + vy * vy).sqrt();
        let k = (speed * cfg.velocity_sensitivity).min(cfg.max_velocity_deformation);
        let (mut dx, mut dy) = if vx.abs() >= vy.abs() {
            (1.0 + k, 1.0 - k)
        } else {
            (1.0 - k, 1.0 + k)
        };

        let pen_x = self.state.offset_x.abs() - cfg.boundary_x;
        let inside_x = pen_x > 0.0;
        if inside_x {
            let (squash, stretch) = penetration_deformation(pen_x, cfg.penetration_factor);
            dx = dx.min(squash);
            dy = dy.max(stretch);
            if !self.penetrating.0 && vx.abs() > cfg.collision_velocity_threshold {
                tracing::debug!(penetration = pen_x, speed = vx.abs(), "boundary collision (x)");
                self.haptics.emit(HapticEvent::Collision {
                    axis: Axis::X,
                    speed: vx.abs(),
                });
            }
        }
        self.penetrating.0 = inside_x;

        let pen_y = self.state.offset_y.abs() - cfg.boundary_y;
        let inside_y = pen_y > 0.0;
        if inside_y {
            let (squash, stretch) = penetration_deformation(pen_y, cfg.penetration_factor);
            dy = dy.min(squash);
            dx = dx.max(stretch);
            if !self.penetrating.1 && vy.abs() > cfg.collision_velocity_threshold {
                tracing::debug!(penetration = pen_y, speed = vy.abs(), "boundary collision (y)");
                self.haptics.emit(HapticEvent::Collision {
                    axis: Axis::Y,
                    speed: vy.abs(),
                });
            }
        }
        self.penetrating.1 = inside_y;

        (
            dx.clamp(DEFORMATION_MIN, DEFORMATION_MAX),
            dy.clamp(DEFORMATION_MIN, DEFORMATION_MAX),
        )
    }

    fn detect_floor_contact(&mut self, t: f32) {
        let sign = bounce_phase(t) >= 0.0;
        if let Some(previous) = self.bounce_sign {
            if previous != sign {
                self.haptics.emit(HapticEvent::FloorContact);
            }
        }
        self.bounce_sign = Some(sign);
    }

    /// Three decaying impulses at 0/100/200 ms, released at 300 ms
    pub fn trigger_shake(&mut self) {
        self.impulses.clear();
        let now = self.elapsed;
        let mut at = now;
        for factor in SHAKE_PROFILE {
            self.impulses
                .schedule_at(at, ShakeImpulse::Offset(self.config.shake_magnitude * factor));
            at = at + SHAKE_STEP;
        }
        self.impulses.schedule_at(at, ShakeImpulse::Release);
        tracing::debug!(at = ?now, "shake scheduled");
    }

    fn process_impulses(&mut self) {
        for impulse in self.impulses.drain_due(self.elapsed) {
            self.shake_offset = match impulse {
                ShakeImpulse::Offset(offset) => offset,
                ShakeImpulse::Release => 0.0,
            };
        }
    }

    /// Back to the neutral pose and idle pattern
    pub fn reset(&mut self) {
        self.state = MovementState::neutral();
        self.selector.reset();
        self.elapsed = TickTime::ZERO;
        self.deformation_target = (1.0, 1.0);
        self.last_velocity = (0.0, 0.0);
        self.penetrating = (false, false);
        self.bounce_sign = None;
        self.shake_offset = 0.0;
        self.impulses.clear();
    }

    pub fn state(&self) -> &MovementState {
        &self.state
    }

    pub fn pattern(&self) -> MovementPattern {
        self.selector.current()
    }

    pub fn elapsed(&self) -> TickTime {
        self.elapsed
    }

    /// Horizontal shake overlay in points
    pub fn shake_offset(&self) -> f32 {
        self.shake_offset
    }

    pub fn deformation_target(&self) -> (f32, f32) {
        self.deformation_target
    }

    /// Velocity of the last tick, in points per reference tick
    pub fn velocity(&self) -> (f32, f32) {
        self.last_velocity
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }
}

/// (squash, stretch) for a penetration depth, each within [0.5, 1.5]
pub fn penetration_deformation(penetration: f32, factor: f32) -> (f32, f32) {
    let amount = penetration.max(0.0) * factor;
    (
        (1.0 - amount).max(DEFORMATION_MIN),
        (1.0 + amount).min(DEFORMATION_MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcpos_core::RecordingSink;
    use proptest::prelude::*;
    use std::sync::Arc;

    const TICK: Duration = Duration::from_millis(50);

    fn engine() -> (AvatarMovementEngine, Arc<RecordingSink>) {
        let sink = RecordingSink::shared();
        let engine = AvatarMovementEngine::new(MovementConfig::default(), sink.clone());
        (engine, sink)
    }

    fn collisions(sink: &RecordingSink) -> usize {
        sink.events()
            .iter()
            .filter(|e| matches!(e, HapticEvent::Collision { .. }))
            .count()
    }

    #[test]
    fn test_last_equals_current_after_tick() {
        let (mut engine, _) = engine();
        engine.update_movement(Mood::Happy, 0.3, 0.8);
        for _ in 0..10 {
            let state = *engine.tick(TICK);
            assert_eq!(state.offset_x, state.last_offset_x);
            assert_eq!(state.offset_y, state.last_offset_y);
            assert_eq!(state.scale, state.last_scale);
        }
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let (mut engine, _) = engine();
        engine.update_movement(Mood::Excited, 0.9, 0.0);
        for _ in 0..7 {
            engine.tick(TICK);
        }
        let before = *engine.state();
        let target_before = engine.deformation_target();
        engine.tick(Duration::ZERO);
        assert_eq!(*engine.state(), before);
        assert_eq!(engine.deformation_target(), target_before);
    }

    #[test]
    fn test_pattern_change_haptic_is_edge_triggered() {
        let (mut engine, sink) = engine();
        engine.update_movement(Mood::Excited, 0.9, 0.0);
        engine.update_movement(Mood::Excited, 0.85, 0.0);
        assert_eq!(
            sink.events(),
            vec![HapticEvent::PatternChanged {
                pattern: MovementPattern::Energetic
            }]
        );
    }

    #[test]
    fn test_no_haptic_for_idle() {
        let (mut engine, sink) = engine();
        engine.update_movement(Mood::Neutral, 0.0, 0.0);
        engine.update_movement(Mood::Excited, 0.9, 0.0);
        engine.update_movement(Mood::Neutral, 0.0, 0.0);
        assert_eq!(sink.len(), 1);
        assert_eq!(engine.pattern(), MovementPattern::Idle);
    }

    #[test]
    fn test_smoothing_converges_without_overshoot() {
        let mut state = 0.0f32;
        let cfg = MovementConfig::default();
        let alpha = cfg.blend(cfg.smoothing, TICK);
        assert!((alpha - 0.1).abs() < 1e-5);
        for _ in 0..200 {
            state += (10.0 - state) * alpha;
            assert!(state <= 10.0);
        }
        assert!((state - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_blend_is_rate_independent() {
        let cfg = MovementConfig::default();
        let one_big = cfg.blend(0.1, Duration::from_millis(50));
        let small = cfg.blend(0.1, Duration::from_millis(25));
        let two_small = 1.0 - (1.0 - small) * (1.0 - small);
        assert!((one_big - two_small).abs() < 1e-5);
    }

    #[test]
    fn test_boundary_collision_above_threshold() {
        let (mut engine, sink) = engine();
        engine.state.offset_x = 60.0;
        engine.state.last_offset_x = 57.0;

        let (vx, vy) = engine.state.velocity();
        let (dx, dy) = engine.deformation_target_for(vx, vy);

        let penetration = 60.0 - engine.config.boundary_x;
        let expected = (1.0 - penetration * 0.05).max(0.5);
        assert!(dx <= expected + 1e-6, "dx {dx} expected <= {expected}");
        assert!(dy >= 1.0);
        assert_eq!(collisions(&sink), 1);

        // Still penetrating on the next evaluation: no second event
        engine.deformation_target_for(vx, vy);
        assert_eq!(collisions(&sink), 1);
    }

    #[test]
    fn test_boundary_penetration_below_threshold_is_silent() {
        let (mut engine, sink) = engine();
        engine.state.offset_x = -55.0;
        engine.state.last_offset_x = -54.0;

        let (vx, vy) = engine.state.velocity();
        let (dx, _) = engine.deformation_target_for(vx, vy);
        assert!(dx <= 0.75 + 1e-6);
        assert_eq!(collisions(&sink), 0);
    }

    #[test]
    fn test_deep_penetration_clamps() {
        assert_eq!(penetration_deformation(100.0, 0.05), (0.5, 1.5));
        assert_eq!(penetration_deformation(-3.0, 0.05), (1.0, 1.0));
    }

    #[test]
    fn test_energetic_reaches_boundary_and_collides() {
        let (mut engine, sink) = engine();
        engine.update_movement(Mood::Excited, 0.9, 0.0);
        let mut max_x = 0.0f32;
        for _ in 0..200 {
            let state = engine.tick(TICK);
            max_x = max_x.max(state.offset_x.abs());
        }
        assert!(max_x > engine.config.boundary_x, "max_x {max_x}");
        assert!(collisions(&sink) >= 1);
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e, HapticEvent::FloorContact)));
    }

    #[test]
    fn test_deformation_stays_in_range() {
        let (mut engine, _) = engine();
        engine.update_movement(Mood::Excited, 1.0, 0.0);
        for _ in 0..400 {
            let s = engine.tick(TICK);
            assert!((DEFORMATION_MIN..=DEFORMATION_MAX).contains(&s.deformation_x));
            assert!((DEFORMATION_MIN..=DEFORMATION_MAX).contains(&s.deformation_y));
        }
    }

    #[test]
    fn test_large_dt_is_capped() {
        let (mut engine, _) = engine();
        engine.tick(Duration::from_secs(10));
        assert_eq!(engine.elapsed(), TickTime::from_millis(100));
    }

    #[test]
    fn test_shake_sequence() {
        let (mut engine, _) = engine();
        engine.trigger_shake();

        engine.tick(Duration::from_millis(10));
        assert_eq!(engine.shake_offset(), 12.0);

        engine.tick(Duration::from_millis(100));
        assert!((engine.shake_offset() + 7.2).abs() < 1e-5);

        engine.tick(Duration::from_millis(100));
        assert!((engine.shake_offset() - 3.6).abs() < 1e-5);

        engine.tick(Duration::from_millis(100));
        assert_eq!(engine.shake_offset(), 0.0);
    }

    #[test]
    fn test_shake_does_not_move_body() {
        let (mut a, _) = engine();
        let (mut b, _) = engine();
        b.trigger_shake();
        for _ in 0..8 {
            a.tick(TICK);
            b.tick(TICK);
        }
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_reset_returns_to_neutral() {
        let (mut engine, _) = engine();
        engine.update_movement(Mood::Excited, 0.9, 0.0);
        for _ in 0..20 {
            engine.tick(TICK);
        }
        engine.reset();
        assert_eq!(*engine.state(), MovementState::neutral());
        assert_eq!(engine.pattern(), MovementPattern::Idle);
    }

    #[test]
    fn test_config_validation() {
        assert!(MovementConfig::default().validate().is_ok());
        assert!(MovementConfig::lively().validate().is_ok());
        assert!(MovementConfig::gentle().validate().is_ok());

        let bad = MovementConfig {
            smoothing: 0.0,
            ..MovementConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_zero_dt_never_moves(ticks in 0usize..40, arousal in -1.0f32..1.0, curiosity in 0.0f32..1.0) {
            let (mut engine, _) = engine();
            engine.update_movement(Mood::Happy, arousal, curiosity);
            for _ in 0..ticks {
                engine.tick(TICK);
            }
            let before = *engine.state();
            engine.tick(Duration::ZERO);
            prop_assert_eq!(*engine.state(), before);
        }
    }
}
