//! Head Rotation Controller - constrained pitch/yaw/roll
//!
//! Rotation is independent of body position. Each axis owns a track of timed
//! segments on the controller's own clock; `tick` samples the tracks and
//! clamps the result, so no frame can leave the constraint box even while a
//! curve overshoots.

use std::collections::VecDeque;
use std::time::Duration;

use pcpos_core::{
    cap_step, HapticEvent, PcposError, PcposResult, SharedHapticSink, TickTime, MAX_TICK_STEP,
};
use pcpos_time::Scheduler;
use serde::{Deserialize, Serialize};

use crate::affine::AffineTransform;
use crate::easing::{lerp, Curve};

// ============================================================================
// CONSTRAINTS
// ============================================================================

/// Closed range of allowed angles, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f32,
    pub max: f32,
}

impl AxisRange {
    pub fn symmetric(limit: f32) -> Self {
        AxisRange {
            min: -limit,
            max: limit,
        }
    }

    /// Never panics, even on an unvalidated inverted range
    pub fn clamp(&self, degrees: f32) -> f32 {
        let degrees = if degrees.is_nan() { 0.0 } else { degrees };
        degrees.max(self.min).min(self.max)
    }

    pub fn contains(&self, degrees: f32) -> bool {
        degrees >= self.min && degrees <= self.max
    }
}

/// Per-axis limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConstraints {
    pub pitch: AxisRange,
    pub yaw: AxisRange,
    pub roll: AxisRange,
}

impl Default for RotationConstraints {
    fn default() -> Self {
        RotationConstraints {
            pitch: AxisRange::symmetric(30.0),
            yaw: AxisRange::symmetric(45.0),
            roll: AxisRange::symmetric(15.0),
        }
    }
}

impl RotationConstraints {
    pub fn range(&self, axis: HeadAxis) -> AxisRange {
        match axis {
            HeadAxis::Pitch => self.pitch,
            HeadAxis::Yaw => self.yaw,
            HeadAxis::Roll => self.roll,
        }
    }

    pub fn clamp(&self, transform: &HeadTransform) -> HeadTransform {
        HeadTransform {
            pitch: self.pitch.clamp(transform.pitch),
            yaw: self.yaw.clamp(transform.yaw),
            roll: self.roll.clamp(transform.roll),
        }
    }

    pub fn contains(&self, transform: &HeadTransform) -> bool {
        self.pitch.contains(transform.pitch)
            && self.yaw.contains(transform.yaw)
            && self.roll.contains(transform.roll)
    }

    pub fn validate(&self) -> PcposResult<()> {
        for axis in HeadAxis::ALL {
            let range = self.range(axis);
            if !(range.min <= 0.0 && range.max >= 0.0 && range.min < range.max) {
                return Err(PcposError::InvalidConfig(format!(
                    "{axis:?} range [{}, {}] must be ordered and contain 0",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadAxis {
    Pitch,
    Yaw,
    Roll,
}

impl HeadAxis {
    pub const ALL: [HeadAxis; 3] = [HeadAxis::Pitch, HeadAxis::Yaw, HeadAxis::Roll];

    fn index(self) -> usize {
        match self {
            HeadAxis::Pitch => 0,
            HeadAxis::Yaw => 1,
            HeadAxis::Roll => 2,
        }
    }
}

/// Head orientation in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadTransform {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl HeadTransform {
    pub const NEUTRAL: HeadTransform = HeadTransform {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        HeadTransform { pitch, yaw, roll }
    }

    pub fn get(&self, axis: HeadAxis) -> f32 {
        match axis {
            HeadAxis::Pitch => self.pitch,
            HeadAxis::Yaw => self.yaw,
            HeadAxis::Roll => self.roll,
        }
    }

    pub fn set(&mut self, axis: HeadAxis, degrees: f32) {
        match axis {
            HeadAxis::Pitch => self.pitch = degrees,
            HeadAxis::Yaw => self.yaw = degrees,
            HeadAxis::Roll => self.roll = degrees,
        }
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Head animation tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadConfig {
    pub constraints: RotationConstraints,
    /// Share of the distance moved backwards during anticipation
    pub anticipation_ratio: f32,
    pub anticipation_duration: Duration,
    pub settle_duration: Duration,
    /// Share of `turn_head` duration spent anticipating
    pub turn_anticipation_share: f32,
    /// Secondary roll at full yaw, degrees
    pub turn_roll: f32,
    /// Nod pitch, degrees
    pub nod_angle: f32,
    pub nod_return_duration: Duration,
    pub reset_duration: Duration,
    pub max_step: Duration,
}

impl Default for HeadConfig {
    fn default() -> Self {
        HeadConfig {
            constraints: RotationConstraints::default(),
            anticipation_ratio: 0.15,
            anticipation_duration: Duration::from_millis(100),
            settle_duration: Duration::from_millis(400),
            turn_anticipation_share: 0.2,
            turn_roll: 5.0,
            nod_angle: 15.0,
            nod_return_duration: Duration::from_millis(300),
            reset_duration: Duration::from_millis(600),
            max_step: MAX_TICK_STEP,
        }
    }
}

impl HeadConfig {
    pub fn validate(&self) -> PcposResult<()> {
        self.constraints.validate()?;
        if !(0.0..1.0).contains(&self.anticipation_ratio) {
            return Err(PcposError::InvalidConfig(format!(
                "head.anticipation_ratio must be in [0, 1), got {}",
                self.anticipation_ratio
            )));
        }
        if !(0.0..1.0).contains(&self.turn_anticipation_share) {
            return Err(PcposError::InvalidConfig(format!(
                "head.turn_anticipation_share must be in [0, 1), got {}",
                self.turn_anticipation_share
            )));
        }
        if self.max_step.is_zero() {
            return Err(PcposError::InvalidConfig(
                "head.max_step must be positive".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// TRACKS
// ============================================================================

/// One timed interpolation on one axis
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    start: TickTime,
    duration: Duration,
    from: f32,
    to: f32,
    curve: Curve,
}

impl Segment {
    fn end(&self) -> TickTime {
        self.start + self.duration
    }

    fn sample(&self, at: TickTime) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let progress = at.since(self.start).as_secs_f32() / self.duration.as_secs_f32();
        lerp(self.from, self.to, self.curve.apply(progress))
    }
}

/// Queued segments for one axis, in start order
#[derive(Debug, Clone, Default)]
struct AxisTrack {
    segments: VecDeque<Segment>,
}

impl AxisTrack {
    fn replace(&mut self, segments: impl IntoIterator<Item = Segment>) {
        self.segments.clear();
        self.segments.extend(segments);
    }

    /// Value at `at`, or None when nothing on the track has started yet
    fn value_at(&self, at: TickTime) -> Option<f32> {
        let mut value = None;
        for segment in &self.segments {
            if at >= segment.end() {
                value = Some(segment.to);
            } else if at >= segment.start {
                return Some(segment.sample(at));
            } else {
                break;
            }
        }
        value
    }

    /// Sample at `now` and drop finished segments
    fn advance(&mut self, now: TickTime) -> Option<f32> {
        let value = self.value_at(now);
        while self.segments.front().is_some_and(|s| s.end() <= now) {
            self.segments.pop_front();
        }
        value
    }

    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadCommand {
    /// Bring pitch back to level after a nod
    ReturnPitch,
}

// ============================================================================
// CONTROLLER
// ============================================================================

/// Head Rotation Controller
pub struct HeadRotationController {
    config: HeadConfig,
    transform: HeadTransform,
    now: TickTime,
    tracks: [AxisTrack; 3],
    commands: Scheduler<HeadCommand>,
    haptics: SharedHapticSink,
}

impl HeadRotationController {
    pub fn new(config: HeadConfig, haptics: SharedHapticSink) -> Self {
        HeadRotationController {
            config,
            transform: HeadTransform::NEUTRAL,
            now: TickTime::ZERO,
            tracks: Default::default(),
            commands: Scheduler::new(),
            haptics,
        }
    }

    pub fn transform(&self) -> HeadTransform {
        self.transform
    }

    pub fn constraints(&self) -> &RotationConstraints {
        &self.config.constraints
    }

    pub fn now(&self) -> TickTime {
        self.now
    }

    pub fn is_animating(&self) -> bool {
        self.tracks.iter().any(|t| !t.is_empty()) || !self.commands.is_empty()
    }

    /// Rotate toward the given targets; `None` holds that axis
    pub fn set_rotation(
        &mut self,
        pitch: Option<f32>,
        yaw: Option<f32>,
        roll: Option<f32>,
        animated: bool,
    ) {
        let targets = [
            (HeadAxis::Pitch, pitch),
            (HeadAxis::Yaw, yaw),
            (HeadAxis::Roll, roll),
        ];
        if pitch.is_some() {
            // An explicit pitch supersedes any pending nod return
            self.commands
                .cancel_where(|command| *command == HeadCommand::ReturnPitch);
        }
        for (axis, target) in targets {
            let Some(target) = target else { continue };
            let target = self.config.constraints.range(axis).clamp(target);
            if animated {
                self.animate_with_anticipation(
                    axis,
                    target,
                    self.now,
                    self.config.anticipation_duration,
                    self.config.settle_duration,
                );
            } else {
                self.tracks[axis.index()].replace([]);
                self.transform.set(axis, target);
            }
        }
        tracing::debug!(?pitch, ?yaw, ?roll, animated, "head rotation requested");
    }

    /// Turn to a yaw with a secondary roll lean, phases scaled by `duration`
    pub fn turn_head(&mut self, target_yaw: f32, duration: Duration) {
        let yaw = self.config.constraints.yaw.clamp(target_yaw);
        let anticipation = duration.mul_f32(self.config.turn_anticipation_share);
        let main = duration.saturating_sub(anticipation);
        self.animate_with_anticipation(HeadAxis::Yaw, yaw, self.now, anticipation, main);

        let yaw_limit = self.config.constraints.yaw.max.max(f32::EPSILON);
        let roll = self
            .config
            .constraints
            .roll
            .clamp(yaw / yaw_limit * self.config.turn_roll);
        let current = self.transform.roll;
        self.tracks[HeadAxis::Roll.index()].replace([Segment {
            start: self.now + anticipation,
            duration: main,
            from: current,
            to: roll,
            curve: Curve::EaseInOut,
        }]);
        tracing::debug!(yaw, roll, ?duration, "head turn");
    }

    /// Nod up (negative pitch) or down. The pose is reached within the
    /// anticipation window, held, and returns to level after `duration`.
    pub fn nod_head(&mut self, up: bool, duration: Duration) {
        let angle = if up {
            -self.config.nod_angle
        } else {
            self.config.nod_angle
        };
        let target = self.config.constraints.pitch.clamp(angle);
        let current = self.transform.pitch;
        let approach = duration.min(self.config.anticipation_duration);
        self.tracks[HeadAxis::Pitch.index()].replace([
            Segment {
                start: self.now,
                duration: approach,
                from: current,
                to: target,
                curve: Curve::EaseOut,
            },
            Segment {
                start: self.now + approach,
                duration: duration - approach,
                from: target,
                to: target,
                curve: Curve::Linear,
            },
        ]);

        self.commands
            .cancel_where(|command| *command == HeadCommand::ReturnPitch);
        self.commands
            .schedule_after(self.now, duration, HeadCommand::ReturnPitch);
        self.haptics.emit(HapticEvent::HeadNod);
        tracing::debug!(up, ?duration, "head nod");
    }

    /// Spring to a roll angle in degrees
    pub fn tilt_head(&mut self, amount: f32, duration: Duration) {
        let roll = self.config.constraints.roll.clamp(amount);
        let current = self.transform.roll;
        self.tracks[HeadAxis::Roll.index()].replace([Segment {
            start: self.now,
            duration,
            from: current,
            to: roll,
            curve: Curve::bouncy(),
        }]);
    }

    /// Damped return to level; cancels pending nod returns
    pub fn reset_to_neutral(&mut self) {
        let cancelled = self
            .commands
            .cancel_where(|command| *command == HeadCommand::ReturnPitch);
        for axis in HeadAxis::ALL {
            let current = self.transform.get(axis);
            self.tracks[axis.index()].replace([Segment {
                start: self.now,
                duration: self.config.reset_duration,
                from: current,
                to: 0.0,
                curve: Curve::damped(),
            }]);
        }
        tracing::debug!(cancelled, "head reset to neutral");
    }

    /// Advance the controller clock and resample every axis
    pub fn tick(&mut self, dt: Duration) -> HeadTransform {
        let dt = cap_step(dt, self.config.max_step);
        if dt.is_zero() {
            return self.transform;
        }
        self.now = self.now + dt;

        // Due commands start from where the track was at their due time
        while let Some(due) = self.commands.next_due() {
            if due > self.now {
                break;
            }
            for command in self.commands.drain_due(due) {
                match command {
                    HeadCommand::ReturnPitch => {
                        let track = &mut self.tracks[HeadAxis::Pitch.index()];
                        let from = track.value_at(due).unwrap_or(self.transform.pitch);
                        track.replace([Segment {
                            start: due,
                            duration: self.config.nod_return_duration,
                            from,
                            to: 0.0,
                            curve: Curve::EaseInOut,
                        }]);
                    }
                }
            }
        }

        for axis in HeadAxis::ALL {
            if let Some(value) = self.tracks[axis.index()].advance(self.now) {
                self.transform.set(axis, value);
            }
        }
        self.transform = self.config.constraints.clamp(&self.transform);
        tracing::trace!(now = ?self.now, transform = ?self.transform, "head tick");
        self.transform
    }

    /// Project the head onto the screen plane, about `anchor`.
    /// Roll rotates, yaw and pitch foreshorten.
    pub fn affine_transform(&self, anchor: (f32, f32)) -> AffineTransform {
        let t = self.transform;
        AffineTransform::rotation(t.roll.to_radians())
            .then(&AffineTransform::scale(
                t.yaw.to_radians().cos(),
                t.pitch.to_radians().cos(),
            ))
            .about(anchor)
    }

    /// Anticipation segment then an overshoot-and-settle arc
    fn animate_with_anticipation(
        &mut self,
        axis: HeadAxis,
        target: f32,
        start: TickTime,
        anticipation: Duration,
        main: Duration,
    ) {
        let range = self.config.constraints.range(axis);
        let current = self.transform.get(axis);
        let wind_up = range.clamp(current - (target - current) * self.config.anticipation_ratio);
        self.tracks[axis.index()].replace([
            Segment {
                start,
                duration: anticipation,
                from: current,
                to: wind_up,
                curve: Curve::EaseOut,
            },
            Segment {
                start: start + anticipation,
                duration: main,
                from: wind_up,
                to: target,
                curve: Curve::Back,
            },
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcpos_core::RecordingSink;
    use proptest::prelude::*;
    use std::sync::Arc;

    const FRAME: Duration = Duration::from_millis(20);

    fn controller() -> (HeadRotationController, Arc<RecordingSink>) {
        let sink = RecordingSink::shared();
        (
            HeadRotationController::new(HeadConfig::default(), sink.clone()),
            sink,
        )
    }

    fn run(head: &mut HeadRotationController, frames: usize) -> Vec<HeadTransform> {
        (0..frames).map(|_| head.tick(FRAME)).collect()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_out_of_range_targets_settle_inside() {
        let (mut head, _) = controller();
        head.set_rotation(Some(80.0), Some(-120.0), Some(40.0), true);

        let limits = *head.constraints();
        for frame in run(&mut head, 50) {
            assert!(limits.contains(&frame), "{frame:?}");
        }
        let settled = head.transform();
        assert!(close(settled.pitch, 30.0));
        assert!(close(settled.yaw, -45.0));
        assert!(close(settled.roll, 15.0));
        assert!(!head.is_animating());
    }

    #[test]
    fn test_anticipation_moves_away_first() {
        let (mut head, _) = controller();
        head.set_rotation(None, Some(40.0), None, true);
        let frames = run(&mut head, 5);
        // 100 ms in: full wind-up of 15% of the distance
        assert!(close(frames[4].yaw, -6.0), "{:?}", frames[4]);
        assert!(frames.iter().all(|f| f.yaw <= 0.0));
    }

    #[test]
    fn test_immediate_rotation_holds_omitted_axes() {
        let (mut head, _) = controller();
        head.set_rotation(Some(10.0), Some(20.0), Some(5.0), false);
        head.set_rotation(None, Some(-90.0), None, false);
        assert_eq!(head.transform(), HeadTransform::new(10.0, -45.0, 5.0));
        assert!(!head.is_animating());
    }

    #[test]
    fn test_turn_head_adds_secondary_roll() {
        let (mut head, _) = controller();
        head.turn_head(90.0, Duration::from_millis(500));
        run(&mut head, 30);
        let t = head.transform();
        assert!(close(t.yaw, 45.0));
        assert!(close(t.roll, 5.0));
    }

    #[test]
    fn test_nod_returns_to_level() {
        let (mut head, sink) = controller();
        head.nod_head(true, Duration::from_millis(200));
        assert_eq!(sink.events(), vec![HapticEvent::HeadNod]);

        run(&mut head, 10);
        assert!(close(head.transform().pitch, -15.0));
        assert!(head.is_animating());

        run(&mut head, 16);
        assert!(close(head.transform().pitch, 0.0));
        assert!(!head.is_animating());
    }

    #[test]
    fn test_nod_holds_pose_before_returning() {
        let (mut head, _) = controller();
        head.nod_head(false, Duration::from_millis(400));

        // Approach finishes within the 100 ms anticipation window
        run(&mut head, 5);
        assert!(close(head.transform().pitch, 15.0));
        for frame in run(&mut head, 15) {
            assert!(close(frame.pitch, 15.0), "{frame:?}");
        }
        run(&mut head, 20);
        assert!(close(head.transform().pitch, 0.0));
    }

    #[test]
    fn test_explicit_pitch_overrides_pending_nod_return() {
        for animated in [false, true] {
            let (mut head, _) = controller();
            head.nod_head(true, Duration::from_millis(400));
            run(&mut head, 5);

            head.set_rotation(Some(20.0), None, None, animated);
            run(&mut head, 60);
            assert!(
                close(head.transform().pitch, 20.0),
                "animated {animated}: {:?}",
                head.transform()
            );
            assert!(!head.is_animating());
        }
    }

    #[test]
    fn test_yaw_only_rotation_keeps_nod_return() {
        let (mut head, _) = controller();
        head.nod_head(true, Duration::from_millis(200));
        head.set_rotation(None, Some(10.0), None, false);
        run(&mut head, 30);
        assert!(close(head.transform().pitch, 0.0));
        assert!(close(head.transform().yaw, 10.0));
    }

    #[test]
    fn test_reset_cancels_nod_return() {
        let (mut head, _) = controller();
        head.nod_head(false, Duration::from_millis(400));
        run(&mut head, 5);
        head.reset_to_neutral();
        run(&mut head, 40);
        assert_eq!(head.transform(), HeadTransform::NEUTRAL);
        assert!(!head.is_animating());
    }

    #[test]
    fn test_tilt_is_clamped() {
        let (mut head, _) = controller();
        head.tilt_head(-60.0, Duration::from_millis(300));
        for frame in run(&mut head, 20) {
            assert!(frame.roll >= -15.0);
        }
        assert!(close(head.transform().roll, -15.0));
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let (mut head, _) = controller();
        head.set_rotation(Some(20.0), None, None, true);
        run(&mut head, 3);
        let before = head.transform();
        assert_eq!(head.tick(Duration::ZERO), before);
        assert_eq!(head.now(), TickTime::from_millis(60));
    }

    #[test]
    fn test_affine_projection() {
        let (mut head, _) = controller();
        let anchor = (50.0, 80.0);
        assert!(head
            .affine_transform(anchor)
            .approx_eq(&AffineTransform::identity(), 1e-6));

        head.set_rotation(Some(0.0), Some(45.0), Some(10.0), false);
        let affine = head.affine_transform(anchor);
        let (x, y) = affine.apply(anchor);
        assert!(close(x, anchor.0) && close(y, anchor.1));

        // Rotation keeps area, so the determinant is the foreshortening alone
        let det = affine.a * affine.d - affine.b * affine.c;
        assert!(close(det, 45f32.to_radians().cos()));
    }

    #[test]
    fn test_constraint_validation() {
        assert!(HeadConfig::default().validate().is_ok());
        let inverted = RotationConstraints {
            yaw: AxisRange { min: 10.0, max: -10.0 },
            ..RotationConstraints::default()
        };
        assert!(inverted.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_every_frame_in_range(
            pitch in -200.0f32..200.0,
            yaw in -200.0f32..200.0,
            roll in -200.0f32..200.0,
            turn in -200.0f32..200.0,
            steps in proptest::collection::vec(1u64..120, 1..60),
        ) {
            let (mut head, _) = controller();
            let limits = *head.constraints();
            head.set_rotation(Some(pitch), Some(yaw), Some(roll), true);
            for (i, ms) in steps.iter().enumerate() {
                if i == steps.len() / 2 {
                    head.turn_head(turn, Duration::from_millis(300));
                }
                let frame = head.tick(Duration::from_millis(*ms));
                prop_assert!(limits.contains(&frame), "{:?}", frame);
            }
        }
    }
}
