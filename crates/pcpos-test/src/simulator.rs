//! Companion Simulator - seeded end-to-end simulation harness
//!
//! Simulates:
//! - Uneven frame timing (jitter, occasional stalls such as app suspension)
//! - Emotion producers wandering through PAD space
//! - Scripted lock/scan/unlock input
//!
//! and records the invariants every frame must hold.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pcpos_core::{HapticEvent, MovementPattern, PadEmotion, TickTime};
use pcpos_motion::{RotationConstraints, DEFORMATION_MAX, DEFORMATION_MIN};
use pcpos_runtime::{Companion, CompanionConfig, EmotionHandle, FrameSnapshot};
use pcpos_visual::{FaceIdEvent, FaceIdState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Frame timing model for the simulated display
#[derive(Clone, Debug)]
pub struct FrameJitterModel {
    /// Nominal frame period
    pub base: Duration,
    /// Random jitter per frame (microseconds)
    pub jitter_us: u32,
    /// Chance that a frame stalls
    pub stall_probability: f64,
    /// Length of a stall
    pub stall: Duration,
}

impl FrameJitterModel {
    /// Perfectly regular frames
    pub fn steady(base: Duration) -> Self {
        FrameJitterModel {
            base,
            jitter_us: 0,
            stall_probability: 0.0,
            stall: Duration::ZERO,
        }
    }

    /// Typical mobile frame pacing
    pub fn jittery(base: Duration) -> Self {
        FrameJitterModel {
            jitter_us: 2_000,
            ..Self::steady(base)
        }
    }

    /// Frequent long stalls (backgrounding, debugger pauses)
    pub fn stalling(base: Duration) -> Self {
        FrameJitterModel {
            jitter_us: 2_000,
            stall_probability: 0.02,
            stall: Duration::from_millis(750),
            ..Self::steady(base)
        }
    }

    /// Wall time of the next frame
    pub fn sample(&self, rng: &mut StdRng) -> Duration {
        if self.stall_probability > 0.0 && rng.gen_bool(self.stall_probability.min(1.0)) {
            return self.base + self.stall;
        }
        let base_us = self.base.as_micros() as i64;
        let jitter = if self.jitter_us > 0 {
            rng.gen_range(-(self.jitter_us as i64)..=self.jitter_us as i64)
        } else {
            0
        };
        Duration::from_micros((base_us + jitter).max(0) as u64)
    }
}

/// Random-walk emotion producer
#[derive(Clone, Debug)]
pub struct EmotionWalk {
    /// Largest PAD change per frame
    pub step: f32,
    /// Chance per frame that speech starts or stops
    pub speech_toggle: f64,
    speaking: bool,
}

impl EmotionWalk {
    pub fn new(step: f32, speech_toggle: f64) -> Self {
        EmotionWalk {
            step,
            speech_toggle,
            speaking: false,
        }
    }

    /// Emotion holds still
    pub fn frozen() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Push one frame of producer updates into the handle
    pub fn apply(&mut self, handle: &EmotionHandle, rng: &mut StdRng) {
        if self.step > 0.0 {
            let current = handle.snapshot();
            let mut nudge = || rng.gen_range(-self.step..=self.step);
            let pad = PadEmotion::new(
                current.pad.pleasure + nudge(),
                current.pad.arousal + nudge(),
                current.pad.dominance + nudge(),
            );
            let curiosity = current.curiosity + nudge();
            handle.set_pad(pad);
            handle.set_curiosity(curiosity);
        }
        if self.speech_toggle > 0.0 && rng.gen_bool(self.speech_toggle.min(1.0)) {
            self.speaking = !self.speaking;
        }
        let level = if self.speaking { rng.gen_range(0.3..1.0) } else { 0.0 };
        handle.set_audio_level(level);
    }
}

/// Companion simulation scenario
pub struct CompanionSimulator {
    companion: Companion,
    emotion: EmotionHandle,
    jitter: FrameJitterModel,
    walk: EmotionWalk,
    rng: StdRng,
    /// Scripted face events, sorted by wall time
    script: Vec<(Duration, FaceIdEvent)>,
    next_scripted: usize,
    wall_time: Duration,
    haptic_log: Arc<Mutex<Vec<HapticEvent>>>,
}

impl CompanionSimulator {
    pub fn new(config: CompanionConfig, jitter: FrameJitterModel, seed: u64) -> Self {
        let emotion = EmotionHandle::default();
        let mut companion = Companion::new(config, emotion.clone());
        let haptic_log = Arc::new(Mutex::new(Vec::new()));
        let log = haptic_log.clone();
        companion.subscribe_haptics(move |event, _| log.lock().push(*event));

        CompanionSimulator {
            companion,
            emotion,
            jitter,
            walk: EmotionWalk::frozen(),
            rng: StdRng::seed_from_u64(seed),
            script: Vec::new(),
            next_scripted: 0,
            wall_time: Duration::ZERO,
            haptic_log,
        }
    }

    pub fn with_walk(mut self, walk: EmotionWalk) -> Self {
        self.walk = walk;
        self
    }

    /// Queue a face event at a wall time
    pub fn schedule_face_event(&mut self, at: Duration, event: FaceIdEvent) {
        let pos = self.script.partition_point(|(t, _)| *t <= at);
        self.script.insert(pos, (at, event));
    }

    pub fn emotion(&self) -> &EmotionHandle {
        &self.emotion
    }

    pub fn companion(&self) -> &Companion {
        &self.companion
    }

    pub fn companion_mut(&mut self) -> &mut Companion {
        &mut self.companion
    }

    pub fn wall_time(&self) -> Duration {
        self.wall_time
    }

    /// Run for a wall-time duration
    pub fn run(&mut self, duration: Duration) -> SimulationResult {
        let mut result = SimulationResult::new();
        let end = self.wall_time + duration;
        while self.wall_time < end {
            self.step(&mut result);
        }
        result
    }

    /// Execute one simulated frame
    fn step(&mut self, result: &mut SimulationResult) {
        let dt = self.jitter.sample(&mut self.rng);
        self.wall_time += dt;

        while let Some((at, event)) = self.script.get(self.next_scripted).copied() {
            if at > self.wall_time {
                break;
            }
            self.companion.handle_face_event(event);
            self.next_scripted += 1;
        }

        self.walk.apply(&self.emotion, &mut self.rng);

        let before = self.companion.now();
        let frame = self.companion.tick(dt);
        let advanced = frame.time.since(before);

        let haptics: Vec<HapticEvent> = std::mem::take(&mut *self.haptic_log.lock());
        result.record(
            &frame,
            advanced,
            &haptics,
            &self.companion.config().head.constraints,
        );
    }
}

/// Stable name of a haptic event kind
pub fn haptic_kind(event: &HapticEvent) -> &'static str {
    match event {
        HapticEvent::PatternChanged { .. } => "pattern_changed",
        HapticEvent::Collision { .. } => "collision",
        HapticEvent::FloorContact => "floor_contact",
        HapticEvent::HeadNod => "head_nod",
        HapticEvent::StateTransition { .. } => "state_transition",
    }
}

/// Simulation result and statistics
#[derive(Debug, Default)]
pub struct SimulationResult {
    /// Total frames executed
    pub total_ticks: u64,
    /// Timeline reached by the last frame
    pub timeline: TickTime,
    /// Largest timeline advance in one frame
    pub max_step: Duration,
    /// Frames spent in each movement pattern
    pub pattern_ticks: HashMap<MovementPattern, u64>,
    /// Haptic events by kind
    pub haptics: HashMap<&'static str, u64>,
    /// Largest |offset| seen on each axis
    pub max_offset: (f32, f32),
    /// Smallest and largest deformation seen on either axis
    pub deformation_range: (f32, f32),
    /// Frames whose head pose left the constraints
    pub head_violations: u64,
    /// Frames where last != current after the tick
    pub commit_violations: u64,
    /// Distinct lock states seen, in order
    pub face_states: Vec<FaceIdState>,
}

impl SimulationResult {
    pub fn new() -> Self {
        SimulationResult {
            deformation_range: (f32::MAX, f32::MIN),
            ..Default::default()
        }
    }

    fn record(
        &mut self,
        frame: &FrameSnapshot,
        advanced: Duration,
        haptics: &[HapticEvent],
        constraints: &RotationConstraints,
    ) {
        self.total_ticks += 1;
        self.timeline = frame.time;
        self.max_step = self.max_step.max(advanced);
        *self.pattern_ticks.entry(frame.pattern).or_default() += 1;
        for event in haptics {
            *self.haptics.entry(haptic_kind(event)).or_default() += 1;
        }

        let m = &frame.movement;
        self.max_offset.0 = self.max_offset.0.max(m.offset_x.abs());
        self.max_offset.1 = self.max_offset.1.max(m.offset_y.abs());
        for d in [m.deformation_x, m.deformation_y] {
            self.deformation_range.0 = self.deformation_range.0.min(d);
            self.deformation_range.1 = self.deformation_range.1.max(d);
        }
        if m.offset_x != m.last_offset_x || m.offset_y != m.last_offset_y || m.scale != m.last_scale
        {
            self.commit_violations += 1;
        }
        if !constraints.contains(&frame.head) {
            self.head_violations += 1;
        }
        if self.face_states.last() != Some(&frame.face_state) {
            self.face_states.push(frame.face_state);
        }
    }

    /// Every per-frame invariant held
    pub fn invariants_hold(&self) -> bool {
        self.head_violations == 0
            && self.commit_violations == 0
            && (self.total_ticks == 0
                || (self.deformation_range.0 >= DEFORMATION_MIN
                    && self.deformation_range.1 <= DEFORMATION_MAX))
    }

    pub fn haptic_count(&self, kind: &str) -> u64 {
        self.haptics.get(kind).copied().unwrap_or(0)
    }

    pub fn pattern_share(&self, pattern: MovementPattern) -> f64 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        self.pattern_ticks.get(&pattern).copied().unwrap_or(0) as f64 / self.total_ticks as f64
    }
}

/// Predefined test scenarios
pub mod scenarios {
    use super::*;
    use pcpos_core::EmotionState;

    const FRAME_60HZ: Duration = Duration::from_micros(16_667);

    /// Sustained excitement: energetic bouncing into the boundaries
    pub fn excited_burst(seed: u64) -> CompanionSimulator {
        let sim = CompanionSimulator::new(
            CompanionConfig::default(),
            FrameJitterModel::jittery(FRAME_60HZ),
            seed,
        );
        sim.emotion()
            .replace(EmotionState::new(PadEmotion::new(0.8, 0.9, 0.3), 0.2, 0.0));
        sim
    }

    /// Quiet, low-arousal evening with occasional speech
    pub fn calm_evening(seed: u64) -> CompanionSimulator {
        let sim = CompanionSimulator::new(
            CompanionConfig::default(),
            FrameJitterModel::jittery(FRAME_60HZ),
            seed,
        )
        .with_walk(EmotionWalk::new(0.0, 0.01));
        sim.emotion()
            .replace(EmotionState::new(PadEmotion::new(0.4, -0.7, 0.0), 0.1, 0.0));
        sim
    }

    /// Full unlock: tap, tap, scan, verify, celebrate, settle
    pub fn unlock_flow(seed: u64) -> CompanionSimulator {
        let mut sim = CompanionSimulator::new(
            CompanionConfig::default(),
            FrameJitterModel::steady(FRAME_60HZ),
            seed,
        );
        let script = [
            (200, FaceIdEvent::Tap),
            (400, FaceIdEvent::Tap),
            (700, FaceIdEvent::Advance),
            (1_000, FaceIdEvent::Advance),
            (1_300, FaceIdEvent::ScanComplete),
            (1_600, FaceIdEvent::Verification(true)),
            (2_000, FaceIdEvent::Advance),
            (2_400, FaceIdEvent::Advance),
            (2_800, FaceIdEvent::Advance),
        ];
        for (ms, event) in script {
            sim.schedule_face_event(Duration::from_millis(ms), event);
        }
        sim
    }

    /// Wandering emotion on a stalling display
    pub fn restless_stalls(seed: u64) -> CompanionSimulator {
        CompanionSimulator::new(
            CompanionConfig::default(),
            FrameJitterModel::stalling(FRAME_60HZ),
            seed,
        )
        .with_walk(EmotionWalk::new(0.08, 0.02))
    }
}
