//! Companion - per-tick orchestration of every animation component

use std::sync::Arc;
use std::time::{Duration, Instant};

use pcpos_core::{
    cap_step, AnimationParams, HapticEvent, HapticMoodMapper, HapticPattern, HapticSink,
    PadEmotion, RecordingSink, TickTime,
};
use pcpos_motion::{
    blink_animation, speech_animation, surprise_animation, AvatarMovementEngine, Deformation,
    HeadRotationController,
};
use pcpos_time::Scheduler;
use pcpos_visual::{FaceIdEvent, FaceIdState, FaceIdStateMachine, MultiLayerDepthCompositor};

use crate::config::CompanionConfig;
use crate::emotion::EmotionHandle;
use crate::snapshot::FrameSnapshot;

/// Blink keyframes, closed at the middle one
const BLINK_KEYS: [f32; 5] = [0.3, 0.7, 1.0, 0.5, 0.0];

/// Receives every published frame
pub type FrameCallback = Box<dyn Fn(&FrameSnapshot) + Send>;
/// Receives every haptic event with its descriptor
pub type HapticCallback = Box<dyn Fn(&HapticEvent, &HapticPattern) + Send>;

#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    pub ticks: u64,
    pub haptic_events: u64,
    pub face_transitions: u64,
    pub gestures_played: u64,
    pub budget_overruns: u64,
    pub last_tick_duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureFrame {
    Body(Deformation),
    Eyes(Deformation),
}

/// Companion - the runtime entity
pub struct Companion {
    config: CompanionConfig,
    emotion: EmotionHandle,
    /// Companion timeline
    now: TickTime,
    running: bool,
    movement: AvatarMovementEngine,
    head: HeadRotationController,
    compositor: MultiLayerDepthCompositor,
    face_id: FaceIdStateMachine,
    /// Keyframes of discrete gestures
    gestures: Scheduler<GestureFrame>,
    body_gesture: Deformation,
    eyes: Deformation,
    speech_phase: f32,
    /// Collects engine haptics until the end of the tick
    haptics: Arc<RecordingSink>,
    mapper: HapticMoodMapper,
    frame_subscribers: Vec<FrameCallback>,
    haptic_subscribers: Vec<HapticCallback>,
    stats: RuntimeStats,
}

impl Companion {
    pub fn new(config: CompanionConfig, emotion: EmotionHandle) -> Self {
        let haptics = RecordingSink::shared();
        let movement = AvatarMovementEngine::new(config.movement.clone(), haptics.clone());
        let head = HeadRotationController::new(config.head.clone(), haptics.clone());
        let compositor =
            MultiLayerDepthCompositor::new(config.compositor.clone(), config.compositor_seed);
        let face_id = FaceIdStateMachine::new(config.face_id_seed);

        let mut companion = Companion {
            config,
            emotion,
            now: TickTime::ZERO,
            running: true,
            movement,
            head,
            compositor,
            face_id,
            gestures: Scheduler::new(),
            body_gesture: Deformation::NEUTRAL,
            eyes: Deformation::NEUTRAL,
            speech_phase: 0.0,
            haptics,
            mapper: HapticMoodMapper::new(),
            frame_subscribers: Vec::new(),
            haptic_subscribers: Vec::new(),
            stats: RuntimeStats::default(),
        };
        companion.refresh_symbols();
        companion
    }

    pub fn with_defaults() -> Self {
        Self::new(CompanionConfig::default(), EmotionHandle::default())
    }

    /// Handle for emotion producers
    pub fn emotion(&self) -> EmotionHandle {
        self.emotion.clone()
    }

    pub fn subscribe_frames<F>(&mut self, callback: F)
    where
        F: Fn(&FrameSnapshot) + Send + 'static,
    {
        self.frame_subscribers.push(Box::new(callback));
    }

    pub fn subscribe_haptics<F>(&mut self, callback: F)
    where
        F: Fn(&HapticEvent, &HapticPattern) + Send + 'static,
    {
        self.haptic_subscribers.push(Box::new(callback));
    }

    /// Execute one tick of the companion loop
    pub fn tick(&mut self, dt: Duration) -> FrameSnapshot {
        let start = Instant::now();
        self.stats.ticks += 1;

        // Stopped components see no time pass
        let dt = if self.running {
            cap_step(dt, self.config.runtime.clock.max_step)
        } else {
            Duration::ZERO
        };

        // Stage 1: Advance companion time, fire due gesture keyframes
        self.now = self.now + dt;
        for frame in self.gestures.drain_due(self.now) {
            match frame {
                GestureFrame::Body(deformation) => self.body_gesture = deformation,
                GestureFrame::Eyes(deformation) => self.eyes = deformation,
            }
        }

        // Stage 2: Read emotion (one copy per tick)
        let emotion = self.emotion.snapshot();

        // Stage 3: Classify
        let mood = emotion.mood();
        if self.running {
            self.movement
                .update_movement(mood, emotion.pad.arousal, emotion.curiosity);
        }

        // Stages 4-6: Continuous components
        let movement = *self.movement.tick(dt);
        let head = self.head.tick(dt);
        self.compositor.tick(dt);

        // Stage 7: Speech cycle layered with the active gesture
        self.speech_phase =
            (self.speech_phase + dt.as_secs_f32() * self.config.runtime.speech_cycle_hz).fract();
        let speech = speech_animation(emotion.audio_level, self.speech_phase);
        let gesture = speech.combine(&self.body_gesture);

        // Stage 8: Expression
        let params = AnimationParams::from_emotion(&emotion.pad, emotion.audio_level).clamped();

        // Stage 9: Publish
        let face_state = self.face_id.state();
        let snapshot = FrameSnapshot {
            time: self.now,
            pad: emotion.pad,
            mood,
            pattern: self.movement.pattern(),
            movement,
            shake_offset: self.movement.shake_offset(),
            head,
            head_transform: self.head.affine_transform(self.config.runtime.head_anchor),
            layered_symbols: self.compositor.symbols().to_vec(),
            layers: self.compositor.layer_styles(),
            face_state,
            intensity: face_state.intensity(),
            gesture,
            eyes: self.eyes,
            params,
        };
        for subscriber in &self.frame_subscribers {
            subscriber(&snapshot);
        }
        self.publish_haptics(&emotion.pad);

        self.stats.last_tick_duration = start.elapsed();
        if self.stats.last_tick_duration > self.config.runtime.tick_budget {
            self.stats.budget_overruns += 1;
            tracing::warn!(
                elapsed = ?self.stats.last_tick_duration,
                budget = ?self.config.runtime.tick_budget,
                "companion tick over budget"
            );
        }
        snapshot
    }

    fn publish_haptics(&mut self, pad: &PadEmotion) {
        let events = self.haptics.drain();
        if events.is_empty() {
            return;
        }
        self.stats.haptic_events += events.len() as u64;
        for event in &events {
            let pattern = self.mapper.pattern_for(event, pad);
            tracing::trace!(?event, style = ?pattern.style, "haptic");
            for subscriber in &self.haptic_subscribers {
                subscriber(event, &pattern);
            }
        }
    }

    /// Drive the lock state machine; on a transition the symbols and
    /// rotation follow the new state
    pub fn handle_face_event(&mut self, event: FaceIdEvent) -> bool {
        let Some(transition) = self.face_id.handle(event) else {
            return false;
        };
        self.stats.face_transitions += 1;
        self.refresh_symbols();
        self.haptics.emit(HapticEvent::StateTransition {
            intensity: transition.to.intensity(),
        });
        true
    }

    fn refresh_symbols(&mut self) {
        let state = self.face_id.state();
        let intensity = state.intensity();
        let symbols = self.face_id.symbols_for(state, intensity);
        let palette = self.face_id.palette(state);
        self.compositor
            .distribute_symbols(&symbols, &palette, self.config.runtime.symbol_size);
        self.compositor
            .start_rotation(self.config.runtime.rotation_period(intensity));
    }

    /// Play the surprise pop, one keyframe per gesture step
    pub fn play_surprise(&mut self, intensity: f32) {
        let step = self.config.runtime.gesture_step;
        let mut at = self.now;
        for deformation in surprise_animation(intensity) {
            self.gestures.schedule_at(at, GestureFrame::Body(deformation));
            at = at + step;
        }
        self.stats.gestures_played += 1;
        tracing::debug!(intensity, "surprise scheduled");
    }

    /// Close and reopen the eyes over two and a half gesture steps
    pub fn blink(&mut self) {
        let step = self.config.runtime.gesture_step / 2;
        let mut at = self.now;
        for key in BLINK_KEYS {
            self.gestures
                .schedule_at(at, GestureFrame::Eyes(blink_animation(key)));
            at = at + step;
        }
        self.stats.gestures_played += 1;
    }

    pub fn trigger_shake(&mut self) {
        self.movement.trigger_shake();
        self.stats.gestures_played += 1;
    }

    pub fn nod(&mut self, up: bool) {
        self.head.nod_head(up, self.config.runtime.gesture_step * 3);
        self.stats.gestures_played += 1;
    }

    /// Freeze every continuous component
    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!(at = ?self.now, "companion stopped");
        }
        self.running = false;
    }

    pub fn resume(&mut self) {
        if !self.running {
            tracing::debug!(at = ?self.now, "companion resumed");
        }
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Back to neutral pose and idle pattern; lock state is kept
    pub fn reset(&mut self) {
        self.movement.reset();
        self.head.reset_to_neutral();
        self.gestures.clear();
        self.body_gesture = Deformation::NEUTRAL;
        self.eyes = Deformation::NEUTRAL;
        self.speech_phase = 0.0;
    }

    pub fn now(&self) -> TickTime {
        self.now
    }

    pub fn face_state(&self) -> FaceIdState {
        self.face_id.state()
    }

    pub fn movement(&self) -> &AvatarMovementEngine {
        &self.movement
    }

    pub fn head(&self) -> &HeadRotationController {
        &self.head
    }

    /// Head gestures beyond nod (turns, tilts, explicit rotations)
    pub fn head_mut(&mut self) -> &mut HeadRotationController {
        &mut self.head
    }

    pub fn compositor(&self) -> &MultiLayerDepthCompositor {
        &self.compositor
    }

    pub fn config(&self) -> &CompanionConfig {
        &self.config
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }
}

impl Default for Companion {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pcpos_core::{EmotionState, HapticStyle, MovementPattern};
    use pcpos_visual::{LockedPhase, ScanningPhase};

    const TICK: Duration = Duration::from_millis(16);

    fn recorded_haptics(companion: &mut Companion) -> Arc<Mutex<Vec<(HapticEvent, HapticPattern)>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        companion.subscribe_haptics(move |event, pattern| sink.lock().push((*event, *pattern)));
        log
    }

    #[test]
    fn test_companion_tick() {
        let mut companion = Companion::default();
        let a = companion.tick(TICK);
        let b = companion.tick(TICK);
        assert!(b.time > a.time);
        assert_eq!(companion.stats().ticks, 2);
        assert_eq!(b.movement.offset_x, b.movement.last_offset_x);
        assert_eq!(b.face_state, FaceIdState::Locked(LockedPhase::Idle));
        assert!(!b.layered_symbols.is_empty());
    }

    #[test]
    fn test_excited_emotion_goes_energetic() {
        let mut companion = Companion::default();
        let haptics = recorded_haptics(&mut companion);
        companion.emotion().replace(EmotionState::new(
            PadEmotion::new(0.8, 0.9, 0.2),
            0.2,
            0.0,
        ));

        let frame = companion.tick(TICK);
        assert_eq!(frame.pattern, MovementPattern::Energetic);
        companion.tick(TICK);

        let log = haptics.lock();
        let changes: Vec<_> = log
            .iter()
            .filter(|(e, _)| matches!(e, HapticEvent::PatternChanged { .. }))
            .collect();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].1.style, HapticStyle::Sparkle);
    }

    #[test]
    fn test_frame_subscribers_see_every_tick() {
        let mut companion = Companion::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        companion.subscribe_frames(move |frame| sink.lock().push(frame.time));
        for _ in 0..3 {
            companion.tick(TICK);
        }
        assert_eq!(seen.lock().len(), 3);
    }

    #[test]
    fn test_face_event_redistributes_and_signals() {
        let mut companion = Companion::default();
        let haptics = recorded_haptics(&mut companion);
        let before = companion.compositor().rotation_period();

        assert!(!companion.handle_face_event(FaceIdEvent::ScanComplete));
        assert!(companion.handle_face_event(FaceIdEvent::Tap));
        assert!(companion.handle_face_event(FaceIdEvent::Tap));
        assert_eq!(
            companion.face_state(),
            FaceIdState::Scanning(ScanningPhase::Initializing)
        );
        assert_ne!(companion.compositor().rotation_period(), before);

        let frame = companion.tick(TICK);
        let expected = 5 + (0.4f32 * 20.0) as usize;
        assert_eq!(frame.layered_symbols.len(), expected);

        let transitions = haptics
            .lock()
            .iter()
            .filter(|(e, _)| matches!(e, HapticEvent::StateTransition { .. }))
            .count();
        assert_eq!(transitions, 2);
        assert_eq!(companion.stats().face_transitions, 2);
    }

    #[test]
    fn test_stop_freezes_components() {
        let mut companion = Companion::default();
        companion.emotion().set_pad(PadEmotion::new(0.5, 0.9, 0.0));
        for _ in 0..5 {
            companion.tick(TICK);
        }
        companion.stop();
        let frozen = companion.tick(TICK);
        let later = companion.tick(Duration::from_millis(500));
        assert_eq!(frozen.movement, later.movement);
        assert_eq!(frozen.time, later.time);
        assert_eq!(
            companion.compositor().global_rotation(),
            later.layers[2].rotation
        );

        companion.resume();
        let moved = companion.tick(TICK);
        assert!(moved.time > later.time);
    }

    #[test]
    fn test_surprise_playback() {
        let mut companion = Companion::default();
        companion.play_surprise(1.0);

        let first = companion.tick(Duration::from_millis(10));
        assert!((first.gesture.scale_x - 1.3).abs() < 1e-5);

        let second = companion.tick(Duration::from_millis(100));
        assert!((second.gesture.scale_x - 1.2).abs() < 1e-5);

        let third = companion.tick(Duration::from_millis(100));
        assert!((third.gesture.scale_x - 0.8).abs() < 1e-5);

        let rest = companion.tick(Duration::from_millis(100));
        assert!(rest.gesture.is_neutral());
    }

    #[test]
    fn test_blink_closes_eyes() {
        let mut companion = Companion::default();
        companion.blink();
        let mut closed = false;
        for _ in 0..20 {
            let frame = companion.tick(Duration::from_millis(10));
            closed |= frame.eyes.scale_y < 0.2;
        }
        assert!(closed);
        assert!(companion.tick(TICK).eyes.is_neutral());
    }

    #[test]
    fn test_speech_deforms_body() {
        let mut companion = Companion::default();
        companion.emotion().set_audio_level(1.0);
        let deformed = (0..20)
            .map(|_| companion.tick(TICK))
            .any(|frame| !frame.gesture.is_neutral());
        assert!(deformed);
    }

    #[test]
    fn test_nod_emits_haptic() {
        let mut companion = Companion::default();
        let haptics = recorded_haptics(&mut companion);
        companion.nod(true);
        companion.tick(TICK);
        assert!(haptics
            .lock()
            .iter()
            .any(|(e, _)| *e == HapticEvent::HeadNod));
    }
}
