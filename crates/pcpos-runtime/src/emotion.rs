//! Shared emotion input
//!
//! Producers (speech level, vision, chat sentiment) write from their own
//! threads; the tick loop takes one copy per tick. Each setter clamps.

use std::sync::Arc;

use parking_lot::RwLock;
use pcpos_core::{EmotionState, PadEmotion};

/// Cloneable handle to the companion's emotion state
#[derive(Clone, Debug, Default)]
pub struct EmotionHandle {
    inner: Arc<RwLock<EmotionState>>,
}

impl EmotionHandle {
    pub fn new(initial: EmotionState) -> Self {
        EmotionHandle {
            inner: Arc::new(RwLock::new(initial.clamped())),
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> EmotionState {
        *self.inner.read()
    }

    pub fn set_pad(&self, pad: PadEmotion) {
        self.inner.write().pad = pad.clamped();
    }

    /// Move part of the way toward `target`
    pub fn blend_pad(&self, target: PadEmotion, factor: f32) {
        let mut state = self.inner.write();
        state.pad = state.pad.blend(&target, factor).clamped();
    }

    pub fn set_curiosity(&self, curiosity: f32) {
        let mut state = self.inner.write();
        state.curiosity = curiosity;
        *state = state.clamped();
    }

    pub fn set_audio_level(&self, level: f32) {
        let mut state = self.inner.write();
        state.audio_level = level;
        *state = state.clamped();
    }

    pub fn replace(&self, state: EmotionState) {
        *self.inner.write() = state.clamped();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    #[test]
    fn test_setters_clamp() {
        let handle = EmotionHandle::default();
        handle.set_pad(PadEmotion {
            pleasure: 3.0,
            arousal: -9.0,
            dominance: 0.2,
        });
        handle.set_curiosity(4.0);
        handle.set_audio_level(-1.0);

        let s = handle.snapshot();
        assert_eq!(s.pad.pleasure, 1.0);
        assert_eq!(s.pad.arousal, -1.0);
        assert_eq!(s.curiosity, 1.0);
        assert_eq!(s.audio_level, 0.0);
    }

    #[test]
    fn test_writers_on_other_threads() {
        let handle = EmotionHandle::default();
        let writers: Vec<_> = (0..4)
            .map(|i| {
                let h = handle.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        h.set_audio_level(i as f32 * 0.25);
                    }
                })
            })
            .collect();
        for w in writers {
            w.join().unwrap();
        }
        let level = handle.snapshot().audio_level;
        assert!((0.0..=1.0).contains(&level));
    }

    proptest! {
        #[test]
        fn prop_handle_stays_in_domain(
            p in any::<f32>(),
            a in any::<f32>(),
            d in any::<f32>(),
            factor in any::<f32>(),
            curiosity in any::<f32>(),
            level in any::<f32>(),
        ) {
            let handle = EmotionHandle::default();
            handle.blend_pad(PadEmotion { pleasure: p, arousal: a, dominance: d }, factor);
            handle.set_curiosity(curiosity);
            handle.set_audio_level(level);

            let s = handle.snapshot();
            for v in [s.pad.pleasure, s.pad.arousal, s.pad.dominance] {
                prop_assert!((-1.0..=1.0).contains(&v));
            }
            prop_assert!((0.0..=1.0).contains(&s.curiosity));
            prop_assert!((0.0..=1.0).contains(&s.audio_level));
        }
    }
}
