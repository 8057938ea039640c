//! Frame snapshot handed to the renderer

use pcpos_core::{AnimationParams, Mood, MovementPattern, PadEmotion, TickTime};
use pcpos_motion::{AffineTransform, Deformation, HeadTransform, MovementState};
use pcpos_visual::{FaceIdState, LayerStyle, LayeredSymbol, LAYER_COUNT};
use serde::Serialize;

/// Everything needed to draw one frame. Built once per tick, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub time: TickTime,
    pub pad: PadEmotion,
    pub mood: Mood,
    pub pattern: MovementPattern,
    pub movement: MovementState,
    /// Horizontal shake overlay, points
    pub shake_offset: f32,
    pub head: HeadTransform,
    /// Head projection about the head anchor
    pub head_transform: AffineTransform,
    pub layered_symbols: Vec<LayeredSymbol>,
    pub layers: [LayerStyle; LAYER_COUNT],
    pub face_state: FaceIdState,
    pub intensity: f32,
    /// Speech and gesture deformation layered over the body
    pub gesture: Deformation,
    /// Blink deformation for the eyes
    pub eyes: Deformation,
    pub params: AnimationParams,
}

impl FrameSnapshot {
    /// Body scale on each axis with deformation and gesture applied
    pub fn body_scale(&self) -> (f32, f32) {
        (
            self.movement.scale * self.movement.deformation_x * self.gesture.scale_x,
            self.movement.scale * self.movement.deformation_y * self.gesture.scale_y,
        )
    }

    /// Body offset including the shake overlay and gesture offset
    pub fn body_offset(&self) -> (f32, f32) {
        (
            self.movement.offset_x + self.shake_offset + self.gesture.offset_x,
            self.movement.offset_y + self.gesture.offset_y,
        )
    }
}
