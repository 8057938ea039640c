//! Multi-Layer Depth Compositor
//!
//! Five fixed parallax layers, background first. Symbols are assigned to
//! layers in input order; everything a renderer needs per layer is derived
//! from the single global rotation.

use std::f32::consts::TAU;
use std::time::Duration;

use pcpos_core::{cap_step, Color, PcposError, PcposResult, MAX_TICK_STEP};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Number of depth layers
pub const LAYER_COUNT: usize = 5;

/// Fixed appearance of one depth layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthLayer {
    pub rotation_multiplier: f32,
    pub opacity: f32,
    pub size: f32,
    /// Blur radius in points
    pub blur: f32,
}

/// Background → foreground
pub const DEPTH_LAYERS: [DepthLayer; LAYER_COUNT] = [
    DepthLayer { rotation_multiplier: 0.25, opacity: 0.40, size: 0.60, blur: 3.0 },
    DepthLayer { rotation_multiplier: 0.50, opacity: 0.55, size: 0.70, blur: 2.0 },
    DepthLayer { rotation_multiplier: 1.00, opacity: 0.70, size: 0.80, blur: 1.0 },
    DepthLayer { rotation_multiplier: 1.50, opacity: 0.85, size: 0.90, blur: 0.5 },
    DepthLayer { rotation_multiplier: 2.00, opacity: 1.00, size: 1.00, blur: 0.0 },
];

fn depth_layer(layer: usize) -> &'static DepthLayer {
    &DEPTH_LAYERS[layer.min(LAYER_COUNT - 1)]
}

/// A symbol placed on a depth layer. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeredSymbol {
    pub symbol_id: String,
    pub layer: u8,
    pub base_size: f32,
    pub color: Color,
    /// Polar placement converted to points
    pub static_offset: (f32, f32),
}

/// Render parameters of one layer for the current rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub layer: u8,
    /// Degrees
    pub rotation: f32,
    pub opacity: f32,
    pub blur: f32,
    pub scale: f32,
}

/// Compositor tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    pub min_radius: f32,
    pub max_radius: f32,
    pub max_step: Duration,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        CompositorConfig {
            min_radius: 20.0,
            max_radius: 60.0,
            max_step: MAX_TICK_STEP,
        }
    }
}

impl CompositorConfig {
    pub fn validate(&self) -> PcposResult<()> {
        if !(self.min_radius >= 0.0 && self.max_radius >= self.min_radius) {
            return Err(PcposError::InvalidConfig(format!(
                "compositor radius range [{}, {}] is invalid",
                self.min_radius, self.max_radius
            )));
        }
        Ok(())
    }
}

/// Multi-Layer Depth Compositor
#[derive(Debug)]
pub struct MultiLayerDepthCompositor {
    config: CompositorConfig,
    rng: StdRng,
    symbols: Vec<LayeredSymbol>,
    /// Degrees in [0, 360)
    global_rotation: f32,
    period: Option<Duration>,
}

impl MultiLayerDepthCompositor {
    pub fn new(config: CompositorConfig, seed: u64) -> Self {
        MultiLayerDepthCompositor {
            config,
            rng: StdRng::seed_from_u64(seed),
            symbols: Vec::new(),
            global_rotation: 0.0,
            period: None,
        }
    }

    /// Replace the symbol set. Contiguous runs of `ceil(n / 5)` symbols share
    /// a layer; colours cycle through `colors` (white when empty).
    pub fn distribute_symbols<S: AsRef<str>>(
        &mut self,
        symbols: &[S],
        colors: &[Color],
        base_size: f32,
    ) -> &[LayeredSymbol] {
        self.symbols.clear();
        if symbols.is_empty() {
            return &self.symbols;
        }

        let per_layer = symbols.len().div_ceil(LAYER_COUNT);
        let min_radius = self.config.min_radius.min(self.config.max_radius);
        let max_radius = self.config.max_radius.max(self.config.min_radius);
        for (index, symbol) in symbols.iter().enumerate() {
            let layer = (index / per_layer).min(LAYER_COUNT - 1);
            let color = if colors.is_empty() {
                Color::white()
            } else {
                colors[index % colors.len()]
            };
            let angle = self.rng.gen_range(0.0..TAU);
            let radius = self.rng.gen_range(min_radius..=max_radius);
            self.symbols.push(LayeredSymbol {
                symbol_id: symbol.as_ref().to_string(),
                layer: layer as u8,
                base_size,
                color,
                static_offset: (radius * angle.cos(), radius * angle.sin()),
            });
        }
        tracing::debug!(count = self.symbols.len(), per_layer, "symbols distributed");
        &self.symbols
    }

    pub fn symbols(&self) -> &[LayeredSymbol] {
        &self.symbols
    }

    pub fn symbols_in_layer(&self, layer: u8) -> impl Iterator<Item = &LayeredSymbol> {
        self.symbols.iter().filter(move |s| s.layer == layer)
    }

    /// Layers holding at least one symbol, ascending
    pub fn visible_layers(&self) -> Vec<u8> {
        let mut layers: Vec<u8> = self.symbols.iter().map(|s| s.layer).collect();
        layers.dedup();
        layers
    }

    /// Global rotation in degrees
    pub fn global_rotation(&self) -> f32 {
        self.global_rotation
    }

    pub fn set_global_rotation(&mut self, degrees: f32) {
        self.global_rotation = if degrees.is_finite() {
            degrees.rem_euclid(360.0)
        } else {
            0.0
        };
    }

    /// Rotation of `layer` in degrees; indices past the foreground clamp to it
    pub fn rotation_angle(&self, layer: usize) -> f32 {
        self.global_rotation * depth_layer(layer).rotation_multiplier
    }

    /// Rotate a full turn every `period`, repeating. A restart keeps the
    /// current angle so a lock-state change never makes the layers jump.
    pub fn start_rotation(&mut self, period: Duration) {
        if period.is_zero() {
            self.period = None;
            return;
        }
        self.period = Some(period);
        tracing::debug!(?period, "compositor rotation started");
    }

    /// Freeze the rotation where it is
    pub fn stop_rotation(&mut self) {
        self.period = None;
    }

    pub fn is_rotating(&self) -> bool {
        self.period.is_some()
    }

    pub fn rotation_period(&self) -> Option<Duration> {
        self.period
    }

    pub fn tick(&mut self, dt: Duration) {
        let dt = cap_step(dt, self.config.max_step);
        let Some(period) = self.period else { return };
        if dt.is_zero() {
            return;
        }
        let turned = 360.0 * dt.as_secs_f32() / period.as_secs_f32();
        self.global_rotation = (self.global_rotation + turned).rem_euclid(360.0);
    }

    pub fn layer_style(&self, layer: usize) -> LayerStyle {
        let layer = layer.min(LAYER_COUNT - 1);
        let depth = depth_layer(layer);
        LayerStyle {
            layer: layer as u8,
            rotation: self.rotation_angle(layer),
            opacity: depth.opacity,
            blur: depth.blur,
            scale: depth.size,
        }
    }

    pub fn layer_styles(&self) -> [LayerStyle; LAYER_COUNT] {
        std::array::from_fn(|layer| self.layer_style(layer))
    }
}
