//! Benchmarks for PCPOS motion and visual components

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pcpos_core::{Color, Mood, NullSink};
use pcpos_motion::{
    speech_animation, AvatarMovementEngine, HeadConfig, HeadRotationController, MovementConfig,
};
use pcpos_visual::{stage_palette, symbol_pool, CompositorConfig, FaceIdStage, MultiLayerDepthCompositor};

const FRAME: Duration = Duration::from_micros(16_667);

fn bench_movement_tick(c: &mut Criterion) {
    let mut engine = AvatarMovementEngine::new(MovementConfig::default(), Arc::new(NullSink));
    engine.update_movement(Mood::Excited, 0.9, 0.0);

    c.bench_function("movement_tick_energetic", |b| {
        b.iter(|| {
            let state = engine.tick(black_box(FRAME));
            black_box(state.offset_x)
        })
    });
}

fn bench_head_tick(c: &mut Criterion) {
    let mut head = HeadRotationController::new(HeadConfig::default(), Arc::new(NullSink));

    c.bench_function("head_tick_turning", |b| {
        let mut i = 0u32;
        b.iter(|| {
            // Keep a turn in flight
            if !head.is_animating() {
                i = i.wrapping_add(1);
                let yaw = if i % 2 == 0 { 30.0 } else { -30.0 };
                head.turn_head(yaw, Duration::from_millis(500));
            }
            black_box(head.tick(black_box(FRAME)))
        })
    });
}

fn bench_compositor_distribute(c: &mut Criterion) {
    let mut compositor = MultiLayerDepthCompositor::new(CompositorConfig::default(), 7);
    let symbols = symbol_pool(FaceIdStage::Unlocked);
    let palette: Vec<Color> = stage_palette(FaceIdStage::Unlocked);

    c.bench_function("compositor_distribute_30", |b| {
        b.iter(|| {
            let placed = compositor.distribute_symbols(black_box(&symbols), &palette, 24.0);
            black_box(placed.len())
        })
    });
}

fn bench_compositor_layer_styles(c: &mut Criterion) {
    let mut compositor = MultiLayerDepthCompositor::new(CompositorConfig::default(), 7);
    compositor.start_rotation(Duration::from_secs(4));

    c.bench_function("compositor_tick_and_styles", |b| {
        b.iter(|| {
            compositor.tick(black_box(FRAME));
            black_box(compositor.layer_styles())
        })
    });
}

fn bench_speech_animation(c: &mut Criterion) {
    c.bench_function("speech_animation", |b| {
        let mut phase = 0.0f32;
        b.iter(|| {
            phase = (phase + 0.07).fract();
            black_box(speech_animation(black_box(0.8), phase))
        })
    });
}

criterion_group!(
    benches,
    bench_movement_tick,
    bench_head_tick,
    bench_compositor_distribute,
    bench_compositor_layer_styles,
    bench_speech_animation,
);
criterion_main!(benches);
