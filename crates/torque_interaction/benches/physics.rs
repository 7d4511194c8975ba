use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use torque_interaction::{
    InteractionConfig, Point, PointerInput, Spring, SpringConfig, Surface, Vec2, VelocityTracker,
};

const FRAME: f32 = 1.0 / 60.0;

fn spring_step_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("spring_step");
    for (name, config) in [
        ("underdamped", SpringConfig::wobbly()),
        ("critical", SpringConfig::critically_damped(300.0, 1.0)),
        ("overdamped", SpringConfig::new(3000.0, 110.0, 1.0)),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut spring = Spring::new(config, 0.0);
                spring.set_target(black_box(400.0));
                for _ in 0..60 {
                    spring.step(FRAME);
                }
                black_box(spring.value())
            })
        });
    }
    group.finish();
}

fn velocity_tracker_benchmark(c: &mut Criterion) {
    let mut tracker = VelocityTracker::new();
    for i in 0..20 {
        tracker.add(i as f64 * 8.0, Point::new(0.0, i as f32 * 6.0));
    }
    c.bench_function("velocity_least_squares", |b| {
        b.iter(|| black_box(tracker.velocity()))
    });
}

fn surface_tick_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface_tick");

    for count in [1, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_batched(
                || {
                    (0..count)
                        .map(|_| {
                            let mut surface = Surface::new(InteractionConfig::scroll_container());
                            surface.set_content_extent(5000.0, 800.0);
                            surface.handle_pointer(PointerInput::down(0.0, 400.0, 0.0));
                            surface.handle_pointer(PointerInput::moved(0.0, 300.0, 16.0));
                            surface.handle_pointer(PointerInput::moved(0.0, 200.0, 32.0));
                            surface.tick(FRAME);
                            surface.handle_pointer(PointerInput::up(0.0, 100.0, 48.0));
                            surface
                        })
                        .collect::<Vec<_>>()
                },
                |mut surfaces| {
                    for surface in surfaces.iter_mut() {
                        black_box(surface.tick(FRAME));
                    }
                    black_box(surfaces.first().map(|s| s.state().offset).unwrap_or(Vec2::ZERO))
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    spring_step_benchmark,
    velocity_tracker_benchmark,
    surface_tick_benchmark
);
criterion_main!(benches);
