use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use koi_core::atlas::{RandomSource, SlotAtlas};
use koi_core::components::Patterns;
use koi_core::constraint::ConstraintCircle;
use koi_core::generation::BLUEPRINTS;
use koi_core::math::Vec2;
use koi_core::systems::Pond;
use koi_core::water::Ripples;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn populated_pond(count: usize, atlas: &mut SlotAtlas, rng: &mut StdRng) -> Pond<ConstraintCircle> {
    let radius = (count as f32).sqrt() * 1.5;
    let mut pond = Pond::new(ConstraintCircle::new(Vec2::ZERO, radius));
    let source = RandomSource::new(1);
    let patterns = Patterns::default();

    for i in 0..count {
        let position = Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU))
            * (radius * rng.gen::<f32>().sqrt() * 0.9);
        let blueprint = &BLUEPRINTS[i % BLUEPRINTS.len()];

        pond.add_fish(blueprint.spawn(
            position,
            Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU)),
            atlas,
            &patterns,
            &source,
            rng,
        ));
    }

    pond
}

fn bench_pond_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("pond_update");
    // Ticks per bench iteration (can override via KOI_BENCH_TICKS)
    let ticks: usize = std::env::var("KOI_BENCH_TICKS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(32);

    for &fish in &[16_usize, 64, 128] {
        group.bench_function(format!("ticks{}_fish{}", ticks, fish), |b| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
                    let mut atlas = SlotAtlas::new(fish);
                    let pond = populated_pond(fish, &mut atlas, &mut rng);
                    (pond, atlas, Ripples::new(), rng)
                },
                |(mut pond, mut atlas, mut water, mut rng)| {
                    for _ in 0..ticks {
                        pond.update(&mut atlas, &mut water, &mut rng);
                    }
                    pond.fish_count()
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pond_update);
criterion_main!(benches);
