//! Koi Headless Simulation Harness
//!
//! Runs the pond simulation without a renderer and checks the rules the
//! renderer relies on: fish stay in their ponds, atlas slots are never
//! leaked, schools arrive through the river and saves load back.
//!
//! Usage:
//!   cargo run -p koi-simtest
//!   cargo run -p koi-simtest -- --verbose

use koi_core::atlas::{RandomSource, SlotAtlas};
use koi_core::buffer::BinBuffer;
use koi_core::components::{Fish, Patterns};
use koi_core::config::{validate_config, SimConfig};
use koi_core::constraint::{Constraint, ConstraintCircle};
use koi_core::engine::SimulationEngine;
use koi_core::generation::BLUEPRINTS;
use koi_core::math::{Vec2, Vec3};
use koi_core::path::{BugPath, PathNode};
use koi_core::render::BodyList;
use koi_core::systems::{Pond, SpawnerEvent, SpawnerState, CHECK_FREQUENCY};
use koi_core::water::Ripples;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

// ── Scene (ponds and tunables) ──────────────────────────────────────────
const SCENE_JSON: &str = include_str!("../data/scene.json");

#[derive(Debug, Deserialize)]
struct Scene {
    config: SimConfig,
    ponds: Vec<PondShape>,
    spawn_point: Vec2,
    spawn_direction: Vec2,
}

#[derive(Debug, Deserialize)]
struct PondShape {
    name: String,
    center: Vec2,
    radius: f32,
}

impl Scene {
    fn engine(&self) -> Option<SimulationEngine<ConstraintCircle>> {
        let ponds = self
            .ponds
            .iter()
            .map(|p| Pond::new(ConstraintCircle::new(p.center, p.radius)))
            .collect();

        SimulationEngine::new(
            self.config.clone(),
            ponds,
            self.spawn_point,
            self.spawn_direction,
        )
        .ok()
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Koi Simulation Harness ===\n");

    let mut results = Vec::new();

    let scene: Scene = match serde_json::from_str(SCENE_JSON) {
        Ok(scene) => scene,
        Err(e) => {
            println!("  ✗ scene_parse: JSON parse error: {}", e);
            std::process::exit(1);
        }
    };

    // 1. Scene validation
    results.extend(validate_scene(&scene, verbose));

    // 2. Catalog sampler sweep
    results.extend(validate_catalog(verbose));

    // 3. Mating rules on hand-placed fish
    results.extend(validate_mating());

    // 4. Spawner records
    results.extend(validate_spawner_records());

    // 5. Long run over the whole scene
    results.extend(validate_long_run(&scene, verbose));

    // 6. Save and load
    results.extend(validate_persistence(&scene));

    // 7. Pond reshaping
    results.extend(validate_reshaping(&scene));

    // 8. Bug paths
    results.extend(validate_bug_paths());

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

/// Every fish sits inside the pond it belongs to.
fn all_fish_contained(engine: &SimulationEngine<ConstraintCircle>) -> bool {
    engine.constellation.ponds().iter().all(|pond| {
        pond.fishes()
            .iter()
            .all(|fish| pond.constraint().contains(fish.position.x, fish.position.y))
    })
}

fn ready_fish(blueprint: usize, position: Vec2, atlas: &mut SlotAtlas, rng: &mut StdRng) -> Fish {
    let mut fish = BLUEPRINTS[blueprint]
        .spawn(
            position,
            Vec2::new(1.0, 0.0),
            atlas,
            &Patterns::default(),
            &RandomSource::new(1),
            rng,
        )
        .with_growth(1.0);
    fish.mate_time = fish.mate_delay();
    fish
}

// ── 1. Scene ────────────────────────────────────────────────────────────

fn validate_scene(scene: &Scene, verbose: bool) -> Vec<TestResult> {
    println!("--- Scene ---");
    let mut results = Vec::new();

    let errors = validate_config(&scene.config, scene.ponds.len());
    results.push(TestResult {
        name: "scene_config_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!("{} ponds, river is pond {}", scene.ponds.len(), scene.config.river)
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        },
    });

    let river = scene.ponds.get(scene.config.river);
    let spawn_inside = river.map_or(false, |p| {
        ConstraintCircle::new(p.center, p.radius).contains(scene.spawn_point.x, scene.spawn_point.y)
    });
    results.push(TestResult {
        name: "scene_spawn_in_river".into(),
        passed: spawn_inside,
        detail: format!(
            "spawn point ({:.1}, {:.1}) in {}",
            scene.spawn_point.x,
            scene.spawn_point.y,
            river.map_or("no river", |p| p.name.as_str())
        ),
    });

    let broken = SimConfig {
        fish_capacity: 0,
        river: scene.ponds.len(),
        ..scene.config.clone()
    };
    let caught = validate_config(&broken, scene.ponds.len()).len();
    results.push(TestResult {
        name: "scene_broken_config_caught".into(),
        passed: caught == 2,
        detail: format!("{} errors for zero capacity and missing river", caught),
    });

    if verbose {
        for pond in &scene.ponds {
            println!(
                "    {:6}: center ({:.1}, {:.1}) radius {:.1}",
                pond.name, pond.center.x, pond.center.y, pond.radius
            );
        }
    }

    results
}

// ── 2. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(1);
    let mut atlas = SlotAtlas::new(8);
    let patterns = Patterns::default();

    for (index, blueprint) in BLUEPRINTS.iter().enumerate() {
        let samplers = [
            blueprint.school_size,
            blueprint.growth_speed,
            blueprint.mating_frequency,
            blueprint.offspring_count,
            blueprint.lifetime,
            blueprint.body.length,
            blueprint.body.radius,
        ];
        let out_of_range = samplers
            .iter()
            .flat_map(|s| (0..=100).map(move |i| (s, s.sample(i as f32 / 100.0))))
            .filter(|(s, v)| *v < s.min() - 1e-3 || *v > s.max() + 1e-3)
            .count();
        results.push(TestResult {
            name: format!("catalog_{}_sampler_ranges", index),
            passed: out_of_range == 0,
            detail: format!("{} samples outside [min, max] for {}", out_of_range, blueprint.name),
        });

        let mut bad_genes = 0;
        let mut school_total = 0u32;
        for _ in 0..200 {
            let mut fish = blueprint.spawn(
                Vec2::ZERO,
                Vec2::new(0.0, 1.0),
                &mut atlas,
                &patterns,
                &RandomSource::new(3),
                &mut rng,
            );
            if !blueprint.lifetime.covers(fish.genes.lifetime as f32)
                || !blueprint.growth_speed.covers(fish.genes.growth_speed as f32)
                || !blueprint.body.length.covers(fish.body.length as f32)
            {
                bad_genes += 1;
            }
            school_total += blueprint.school_size(&mut rng) as u32;
            fish.free(&mut atlas);
        }
        results.push(TestResult {
            name: format!("catalog_{}_spawned_genes", index),
            passed: bad_genes == 0,
            detail: format!("{} of 200 {} fish out of range", bad_genes, blueprint.name),
        });

        if verbose {
            println!(
                "    {}: mean school {:.2}",
                blueprint.name,
                school_total as f32 / 200.0
            );
        }
    }

    results.push(TestResult {
        name: "catalog_no_leaked_slots".into(),
        passed: atlas.in_use() == 0,
        detail: format!("{} slots in use after freeing every fish", atlas.in_use()),
    });

    results
}

// ── 3. Mating ───────────────────────────────────────────────────────────

fn validate_mating() -> Vec<TestResult> {
    println!("--- Mating ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(2);
    let mut atlas = SlotAtlas::new(8);
    let mut water = Ripples::new();

    let mut pair = Pond::new(ConstraintCircle::new(Vec2::ZERO, 10.0));
    pair.add_fish(ready_fish(0, Vec2::ZERO, &mut atlas, &mut rng));
    pair.add_fish(ready_fish(0, Vec2::new(0.4, 0.0), &mut atlas, &mut rng));
    let update = pair.update(&mut atlas, &mut water, &mut rng);
    results.push(TestResult {
        name: "mating_pair".into(),
        passed: update.matings == 1,
        detail: format!("{} matings for two ready fish", update.matings),
    });

    let mut trio = Pond::new(ConstraintCircle::new(Vec2::ZERO, 10.0));
    for position in [Vec2::ZERO, Vec2::new(0.3, 0.0), Vec2::new(0.0, 0.3)] {
        trio.add_fish(ready_fish(1, position, &mut atlas, &mut rng));
    }
    let update = trio.update(&mut atlas, &mut water, &mut rng);
    results.push(TestResult {
        name: "mating_trio_refused".into(),
        passed: update.matings == 0 && trio.fishes().iter().all(|f| f.mate_time == 0),
        detail: format!("{} matings for three crowded fish", update.matings),
    });

    results
}

// ── 4. Spawner records ──────────────────────────────────────────────────

fn validate_spawner_records() -> Vec<TestResult> {
    println!("--- Spawner Records ---");
    let mut results = Vec::new();
    let none = BLUEPRINTS.len() as u8;

    let cases: [(&str, [u8; 3], bool); 5] = [
        ("idle", [0, 0, none], true),
        ("spawning", [12, 3, 1], true),
        ("time_past_check", [CHECK_FREQUENCY + 1, 0, none], false),
        ("unknown_blueprint", [0, 1, none + 1], false),
        ("school_without_blueprint", [0, 2, none], false),
    ];

    for (name, bytes, valid) in cases {
        let parsed = SpawnerState::deserialize(&mut BinBuffer::from_bytes(bytes.to_vec()));
        let round_trip = parsed.as_ref().map_or(true, |state| {
            let mut buffer = BinBuffer::new();
            state.serialize(&mut buffer);
            buffer.as_bytes() == bytes
        });
        results.push(TestResult {
            name: format!("spawner_record_{}", name),
            passed: parsed.is_ok() == valid && round_trip,
            detail: match &parsed {
                Ok(state) => format!("{:?} loaded as {:?}", bytes, state.phase()),
                Err(e) => format!("{:?} rejected: {}", bytes, e),
            },
        });
    }

    results
}

// ── 5. Long run ─────────────────────────────────────────────────────────

fn validate_long_run(scene: &Scene, verbose: bool) -> Vec<TestResult> {
    println!("--- Long Run ---");
    let mut results = Vec::new();

    let Some(mut engine) = scene.engine() else {
        results.push(TestResult {
            name: "long_run_engine".into(),
            passed: false,
            detail: "scene did not produce an engine".into(),
        });
        return results;
    };

    let ticks = 40_000;
    let (mut primed, mut spawned, mut blocked) = (0, 0, 0);
    let (mut deaths, mut matings) = (0, 0);
    let mut peak = 0;
    let mut escaped_at = None;
    let mut leaked_at = None;

    for _ in 0..ticks {
        let report = engine.update();
        match report.spawn {
            Some(SpawnerEvent::Primed { .. }) => primed += 1,
            Some(SpawnerEvent::Spawned { .. }) => spawned += 1,
            Some(SpawnerEvent::Blocked { .. }) => blocked += 1,
            None => {}
        }
        deaths += report.deaths;
        matings += report.matings;
        peak = peak.max(engine.fish_count());

        if escaped_at.is_none() && !all_fish_contained(&engine) {
            escaped_at = Some(report.tick);
        }
        if leaked_at.is_none() && engine.atlas.in_use() != engine.fish_count() {
            leaked_at = Some(report.tick);
        }
        engine.take_ripples();
    }

    results.push(TestResult {
        name: "long_run_schools_arrive".into(),
        passed: primed > 0 && spawned > 0,
        detail: format!("{} schools primed, {} fish spawned, {} blocked", primed, spawned, blocked),
    });
    results.push(TestResult {
        name: "long_run_capacity".into(),
        passed: peak + engine.config().spawn_overhead <= engine.config().fish_capacity,
        detail: format!("peak population {} of {}", peak, engine.config().fish_capacity),
    });
    results.push(TestResult {
        name: "long_run_contained".into(),
        passed: escaped_at.is_none(),
        detail: match escaped_at {
            None => "every fish stayed in its pond".into(),
            Some(tick) => format!("fish outside its pond at tick {}", tick),
        },
    });
    results.push(TestResult {
        name: "long_run_atlas_balanced".into(),
        passed: leaked_at.is_none(),
        detail: match leaked_at {
            None => format!("{} slots for {} fish", engine.atlas.in_use(), engine.fish_count()),
            Some(tick) => format!("slot count diverged at tick {}", tick),
        },
    });

    let mut bodies = BodyList::new();
    engine.render(&mut bodies, 0.5);
    results.push(TestResult {
        name: "long_run_render".into(),
        passed: bodies.bodies.len() == engine.fish_count()
            && bodies.bodies.iter().all(|b| b.slot.is_some()),
        detail: format!("{} bodies rendered", bodies.bodies.len()),
    });

    if verbose {
        println!(
            "    {} ticks: {} deaths, {} matings, {} fish alive",
            ticks,
            deaths,
            matings,
            engine.fish_count()
        );
    }

    results
}

// ── 6. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(scene: &Scene) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let (Some(mut engine), Some(mut restored)) = (scene.engine(), scene.engine()) else {
        results.push(TestResult {
            name: "persistence_engine".into(),
            passed: false,
            detail: "scene did not produce an engine".into(),
        });
        return results;
    };

    for _ in 0..12_000 {
        engine.update();
    }

    let mut bytes = Vec::new();
    let outcome = engine
        .save(&mut bytes)
        .and_then(|_| restored.load(&bytes[..]));

    results.push(TestResult {
        name: "persistence_round_trip".into(),
        passed: outcome.is_ok()
            && restored.fish_count() == engine.fish_count()
            && restored.spawner == engine.spawner
            && restored.tick() == engine.tick(),
        detail: match outcome {
            Ok(()) => format!(
                "{} bytes, {} fish restored",
                bytes.len(),
                restored.fish_count()
            ),
            Err(e) => format!("load failed: {}", e),
        },
    });

    bytes.truncate(bytes.len() / 2);
    let before = restored.fish_count();
    let truncated = restored.load(&bytes[..]);
    results.push(TestResult {
        name: "persistence_truncated_rejected".into(),
        passed: truncated.is_err() && restored.fish_count() == before,
        detail: match truncated {
            Ok(()) => "truncated save loaded".into(),
            Err(e) => format!("rejected: {}", e),
        },
    });

    results
}

// ── 7. Reshaping ────────────────────────────────────────────────────────

fn validate_reshaping(scene: &Scene) -> Vec<TestResult> {
    println!("--- Reshaping ---");
    let mut results = Vec::new();

    let Some(mut engine) = scene.engine() else {
        return results;
    };

    for _ in 0..15_000 {
        engine.update();
    }

    let river = engine.constellation.river_index();
    let before = engine.constellation.river().fish_count();
    let shape = *engine.constellation.river().constraint();
    let shrunk = ConstraintCircle::new(shape.center + Vec2::new(1.0, 0.0), shape.radius * 0.5);
    let removed = engine.replace_constraint(river, shrunk).unwrap_or(0);

    results.push(TestResult {
        name: "reshape_subset".into(),
        passed: engine.constellation.river().fish_count() + removed == before
            && all_fish_contained(&engine),
        detail: format!("{} of {} river fish kept", before - removed, before),
    });
    results.push(TestResult {
        name: "reshape_slots_freed".into(),
        passed: engine.atlas.in_use() == engine.fish_count(),
        detail: format!("{} slots for {} fish", engine.atlas.in_use(), engine.fish_count()),
    });

    results
}

// ── 8. Bug paths ────────────────────────────────────────────────────────

fn validate_bug_paths() -> Vec<TestResult> {
    println!("--- Bug Paths ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(8);

    let Some(mut path) = BugPath::new(vec![
        PathNode::new(Vec3::new(0.0, 0.0, 0.5)),
        PathNode::new(Vec3::new(2.0, 1.0, 0.8)),
        PathNode::new(Vec3::new(4.0, 0.0, 0.6)),
        PathNode::new(Vec3::new(5.0, -2.0, 0.4)),
    ]) else {
        return results;
    };

    let start = path.start();
    results.push(TestResult {
        name: "path_starts_at_start".into(),
        passed: path.position().distance(&start) < 1e-5,
        detail: format!("length {:.3}", path.length()),
    });

    let mut steps = 0;
    while !path.move_by(0.01) {
        steps += 1;
    }
    let expected = (path.length() / 0.01) as i32;
    results.push(TestResult {
        name: "path_completes_at_length".into(),
        passed: (steps - expected).abs() <= 1,
        detail: format!("{} steps, expected about {}", steps, expected),
    });

    let samples = 500;
    let early = (0..samples)
        .filter(|_| {
            path.set_random_position(&mut rng);
            path.at() < path.length() * 0.5
        })
        .count();
    results.push(TestResult {
        name: "path_random_start_bias".into(),
        passed: early > samples / 2,
        detail: format!("{} of {} starts in the first half", early, samples),
    });

    results.push(TestResult {
        name: "path_empty_refused".into(),
        passed: BugPath::new(Vec::new()).is_none(),
        detail: "empty node list".into(),
    });

    results
}
