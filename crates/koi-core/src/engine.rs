//! Simulation engine - main entry point for running the simulation

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::atlas::{RandomSource, SlotAtlas};
use crate::buffer::BinBuffer;
use crate::components::{Fish, Patterns};
use crate::config::{validate_config, ConfigError, SimConfig};
use crate::constraint::Constraint;
use crate::math::Vec2;
use crate::persistence::{load_simulation, save_simulation, SaveData, SaveError};
use crate::render::Bodies;
use crate::systems::{Constellation, Pond, SpawnLimits, SpawnerEvent, SpawnerState};
use crate::water::{Ripple, Ripples};

/// Summary of one simulation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub spawn: Option<SpawnerEvent>,
    pub deaths: usize,
    pub matings: usize,
}

/// Main simulation engine
#[derive(Debug)]
pub struct SimulationEngine<C: Constraint> {
    /// Every pond, including the river
    pub constellation: Constellation<C>,
    pub spawner: SpawnerState,
    /// Pattern slots of every fish in every pond
    pub atlas: SlotAtlas,
    ripples: Ripples,
    random_source: RandomSource,
    patterns: Patterns,
    limits: SpawnLimits,
    config: SimConfig,
    rng: StdRng,
    tick: u64,
}

impl<C: Constraint + Clone> SimulationEngine<C> {
    /// Create an engine over `ponds`. Fails with every configuration problem
    /// found.
    pub fn new(
        config: SimConfig,
        ponds: Vec<Pond<C>>,
        spawn_point: Vec2,
        spawn_direction: Vec2,
    ) -> Result<Self, Vec<ConfigError>> {
        let errors = validate_config(&config, ponds.len());

        if !errors.is_empty() {
            return Err(errors);
        }

        let pond_count = ponds.len();
        let constellation = Constellation::new(ponds, config.river, spawn_point, spawn_direction)
            .ok_or_else(|| {
                vec![ConfigError::RiverOutOfRange {
                    river: config.river,
                    ponds: pond_count,
                }]
            })?;
        let mut rng = StdRng::seed_from_u64(config.seed);

        Ok(Self {
            constellation,
            spawner: SpawnerState::new(),
            atlas: SlotAtlas::new(config.atlas_capacity),
            ripples: Ripples::new(),
            random_source: RandomSource::from_rng(&mut rng),
            patterns: config.patterns(),
            limits: config.spawn_limits(),
            config,
            rng,
            tick: 0,
        })
    }

    /// Advance the simulation by one tick: the spawner feeds the river,
    /// then every pond updates.
    pub fn update(&mut self) -> TickReport {
        self.tick += 1;

        let site = self.constellation.spawn_site();
        let spawn = self.spawner.update(
            &site,
            self.constellation.river_mut(),
            &mut self.atlas,
            &self.patterns,
            &self.random_source,
            &self.limits,
            &mut self.rng,
        );

        let mut report = TickReport {
            tick: self.tick,
            spawn,
            ..Default::default()
        };

        for pond in self.constellation.ponds_mut() {
            let result = pond.update(&mut self.atlas, &mut self.ripples, &mut self.rng);
            report.deaths += result.deaths;
            report.matings += result.matings;
        }

        if self.atlas.take_resized() {
            self.update_atlas();
        }

        report
    }

    /// Write every pattern into the atlas again.
    pub fn update_atlas(&mut self) {
        for pond in self.constellation.ponds() {
            pond.update_atlas(&mut self.atlas, &self.random_source);
        }
    }

    pub fn render(&self, bodies: &mut impl Bodies, time: f32) {
        for pond in self.constellation.ponds() {
            pond.render(bodies, time);
        }
    }

    /// Pick up the fish under the point. The fish keeps its atlas slot
    /// until it is dropped again.
    pub fn pick(&mut self, pond: usize, x: f32, y: f32) -> Option<Fish> {
        self.constellation.pond_mut(pond)?.pick(x, y)
    }

    /// Put a picked fish down at a point. A fish dropped outside the pond is
    /// discarded. Returns whether the fish was placed.
    ///
    /// A fish picked before a [`load`](Self::load) holds a slot of the old
    /// atlas; it gets a fresh slot here and never touches the new atlas's
    /// slots.
    pub fn drop_fish(&mut self, pond: usize, mut fish: Fish, x: f32, y: f32) -> bool {
        match self.constellation.pond_mut(pond) {
            Some(target) if target.constraint().contains(x, y) => {
                fish.move_to(Vec2::new(x, y));
                fish.attach(&mut self.atlas, &self.random_source);
                target.add_fish(fish);
                true
            }
            _ => {
                fish.free(&mut self.atlas);
                log::debug!("Fish dropped outside pond {}", pond);
                false
            }
        }
    }

    /// Replace the shape of a pond, remapping its fish.
    pub fn replace_constraint(&mut self, pond: usize, constraint: C) -> Option<usize> {
        let target = self.constellation.pond_mut(pond)?;

        Some(target.replace_constraint(constraint, &mut self.atlas))
    }

    /// Hand pending water disturbances to the caller. Between calls at most
    /// [`RIPPLE_CAPACITY`](crate::water::RIPPLE_CAPACITY) are kept.
    pub fn take_ripples(&mut self) -> Vec<Ripple> {
        self.ripples.drain().collect()
    }

    pub fn pending_ripples(&self) -> usize {
        self.ripples.len()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn fish_count(&self) -> usize {
        self.constellation.fish_count()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn random_source(&self) -> &RandomSource {
        &self.random_source
    }

    /// Save simulation state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        let save_data = SaveData::capture(
            self.tick,
            &self.random_source,
            &self.spawner,
            &self.constellation,
        );

        save_simulation(writer, &save_data)
    }

    /// Load simulation state from a reader. Pond shapes stay as they are;
    /// only their fish are replaced. On error the engine is unchanged.
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let loaded = load_simulation(reader)?;

        if loaded.ponds.len() != self.constellation.pond_count() {
            return Err(SaveError::PondCountMismatch {
                expected: self.constellation.pond_count(),
                found: loaded.ponds.len(),
            });
        }

        let spawner = loaded.spawner_state()?;
        let random_source = RandomSource::new(loaded.pattern_seed);
        let mut atlas = self.atlas.successor(self.config.atlas_capacity);
        let mut ponds = Vec::with_capacity(loaded.ponds.len());

        for (pond, bytes) in self.constellation.ponds().iter().zip(loaded.ponds) {
            let mut restored = Pond::new(pond.constraint().clone());
            restored.deserialize(
                &mut BinBuffer::from_bytes(bytes),
                &mut atlas,
                &self.patterns,
                &random_source,
            )?;
            ponds.push(restored);
        }

        for (pond, restored) in self.constellation.ponds_mut().iter_mut().zip(ponds) {
            *pond = restored;
        }

        self.spawner = spawner;
        self.atlas = atlas;
        self.random_source = random_source;
        self.ripples = Ripples::new();
        self.tick = loaded.tick;
        // The random stream itself is not saved; continue from a stream
        // derived from the seed and the tick.
        self.rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(loaded.tick));

        log::info!(
            "Loaded {} fish at tick {}",
            self.constellation.fish_count(),
            self.tick
        );

        Ok(())
    }
}
