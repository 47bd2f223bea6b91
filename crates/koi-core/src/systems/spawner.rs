//! Spawner - seeds schools of new fish into the river.

use rand::Rng;

use crate::atlas::{Atlas, RandomSource};
use crate::buffer::{BinBuffer, FormatError};
use crate::components::Patterns;
use crate::constraint::Constraint;
use crate::generation::{BlueprintId, BLUEPRINTS};
use crate::math::Vec2;

use super::pond::Pond;

/// Ticks between two spawn decisions.
pub const CHECK_FREQUENCY: u8 = 30;
/// Chance per decision that an idle spawner primes a new school.
pub const PRIME_CHANCE: f32 = 0.1;
/// Default maximum number of fish across all ponds.
pub const FISH_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPhase {
    Idle,
    Spawning {
        blueprint: BlueprintId,
        remaining: u8,
    },
}

/// Where new fish enter and how crowded the ponds are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSite {
    pub point: Vec2,
    pub direction: Vec2,
    /// Fish across every pond
    pub population: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnLimits {
    /// Schools are only primed while the river holds fewer fish than this
    pub limit: usize,
    /// Added to the population before comparing against the capacity
    pub overhead: usize,
    pub capacity: usize,
}

impl Default for SpawnLimits {
    fn default() -> Self {
        Self {
            limit: 8,
            overhead: 0,
            capacity: FISH_CAPACITY,
        }
    }
}

/// Decision taken on a check tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnerEvent {
    Spawned { blueprint: BlueprintId, remaining: u8 },
    /// Capacity was reached; the school still shrank by one.
    Blocked { blueprint: BlueprintId, remaining: u8 },
    Primed { blueprint: BlueprintId, school: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnerState {
    time: u8,
    phase: SpawnPhase,
}

impl SpawnerState {
    pub fn new() -> Self {
        Self {
            time: 0,
            phase: SpawnPhase::Idle,
        }
    }

    pub fn time(&self) -> u8 {
        self.time
    }

    pub fn phase(&self) -> SpawnPhase {
        self.phase
    }

    pub fn is_spawning(&self) -> bool {
        matches!(self.phase, SpawnPhase::Spawning { .. })
    }

    /// Advance one tick, taking a decision every [`CHECK_FREQUENCY`] ticks.
    #[allow(clippy::too_many_arguments)]
    pub fn update<C: Constraint>(
        &mut self,
        site: &SpawnSite,
        river: &mut Pond<C>,
        atlas: &mut impl Atlas,
        patterns: &Patterns,
        random_source: &RandomSource,
        limits: &SpawnLimits,
        rng: &mut impl Rng,
    ) -> Option<SpawnerEvent> {
        self.time = self.time.saturating_add(1);

        if self.time < CHECK_FREQUENCY {
            return None;
        }

        self.time = 0;

        match self.phase {
            SpawnPhase::Spawning {
                blueprint,
                remaining,
            } => {
                let room = site.population + limits.overhead < limits.capacity;

                if room {
                    river.add_fish(blueprint.blueprint().spawn(
                        site.point,
                        site.direction,
                        atlas,
                        patterns,
                        random_source,
                        rng,
                    ));
                }

                // A blocked spawn still uses up its place in the school
                let remaining = remaining.saturating_sub(1);
                self.phase = if remaining == 0 {
                    SpawnPhase::Idle
                } else {
                    SpawnPhase::Spawning {
                        blueprint,
                        remaining,
                    }
                };

                if room {
                    log::info!(
                        "Spawned a {} koi, {} left in school",
                        blueprint.blueprint().name,
                        remaining
                    );

                    Some(SpawnerEvent::Spawned {
                        blueprint,
                        remaining,
                    })
                } else {
                    log::warn!(
                        "Fish capacity reached ({} + {} >= {}), {} koi not spawned",
                        site.population,
                        limits.overhead,
                        limits.capacity,
                        blueprint.blueprint().name
                    );

                    Some(SpawnerEvent::Blocked {
                        blueprint,
                        remaining,
                    })
                }
            }
            SpawnPhase::Idle => {
                if river.fish_count() >= limits.limit || rng.gen::<f32>() >= PRIME_CHANCE {
                    return None;
                }

                let blueprint = BlueprintId::new(rng.gen_range(0..BLUEPRINTS.len()))?;
                let school = blueprint.blueprint().school_size(rng);

                self.phase = SpawnPhase::Spawning {
                    blueprint,
                    remaining: school,
                };

                log::info!(
                    "Primed a school of {} {} koi",
                    school,
                    blueprint.blueprint().name
                );

                Some(SpawnerEvent::Primed { blueprint, school })
            }
        }
    }

    pub fn serialize(&self, buffer: &mut BinBuffer) {
        let (school, index) = match self.phase {
            SpawnPhase::Idle => (0, BLUEPRINTS.len() as u8),
            SpawnPhase::Spawning {
                blueprint,
                remaining,
            } => (remaining, blueprint.index() as u8),
        };

        buffer.write_u8(self.time);
        buffer.write_u8(school);
        buffer.write_u8(index);
    }

    pub fn deserialize(buffer: &mut BinBuffer) -> Result<Self, FormatError> {
        let time = buffer.read_u8()?;
        let school = buffer.read_u8()?;
        let index = buffer.read_u8()?;

        if time > CHECK_FREQUENCY {
            return Err(FormatError::OutOfRange {
                field: "spawner time",
                value: time as u32,
            });
        }

        if index as usize > BLUEPRINTS.len() {
            return Err(FormatError::OutOfRange {
                field: "spawner blueprint",
                value: index as u32,
            });
        }

        let phase = match BlueprintId::new(index as usize) {
            Some(blueprint) if school != 0 => SpawnPhase::Spawning {
                blueprint,
                remaining: school,
            },
            None if school != 0 => {
                return Err(FormatError::OutOfRange {
                    field: "spawner school",
                    value: school as u32,
                })
            }
            _ => SpawnPhase::Idle,
        };

        Ok(Self { time, phase })
    }
}

impl Default for SpawnerState {
    fn default() -> Self {
        Self::new()
    }
}
