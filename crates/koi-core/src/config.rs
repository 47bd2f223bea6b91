//! Simulation configuration, loadable from JSON.

use serde::{Deserialize, Serialize};

use crate::components::Patterns;
use crate::systems::{SpawnLimits, FISH_CAPACITY};

/// Tunables for a [`SimulationEngine`](crate::engine::SimulationEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the simulation's random stream
    pub seed: u64,
    /// Index of the pond new fish are spawned into
    pub river: usize,
    /// Schools are only primed while the river holds fewer fish
    pub river_limit: usize,
    /// Reserved headroom below the fish capacity
    pub spawn_overhead: usize,
    /// Maximum number of fish across all ponds
    pub fish_capacity: usize,
    /// Initial number of atlas slots
    pub atlas_capacity: usize,
    pub palette_width: u8,
    pub palette_height: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            river: 0,
            river_limit: 8,
            spawn_overhead: 0,
            fish_capacity: FISH_CAPACITY,
            atlas_capacity: 64,
            palette_width: 16,
            palette_height: 16,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn spawn_limits(&self) -> SpawnLimits {
        SpawnLimits {
            limit: self.river_limit,
            overhead: self.spawn_overhead,
            capacity: self.fish_capacity,
        }
    }

    pub fn patterns(&self) -> Patterns {
        Patterns::new(self.palette_width, self.palette_height)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No fish could ever be spawned.
    ZeroFishCapacity,
    /// The overhead swallows the whole capacity.
    OverheadExceedsCapacity { overhead: usize, capacity: usize },
    ZeroAtlasCapacity,
    /// Palette dimensions must be nonzero.
    EmptyPalette,
    /// The river index does not name a pond.
    RiverOutOfRange { river: usize, ponds: usize },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroFishCapacity => write!(f, "fish capacity must be nonzero"),
            ConfigError::OverheadExceedsCapacity { overhead, capacity } => write!(
                f,
                "spawn overhead {} leaves no room below capacity {}",
                overhead, capacity
            ),
            ConfigError::ZeroAtlasCapacity => write!(f, "atlas capacity must be nonzero"),
            ConfigError::EmptyPalette => write!(f, "palette dimensions must be nonzero"),
            ConfigError::RiverOutOfRange { river, ponds } => {
                write!(f, "river index {} out of range for {} ponds", river, ponds)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate a configuration against a scene of `pond_count` ponds,
/// returning all errors found.
pub fn validate_config(config: &SimConfig, pond_count: usize) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.fish_capacity == 0 {
        errors.push(ConfigError::ZeroFishCapacity);
    } else if config.spawn_overhead >= config.fish_capacity {
        errors.push(ConfigError::OverheadExceedsCapacity {
            overhead: config.spawn_overhead,
            capacity: config.fish_capacity,
        });
    }
    if config.atlas_capacity == 0 {
        errors.push(ConfigError::ZeroAtlasCapacity);
    }
    if config.palette_width == 0 || config.palette_height == 0 {
        errors.push(ConfigError::EmptyPalette);
    }
    if config.river >= pond_count {
        errors.push(ConfigError::RiverOutOfRange {
            river: config.river,
            ponds: pond_count,
        });
    }

    errors
}
