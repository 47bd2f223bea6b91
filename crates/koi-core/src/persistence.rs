//! Save/Load functionality for persisting simulation state
//!
//! The spawner and every pond write themselves into compact binary records;
//! bincode wraps those records in a versioned envelope.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::atlas::RandomSource;
use crate::buffer::{BinBuffer, FormatError};
use crate::constraint::Constraint;
use crate::systems::{Constellation, SpawnerState};

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the simulation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Ticks simulated so far
    pub tick: u64,
    /// Seed patterns are rendered with
    pub pattern_seed: u32,
    /// Spawner record
    pub spawner: Vec<u8>,
    /// One pond record per pond, in constellation order
    pub ponds: Vec<Vec<u8>>,
}

impl SaveData {
    pub fn capture<C: Constraint>(
        tick: u64,
        random_source: &RandomSource,
        spawner: &SpawnerState,
        constellation: &Constellation<C>,
    ) -> Self {
        let mut buffer = BinBuffer::new();
        spawner.serialize(&mut buffer);

        let ponds = constellation
            .ponds()
            .iter()
            .map(|pond| {
                let mut buffer = BinBuffer::new();
                pond.serialize(&mut buffer);
                buffer.into_bytes()
            })
            .collect();

        Self {
            version: SAVE_VERSION,
            tick,
            pattern_seed: random_source.seed(),
            spawner: buffer.into_bytes(),
            ponds,
        }
    }

    pub fn spawner_state(&self) -> Result<SpawnerState, FormatError> {
        SpawnerState::deserialize(&mut BinBuffer::from_bytes(self.spawner.clone()))
    }
}

/// Save a snapshot to a writer
pub fn save_simulation<W: Write>(writer: W, save_data: &SaveData) -> Result<(), SaveError> {
    bincode::serialize_into(writer, save_data)?;
    Ok(())
}

/// Load a snapshot from a reader, rejecting other format versions
pub fn load_simulation<R: Read>(reader: R) -> Result<SaveData, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    Ok(save_data)
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    Format(FormatError),
    VersionMismatch { expected: u32, found: u32 },
    PondCountMismatch { expected: usize, found: usize },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl From<FormatError> for SaveError {
    fn from(e: FormatError) -> Self {
        SaveError::Format(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::Format(e) => write!(f, "Invalid record: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveError::PondCountMismatch { expected, found } => {
                write!(
                    f,
                    "Save holds {} ponds, scene has {}",
                    found, expected
                )
            }
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            SaveError::Bincode(e) => Some(e),
            SaveError::Format(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SaveData {
        SaveData {
            version: SAVE_VERSION,
            tick: 420,
            pattern_seed: 9,
            spawner: vec![5, 0, 2],
            ponds: vec![vec![0, 0], vec![0, 0]],
        }
    }

    #[test]
    fn test_envelope_round_trip() {
        let mut bytes = Vec::new();
        save_simulation(&mut bytes, &sample()).expect("Save failed");

        let loaded = load_simulation(&bytes[..]).expect("Load failed");
        assert_eq!(loaded, sample());
        assert_eq!(loaded.spawner_state().map(|s| s.time()), Ok(5));
    }

    #[test]
    fn test_version_mismatch() {
        let mut data = sample();
        data.version = SAVE_VERSION + 1;

        let mut bytes = Vec::new();
        save_simulation(&mut bytes, &data).unwrap();

        assert!(matches!(
            load_simulation(&bytes[..]),
            Err(SaveError::VersionMismatch { found, .. }) if found == SAVE_VERSION + 1
        ));
    }

    #[test]
    fn test_truncated_envelope() {
        let mut bytes = Vec::new();
        save_simulation(&mut bytes, &sample()).unwrap();
        bytes.truncate(6);

        assert!(matches!(
            load_simulation(&bytes[..]),
            Err(SaveError::Bincode(_))
        ));
    }
}
