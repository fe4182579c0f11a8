//! Save/Load functionality for generated layouts
//!
//! Uses bincode for compact binary serialization. A layout is stored whole,
//! navigation graph included, so a loaded layout is ready to query without
//! regenerating.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use delvegen_logic::config::{validate_config, ConfigError};

use crate::layout::Layout;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a layout
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub layout: Layout,
}

/// Save a layout to a writer
pub fn save_layout<W: Write>(writer: W, layout: &Layout) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        layout: layout.clone(),
    };

    bincode::serialize_into(writer, &save_data)?;
    log::debug!(
        "Saved layout for seed {} ({} rooms)",
        layout.config.seed,
        layout.rooms.len()
    );
    Ok(())
}

/// Load a layout from a reader. The stored config must still validate.
pub fn load_layout<R: Read>(reader: R) -> Result<Layout, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let errors = validate_config(&save_data.layout.config);
    if !errors.is_empty() {
        return Err(SaveError::InvalidConfig(errors));
    }

    Ok(save_data.layout)
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
    /// The stored layout carries a config that no longer validates.
    InvalidConfig(Vec<ConfigError>),
    /// No layout has been generated or loaded yet.
    NothingToSave,
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

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveError::InvalidConfig(errors) => {
                write!(f, "Invalid config in save: {} errors", errors.len())
            }
            SaveError::NothingToSave => write!(f, "No layout to save"),
        }
    }
}

impl std::error::Error for SaveError {}
