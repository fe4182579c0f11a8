//! Generator configuration and validation.
//!
//! Values are fixed for a run. Everything is checked up front by
//! [`validate_config`], which reports every problem it finds rather than
//! stopping at the first, so that a bad config never reaches the
//! partitioner (an undersized `max_room_size` would otherwise keep it
//! splitting forever).
//!
//! ```
//! use delvegen_logic::config::{GeneratorConfig, validate_config};
//!
//! let config = GeneratorConfig {
//!     seed: 7,
//!     size: (60, 40),
//!     ..Default::default()
//! };
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};

pub use crate::graph::TraversalMode;

/// Smallest room side that still fits a wall ring and a 2-cell doorway with
/// a 1-cell margin at each end.
pub const MIN_ROOM_SIDE: i32 = 4;

/// Smallest shared-wall area that can hold a margined 2-cell doorway.
pub const MIN_DOOR_AREA: i32 = 4;

/// Every decoration attempt re-checks navigation connectivity, so the
/// per-room count is capped.
pub const MAX_DECORATIONS_PER_ROOM: u32 = 64;

/// Options for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Root of all randomness for the run.
    pub seed: u64,
    /// Root rectangle `(width, height)`.
    pub size: (i32, i32),
    /// A room is split while it is larger than this on either axis.
    pub max_room_size: (i32, i32),
    /// No split ever produces a side shorter than this.
    pub min_room_size: i32,
    /// Split ratio is `2 ± max_split_offset`.
    pub max_split_offset: f32,
    /// Share of rooms to prune, in percent (0–100).
    pub remove_percentage: f32,
    /// Minimum shared-wall area for two rooms to count as adjacent.
    pub door_area: i32,
    /// Probability that a door is a wide hallway opening.
    pub hallway_chance: f32,
    /// Traversal used to reduce the room graph to a spanning tree.
    pub traversal: TraversalMode,
    /// Upper bound on decorations placed in each room.
    pub max_decorations_per_room: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            size: (100, 50),
            max_room_size: (10, 10),
            min_room_size: 4,
            max_split_offset: 0.5,
            remove_percentage: 10.0,
            door_area: 4,
            hallway_chance: 0.2,
            traversal: TraversalMode::Bfs,
            max_decorations_per_room: 0,
        }
    }
}

impl GeneratorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Share of rooms to prune as a fraction in `[0, 1]`.
    pub fn removal_fraction(&self) -> f32 {
        self.remove_percentage / 100.0
    }

    /// Validate, returning the config itself when it is usable.
    pub fn validated(self) -> Result<Self, Vec<ConfigError>> {
        let errors = validate_config(&self);
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(errors)
        }
    }
}

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Root rectangle smaller than a single room.
    SizeTooSmall { width: i32, height: i32, min: i32 },
    /// Minimum room side can't hold walls plus a doorway.
    MinRoomSizeTooSmall { min_room_size: i32, required: i32 },
    /// Maximum room size leaves no room for two halves of at least the minimum side.
    MaxRoomSizeTooSmall {
        axis: &'static str,
        max_room_size: i32,
        required: i32,
    },
    /// Split offset outside `[0, 1)`.
    SplitOffsetOutOfRange(f32),
    /// Removal percentage outside `[0, 100]`.
    RemovePercentageOutOfRange(f32),
    /// Door area can't hold a margined doorway (includes non-positive values).
    DoorAreaTooSmall { door_area: i32, required: i32 },
    /// Hallway chance outside `[0, 1]`.
    HallwayChanceOutOfRange(f32),
    /// More decorations per room than [`MAX_DECORATIONS_PER_ROOM`].
    TooManyDecorations { max_decorations_per_room: u32, limit: u32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::SizeTooSmall { width, height, min } => write!(
                f,
                "dungeon size {}x{} is smaller than the minimum room side {}",
                width, height, min
            ),
            ConfigError::MinRoomSizeTooSmall {
                min_room_size,
                required,
            } => write!(
                f,
                "min_room_size {} is below {} (walls plus a 2-cell doorway)",
                min_room_size, required
            ),
            ConfigError::MaxRoomSizeTooSmall {
                axis,
                max_room_size,
                required,
            } => write!(
                f,
                "max_room_size {} on the {} axis must be at least {} so splitting terminates",
                max_room_size, axis, required
            ),
            ConfigError::SplitOffsetOutOfRange(v) => {
                write!(f, "max_split_offset {} must be in [0, 1)", v)
            }
            ConfigError::RemovePercentageOutOfRange(v) => {
                write!(f, "remove_percentage {} must be in [0, 100]", v)
            }
            ConfigError::DoorAreaTooSmall {
                door_area,
                required,
            } => write!(f, "door_area {} must be at least {}", door_area, required),
            ConfigError::HallwayChanceOutOfRange(v) => {
                write!(f, "hallway_chance {} must be in [0, 1]", v)
            }
            ConfigError::TooManyDecorations {
                max_decorations_per_room,
                limit,
            } => write!(
                f,
                "max_decorations_per_room {} exceeds the limit of {}",
                max_decorations_per_room, limit
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &GeneratorConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.min_room_size < MIN_ROOM_SIDE {
        errors.push(ConfigError::MinRoomSizeTooSmall {
            min_room_size: config.min_room_size,
            required: MIN_ROOM_SIDE,
        });
    }

    let min_side = config.min_room_size.max(MIN_ROOM_SIDE);
    let (width, height) = config.size;
    if width < min_side || height < min_side {
        errors.push(ConfigError::SizeTooSmall {
            width,
            height,
            min: min_side,
        });
    }

    // A side longer than max must split into two halves of at least
    // min_side that overlap by one cell: len >= 2 * min_side - 1.
    let required_max = 2 * min_side - 2;
    for (axis, max) in [("x", config.max_room_size.0), ("y", config.max_room_size.1)] {
        if max < required_max {
            errors.push(ConfigError::MaxRoomSizeTooSmall {
                axis,
                max_room_size: max,
                required: required_max,
            });
        }
    }

    if !(0.0..1.0).contains(&config.max_split_offset) {
        errors.push(ConfigError::SplitOffsetOutOfRange(config.max_split_offset));
    }
    if !(0.0..=100.0).contains(&config.remove_percentage) {
        errors.push(ConfigError::RemovePercentageOutOfRange(
            config.remove_percentage,
        ));
    }
    if config.door_area < MIN_DOOR_AREA {
        errors.push(ConfigError::DoorAreaTooSmall {
            door_area: config.door_area,
            required: MIN_DOOR_AREA,
        });
    }
    if !(0.0..=1.0).contains(&config.hallway_chance) {
        errors.push(ConfigError::HallwayChanceOutOfRange(config.hallway_chance));
    }
    if config.max_decorations_per_room > MAX_DECORATIONS_PER_ROOM {
        errors.push(ConfigError::TooManyDecorations {
            max_decorations_per_room: config.max_decorations_per_room,
            limit: MAX_DECORATIONS_PER_ROOM,
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let errors = validate_config(&GeneratorConfig::default());
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_non_positive_door_area_rejected() {
        for door_area in [0, -3] {
            let config = GeneratorConfig {
                door_area,
                ..Default::default()
            };
            let errors = validate_config(&config);
            assert_eq!(
                errors,
                vec![ConfigError::DoorAreaTooSmall {
                    door_area,
                    required: MIN_DOOR_AREA
                }]
            );
        }
    }

    #[test]
    fn test_min_room_size_not_below_max() {
        // min 8 needs max >= 14 on both axes.
        let config = GeneratorConfig {
            min_room_size: 8,
            max_room_size: (20, 8),
            ..Default::default()
        };
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ConfigError::MaxRoomSizeTooSmall { axis: "y", .. }
        ));
    }

    #[test]
    fn test_min_room_size_floor() {
        let config = GeneratorConfig {
            min_room_size: 2,
            ..Default::default()
        };
        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::MinRoomSizeTooSmall { .. })));
    }

    #[test]
    fn test_reports_every_error() {
        let config = GeneratorConfig {
            size: (2, 2),
            max_split_offset: 1.5,
            remove_percentage: 150.0,
            hallway_chance: -0.1,
            door_area: 0,
            ..Default::default()
        };
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 5, "got {:?}", errors);
    }

    #[test]
    fn test_nan_values_rejected() {
        let config = GeneratorConfig {
            max_split_offset: f32::NAN,
            remove_percentage: f32::NAN,
            hallway_chance: f32::NAN,
            ..Default::default()
        };
        assert_eq!(validate_config(&config).len(), 3);
    }

    #[test]
    fn test_decoration_count_is_capped() {
        for max in [MAX_DECORATIONS_PER_ROOM + 1, i32::MAX as u32, u32::MAX] {
            let config = GeneratorConfig {
                max_decorations_per_room: max,
                ..Default::default()
            };
            assert_eq!(
                validate_config(&config),
                vec![ConfigError::TooManyDecorations {
                    max_decorations_per_room: max,
                    limit: MAX_DECORATIONS_PER_ROOM
                }]
            );
        }
        let at_limit = GeneratorConfig {
            max_decorations_per_room: MAX_DECORATIONS_PER_ROOM,
            ..Default::default()
        };
        assert!(validate_config(&at_limit).is_empty());
    }

    #[test]
    fn test_validated_roundtrip() {
        let config = GeneratorConfig::default();
        assert_eq!(config.clone().validated(), Ok(config));
        let bad = GeneratorConfig {
            door_area: 1,
            ..Default::default()
        };
        assert!(bad.validated().is_err());
    }

    #[test]
    fn test_from_json_with_defaults() {
        let json = r#"{ "seed": 99, "size": [40, 30], "traversal": "Dfs" }"#;
        let config = GeneratorConfig::from_json_str(json).unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.size, (40, 30));
        assert_eq!(config.traversal, TraversalMode::Dfs);
        assert_eq!(config.max_room_size, (10, 10));
    }

    #[test]
    fn test_removal_fraction() {
        let config = GeneratorConfig {
            remove_percentage: 25.0,
            ..Default::default()
        };
        assert!((config.removal_fraction() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let msg = ConfigError::MaxRoomSizeTooSmall {
            axis: "x",
            max_room_size: 3,
            required: 6,
        }
        .to_string();
        assert!(msg.contains("max_room_size 3"));
        assert!(msg.contains("terminates"));
    }
}
