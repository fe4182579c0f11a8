//! Main dungeon engine that drives generation and answers queries.

use delvegen_logic::config::{ConfigError, GeneratorConfig};
use delvegen_logic::geometry::{Cell, Point};
use delvegen_logic::graph::GraphError;
use delvegen_logic::pathfinding::{PathFailure, PathResult, Pathfinder};

use crate::generation::run_pipeline;
use crate::layout::Layout;
use crate::observer::{GenerationObserver, NoopObserver};
use crate::persistence::{self, SaveError};

/// Why a run produced no layout.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The config was rejected before any stage ran.
    InvalidConfig(Vec<ConfigError>),
    /// A stage looked up a node that wasn't in its graph.
    Graph(GraphError),
}

impl From<GraphError> for GenerationError {
    fn from(e: GraphError) -> Self {
        GenerationError::Graph(e)
    }
}

impl From<Vec<ConfigError>> for GenerationError {
    fn from(errors: Vec<ConfigError>) -> Self {
        GenerationError::InvalidConfig(errors)
    }
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::InvalidConfig(errors) => {
                write!(f, "invalid config: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
            GenerationError::Graph(e) => write!(f, "graph error: {}", e),
        }
    }
}

impl std::error::Error for GenerationError {}

/// Generate a layout from `config` in one call.
pub fn generate(config: &GeneratorConfig) -> Result<Layout, GenerationError> {
    let config = config.clone().validated()?;
    run_pipeline(&config, &mut NoopObserver)
}

/// Owns a config, the most recent layout and a path cache over it.
pub struct DungeonEngine {
    config: GeneratorConfig,
    layout: Option<Layout>,
    pathfinder: Pathfinder,
}

impl DungeonEngine {
    /// Create an engine for `config`. Fails if the config is invalid.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        Ok(Self {
            config: config.validated()?,
            layout: None,
            pathfinder: Pathfinder::new(),
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The most recently generated or loaded layout.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Run a fresh generation from the configured seed.
    pub fn generate(&mut self) -> Result<&Layout, GenerationError> {
        self.generate_with_observer(&mut NoopObserver)
    }

    /// Run a fresh generation, reporting every step to `observer`.
    pub fn generate_with_observer(
        &mut self,
        observer: &mut dyn GenerationObserver,
    ) -> Result<&Layout, GenerationError> {
        let layout = run_pipeline(&self.config, observer)?;
        self.pathfinder.clear_cache();
        Ok(self.layout.insert(layout))
    }

    /// Switch to `seed` and generate again.
    pub fn regenerate(&mut self, seed: u64) -> Result<&Layout, GenerationError> {
        self.config.seed = seed;
        self.generate()
    }

    /// Shortest walkable route on the current layout. Fails with
    /// `StartNotWalkable` when nothing has been generated yet.
    pub fn find_path(&mut self, start: Point, target: Point) -> PathResult {
        match &self.layout {
            Some(layout) => layout.find_path(&mut self.pathfinder, start, target),
            None => PathResult::failed(PathFailure::StartNotWalkable(Cell::snap(start))),
        }
    }

    /// Save the current layout to a writer.
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        match &self.layout {
            Some(layout) => persistence::save_layout(writer, layout),
            None => Err(SaveError::NothingToSave),
        }
    }

    /// Replace the current layout (and config) with one read from `reader`.
    /// Nothing changes if the read fails or the stored config is invalid.
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let layout = persistence::load_layout(reader)?;
        self.config = layout.config.clone();
        self.layout = Some(layout);
        self.pathfinder.clear_cache();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneratorConfig {
            door_area: 0,
            max_split_offset: 2.0,
            ..Default::default()
        };
        let err = DungeonEngine::new(config).err().unwrap();
        match &err {
            GenerationError::InvalidConfig(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        assert!(err.to_string().contains("; "));
    }

    #[test]
    fn test_generate_then_path() {
        let mut engine = DungeonEngine::new(GeneratorConfig {
            seed: 12,
            size: (50, 30),
            ..Default::default()
        })
        .unwrap();
        let spawn = engine.generate().unwrap().spawn_point().unwrap();
        let result = engine.find_path(spawn, spawn);
        assert!(result.is_found());
        assert_eq!(result.waypoints, vec![spawn]);
    }

    #[test]
    fn test_find_path_before_generate_fails() {
        let mut engine = DungeonEngine::new(GeneratorConfig::default()).unwrap();
        let result = engine.find_path(Point::new(1.2, 1.4), Point::new(3.0, 3.0));
        assert!(!result.is_found());
        assert!(result.waypoints.is_empty());
        assert_eq!(
            result.failure,
            Some(PathFailure::StartNotWalkable(Cell::new(1, 1)))
        );
    }

    #[test]
    fn test_regenerate_changes_seed() {
        let mut engine = DungeonEngine::new(GeneratorConfig::default()).unwrap();
        let first = engine.generate().unwrap().clone();
        let second = engine.regenerate(99).unwrap();
        assert_eq!(second.config.seed, 99);
        assert_ne!(first.leaves, second.leaves);
    }

    #[test]
    fn test_free_generate_matches_engine() {
        let config = GeneratorConfig {
            seed: 8,
            ..Default::default()
        };
        let a = generate(&config).unwrap();
        let mut engine = DungeonEngine::new(config).unwrap();
        assert_eq!(engine.generate().unwrap(), &a);
    }
}
