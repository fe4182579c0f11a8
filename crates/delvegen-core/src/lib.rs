//! Delvegen Core - Procedural Dungeon Generation
//!
//! Carves a rectangular area into a connected set of rectangular rooms with
//! doors between them, plus a cell-level navigation graph an agent can walk.
//!
//! # Architecture
//!
//! Generation is a fixed pipeline of stages over plain data from
//! `delvegen-logic`:
//! - **Partition**: recursive binary split into leaf rooms with shared walls
//! - **Prune / Spanning tree**: thin the room graph while keeping it connected
//! - **Doors / Navigation**: open the kept walls and build the walkable grid
//!
//! All randomness comes from one seeded source, so a seed and a config
//! always reproduce the same layout.
//!
//! # Example
//!
//! ```rust,no_run
//! use delvegen_core::prelude::*;
//!
//! let mut engine = DungeonEngine::new(GeneratorConfig {
//!     seed: 1234,
//!     ..Default::default()
//! })
//! .expect("valid config");
//!
//! let layout = engine.generate().expect("generation succeeds");
//! let spawn = layout.spawn_point().expect("at least one room");
//! let goal = layout.rooms.last().expect("at least one room").center();
//!
//! let path = engine.find_path(spawn, goal);
//! println!("{} steps", path.steps());
//! ```

pub mod engine;
pub mod generation;
pub mod layout;
pub mod observer;
pub mod persistence;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::engine::{generate, DungeonEngine, GenerationError};
    pub use crate::layout::Layout;
    pub use crate::observer::{EventRecorder, GenerationEvent, GenerationObserver, Stage};
    pub use delvegen_logic::config::{GeneratorConfig, TraversalMode};
    pub use delvegen_logic::geometry::{Cell, Door, DoorKind, Point, Room};
    pub use delvegen_logic::graph::Graph;
    pub use delvegen_logic::pathfinding::{PathFailure, PathResult, Pathfinder};
}
