//! Dungeon generation pipeline.
//!
//! Stages run in a fixed order, all drawing from one seeded random source:
//!   1. partition       -- recursive split of the root into leaf rooms + adjacency graph
//!   2. prune           -- remove a share of the smallest rooms, keeping the graph connected
//!   3. spanning tree   -- keep only the traversal's discovery edges
//!   4. doors           -- one opening per tree edge
//!   5. navigation      -- walkable-cell graph over room interiors and doors
//!   6. decorations     -- optional blockers placed without splitting the walkable area

use delvegen_logic::config::GeneratorConfig;
use delvegen_logic::rng::DungeonRng;

use crate::engine::GenerationError;
use crate::layout::Layout;
use crate::observer::{GenerationEvent, GenerationObserver, Stage};

pub mod decorations;
pub mod doors;
pub mod navigation;
pub mod partition;
pub mod prune;
pub mod spanning;

pub use partition::{partition, Partition};
pub use prune::{prune_rooms, PruneReport};
pub use spanning::spanning_tree;

/// Run every stage for `config` and assemble the layout. The config must
/// already be validated.
pub fn run_pipeline(
    config: &GeneratorConfig,
    observer: &mut dyn GenerationObserver,
) -> Result<Layout, GenerationError> {
    let mut rng = DungeonRng::new(config.seed);

    observer.on_event(&GenerationEvent::StageStarted(Stage::Partition));
    let Partition {
        leaves,
        mut graph,
        detached,
    } = partition(config, &mut rng, observer)?;
    observer.on_event(&GenerationEvent::StageFinished(Stage::Partition));

    observer.on_event(&GenerationEvent::StageStarted(Stage::Prune));
    let report = prune_rooms(&mut graph, config.removal_fraction(), observer)?;
    observer.on_event(&GenerationEvent::StageFinished(Stage::Prune));

    observer.on_event(&GenerationEvent::StageStarted(Stage::SpanningTree));
    let tree = spanning_tree(&graph, config.traversal, observer)?;
    observer.on_event(&GenerationEvent::StageFinished(Stage::SpanningTree));

    observer.on_event(&GenerationEvent::StageStarted(Stage::Doors));
    let doors = doors::place_doors(&tree, config.hallway_chance, &mut rng, observer)?;
    observer.on_event(&GenerationEvent::StageFinished(Stage::Doors));

    let rooms: Vec<_> = leaves
        .iter()
        .copied()
        .filter(|r| tree.contains_node(r))
        .collect();

    observer.on_event(&GenerationEvent::StageStarted(Stage::Navigation));
    let mut navigation = navigation::build_navigation(&rooms, &doors, observer);
    observer.on_event(&GenerationEvent::StageFinished(Stage::Navigation));

    observer.on_event(&GenerationEvent::StageStarted(Stage::Decorations));
    let decorations = decorations::place_decorations(
        &mut navigation,
        &rooms,
        &doors,
        config.max_decorations_per_room,
        &mut rng,
        observer,
    )?;
    observer.on_event(&GenerationEvent::StageFinished(Stage::Decorations));

    log::info!(
        "Generated seed {}: {} rooms ({} pruned, {} detached), {} doors, {} walkable cells",
        config.seed,
        rooms.len(),
        report.removed.len(),
        detached.len(),
        doors.len(),
        navigation.node_count()
    );

    Ok(Layout {
        config: config.clone(),
        leaves,
        rooms,
        graph: tree,
        doors,
        navigation,
        decorations,
    })
}
