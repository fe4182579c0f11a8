//! Reduce the room graph to a spanning tree.

use delvegen_logic::geometry::Room;
use delvegen_logic::graph::{Graph, GraphError, TraversalMode};

use crate::observer::{GenerationEvent, GenerationObserver};

/// Build a spanning tree of `graph` from the edges a traversal uses to
/// discover each node, starting at the first node. BFS gives shallow bushy
/// trees, DFS long winding ones.
///
/// The result is a new graph; the caller replaces the old one with it.
pub fn spanning_tree(
    graph: &Graph<Room>,
    mode: TraversalMode,
    observer: &mut dyn GenerationObserver,
) -> Result<Graph<Room>, GraphError> {
    let mut tree = Graph::new();
    let Some(start) = graph.first_node() else {
        return Ok(tree);
    };
    tree.add_node(*start);

    let reached = graph.traverse(start, mode, |from, to| {
        tree.add_edge(*from, *to);
        observer.on_event(&GenerationEvent::TreeEdgeAdded {
            from: *from,
            to: *to,
        });
    })?;

    if reached < graph.node_count() {
        log::warn!(
            "Spanning tree reached {} of {} rooms",
            reached,
            graph.node_count()
        );
    }
    log::info!(
        "Spanning tree ({:?}): {} edges kept of {}",
        mode,
        tree.edge_count(),
        graph.edge_count()
    );
    Ok(tree)
}
