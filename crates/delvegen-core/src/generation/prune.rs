//! Room pruning with connectivity rollback.

use delvegen_logic::geometry::Room;
use delvegen_logic::graph::{Graph, GraphError};

use crate::observer::{GenerationEvent, GenerationObserver};

/// What the pruner did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneReport {
    /// Rooms requested for removal.
    pub quota: usize,
    /// Rooms actually removed, in removal order.
    pub removed: Vec<Room>,
    /// Candidates restored because removing them disconnected the graph.
    pub rolled_back: Vec<Room>,
}

/// Number of rooms to prune from `total` at `fraction`, rounded to nearest.
pub fn prune_quota(total: usize, fraction: f32) -> usize {
    (total as f32 * fraction.clamp(0.0, 1.0)).round() as usize
}

/// Remove up to `fraction` of the rooms, smallest first, without ever
/// disconnecting the graph.
///
/// Candidates are visited in ascending area (node order on ties). A removal
/// that would disconnect the remaining rooms is undone, restoring the room
/// with all of its former edges. Stops as soon as the quota is met, and
/// never removes the last room.
pub fn prune_rooms(
    graph: &mut Graph<Room>,
    fraction: f32,
    observer: &mut dyn GenerationObserver,
) -> Result<PruneReport, GraphError> {
    let mut report = PruneReport {
        quota: prune_quota(graph.node_count(), fraction),
        ..Default::default()
    };
    if report.quota == 0 {
        return Ok(report);
    }

    let mut candidates: Vec<Room> = graph.nodes().copied().collect();
    candidates.sort_by_key(Room::area);

    for room in candidates {
        if report.removed.len() >= report.quota || graph.node_count() <= 1 {
            break;
        }

        let former = graph.neighbors(&room)?;
        graph.remove_node(&room);

        let still_connected = match graph.first_node() {
            Some(start) => graph.bfs(start)?,
            None => true,
        };
        if still_connected {
            report.removed.push(room);
            observer.on_event(&GenerationEvent::RoomPruned(room));
        } else {
            graph.add_node(room);
            for n in former {
                graph.add_edge(room, n);
            }
            log::debug!("kept {}: removing it disconnects the layout", room);
            report.rolled_back.push(room);
            observer.on_event(&GenerationEvent::PruneRolledBack(room));
        }
    }

    if report.removed.len() < report.quota {
        log::warn!(
            "Pruned {} of {} requested rooms; the rest are load-bearing",
            report.removed.len(),
            report.quota
        );
    }
    log::info!(
        "Pruned {} rooms ({} rolled back), {} remain",
        report.removed.len(),
        report.rolled_back.len(),
        graph.node_count()
    );
    Ok(report)
}
