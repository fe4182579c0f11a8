//! Recursive binary space partition of the root rectangle.
//!
//! Rooms are split in waves: every room of the current wave that is larger
//! than `max_room_size` on some axis is cut in two, and the halves form the
//! next wave. Halves overlap their parent's cut line by one cell, so siblings
//! share a wall. Adjacency is maintained as the partition proceeds instead
//! of being recomputed at the end: each half is linked to its sibling and to
//! whichever of the parent's neighbours it still shares at least
//! `door_area` wall cells with.

use std::collections::BTreeSet;
use std::iter;

use delvegen_logic::config::GeneratorConfig;
use delvegen_logic::geometry::Room;
use delvegen_logic::graph::{Graph, GraphError, TraversalMode};
use delvegen_logic::rng::DungeonRng;

use crate::observer::{GenerationEvent, GenerationObserver};

/// Direction of the cut line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cut {
    /// Vertical line; divides the width.
    Vertical,
    /// Horizontal line; divides the height.
    Horizontal,
}

/// Result of partitioning.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Every leaf room in the order it was finalized. Together they tile the root.
    pub leaves: Vec<Room>,
    /// Adjacency graph over the connected leaves.
    pub graph: Graph<Room>,
    /// Leaves dropped from the graph because no door-capable wall reached them.
    pub detached: Vec<Room>,
}

/// Split `room` along `cut` so the first half is `first` cells long.
/// The halves share the cut line.
pub fn split_room(room: Room, cut: Cut, first: i32) -> [Room; 2] {
    match cut {
        Cut::Vertical => [
            Room::new(room.x, room.y, first, room.height),
            Room::new(room.x + first - 1, room.y, room.width - first + 1, room.height),
        ],
        Cut::Horizontal => [
            Room::new(room.x, room.y, room.width, first),
            Room::new(room.x, room.y + first - 1, room.width, room.height - first + 1),
        ],
    }
}

/// Which way to cut, or `None` if the room is a leaf.
fn choose_cut(room: &Room, max: (i32, i32), rng: &mut DungeonRng) -> Option<Cut> {
    match (room.width > max.0, room.height > max.1) {
        (true, true) => Some(if rng.coin_flip() {
            Cut::Horizontal
        } else {
            Cut::Vertical
        }),
        (true, false) => Some(Cut::Vertical),
        (false, true) => Some(Cut::Horizontal),
        (false, false) => None,
    }
}

/// True if some former neighbour would share fewer than `door_area` cells
/// with both halves and so lose its connection entirely.
fn orphans_neighbor(children: &[Room; 2], neighbors: &[Room], door_area: i64) -> bool {
    neighbors.iter().any(|n| {
        children
            .iter()
            .all(|c| c.intersection_area(n) < door_area)
    })
}

/// Pick the split for `room`. The preferred first length is
/// `len / (2 ± offset)` clamped so both halves keep `min_room_size`; when
/// that cut would orphan a neighbour, nearby lengths are tried in order of
/// distance (shorter first on ties). Falls back to the preferred cut.
fn choose_split(
    room: Room,
    cut: Cut,
    neighbors: &[Room],
    config: &GeneratorConfig,
    rng: &mut DungeonRng,
) -> [Room; 2] {
    let len = match cut {
        Cut::Vertical => room.width,
        Cut::Horizontal => room.height,
    };
    let offset = config.max_split_offset;
    let ratio = 2.0 + rng.range_f32(-offset, offset);

    let lo = config.min_room_size;
    let hi = len - config.min_room_size + 1;
    let preferred = ((len as f32 / ratio).round() as i32).clamp(lo, hi);

    let door_area = config.door_area as i64;
    let candidates = iter::once(preferred).chain(
        (1..=hi - lo).flat_map(|d| [preferred - d, preferred + d]),
    );
    for first in candidates.filter(|f| (lo..=hi).contains(f)) {
        let children = split_room(room, cut, first);
        if !orphans_neighbor(&children, neighbors, door_area) {
            return children;
        }
    }
    log::debug!("every split of {} orphans a neighbour, using preferred", room);
    split_room(room, cut, preferred)
}

/// Partition the root rectangle into leaf rooms and their adjacency graph.
pub fn partition(
    config: &GeneratorConfig,
    rng: &mut DungeonRng,
    observer: &mut dyn GenerationObserver,
) -> Result<Partition, GraphError> {
    let root = Room::new(0, 0, config.size.0, config.size.1);
    let door_area = config.door_area as i64;

    let mut graph = Graph::new();
    graph.add_node(root);

    let mut leaves = Vec::new();
    let mut to_check = vec![root];
    let mut depth = 0;

    while !to_check.is_empty() {
        observer.on_event(&GenerationEvent::WaveStarted {
            depth,
            rooms: to_check.len(),
        });
        log::debug!("partition wave {}: {} rooms", depth, to_check.len());

        let mut next_wave = Vec::new();
        for room in to_check {
            let Some(cut) = choose_cut(&room, config.max_room_size, rng) else {
                leaves.push(room);
                observer.on_event(&GenerationEvent::RoomFinalized(room));
                continue;
            };

            let neighbors = graph.neighbors(&room)?;
            let children = choose_split(room, cut, &neighbors, config, rng);
            graph.remove_node(&room);

            for (child, sibling) in [(children[0], children[1]), (children[1], children[0])] {
                graph.add_node(child);
                graph.add_edge(child, sibling);
                for n in &neighbors {
                    if child.intersection_area(n) >= door_area {
                        graph.add_edge(child, *n);
                    }
                }
            }

            observer.on_event(&GenerationEvent::RoomSplit {
                parent: room,
                children,
            });
            next_wave.extend(children);
        }

        to_check = next_wave;
        depth += 1;
    }

    let detached = detach_unreachable(&mut graph)?;
    for room in &detached {
        observer.on_event(&GenerationEvent::RoomDetached(*room));
    }
    if !detached.is_empty() {
        log::warn!(
            "Detached {} rooms with no door-capable wall to the rest of the layout",
            detached.len()
        );
    }

    log::info!(
        "Partitioned {}x{} into {} rooms ({} adjacencies) over {} waves",
        config.size.0,
        config.size.1,
        leaves.len(),
        graph.edge_count(),
        depth
    );

    Ok(Partition {
        leaves,
        graph,
        detached,
    })
}

/// Keep only the largest connected component (the earliest one on ties)
/// and return the rooms removed, in node order.
fn detach_unreachable(graph: &mut Graph<Room>) -> Result<Vec<Room>, GraphError> {
    let mut assigned: BTreeSet<Room> = BTreeSet::new();
    let mut largest: BTreeSet<Room> = BTreeSet::new();

    let nodes: Vec<Room> = graph.nodes().copied().collect();
    for start in &nodes {
        if assigned.contains(start) {
            continue;
        }
        let mut component = BTreeSet::from([*start]);
        graph.traverse(start, TraversalMode::Bfs, |_, to| {
            component.insert(*to);
        })?;
        assigned.extend(component.iter().copied());
        if component.len() > largest.len() {
            largest = component;
        }
    }

    let removed: Vec<Room> = nodes
        .into_iter()
        .filter(|r| !largest.contains(r))
        .collect();
    for room in &removed {
        graph.remove_node(room);
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{EventRecorder, NoopObserver};

    fn config(seed: u64, size: (i32, i32)) -> GeneratorConfig {
        GeneratorConfig {
            seed,
            size,
            ..Default::default()
        }
    }

    #[test]
    fn test_split_halves_share_cut_line() {
        let room = Room::new(0, 0, 20, 8);
        let [a, b] = split_room(room, Cut::Vertical, 9);
        assert_eq!(a, Room::new(0, 0, 9, 8));
        assert_eq!(b, Room::new(8, 0, 12, 8));
        assert_eq!(a.intersect(&b), Some(Room::new(8, 0, 1, 8)));

        let [c, d] = split_room(room, Cut::Horizontal, 4);
        assert_eq!(c, Room::new(0, 0, 20, 4));
        assert_eq!(d, Room::new(0, 3, 20, 5));
    }

    #[test]
    fn test_small_root_is_single_leaf() {
        let cfg = config(1, (10, 10));
        let mut rng = DungeonRng::new(cfg.seed);
        let p = partition(&cfg, &mut rng, &mut NoopObserver).unwrap();
        assert_eq!(p.leaves, vec![Room::new(0, 0, 10, 10)]);
        assert_eq!(p.graph.node_count(), 1);
        assert_eq!(p.graph.edge_count(), 0);
    }

    #[test]
    fn test_leaves_respect_size_limits() {
        for seed in 0..20 {
            let cfg = config(seed, (100, 50));
            let mut rng = DungeonRng::new(seed);
            let p = partition(&cfg, &mut rng, &mut NoopObserver).unwrap();
            for r in &p.leaves {
                assert!(r.width <= 10 && r.height <= 10, "{} too large", r);
                assert!(r.width >= 4 && r.height >= 4, "{} too small", r);
            }
        }
    }

    #[test]
    fn test_leaf_area_accounts_for_shared_walls() {
        // Tiling with overlap: every cell of the root lies in some leaf.
        let cfg = config(5, (40, 30));
        let mut rng = DungeonRng::new(cfg.seed);
        let p = partition(&cfg, &mut rng, &mut NoopObserver).unwrap();
        let root = Room::new(0, 0, 40, 30);
        for cell in root.cells() {
            assert!(
                p.leaves.iter().any(|r| r.contains_cell(cell)),
                "cell {:?} uncovered",
                cell
            );
        }
    }

    #[test]
    fn test_edges_have_door_capable_walls() {
        for seed in 0..20 {
            let cfg = config(seed, (80, 40));
            let mut rng = DungeonRng::new(seed);
            let p = partition(&cfg, &mut rng, &mut NoopObserver).unwrap();
            for (a, b) in p.graph.edges() {
                assert!(a.intersection_area(b) >= cfg.door_area as i64);
            }
            assert!(p.graph.is_connected(TraversalMode::Bfs));
        }
    }

    #[test]
    fn test_graph_holds_leaves_minus_detached() {
        let cfg = config(11, (100, 50));
        let mut rng = DungeonRng::new(cfg.seed);
        let p = partition(&cfg, &mut rng, &mut NoopObserver).unwrap();
        assert_eq!(p.graph.node_count() + p.detached.len(), p.leaves.len());
        for r in &p.detached {
            assert!(!p.graph.contains_node(r));
        }
    }

    #[test]
    fn test_same_seed_same_partition() {
        let cfg = config(42, (100, 50));
        let a = partition(&cfg, &mut DungeonRng::new(42), &mut NoopObserver).unwrap();
        let b = partition(&cfg, &mut DungeonRng::new(42), &mut NoopObserver).unwrap();
        assert_eq!(a.leaves, b.leaves);
        assert_eq!(a.graph, b.graph);
    }

    #[test]
    fn test_events_report_every_split() {
        let cfg = config(3, (30, 12));
        let mut rec = EventRecorder::new();
        let p = partition(&cfg, &mut DungeonRng::new(3), &mut rec).unwrap();
        let splits = rec.count(|e| matches!(e, GenerationEvent::RoomSplit { .. }));
        let finals = rec.count(|e| matches!(e, GenerationEvent::RoomFinalized(_)));
        // A binary tree with n leaves has n - 1 internal nodes.
        assert_eq!(finals, p.leaves.len());
        assert_eq!(splits + 1, p.leaves.len());
        assert!(matches!(
            rec.events[0],
            GenerationEvent::WaveStarted { depth: 0, rooms: 1 }
        ));
    }

    #[test]
    fn test_detach_keeps_largest_component() {
        let mut g = Graph::new();
        let a = Room::new(0, 0, 5, 5);
        let b = Room::new(4, 0, 5, 5);
        let c = Room::new(8, 0, 5, 5);
        let lone = Room::new(50, 50, 5, 5);
        g.add_edge(a, b);
        g.add_edge(b, c);
        g.add_node(lone);
        let removed = detach_unreachable(&mut g).unwrap();
        assert_eq!(removed, vec![lone]);
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn test_detach_on_empty_graph_is_ok() {
        let mut g: Graph<Room> = Graph::new();
        assert_eq!(detach_unreachable(&mut g), Ok(Vec::new()));
    }
}
