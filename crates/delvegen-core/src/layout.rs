//! A finished dungeon layout and queries over it.

use serde::{Deserialize, Serialize};

use delvegen_logic::config::GeneratorConfig;
use delvegen_logic::geometry::{Cell, Door, Point, Room};
use delvegen_logic::graph::{Graph, TraversalMode};
use delvegen_logic::pathfinding::{PathResult, Pathfinder};

/// Everything one generation run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// The config the layout was generated from.
    pub config: GeneratorConfig,
    /// Every partition leaf, pruned or not. Together they tile the root.
    pub leaves: Vec<Room>,
    /// Rooms that survived pruning, in partition order.
    pub rooms: Vec<Room>,
    /// Spanning tree over `rooms`; one door per edge.
    pub graph: Graph<Room>,
    pub doors: Vec<Door>,
    /// Walkable cells and their orthogonal links.
    pub navigation: Graph<Cell>,
    pub decorations: Vec<Cell>,
}

impl Layout {
    /// The root rectangle that was partitioned.
    pub fn root(&self) -> Room {
        Room::new(0, 0, self.config.size.0, self.config.size.1)
    }

    /// The first room containing `p`. Points on a shared wall belong to
    /// whichever of the two rooms comes first.
    pub fn room_at(&self, p: Point) -> Option<Room> {
        self.rooms.iter().copied().find(|r| r.contains_point(p))
    }

    /// Where a player starts: the center of the first room in the graph,
    /// or the anchor of that room's nearest walkable cell if the center
    /// snaps to a blocked one.
    pub fn spawn_point(&self) -> Option<Point> {
        let room = self.graph.first_node()?;
        let center = room.center();
        if self.is_walkable(center) {
            return Some(center);
        }
        let target = Cell::snap(center);
        room.interior_cells()
            .filter(|c| self.navigation.contains_node(c))
            .min_by_key(|c| c.manhattan(target))
            .map(|c| c.anchor())
    }

    /// Whether `p` snaps to a navigation cell, the same way path queries snap.
    pub fn is_walkable(&self, p: Point) -> bool {
        self.navigation.contains_node(&Cell::snap(p))
    }

    /// Rooms joined to `room` by a door.
    pub fn room_neighbors(&self, room: &Room) -> Vec<Room> {
        self.graph.neighbors(room).unwrap_or_default()
    }

    pub fn doors_of(&self, room: &Room) -> Vec<&Door> {
        self.doors.iter().filter(|d| d.touches(room)).collect()
    }

    pub fn door_between(&self, a: &Room, b: &Room) -> Option<&Door> {
        self.doors.iter().find(|d| d.connects(a, b))
    }

    pub fn is_connected(&self, mode: TraversalMode) -> bool {
        self.graph.is_connected(mode)
    }

    /// Shortest walkable route between two points.
    pub fn find_path(&self, pathfinder: &mut Pathfinder, start: Point, target: Point) -> PathResult {
        pathfinder.find_path(&self.navigation, start, target)
    }
}
