//! Invariant checks for generated layouts.
//!
//! Pure functions that take rooms, graphs and doors and return validation
//! errors. The generator never calls these; they back the test suite and the
//! simtest harness.

use std::collections::{HashMap, HashSet};

use crate::geometry::{Cell, Door, Room};
use crate::graph::{Graph, TraversalMode};

/// A layout validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

fn error(category: &'static str, message: String) -> ValidationError {
    ValidationError {
        category,
        severity: Severity::Error,
        message,
    }
}

// ── A. Rooms ────────────────────────────────────────────────────────────

/// Check that no room is smaller than `min_side` on either axis.
pub fn check_room_dimensions(rooms: &[Room], min_side: i32) -> Vec<ValidationError> {
    rooms
        .iter()
        .filter(|r| r.width < min_side || r.height < min_side)
        .map(|r| {
            error(
                "room_geometry",
                format!("Room {} is below the minimum side {}", r, min_side),
            )
        })
        .collect()
}

/// Check that partition leaves tile `root`: every cell covered, nothing
/// outside, and no two rooms sharing interior area.
pub fn check_room_tiling(rooms: &[Room], root: Room) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for r in rooms {
        if r.x < root.x || r.y < root.y || r.x_max() > root.x_max() || r.y_max() > root.y_max() {
            errors.push(error(
                "room_tiling",
                format!("Room {} extends outside the root {}", r, root),
            ));
        }
    }

    let mut covered: HashSet<Cell> = HashSet::new();
    for r in rooms {
        covered.extend(r.cells());
    }
    let gaps = root.cells().filter(|c| !covered.contains(c)).count();
    if gaps > 0 {
        errors.push(error(
            "room_tiling",
            format!("{} cells of the root are not covered by any room", gaps),
        ));
    }

    let mut owner: HashMap<Cell, Room> = HashMap::new();
    for r in rooms {
        for c in r.interior_cells() {
            if let Some(other) = owner.insert(c, *r) {
                errors.push(error(
                    "room_tiling",
                    format!("Rooms {} and {} overlap at ({}, {})", other, r, c.x, c.y),
                ));
                break;
            }
        }
    }

    errors
}

// ── B. Room graph ───────────────────────────────────────────────────────

/// Check that every node is reachable from every other.
pub fn check_graph_connected(graph: &Graph<Room>) -> Vec<ValidationError> {
    let Some(start) = graph.first_node() else {
        return Vec::new();
    };
    let mut reached = 0;
    if let Ok(n) = graph.traverse(start, TraversalMode::Bfs, |_, _| {}) {
        reached = n;
    }
    if reached == graph.node_count() {
        Vec::new()
    } else {
        vec![error(
            "connectivity",
            format!(
                "{} of {} rooms unreachable from {}",
                graph.node_count() - reached,
                graph.node_count(),
                start
            ),
        )]
    }
}

/// Check that the graph is a spanning tree: connected with V - 1 edges.
pub fn check_spanning_tree(graph: &Graph<Room>) -> Vec<ValidationError> {
    let mut errors = check_graph_connected(graph);
    let nodes = graph.node_count();
    let edges = graph.edge_count();
    if nodes > 0 && edges != nodes - 1 {
        errors.push(error(
            "spanning_tree",
            format!("{} edges over {} rooms, expected {}", edges, nodes, nodes - 1),
        ));
    }
    errors
}

/// Check that every edge joins rooms whose shared wall is at least `door_area`.
pub fn check_edges_geometric(graph: &Graph<Room>, door_area: i32) -> Vec<ValidationError> {
    graph
        .edges()
        .filter(|(a, b)| a.intersection_area(b) < door_area as i64)
        .map(|(a, b)| {
            error(
                "adjacency",
                format!(
                    "Rooms {} and {} are linked but share only {} cells",
                    a,
                    b,
                    a.intersection_area(b)
                ),
            )
        })
        .collect()
}

// ── C. Doors ────────────────────────────────────────────────────────────

/// Check door shape and placement against the room graph:
/// one door per edge, each inside its rooms' shared wall and clear of its
/// corner cells.
pub fn check_doors(doors: &[Door], graph: &Graph<Room>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<(Room, Room)> = HashSet::new();

    for d in doors {
        if d.rect.is_empty() {
            errors.push(error(
                "door_validity",
                format!("Door {} has zero width or height", d.rect),
            ));
            continue;
        }
        if !graph.has_edge(&d.room1, &d.room2) {
            errors.push(error(
                "door_validity",
                format!("Door {} joins {} and {}, which are not linked", d.rect, d.room1, d.room2),
            ));
        }
        if !seen.insert(d.room_pair()) {
            errors.push(error(
                "door_validity",
                format!("Duplicate door between {} and {}", d.room1, d.room2),
            ));
        }
        match d.room1.intersect(&d.room2) {
            None => errors.push(error(
                "door_validity",
                format!("Door rooms {} and {} do not touch", d.room1, d.room2),
            )),
            Some(wall) => {
                let inside = d.rect.x >= wall.x
                    && d.rect.y >= wall.y
                    && d.rect.x_max() <= wall.x_max()
                    && d.rect.y_max() <= wall.y_max();
                let margined = if wall.height == 1 {
                    d.rect.x > wall.x && d.rect.x_max() < wall.x_max()
                } else {
                    d.rect.y > wall.y && d.rect.y_max() < wall.y_max()
                };
                if !inside || !margined {
                    errors.push(error(
                        "door_validity",
                        format!("Door {} is not clear of the corners of wall {}", d.rect, wall),
                    ));
                }
            }
        }
    }

    if doors.len() != graph.edge_count() {
        errors.push(error(
            "door_validity",
            format!(
                "{} doors for {} graph edges",
                doors.len(),
                graph.edge_count()
            ),
        ));
    }

    errors
}

// ── D. Navigation graph ─────────────────────────────────────────────────

/// Check the navigation graph: no wall cells other than door cells, and
/// only unit orthogonal edges.
pub fn check_navigation(
    nav: &Graph<Cell>,
    rooms: &[Room],
    doors: &[Door],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let door_cells: HashSet<Cell> = doors.iter().flat_map(Door::cells).collect();

    for cell in nav.nodes() {
        if door_cells.contains(cell) {
            continue;
        }
        if let Some(r) = rooms.iter().find(|r| r.is_perimeter(*cell)) {
            errors.push(error(
                "navigation",
                format!("Nav node ({}, {}) lies on the wall of {}", cell.x, cell.y, r),
            ));
        }
    }

    for (a, b) in nav.edges() {
        if a.manhattan(*b) != 1 {
            errors.push(error(
                "navigation",
                format!(
                    "Nav edge ({}, {}) - ({}, {}) is not a unit orthogonal step",
                    a.x, a.y, b.x, b.y
                ),
            ));
        }
    }

    errors
}

/// Check that every cell can reach every other.
pub fn check_navigation_connected(nav: &Graph<Cell>) -> Vec<ValidationError> {
    if nav.is_connected(TraversalMode::Bfs) {
        Vec::new()
    } else {
        vec![error(
            "navigation",
            format!("Navigation graph of {} cells is not connected", nav.node_count()),
        )]
    }
}

/// Run every check over a finished layout.
pub fn validate_all(
    rooms: &[Room],
    graph: &Graph<Room>,
    doors: &[Door],
    nav: &Graph<Cell>,
    door_area: i32,
) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_spanning_tree(graph));
    all.extend(check_edges_geometric(graph, door_area));
    all.extend(check_doors(doors, graph));
    all.extend(check_navigation(nav, rooms, doors));
    all.extend(check_navigation_connected(nav));
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DoorKind;

    fn two_rooms() -> (Room, Room) {
        (Room::new(0, 0, 6, 6), Room::new(5, 0, 6, 6))
    }

    fn linked(a: Room, b: Room) -> Graph<Room> {
        let mut g = Graph::new();
        g.add_edge(a, b);
        g
    }

    #[test]
    fn test_tiling_ok() {
        let (a, b) = two_rooms();
        let errs = check_room_tiling(&[a, b], Room::new(0, 0, 11, 6));
        assert!(errs.is_empty(), "{:?}", errs);
    }

    #[test]
    fn test_tiling_gap() {
        let errs = check_room_tiling(&[Room::new(0, 0, 5, 6)], Room::new(0, 0, 11, 6));
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("not covered"));
    }

    #[test]
    fn test_tiling_overlap() {
        let a = Room::new(0, 0, 6, 6);
        let b = Room::new(3, 0, 8, 6);
        let errs = check_room_tiling(&[a, b], Room::new(0, 0, 11, 6));
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("overlap"));
    }

    #[test]
    fn test_room_dimensions() {
        let errs = check_room_dimensions(&[Room::new(0, 0, 3, 9)], 4);
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn test_spanning_tree_rejects_cycle() {
        let a = Room::new(0, 0, 6, 6);
        let b = Room::new(5, 0, 6, 6);
        let c = Room::new(0, 5, 11, 6);
        let mut g = Graph::new();
        g.add_edge(a, b);
        g.add_edge(b, c);
        g.add_edge(c, a);
        let errs = check_spanning_tree(&g);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].category, "spanning_tree");
    }

    #[test]
    fn test_disconnected_graph() {
        let (a, b) = two_rooms();
        let mut g = Graph::new();
        g.add_node(a);
        g.add_node(b);
        let errs = check_graph_connected(&g);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("unreachable"));
    }

    #[test]
    fn test_edge_too_short() {
        let a = Room::new(0, 0, 6, 6);
        let b = Room::new(5, 3, 6, 6); // shares 3 cells
        let errs = check_edges_geometric(&linked(a, b), 4);
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn test_valid_door() {
        let (a, b) = two_rooms();
        let door = Door {
            rect: Room::new(5, 1, 1, 2),
            room1: b,
            room2: a,
            kind: DoorKind::Doorway,
        };
        let errs = check_doors(&[door], &linked(a, b));
        assert!(errs.is_empty(), "{:?}", errs);
    }

    #[test]
    fn test_door_on_corner_rejected() {
        let (a, b) = two_rooms();
        let door = Door {
            rect: Room::new(5, 0, 1, 2),
            room1: a,
            room2: b,
            kind: DoorKind::Doorway,
        };
        let errs = check_doors(&[door], &linked(a, b));
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("corners"));
    }

    #[test]
    fn test_duplicate_door_either_order() {
        let (a, b) = two_rooms();
        let d1 = Door {
            rect: Room::new(5, 1, 1, 2),
            room1: a,
            room2: b,
            kind: DoorKind::Doorway,
        };
        let d2 = Door {
            room1: b,
            room2: a,
            ..d1
        };
        let errs = check_doors(&[d1, d2], &linked(a, b));
        assert!(errs.iter().any(|e| e.message.contains("Duplicate")));
        assert!(errs.iter().any(|e| e.message.contains("2 doors for 1")));
    }

    #[test]
    fn test_nav_node_on_wall_rejected() {
        let (a, b) = two_rooms();
        let mut nav = Graph::new();
        nav.add_edge(Cell::new(2, 2), Cell::new(0, 2));
        let errs = check_navigation(&nav, &[a, b], &[]);
        // (0, 2) is on a's wall and the edge is two cells long.
        assert_eq!(errs.len(), 2);
    }

    #[test]
    fn test_nav_door_cell_allowed() {
        let (a, b) = two_rooms();
        let door = Door {
            rect: Room::new(5, 2, 1, 2),
            room1: a,
            room2: b,
            kind: DoorKind::Doorway,
        };
        let mut nav = Graph::new();
        nav.add_edge(Cell::new(4, 2), Cell::new(5, 2));
        nav.add_edge(Cell::new(5, 2), Cell::new(6, 2));
        assert!(check_navigation(&nav, &[a, b], &[door]).is_empty());
        assert!(check_navigation_connected(&nav).is_empty());
    }
}
