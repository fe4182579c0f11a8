//! Cell-level navigation graph.

use delvegen_logic::geometry::{Cell, Door, Room};
use delvegen_logic::graph::Graph;

use crate::observer::{GenerationEvent, GenerationObserver};

/// Build the walkable-cell graph: every interior cell of every room, every
/// door cell, and an edge between each pair of orthogonally adjacent
/// walkable cells. Wall cells outside doors are never nodes, so rooms are
/// only connected through their doors.
pub fn build_navigation(
    rooms: &[Room],
    doors: &[Door],
    observer: &mut dyn GenerationObserver,
) -> Graph<Cell> {
    let mut nav = Graph::new();

    for room in rooms {
        for cell in room.interior_cells() {
            nav.add_node(cell);
            observer.on_event(&GenerationEvent::NavNodeAdded(cell));
        }
    }
    link_orthogonal(&mut nav, rooms.iter().flat_map(Room::interior_cells));

    let door_cells: Vec<Cell> = doors.iter().flat_map(Door::cells).collect();
    for cell in &door_cells {
        if !nav.contains_node(cell) {
            nav.add_node(*cell);
            observer.on_event(&GenerationEvent::NavNodeAdded(*cell));
        }
    }
    link_orthogonal(&mut nav, door_cells.iter().copied());

    log::info!(
        "Navigation graph: {} cells, {} links ({} door cells)",
        nav.node_count(),
        nav.edge_count(),
        door_cells.len()
    );
    nav
}

fn link_orthogonal(nav: &mut Graph<Cell>, cells: impl Iterator<Item = Cell>) {
    for cell in cells {
        for n in cell.neighbors4() {
            if nav.contains_node(&n) {
                nav.add_edge(cell, n);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use delvegen_logic::geometry::DoorKind;
    use delvegen_logic::graph::TraversalMode;

    fn two_rooms() -> (Room, Room, Door) {
        let a = Room::new(0, 0, 6, 6);
        let b = Room::new(5, 0, 6, 6);
        let door = Door {
            rect: Room::new(5, 2, 1, 2),
            room1: a,
            room2: b,
            kind: DoorKind::Doorway,
        };
        (a, b, door)
    }

    #[test]
    fn test_interior_only_without_doors() {
        let (a, b, _) = two_rooms();
        let nav = build_navigation(&[a, b], &[], &mut NoopObserver);
        assert_eq!(nav.node_count(), 16 + 16);
        assert!(!nav.contains_node(&Cell::new(5, 2)));
        // Rooms stay separated by the wall.
        assert!(!nav.is_connected(TraversalMode::Bfs));
    }

    #[test]
    fn test_door_joins_rooms() {
        let (a, b, door) = two_rooms();
        let nav = build_navigation(&[a, b], &[door], &mut NoopObserver);
        assert_eq!(nav.node_count(), 34);
        assert!(nav.is_connected(TraversalMode::Bfs));
        assert!(nav.has_edge(&Cell::new(5, 2), &Cell::new(4, 2)));
        assert!(nav.has_edge(&Cell::new(5, 2), &Cell::new(6, 2)));
        assert!(nav.has_edge(&Cell::new(5, 2), &Cell::new(5, 3)));
    }

    #[test]
    fn test_edges_are_unit_steps() {
        let (a, b, door) = two_rooms();
        let nav = build_navigation(&[a, b], &[door], &mut NoopObserver);
        for (c, d) in nav.edges() {
            assert_eq!(c.manhattan(*d), 1);
        }
        for cell in nav.nodes() {
            assert!(!a.is_perimeter(*cell) || door.rect.contains_cell(*cell));
        }
    }
}
