//! Decoration placement.
//!
//! Decorations occupy interior cells and are removed from the navigation
//! graph. A decoration is never placed next to a door cell and never where
//! it would cut the walkable area in two.

use std::collections::BTreeSet;

use delvegen_logic::geometry::{Cell, Door, Room};
use delvegen_logic::graph::{Graph, GraphError, TraversalMode};
use delvegen_logic::rng::DungeonRng;

use crate::observer::{GenerationEvent, GenerationObserver};

/// Place up to `max_per_room` decorations in each room, removing their
/// cells from `nav`. Returns the decorated cells in placement order.
pub fn place_decorations(
    nav: &mut Graph<Cell>,
    rooms: &[Room],
    doors: &[Door],
    max_per_room: u32,
    rng: &mut DungeonRng,
    observer: &mut dyn GenerationObserver,
) -> Result<Vec<Cell>, GraphError> {
    let mut placed = Vec::new();
    if max_per_room == 0 {
        return Ok(placed);
    }

    let door_cells: BTreeSet<Cell> = doors.iter().flat_map(Door::cells).collect();
    let max = i32::try_from(max_per_room).unwrap_or(i32::MAX);
    let mut skipped = 0usize;

    for room in rooms {
        let interior: Vec<Cell> = room.interior_cells().collect();
        if interior.is_empty() {
            continue;
        }
        let attempts = rng.range_i32(0, max.saturating_add(1));
        for _ in 0..attempts {
            let cell = interior[rng.range_i32(0, interior.len() as i32) as usize];
            if !nav.contains_node(&cell) {
                continue;
            }
            if cell.neighbors4().any(|n| door_cells.contains(&n)) {
                skipped += 1;
                continue;
            }

            let former = nav.neighbors(&cell)?;
            nav.remove_node(&cell);
            if !nav.is_connected(TraversalMode::Bfs) {
                nav.add_node(cell);
                for n in former {
                    nav.add_edge(cell, n);
                }
                skipped += 1;
                continue;
            }

            placed.push(cell);
            observer.on_event(&GenerationEvent::DecorationPlaced(cell));
        }
    }

    log::info!(
        "Placed {} decorations ({} spots rejected)",
        placed.len(),
        skipped
    );
    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::navigation::build_navigation;
    use crate::observer::NoopObserver;
    use delvegen_logic::config::MAX_DECORATIONS_PER_ROOM;
    use delvegen_logic::geometry::DoorKind;

    fn setup() -> (Vec<Room>, Vec<Door>, Graph<Cell>) {
        let a = Room::new(0, 0, 8, 8);
        let b = Room::new(7, 0, 8, 8);
        let door = Door {
            rect: Room::new(7, 3, 1, 2),
            room1: a,
            room2: b,
            kind: DoorKind::Doorway,
        };
        let rooms = vec![a, b];
        let doors = vec![door];
        let nav = build_navigation(&rooms, &doors, &mut NoopObserver);
        (rooms, doors, nav)
    }

    #[test]
    fn test_zero_max_places_nothing() {
        let (rooms, doors, mut nav) = setup();
        let before = nav.clone();
        let mut rng = DungeonRng::new(3);
        let placed =
            place_decorations(&mut nav, &rooms, &doors, 0, &mut rng, &mut NoopObserver).unwrap();
        assert!(placed.is_empty());
        assert_eq!(nav, before);
    }

    #[test]
    fn test_full_room_budget_keeps_navigation_connected() {
        // Far more attempts than the rooms have interior cells.
        let (rooms, doors, mut nav) = setup();
        let mut rng = DungeonRng::new(11);
        let placed = place_decorations(
            &mut nav,
            &rooms,
            &doors,
            MAX_DECORATIONS_PER_ROOM,
            &mut rng,
            &mut NoopObserver,
        )
        .unwrap();
        assert!(!placed.is_empty());
        assert!(nav.is_connected(TraversalMode::Bfs));
        let unique: BTreeSet<Cell> = placed.iter().copied().collect();
        assert_eq!(unique.len(), placed.len());
    }

    #[test]
    fn test_decorations_keep_navigation_connected() {
        for seed in 0..30 {
            let (rooms, doors, mut nav) = setup();
            let total = nav.node_count();
            let mut rng = DungeonRng::new(seed);
            let placed =
                place_decorations(&mut nav, &rooms, &doors, 6, &mut rng, &mut NoopObserver)
                    .unwrap();
            assert!(nav.is_connected(TraversalMode::Bfs));
            assert_eq!(nav.node_count() + placed.len(), total);
            for cell in &placed {
                assert!(!nav.contains_node(cell));
                for n in cell.neighbors4() {
                    assert!(!doors[0].rect.contains_cell(n), "{:?} blocks a door", cell);
                }
            }
        }
    }
}
