//! Door placement on spanning-tree edges.
//!
//! Each tree edge gets exactly one opening cut into the wall its two rooms
//! share. A hallway opens the whole wall except its two end cells; a
//! doorway is two cells wide and keeps at least one wall cell between
//! itself and either end of the wall.

use std::collections::BTreeSet;

use delvegen_logic::geometry::{Door, DoorKind, Room};
use delvegen_logic::graph::{Graph, GraphError};
use delvegen_logic::rng::DungeonRng;

use crate::observer::{GenerationEvent, GenerationObserver};

/// Width of a narrow doorway, in cells.
pub const DOORWAY_WIDTH: i32 = 2;

/// Shortest wall a margined doorway fits in.
const MIN_WALL_SPAN: i32 = DOORWAY_WIDTH + 2;

/// Cut an opening into `wall`, the one-cell-thick overlap of `a` and `b`.
/// Returns `None` if the wall is too short or not a line.
pub fn cut_door(
    wall: Room,
    a: Room,
    b: Room,
    hallway_chance: f32,
    rng: &mut DungeonRng,
) -> Option<Door> {
    let hallway = rng.chance(hallway_chance);
    let horizontal = wall.height == 1;
    if !horizontal && wall.width != 1 {
        return None;
    }
    let span = if horizontal { wall.width } else { wall.height };
    if span < MIN_WALL_SPAN {
        return None;
    }

    let (kind, rect) = match (hallway, horizontal) {
        (true, true) => (
            DoorKind::Hallway,
            Room::new(wall.x + 1, wall.y, wall.width - 2, 1),
        ),
        (true, false) => (
            DoorKind::Hallway,
            Room::new(wall.x, wall.y + 1, 1, wall.height - 2),
        ),
        (false, true) => {
            let x = rng.range_i32(wall.x + 1, wall.x_max() - DOORWAY_WIDTH);
            (DoorKind::Doorway, Room::new(x, wall.y, DOORWAY_WIDTH, 1))
        }
        (false, false) => {
            let y = rng.range_i32(wall.y + 1, wall.y_max() - DOORWAY_WIDTH);
            (DoorKind::Doorway, Room::new(wall.x, y, 1, DOORWAY_WIDTH))
        }
    };

    Some(Door {
        rect,
        room1: a,
        room2: b,
        kind,
    })
}

/// Place one door per edge of `tree`. Edges are visited from each node in
/// node order; the reverse direction of an edge is skipped.
pub fn place_doors(
    tree: &Graph<Room>,
    hallway_chance: f32,
    rng: &mut DungeonRng,
    observer: &mut dyn GenerationObserver,
) -> Result<Vec<Door>, GraphError> {
    let mut doors = Vec::new();
    let mut joined: BTreeSet<(Room, Room)> = BTreeSet::new();

    for room in tree.nodes() {
        for neighbor in tree.neighbors(room)? {
            let pair = if *room <= neighbor {
                (*room, neighbor)
            } else {
                (neighbor, *room)
            };
            if !joined.insert(pair) {
                continue;
            }

            let Some(wall) = room.intersect(&neighbor) else {
                log::warn!("{} and {} share no wall, no door placed", room, neighbor);
                continue;
            };
            match cut_door(wall, *room, neighbor, hallway_chance, rng) {
                Some(door) => {
                    observer.on_event(&GenerationEvent::DoorPlaced(door));
                    doors.push(door);
                }
                None => log::warn!(
                    "wall {} between {} and {} can't hold a door",
                    wall,
                    room,
                    neighbor
                ),
            }
        }
    }

    let hallways = doors
        .iter()
        .filter(|d| d.kind == DoorKind::Hallway)
        .count();
    log::info!(
        "Placed {} doors ({} hallways, {} doorways)",
        doors.len(),
        hallways,
        doors.len() - hallways
    );
    Ok(doors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;

    fn side_by_side() -> (Room, Room, Room) {
        let a = Room::new(0, 0, 8, 10);
        let b = Room::new(7, 0, 8, 10);
        let wall = a.intersect(&b).unwrap();
        (a, b, wall)
    }

    #[test]
    fn test_hallway_spans_wall_minus_ends() {
        let (a, b, wall) = side_by_side();
        let mut rng = DungeonRng::new(0);
        let door = cut_door(wall, a, b, 1.0, &mut rng).unwrap();
        assert_eq!(door.kind, DoorKind::Hallway);
        assert_eq!(door.rect, Room::new(7, 1, 1, 8));
    }

    #[test]
    fn test_doorway_keeps_margin() {
        let (a, b, wall) = side_by_side();
        let mut rng = DungeonRng::new(9);
        for _ in 0..200 {
            let door = cut_door(wall, a, b, 0.0, &mut rng).unwrap();
            assert_eq!(door.kind, DoorKind::Doorway);
            assert_eq!(door.rect.width, 1);
            assert_eq!(door.rect.height, DOORWAY_WIDTH);
            assert!(door.rect.y > wall.y);
            assert!(door.rect.y_max() < wall.y_max());
        }
    }

    #[test]
    fn test_horizontal_wall_orientation() {
        let a = Room::new(0, 0, 6, 5);
        let b = Room::new(0, 4, 6, 5);
        let wall = a.intersect(&b).unwrap();
        let mut rng = DungeonRng::new(1);
        let door = cut_door(wall, a, b, 0.0, &mut rng).unwrap();
        assert_eq!(door.rect.height, 1);
        assert_eq!(door.rect.y, 4);
        // span 6: x in [1, 4)
        assert!((1..4).contains(&door.rect.x));
    }

    #[test]
    fn test_short_wall_rejected() {
        let wall = Room::new(5, 0, 1, 3);
        let mut rng = DungeonRng::new(0);
        assert!(cut_door(wall, wall, wall, 0.0, &mut rng).is_none());
    }

    #[test]
    fn test_one_door_per_tree_edge() {
        let a = Room::new(0, 0, 8, 8);
        let b = Room::new(7, 0, 8, 8);
        let c = Room::new(0, 7, 8, 8);
        let mut tree = Graph::new();
        tree.add_edge(a, b);
        tree.add_edge(a, c);
        let mut rng = DungeonRng::new(4);
        let doors = place_doors(&tree, 0.5, &mut rng, &mut NoopObserver).unwrap();
        assert_eq!(doors.len(), 2);
        assert!(doors.iter().any(|d| d.connects(&b, &a)));
        assert!(doors.iter().any(|d| d.connects(&a, &c)));
        for d in &doors {
            let wall = d.room1.intersect(&d.room2).unwrap();
            assert_eq!(wall.intersect(&d.rect), Some(d.rect));
        }
    }
}
