//! Integer floor-plan geometry.
//!
//! Rooms are half-open integer rectangles: a room at `x` with `width` covers
//! cell columns `x..x + width`. Rooms produced by the partitioner share their
//! boundary row/column with their neighbours, so two adjacent rooms overlap
//! in a one-cell-thick line; that line is the wall a door is cut into.

use serde::{Deserialize, Serialize};

/// The four orthogonal unit steps. No diagonals anywhere in the grid.
pub const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Axis-aligned integer rectangle. Value type: equality, hashing and
/// ordering are by field values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub const fn x_max(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive top edge.
    pub const fn y_max(&self) -> i32 {
        self.y + self.height
    }

    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Overlapping region of two rooms, or `None` when they don't overlap.
    pub fn intersect(&self, other: &Room) -> Option<Room> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let w = self.x_max().min(other.x_max()) - x;
        let h = self.y_max().min(other.y_max()) - y;
        if w <= 0 || h <= 0 {
            None
        } else {
            Some(Room::new(x, y, w, h))
        }
    }

    /// Area of the overlap with `other`, zero when disjoint.
    pub fn intersection_area(&self, other: &Room) -> i64 {
        self.intersect(other).map_or(0, |r| r.area())
    }

    pub const fn contains_cell(&self, cell: Cell) -> bool {
        cell.x >= self.x && cell.x < self.x_max() && cell.y >= self.y && cell.y < self.y_max()
    }

    /// Closed-bounds point test, so points on a shared wall belong to both rooms.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x as f32
            && p.x <= self.x_max() as f32
            && p.y >= self.y as f32
            && p.y <= self.y_max() as f32
    }

    /// True for cells on the outermost ring (the room's walls).
    pub const fn is_perimeter(&self, cell: Cell) -> bool {
        self.contains_cell(cell)
            && (cell.x == self.x
                || cell.x == self.x_max() - 1
                || cell.y == self.y
                || cell.y == self.y_max() - 1)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Every cell of the room, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (x0, x1, y0, y1) = (self.x, self.x_max(), self.y, self.y_max());
        (y0..y1).flat_map(move |y| (x0..x1).map(move |x| Cell::new(x, y)))
    }

    /// Cells inside the wall ring, row by row.
    pub fn interior_cells(&self) -> impl Iterator<Item = Cell> {
        let (x0, x1, y0, y1) = (self.x + 1, self.x_max() - 1, self.y + 1, self.y_max() - 1);
        (y0..y1).flat_map(move |y| (x0..x1).map(move |x| Cell::new(x, y)))
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// One grid cell. Its navigation node sits at the cell center,
/// `(x + 0.5, y + 0.5)`. A continuous position snaps to the cell at its
/// rounded coordinates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Snap a position to a cell: each coordinate is rounded to the nearest
    /// integer, halves away from zero.
    pub fn snap(p: Point) -> Self {
        Self::new(p.x.round() as i32, p.y.round() as i32)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }

    /// The position in the middle of this cell's snapping area, so
    /// `Cell::snap(c.anchor()) == c`.
    pub fn anchor(&self) -> Point {
        Point::new(self.x as f32, self.y as f32)
    }

    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbours.
    pub fn neighbors4(self) -> impl Iterator<Item = Cell> {
        ORTHOGONAL
            .into_iter()
            .map(move |(dx, dy)| self.offset(dx, dy))
    }

    pub const fn manhattan(&self, other: Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// A continuous floor-plane position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Shape of a door opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorKind {
    /// Wide opening spanning the shared wall minus its corner cells.
    Hallway,
    /// Narrow 2-cell opening.
    Doorway,
}

/// An opening cut into the wall two rooms share. `room1`/`room2` are unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Door {
    pub rect: Room,
    pub room1: Room,
    pub room2: Room,
    pub kind: DoorKind,
}

impl Door {
    /// True if this door joins `a` and `b`, in either order.
    pub fn connects(&self, a: &Room, b: &Room) -> bool {
        (self.room1 == *a && self.room2 == *b) || (self.room1 == *b && self.room2 == *a)
    }

    pub fn touches(&self, room: &Room) -> bool {
        self.room1 == *room || self.room2 == *room
    }

    /// The room pair in canonical (sorted) order.
    pub fn room_pair(&self) -> (Room, Room) {
        if self.room1 <= self.room2 {
            (self.room1, self.room2)
        } else {
            (self.room2, self.room1)
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        self.rect.cells()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_connects_either_order() {
        let a = Room::new(0, 0, 6, 6);
        let b = Room::new(5, 0, 6, 6);
        let c = Room::new(0, 5, 6, 6);
        let door = Door {
            rect: Room::new(5, 2, 1, 2),
            room1: a,
            room2: b,
            kind: DoorKind::Doorway,
        };
        assert!(door.connects(&a, &b));
        assert!(door.connects(&b, &a));
        assert!(!door.connects(&a, &c));
        assert!(door.touches(&b));
        assert_eq!(door.room_pair(), (a, b));
        assert_eq!(door.cells().count(), 2);
    }

    #[test]
    fn test_shared_wall_intersection() {
        let a = Room::new(0, 0, 6, 8);
        let b = Room::new(5, 0, 6, 8);
        assert_eq!(a.intersect(&b), Some(Room::new(5, 0, 1, 8)));
        assert_eq!(a.intersection_area(&b), 8);
    }

    #[test]
    fn test_disjoint_rooms_have_no_intersection() {
        let a = Room::new(0, 0, 5, 5);
        let b = Room::new(5, 0, 5, 5);
        assert_eq!(a.intersect(&b), None);
        assert_eq!(a.intersection_area(&b), 0);
    }

    #[test]
    fn test_intersection_is_symmetric() {
        let a = Room::new(2, 3, 7, 4);
        let b = Room::new(4, 6, 9, 9);
        assert_eq!(a.intersect(&b), b.intersect(&a));
    }

    #[test]
    fn test_interior_excludes_walls() {
        let r = Room::new(0, 0, 4, 5);
        let interior: Vec<Cell> = r.interior_cells().collect();
        assert_eq!(interior.len(), 2 * 3);
        assert!(interior.iter().all(|c| !r.is_perimeter(*c)));
        assert_eq!(r.cells().count(), 20);
    }

    #[test]
    fn test_perimeter() {
        let r = Room::new(10, 10, 5, 5);
        assert!(r.is_perimeter(Cell::new(10, 12)));
        assert!(r.is_perimeter(Cell::new(14, 14)));
        assert!(!r.is_perimeter(Cell::new(12, 12)));
        assert!(!r.is_perimeter(Cell::new(20, 20)));
    }

    #[test]
    fn test_snap_rounds_to_nearest_integer() {
        assert_eq!(Cell::snap(Point::new(3.7, 0.2)), Cell::new(4, 0));
        assert_eq!(Cell::snap(Point::new(0.4, 0.6)), Cell::new(0, 1));
        assert_eq!(Cell::snap(Point::new(0.5, 2.49)), Cell::new(1, 2));
        assert_eq!(Cell::snap(Point::new(-0.2, -0.7)), Cell::new(0, -1));
        assert_eq!(Cell::new(4, 7).center(), Point::new(4.5, 7.5));
    }

    #[test]
    fn test_anchor_snaps_back_to_its_cell() {
        for c in [Cell::new(0, 0), Cell::new(9, 3), Cell::new(-2, 5)] {
            assert_eq!(Cell::snap(c.anchor()), c);
        }
    }

    #[test]
    fn test_room_contains_point_on_wall() {
        let a = Room::new(0, 0, 6, 6);
        let b = Room::new(5, 0, 6, 6);
        let on_wall = Point::new(5.5, 3.0);
        assert!(a.contains_point(on_wall));
        assert!(b.contains_point(on_wall));
        assert!(!a.contains_point(Point::new(7.0, 3.0)));
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(Cell::new(0, 0).manhattan(Cell::new(4, 4)), 8);
        assert_eq!(Cell::new(-2, 3).manhattan(Cell::new(1, 1)), 5);
    }
}
