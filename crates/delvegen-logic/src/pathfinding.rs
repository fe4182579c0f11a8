//! A* pathfinding over the cell navigation graph.
//!
//! Continuous positions are snapped to a cell by rounding each coordinate
//! to the nearest integer (see [`Cell::snap`]). Step cost and heuristic are both Manhattan distance, which is admissible and
//! consistent on a 4-connected unit grid. A failed search is an ordinary
//! outcome: the result carries an empty path and a [`PathFailure`].
//!
//! [`Pathfinder`] adds a small bounded cache of cell paths keyed by
//! `(start cell, target cell)`. The cache belongs to one graph: a query
//! against a graph with a different [`Graph::fingerprint`] empties it first.

use std::collections::{HashMap, HashSet};

use crate::geometry::{Cell, Point};
use crate::graph::Graph;

/// Why a search produced no path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFailure {
    /// The start position is not on a walkable cell.
    StartNotWalkable(Cell),
    /// The target position is not on a walkable cell.
    TargetNotWalkable(Cell),
    /// Both cells are walkable but no route connects them.
    Unreachable { start: Cell, target: Cell },
}

impl std::fmt::Display for PathFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathFailure::StartNotWalkable(c) => {
                write!(f, "start cell ({}, {}) is not walkable", c.x, c.y)
            }
            PathFailure::TargetNotWalkable(c) => {
                write!(f, "target cell ({}, {}) is not walkable", c.x, c.y)
            }
            PathFailure::Unreachable { start, target } => write!(
                f,
                "no path from ({}, {}) to ({}, {})",
                start.x, start.y, target.x, target.y
            ),
        }
    }
}

/// Outcome of a path query.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Cells stepped onto after the start cell, ending at the target cell.
    pub cells: Vec<Cell>,
    /// Cell centers of `cells`, followed by the exact requested target.
    /// Empty when the search failed.
    pub waypoints: Vec<Point>,
    /// Diagnostic for a failed search.
    pub failure: Option<PathFailure>,
}

impl PathResult {
    fn found(cells: Vec<Cell>, target: Point) -> Self {
        let mut waypoints: Vec<Point> = cells.iter().map(Cell::center).collect();
        waypoints.push(target);
        Self {
            cells,
            waypoints,
            failure: None,
        }
    }

    /// An empty result for a failed query. Logs the failure.
    pub fn failed(failure: PathFailure) -> Self {
        log::warn!("Pathfinding failed: {}", failure);
        Self {
            cells: Vec::new(),
            waypoints: Vec::new(),
            failure: Some(failure),
        }
    }

    pub fn is_found(&self) -> bool {
        self.failure.is_none()
    }

    /// Number of cell-to-cell moves.
    pub fn steps(&self) -> usize {
        self.cells.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct NodeRecord {
    g: i32,
    f: i32,
    parent: Option<Cell>,
}

/// Run A* between two cells. On success returns the cells after `start`
/// up to and including `target` (empty when they are the same cell).
pub fn astar(graph: &Graph<Cell>, start: Cell, target: Cell) -> Result<Vec<Cell>, PathFailure> {
    if !graph.contains_node(&start) {
        return Err(PathFailure::StartNotWalkable(start));
    }
    if !graph.contains_node(&target) {
        return Err(PathFailure::TargetNotWalkable(target));
    }

    let mut records: HashMap<Cell, NodeRecord> = HashMap::new();
    let mut open: Vec<Cell> = vec![start];
    let mut closed: HashSet<Cell> = HashSet::new();
    records.insert(
        start,
        NodeRecord {
            g: 0,
            f: start.manhattan(target),
            parent: None,
        },
    );

    while !open.is_empty() {
        // Lowest f wins; min_by_key keeps the first of equal keys, so ties
        // go to whichever node entered the open set first.
        let Some((index, _)) = open
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| records.get(*c).map_or(i32::MAX, |r| r.f))
        else {
            break;
        };
        let current = open.remove(index);

        if current == target {
            return Ok(reconstruct(&records, target));
        }
        closed.insert(current);

        let current_g = records.get(&current).map_or(0, |r| r.g);
        let Ok(neighbors) = graph.neighbors(&current) else {
            continue;
        };
        for next in neighbors {
            if closed.contains(&next) {
                continue;
            }
            let g = current_g + current.manhattan(next);
            let f = g + next.manhattan(target);
            match records.get_mut(&next) {
                Some(record) => {
                    if g < record.g {
                        *record = NodeRecord {
                            g,
                            f,
                            parent: Some(current),
                        };
                    }
                }
                None => {
                    records.insert(
                        next,
                        NodeRecord {
                            g,
                            f,
                            parent: Some(current),
                        },
                    );
                    open.push(next);
                }
            }
        }
    }

    Err(PathFailure::Unreachable { start, target })
}

fn reconstruct(records: &HashMap<Cell, NodeRecord>, target: Cell) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut current = target;
    while let Some(parent) = records.get(&current).and_then(|r| r.parent) {
        path.push(current);
        current = parent;
    }
    path.reverse();
    path
}

/// A* front end with a bounded path cache.
pub struct Pathfinder {
    cache: HashMap<(Cell, Cell), Vec<Cell>>,
    cache_capacity: usize,
    /// Fingerprint of the graph the cached paths were found on.
    cached_graph: Option<u64>,
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new()
    }
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::with_cache_capacity(256)
    }

    /// A pathfinder that keeps at most `cache_capacity` paths. Zero disables caching.
    pub fn with_cache_capacity(cache_capacity: usize) -> Self {
        Self {
            cache: HashMap::new(),
            cache_capacity,
            cached_graph: None,
        }
    }

    /// Find a walkable route from `start` to `target`.
    ///
    /// Both positions are snapped with [`Cell::snap`]. On success the waypoints
    /// run through the centers of every cell after the start cell and end
    /// at the exact `target`, so a query inside a single cell yields one
    /// waypoint equal to `target`.
    pub fn find_path(&mut self, graph: &Graph<Cell>, start: Point, target: Point) -> PathResult {
        let start_cell = Cell::snap(start);
        let target_cell = Cell::snap(target);
        let key = (start_cell, target_cell);

        if self.cache_capacity > 0 {
            let fingerprint = graph.fingerprint();
            if self.cached_graph != Some(fingerprint) {
                self.cache.clear();
                self.cached_graph = Some(fingerprint);
            }
        }

        if let Some(cells) = self.cache.get(&key) {
            return PathResult::found(cells.clone(), target);
        }

        match astar(graph, start_cell, target_cell) {
            Ok(cells) => {
                if self.cache_capacity > 0 {
                    if self.cache.len() >= self.cache_capacity {
                        // Evict an arbitrary entry
                        if let Some(&evict) = self.cache.keys().next() {
                            self.cache.remove(&evict);
                        }
                    }
                    self.cache.insert(key, cells.clone());
                }
                PathResult::found(cells, target)
            }
            Err(failure) => PathResult::failed(failure),
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.cached_graph = None;
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
