//! Generic undirected graph.
//!
//! `Graph<T>` maps each node to the set of its neighbours. Every edge is
//! stored symmetrically in both neighbour sets. Storage is ordered
//! (`BTreeMap`/`BTreeSet`) so iteration order depends only on contents,
//! which keeps every stage that walks the graph reproducible for a seed.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

/// Traversal order used for connectivity checks and spanning trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TraversalMode {
    /// Queue-based breadth-first traversal.
    #[default]
    Bfs,
    /// Stack-based depth-first traversal.
    Dfs,
}

/// Contract violations on graph lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The node is not part of the graph. Holds the node's debug form.
    NodeNotFound(String),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::NodeNotFound(node) => write!(f, "node {} is not in the graph", node),
        }
    }
}

impl std::error::Error for GraphError {}

/// Undirected graph over value-equal nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Ord + Deserialize<'de>"
))]
pub struct Graph<T: Ord> {
    adjacency: BTreeMap<T, BTreeSet<T>>,
}

impl<T: Ord> Default for Graph<T> {
    fn default() -> Self {
        Self {
            adjacency: BTreeMap::new(),
        }
    }
}

impl<T: Ord + Clone + Debug> Graph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.adjacency.clear();
    }

    /// Add a node. No-op if it already exists.
    pub fn add_node(&mut self, node: T) {
        self.adjacency.entry(node).or_default();
    }

    /// Remove a node and every edge touching it. No-op if absent.
    pub fn remove_node(&mut self, node: &T) {
        if let Some(neighbors) = self.adjacency.remove(node) {
            for n in &neighbors {
                if let Some(set) = self.adjacency.get_mut(n) {
                    set.remove(node);
                }
            }
        }
    }

    /// Add an undirected edge, creating either node if needed.
    /// A self-edge only ensures the node exists.
    pub fn add_edge(&mut self, a: T, b: T) {
        if a == b {
            self.add_node(a);
            return;
        }
        self.adjacency.entry(a.clone()).or_default().insert(b.clone());
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// Remove an undirected edge. No-op if absent.
    pub fn remove_edge(&mut self, a: &T, b: &T) {
        if let Some(set) = self.adjacency.get_mut(a) {
            set.remove(b);
        }
        if let Some(set) = self.adjacency.get_mut(b) {
            set.remove(a);
        }
    }

    /// Snapshot of a node's neighbours.
    pub fn neighbors(&self, node: &T) -> Result<Vec<T>, GraphError> {
        self.adjacency
            .get(node)
            .map(|set| set.iter().cloned().collect())
            .ok_or_else(|| GraphError::NodeNotFound(format!("{:?}", node)))
    }

    pub fn contains_node(&self, node: &T) -> bool {
        self.adjacency.contains_key(node)
    }

    pub fn has_edge(&self, a: &T, b: &T) -> bool {
        self.adjacency.get(a).is_some_and(|set| set.contains(b))
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.adjacency.keys()
    }

    /// The smallest node; used wherever "any existing node" will do.
    pub fn first_node(&self) -> Option<&T> {
        self.adjacency.keys().next()
    }

    /// Every undirected edge once, as `(smaller, larger)`.
    pub fn edges(&self) -> impl Iterator<Item = (&T, &T)> {
        self.adjacency
            .iter()
            .flat_map(|(a, set)| set.iter().filter(move |b| a < *b).map(move |b| (a, b)))
    }

    /// Walk every node reachable from `start` in the given order, calling
    /// `on_discover(from, to)` once per newly discovered node (the edge that
    /// discovered it). Returns the number of reached nodes, `start` included.
    pub fn traverse<F>(
        &self,
        start: &T,
        mode: TraversalMode,
        mut on_discover: F,
    ) -> Result<usize, GraphError>
    where
        F: FnMut(&T, &T),
    {
        if !self.contains_node(start) {
            return Err(GraphError::NodeNotFound(format!("{:?}", start)));
        }

        let mut discovered: BTreeSet<&T> = BTreeSet::new();
        let mut frontier: VecDeque<&T> = VecDeque::new();
        discovered.insert(start);
        frontier.push_back(start);

        loop {
            let next = match mode {
                TraversalMode::Bfs => frontier.pop_front(),
                TraversalMode::Dfs => frontier.pop_back(),
            };
            let Some(node) = next else { break };
            let Some(neighbors) = self.adjacency.get(node) else {
                continue;
            };
            for connected in neighbors {
                if discovered.insert(connected) {
                    on_discover(node, connected);
                    frontier.push_back(connected);
                }
            }
        }

        Ok(discovered.len())
    }

    /// Breadth-first connectivity check: true if every node is reachable from `start`.
    pub fn bfs(&self, start: &T) -> Result<bool, GraphError> {
        let reached = self.traverse(start, TraversalMode::Bfs, |_, _| {})?;
        Ok(reached == self.node_count())
    }

    /// Depth-first connectivity check: true if every node is reachable from `start`.
    pub fn dfs(&self, start: &T) -> Result<bool, GraphError> {
        let reached = self.traverse(start, TraversalMode::Dfs, |_, _| {})?;
        Ok(reached == self.node_count())
    }

    /// Connectivity from the first node. An empty graph counts as connected.
    pub fn is_connected(&self, mode: TraversalMode) -> bool {
        match self.first_node() {
            None => true,
            Some(start) => match mode {
                TraversalMode::Bfs => self.bfs(start),
                TraversalMode::Dfs => self.dfs(start),
            }
            .unwrap_or(false),
        }
    }
}

impl<T: Ord + Hash> Graph<T> {
    /// Hash of every node and edge. Equal graphs always agree; anything
    /// caching results per graph compares this to notice a different graph.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.adjacency.hash(&mut hasher);
        hasher.finish()
    }
}
