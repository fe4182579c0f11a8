//! Pure dungeon-layout logic for delvegen.
//!
//! This crate contains the building blocks that the generation pipeline in
//! `delvegen-core` is assembled from. Nothing here owns pipeline state:
//! functions take plain data and return results, so every piece is
//! unit-testable on its own.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Generator options, defaults and up-front validation |
//! | [`geometry`] | Integer rooms, grid cells, rectangle intersection |
//! | [`graph`] | Generic undirected graph with BFS/DFS connectivity checks |
//! | [`pathfinding`] | A* over the cell navigation graph, with a path cache |
//! | [`rng`] | Seeded, reproducible random source threaded through every stage |
//! | [`validation`] | Layout invariant checks (tiling, tree shape, door margins) |

pub mod config;
pub mod geometry;
pub mod graph;
pub mod pathfinding;
pub mod rng;
pub mod validation;
