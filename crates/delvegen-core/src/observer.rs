//! Step-by-step visibility into a generation run.
//!
//! The pipeline reports every step it takes (a room split, a pruned room, a
//! placed door) to a [`GenerationObserver`]. Generation itself runs to
//! completion in one call; an observer is how a caller animates or inspects
//! the individual steps afterwards, or as they happen.

use delvegen_logic::geometry::{Cell, Door, Room};

/// Pipeline stages, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Partition,
    Prune,
    SpanningTree,
    Doors,
    Navigation,
    Decorations,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Partition,
        Stage::Prune,
        Stage::SpanningTree,
        Stage::Doors,
        Stage::Navigation,
        Stage::Decorations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Partition => "partition",
            Stage::Prune => "prune",
            Stage::SpanningTree => "spanning tree",
            Stage::Doors => "doors",
            Stage::Navigation => "navigation",
            Stage::Decorations => "decorations",
        }
    }
}

/// One observable step.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    StageStarted(Stage),
    StageFinished(Stage),
    /// A partition wave begins with `rooms` rooms to examine.
    WaveStarted { depth: usize, rooms: usize },
    RoomSplit { parent: Room, children: [Room; 2] },
    /// A room is small enough on both axes and becomes a leaf.
    RoomFinalized(Room),
    /// A room left the graph after partitioning because it had no
    /// door-capable wall connecting it to the rest of the layout.
    RoomDetached(Room),
    RoomPruned(Room),
    /// Removing this room would disconnect the layout, so it was restored.
    PruneRolledBack(Room),
    TreeEdgeAdded { from: Room, to: Room },
    DoorPlaced(Door),
    NavNodeAdded(Cell),
    DecorationPlaced(Cell),
}

/// Receives each step of a generation run.
pub trait GenerationObserver {
    fn on_event(&mut self, _event: &GenerationEvent) {}
}

/// Ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {}

/// Records every event for later replay.
#[derive(Debug, Default, Clone)]
pub struct EventRecorder {
    pub events: Vec<GenerationEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&GenerationEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    /// Events between the start and finish of `stage`, exclusive.
    pub fn stage_events(&self, stage: Stage) -> &[GenerationEvent] {
        let start = self
            .events
            .iter()
            .position(|e| *e == GenerationEvent::StageStarted(stage));
        let end = self
            .events
            .iter()
            .position(|e| *e == GenerationEvent::StageFinished(stage));
        match (start, end) {
            (Some(s), Some(e)) if s < e => &self.events[s + 1..e],
            _ => &[],
        }
    }
}

impl GenerationObserver for EventRecorder {
    fn on_event(&mut self, event: &GenerationEvent) {
        self.events.push(event.clone());
    }
}

impl<F> GenerationObserver for F
where
    F: FnMut(&GenerationEvent),
{
    fn on_event(&mut self, event: &GenerationEvent) {
        self(event)
    }
}
