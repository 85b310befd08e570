#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tactics grid engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. The movement system consumes those events and
//! answers with new command batches, one step at a time.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations once a map is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Places an actor on the loaded map.
    SpawnActor {
        /// Identifier the actor will be known by.
        actor: ActorId,
        /// Tile the actor starts on.
        cell: MapCoord,
        /// Number of unit steps the actor may spend per move.
        budget: MovementBudget,
    },
    /// Moves an actor a single step onto a neighbouring tile.
    ///
    /// The executor answers with [`Event::ActorStepped`] once the actor has
    /// arrived, or with [`Event::StepRejected`] when the step cannot happen.
    StepActor {
        /// Actor performing the step.
        actor: ActorId,
        /// Neighbouring tile the actor should end up on.
        to: MapCoord,
    },
    /// Refreshes the passability of a single tile after an obstacle check.
    SetPassable {
        /// Tile whose passability changed.
        cell: MapCoord,
        /// Whether actors may traverse the tile.
        passable: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a map replaced the previous grid index.
    MapLoaded {
        /// Identifier the map was resolved from.
        name: String,
        /// Number of tiles registered in the grid index.
        tiles: usize,
    },
    /// Confirms that an actor was placed on the map.
    ActorSpawned {
        /// Identifier of the placed actor.
        actor: ActorId,
        /// Tile the actor occupies.
        cell: MapCoord,
    },
    /// Reports that an actor could not be placed.
    ActorSpawnRejected {
        /// Identifier of the actor that was not placed.
        actor: ActorId,
        /// Tile requested for the actor.
        cell: MapCoord,
        /// Specific reason the placement failed.
        reason: SpawnError,
    },
    /// Completion notification for a single step.
    ActorStepped {
        /// Actor that finished the step.
        actor: ActorId,
        /// Tile the actor left.
        from: MapCoord,
        /// Tile the actor arrived on.
        to: MapCoord,
    },
    /// Reports that a requested step did not happen.
    StepRejected {
        /// Actor the step was requested for.
        actor: ActorId,
        /// Tile the actor was asked to enter.
        to: MapCoord,
        /// Specific reason the step failed.
        reason: StepError,
    },
    /// Confirms that a tile's passability was refreshed.
    PassabilityChanged {
        /// Tile whose passability changed.
        cell: MapCoord,
        /// Whether actors may now traverse the tile.
        passable: bool,
    },
}

/// Location of a single grid tile expressed as integer map coordinates.
///
/// `y` grows upwards, so the tile above `(x, y)` is `(x, y + 1)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MapCoord {
    x: i32,
    y: i32,
}

impl MapCoord {
    /// Creates a new map coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate shifted by the provided delta.
    ///
    /// Yields `None` when either component would overflow.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: MapCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for MapCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Maximum number of unit steps an actor may spend in one move action.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MovementBudget(u32);

impl MovementBudget {
    /// Creates a budget of the provided number of steps.
    #[must_use]
    pub const fn new(steps: u32) -> Self {
        Self(steps)
    }

    /// Number of steps the budget allows.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the budget allows no movement at all.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i64> for MovementBudget {
    type Error = BudgetError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(BudgetError::Negative { value });
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| BudgetError::TooLarge { value })
    }
}

impl fmt::Display for MovementBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tile description yielded by a map source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileDescriptor {
    /// Coordinate the tile is registered under.
    pub coord: MapCoord,
    /// Result of the obstacle check performed when the tile was created.
    pub passable: bool,
}

impl TileDescriptor {
    /// Creates a new tile descriptor.
    #[must_use]
    pub const fn new(coord: MapCoord, passable: bool) -> Self {
        Self { coord, passable }
    }
}

/// Inclusive rectangle spanning every registered tile of a map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapBounds {
    min: MapCoord,
    max: MapCoord,
}

impl MapBounds {
    /// Creates bounds from two corners, normalising their order.
    #[must_use]
    pub fn from_corners(a: MapCoord, b: MapCoord) -> Self {
        Self {
            min: MapCoord::new(a.x().min(b.x()), a.y().min(b.y())),
            max: MapCoord::new(a.x().max(b.x()), a.y().max(b.y())),
        }
    }

    /// Bottom-left corner.
    #[must_use]
    pub const fn min(&self) -> MapCoord {
        self.min
    }

    /// Top-right corner.
    #[must_use]
    pub const fn max(&self) -> MapCoord {
        self.max
    }

    /// Grows the bounds so they include the provided coordinate.
    #[must_use]
    pub fn including(self, cell: MapCoord) -> Self {
        Self::from_corners(
            MapCoord::new(self.min.x().min(cell.x()), self.min.y().min(cell.y())),
            MapCoord::new(self.max.x().max(cell.x()), self.max.y().max(cell.y())),
        )
    }

    /// Reports whether the coordinate lies within the bounds.
    #[must_use]
    pub fn contains(&self, cell: MapCoord) -> bool {
        (self.min.x()..=self.max.x()).contains(&cell.x())
            && (self.min.y()..=self.max.y()).contains(&cell.y())
    }

    /// Number of columns spanned by the bounds.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.max.x().abs_diff(self.min.x()) + 1
    }

    /// Number of rows spanned by the bounds.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.max.y().abs_diff(self.min.y()) + 1
    }
}

/// Tiles an actor can reach within its budget, keyed by minimum step cost.
///
/// The query source is never part of the set; callers highlight the origin
/// separately with cost zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReachableSet {
    costs: BTreeMap<MapCoord, u32>,
}

impl ReachableSet {
    /// Creates a reachable set from precomputed costs.
    #[must_use]
    pub fn from_costs(costs: BTreeMap<MapCoord, u32>) -> Self {
        Self { costs }
    }

    /// Minimum step cost recorded for the tile, if it is reachable.
    #[must_use]
    pub fn cost(&self, cell: MapCoord) -> Option<u32> {
        self.costs.get(&cell).copied()
    }

    /// Reports whether the tile is reachable.
    #[must_use]
    pub fn contains(&self, cell: MapCoord) -> bool {
        self.costs.contains_key(&cell)
    }

    /// Number of reachable tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// Reports whether no tile is reachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Largest cost contained in the set.
    #[must_use]
    pub fn max_cost(&self) -> Option<u32> {
        self.costs.values().copied().max()
    }

    /// Iterator over reachable tiles and their costs in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (MapCoord, u32)> + '_ {
        self.costs.iter().map(|(cell, cost)| (*cell, *cost))
    }
}

/// Ordered route from the tile after the source up to and including the destination.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    steps: Vec<MapCoord>,
}

impl Path {
    /// Creates a path from steps listed in traversal order.
    #[must_use]
    pub fn from_steps(steps: Vec<MapCoord>) -> Self {
        Self { steps }
    }

    /// Steps in traversal order.
    #[must_use]
    pub fn steps(&self) -> &[MapCoord] {
        &self.steps
    }

    /// Number of steps in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Reports whether the path contains no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Final tile of the path.
    #[must_use]
    pub fn destination(&self) -> Option<MapCoord> {
        self.steps.last().copied()
    }

    /// Consumes the path, yielding the underlying steps.
    #[must_use]
    pub fn into_steps(self) -> Vec<MapCoord> {
        self.steps
    }
}

/// Unique identifier assigned to an actor.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable representation of a single actor used for queries and selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Tile currently occupied by the actor.
    pub cell: MapCoord,
    /// Steps the actor may spend in one move action.
    pub budget: MovementBudget,
}

/// Phase of the single-selection move state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SelectionPhase {
    /// No actor is selected and nothing is highlighted.
    #[default]
    Idle,
    /// One actor is selected and its reachable tiles are highlighted.
    Selected,
    /// A path is being consumed one step at a time.
    Moving,
}

/// Presentation collaborator notified as tiles enter or leave the reachable set.
pub trait HighlightSink {
    /// Marks the tile as reachable at the provided step cost.
    fn highlight(&mut self, cell: MapCoord, cost: u32);

    /// Returns the tile to its normal appearance.
    fn reset(&mut self, cell: MapCoord);
}

/// Failures raised while resolving a map source.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MapError {
    /// The identifier does not resolve to any known map.
    #[error("map `{name}` not found")]
    NotFound {
        /// Identifier that failed to resolve.
        name: String,
    },
    /// The map resolved but its tile data is malformed.
    #[error("map `{name}` has an invalid layout: {reason}")]
    InvalidLayout {
        /// Identifier of the malformed map.
        name: String,
        /// Human readable description of the defect.
        reason: String,
    },
}

/// Failures raised while reconstructing a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// The destination is not connected to the origin within the budget.
    #[error("no path from {from} to {to} within {budget} steps")]
    Unreachable {
        /// Tile the actor stands on.
        from: MapCoord,
        /// Tile the actor was asked to reach.
        to: MapCoord,
        /// Step budget the path had to fit in.
        budget: MovementBudget,
    },
    /// Origin and destination coincide, so there is nothing to walk.
    #[error("actor already stands on {cell}")]
    ZeroLength {
        /// Tile shared by origin and destination.
        cell: MapCoord,
    },
    /// The greedy walk found no labelled neighbour to continue from.
    #[error("path walk stalled at {cell}")]
    Stalled {
        /// Tile the walk could not leave.
        cell: MapCoord,
    },
}

/// Failures raised when a raw budget value crosses into the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// Negative budgets are meaningless.
    #[error("movement budget must not be negative, got {value}")]
    Negative {
        /// Rejected raw value.
        value: i64,
    },
    /// The budget does not fit the engine's step counter.
    #[error("movement budget {value} is too large")]
    TooLarge {
        /// Rejected raw value.
        value: i64,
    },
}

/// Reasons an actor placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// The requested tile is not part of the loaded map.
    OffMap,
    /// The requested tile is blocked by an obstacle.
    Impassable,
    /// Another actor already stands on the tile.
    Occupied,
    /// An actor with the same identifier already exists.
    DuplicateActor,
}

/// Reasons a single step may be rejected by the motion driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepError {
    /// No actor with the provided identifier exists.
    UnknownActor,
    /// The target tile is not a neighbour of the actor's tile.
    NotAdjacent,
    /// The target tile is not part of the loaded map.
    OffMap,
    /// The target tile is blocked by an obstacle.
    Impassable,
    /// Another actor already stands on the target tile.
    Occupied,
}
