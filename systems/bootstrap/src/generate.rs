//! Rectangular maps whose passability is answered by a check.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use tactics_grid_core::{MapCoord, MapError, TileDescriptor};
use tactics_grid_world::{MapLayout, MapSource, Topology};
use tracing::debug;

/// Answers whether a tile of a generated map can be entered.
pub trait ObstacleCheck {
    /// Reports whether `cell` is open floor.
    fn is_passable(&self, cell: MapCoord) -> bool;
}

impl<F> ObstacleCheck for F
where
    F: Fn(MapCoord) -> bool,
{
    fn is_passable(&self, cell: MapCoord) -> bool {
        self(cell)
    }
}

impl ObstacleCheck for BTreeSet<MapCoord> {
    fn is_passable(&self, cell: MapCoord) -> bool {
        !self.contains(&cell)
    }
}

/// Fully populated `columns` x `rows` map anchored at the origin.
#[derive(Clone, Debug)]
pub struct CheckedGrid<C> {
    name: String,
    columns: u32,
    rows: u32,
    topology: Topology,
    check: C,
}

impl<C: ObstacleCheck> CheckedGrid<C> {
    /// Creates an orthogonal grid answered by `check`.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: u32, rows: u32, check: C) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
            topology: Topology::Orthogonal,
            check,
        }
    }

    /// Switches the adjacency rule of the generated layout.
    #[must_use]
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Name the grid resolves under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<C: ObstacleCheck> MapSource for CheckedGrid<C> {
    fn resolve(&self, name: &str) -> Result<MapLayout, MapError> {
        if name != self.name {
            return Err(MapError::NotFound {
                name: name.to_owned(),
            });
        }

        let invalid = |reason: &str| MapError::InvalidLayout {
            name: self.name.clone(),
            reason: reason.to_owned(),
        };
        if self.columns == 0 || self.rows == 0 {
            return Err(invalid("grid must have at least one column and one row"));
        }
        let columns = i32::try_from(self.columns).map_err(|_| invalid("too many columns"))?;
        let rows = i32::try_from(self.rows).map_err(|_| invalid("too many rows"))?;

        let tiles = (0..rows)
            .flat_map(|y| (0..columns).map(move |x| MapCoord::new(x, y)))
            .map(|coord| TileDescriptor::new(coord, self.check.is_passable(coord)))
            .collect();
        Ok(MapLayout::new(self.topology, tiles))
    }
}

/// Seeded scatter of obstacles over a rectangle.
///
/// Tiles are visited row by row from the origin and each is blocked with
/// probability `density`, so a seed always yields the same map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterObstacles {
    /// Width of the map in tiles.
    pub columns: u32,
    /// Height of the map in tiles.
    pub rows: u32,
    /// Probability in `[0, 1]` that a tile is an obstacle.
    pub density: f64,
    /// Seed of the deterministic generator.
    pub seed: u64,
}

impl ScatterObstacles {
    /// Cells chosen as obstacles.
    #[must_use]
    pub fn blocked(&self) -> BTreeSet<MapCoord> {
        let density = if self.density.is_finite() {
            self.density.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let columns = i32::try_from(self.columns).unwrap_or(i32::MAX);
        let rows = i32::try_from(self.rows).unwrap_or(i32::MAX);

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut blocked = BTreeSet::new();
        for y in 0..rows {
            for x in 0..columns {
                if rng.gen_bool(density) {
                    let _ = blocked.insert(MapCoord::new(x, y));
                }
            }
        }
        debug!(seed = self.seed, blocked = blocked.len(), "obstacles_scattered");
        blocked
    }

    /// Map source resolving `name` to the scattered grid.
    #[must_use]
    pub fn into_grid(self, name: impl Into<String>) -> CheckedGrid<BTreeSet<MapCoord>> {
        CheckedGrid::new(name, self.columns, self.rows, self.blocked())
    }
}
