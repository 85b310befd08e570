//! Grid index mapping map coordinates to tile descriptors.

use std::collections::HashMap;

use tactics_grid_core::{MapBounds, MapCoord, TileDescriptor};

/// One registered grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    coord: MapCoord,
    passable: bool,
}

impl Tile {
    /// Coordinate the tile is stored under.
    #[must_use]
    pub const fn coord(&self) -> MapCoord {
        self.coord
    }

    /// Reports whether actors may occupy or traverse the tile.
    #[must_use]
    pub const fn is_passable(&self) -> bool {
        self.passable
    }
}

/// Mapping from coordinate to tile, rebuilt whenever a map is loaded.
///
/// Every tile is stored under its own coordinate. Lookups outside the loaded
/// map return `None`, which is how map edges and gaps are represented.
#[derive(Clone, Debug, Default)]
pub struct GridIndex {
    tiles: HashMap<MapCoord, Tile>,
    bounds: Option<MapBounds>,
}

impl GridIndex {
    /// Builds an index from descriptors; later duplicates replace earlier ones.
    #[must_use]
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = TileDescriptor>,
    {
        let mut tiles = HashMap::new();
        let mut bounds: Option<MapBounds> = None;

        for descriptor in descriptors {
            let tile = Tile {
                coord: descriptor.coord,
                passable: descriptor.passable,
            };
            let _ = tiles.insert(descriptor.coord, tile);
            bounds = Some(match bounds {
                Some(bounds) => bounds.including(descriptor.coord),
                None => MapBounds::from_corners(descriptor.coord, descriptor.coord),
            });
        }

        Self { tiles, bounds }
    }

    /// Tile registered at the coordinate, if any.
    #[must_use]
    pub fn lookup(&self, cell: MapCoord) -> Option<&Tile> {
        self.tiles.get(&cell)
    }

    /// Reports whether the coordinate holds a passable tile.
    #[must_use]
    pub fn is_passable(&self, cell: MapCoord) -> bool {
        self.lookup(cell).is_some_and(Tile::is_passable)
    }

    /// Refreshes a tile's passability.
    ///
    /// Returns `true` only when the tile exists and its passability changed.
    pub fn set_passable(&mut self, cell: MapCoord, passable: bool) -> bool {
        match self.tiles.get_mut(&cell) {
            Some(tile) if tile.passable != passable => {
                tile.passable = passable;
                true
            }
            _ => false,
        }
    }

    /// Smallest rectangle containing every registered tile.
    #[must_use]
    pub fn bounds(&self) -> Option<MapBounds> {
        self.bounds
    }

    /// Number of registered tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether no tile is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterator over every registered tile in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }
}
