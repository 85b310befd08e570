//! Contract for collaborators that enumerate a map's tiles.

use tactics_grid_core::{MapError, TileDescriptor};

use crate::adjacency::Topology;

/// Everything the world needs to rebuild its grid index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapLayout {
    /// Adjacency rule the map is laid out for.
    pub topology: Topology,
    /// Tile descriptors in registration order.
    pub tiles: Vec<TileDescriptor>,
}

impl MapLayout {
    /// Creates a layout for the provided topology and tiles.
    #[must_use]
    pub fn new(topology: Topology, tiles: Vec<TileDescriptor>) -> Self {
        Self { topology, tiles }
    }
}

/// Resolves map identifiers into tile layouts.
pub trait MapSource {
    /// Enumerates every tile of the named map.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] when the identifier does not resolve and
    /// [`MapError::InvalidLayout`] when the map data is malformed.
    fn resolve(&self, name: &str) -> Result<MapLayout, MapError>;
}

impl<S> MapSource for &S
where
    S: MapSource + ?Sized,
{
    fn resolve(&self, name: &str) -> Result<MapLayout, MapError> {
        (**self).resolve(name)
    }
}
