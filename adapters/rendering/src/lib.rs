#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation helpers shared by tactics grid adapters.
//!
//! [`HighlightLayer`] is the highlight sink adapters hand to the movement
//! system; [`AsciiFrame`] turns a map snapshot plus the current highlights
//! into text.

use std::{collections::BTreeMap, fmt};

use tactics_grid_core::{ActorSnapshot, HighlightSink, MapBounds, MapCoord, TileDescriptor};

/// Glyph drawn for open floor.
pub const FLOOR_GLYPH: char = '.';
/// Glyph drawn for obstacles.
pub const OBSTACLE_GLYPH: char = '#';
/// Glyph drawn for an actor.
pub const ACTOR_GLYPH: char = '@';
/// Glyph drawn for highlighted tiles whose cost has more than one digit.
pub const FAR_GLYPH: char = '+';
/// Glyph drawn where the map has no tile.
pub const GAP_GLYPH: char = ' ';

/// Highlight sink that remembers the lit tiles and their costs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightLayer {
    lit: BTreeMap<MapCoord, u32>,
}

impl HighlightLayer {
    /// Creates a layer with nothing highlighted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cost the tile is highlighted with, if any.
    #[must_use]
    pub fn cost(&self, cell: MapCoord) -> Option<u32> {
        self.lit.get(&cell).copied()
    }

    /// Number of highlighted tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lit.len()
    }

    /// Reports whether nothing is highlighted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lit.is_empty()
    }

    /// Highlighted tiles with their costs in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (MapCoord, u32)> + '_ {
        self.lit.iter().map(|(cell, cost)| (*cell, *cost))
    }
}

impl HighlightSink for HighlightLayer {
    fn highlight(&mut self, cell: MapCoord, cost: u32) {
        let _ = self.lit.insert(cell, cost);
    }

    fn reset(&mut self, cell: MapCoord) {
        let _ = self.lit.remove(&cell);
    }
}

/// Text rendering of a map, top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiFrame {
    rows: Vec<String>,
}

impl AsciiFrame {
    /// Draws every tile within `bounds`.
    ///
    /// Actors take precedence over highlights, which take precedence over
    /// the floor and obstacle glyphs. Hex maps separate cells with a space
    /// and indent odd rows by one column so the offset rows line up.
    #[must_use]
    pub fn compose<I>(
        bounds: MapBounds,
        tiles: I,
        actors: &[ActorSnapshot],
        highlights: &HighlightLayer,
        hex: bool,
    ) -> Self
    where
        I: IntoIterator<Item = TileDescriptor>,
    {
        let passability: BTreeMap<MapCoord, bool> = tiles
            .into_iter()
            .filter(|tile| bounds.contains(tile.coord))
            .map(|tile| (tile.coord, tile.passable))
            .collect();

        let glyph_at = |cell: MapCoord| -> char {
            let Some(&passable) = passability.get(&cell) else {
                return GAP_GLYPH;
            };
            if actors.iter().any(|actor| actor.cell == cell) {
                return ACTOR_GLYPH;
            }
            match highlights.cost(cell) {
                Some(cost) => char::from_digit(cost, 10).unwrap_or(FAR_GLYPH),
                None if passable => FLOOR_GLYPH,
                None => OBSTACLE_GLYPH,
            }
        };

        let (min, max) = (bounds.min(), bounds.max());
        let rows = (min.y()..=max.y())
            .rev()
            .map(|y| {
                let mut row = String::new();
                if hex && y.rem_euclid(2) == 1 {
                    row.push(' ');
                }
                for x in min.x()..=max.x() {
                    if hex && x != min.x() {
                        row.push(' ');
                    }
                    row.push(glyph_at(MapCoord::new(x, y)));
                }
                row.trim_end().to_owned()
            })
            .collect();

        Self { rows }
    }

    /// Rendered rows, top row first.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }
}

impl fmt::Display for AsciiFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
