//! TOML map documents with an ASCII tile layout.

use anyhow::{Context, Result};
use serde::Deserialize;
use tactics_grid_core::{
    ActorId, BudgetError, Command, MapCoord, MapError, MovementBudget, TileDescriptor,
};
use tactics_grid_world::{MapLayout, Topology};

const FLOOR: char = '.';
const OBSTACLE: char = '#';
const GAPS: [char; 2] = [' ', '~'];

/// Map description as stored on disk.
///
/// ```toml
/// name = "crossroads"
/// topology = "orthogonal"
/// layout = """
/// ..#..
/// .....
/// """
///
/// [[actors]]
/// id = 1
/// x = 0
/// y = 0
/// budget = 3
/// ```
///
/// The first layout line is the top row. `.` is open floor, `#` an obstacle,
/// and a space or `~` leaves a gap with no tile at all.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapDocument {
    /// Identifier the map is resolved by.
    pub name: String,
    /// Adjacency rule name; defaults to `orthogonal`.
    #[serde(default = "default_topology")]
    pub topology: String,
    /// Rows of tile glyphs, top row first.
    pub layout: String,
    /// Actors placed when the map starts.
    #[serde(default)]
    pub actors: Vec<ActorEntry>,
}

/// Actor placement listed in a map document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActorEntry {
    /// Numeric actor identifier.
    pub id: u32,
    /// Starting column.
    pub x: i32,
    /// Starting row.
    pub y: i32,
    /// Raw movement budget; validated before it reaches the engine.
    pub budget: i64,
}

fn default_topology() -> String {
    Topology::Orthogonal.name().to_owned()
}

impl MapDocument {
    /// Parses a document from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse map document toml contents")
    }

    /// Converts the ASCII layout into tile descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidLayout`] for an unknown topology, an
    /// unexpected glyph, or a layout without any tile.
    pub fn to_layout(&self) -> Result<MapLayout, MapError> {
        let invalid = |reason: String| MapError::InvalidLayout {
            name: self.name.clone(),
            reason,
        };

        let topology = Topology::from_name(&self.topology)
            .ok_or_else(|| invalid(format!("unknown topology `{}`", self.topology)))?;

        let rows: Vec<&str> = self
            .layout
            .lines()
            .map(str::trim_end)
            .skip_while(|line| line.is_empty())
            .collect();
        let row_count = rows
            .iter()
            .rposition(|line| !line.is_empty())
            .map_or(0, |last| last + 1);
        let top = i32::try_from(row_count)
            .map_err(|_| invalid("layout has too many rows".to_owned()))?
            - 1;

        let mut tiles = Vec::new();
        for (row_offset, line) in (0_i32..).zip(&rows[..row_count]) {
            let y = top - row_offset;
            for (x, glyph) in (0_i32..).zip(line.chars()) {
                let coord = MapCoord::new(x, y);
                match glyph {
                    FLOOR => tiles.push(TileDescriptor::new(coord, true)),
                    OBSTACLE => tiles.push(TileDescriptor::new(coord, false)),
                    glyph if GAPS.contains(&glyph) => {}
                    glyph => return Err(invalid(format!("unexpected glyph `{glyph}` at {coord}"))),
                }
            }
        }

        if tiles.is_empty() {
            return Err(invalid("layout contains no tiles".to_owned()));
        }

        Ok(MapLayout::new(topology, tiles))
    }

    /// Builds the spawn commands for every listed actor.
    ///
    /// # Errors
    ///
    /// Returns the [`BudgetError`] of the first actor with an invalid budget.
    pub fn spawn_commands(&self) -> Result<Vec<Command>, BudgetError> {
        self.actors
            .iter()
            .map(|entry| -> Result<Command, BudgetError> {
                Ok(Command::SpawnActor {
                    actor: ActorId::new(entry.id),
                    cell: MapCoord::new(entry.x, entry.y),
                    budget: MovementBudget::try_from(entry.budget)?,
                })
            })
            .collect()
    }
}
