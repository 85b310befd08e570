//! Neighbour enumeration for the supported grid topologies.

use tactics_grid_core::MapCoord;

/// Largest neighbourhood produced by any supported topology.
pub const MAX_NEIGHBORS: usize = 6;

const ORTHOGONAL: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const HEX_EVEN_ROW: [(i32, i32); 6] = [(-1, 1), (0, 1), (1, 0), (0, -1), (-1, -1), (-1, 0)];
const HEX_ODD_ROW: [(i32, i32); 6] = [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, 0)];

/// Produces the coordinates considered adjacent to a tile.
///
/// Reachability and path reconstruction only ever see the grid through this
/// capability, so swapping the topology never touches the search code.
pub trait AdjacencyRule {
    /// Neighbours of `cell` in a fixed, deterministic enumeration order.
    fn neighbors(&self, cell: MapCoord) -> Neighbors;

    /// Reports whether `to` is a neighbour of `from`.
    fn is_adjacent(&self, from: MapCoord, to: MapCoord) -> bool {
        self.neighbors(from).any(|neighbor| neighbor == to)
    }
}

/// Grid topologies a map may select when it is loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Four-connected square grid enumerated up, right, down, left.
    #[default]
    Orthogonal,
    /// Six-connected hex grid stored as rows where odd rows shift right by half a tile.
    HexOddRow,
}

impl Topology {
    /// Parses the identifier used by map documents.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "orthogonal" | "square" => Some(Self::Orthogonal),
            "hex" | "hex-odd-row" => Some(Self::HexOddRow),
            _ => None,
        }
    }

    /// Identifier used by map documents and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Orthogonal => "orthogonal",
            Self::HexOddRow => "hex-odd-row",
        }
    }
}

impl AdjacencyRule for Topology {
    fn neighbors(&self, cell: MapCoord) -> Neighbors {
        match self {
            Self::Orthogonal => Neighbors::from_offsets(cell, &ORTHOGONAL),
            Self::HexOddRow if cell.y().rem_euclid(2) == 0 => {
                Neighbors::from_offsets(cell, &HEX_EVEN_ROW)
            }
            Self::HexOddRow => Neighbors::from_offsets(cell, &HEX_ODD_ROW),
        }
    }
}

/// Allocation-free iterator over a tile's neighbours.
#[derive(Clone, Debug)]
pub struct Neighbors {
    candidates: [Option<MapCoord>; MAX_NEIGHBORS],
    next: usize,
}

impl Neighbors {
    fn from_offsets(cell: MapCoord, offsets: &[(i32, i32)]) -> Self {
        let mut candidates = [None; MAX_NEIGHBORS];
        for (slot, (dx, dy)) in candidates.iter_mut().zip(offsets) {
            *slot = cell.offset(*dx, *dy);
        }

        Self {
            candidates,
            next: 0,
        }
    }
}

impl Iterator for Neighbors {
    type Item = MapCoord;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(candidate) = self.candidates.get(self.next).copied() {
            self.next += 1;
            if candidate.is_some() {
                return candidate;
            }
        }
        None
    }
}
