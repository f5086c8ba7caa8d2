//! Spatial Partitioner
//!
//! Splits the board into biome territories: every tile belongs to the
//! nearest seed node by Manhattan distance.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::coord::TilePos;
use crate::error::GenerationError;
use crate::game::state::{BiomeId, Board};
use crate::MIN_NODE_SPACING;

/// A biome seed point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Biome this node seeds
    pub id: BiomeId,
    /// Seed position
    pub position: TilePos,
}

impl Node {
    /// Create a node.
    pub const fn new(id: BiomeId, position: TilePos) -> Self {
        Self { id, position }
    }
}

/// Tile-to-node assignment, row-major.
///
/// `None` only appears when the partition ran with no nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionMap {
    width: i32,
    height: i32,
    cells: Vec<Option<BiomeId>>,
}

impl PartitionMap {
    /// Map width.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Map height.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Node assigned to a tile.
    pub fn get(&self, pos: TilePos) -> Option<BiomeId> {
        if !pos.in_bounds(self.width, self.height) {
            return None;
        }
        let idx = (pos.y * self.width + pos.x) as usize;
        self.cells.get(idx).copied().flatten()
    }

    /// Does every tile have a node?
    pub fn is_resolved(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Every tile's node, row-major, or `NoNodes` if any tile is unresolved.
    pub fn resolve(&self) -> Result<Vec<BiomeId>, GenerationError> {
        self.cells
            .iter()
            .map(|cell| cell.ok_or(GenerationError::NoNodes))
            .collect()
    }

    /// Tiles assigned to a node, row-major.
    pub fn tiles_of(&self, id: BiomeId) -> Vec<TilePos> {
        self.positions()
            .filter(|pos| self.get(*pos) == Some(id))
            .collect()
    }

    /// Write the assignment into a board's tiles.
    ///
    /// Only the overlapping area is written; tiles outside the map keep
    /// their current biome.
    pub fn apply_to(&self, board: &mut Board) {
        for pos in self.positions() {
            if let Some(tile) = board.tile_mut(pos) {
                tile.biome = self.get(pos);
            }
        }
    }

    fn positions(&self) -> impl Iterator<Item = TilePos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| TilePos::new(x, y)))
    }
}

/// Assign every tile to its nearest node.
///
/// Distance is Manhattan. Ties go to the node that comes first in `nodes`.
/// With no nodes every tile stays unresolved.
pub fn generate_partition(width: i32, height: i32, nodes: &[Node]) -> PartitionMap {
    let width = width.max(0);
    let height = height.max(0);
    let mut cells = Vec::with_capacity(width as usize * height as usize);

    for y in 0..height {
        for x in 0..width {
            cells.push(nearest_node(TilePos::new(x, y), nodes));
        }
    }

    debug!("Partitioned {}x{} board across {} nodes", width, height, nodes.len());

    PartitionMap {
        width,
        height,
        cells,
    }
}

/// Nearest node to a tile; strict `<` keeps the earliest node on ties.
fn nearest_node(pos: TilePos, nodes: &[Node]) -> Option<BiomeId> {
    let mut best: Option<(u32, BiomeId)> = None;
    for node in nodes {
        let dist = pos.manhattan(node.position);
        match best {
            Some((best_dist, _)) if dist >= best_dist => {}
            _ => best = Some((dist, node.id)),
        }
    }
    best.map(|(_, id)| id)
}

/// Is the candidate closer than [`MIN_NODE_SPACING`] to any existing node?
pub fn is_node_overlapping(candidate: TilePos, existing: &[Node]) -> bool {
    is_within_spacing(candidate, existing, MIN_NODE_SPACING)
}

/// Is the candidate strictly closer than `spacing` to any existing node?
pub fn is_within_spacing(candidate: TilePos, existing: &[Node], spacing: u32) -> bool {
    existing
        .iter()
        .any(|node| candidate.manhattan(node.position) < spacing)
}
