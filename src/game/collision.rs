//! Collision Detection
//!
//! Tile occupancy queries and displacement target selection.
//! Eggs never collide: a dormant creature shares its tile with whoever
//! walks onto it.

use crate::core::coord::{dedup_positions, TilePos, DIAGONAL_OFFSETS, ORTHOGONAL_OFFSETS};
use crate::game::state::{Board, Creature, CreatureId, EggIndex};

/// A mover arriving on an occupied tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Push {
    /// Where the mover came from
    pub from: TilePos,
    /// The contested tile (mover's destination)
    pub to: TilePos,
}

impl Push {
    /// Push with no direction (e.g. a hatch on an occupied tile).
    pub fn in_place(at: TilePos) -> Self {
        Self { from: at, to: at }
    }

    /// Tile one step further along the mover's direction, if it moved.
    pub fn continuation(&self) -> Option<TilePos> {
        let dx = (self.to.x - self.from.x).signum();
        let dy = (self.to.y - self.from.y).signum();
        if dx == 0 && dy == 0 {
            None
        } else {
            Some(self.to.offset(dx, dy))
        }
    }
}

/// Does this creature take up its tile for collision purposes?
#[inline]
pub fn is_solid(creature: &Creature, eggs: &EggIndex) -> bool {
    !eggs.contains_key(&creature.id)
}

/// Solid creature at `pos`, ignoring `exclude`.
pub fn occupant_at<'a>(
    creatures: &'a [Creature],
    eggs: &EggIndex,
    pos: TilePos,
    exclude: CreatureId,
) -> Option<&'a Creature> {
    creatures
        .iter()
        .find(|c| c.id != exclude && c.position == pos && is_solid(c, eggs))
}

/// The creature a mover collides with on arriving at `target`.
pub fn find_collision<'a>(
    creatures: &'a [Creature],
    eggs: &EggIndex,
    mover: CreatureId,
    target: TilePos,
) -> Option<&'a Creature> {
    occupant_at(creatures, eggs, target, mover)
}

/// Candidate tiles for a displaced creature, in preference order.
///
/// The push continuation comes first, then the 8 neighbours of the contested
/// tile in fixed order: E, S, W, N, SE, SW, NW, NE. Off-board tiles are dropped.
pub fn displacement_candidates(push: Push, width: i32, height: i32) -> Vec<TilePos> {
    let ring = ORTHOGONAL_OFFSETS
        .iter()
        .chain(DIAGONAL_OFFSETS.iter())
        .map(|&(dx, dy)| push.to.offset(dx, dy));

    dedup_positions(push.continuation().into_iter().chain(ring))
        .into_iter()
        .filter(|pos| pos.in_bounds(width, height))
        .collect()
}

/// First legal landing tile for a displaced creature.
///
/// Legal means on the board, not the contested tile, not held by any other
/// solid creature, and not an egg site.
pub fn find_displacement_target(
    push: Push,
    displaced: CreatureId,
    creatures: &[Creature],
    eggs: &EggIndex,
    board: &Board,
) -> Option<TilePos> {
    displacement_candidates(push, board.width(), board.height())
        .into_iter()
        .filter(|pos| *pos != push.to)
        .find(|pos| {
            occupant_at(creatures, eggs, *pos, displaced).is_none()
                && !eggs.values().any(|egg| egg == pos)
        })
}

/// Every pair of solid creatures sharing a tile, in list order.
///
/// Empty after any resolution completes.
pub fn find_overlaps(creatures: &[Creature], eggs: &EggIndex) -> Vec<(CreatureId, CreatureId)> {
    let mut overlaps = Vec::new();
    for i in 0..creatures.len() {
        for j in (i + 1)..creatures.len() {
            let (a, b) = (&creatures[i], &creatures[j]);
            if a.position == b.position && is_solid(a, eggs) && is_solid(b, eggs) {
                overlaps.push((a.id, b.id));
            }
        }
    }
    overlaps
}
