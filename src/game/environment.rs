//! Environment Effects
//!
//! The hook the movement resolver calls on a creature after it lands.
//! Effects adjust vitality only; identity and position are left alone.

use crate::game::state::{Board, Creature, Terrain};

/// Terrain-driven vitality change, applied to one creature after it moves.
///
/// Must be total: no panics, and `id`/`position` come back unchanged.
pub trait EnvironmentEffect {
    /// Apply the effect to a freshly moved creature.
    fn apply(&self, creature: Creature, board: &Board) -> Creature;
}

impl<F> EnvironmentEffect for F
where
    F: Fn(Creature, &Board) -> Creature,
{
    fn apply(&self, creature: Creature, board: &Board) -> Creature {
        self(creature, board)
    }
}

/// Leaves creatures untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEffect;

impl EnvironmentEffect for NoEffect {
    fn apply(&self, creature: Creature, _board: &Board) -> Creature {
        creature
    }
}

/// Per-terrain vitality delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainHazard {
    deltas: [i32; Terrain::ALL.len()],
}

impl Default for TerrainHazard {
    /// Marsh and desert each cost one vitality.
    fn default() -> Self {
        Self::none()
            .with_delta(Terrain::Marsh, -1)
            .with_delta(Terrain::Desert, -1)
    }
}

impl TerrainHazard {
    /// All deltas zero.
    pub fn none() -> Self {
        Self {
            deltas: [0; Terrain::ALL.len()],
        }
    }

    /// Set the delta for one terrain.
    pub fn with_delta(mut self, terrain: Terrain, delta: i32) -> Self {
        self.deltas[terrain as usize] = delta;
        self
    }

    /// Delta for a terrain.
    pub fn delta(&self, terrain: Terrain) -> i32 {
        self.deltas[terrain as usize]
    }
}

impl EnvironmentEffect for TerrainHazard {
    fn apply(&self, mut creature: Creature, board: &Board) -> Creature {
        if let Some(terrain) = board.terrain_at(creature.position) {
            creature.vitality = creature.vitality.saturating_add(self.delta(terrain));
        }
        creature
    }
}
