//! Egg Hatching
//!
//! Species and placement rules for hatching live outside the simulation; this
//! module defines the hook and how its result is folded back into a turn.

use std::collections::BTreeMap;
use tracing::debug;

use crate::game::collision::{occupant_at, Push};
use crate::game::events::DisplacementEvent;
use crate::game::movement::{resolve_displacement, Displacement};
use crate::game::state::{
    Biome, BiomeId, Board, Creature, CreatureId, EggIndex, Lifecycle, StateView,
};

/// Everything a hatch may change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HatchResult {
    /// Full creature list after the hatch
    pub creatures: Vec<Creature>,
    /// Replacement board, if the hatch changed it
    pub board: Option<Board>,
    /// Replacement biomes, if the hatch changed them
    pub biomes: Option<BTreeMap<BiomeId, Biome>>,
    /// Full egg index after the hatch
    pub eggs: EggIndex,
    /// Newly active creature
    pub hatched: Option<CreatureId>,
    /// Biome touched by the hatch
    pub affected_biome: Option<BiomeId>,
}

/// Hatching policy.
pub trait Hatcher {
    /// Hatch `egg`, or None if it cannot hatch.
    fn hatch(&self, egg: CreatureId, state: &dyn StateView) -> Option<HatchResult>;
}

/// Hatches an egg where it lies, as the species it was laid with.
///
/// The newborn counts as having acted this turn.
#[derive(Clone, Copy, Debug, Default)]
pub struct HatchInPlace;

impl Hatcher for HatchInPlace {
    fn hatch(&self, egg: CreatureId, state: &dyn StateView) -> Option<HatchResult> {
        let site = *state.eggs().get(&egg)?;
        state.creature(egg)?;

        let creatures = state
            .creatures()
            .iter()
            .map(|c| {
                let mut c = c.clone();
                if c.id == egg {
                    c.lifecycle = Lifecycle::Active;
                    c.has_moved = true;
                }
                c
            })
            .collect();

        let mut eggs = state.eggs().clone();
        eggs.remove(&egg);

        let affected_biome = state
            .board()
            .and_then(|board| board.tile(site))
            .and_then(|tile| tile.biome);

        Some(HatchResult {
            creatures,
            board: None,
            biomes: None,
            eggs,
            hatched: Some(egg),
            affected_biome,
        })
    }
}

/// A hatch result ready to commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HatchMerge {
    /// Creature list to commit
    pub creatures: Vec<Creature>,
    /// Egg index to commit
    pub eggs: EggIndex,
    /// Board to commit, if replaced
    pub board: Option<Board>,
    /// Biomes to commit, if replaced
    pub biomes: Option<BTreeMap<BiomeId, Biome>>,
    /// Newly active creature
    pub hatched: Option<CreatureId>,
    /// Biome touched by the hatch
    pub affected_biome: Option<BiomeId>,
    /// Occupant pushed off the hatch site
    pub displacement: Option<DisplacementEvent>,
}

/// Fold a hatch result the same way a move result is folded.
///
/// If the newborn's tile already holds another solid creature, that
/// creature is displaced from the hatch site.
pub fn merge_hatch<S>(result: HatchResult, state: &S) -> HatchMerge
where
    S: StateView + ?Sized,
{
    let HatchResult {
        creatures,
        board,
        biomes,
        eggs,
        hatched,
        affected_biome,
    } = result;

    let site = hatched
        .and_then(|id| creatures.iter().find(|c| c.id == id).map(|c| (id, c.position)));
    let occupant = site.and_then(|(id, pos)| occupant_at(&creatures, &eggs, pos, id).cloned());
    let active_board = board.as_ref().or_else(|| state.board());

    let (creatures, displacement) = match (occupant, site, active_board) {
        (Some(occupant), Some((_, pos)), Some(active_board)) => {
            debug!("Hatch site {} occupied by {}", pos, occupant.id);
            let push = Push::in_place(pos);
            let Displacement { creatures, event } =
                resolve_displacement(push, &occupant, creatures, active_board, &eggs);
            (creatures, event)
        }
        _ => (creatures, None),
    };

    HatchMerge {
        creatures,
        eggs,
        board,
        biomes,
        hatched,
        affected_biome,
        displacement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coord::TilePos;
    use crate::game::collision::find_overlaps;
    use crate::game::state::{GameState, Player, PlayerId};

    fn state_with_egg() -> GameState {
        let mut board = Board::new(3, 3);
        if let Some(tile) = board.tile_mut(TilePos::new(1, 1)) {
            tile.biome = Some(BiomeId(2));
        }
        let mut state = GameState::new(board, BTreeMap::new(), vec![Player::new(PlayerId(0), 0)]);
        state.lay_egg(Creature::egg(CreatureId(5), "newt", PlayerId(0), TilePos::new(1, 1), 3));
        state
    }

    #[test]
    fn test_hatch_in_place() {
        let state = state_with_egg();
        let result = HatchInPlace.hatch(CreatureId(5), &state).unwrap();

        assert_eq!(result.hatched, Some(CreatureId(5)));
        assert_eq!(result.affected_biome, Some(BiomeId(2)));
        assert!(result.eggs.is_empty());
        let newborn = &result.creatures[0];
        assert!(newborn.is_active());
        assert!(newborn.has_moved);
    }

    #[test]
    fn test_hatch_unknown_egg() {
        let state = state_with_egg();
        assert!(HatchInPlace.hatch(CreatureId(9), &state).is_none());
    }

    #[test]
    fn test_merge_without_occupant() {
        let state = state_with_egg();
        let result = HatchInPlace.hatch(CreatureId(5), &state).unwrap();
        let merge = merge_hatch(result, &state);
        assert!(merge.displacement.is_none());
        assert_eq!(merge.creatures.len(), 1);
    }

    #[test]
    fn test_merge_displaces_occupant() {
        let mut state = state_with_egg();
        let occupant = Creature::new(CreatureId(6), "newt", PlayerId(0), TilePos::new(1, 1), 3);
        state.add_creature(occupant);

        let result = HatchInPlace.hatch(CreatureId(5), &state).unwrap();
        let merge = merge_hatch(result, &state);

        let event = merge.displacement.unwrap();
        assert_eq!(event.creature, CreatureId(6));
        assert_eq!(event.from, TilePos::new(1, 1));
        // First in scan order: east
        assert_eq!(event.to, TilePos::new(2, 1));
        assert!(find_overlaps(&merge.creatures, &merge.eggs).is_empty());
    }
}
