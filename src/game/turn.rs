//! Turn Orchestration
//!
//! Applies one player action to the caller-owned state. The pure resolvers
//! run first against a snapshot; only their finished output is committed.
//!
//! Order within an action:
//! 1. validate (acting player, creature state)
//! 2. resolve move or hatch
//! 3. commit creatures / eggs / board / biomes
//! 4. biome capture
//! 5. visibility recompute for every player

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::core::coord::TilePos;
use crate::core::hash::StateHash;
use crate::game::environment::EnvironmentEffect;
use crate::game::events::GameEvent;
use crate::game::hatch::{merge_hatch, HatchMerge, Hatcher};
use crate::game::movement::{move_animal, reset_movement_flags, MoveOutcome};
use crate::game::state::{CreatureId, GameState, StateView};
use crate::game::visibility::{VisibilityEngine, VisibilityUpdate};

/// A player action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnAction {
    /// Move a creature
    Move {
        /// Creature to move
        creature: CreatureId,
        /// Destination tile
        target: TilePos,
    },
    /// Hatch one of the active player's eggs
    Hatch {
        /// Egg to hatch
        egg: CreatureId,
    },
    /// Hand over to the next player
    EndTurn,
}

/// Result of an action.
#[derive(Debug, Default)]
pub struct TurnResult {
    /// False when the action was declined and nothing changed
    pub accepted: bool,
    /// Events generated by the action
    pub events: Vec<GameEvent>,
}

impl TurnResult {
    fn declined() -> Self {
        Self::default()
    }
}

/// Apply an action for the active player.
///
/// Declined actions (wrong owner, already acted, egg, unknown id, off-board
/// target) leave the state untouched.
pub fn apply_action<E, H>(
    state: &mut GameState,
    action: TurnAction,
    effect: &E,
    hatcher: &H,
) -> TurnResult
where
    E: EnvironmentEffect + ?Sized,
    H: Hatcher + ?Sized,
{
    match action {
        TurnAction::Move { creature, target } => apply_move(state, creature, target, effect),
        TurnAction::Hatch { egg } => apply_hatch(state, egg, hatcher),
        TurnAction::EndTurn => end_turn(state),
    }
}

fn can_move(state: &GameState, id: CreatureId, target: TilePos) -> bool {
    let on_board = state.board.as_ref().is_some_and(|board| board.contains(target));
    let ready = state.creature(id).is_some_and(|c| {
        c.owner == state.active_player && c.is_active() && !c.has_moved
    });
    on_board && ready && !state.is_egg(id)
}

fn apply_move<E>(state: &mut GameState, id: CreatureId, target: TilePos, effect: &E) -> TurnResult
where
    E: EnvironmentEffect + ?Sized,
{
    if !can_move(state, id, target) {
        debug!("Declined move of {} to {} for {}", id, target, state.active_player);
        return TurnResult::declined();
    }

    let MoveOutcome { creatures, displacement } = move_animal(id, target, &*state, effect);
    state.creatures = creatures;
    prune_eggs(state);

    let mut result = TurnResult {
        accepted: true,
        events: Vec::new(),
    };
    let mut touched = vec![id];
    if let Some(event) = displacement {
        touched.push(event.creature);
        result.events.push(GameEvent::displaced(state.turn, event));
    }

    capture_biomes(state, &touched, &mut result.events);
    refresh_visibility(state);
    result
}

fn apply_hatch<H>(state: &mut GameState, egg: CreatureId, hatcher: &H) -> TurnResult
where
    H: Hatcher + ?Sized,
{
    let owned = state.is_egg(egg)
        && state.creature(egg).is_some_and(|c| c.owner == state.active_player);
    if !owned {
        debug!("Declined hatch of {} for {}", egg, state.active_player);
        return TurnResult::declined();
    }

    let Some(hatch) = hatcher.hatch(egg, &*state) else {
        debug!("Hatcher declined {}", egg);
        return TurnResult::declined();
    };

    let HatchMerge {
        creatures,
        eggs,
        board,
        biomes,
        hatched,
        affected_biome,
        displacement,
    } = merge_hatch(hatch, &*state);

    state.creatures = creatures;
    state.eggs = eggs;
    if let Some(board) = board {
        state.board = Some(board);
    }
    if let Some(biomes) = biomes {
        state.biomes = biomes;
    }
    prune_eggs(state);

    let mut result = TurnResult {
        accepted: true,
        events: vec![GameEvent::hatched(state.turn, egg, hatched, affected_biome)],
    };
    let mut touched: Vec<CreatureId> = hatched.into_iter().collect();
    if let Some(event) = displacement {
        touched.push(event.creature);
        result.events.push(GameEvent::displaced(state.turn, event));
    }

    capture_biomes(state, &touched, &mut result.events);
    refresh_visibility(state);
    result
}

/// Drop egg entries whose creature is gone or already active.
fn prune_eggs(state: &mut GameState) {
    let creatures = &state.creatures;
    state.eggs.retain(|id, _| creatures.iter().any(|c| c.id == *id && !c.is_active()));
}

/// Hand biomes to the owners of active creatures now standing on their habitat.
fn capture_biomes(state: &mut GameState, touched: &[CreatureId], events: &mut Vec<GameEvent>) {
    for &id in touched {
        let Some((owner, pos)) = state
            .creature(id)
            .filter(|c| c.is_active() && !state.is_egg(c.id))
            .map(|c| (c.owner, c.position))
        else {
            continue;
        };

        let habitat_of = state
            .board
            .as_ref()
            .and_then(|board| board.tile(pos))
            .filter(|tile| tile.is_habitat)
            .and_then(|tile| tile.biome);
        let Some(biome) = habitat_of.and_then(|b| state.biomes.get_mut(&b)) else {
            continue;
        };
        if biome.owner == Some(owner) {
            continue;
        }

        let previous = biome.owner.replace(owner);
        info!("{} captured {} from {:?}", owner, biome.id, previous);
        events.push(GameEvent::biome_captured(state.turn, biome.id, owner, previous));
    }
}

/// Recompute and store every player's visible set.
pub fn refresh_visibility(state: &mut GameState) {
    let updates: Vec<VisibilityUpdate> = {
        let engine = VisibilityEngine::new(&*state);
        state
            .players
            .iter()
            .filter_map(|p| engine.update_player_visibility(p.id))
            .collect()
    };
    for update in updates {
        update.commit(state);
    }
}

/// Finish the active player's turn.
///
/// Clears movement flags, hands over to the next player in order (the turn
/// counter advances when play wraps to the first player), and recomputes
/// visibility.
pub fn end_turn(state: &mut GameState) -> TurnResult {
    let Some(index) = state.players.iter().position(|p| p.id == state.active_player) else {
        debug!("End turn ignored: active player {} not found", state.active_player);
        return TurnResult::declined();
    };

    let ended_turn = state.turn;
    let player = state.active_player;
    let next_index = (index + 1) % state.players.len();
    let next_player = state.players[next_index].id;

    state.creatures = reset_movement_flags(&state.creatures);
    state.active_player = next_player;
    if next_index == 0 {
        state.turn += 1;
    }
    refresh_visibility(state);

    debug!("Turn {}: {} -> {}", ended_turn, player, next_player);
    TurnResult {
        accepted: true,
        events: vec![GameEvent::turn_ended(ended_turn, player, next_player)],
    }
}

/// Replay a sequence of actions from a starting state.
///
/// Returns the final state hash and every event produced.
pub fn replay_actions<E, H>(
    initial: &GameState,
    actions: &[TurnAction],
    effect: &E,
    hatcher: &H,
) -> (StateHash, Vec<GameEvent>)
where
    E: EnvironmentEffect + ?Sized,
    H: Hatcher + ?Sized,
{
    let mut state = initial.clone();
    let mut events = Vec::new();
    for action in actions {
        events.extend(apply_action(&mut state, *action, effect, hatcher).events);
    }
    (state.compute_hash(), events)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coord::coord_key;
    use crate::core::rng::DeterministicRng;
    use crate::game::collision::find_overlaps;
    use crate::game::environment::NoEffect;
    use crate::game::events::GameEventData;
    use crate::game::hatch::HatchInPlace;
    use crate::game::mapgen::build_map;
    use crate::game::partition::Node;
    use crate::game::state::{BiomeId, Creature, Player, PlayerId};

    const P0: PlayerId = PlayerId(0);
    const P1: PlayerId = PlayerId(1);

    /// 6x6 board, biome 0 at (1,1) owned by P0, biome 1 at (4,4) owned by P1.
    fn fixture() -> GameState {
        let nodes = vec![
            Node::new(BiomeId(0), TilePos::new(1, 1)),
            Node::new(BiomeId(1), TilePos::new(4, 4)),
        ];
        let map = build_map(6, 6, nodes, &mut DeterministicRng::new(7)).unwrap();
        let players = vec![Player::new(P0, 0), Player::new(P1, 1)];
        let mut state = GameState::new(map.board, map.biomes, players);
        if let Some(b) = state.biomes.get_mut(&BiomeId(0)) {
            b.owner = Some(P0);
        }
        if let Some(b) = state.biomes.get_mut(&BiomeId(1)) {
            b.owner = Some(P1);
        }
        state.add_creature(Creature::new(CreatureId(0), "newt", P0, TilePos::new(3, 4), 3));
        state.add_creature(Creature::new(CreatureId(1), "newt", P1, TilePos::new(5, 5), 3));
        refresh_visibility(&mut state);
        state
    }

    fn move_to(creature: u32, x: i32, y: i32) -> TurnAction {
        TurnAction::Move { creature: CreatureId(creature), target: TilePos::new(x, y) }
    }

    fn step(state: &mut GameState, action: TurnAction) -> TurnResult {
        apply_action(state, action, &NoEffect, &HatchInPlace)
    }

    #[test]
    fn test_move_onto_habitat_captures() {
        let mut state = fixture();
        let result = step(&mut state, move_to(0, 4, 4));

        assert!(result.accepted);
        assert_eq!(
            result.events,
            vec![GameEvent::biome_captured(1, BiomeId(1), P0, Some(P1))]
        );
        assert_eq!(state.biomes[&BiomeId(1)].owner, Some(P0));

        // New owner sees the whole biome, old owner keeps only its creature's view
        let p0 = &state.player(P0).unwrap().visible;
        for pos in state.board.as_ref().unwrap().biome_tiles(BiomeId(1)) {
            assert!(p0.contains(&coord_key(pos)));
        }
        let p1 = &state.player(P1).unwrap().visible;
        assert_eq!(p1.len(), 4);
    }

    #[test]
    fn test_declined_actions_change_nothing() {
        let mut state = fixture();
        let before = state.clone();

        // Not the active player's creature
        let result = step(&mut state, move_to(1, 5, 4));
        assert!(!result.accepted);
        // Off the board
        let result = step(&mut state, move_to(0, 6, 4));
        assert!(!result.accepted);
        // Unknown egg
        let result = step(&mut state, TurnAction::Hatch { egg: CreatureId(9) });
        assert!(!result.accepted);

        assert_eq!(state, before);
    }

    #[test]
    fn test_creature_acts_once_per_turn() {
        let mut state = fixture();
        assert!(step(&mut state, move_to(0, 3, 3)).accepted);
        assert!(!step(&mut state, move_to(0, 3, 2)).accepted);
    }

    #[test]
    fn test_move_displaces_and_reports() {
        let mut state = fixture();
        state.add_creature(Creature::new(CreatureId(2), "newt", P1, TilePos::new(2, 4), 3));

        let result = step(&mut state, move_to(0, 2, 4));
        let event = result.events[0].displacement().copied().unwrap();
        assert_eq!(event.creature, CreatureId(2));
        // Pushed west, continuing the mover's step
        assert_eq!(event.to, TilePos::new(1, 4));
        assert!(find_overlaps(&state.creatures, &state.eggs).is_empty());
    }

    #[test]
    fn test_hatch_action() {
        let mut state = fixture();
        state.lay_egg(Creature::egg(CreatureId(3), "newt", P0, TilePos::new(0, 0), 3));

        let result = step(&mut state, TurnAction::Hatch { egg: CreatureId(3) });
        assert!(result.accepted);
        assert!(matches!(
            result.events[0].data,
            GameEventData::Hatched {
                egg: CreatureId(3),
                creature: Some(CreatureId(3)),
                biome: Some(BiomeId(0)),
            }
        ));
        assert!(!state.is_egg(CreatureId(3)));
        assert!(state.creature(CreatureId(3)).unwrap().is_active());
        // Newborn has already acted
        assert!(!step(&mut state, move_to(3, 0, 1)).accepted);
    }

    #[test]
    fn test_eggs_cannot_move() {
        let mut state = fixture();
        state.lay_egg(Creature::egg(CreatureId(3), "newt", P0, TilePos::new(0, 0), 3));
        assert!(!step(&mut state, move_to(3, 0, 1)).accepted);
    }

    #[test]
    fn test_end_turn_rotates_and_wraps() {
        let mut state = fixture();
        step(&mut state, move_to(0, 3, 3));

        let result = step(&mut state, TurnAction::EndTurn);
        assert_eq!(result.events, vec![GameEvent::turn_ended(1, P0, P1)]);
        assert_eq!(state.active_player, P1);
        assert_eq!(state.turn, 1);
        assert!(state.creatures.iter().all(|c| !c.has_moved));

        step(&mut state, TurnAction::EndTurn);
        assert_eq!(state.active_player, P0);
        assert_eq!(state.turn, 2);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let state = fixture();
        let actions = [
            move_to(0, 4, 4),
            TurnAction::EndTurn,
            move_to(1, 5, 4),
            TurnAction::EndTurn,
        ];
        let (hash_a, events_a) = replay_actions(&state, &actions, &NoEffect, &HatchInPlace);
        let (hash_b, events_b) = replay_actions(&state, &actions, &NoEffect, &HatchInPlace);
        assert_eq!(hash_a, hash_b);
        assert_eq!(events_a, events_b);
        assert_ne!(hash_a, state.compute_hash());
    }
}
