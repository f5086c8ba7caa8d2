//! Movement Resolution
//!
//! Moves one creature, applies the environment effect, drops the dead, and
//! pushes aside whoever was standing on the destination.
//!
//! Every function here is pure over its inputs: callers get a new creature
//! list back and decide whether to commit it. Missing creatures or a missing
//! board make the call a no-op rather than an error.

use tracing::{debug, trace, warn};

use crate::core::coord::TilePos;
use crate::game::collision::{find_collision, find_displacement_target, Push};
use crate::game::environment::EnvironmentEffect;
use crate::game::events::DisplacementEvent;
use crate::game::state::{Board, Creature, CreatureId, EggIndex, StateView};

/// Result of [`move_animal`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Creature list after the move
    pub creatures: Vec<Creature>,
    /// Set when an occupant was pushed aside
    pub displacement: Option<DisplacementEvent>,
}

impl MoveOutcome {
    fn unchanged(creatures: &[Creature]) -> Self {
        Self {
            creatures: creatures.to_vec(),
            displacement: None,
        }
    }
}

/// Result of [`resolve_displacement`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Displacement {
    /// Creature list with the occupant relocated (or untouched)
    pub creatures: Vec<Creature>,
    /// None when no legal tile was found
    pub event: Option<DisplacementEvent>,
}

/// Move a creature to `target`.
///
/// Steps, in order: update position/facing/flags, apply `effect` to the
/// mover, remove every creature with vitality <= 0, then displace any solid
/// occupant of `target`. A mover killed by the effect never displaces anyone.
///
/// No-op (input list returned) when the creature or board is missing, or the
/// target is off the board.
pub fn move_animal<S, E>(
    creature_id: CreatureId,
    target: TilePos,
    state: &S,
    effect: &E,
) -> MoveOutcome
where
    S: StateView + ?Sized,
    E: EnvironmentEffect + ?Sized,
{
    let creatures = state.creatures();

    let Some(board) = state.board() else {
        debug!("Move of {} ignored: no board", creature_id);
        return MoveOutcome::unchanged(creatures);
    };

    let Some(mover) = creatures.iter().find(|c| c.id == creature_id) else {
        debug!("Move of {} ignored: creature not found", creature_id);
        return MoveOutcome::unchanged(creatures);
    };

    if !board.contains(target) {
        warn!("Move of {} ignored: target {} is off the board", creature_id, target);
        return MoveOutcome::unchanged(creatures);
    }

    let origin = mover.position;
    let mut moved = mover.clone();
    moved.facing = mover.facing.after_step(origin.x, target.x);
    moved.previous_position = origin;
    moved.position = target;
    moved.has_moved = true;

    let moved = effect.apply(moved, board);
    trace!("{} moved {} -> {} (vitality {})", creature_id, origin, target, moved.vitality);

    let updated: Vec<Creature> = creatures
        .iter()
        .map(|c| if c.id == creature_id { moved.clone() } else { c.clone() })
        .filter(|c| c.is_alive())
        .collect();

    if !moved.is_alive() {
        debug!("{} died on {}", creature_id, target);
        return MoveOutcome {
            creatures: updated,
            displacement: None,
        };
    }

    let occupant = find_collision(&updated, state.eggs(), creature_id, target).cloned();
    match occupant {
        Some(occupant) => {
            let push = Push { from: origin, to: target };
            let Displacement { creatures, event } =
                resolve_displacement(push, &occupant, updated, board, state.eggs());
            MoveOutcome {
                creatures,
                displacement: event,
            }
        }
        None => MoveOutcome {
            creatures: updated,
            displacement: None,
        },
    }
}

/// Relocate `occupant` off the contested tile `push.to`.
///
/// Picks the first legal tile from
/// [`displacement_candidates`](crate::game::collision::displacement_candidates).
/// When none is legal the occupant stays put and no event is produced.
pub fn resolve_displacement(
    push: Push,
    occupant: &Creature,
    creatures: Vec<Creature>,
    board: &Board,
    eggs: &EggIndex,
) -> Displacement {
    let Some(landing) = find_displacement_target(push, occupant.id, &creatures, eggs, board) else {
        warn!("No free tile to displace {} from {}", occupant.id, push.to);
        return Displacement { creatures, event: None };
    };

    let from = occupant.position;
    let creatures = creatures
        .into_iter()
        .map(|mut c| {
            if c.id == occupant.id {
                c.facing = c.facing.after_step(from.x, landing.x);
                c.previous_position = from;
                c.position = landing;
            }
            c
        })
        .collect();

    debug!("Displaced {} {} -> {}", occupant.id, from, landing);

    Displacement {
        creatures,
        event: Some(DisplacementEvent {
            creature: occupant.id,
            from,
            to: landing,
        }),
    }
}

/// Clear every creature's has-moved flag for a new turn.
pub fn reset_movement_flags(creatures: &[Creature]) -> Vec<Creature> {
    creatures
        .iter()
        .map(|c| Creature {
            has_moved: false,
            ..c.clone()
        })
        .collect()
}
