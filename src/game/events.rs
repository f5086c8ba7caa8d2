//! Game Events
//!
//! Events produced by turn resolution, consumed by presentation and logs.
//! Death by environment is silent and has no event.

use serde::{Serialize, Deserialize};

use crate::core::coord::TilePos;
use crate::game::state::{BiomeId, CreatureId, PlayerId};

/// A creature pushed off a tile someone else moved onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplacementEvent {
    /// Displaced creature
    pub creature: CreatureId,
    /// Tile it was pushed off
    pub from: TilePos,
    /// Tile it landed on
    pub to: TilePos,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Creature was displaced
    Displaced(DisplacementEvent),

    /// Egg hatched
    Hatched {
        /// Egg that hatched
        egg: CreatureId,
        /// Newly active creature
        creature: Option<CreatureId>,
        /// Biome touched by the hatch
        biome: Option<BiomeId>,
    },

    /// Biome changed hands
    BiomeCaptured {
        /// Captured biome
        biome: BiomeId,
        /// New owner
        player: PlayerId,
        /// Owner before the capture
        previous_owner: Option<PlayerId>,
    },

    /// Active player handed over
    TurnEnded {
        /// Player whose turn ended
        player: PlayerId,
        /// Player now active
        next_player: PlayerId,
    },
}

/// A game event stamped with its turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Turn when the event occurred
    pub turn: u32,
    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(turn: u32, data: GameEventData) -> Self {
        Self { turn, data }
    }

    /// Create displaced event.
    pub fn displaced(turn: u32, event: DisplacementEvent) -> Self {
        Self::new(turn, GameEventData::Displaced(event))
    }

    /// Create hatched event.
    pub fn hatched(
        turn: u32,
        egg: CreatureId,
        creature: Option<CreatureId>,
        biome: Option<BiomeId>,
    ) -> Self {
        Self::new(turn, GameEventData::Hatched { egg, creature, biome })
    }

    /// Create biome captured event.
    pub fn biome_captured(
        turn: u32,
        biome: BiomeId,
        player: PlayerId,
        previous_owner: Option<PlayerId>,
    ) -> Self {
        Self::new(
            turn,
            GameEventData::BiomeCaptured {
                biome,
                player,
                previous_owner,
            },
        )
    }

    /// Create turn ended event.
    pub fn turn_ended(turn: u32, player: PlayerId, next_player: PlayerId) -> Self {
        Self::new(turn, GameEventData::TurnEnded { player, next_player })
    }

    /// Creature this event moved, if any.
    pub fn displacement(&self) -> Option<&DisplacementEvent> {
        match &self.data {
            GameEventData::Displaced(event) => Some(event),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = GameEvent::displaced(
            3,
            DisplacementEvent {
                creature: CreatureId(2),
                from: TilePos::new(1, 0),
                to: TilePos::new(2, 0),
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["turn"], 3);
        assert_eq!(json["data"]["Displaced"]["creature"], 2);
        assert_eq!(json["data"]["Displaced"]["to"]["x"], 2);

        let back: GameEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
        assert!(back.displacement().is_some());
    }
}
