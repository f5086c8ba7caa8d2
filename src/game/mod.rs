//! Game Logic Module
//!
//! All simulation code. Deterministic and free of rendering concerns.
//!
//! ## Module Structure
//!
//! - `state`: Board, creatures, biomes, players, the `StateView` read interface
//! - `partition`: Manhattan partition of the board around seed nodes
//! - `mapgen`: Node sampling, biome generation, game setup
//! - `collision`: Occupancy queries and displacement target selection
//! - `movement`: Move resolution with environment effects and displacement
//! - `environment`: Environment-effect hook and stock effects
//! - `hatch`: Hatching hook and result merge
//! - `visibility`: Fog-of-war computation and diffing
//! - `turn`: Action validation, capture, turn rotation
//! - `events`: Game events for presentation and replay

pub mod state;
pub mod partition;
pub mod mapgen;
pub mod collision;
pub mod movement;
pub mod environment;
pub mod hatch;
pub mod visibility;
pub mod turn;
pub mod events;

// Re-export key types
pub use state::{
    Biome, BiomeId, Board, Creature, CreatureId, EggIndex, Facing, GameState, Lifecycle,
    Player, PlayerId, StateView, Terrain, Tile, VisibleSet,
};
pub use partition::{generate_partition, is_node_overlapping, Node, PartitionMap};
pub use movement::{move_animal, reset_movement_flags, MoveOutcome};
pub use environment::{EnvironmentEffect, NoEffect, TerrainHazard};
pub use hatch::{merge_hatch, HatchInPlace, HatchResult, Hatcher};
pub use visibility::{
    diff_visibility, FogMask, FogRenderer, FogSubscription, VisibilityDelta, VisibilityEngine,
    VisibilityUpdate,
};
pub use turn::{apply_action, end_turn, TurnAction, TurnResult};
pub use events::{DisplacementEvent, GameEvent, GameEventData};
