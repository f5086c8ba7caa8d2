//! Core deterministic primitives.
//!
//! Grid geometry, seeded randomness and state hashing. Nothing in here
//! knows about creatures, biomes or players.

pub mod coord;
pub mod rng;
pub mod hash;

// Re-export core types
pub use coord::{TilePos, CoordKey, IsoProjection, TileSize, coord_key};
pub use rng::DeterministicRng;
pub use hash::{StateHash, StateHasher, compute_state_hash};
