//! # Habitat Simulation Core
//!
//! Deterministic turn simulation for a territorial creature game played on an
//! isometric grid.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HABITAT SIMULATION                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── coord.rs     - Tile positions, keys, isometric mapping  │
//! │  ├── rng.rs       - Deterministic Xorshift128+ PRNG          │
//! │  └── hash.rs      - State hashing for verification           │
//! │                                                              │
//! │  game/            - Simulation (deterministic)               │
//! │  ├── state.rs     - Board, creatures, biomes, players        │
//! │  ├── partition.rs - Manhattan partition around seed nodes    │
//! │  ├── mapgen.rs    - Node sampling and game setup             │
//! │  ├── collision.rs - Occupancy and displacement targets       │
//! │  ├── movement.rs  - Move resolution                          │
//! │  ├── visibility.rs- Fog of war                               │
//! │  └── turn.rs      - Action orchestration                     │
//! │                                                              │
//! │  config.rs        - Simulation settings (JSON)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are deterministic:
//! - No floating-point arithmetic
//! - No HashMap (BTreeMap/BTreeSet for sorted iteration)
//! - All randomness from seeded Xorshift128+
//! - Functions read a state snapshot and return new values
//!
//! Given the same config and actions, the final state hash is identical on
//! every platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use crate::core::coord::{coord_key, CoordKey, IsoProjection, TilePos};
pub use crate::core::rng::DeterministicRng;
pub use crate::config::SimConfig;
pub use crate::error::{ConfigError, GenerationError};
pub use crate::game::state::{CreatureId, GameState, PlayerId, StateView};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum Manhattan distance between biome seed nodes.
pub const MIN_NODE_SPACING: u32 = 5;
