//! State Hashing for Verification
//!
//! Deterministic SHA-256 hashing of game state, used to check that two
//! runs fed the same seed and actions end in the same place.

use sha2::{Sha256, Digest};
use super::coord::TilePos;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for game state.
///
/// Wraps SHA-256 with helpers for grid types.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for game state.
    pub fn for_game_state() -> Self {
        Self::new(b"HABITAT_STATE_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a tile position.
    #[inline]
    pub fn update_pos(&mut self, pos: TilePos) {
        self.update_i32(pos.x);
        self.update_i32(pos.y);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with a length-prefixed string.
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.hasher.update(value.as_bytes());
    }

    /// Update with an optional u32 (tag byte then value).
    pub fn update_opt_u32(&mut self, value: Option<u32>) {
        match value {
            Some(v) => {
                self.update_u8(1);
                self.update_u32(v);
            }
            None => self.update_u8(0),
        }
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute state hash for turn verification.
///
/// Called by `GameState::compute_hash()`; the closure adds state-specific data.
pub fn compute_state_hash<F>(turn: u32, active_player: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_game_state();

    // Always hash turn and active player first
    hasher.update_u32(turn);
    hasher.update_u32(active_player);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_game_state();
            hasher.update_u32(100);
            hasher.update_u64(12345);
            hasher.update_pos(TilePos::new(3, 4));
            hasher.update_str("moss-toad");
            hasher.update_opt_u32(None);
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_pos(TilePos::new(1, 2));
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_pos(TilePos::new(2, 1));
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_compute_state_hash() {
        let hash = compute_state_hash(3, 1, |hasher| hasher.update_bool(true));
        let hash2 = compute_state_hash(3, 1, |hasher| hasher.update_bool(true));
        assert_eq!(hash, hash2);

        let hash3 = compute_state_hash(4, 1, |hasher| hasher.update_bool(true));
        assert_ne!(hash, hash3);
    }
}
