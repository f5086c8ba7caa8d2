//! Simulation configuration.
//!
//! Plain serde struct with defaults; the binary can load overrides from JSON.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::error::ConfigError;
use crate::MIN_NODE_SPACING;

/// Configuration for map generation and play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Board width in tiles.
    pub board_width: i32,
    /// Board height in tiles.
    pub board_height: i32,
    /// Number of biome seed nodes to place.
    pub node_count: usize,
    /// Minimum Manhattan spacing between seed nodes.
    pub min_node_spacing: u32,
    /// Candidate draws the node sampler may spend.
    pub sampler_attempts: u32,
    /// Seed for the deterministic RNG.
    pub seed: u64,
    /// Start with fog of war enabled.
    pub fog_enabled: bool,
    /// Vitality given to freshly placed creatures.
    pub starting_vitality: i32,
    /// Number of players.
    pub players: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            board_width: 16,
            board_height: 16,
            node_count: 6,
            min_node_spacing: MIN_NODE_SPACING,
            sampler_attempts: 500,
            seed: 12345,
            fog_enabled: true,
            starting_vitality: 3,
            players: 2,
        }
    }
}

impl SimConfig {
    /// Parse from JSON text. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_width <= 0 || self.board_height <= 0 {
            return Err(ConfigError::Validation(format!(
                "board must have positive dimensions, got {}x{}",
                self.board_width, self.board_height
            )));
        }

        if self.node_count == 0 {
            return Err(ConfigError::Validation(
                "node_count must be at least 1".into(),
            ));
        }

        let tiles = self.board_width as usize * self.board_height as usize;
        if self.node_count > tiles {
            return Err(ConfigError::Validation(format!(
                "node_count {} exceeds tile count {}",
                self.node_count, tiles
            )));
        }

        if self.min_node_spacing == 0 {
            return Err(ConfigError::Validation(
                "min_node_spacing must be at least 1".into(),
            ));
        }

        if self.players == 0 {
            return Err(ConfigError::Validation(
                "at least one player is required".into(),
            ));
        }

        if self.starting_vitality <= 0 {
            return Err(ConfigError::Validation(
                "starting_vitality must be positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_node_spacing, 5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json_str(r#"{ "board_width": 8, "seed": 7 }"#).unwrap();
        assert_eq!(config.board_width, 8);
        assert_eq!(config.board_height, 16);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_rejects_empty_board() {
        let err = SimConfig::from_json_str(r#"{ "board_height": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_rejects_zero_nodes() {
        let config = SimConfig {
            node_count: 0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_spacing() {
        let err = SimConfig::from_json_str(r#"{ "min_node_spacing": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_rejects_bad_json() {
        let err = SimConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SimConfig::load_from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
