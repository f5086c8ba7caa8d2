//! Error types for set-up operations.
//!
//! The turn simulation itself never fails: missing entities and blocked
//! displacements are no-ops. Only configuration loading and map generation
//! can report errors.

use std::path::PathBuf;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Config text is not valid JSON for `SimConfig`.
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config values are out of range.
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Map generation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Partition ran with no nodes, every tile is unresolved.
    #[error("Partition has no nodes")]
    NoNodes,

    /// Sampler could not place the requested number of nodes.
    #[error("Node sampler placed {placed} of {requested} nodes after {attempts} attempts")]
    SamplerExhausted {
        /// Nodes requested
        requested: usize,
        /// Nodes placed before giving up
        placed: usize,
        /// Candidate draws spent
        attempts: u32,
    },

    /// Board dimensions are not positive.
    #[error("Invalid board size {width}x{height}")]
    InvalidBoard {
        /// Requested width
        width: i32,
        /// Requested height
        height: i32,
    },
}
