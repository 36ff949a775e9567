//! File configuration.
//!
//! Pool geometry is fixed at compile time. What a deployment may tune is the
//! whitening hash, digest folding, the `Good` threshold, and how the demo
//! harvester drives its sources.

use crate::pool::{PoolConfig, POOL_BITS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// `good_threshold_bytes` is larger than the pool.
    #[error("good threshold {0} bytes exceeds pool capacity")]
    InvalidThreshold(u32),
    /// `chunk_bytes` is zero.
    #[error("harvest chunk size must be non-zero")]
    InvalidChunk,
    /// A source may not claim more than eight bits per byte.
    #[error("claim of {0} bits per byte is impossible (max 8)")]
    InvalidClaim(u32),
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

impl PoolConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if u64::from(self.good_threshold_bytes) * 8 > u64::from(POOL_BITS) {
            return Err(ConfigError::InvalidThreshold(self.good_threshold_bytes));
        }
        Ok(())
    }
}

/// Source harvesting configuration for the demo binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Number of concurrent mock sources.
    pub sources: u32,
    /// Samples taken from each source.
    pub rounds: u32,
    /// Bytes per sample.
    pub chunk_bytes: usize,
    /// Entropy each source claims per sampled byte.
    pub claim_bits_per_byte: u32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            sources: 4,
            rounds: 64,
            chunk_bytes: 16,
            claim_bits_per_byte: 1,
        }
    }
}

impl HarvestConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_bytes == 0 {
            return Err(ConfigError::InvalidChunk);
        }
        if self.claim_bits_per_byte > 8 {
            return Err(ConfigError::InvalidClaim(self.claim_bits_per_byte));
        }
        Ok(())
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Pool settings.
    #[serde(default)]
    pub pool: PoolConfig,
    /// Demo harvester settings.
    #[serde(default)]
    pub harvest: HarvestConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.pool.validate()?;
        config.harvest.validate()?;
        Ok(config)
    }
}
