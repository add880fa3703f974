use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Largest frame the transport may be configured to accept
///
/// FlatBuffers offsets are 32-bit and buffers are capped at `i32::MAX` bytes.
pub const MAX_FRAME_SIZE_LIMIT: usize = i32::MAX as usize;

/// Largest initial builder allocation
pub const MAX_BUILDER_CAPACITY: usize = i32::MAX as usize;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration; every section and field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DevlinkConfig {
    #[serde(default)]
    pub codec: CodecConfig,

    #[serde(default)]
    pub transport: TransportConfig,
}

/// Limits for decoding and the initial size of encode buffers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum table nesting accepted by the verifier
    pub max_depth: usize,

    /// Maximum number of tables in one verified buffer
    pub max_tables: usize,

    /// Upper bound on the bytes the verifier may visit in one buffer
    pub max_apparent_size: usize,

    /// Initial builder allocation in bytes
    pub builder_capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_tables: 1_000_000,
            max_apparent_size: 1 << 31,
            builder_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Frames declaring a larger length are rejected before allocation
    pub max_frame_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_frame_size: 64 * 1024,
        }
    }
}

impl DevlinkConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: DevlinkConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let nonzero = [
            ("codec.max_depth", self.codec.max_depth),
            ("codec.max_tables", self.codec.max_tables),
            ("codec.max_apparent_size", self.codec.max_apparent_size),
            ("codec.builder_capacity", self.codec.builder_capacity),
            ("transport.max_frame_size", self.transport.max_frame_size),
        ];
        for (name, value) in nonzero {
            if value == 0 {
                return Err(ConfigError::InvalidConfig(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }

        let bounded = [
            (
                "codec.builder_capacity",
                self.codec.builder_capacity,
                MAX_BUILDER_CAPACITY,
            ),
            (
                "transport.max_frame_size",
                self.transport.max_frame_size,
                MAX_FRAME_SIZE_LIMIT,
            ),
        ];
        for (name, value, limit) in bounded {
            if value > limit {
                return Err(ConfigError::InvalidConfig(format!(
                    "{} {} exceeds the {} byte limit",
                    name, value, limit
                )));
            }
        }

        Ok(())
    }
}
