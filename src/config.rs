//! Caller-owned hashing configuration.

use serde::{Deserialize, Serialize};

use crate::error::{BCryptError, Result};
use crate::format::{self, FormatError, HASH_PAYLOAD_LEN};
use crate::primitive::SUPPORTED_VERSIONS;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;
pub const DEFAULT_COST: u32 = 10;

/// Version tag written into freshly generated salts.
pub const DEFAULT_VERSION: &str = "2a";

/// Upper bound of the calibration search.
pub const MAX_PROBE_COST: u32 = 40;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    pub default_cost: u32,
    pub version: String,
    /// Secret hashed by calibration probes.
    pub probe_secret: String,
    pub max_probe_cost: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        HashConfig {
            default_cost: DEFAULT_COST,
            version: DEFAULT_VERSION.to_string(),
            probe_secret: "testing testing".to_string(),
            max_probe_cost: MAX_PROBE_COST,
        }
    }
}

impl HashConfig {
    pub fn with_default_cost(mut self, cost: u32) -> Self {
        self.default_cost = cost;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_cost == 0 {
            return Err(BCryptError::InvalidCost(
                "default cost must be positive".to_string(),
            ));
        }
        if self.max_probe_cost == 0 {
            return Err(BCryptError::InvalidCost(
                "calibration bound must be positive".to_string(),
            ));
        }
        // The tag ends up in every stored hash, so it has to fit the hash grammar.
        let sample = format!("${}$10${}", self.version, ".".repeat(HASH_PAYLOAD_LEN));
        format::parse_hash(&sample).map_err(BCryptError::InvalidHash)?;
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(BCryptError::InvalidHash(FormatError::UnsupportedVersion));
        }
        Ok(())
    }
}
