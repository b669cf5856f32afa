//! Configuration schema for chemcache
//!
//! Configuration is stored at `~/.config/chemcache/config.toml`

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Remote lookup service settings
    pub remote: RemoteConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// Batch processing settings
    pub batch: BatchConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Remote lookup service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// PUG REST base URL
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum requests started per second
    pub max_per_second: u32,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pubchem.ncbi.nlm.nih.gov/rest/pug".to_string(),
            timeout_secs: 30,
            max_per_second: 5,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lookup results older than N days are treated as missing
    pub ttl_days: u32,

    /// Maximum number of cached compound records
    pub max_compounds: usize,
}

impl CacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.ttl_days))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_days: 7,
            max_compounds: 1000,
        }
    }
}

/// Batch processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Pause between consecutive batch items, on top of the rate limit
    pub inter_item_delay_ms: u64,

    /// Split batches into chunks of N identifiers (0 = no chunking)
    pub chunk_size: usize,
}

impl BatchConfig {
    pub fn inter_item_delay(&self) -> Duration {
        Duration::from_millis(self.inter_item_delay_ms)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            inter_item_delay_ms: 200,
            chunk_size: 0,
        }
    }
}
