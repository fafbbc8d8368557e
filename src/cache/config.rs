//! Book cache configuration.
//!
//! Controls request coalescing and age-based eviction via `shelfmark.toml`.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
const DEFAULT_MAX_AGE_SECS: u64 = 3600;

/// Book cache configuration from `shelfmark.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BookCacheConfig {
    /// Route lookups through the coalescing cache.
    pub enabled: bool,
    /// Period (seconds) between eviction sweeps.
    pub sweep_interval_seconds: u64,
    /// Age (seconds) after which a filled entry is evicted.
    pub max_age_seconds: u64,
}

impl Default for BookCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECS,
            max_age_seconds: DEFAULT_MAX_AGE_SECS,
        }
    }
}

impl From<&crate::config::BookCacheSettings> for BookCacheConfig {
    fn from(settings: &crate::config::BookCacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            sweep_interval_seconds: settings.sweep_interval.as_secs(),
            max_age_seconds: settings.max_age.as_secs(),
        }
    }
}

impl BookCacheConfig {
    /// Sweep period, clamped to at least one second.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }

    /// Eviction threshold for filled entries.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }
}
