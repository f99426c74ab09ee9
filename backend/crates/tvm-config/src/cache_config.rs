use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_CACHE_ENABLED, DEFAULT_REFRESH_BEFORE_EXPIRY_SECS,
};

use serde::Deserialize;

/// Per-tenant credential cache settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Cached credentials are refreshed this long before they expire
    pub refresh_before_expiry_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_CACHE_ENABLED,
            refresh_before_expiry_secs: DEFAULT_REFRESH_BEFORE_EXPIRY_SECS,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self, session_duration_secs: i32) -> ConfigErrorResult<()> {
        if self.refresh_before_expiry_secs >= session_duration_secs.max(0) as u64 {
            return Err(ConfigError::cache(format!(
                "cache.refresh_before_expiry_secs ({}) must be below vending.default_duration_secs ({})",
                self.refresh_before_expiry_secs, session_duration_secs
            )));
        }

        Ok(())
    }
}
