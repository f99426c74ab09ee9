use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_EXCHANGE_TIMEOUT_SECS, DEFAULT_EXCHANGES_PER_SECOND,
    DEFAULT_MAX_CONCURRENT_EXCHANGES, DEFAULT_SESSION_DURATION_SECS, MAX_EXCHANGE_TIMEOUT_SECS,
    MAX_MAX_CONCURRENT_EXCHANGES, MAX_SESSION_DURATION_SECS, MIN_EXCHANGE_TIMEOUT_SECS,
    MIN_MAX_CONCURRENT_EXCHANGES, MIN_SESSION_DURATION_SECS,
};

use serde::Deserialize;

/// Credential vending settings.
///
/// `role_arn` is the ABAC role tenant sessions are vended from. Its absence is
/// not a load/validate failure: the readiness probe reports it and every
/// vending call fails fast instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VendingConfig {
    /// When false, clients are built from the process's ambient identity
    pub enabled: bool,
    pub role_arn: Option<String>,
    pub region: Option<String>,
    /// Override for the session-token service endpoint
    pub sts_endpoint: Option<String>,
    /// Override for the data-store endpoint
    pub dynamodb_endpoint: Option<String>,
    pub default_duration_secs: i32,
    /// Upper bound on a single session-token exchange
    pub exchange_timeout_secs: u64,
    /// Exchanges allowed in flight at once, process-wide
    pub max_concurrent_exchanges: usize,
    /// Exchanges allowed per second, process-wide
    pub exchanges_per_second: u32,
    /// Also pass the leading-key session policy on each exchange, narrowing
    /// the role's permissions to the tenant's partition
    pub attach_session_policy: bool,
}

impl Default for VendingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            role_arn: None,
            region: None,
            sts_endpoint: None,
            dynamodb_endpoint: None,
            default_duration_secs: DEFAULT_SESSION_DURATION_SECS,
            exchange_timeout_secs: DEFAULT_EXCHANGE_TIMEOUT_SECS,
            max_concurrent_exchanges: DEFAULT_MAX_CONCURRENT_EXCHANGES,
            exchanges_per_second: DEFAULT_EXCHANGES_PER_SECOND,
            attach_session_policy: false,
        }
    }
}

impl VendingConfig {
    /// Role identifier, treating an empty value as absent
    pub fn role_arn(&self) -> Option<&str> {
        self.role_arn.as_deref().filter(|arn| !arn.trim().is_empty())
    }

    /// True when vending is on but cannot work (readiness must fail)
    pub fn is_misconfigured(&self) -> bool {
        self.enabled && self.role_arn().is_none()
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(MIN_SESSION_DURATION_SECS..=MAX_SESSION_DURATION_SECS)
            .contains(&self.default_duration_secs)
        {
            return Err(ConfigError::vending(format!(
                "vending.default_duration_secs must be {}-{}, got {}",
                MIN_SESSION_DURATION_SECS, MAX_SESSION_DURATION_SECS, self.default_duration_secs
            )));
        }

        if !(MIN_EXCHANGE_TIMEOUT_SECS..=MAX_EXCHANGE_TIMEOUT_SECS)
            .contains(&self.exchange_timeout_secs)
        {
            return Err(ConfigError::vending(format!(
                "vending.exchange_timeout_secs must be {}-{}, got {}",
                MIN_EXCHANGE_TIMEOUT_SECS, MAX_EXCHANGE_TIMEOUT_SECS, self.exchange_timeout_secs
            )));
        }

        if !(MIN_MAX_CONCURRENT_EXCHANGES..=MAX_MAX_CONCURRENT_EXCHANGES)
            .contains(&self.max_concurrent_exchanges)
        {
            return Err(ConfigError::vending(format!(
                "vending.max_concurrent_exchanges must be {}-{}, got {}",
                MIN_MAX_CONCURRENT_EXCHANGES,
                MAX_MAX_CONCURRENT_EXCHANGES,
                self.max_concurrent_exchanges
            )));
        }

        if self.exchanges_per_second == 0 {
            return Err(ConfigError::vending(
                "vending.exchanges_per_second must be at least 1",
            ));
        }

        Ok(())
    }
}
