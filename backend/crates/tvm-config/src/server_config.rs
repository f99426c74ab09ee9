use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_HOST, DEFAULT_MAX_IN_FLIGHT_REQUESTS, DEFAULT_PORT,
    DEFAULT_REQUEST_TIMEOUT_SECS, MAX_MAX_IN_FLIGHT_REQUESTS, MAX_REQUEST_TIMEOUT_SECS,
    MIN_MAX_IN_FLIGHT_REQUESTS, MIN_PORT, MIN_REQUEST_TIMEOUT_SECS,
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deadline for a whole request, including any credential exchange
    pub request_timeout_secs: u64,
    /// Maximum requests processed concurrently
    pub max_in_flight_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_in_flight_requests: DEFAULT_MAX_IN_FLIGHT_REQUESTS,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        // Port 0 lets the OS pick
        if self.port != 0 && self.port < MIN_PORT {
            return Err(ConfigError::server(format!(
                "server.port must be 0 (auto) or >= {}, got {}",
                MIN_PORT, self.port
            )));
        }

        if !(MIN_REQUEST_TIMEOUT_SECS..=MAX_REQUEST_TIMEOUT_SECS)
            .contains(&self.request_timeout_secs)
        {
            return Err(ConfigError::server(format!(
                "server.request_timeout_secs must be {}-{}, got {}",
                MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS, self.request_timeout_secs
            )));
        }

        if !(MIN_MAX_IN_FLIGHT_REQUESTS..=MAX_MAX_IN_FLIGHT_REQUESTS)
            .contains(&self.max_in_flight_requests)
        {
            return Err(ConfigError::server(format!(
                "server.max_in_flight_requests must be {}-{}, got {}",
                MIN_MAX_IN_FLIGHT_REQUESTS, MAX_MAX_IN_FLIGHT_REQUESTS, self.max_in_flight_requests
            )));
        }

        Ok(())
    }
}
