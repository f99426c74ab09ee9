mod auth_config;
mod cache_config;
mod config;
mod error;
mod log_level;
mod logging_config;
mod server_config;
mod vending_config;

#[cfg(test)]
mod tests;

pub use auth_config::{AuthConfig, VerificationMode};
pub use cache_config::CacheConfig;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use server_config::ServerConfig;
pub use vending_config::VendingConfig;

const DEFAULT_CONFIG_DIR: &str = ".tvm";
const CONFIG_DIR_ENV: &str = "TVM_CONFIG_DIR";
/// Role variable set by existing deployment templates
const LEGACY_ROLE_ARN_ENV: &str = "IAM_ROLE_ARN";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const MIN_PORT: u16 = 1024;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_IN_FLIGHT_REQUESTS: usize = 1024;
const MIN_MAX_IN_FLIGHT_REQUESTS: usize = 1;
const MAX_MAX_IN_FLIGHT_REQUESTS: usize = 100_000;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const DEFAULT_JWKS_REFRESH_SECS: u64 = 3600;
const MIN_JWKS_REFRESH_SECS: u64 = 60;

/// Session-token service lower bound for a session duration
pub const MIN_SESSION_DURATION_SECS: i32 = 900;
/// Session-token service upper bound for a session duration
pub const MAX_SESSION_DURATION_SECS: i32 = 43_200;
pub const DEFAULT_SESSION_DURATION_SECS: i32 = 3600;
const DEFAULT_EXCHANGE_TIMEOUT_SECS: u64 = 10;
const MIN_EXCHANGE_TIMEOUT_SECS: u64 = 1;
const MAX_EXCHANGE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_CONCURRENT_EXCHANGES: usize = 32;
const MIN_MAX_CONCURRENT_EXCHANGES: usize = 1;
const MAX_MAX_CONCURRENT_EXCHANGES: usize = 1024;
const DEFAULT_EXCHANGES_PER_SECOND: u32 = 50;

const DEFAULT_CACHE_ENABLED: bool = true;
const DEFAULT_REFRESH_BEFORE_EXPIRY_SECS: u64 = 300;

const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
