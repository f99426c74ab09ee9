pub mod client_factory;
pub mod credential_cache;
pub mod credentials;
pub mod error;
pub mod exchange_rate_limiter;
pub mod metrics;
pub mod policy;
pub mod session_token_service;
pub mod sts_session_token_service;
pub mod token_vending_machine;

pub use client_factory::{ClientFactory, ClientIdentity, SCOPED_CLIENT_DURATION_SECS, ScopedClient};
pub use credential_cache::CredentialCache;
pub use credentials::Credentials;
pub use error::{Result, VendingError};
pub use exchange_rate_limiter::ExchangeRateLimiter;
pub use metrics::VendingMetrics;
pub use policy::CredentialPolicy;
pub use session_token_service::{AssumeRoleRequest, SESSION_TAG_KEY, SessionTag, SessionTokenService};
pub use sts_session_token_service::{StsSessionTokenService, load_sdk_config};
pub use token_vending_machine::{SESSION_NAME_PREFIX, TokenVendingMachine, validate_duration};

#[cfg(test)]
mod tests;
