use tvm_auth::AuthError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VendingError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Vending misconfigured: {message} {location}")]
    ConfigError {
        message: String,
        location: ErrorLocation,
    },

    #[error("Session duration {duration_secs}s outside {min_secs}-{max_secs}s {location}")]
    InvalidDuration {
        duration_secs: i32,
        min_secs: i32,
        max_secs: i32,
        location: ErrorLocation,
    },

    #[error("AssumeRole failed for tenant {tenant_id}: {message} {location}")]
    AssumeRoleFailed {
        tenant_id: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Scoped credentials unavailable: {message} {location}")]
    CredentialUnavailable {
        message: String,
        location: ErrorLocation,
    },

    #[error("Credential exchange throttled {location}")]
    Throttled { location: ErrorLocation },

    #[error("Requested tenant does not match the token's tenant {location}")]
    TenantMismatch { location: ErrorLocation },
}

impl VendingError {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.error_code(),
            Self::ConfigError { .. } => "VENDING_MISCONFIGURED",
            Self::InvalidDuration { .. } => "INVALID_DURATION",
            Self::AssumeRoleFailed { .. } => "ASSUME_ROLE_FAILED",
            Self::CredentialUnavailable { .. } => "CREDENTIAL_UNAVAILABLE",
            Self::Throttled { .. } => "THROTTLED",
            Self::TenantMismatch { .. } => "TENANT_MISMATCH",
        }
    }

    #[track_caller]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn credential_unavailable(message: impl Into<String>) -> Self {
        Self::CredentialUnavailable {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, VendingError>;
