use error_location::ErrorLocation;
use thiserror::Error;

/// Authentication failures.
///
/// Messages never carry token, payload, or claim contents; only counts,
/// claim names, and error locations.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Malformed token: expected 3 segments, got {segments} {location}")]
    MalformedToken {
        segments: usize,
        location: ErrorLocation,
    },

    #[error("Token payload is not valid base64 {location}")]
    EncodingError { location: ErrorLocation },

    #[error("Token payload is not a flat JSON claim set {location}")]
    ClaimParseError { location: ErrorLocation },

    #[error("Token has no tenant claim {location}")]
    MissingTenant { location: ErrorLocation },

    #[error("Invalid claim '{claim}': {message} {location}")]
    InvalidClaim {
        claim: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("Token signature rejected: {reason} {location}")]
    InvalidSignature {
        reason: &'static str,
        location: ErrorLocation,
    },

    #[error("Token expired {location}")]
    TokenExpired { location: ErrorLocation },

    #[error("Token signed with an unknown key {location}")]
    UnknownSigningKey { location: ErrorLocation },

    #[error("Signing key material unusable: {message} {location}")]
    KeyMaterial {
        message: String,
        location: ErrorLocation,
    },

    #[error("Key set fetch failed: {message} {location}")]
    KeySetFetch {
        message: String,
        location: ErrorLocation,
    },

    #[error("Missing authorization header {location}")]
    MissingHeader { location: ErrorLocation },

    #[error("Invalid authorization scheme: expected 'Bearer' {location}")]
    InvalidScheme { location: ErrorLocation },
}

impl AuthError {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedToken { .. } => "MALFORMED_TOKEN",
            Self::EncodingError { .. } => "TOKEN_ENCODING",
            Self::ClaimParseError { .. } => "CLAIM_PARSE",
            Self::MissingTenant { .. } => "MISSING_TENANT",
            Self::InvalidClaim { .. } => "INVALID_CLAIM",
            Self::InvalidSignature { .. } => "INVALID_SIGNATURE",
            Self::TokenExpired { .. } => "TOKEN_EXPIRED",
            Self::UnknownSigningKey { .. } => "UNKNOWN_SIGNING_KEY",
            Self::KeyMaterial { .. } => "KEY_MATERIAL",
            Self::KeySetFetch { .. } => "KEY_SET_FETCH",
            Self::MissingHeader { .. } => "MISSING_AUTH_HEADER",
            Self::InvalidScheme { .. } => "INVALID_AUTH_SCHEME",
        }
    }

    /// True for failures caused by the presented token (401), false for
    /// failures of this process's own key material.
    pub fn is_credential_rejection(&self) -> bool {
        !matches!(self, Self::KeyMaterial { .. } | Self::KeySetFetch { .. })
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
