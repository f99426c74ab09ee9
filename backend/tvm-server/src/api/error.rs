//! REST API error types
//!
//! Every error renders as `{"error": {"code", "message"}}`. Messages are
//! fixed per kind; causes are logged, never returned.

use tvm_auth::AuthError;
use tvm_vending::VendingError;

use std::panic::Location;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing credentials";
pub const FORBIDDEN_MESSAGE: &str = "Access to the requested tenant is not allowed";
pub const UNAVAILABLE_MESSAGE: &str = "Scoped credentials are temporarily unavailable";

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code (e.g. "UNAUTHORIZED")
    pub code: String,
    pub message: String,
}

/// API errors with associated HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or rejected bearer token (401)
    #[error("Unauthorized ({reason}) {location}")]
    Unauthorized {
        reason: &'static str,
        location: ErrorLocation,
    },

    /// Token is valid but not for the requested tenant (403)
    #[error("Forbidden ({reason}) {location}")]
    Forbidden {
        reason: &'static str,
        location: ErrorLocation,
    },

    /// Credential vending cannot serve the request right now (503)
    #[error("Service unavailable ({code}): {detail} {location}")]
    ServiceUnavailable {
        code: &'static str,
        detail: String,
        location: ErrorLocation,
    },

    /// Request exceeded its deadline (408)
    #[error("Request timed out {location}")]
    RequestTimeout { location: ErrorLocation },

    /// Internal server error (500)
    #[error("Internal error: {detail} {location}")]
    Internal {
        detail: String,
        location: ErrorLocation,
    },
}

impl ApiError {
    #[track_caller]
    pub fn unauthorized(reason: &'static str) -> Self {
        Self::Unauthorized {
            reason,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::RequestTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::Unauthorized { .. } => {
                log::warn!("{self}");
                ApiErrorBody {
                    code: "UNAUTHORIZED".into(),
                    message: UNAUTHORIZED_MESSAGE.into(),
                }
            }
            ApiError::Forbidden { .. } => {
                log::warn!("{self}");
                ApiErrorBody {
                    code: "FORBIDDEN".into(),
                    message: FORBIDDEN_MESSAGE.into(),
                }
            }
            ApiError::ServiceUnavailable { code, .. } => {
                log::error!("{self}");
                ApiErrorBody {
                    code: code.into(),
                    message: UNAVAILABLE_MESSAGE.into(),
                }
            }
            ApiError::RequestTimeout { .. } => {
                log::warn!("{self}");
                ApiErrorBody {
                    code: "REQUEST_TIMEOUT".into(),
                    message: "Request timed out".into(),
                }
            }
            ApiError::Internal { .. } => {
                log::error!("{self}");
                ApiErrorBody {
                    code: "INTERNAL_ERROR".into(),
                    message: "Internal server error".into(),
                }
            }
        };

        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Token rejections become a generic 401; failures of this process's own
/// key material are 503
impl From<AuthError> for ApiError {
    #[track_caller]
    fn from(e: AuthError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        if e.is_credential_rejection() {
            ApiError::Unauthorized {
                reason: e.error_code(),
                location,
            }
        } else {
            ApiError::ServiceUnavailable {
                code: e.error_code(),
                detail: e.to_string(),
                location,
            }
        }
    }
}

impl From<VendingError> for ApiError {
    #[track_caller]
    fn from(e: VendingError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        let code = e.error_code();

        match e {
            VendingError::Auth(auth) => {
                if auth.is_credential_rejection() {
                    ApiError::Unauthorized {
                        reason: code,
                        location,
                    }
                } else {
                    ApiError::ServiceUnavailable {
                        code,
                        detail: auth.to_string(),
                        location,
                    }
                }
            }
            VendingError::TenantMismatch { .. } => ApiError::Forbidden {
                reason: code,
                location,
            },
            VendingError::InvalidDuration { .. } => ApiError::Internal {
                detail: e.to_string(),
                location,
            },
            VendingError::ConfigError { .. }
            | VendingError::AssumeRoleFailed { .. }
            | VendingError::CredentialUnavailable { .. }
            | VendingError::Throttled { .. } => ApiError::ServiceUnavailable {
                code,
                detail: e.to_string(),
                location,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
