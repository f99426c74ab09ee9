use crate::{AuthError, Result as AuthErrorResult};

use std::fmt;
use std::panic::Location;

use error_location::ErrorLocation;
use log::warn;
use serde::Serialize;
use serde_json::{Map, Value};

pub const TENANT_ID_CLAIM: &str = "custom:tenantId";
pub const USER_ROLE_CLAIM: &str = "custom:userRole";
pub const EMAIL_CLAIM: &str = "email";
pub const USERNAME_CLAIM: &str = "cognito:username";

pub const DEFAULT_USER_ROLE: &str = "TenantUser";
pub const DEFAULT_EMAIL: &str = "unknown@example.com";
pub const DEFAULT_USERNAME: &str = "unknown-user";

const MAX_TENANT_ID_LENGTH: usize = 128;

/// Identity asserted by a bearer token.
///
/// `tenant_id` is the isolation key and has no default; the other fields
/// degrade to fixed defaults when the token omits them.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub tenant_id: String,
    pub user_role: String,
    pub email: String,
    pub username: String,
}

impl Claims {
    /// Build claims from a decoded, flat claim set
    #[track_caller]
    pub fn from_claim_set(claim_set: &Map<String, Value>) -> AuthErrorResult<Self> {
        let tenant_id = match claim_set.get(TENANT_ID_CLAIM).and_then(Value::as_str) {
            Some(tenant_id) if !tenant_id.is_empty() => tenant_id.to_string(),
            _ => {
                warn!("Token rejected: missing or empty {TENANT_ID_CLAIM}");
                return Err(AuthError::MissingTenant {
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        if tenant_id.len() > MAX_TENANT_ID_LENGTH {
            return Err(AuthError::InvalidClaim {
                claim: TENANT_ID_CLAIM,
                message: format!("exceeds {MAX_TENANT_ID_LENGTH} characters"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        // Forwarded verbatim as X-Tenant-ID, so it must be plain header text
        if !tenant_id.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(AuthError::InvalidClaim {
                claim: TENANT_ID_CLAIM,
                message: "must be printable ASCII without spaces".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self {
            user_role: optional_claim(claim_set, USER_ROLE_CLAIM, DEFAULT_USER_ROLE),
            email: optional_claim(claim_set, EMAIL_CLAIM, DEFAULT_EMAIL),
            username: optional_claim(claim_set, USERNAME_CLAIM, DEFAULT_USERNAME),
            tenant_id,
        })
    }
}

fn optional_claim(claim_set: &Map<String, Value>, claim: &str, default: &str) -> String {
    match claim_set.get(claim).and_then(Value::as_str) {
        Some(value) => value.to_string(),
        None => {
            warn!("Token has no {claim} claim, using default");
            default.to_string()
        }
    }
}

// Email and username stay out of Debug output so claims can sit in log lines.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("tenant_id", &self.tenant_id)
            .field("user_role", &self.user_role)
            .field("email", &"[REDACTED]")
            .field("username", &"[REDACTED]")
            .finish()
    }
}
