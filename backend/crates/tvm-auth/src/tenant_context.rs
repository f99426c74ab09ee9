use crate::claims::{EMAIL_CLAIM, TENANT_ID_CLAIM, USER_ROLE_CLAIM, USERNAME_CLAIM};
use crate::{AuthError, Claims, Result as AuthErrorResult};

use std::panic::Location;

use error_location::ErrorLocation;
use http::{HeaderMap, HeaderName, HeaderValue};

pub const TENANT_ID_HEADER: HeaderName = HeaderName::from_static("x-tenant-id");
pub const USER_ROLE_HEADER: HeaderName = HeaderName::from_static("x-user-role");
pub const USER_EMAIL_HEADER: HeaderName = HeaderName::from_static("x-user-email");
pub const USERNAME_HEADER: HeaderName = HeaderName::from_static("x-username");

/// Identity headers, in the order they are written
pub const IDENTITY_HEADERS: [HeaderName; 4] = [
    TENANT_ID_HEADER,
    USER_ROLE_HEADER,
    USER_EMAIL_HEADER,
    USERNAME_HEADER,
];

/// Resolved identity of the current request.
///
/// Travels with the request (extensions and forwarded headers), never through
/// shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub claims: Claims,
}

impl TenantContext {
    pub fn from_claims(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn tenant_id(&self) -> &str {
        &self.claims.tenant_id
    }

    /// Write the identity headers, replacing any existing values.
    ///
    /// Fails without writing anything when a value cannot be carried as a
    /// header; values outside ASCII are written as raw UTF-8 bytes.
    #[track_caller]
    pub fn write_headers(&self, headers: &mut HeaderMap) -> AuthErrorResult<()> {
        let location = Location::caller();
        Self::strip_headers(headers);

        let values = [
            (TENANT_ID_CLAIM, &self.claims.tenant_id),
            (USER_ROLE_CLAIM, &self.claims.user_role),
            (EMAIL_CLAIM, &self.claims.email),
            (USERNAME_CLAIM, &self.claims.username),
        ]
        .into_iter()
        .map(|(claim, value)| {
            HeaderValue::from_bytes(value.as_bytes()).map_err(|_| AuthError::InvalidClaim {
                claim,
                message: "not valid header text".to_string(),
                location: ErrorLocation::from(location),
            })
        })
        .collect::<AuthErrorResult<Vec<_>>>()?;

        for (name, value) in IDENTITY_HEADERS.iter().zip(values) {
            headers.insert(name.clone(), value);
        }

        Ok(())
    }

    /// Remove identity headers (e.g. client-supplied copies)
    pub fn strip_headers(headers: &mut HeaderMap) {
        for name in IDENTITY_HEADERS.iter() {
            headers.remove(name);
        }
    }
}
