use crate::ApiError;

use std::fmt;
use std::future::Future;

use axum::{extract::FromRequestParts, http::request::Parts};

/// The bearer token the request gate accepted, for handlers that call the
/// client factory. Never logged.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            parts
                .extensions
                .get::<BearerToken>()
                .cloned()
                .ok_or_else(|| ApiError::unauthorized("NO_BEARER_TOKEN"))
        }
    }
}
