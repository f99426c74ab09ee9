//! Resolved caller identity, as attached by the request gate

use crate::ApiError;

use tvm_auth::TenantContext;

use std::future::Future;

use axum::{extract::FromRequestParts, http::request::Parts};

/// The identity the request gate resolved for this request.
///
/// Rejects with 401 when the gate did not run for the route.
#[derive(Debug, Clone)]
pub struct Identity(pub TenantContext);

impl Identity {
    pub fn tenant_id(&self) -> &str {
        self.0.tenant_id()
    }
}

impl<S> FromRequestParts<S> for Identity
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
                .get::<Identity>()
                .cloned()
                .ok_or_else(|| ApiError::unauthorized("NO_IDENTITY"))
        }
    }
}
