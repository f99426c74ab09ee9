//! Authentication gate in front of every non-health route

use crate::api::extractors::request_id::{REQUEST_ID_HEADER, RequestId};
use crate::{ApiError, AppState, BearerToken, Identity};

use tvm_auth::{AuthError, TenantContext};

use std::panic::Location;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use log::debug;

/// Paths ending in this suffix skip authentication
pub const HEALTH_SUFFIX: &str = "/health";

const BEARER_PREFIX: &str = "Bearer ";

/// Resolve the caller's identity or reject with 401.
///
/// Client-supplied identity headers are always discarded. On success the
/// headers are re-written from the token's claims and [`Identity`],
/// [`BearerToken`] and [`RequestId`] are attached to the request.
pub async fn request_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    request.extensions_mut().insert(request_id);
    TenantContext::strip_headers(request.headers_mut());

    if request.uri().path().ends_with(HEALTH_SUFFIX) {
        return with_request_id(next.run(request).await, request_id);
    }

    let token = match bearer_token(request.headers()) {
        Ok(token) => token,
        Err(e) => return with_request_id(ApiError::from(e).into_response(), request_id),
    };

    let claims = match state.extractor.extract(&token) {
        Ok(claims) => claims,
        Err(e) => return with_request_id(ApiError::from(e).into_response(), request_id),
    };

    debug!(
        "[{request_id}] {} {} tenant={}",
        request.method(),
        request.uri().path(),
        claims.tenant_id
    );

    let context = TenantContext::from_claims(claims);
    if let Err(e) = context.write_headers(request.headers_mut()) {
        return with_request_id(ApiError::from(e).into_response(), request_id);
    }
    request.extensions_mut().insert(Identity(context));
    request.extensions_mut().insert(BearerToken::new(token));

    with_request_id(next.run(request).await, request_id)
}

/// Token from `Authorization: Bearer <token>`
#[track_caller]
fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let location = Location::caller();
    let invalid_scheme = || AuthError::InvalidScheme {
        location: ErrorLocation::from(location),
    };

    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AuthError::MissingHeader {
            location: ErrorLocation::from(location),
        })?
        .to_str()
        .map_err(|_| invalid_scheme())?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(invalid_scheme)?;

    // Exactly "Bearer <token>": no extra separators or trailing whitespace
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(invalid_scheme());
    }

    Ok(token.to_string())
}

fn with_request_id(mut response: Response, request_id: RequestId) -> Response {
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
