use crate::api::extractors::request_id::RequestId;
use crate::Identity;

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub tenant_id: String,
    pub user_role: String,
    pub email: String,
    pub username: String,
    pub request_id: String,
}

/// GET /v1/identity - the identity resolved from the caller's token
pub async fn get_identity(Identity(context): Identity, request_id: RequestId) -> Json<IdentityResponse> {
    let claims = context.claims;

    Json(IdentityResponse {
        tenant_id: claims.tenant_id,
        user_role: claims.user_role,
        email: claims.email,
        username: claims.username,
        request_id: request_id.to_string(),
    })
}
