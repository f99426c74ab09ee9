use crate::api::extractors::request_id::RequestId;
use crate::{ApiResult, AppState, BearerToken, Identity};

use axum::{Json, extract::State};
use log::info;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeResponse {
    pub tenant_id: String,
    /// "scoped" or "ambient"
    pub identity: &'static str,
    /// RFC 3339; absent for ambient clients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// GET /v1/scope - obtain a tenant-scoped data-store client and describe it
pub async fn get_scope(
    State(state): State<AppState>,
    identity: Identity,
    token: BearerToken,
    request_id: RequestId,
) -> ApiResult<Json<ScopeResponse>> {
    let scoped = state
        .client_factory
        .get_scoped_client(identity.tenant_id(), token.as_str())
        .await?;

    info!(
        "[{request_id}] {} client ready for tenant {}",
        scoped.identity.as_str(),
        scoped.tenant_id
    );

    Ok(Json(ScopeResponse {
        identity: scoped.identity.as_str(),
        expires_at: scoped.expiration.map(|at| at.to_rfc3339()),
        tenant_id: scoped.tenant_id,
    }))
}
