use crate::AppState;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /health - component status; 503 while degraded
pub async fn health(State(state): State<AppState>) -> Response {
    let readiness = &state.readiness;
    let blockers = readiness.blockers();

    let health = json!({
        "status": if blockers.is_empty() { "healthy" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "components": {
            "verification": readiness.verification,
            "vending": if !readiness.vending_enabled {
                "disabled"
            } else if readiness.role_configured {
                "configured"
            } else {
                "misconfigured"
            },
            "signing_keys": readiness.key_store.as_ref().map(|store| store.key_count()),
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    let status = if blockers.is_empty() {
        StatusCode::OK
    } else {
        log::warn!("Health check degraded: {}", blockers.join("; "));
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health)).into_response()
}

/// GET /live - liveness probe
pub async fn liveness() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// GET /ready - readiness probe; 503 while vending cannot work
pub async fn readiness(State(state): State<AppState>) -> Response {
    let blockers = state.readiness.blockers();
    if blockers.is_empty() {
        return (StatusCode::OK, "Ready").into_response();
    }

    log::warn!("Not ready: {}", blockers.join("; "));
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "status": "not_ready", "reasons": blockers })),
    )
        .into_response()
}
