use crate::api::{error::ApiError, identity, scope};
use crate::{AppState, health, request_gate};

use tvm_config::ServerConfig;

use std::panic::Location;
use std::time::Duration;

use axum::{BoxError, Router, error_handling::HandleErrorLayer, middleware, routing::get};
use error_location::ErrorLocation;
use tower::ServiceBuilder;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with all endpoints
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    // Orchestrator probes, outside the request gate
    let probes = Router::new()
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness));

    Router::new()
        // Exempt by suffix inside the gate
        .route("/health", get(health::health))
        // Identity-bound endpoints
        .route("/v1/identity", get(identity::get_identity))
        .route("/v1/scope", get(scope::get_scope))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_gate::request_gate,
        ))
        .merge(probes)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    server.request_timeout_secs,
                )))
                .layer(GlobalConcurrencyLimitLayer::new(
                    server.max_in_flight_requests,
                )),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn handle_middleware_error(error: BoxError) -> ApiError {
    let location = ErrorLocation::from(Location::caller());
    if error.is::<Elapsed>() {
        ApiError::RequestTimeout { location }
    } else {
        ApiError::Internal {
            detail: error.to_string(),
            location,
        }
    }
}
