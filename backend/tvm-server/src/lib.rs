pub mod api;
pub mod app_state;
pub mod error;
pub mod health;
pub mod logger;
pub mod request_gate;
pub mod routes;
pub mod startup;

#[cfg(test)]
mod tests;

pub use api::{
    error::ApiError,
    error::Result as ApiResult,
    extractors::{bearer_token::BearerToken, identity::Identity, request_id::RequestId},
    identity::{IdentityResponse, get_identity},
    scope::{ScopeResponse, get_scope},
};
pub use app_state::{AppState, Readiness};

pub use crate::routes::build_router;
