#![allow(dead_code)]

//! Test infrastructure for tvm-server router tests

use tvm_auth::{ClaimsExtractor, TokenVerifier};
use tvm_config::{ServerConfig, VendingConfig};
use tvm_server::{AppState, Readiness, build_router};
use tvm_vending::{
    AssumeRoleRequest, ClientFactory, CredentialCache, Credentials, SessionTokenService,
    TokenVendingMachine, VendingError,
};

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use axum::{Router, body::Body, http::Request, response::Response};
use error_location::ErrorLocation;
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};

pub const SECRET: &[u8] = b"server-test-secret-at-least-32-bytes";
pub const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/tenant-abac";

/// Session-token service returning canned credentials
#[derive(Default)]
pub struct FakeSts {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeSts {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionTokenService for FakeSts {
    async fn assume_role(&self, request: AssumeRoleRequest) -> tvm_vending::Result<Credentials> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(VendingError::AssumeRoleFailed {
                tenant_id: request.session_tag.value().to_string(),
                message: "AccessDenied: not authorized to perform sts:TagSession".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Credentials {
            access_key_id: "ASIATESTKEY00000001".to_string(),
            secret_access_key: "test-secret-access-key".to_string(),
            session_token: "test-session-token".to_string(),
            expiration: Some(chrono::Utc::now() + chrono::Duration::hours(1)),
        })
    }
}

pub fn extractor() -> ClaimsExtractor {
    ClaimsExtractor::verified(TokenVerifier::with_hs256(SECRET))
}

pub fn sdk_config() -> SdkConfig {
    SdkConfig::builder()
        .region(Region::new("us-east-1"))
        .behavior_version(BehaviorVersion::latest())
        .build()
}

/// State with vending through `sts` (role configured)
pub fn vending_state(sts: Arc<FakeSts>) -> AppState {
    let vending = VendingConfig {
        role_arn: Some(ROLE_ARN.to_string()),
        ..VendingConfig::default()
    };
    let tvm = TokenVendingMachine::new(extractor(), sts, &vending);

    AppState {
        extractor: extractor(),
        client_factory: Arc::new(ClientFactory::vending(
            extractor(),
            Arc::new(tvm),
            Some(CredentialCache::new(300, 3600)),
            sdk_config(),
        )),
        readiness: Readiness {
            vending_enabled: true,
            role_configured: true,
            verification: "hs256",
            key_store: None,
        },
    }
}

/// State whose vending is enabled but has no role ARN
pub fn misconfigured_state() -> AppState {
    let tvm = TokenVendingMachine::new(extractor(), Arc::new(FakeSts::default()), &VendingConfig::default());

    AppState {
        extractor: extractor(),
        client_factory: Arc::new(ClientFactory::vending(
            extractor(),
            Arc::new(tvm),
            None,
            sdk_config(),
        )),
        readiness: Readiness {
            vending_enabled: true,
            role_configured: false,
            verification: "hs256",
            key_store: None,
        },
    }
}

/// State with vending disabled (ambient fallback)
pub fn ambient_state() -> AppState {
    AppState {
        extractor: extractor(),
        client_factory: Arc::new(ClientFactory::ambient(extractor(), sdk_config())),
        readiness: Readiness {
            vending_enabled: false,
            role_configured: false,
            verification: "hs256",
            key_store: None,
        },
    }
}

pub fn app(state: AppState) -> Router {
    build_router(state, &ServerConfig::default())
}

/// HS256 token signed with the test secret, valid for an hour
pub fn signed_token(claims: Value) -> String {
    let mut claims = claims;
    if let Some(map) = claims.as_object_mut() {
        map.insert(
            "exp".to_string(),
            json!(chrono::Utc::now().timestamp() + 3600),
        );
    }
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

pub fn tenant_token(tenant_id: &str) -> String {
    signed_token(json!({
        "custom:tenantId": tenant_id,
        "custom:userRole": "TenantAdmin",
        "email": "alice@example.com",
        "cognito:username": "alice",
    }))
}

pub fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
