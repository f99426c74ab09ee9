//! Shared helpers for vending integration tests

use std::sync::Mutex;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::json;
use tvm_auth::{ClaimsExtractor, TokenVerifier};
use tvm_vending::{AssumeRoleRequest, Credentials, SessionTokenService};

pub const SECRET: &[u8] = b"integration-secret-at-least-32-bytes";
pub const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/tenant-abac";

/// Records the session tags of every exchange
#[derive(Default)]
pub struct TagRecorder {
    pub tags: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SessionTokenService for TagRecorder {
    async fn assume_role(&self, request: AssumeRoleRequest) -> tvm_vending::Result<Credentials> {
        let tag = &request.session_tag;
        self.tags
            .lock()
            .unwrap()
            .push((tag.key().to_string(), tag.value().to_string()));

        Ok(Credentials {
            access_key_id: format!("ASIA{}", tag.value().to_uppercase()),
            secret_access_key: "secret".to_string(),
            session_token: "session".to_string(),
            expiration: Some(Utc::now() + Duration::seconds(i64::from(request.duration_secs))),
        })
    }
}

pub fn verified_extractor() -> ClaimsExtractor {
    ClaimsExtractor::verified(TokenVerifier::with_hs256(SECRET))
}

/// HS256 token for `tenant_id`, signed with `secret`
pub fn signed_token(tenant_id: &str, secret: &[u8]) -> String {
    let exp = (Utc::now() + Duration::hours(1)).timestamp();
    encode(
        &Header::new(Algorithm::HS256),
        &json!({ "custom:tenantId": tenant_id, "custom:userRole": "TenantAdmin", "exp": exp }),
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

pub fn sdk_config() -> SdkConfig {
    SdkConfig::builder()
        .region(Region::new("us-east-1"))
        .behavior_version(BehaviorVersion::latest())
        .build()
}
