
use crate::{
    AssumeRoleRequest, Credentials, Result as VendingErrorResult, SessionTokenService,
    VendingError,
};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use error_location::ErrorLocation;
use serde_json::{Value, json};
use tvm_config::VendingConfig;

pub(crate) const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/tenant-abac";

/// Session-token service that records every request it receives
#[derive(Default)]
pub(crate) struct RecordingService {
    requests: Mutex<Vec<AssumeRoleRequest>>,
    calls: AtomicUsize,
    delay: Duration,
    fail: bool,
}

impl RecordingService {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<AssumeRoleRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionTokenService for RecordingService {
    async fn assume_role(&self, request: AssumeRoleRequest) -> VendingErrorResult<Credentials> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let tenant_id = request.session_tag.value().to_string();
        self.requests.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail {
            return Err(VendingError::AssumeRoleFailed {
                tenant_id,
                message: "AccessDenied".to_string(),
                location: ErrorLocation::from(std::panic::Location::caller()),
            });
        }

        Ok(test_credentials(&format!("ASIA{call:016}")))
    }
}

pub(crate) fn test_credentials(access_key_id: &str) -> Credentials {
    Credentials {
        access_key_id: access_key_id.to_string(),
        secret_access_key: "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string(),
        session_token: "FwoGZXIvYXdzEXAMPLESESSIONTOKEN".to_string(),
        expiration: Some(chrono::Utc::now() + chrono::Duration::hours(1)),
    }
}

/// Unsigned token carrying `payload`
pub(crate) fn token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.sig")
}

pub(crate) fn tenant_token(tenant_id: &str) -> String {
    token(&json!({ "custom:tenantId": tenant_id, "email": "a@b.com" }))
}

pub(crate) fn vending_config() -> VendingConfig {
    VendingConfig {
        role_arn: Some(ROLE_ARN.to_string()),
        ..VendingConfig::default()
    }
}

pub(crate) fn sdk_config() -> SdkConfig {
    SdkConfig::builder()
        .region(Region::new("us-east-1"))
        .behavior_version(BehaviorVersion::latest())
        .build()
}
