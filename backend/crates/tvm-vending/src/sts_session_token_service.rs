use crate::{
    AssumeRoleRequest, Credentials, Result as VendingErrorResult, SessionTokenService,
    VendingError,
};

use tvm_config::VendingConfig;

use std::panic::Location;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::types::Tag;
use error_location::ErrorLocation;
use log::debug;

/// [`SessionTokenService`] backed by AWS STS `AssumeRole`
pub struct StsSessionTokenService {
    client: aws_sdk_sts::Client,
}

impl StsSessionTokenService {
    pub fn new(client: aws_sdk_sts::Client) -> Self {
        Self { client }
    }

    /// Client from shared SDK config, honoring the configured STS endpoint
    pub fn from_sdk_config(sdk_config: &SdkConfig, vending: &VendingConfig) -> Self {
        let mut builder = aws_sdk_sts::config::Builder::from(sdk_config);
        if let Some(ref endpoint) = vending.sts_endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self::new(aws_sdk_sts::Client::from_conf(builder.build()))
    }
}

/// Shared SDK config from the ambient credential chain and configured region
pub async fn load_sdk_config(vending: &VendingConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(ref region) = vending.region {
        loader = loader.region(Region::new(region.clone()));
    }
    loader.load().await
}

#[async_trait]
impl SessionTokenService for StsSessionTokenService {
    async fn assume_role(&self, request: AssumeRoleRequest) -> VendingErrorResult<Credentials> {
        let location = Location::caller();
        let tenant_id = request.session_tag.value().to_string();
        let failed = |message: String| VendingError::AssumeRoleFailed {
            tenant_id: tenant_id.clone(),
            message,
            location: ErrorLocation::from(location),
        };

        let tag = Tag::builder()
            .key(request.session_tag.key())
            .value(request.session_tag.value())
            .build()
            .map_err(|e| failed(format!("session tag: {e}")))?;

        debug!("STS AssumeRole for tenant {tenant_id}");

        let output = self
            .client
            .assume_role()
            .role_arn(request.role_arn)
            .role_session_name(request.session_name)
            .duration_seconds(request.duration_secs)
            .tags(tag)
            .set_policy(request.policy)
            .send()
            .await
            .map_err(|e| failed(DisplayErrorContext(&e).to_string()))?;

        let credentials = output
            .credentials()
            .ok_or_else(|| failed("response carried no credentials".to_string()))?;

        let expiration = credentials.expiration();
        Ok(Credentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().to_string(),
            expiration: chrono::DateTime::from_timestamp(
                expiration.secs(),
                expiration.subsec_nanos(),
            ),
        })
    }
}
