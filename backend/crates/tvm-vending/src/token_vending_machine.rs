use crate::{
    AssumeRoleRequest, CredentialPolicy, Credentials, ExchangeRateLimiter,
    Result as VendingErrorResult, SessionTag, SessionTokenService, VendingError, VendingMetrics,
};

use tvm_auth::{Claims, ClaimsExtractor};
use tvm_config::{MAX_SESSION_DURATION_SECS, MIN_SESSION_DURATION_SECS, VendingConfig};

use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use error_location::ErrorLocation;
use log::{debug, error, info, warn};
use tokio::sync::Semaphore;

pub const SESSION_NAME_PREFIX: &str = "TVM-Session-";

/// Exchanges a bearer token for temporary credentials tagged with the
/// token's tenant.
///
/// The role identifier comes from process configuration, never from the
/// request. Exchanges are bounded by a timeout, a process-wide concurrency
/// cap and a per-second quota.
pub struct TokenVendingMachine {
    extractor: ClaimsExtractor,
    service: Arc<dyn SessionTokenService>,
    role_arn: Option<String>,
    exchange_timeout: Duration,
    permits: Semaphore,
    rate_limiter: ExchangeRateLimiter,
    attach_session_policy: bool,
    metrics: VendingMetrics,
}

impl TokenVendingMachine {
    pub fn new(
        extractor: ClaimsExtractor,
        service: Arc<dyn SessionTokenService>,
        config: &VendingConfig,
    ) -> Self {
        if config.role_arn().is_none() {
            error!("Token vending machine has no role ARN; every exchange will fail");
        }

        Self {
            extractor,
            service,
            role_arn: config.role_arn().map(str::to_string),
            exchange_timeout: Duration::from_secs(config.exchange_timeout_secs),
            permits: Semaphore::new(config.max_concurrent_exchanges),
            rate_limiter: ExchangeRateLimiter::per_second(config.exchanges_per_second),
            attach_session_policy: config.attach_session_policy,
            metrics: VendingMetrics::new(),
        }
    }

    /// True when a role identifier is configured
    pub fn is_configured(&self) -> bool {
        self.role_arn.is_some()
    }

    /// Exchange `token` for credentials and return them in transport form
    /// (`AccessKeyId`, `SecretAccessKey`, `SessionToken`, `Expiration`).
    pub async fn assume_role(&self, token: &str, duration_secs: i32) -> VendingErrorResult<String> {
        self.vend(token, duration_secs).await?.to_json()
    }

    /// Exchange `token` for credentials
    pub async fn vend(&self, token: &str, duration_secs: i32) -> VendingErrorResult<Credentials> {
        let location = Location::caller();

        let claims = self.extractor.extract(token)?;

        let role_arn = self.role_arn.clone().ok_or_else(|| VendingError::ConfigError {
            message: "no role ARN configured (vending.role_arn / IAM_ROLE_ARN)".to_string(),
            location: ErrorLocation::from(location),
        })?;

        validate_duration(duration_secs)?;

        let request = self.build_request(&claims, role_arn, duration_secs)?;

        if let Err(e) = self.rate_limiter.check() {
            warn!("Credential exchange throttled for tenant {}", claims.tenant_id);
            self.metrics.exchange_throttled();
            return Err(e);
        }

        self.metrics.exchange_attempted();
        info!(
            "Vending {duration_secs}s credentials for tenant {}",
            claims.tenant_id
        );

        let result = tokio::time::timeout(self.exchange_timeout, async {
            let _permit = self.permits.acquire().await.map_err(|_| {
                VendingError::AssumeRoleFailed {
                    tenant_id: claims.tenant_id.clone(),
                    message: "exchange pool closed".to_string(),
                    location: ErrorLocation::from(location),
                }
            })?;
            self.service.assume_role(request).await
        })
        .await
        .unwrap_or_else(|_| {
            Err(VendingError::AssumeRoleFailed {
                tenant_id: claims.tenant_id.clone(),
                message: format!("timed out after {}s", self.exchange_timeout.as_secs()),
                location: ErrorLocation::from(location),
            })
        });

        match result {
            Ok(credentials) => {
                self.metrics.exchange_succeeded();
                debug!(
                    "Vended key ...{} for tenant {}",
                    credentials.access_key_suffix(),
                    claims.tenant_id
                );
                Ok(credentials)
            }
            Err(e) => {
                self.metrics.exchange_failed(e.error_code());
                error!("Credential exchange failed for tenant {}: {e}", claims.tenant_id);
                Err(e)
            }
        }
    }

    fn build_request(
        &self,
        claims: &Claims,
        role_arn: String,
        duration_secs: i32,
    ) -> VendingErrorResult<AssumeRoleRequest> {
        let policy = if self.attach_session_policy {
            Some(CredentialPolicy::dynamodb_leading_key(&claims.tenant_id).policy_document()?)
        } else {
            None
        };

        Ok(AssumeRoleRequest {
            role_arn,
            session_name: format!("{SESSION_NAME_PREFIX}{}", claims.tenant_id),
            duration_secs,
            session_tag: SessionTag::for_tenant(claims),
            policy,
        })
    }
}

/// Durations outside the session-token service's range are rejected, not clamped
#[track_caller]
pub fn validate_duration(duration_secs: i32) -> VendingErrorResult<()> {
    if (MIN_SESSION_DURATION_SECS..=MAX_SESSION_DURATION_SECS).contains(&duration_secs) {
        Ok(())
    } else {
        Err(VendingError::InvalidDuration {
            duration_secs,
            min_secs: MIN_SESSION_DURATION_SECS,
            max_secs: MAX_SESSION_DURATION_SECS,
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
