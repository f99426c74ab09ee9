use crate::{
    CredentialCache, Credentials, Result as VendingErrorResult, TokenVendingMachine,
    VendingError, VendingMetrics,
};

use tvm_auth::ClaimsExtractor;

use std::panic::Location;
use std::sync::Arc;
use std::time::SystemTime;

use aws_config::SdkConfig;
use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use log::{debug, warn};

/// Default lifetime requested for credentials backing a scoped client
pub const SCOPED_CLIENT_DURATION_SECS: i32 = 3600;

const PROVIDER_NAME: &str = "TokenVendingMachine";

/// Whose identity a [`ScopedClient`] acts under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientIdentity {
    /// Vended, tenant-tagged credentials
    Scoped,
    /// The process's own identity; vending was disabled at construction
    Ambient,
}

impl ClientIdentity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scoped => "scoped",
            Self::Ambient => "ambient",
        }
    }
}

/// A data-store client bound to one tenant
#[derive(Debug, Clone)]
pub struct ScopedClient {
    pub tenant_id: String,
    pub identity: ClientIdentity,
    pub expiration: Option<DateTime<Utc>>,
    pub client: aws_sdk_dynamodb::Client,
}

enum ClientSource {
    Vending {
        tvm: Arc<TokenVendingMachine>,
        cache: Option<CredentialCache>,
    },
    Ambient,
}

/// Builds data-store clients authenticated as the calling tenant
pub struct ClientFactory {
    extractor: ClaimsExtractor,
    source: ClientSource,
    sdk_config: SdkConfig,
    endpoint_url: Option<String>,
    duration_secs: i32,
    metrics: VendingMetrics,
}

impl ClientFactory {
    /// Factory that vends credentials through `tvm`, optionally caching them
    pub fn vending(
        extractor: ClaimsExtractor,
        tvm: Arc<TokenVendingMachine>,
        cache: Option<CredentialCache>,
        sdk_config: SdkConfig,
    ) -> Self {
        Self {
            extractor,
            source: ClientSource::Vending { tvm, cache },
            sdk_config,
            endpoint_url: None,
            duration_secs: SCOPED_CLIENT_DURATION_SECS,
            metrics: VendingMetrics::new(),
        }
    }

    /// Factory with no vending machine. Clients run under the process's own
    /// identity and are NOT tenant-scoped.
    pub fn ambient(extractor: ClaimsExtractor, sdk_config: SdkConfig) -> Self {
        warn!("!!! Client factory built WITHOUT credential vending: clients use the process identity and are NOT tenant-scoped !!!");
        Self {
            extractor,
            source: ClientSource::Ambient,
            sdk_config,
            endpoint_url: None,
            duration_secs: SCOPED_CLIENT_DURATION_SECS,
            metrics: VendingMetrics::new(),
        }
    }

    /// Data-store endpoint override (local emulators)
    pub fn with_endpoint_url(mut self, endpoint_url: Option<String>) -> Self {
        self.endpoint_url = endpoint_url;
        self
    }

    /// Lifetime requested for vended credentials
    pub fn with_duration_secs(mut self, duration_secs: i32) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn is_vending(&self) -> bool {
        matches!(self.source, ClientSource::Vending { .. })
    }

    /// Client for `tenant_id`, authenticated by `token`.
    ///
    /// The token's own tenant must equal `tenant_id`. Vending failures surface
    /// as `CredentialUnavailable`; token rejections and throttling keep their
    /// own kinds.
    pub async fn get_scoped_client(
        &self,
        tenant_id: &str,
        token: &str,
    ) -> VendingErrorResult<ScopedClient> {
        let location = Location::caller();

        let claims = self.extractor.extract(token)?;
        if claims.tenant_id != tenant_id {
            warn!(
                "Scoped client refused: token tenant {} asked for another tenant",
                claims.tenant_id
            );
            return Err(VendingError::TenantMismatch {
                location: ErrorLocation::from(location),
            });
        }

        let (tvm, cache) = match &self.source {
            ClientSource::Vending { tvm, cache } => (tvm, cache),
            ClientSource::Ambient => {
                warn!("Building AMBIENT data-store client for tenant {tenant_id}; isolation is not enforced");
                self.metrics.ambient_client_built();
                return Ok(ScopedClient {
                    tenant_id: claims.tenant_id,
                    identity: ClientIdentity::Ambient,
                    expiration: None,
                    client: self.build_client(None),
                });
            }
        };

        let fetch = || async {
            let json = tvm
                .assume_role(token, self.duration_secs)
                .await
                .map_err(unavailable)?;
            Credentials::from_json(&json)
        };

        let credentials = match cache {
            Some(cache) => cache.get_or_fetch(tenant_id, fetch).await?,
            None => fetch().await?,
        };

        debug!(
            "Scoped client for tenant {tenant_id} using key ...{}",
            credentials.access_key_suffix()
        );

        Ok(ScopedClient {
            tenant_id: claims.tenant_id,
            identity: ClientIdentity::Scoped,
            expiration: credentials.expiration,
            client: self.build_client(Some(&credentials)),
        })
    }

    fn build_client(&self, credentials: Option<&Credentials>) -> aws_sdk_dynamodb::Client {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&self.sdk_config);

        if let Some(credentials) = credentials {
            builder = builder.credentials_provider(aws_credential_types::Credentials::new(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.clone(),
                Some(credentials.session_token.clone()),
                credentials.expiration.map(SystemTime::from),
                PROVIDER_NAME,
            ));
        }

        if let Some(ref endpoint_url) = self.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        aws_sdk_dynamodb::Client::from_conf(builder.build())
    }
}

/// Token rejections and throttling pass through; everything else becomes
/// `CredentialUnavailable`
#[track_caller]
fn unavailable(error: VendingError) -> VendingError {
    match error {
        VendingError::Auth(_) | VendingError::Throttled { .. } => error,
        VendingError::CredentialUnavailable { .. } => error,
        other => VendingError::credential_unavailable(other.to_string()),
    }
}
