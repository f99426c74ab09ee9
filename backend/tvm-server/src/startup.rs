//! Wiring from validated configuration to request-handling components

use crate::error::{Result as ServerErrorResult, ServerError};
use crate::{AppState, Readiness};

use tvm_auth::{ClaimsExtractor, JwksKeyStore, TokenVerifier};
use tvm_config::{AuthConfig, Config, VerificationMode};
use tvm_vending::{
    ClientFactory, CredentialCache, StsSessionTokenService, TokenVendingMachine,
};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use aws_config::SdkConfig;
use log::{info, warn};

const KEY_SET_FETCH_TIMEOUT_SECS: u64 = 10;

/// Build the shared state: claims extractor, vending pipeline, readiness facts
pub async fn build_app_state(
    config: &Config,
    config_dir: &Path,
    sdk_config: SdkConfig,
) -> ServerErrorResult<AppState> {
    let (extractor, key_store) = build_claims_extractor(&config.auth, config_dir).await?;
    let client_factory = build_client_factory(config, extractor.clone(), sdk_config);

    Ok(AppState {
        extractor,
        client_factory: Arc::new(client_factory),
        readiness: Readiness {
            vending_enabled: config.vending.enabled,
            role_configured: config.vending.role_arn().is_some(),
            verification: verification_name(config.auth.verification),
            key_store,
        },
    })
}

/// Claims extractor for the configured verification mode. In jwks mode the
/// key set is fetched once before returning and then kept fresh in the
/// background.
pub async fn build_claims_extractor(
    auth: &AuthConfig,
    config_dir: &Path,
) -> ServerErrorResult<(ClaimsExtractor, Option<Arc<JwksKeyStore>>)> {
    let (mut verifier, key_store) = match auth.verification {
        VerificationMode::Disabled => {
            warn!("!!! Token signatures are NOT verified (auth.verification = disabled) !!!");
            return Ok((ClaimsExtractor::unverified(), None));
        }
        VerificationMode::Hs256 => {
            let secret = auth.jwt_secret.as_deref().ok_or_else(|| ServerError::Startup {
                message: "hs256 verification without auth.jwt_secret".to_string(),
            })?;
            (TokenVerifier::with_hs256(secret.as_bytes()), None)
        }
        VerificationMode::Rs256 => {
            let key_path = auth
                .jwt_public_key_path
                .as_deref()
                .ok_or_else(|| ServerError::Startup {
                    message: "rs256 verification without auth.jwt_public_key_path".to_string(),
                })?;
            let full_path = config_dir.join(key_path);
            let public_key =
                std::fs::read_to_string(&full_path).map_err(|e| ServerError::JwtKeyFile {
                    path: full_path.display().to_string(),
                    source: e,
                })?;
            (TokenVerifier::with_rs256(&public_key)?, None)
        }
        VerificationMode::Jwks => {
            let url = auth.jwks_url.as_deref().ok_or_else(|| ServerError::Startup {
                message: "jwks verification without auth.jwks_url".to_string(),
            })?;
            let http = reqwest::Client::builder()
                .timeout(Duration::from_secs(KEY_SET_FETCH_TIMEOUT_SECS))
                .build()
                .map_err(|e| ServerError::Startup {
                    message: format!("HTTP client: {e}"),
                })?;

            let store = Arc::new(JwksKeyStore::new(url, http));
            store.refresh().await?;
            store
                .clone()
                .spawn_refresh(Duration::from_secs(auth.jwks_refresh_secs));

            (TokenVerifier::with_key_set(store.clone()), Some(store))
        }
    };

    if let Some(ref issuer) = auth.issuer {
        verifier = verifier.with_issuer(issuer.clone());
    }
    if let Some(ref audience) = auth.audience {
        verifier = verifier.with_audience(audience.clone());
    }

    info!("Token signatures verified with {}", verifier.source_name());
    Ok((ClaimsExtractor::verified(verifier), key_store))
}

/// Vending client factory, or the ambient fallback when vending is disabled
pub fn build_client_factory(
    config: &Config,
    extractor: ClaimsExtractor,
    sdk_config: SdkConfig,
) -> ClientFactory {
    let vending = &config.vending;

    let factory = if vending.enabled {
        let service = Arc::new(StsSessionTokenService::from_sdk_config(&sdk_config, vending));
        let tvm = TokenVendingMachine::new(extractor.clone(), service, vending);
        let cache = config.cache.enabled.then(|| {
            CredentialCache::new(
                config.cache.refresh_before_expiry_secs,
                vending.default_duration_secs,
            )
        });

        ClientFactory::vending(extractor, Arc::new(tvm), cache, sdk_config)
            .with_duration_secs(vending.default_duration_secs)
    } else {
        ClientFactory::ambient(extractor, sdk_config)
    };

    factory.with_endpoint_url(vending.dynamodb_endpoint.clone())
}

fn verification_name(mode: VerificationMode) -> &'static str {
    match mode {
        VerificationMode::Jwks => "jwks",
        VerificationMode::Hs256 => "hs256",
        VerificationMode::Rs256 => "rs256",
        VerificationMode::Disabled => "disabled",
    }
}
