use crate::{AuthError, Result as AuthErrorResult};

use std::panic::Location;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use error_location::ErrorLocation;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use log::{error, info};

/// The identity provider's published signing keys.
///
/// Reads are synchronous so claims extraction stays I/O free; the set is
/// replaced wholesale by [`refresh`](Self::refresh).
pub struct JwksKeyStore {
    url: String,
    http: reqwest::Client,
    keys: RwLock<JwkSet>,
}

impl JwksKeyStore {
    /// Store with no keys yet; call `refresh` before serving traffic
    pub fn new(url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            http,
            keys: RwLock::new(JwkSet { keys: Vec::new() }),
        }
    }

    /// Store pinned to a fixed key set
    pub fn with_keys(keys: JwkSet) -> Self {
        Self {
            url: String::new(),
            http: reqwest::Client::new(),
            keys: RwLock::new(keys),
        }
    }

    pub fn key_count(&self) -> usize {
        self.keys.read().map(|keys| keys.keys.len()).unwrap_or(0)
    }

    /// Fetch the key set and replace the current one; returns the key count
    pub async fn refresh(&self) -> AuthErrorResult<usize> {
        let fetched = self.fetch().await?;
        let count = fetched.keys.len();

        match self.keys.write() {
            Ok(mut keys) => *keys = fetched,
            Err(poisoned) => *poisoned.into_inner() = fetched,
        }

        info!("Signing key set refreshed: {count} keys");
        Ok(count)
    }

    async fn fetch(&self) -> AuthErrorResult<JwkSet> {
        let location = Location::caller();

        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AuthError::KeySetFetch {
                message: e.to_string(),
                location: ErrorLocation::from(location),
            })?;

        response.json::<JwkSet>().await.map_err(|e| AuthError::KeySetFetch {
            message: format!("invalid key set document: {e}"),
            location: ErrorLocation::from(location),
        })
    }

    /// Decoding key for `kid`
    #[track_caller]
    pub fn decoding_key(&self, kid: &str) -> AuthErrorResult<DecodingKey> {
        let location = Location::caller();

        let keys = self.keys.read().map_err(|_| AuthError::KeyMaterial {
            message: "key set lock poisoned".to_string(),
            location: ErrorLocation::from(location),
        })?;

        let jwk = keys.find(kid).ok_or_else(|| AuthError::UnknownSigningKey {
            location: ErrorLocation::from(location),
        })?;

        DecodingKey::from_jwk(jwk).map_err(|e| AuthError::KeyMaterial {
            message: format!("unusable key {kid}: {e}"),
            location: ErrorLocation::from(location),
        })
    }

    /// Keep the key set current. Failed refreshes keep the previous keys.
    pub fn spawn_refresh(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately; startup already refreshed.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh().await {
                    error!("Signing key set refresh failed, keeping previous keys: {e}");
                }
            }
        })
    }
}
