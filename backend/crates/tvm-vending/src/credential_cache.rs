use crate::{Credentials, Result as VendingErrorResult, VendingError, VendingMetrics};

use tvm_config::MAX_SESSION_DURATION_SECS;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use tokio::sync::{Mutex as AsyncMutex, RwLock};

struct CachedCredentials {
    credentials: Credentials,
    expires_at: DateTime<Utc>,
}

/// Per-tenant vended-credential cache.
///
/// At most one exchange per tenant is in flight: concurrent misses for the
/// same tenant wait on that tenant's flight lock and then read the entry the
/// first caller stored. Entries go stale `refresh_before_expiry` ahead of
/// their expiration.
pub struct CredentialCache {
    entries: RwLock<HashMap<String, CachedCredentials>>,
    flights: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    refresh_before_expiry: Duration,
    /// Assumed lifetime when the exchange reports no expiration
    fallback_lifetime: Duration,
    metrics: VendingMetrics,
}

impl CredentialCache {
    pub fn new(refresh_before_expiry_secs: u64, fallback_lifetime_secs: i32) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            flights: Mutex::new(HashMap::new()),
            refresh_before_expiry: Duration::seconds(
                i64::try_from(refresh_before_expiry_secs)
                    .unwrap_or(i64::MAX)
                    .min(i64::from(MAX_SESSION_DURATION_SECS)),
            ),
            fallback_lifetime: Duration::seconds(i64::from(fallback_lifetime_secs)),
            metrics: VendingMetrics::new(),
        }
    }

    /// Fresh credentials for `tenant_id`, calling `fetch` on a miss.
    ///
    /// Credentials that are already expired are an error. Credentials that
    /// expire inside the refresh window are returned but not stored.
    pub async fn get_or_fetch<F, Fut>(&self, tenant_id: &str, fetch: F) -> VendingErrorResult<Credentials>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = VendingErrorResult<Credentials>>,
    {
        if let Some(credentials) = self.fresh(tenant_id).await {
            self.metrics.cache_hit();
            return Ok(credentials);
        }

        let flight = self.flight(tenant_id);
        let result = self.fetch_in_flight(tenant_id, &flight, fetch).await;
        self.release_flight(tenant_id, flight);

        result
    }

    async fn fetch_in_flight<F, Fut>(
        &self,
        tenant_id: &str,
        flight: &AsyncMutex<()>,
        fetch: F,
    ) -> VendingErrorResult<Credentials>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = VendingErrorResult<Credentials>>,
    {
        let _guard = flight.lock().await;

        // Another caller may have completed the exchange while we waited
        if let Some(credentials) = self.fresh(tenant_id).await {
            self.metrics.cache_hit();
            return Ok(credentials);
        }

        self.metrics.cache_miss();
        let credentials = fetch().await?;
        let now = Utc::now();
        let expires_at = credentials
            .expiration
            .unwrap_or_else(|| now + self.fallback_lifetime);

        if expires_at <= now {
            return Err(VendingError::credential_unavailable(format!(
                "exchange returned credentials that expired at {expires_at}"
            )));
        }

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);

        if now + self.refresh_before_expiry < expires_at {
            debug!("Caching credentials for tenant {tenant_id} until {expires_at}");
            entries.insert(
                tenant_id.to_string(),
                CachedCredentials {
                    credentials: credentials.clone(),
                    expires_at,
                },
            );
        } else {
            warn!("Credentials for tenant {tenant_id} expire at {expires_at}, inside the refresh window; not caching");
            entries.remove(tenant_id);
        }

        Ok(credentials)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn fresh(&self, tenant_id: &str) -> Option<Credentials> {
        let entries = self.entries.read().await;
        entries
            .get(tenant_id)
            .filter(|entry| Utc::now() + self.refresh_before_expiry < entry.expires_at)
            .map(|entry| entry.credentials.clone())
    }

    fn flight(&self, tenant_id: &str) -> Arc<AsyncMutex<()>> {
        let mut flights = match self.flights.lock() {
            Ok(flights) => flights,
            Err(poisoned) => poisoned.into_inner(),
        };
        flights
            .entry(tenant_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Forget the tenant's flight lock once no other caller holds it
    fn release_flight(&self, tenant_id: &str, flight: Arc<AsyncMutex<()>>) {
        let mut flights = match self.flights.lock() {
            Ok(flights) => flights,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mapped = flights
            .get(tenant_id)
            .is_some_and(|held| Arc::ptr_eq(held, &flight));
        // One reference in the map, one held here
        if mapped && Arc::strong_count(&flight) == 2 {
            flights.remove(tenant_id);
        }
    }

    #[cfg(test)]
    pub(crate) fn flights_held(&self) -> usize {
        match self.flights.lock() {
            Ok(flights) => flights.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}
