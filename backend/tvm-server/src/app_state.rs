use tvm_auth::{ClaimsExtractor, JwksKeyStore};
use tvm_vending::ClientFactory;

use std::sync::Arc;

/// Shared handles, built once at startup and passed to every request
#[derive(Clone)]
pub struct AppState {
    pub extractor: ClaimsExtractor,
    pub client_factory: Arc<ClientFactory>,
    pub readiness: Readiness,
}

/// Facts the readiness probe reports on
#[derive(Clone)]
pub struct Readiness {
    pub vending_enabled: bool,
    pub role_configured: bool,
    pub verification: &'static str,
    /// Present in jwks mode; readiness requires at least one key
    pub key_store: Option<Arc<JwksKeyStore>>,
}

impl Readiness {
    /// Reasons the service must not receive traffic (empty when ready)
    pub fn blockers(&self) -> Vec<&'static str> {
        let mut blockers = Vec::new();

        if self.vending_enabled && !self.role_configured {
            blockers.push("vending enabled without a role ARN");
        }
        if let Some(ref store) = self.key_store
            && store.key_count() == 0
        {
            blockers.push("no signing keys loaded");
        }

        blockers
    }
}
