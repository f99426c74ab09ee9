pub mod claims;
pub mod claims_extractor;
pub mod error;
pub mod jwks_key_store;
pub mod tenant_context;
pub mod token_verifier;

pub use claims::Claims;
pub use claims_extractor::{ClaimsExtractor, SignatureVerification};
pub use error::{AuthError, Result};
pub use jwks_key_store::JwksKeyStore;
pub use tenant_context::TenantContext;
pub use token_verifier::TokenVerifier;

#[cfg(test)]
mod tests;
