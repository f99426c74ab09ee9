use crate::{AuthError, JwksKeyStore, Result as AuthErrorResult};

use std::panic::Location;
use std::sync::Arc;

use error_location::ErrorLocation;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use log::warn;
use serde_json::Value;

/// Clock skew tolerated on `exp` and `nbf`
const LEEWAY_SECS: u64 = 30;

/// Algorithms accepted from a published key set. Symmetric algorithms are
/// excluded so a public key can never be used as an HMAC secret.
const KEY_SET_ALGORITHMS: [Algorithm; 8] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
];

enum KeySource {
    Static {
        key: DecodingKey,
        algorithm: Algorithm,
    },
    KeySet(Arc<JwksKeyStore>),
}

/// Verifies bearer-token signatures and registered claims (`exp`, `nbf`,
/// optional `iss`/`aud`) against the identity provider's keys.
pub struct TokenVerifier {
    source: KeySource,
    issuer: Option<String>,
    audience: Option<String>,
}

impl TokenVerifier {
    /// HS256 shared secret
    pub fn with_hs256(secret: &[u8]) -> Self {
        Self::from_source(KeySource::Static {
            key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        })
    }

    /// RS256 public key (PEM)
    #[track_caller]
    pub fn with_rs256(public_key_pem: &str) -> AuthErrorResult<Self> {
        let key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes()).map_err(|e| {
            AuthError::KeyMaterial {
                message: format!("invalid RSA public key: {e}"),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        Ok(Self::from_source(KeySource::Static {
            key,
            algorithm: Algorithm::RS256,
        }))
    }

    /// Keys looked up by `kid` in the provider's published key set
    pub fn with_key_set(store: Arc<JwksKeyStore>) -> Self {
        Self::from_source(KeySource::KeySet(store))
    }

    fn from_source(source: KeySource) -> Self {
        Self {
            source,
            issuer: None,
            audience: None,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Name of the key source (for logging)
    pub fn source_name(&self) -> &'static str {
        match &self.source {
            KeySource::Static {
                algorithm: Algorithm::HS256,
                ..
            } => "HS256",
            KeySource::Static { .. } => "RS256",
            KeySource::KeySet(_) => "JWKS",
        }
    }

    /// Verify the signature and registered claims of `token`
    #[track_caller]
    pub fn verify(&self, token: &str) -> AuthErrorResult<()> {
        let location = Location::caller();

        let (key, algorithm) = match &self.source {
            KeySource::Static { key, algorithm } => (key.clone(), *algorithm),
            KeySource::KeySet(store) => {
                let header = decode_header(token).map_err(|_| AuthError::InvalidSignature {
                    reason: "unreadable header",
                    location: ErrorLocation::from(location),
                })?;
                if !KEY_SET_ALGORITHMS.contains(&header.alg) {
                    warn!("Token rejected: algorithm {:?} not allowed", header.alg);
                    return Err(AuthError::InvalidSignature {
                        reason: "algorithm not allowed",
                        location: ErrorLocation::from(location),
                    });
                }
                let kid = header.kid.ok_or_else(|| AuthError::UnknownSigningKey {
                    location: ErrorLocation::from(location),
                })?;
                (store.decoding_key(&kid)?, header.alg)
            }
        };

        decode::<Value>(token, &key, &self.validation(algorithm))
            .map(|_| ())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired {
                    location: ErrorLocation::from(location),
                },
                kind => {
                    let reason = describe(kind);
                    warn!("Token rejected: {reason}");
                    AuthError::InvalidSignature {
                        reason,
                        location: ErrorLocation::from(location),
                    }
                }
            })
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = LEEWAY_SECS;

        if let Some(ref issuer) = self.issuer {
            validation.set_issuer(&[issuer]);
        }

        match self.audience {
            Some(ref audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        validation
    }
}

fn describe(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidSignature => "signature mismatch",
        ErrorKind::ImmatureSignature => "not yet valid",
        ErrorKind::InvalidIssuer => "issuer mismatch",
        ErrorKind::InvalidAudience => "audience mismatch",
        ErrorKind::InvalidAlgorithm => "algorithm mismatch",
        ErrorKind::MissingRequiredClaim(_) => "missing registered claim",
        _ => "undecodable token",
    }
}
