//! Shared fixtures for key-set integration tests

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};

pub const SIGNING_KEY_PEM: &[u8] = include_bytes!("../fixtures/signing_key.pem");
pub const SIGNING_KEY_MODULUS: &str = include_str!("../fixtures/signing_key_modulus.txt");
pub const KEY_ID: &str = "test-key-1";

/// Published key set containing the fixture key under `kid`
pub fn key_set_document(kid: &str) -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "kid": kid,
            "use": "sig",
            "alg": "RS256",
            "n": SIGNING_KEY_MODULUS.trim(),
            "e": "AQAB",
        }]
    })
}

/// RS256 token signed by the fixture key, valid for ten minutes
pub fn rs256_token(kid: Option<&str>, tenant_id: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let exp = chrono::Utc::now().timestamp() + 600;

    encode(
        &header,
        &json!({ "custom:tenantId": tenant_id, "email": "a@b.com", "exp": exp }),
        &EncodingKey::from_rsa_pem(SIGNING_KEY_PEM).unwrap(),
    )
    .unwrap()
}
