mod claims_extractor;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

pub(crate) const TEST_SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";

/// Unsigned three-segment token carrying `payload`
pub(crate) fn unsigned_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

/// HS256 token signed with `secret`, valid for an hour
pub(crate) fn signed_token(payload: &Value, secret: &[u8]) -> String {
    let mut claims = payload.clone();
    let now = chrono::Utc::now().timestamp();
    if let Some(map) = claims.as_object_mut() {
        map.entry("exp").or_insert(Value::from(now + 3600));
        map.entry("iat").or_insert(Value::from(now));
    }

    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret),
    )
    .unwrap()
}
