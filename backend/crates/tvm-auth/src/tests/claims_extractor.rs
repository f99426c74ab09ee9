use crate::claims::{DEFAULT_EMAIL, DEFAULT_USER_ROLE, DEFAULT_USERNAME};
use crate::tests::{TEST_SECRET, signed_token, unsigned_token};
use crate::{AuthError, ClaimsExtractor, TokenVerifier};

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde_json::json;

#[test]
fn given_token_with_tenant_and_email_when_extracted_then_other_fields_default() {
    // Given: payload encoded with standard, padded base64
    let payload = STANDARD.encode(r#"{"custom:tenantId":"tenant-42","email":"a@b.com"}"#);
    let token = format!("eyJhbGciOiJub25lIn0.{payload}.sig");
    let extractor = ClaimsExtractor::unverified();

    // When
    let claims = extractor.extract(&token).unwrap();

    // Then
    assert_eq!(claims.tenant_id, "tenant-42");
    assert_eq!(claims.user_role, DEFAULT_USER_ROLE);
    assert_eq!(claims.email, "a@b.com");
    assert_eq!(claims.username, DEFAULT_USERNAME);
}

#[test]
fn given_all_claims_when_extracted_then_all_fields_resolved() {
    let token = unsigned_token(&json!({
        "custom:tenantId": "tenant-7",
        "custom:userRole": "TenantAdmin",
        "email": "admin@tenant7.example",
        "cognito:username": "admin7",
    }));

    let claims = ClaimsExtractor::unverified().extract(&token).unwrap();

    assert_eq!(claims.tenant_id, "tenant-7");
    assert_eq!(claims.user_role, "TenantAdmin");
    assert_eq!(claims.email, "admin@tenant7.example");
    assert_eq!(claims.username, "admin7");
}

#[test]
fn given_two_segment_token_when_extracted_then_malformed() {
    let result = ClaimsExtractor::unverified().extract("abc.def");

    assert!(matches!(
        result,
        Err(AuthError::MalformedToken { segments: 2, .. })
    ));
}

#[test]
fn given_four_segment_token_when_extracted_then_malformed() {
    let result = ClaimsExtractor::unverified().extract("not.a.valid.jwt");

    assert!(matches!(
        result,
        Err(AuthError::MalformedToken { segments: 4, .. })
    ));
}

#[test]
fn given_verifying_extractor_and_two_segments_when_extracted_then_malformed_not_signature_error() {
    let extractor = ClaimsExtractor::verified(TokenVerifier::with_hs256(TEST_SECRET));

    let result = extractor.extract("abc.def");

    assert!(matches!(result, Err(AuthError::MalformedToken { .. })));
}

#[test]
fn given_payload_without_tenant_when_extracted_then_missing_tenant() {
    let token = unsigned_token(&json!({ "custom:userRole": "Admin" }));

    let result = ClaimsExtractor::unverified().extract(&token);

    assert!(matches!(result, Err(AuthError::MissingTenant { .. })));
}

#[test]
fn given_empty_tenant_when_extracted_then_missing_tenant() {
    let token = unsigned_token(&json!({ "custom:tenantId": "" }));

    let result = ClaimsExtractor::unverified().extract(&token);

    assert!(matches!(result, Err(AuthError::MissingTenant { .. })));
}

#[test]
fn given_non_string_tenant_when_extracted_then_missing_tenant() {
    let token = unsigned_token(&json!({ "custom:tenantId": 42 }));

    let result = ClaimsExtractor::unverified().extract(&token);

    assert!(matches!(result, Err(AuthError::MissingTenant { .. })));
}

#[test]
fn given_oversized_tenant_when_extracted_then_invalid_claim() {
    let token = unsigned_token(&json!({ "custom:tenantId": "t".repeat(129) }));

    let result = ClaimsExtractor::unverified().extract(&token);

    assert!(matches!(result, Err(AuthError::InvalidClaim { .. })));
}

#[test]
fn given_non_string_optional_claims_when_extracted_then_defaults_apply() {
    let token = unsigned_token(&json!({
        "custom:tenantId": "tenant-1",
        "custom:userRole": ["Admin"],
        "email": null,
        "cognito:username": 7,
    }));

    let claims = ClaimsExtractor::unverified().extract(&token).unwrap();

    assert_eq!(claims.user_role, DEFAULT_USER_ROLE);
    assert_eq!(claims.email, DEFAULT_EMAIL);
    assert_eq!(claims.username, DEFAULT_USERNAME);
}

#[test]
fn given_payload_not_base64_when_extracted_then_encoding_error() {
    let result = ClaimsExtractor::unverified().extract("header.!!not*base64!!.sig");

    assert!(matches!(result, Err(AuthError::EncodingError { .. })));
}

#[test]
fn given_payload_not_json_object_when_extracted_then_claim_parse_error() {
    let array = URL_SAFE_NO_PAD.encode(r#"["custom:tenantId","tenant-1"]"#);
    let garbage = URL_SAFE_NO_PAD.encode("tenant-1");

    let extractor = ClaimsExtractor::unverified();

    assert!(matches!(
        extractor.extract(&format!("h.{array}.s")),
        Err(AuthError::ClaimParseError { .. })
    ));
    assert!(matches!(
        extractor.extract(&format!("h.{garbage}.s")),
        Err(AuthError::ClaimParseError { .. })
    ));
}

#[test]
fn given_verifying_extractor_and_signed_token_when_extracted_then_claims_resolved() {
    let extractor = ClaimsExtractor::verified(TokenVerifier::with_hs256(TEST_SECRET));
    let token = signed_token(&json!({ "custom:tenantId": "tenant-42" }), TEST_SECRET);

    let claims = extractor.extract(&token).unwrap();

    assert_eq!(claims.tenant_id, "tenant-42");
    assert!(extractor.verifies_signatures());
}

#[test]
fn given_verifying_extractor_and_unsigned_token_when_extracted_then_rejected() {
    let extractor = ClaimsExtractor::verified(TokenVerifier::with_hs256(TEST_SECRET));
    let token = unsigned_token(&json!({ "custom:tenantId": "tenant-42" }));

    let result = extractor.extract(&token);

    assert!(matches!(result, Err(AuthError::InvalidSignature { .. })));
}

#[test]
fn given_verified_token_without_tenant_when_extracted_then_missing_tenant() {
    let extractor = ClaimsExtractor::verified(TokenVerifier::with_hs256(TEST_SECRET));
    let token = signed_token(&json!({ "custom:userRole": "Admin" }), TEST_SECRET);

    let result = extractor.extract(&token);

    assert!(matches!(result, Err(AuthError::MissingTenant { .. })));
}

#[test]
fn given_claims_when_debug_formatted_then_email_and_username_redacted() {
    let token = unsigned_token(&json!({
        "custom:tenantId": "tenant-1",
        "email": "secret@example.com",
        "cognito:username": "secret-user",
    }));

    let claims = ClaimsExtractor::unverified().extract(&token).unwrap();
    let rendered = format!("{claims:?}");

    assert!(rendered.contains("tenant-1"));
    assert!(!rendered.contains("secret@example.com"));
    assert!(!rendered.contains("secret-user"));
}

#[test]
fn given_rejection_when_displayed_then_token_contents_not_echoed() {
    let token = unsigned_token(&json!({ "custom:userRole": "very-private-role" }));

    let err = ClaimsExtractor::unverified().extract(&token).unwrap_err();

    assert!(!err.to_string().contains("very-private-role"));
    assert_eq!(err.error_code(), "MISSING_TENANT");
}

#[test]
fn given_payload_only_decodable_with_standard_alphabet_when_extracted_then_claims_resolved() {
    // Given: the standard encoding of this payload contains '+'
    let payload = STANDARD.encode(r#"{"custom:tenantId":"t>>>?","email":"a@b.com"}"#);
    assert!(payload.contains('+') || payload.contains('/'));
    let token = format!("eyJhbGciOiJub25lIn0.{payload}.sig");

    // When
    let claims = ClaimsExtractor::unverified().extract(&token).unwrap();

    // Then
    assert_eq!(claims.tenant_id, "t>>>?");
    assert_eq!(claims.email, "a@b.com");
}

#[test]
fn given_non_ascii_tenant_when_extracted_then_invalid_claim() {
    let token = unsigned_token(&json!({ "custom:tenantId": "ténant-1" }));

    let result = ClaimsExtractor::unverified().extract(&token);

    assert!(matches!(
        result,
        Err(AuthError::InvalidClaim { claim: "custom:tenantId", .. })
    ));
}

#[test]
fn given_tenant_with_whitespace_when_extracted_then_invalid_claim() {
    let token = unsigned_token(&json!({ "custom:tenantId": "tenant 1\n" }));

    let result = ClaimsExtractor::unverified().extract(&token);

    assert!(matches!(result, Err(AuthError::InvalidClaim { .. })));
}
