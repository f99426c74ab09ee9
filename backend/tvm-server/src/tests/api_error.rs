use super::body_json;
use crate::ApiError;
use crate::api::error::{FORBIDDEN_MESSAGE, UNAUTHORIZED_MESSAGE, UNAVAILABLE_MESSAGE};

use tvm_auth::AuthError;
use tvm_vending::VendingError;

use std::panic::Location;

use axum::response::IntoResponse;
use error_location::ErrorLocation;
use http::StatusCode;

fn here() -> ErrorLocation {
    ErrorLocation::from(Location::caller())
}

#[tokio::test]
async fn given_unauthorized_when_rendered_then_generic_401_body() {
    // Given
    let error = ApiError::unauthorized("INVALID_SIGNATURE");

    // When
    let response = error.into_response();

    // Then
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    assert_eq!(json["error"]["message"], UNAUTHORIZED_MESSAGE);
    assert!(!json.to_string().contains("INVALID_SIGNATURE"));
}

#[tokio::test]
async fn given_service_unavailable_when_rendered_then_detail_not_returned() {
    // Given
    let error = ApiError::ServiceUnavailable {
        code: "ASSUME_ROLE_FAILED",
        detail: "AccessDenied for arn:aws:iam::123456789012:role/tenant-abac".into(),
        location: here(),
    };

    // When
    let response = error.into_response();

    // Then
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "ASSUME_ROLE_FAILED");
    assert_eq!(json["error"]["message"], UNAVAILABLE_MESSAGE);
    assert!(!json.to_string().contains("arn:aws"));
}

#[tokio::test]
async fn given_forbidden_when_rendered_then_403() {
    // Given
    let error = ApiError::Forbidden {
        reason: "TENANT_MISMATCH",
        location: here(),
    };

    // When
    let response = error.into_response();

    // Then
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], FORBIDDEN_MESSAGE);
}

#[tokio::test]
async fn given_timeout_when_rendered_then_408() {
    // Given
    let error = ApiError::RequestTimeout { location: here() };

    // When
    let response = error.into_response();

    // Then
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "REQUEST_TIMEOUT");
}

#[test]
fn given_token_rejections_when_converted_then_unauthorized() {
    let rejections = [
        AuthError::MalformedToken {
            segments: 2,
            location: here(),
        },
        AuthError::MissingTenant { location: here() },
        AuthError::TokenExpired { location: here() },
        AuthError::MissingHeader { location: here() },
        AuthError::InvalidScheme { location: here() },
        AuthError::InvalidSignature {
            reason: "signature mismatch",
            location: here(),
        },
    ];

    for rejection in rejections {
        // When
        let error = ApiError::from(rejection);

        // Then
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    }
}

#[test]
fn given_key_material_failure_when_converted_then_unavailable() {
    // Given
    let failure = AuthError::KeyMaterial {
        message: "no usable keys".into(),
        location: here(),
    };

    // When
    let error = ApiError::from(failure);

    // Then
    assert_eq!(error.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[test]
fn given_vending_errors_when_converted_then_status_by_kind() {
    let cases = [
        (
            VendingError::TenantMismatch { location: here() },
            StatusCode::FORBIDDEN,
        ),
        (VendingError::config("no role"), StatusCode::SERVICE_UNAVAILABLE),
        (
            VendingError::credential_unavailable("exchange failed"),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (
            VendingError::Throttled { location: here() },
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (
            VendingError::InvalidDuration {
                duration_secs: 60,
                min_secs: 900,
                max_secs: 43_200,
                location: here(),
            },
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            VendingError::Auth(AuthError::MissingTenant { location: here() }),
            StatusCode::UNAUTHORIZED,
        ),
    ];

    for (vending, expected) in cases {
        // When
        let error = ApiError::from(vending);

        // Then
        assert_eq!(error.status(), expected);
    }
}
