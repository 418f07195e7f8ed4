// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use overtime_web::api::ApiError;
use overtime_web::error::AppError;
use reqwest::Method;

fn status_error(status: StatusCode, body: &str) -> ApiError {
    ApiError::Status {
        method: Method::GET,
        url: "http://backend/api/tournaments/apertura".to_string(),
        status,
        body: body.to_string(),
    }
}

#[test]
fn test_not_found_keeps_backend_message() {
    let api_err = status_error(StatusCode::NOT_FOUND, r#"{"message":"Tournament not found"}"#);
    assert!(api_err.is_not_found());

    let err = AppError::from(api_err);
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Tournament not found"));
}

#[test]
fn test_unauthorized_maps_to_unauthorized() {
    let err = AppError::from(status_error(StatusCode::UNAUTHORIZED, ""));
    assert!(matches!(err, AppError::Unauthorized));
    assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn test_client_errors_pass_through() {
    let err = AppError::from(status_error(
        StatusCode::BAD_REQUEST,
        r#"{"message":["slug must be a string"]}"#,
    ));
    match &err {
        AppError::Upstream { status, message } => {
            assert_eq!(*status, StatusCode::BAD_REQUEST);
            assert_eq!(message, "slug must be a string");
        }
        other => panic!("unexpected mapping: {other:?}"),
    }
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_server_errors_become_bad_gateway() {
    for status in [
        StatusCode::INTERNAL_SERVER_ERROR,
        StatusCode::SERVICE_UNAVAILABLE,
    ] {
        let err = AppError::from(status_error(status, "oops"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}

#[test]
fn test_decode_errors_become_bad_gateway() {
    let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let err = AppError::from(ApiError::Decode {
        method: Method::GET,
        url: "http://backend/api/tournaments".to_string(),
        source,
    });
    assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
}
