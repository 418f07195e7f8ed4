// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth cookie attribute tests.
//!
//! These tests verify cookie removal attributes on sign-out match the
//! creation attributes for localhost and production deployments.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use overtime_web::config::Environment;
use overtime_web::services::IdentityProvider;
use overtime_web::session::cookies::SESSION_COOKIE;
use tower::ServiceExt;

mod common;

use common::{
    create_test_app, find_cookie, session_cookie_header, set_cookie_headers, TestApp,
    UNREACHABLE_API,
};

async fn sign_out(app: &TestApp, cookie: Option<String>) -> Response {
    let mut request = Request::builder().method("POST").uri("/auth/signout");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_sign_out_cookie_removal_localhost_attributes() {
    let app = create_test_app(UNREACHABLE_API, Environment::Development);
    let session = app.identity.issue_session("dev-user").unwrap().session;

    let response = sign_out(&app, Some(session_cookie_header(&session))).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let cookie = find_cookie(&set_cookie_headers(&response), SESSION_COOKIE);
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=;")));
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_sign_out_cookie_removal_production_attributes() {
    let app = create_test_app(UNREACHABLE_API, Environment::Production);
    let session = app.identity.issue_session("dev-user").unwrap().session;

    let response = sign_out(&app, Some(session_cookie_header(&session))).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let cookie = find_cookie(&set_cookie_headers(&response), SESSION_COOKIE);
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Secure"));
}

#[tokio::test]
async fn test_sign_out_revokes_session() {
    let app = create_test_app(UNREACHABLE_API, Environment::Development);
    let grant = app.identity.issue_session("dev-user").unwrap();

    sign_out(&app, Some(session_cookie_header(&grant.session))).await;

    assert!(app
        .identity
        .get_user(&grant.session.access_token)
        .await
        .is_err());
    assert_eq!(app.identity.active_refresh_tokens(), 0);
}

#[tokio::test]
async fn test_sign_out_without_session_still_clears_cookie() {
    let app = create_test_app(UNREACHABLE_API, Environment::Development);

    let response = sign_out(&app, None).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = find_cookie(&set_cookie_headers(&response), SESSION_COOKIE);
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_undecodable_session_cookie_is_cleared() {
    let app = create_test_app(UNREACHABLE_API, Environment::Development);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/session")
                .header(header::COOKIE, format!("{SESSION_COOKIE}=garbage"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = find_cookie(&set_cookie_headers(&response), SESSION_COOKIE);
    assert!(cookie.contains("Max-Age=0"));
}
