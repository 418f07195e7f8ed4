// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email and password sign-in form tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use overtime_web::config::Environment;
use overtime_web::models::User;
use overtime_web::session::cookies::SESSION_COOKIE;
use tower::ServiceExt;

mod common;

use common::{create_test_app, find_cookie, location, set_cookie_headers, TestApp, UNREACHABLE_API};

fn app_with_ana() -> TestApp {
    let app = create_test_app(UNREACHABLE_API, Environment::Development);
    app.identity.register_password_user(
        User {
            id: "ana".to_string(),
            email: Some("ana@example.com".to_string()),
            app_metadata: serde_json::json!({}),
            user_metadata: serde_json::json!({}),
        },
        "secret",
    );
    app
}

async fn submit(app: &TestApp, form: &str) -> Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::HOST, "localhost:3000")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

fn has_session_cookie(response: &Response) -> bool {
    let cleared = format!("{SESSION_COOKIE}=;");
    set_cookie_headers(response)
        .iter()
        .any(|c| c.starts_with(&format!("{SESSION_COOKIE}=")) && !c.starts_with(&cleared))
}

#[tokio::test]
async fn test_login_sets_session_and_follows_next() {
    let app = app_with_ana();

    let response = submit(
        &app,
        "email=ana%40example.com&password=secret&next=%2Ftorneos",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/torneos");

    let session = find_cookie(&set_cookie_headers(&response), SESSION_COOKIE);
    assert!(!session.starts_with(&format!("{SESSION_COOKIE}=;")));
    assert!(session.contains("HttpOnly"));
    assert_eq!(app.identity.active_refresh_tokens(), 1);
}

#[tokio::test]
async fn test_login_trims_email() {
    let app = app_with_ana();

    let response = submit(&app, "email=+ana%40example.com+&password=secret").await;

    assert_eq!(location(&response), "/");
    assert!(has_session_cookie(&response));
}

#[tokio::test]
async fn test_wrong_password_returns_to_login() {
    let app = app_with_ana();

    let response = submit(
        &app,
        "email=ana%40example.com&password=nope&next=%2Ftorneos",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login?error=invalid_credentials");
    assert!(!has_session_cookie(&response));
    assert_eq!(app.identity.active_refresh_tokens(), 0);
}

#[tokio::test]
async fn test_unknown_email_returns_to_login() {
    let app = app_with_ana();

    let response = submit(&app, "email=bob%40example.com&password=secret").await;

    assert_eq!(location(&response), "/auth/login?error=invalid_credentials");
    assert!(!has_session_cookie(&response));
}

#[tokio::test]
async fn test_external_next_falls_back_to_root() {
    let app = app_with_ana();

    let response = submit(
        &app,
        "email=ana%40example.com&password=secret&next=%2F%2Fevil.example",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(has_session_cookie(&response));
}
