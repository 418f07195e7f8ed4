// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth start and callback tests.
//!
//! The callback redirects to `{origin}{next}` in development, where the
//! origin is always `http`. In production behind a proxy it goes to
//! `https://{x-forwarded-host}{next}`. Without a usable code it goes to the
//! error page.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use overtime_web::config::Environment;
use overtime_web::services::identity::pkce;
use overtime_web::session::cookies::{CODE_VERIFIER_COOKIE, SESSION_COOKIE};
use tower::ServiceExt;

mod common;

use common::{create_test_app, find_cookie, location, set_cookie_headers, TestApp, UNREACHABLE_API};

/// A verifier and a code bound to it for the default user.
fn pending_login(app: &TestApp) -> (String, String) {
    let verifier = pkce::generate_verifier().unwrap();
    let code = app
        .identity
        .issue_code("dev-user", &pkce::challenge(&verifier))
        .unwrap();
    (verifier, code)
}

async fn callback(
    app: &TestApp,
    query: &str,
    host: &str,
    forwarded_host: Option<&str>,
    verifier: Option<&str>,
) -> Response {
    let mut request = Request::builder()
        .uri(format!("/auth/callback{query}"))
        .header(header::HOST, host);
    if let Some(forwarded) = forwarded_host {
        request = request.header("x-forwarded-host", forwarded);
    }
    if let Some(verifier) = verifier {
        request = request.header(header::COOKIE, format!("{CODE_VERIFIER_COOKIE}={verifier}"));
    }

    app.router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_development_redirects_to_request_origin() {
    let app = create_test_app(UNREACHABLE_API, Environment::Development);
    let (verifier, code) = pending_login(&app);

    let response = callback(
        &app,
        &format!("?code={code}&next=/torneos"),
        "localhost:3000",
        Some("overtime.example"),
        Some(&verifier),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://localhost:3000/torneos");

    let cookies = set_cookie_headers(&response);
    let session = find_cookie(&cookies, SESSION_COOKIE);
    assert!(!session.starts_with(&format!("{SESSION_COOKIE}=;")));
    assert!(session.contains("HttpOnly"));
    assert!(find_cookie(&cookies, CODE_VERIFIER_COOKIE).contains("Max-Age=0"));
}

#[tokio::test]
async fn test_development_lan_host_stays_http() {
    let app = create_test_app(UNREACHABLE_API, Environment::Development);
    let (verifier, code) = pending_login(&app);

    let response = callback(
        &app,
        &format!("?code={code}&next=/torneos"),
        "192.168.1.20:3000",
        None,
        Some(&verifier),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://192.168.1.20:3000/torneos");
}

#[tokio::test]
async fn test_production_honors_forwarded_proto() {
    let app = create_test_app(UNREACHABLE_API, Environment::Production);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/callback?next=/torneos")
                .header(header::HOST, "overtime.internal:8080")
                .header("x-forwarded-proto", "http")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        location(&response),
        "http://overtime.internal:8080/auth/error"
    );
}

#[tokio::test]
async fn test_production_prefers_forwarded_host() {
    let app = create_test_app(UNREACHABLE_API, Environment::Production);
    let (verifier, code) = pending_login(&app);

    let response = callback(
        &app,
        &format!("?code={code}&next=/torneos/apertura-2026"),
        "overtime-web-abc123.run.app",
        Some("overtime.example"),
        Some(&verifier),
    )
    .await;

    assert_eq!(
        location(&response),
        "https://overtime.example/torneos/apertura-2026"
    );
    let session = find_cookie(&set_cookie_headers(&response), SESSION_COOKIE);
    assert!(session.contains("Secure"));
}

#[tokio::test]
async fn test_production_without_forwarded_host_uses_origin() {
    let app = create_test_app(UNREACHABLE_API, Environment::Production);
    let (verifier, code) = pending_login(&app);

    let response = callback(
        &app,
        &format!("?code={code}"),
        "overtime-web-abc123.run.app",
        None,
        Some(&verifier),
    )
    .await;

    assert_eq!(location(&response), "https://overtime-web-abc123.run.app/");
}

#[tokio::test]
async fn test_missing_code_goes_to_error_page() {
    for environment in [Environment::Development, Environment::Production] {
        let app = create_test_app(UNREACHABLE_API, environment);

        let response = callback(&app, "?next=/torneos", "localhost:3000", None, None).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "http://localhost:3000/auth/error");
        assert!(set_cookie_headers(&response)
            .iter()
            .all(|c| !c.starts_with(SESSION_COOKIE)));
    }
}

#[tokio::test]
async fn test_invalid_code_goes_to_error_page() {
    let app = create_test_app(UNREACHABLE_API, Environment::Production);
    let (verifier, _) = pending_login(&app);

    let response = callback(
        &app,
        "?code=forged",
        "overtime.example",
        Some("overtime.example"),
        Some(&verifier),
    )
    .await;

    assert_eq!(location(&response), "https://overtime.example/auth/error");
}

#[tokio::test]
async fn test_code_without_verifier_goes_to_error_page() {
    let app = create_test_app(UNREACHABLE_API, Environment::Development);
    let (_, code) = pending_login(&app);

    let response = callback(&app, &format!("?code={code}"), "localhost:3000", None, None).await;

    assert_eq!(location(&response), "http://localhost:3000/auth/error");
}

#[tokio::test]
async fn test_replayed_code_goes_to_error_page() {
    let app = create_test_app(UNREACHABLE_API, Environment::Development);
    let (verifier, code) = pending_login(&app);
    let query = format!("?code={code}&next=/torneos");

    let first = callback(&app, &query, "localhost:3000", None, Some(&verifier)).await;
    assert_eq!(location(&first), "http://localhost:3000/torneos");

    let replay = callback(&app, &query, "localhost:3000", None, Some(&verifier)).await;
    assert_eq!(location(&replay), "http://localhost:3000/auth/error");
}

#[tokio::test]
async fn test_external_next_is_not_followed() {
    let app = create_test_app(UNREACHABLE_API, Environment::Development);
    let (verifier, code) = pending_login(&app);

    let response = callback(
        &app,
        &format!("?code={code}&next=//evil.example"),
        "localhost:3000",
        None,
        Some(&verifier),
    )
    .await;

    assert_eq!(location(&response), "http://localhost:3000/");
}

#[tokio::test]
async fn test_authorize_sets_verifier_and_redirects_to_provider() {
    let app = create_test_app(UNREACHABLE_API, Environment::Development);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/authorize?provider=google&next=/torneos")
                .header(header::HOST, "localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    // The mock provider consents immediately and comes straight back
    assert!(location(&response)
        .starts_with("http://localhost:3000/auth/callback?next=%2Ftorneos&code="));

    let verifier = find_cookie(&set_cookie_headers(&response), CODE_VERIFIER_COOKIE);
    assert!(verifier.contains("Path=/auth"));
    assert!(verifier.contains("HttpOnly"));
    assert!(verifier.contains("Max-Age=600"));
}
