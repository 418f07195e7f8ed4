// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::response::Response;
use overtime_web::config::{Config, Environment};
use overtime_web::models::Session;
use overtime_web::routes::create_router;
use overtime_web::services::identity::MockIdentityProvider;
use overtime_web::session::cookies::{encode_session, SESSION_COOKIE};
use overtime_web::AppState;
use std::sync::Arc;

/// Backend address nothing listens on.
#[allow(dead_code)]
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9";

/// Test app with the in-memory identity provider.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub identity: Arc<MockIdentityProvider>,
}

#[allow(dead_code)]
pub fn test_config(api_url: &str, environment: Environment) -> Config {
    Config {
        api_url: api_url.to_string(),
        environment,
        ..Config::default()
    }
}

/// Create a test app talking to the backend at `api_url`.
#[allow(dead_code)]
pub fn create_test_app(api_url: &str, environment: Environment) -> TestApp {
    let identity = Arc::new(MockIdentityProvider::with_secret(b"integration-test-secret"));
    let state = Arc::new(
        AppState::new(test_config(api_url, environment), identity.clone())
            .expect("Failed to build app state"),
    );

    TestApp {
        router: create_router(state.clone()),
        state,
        identity,
    }
}

/// Serve a test app on an ephemeral local port. Returns its origin.
#[allow(dead_code)]
pub async fn spawn_app(api_url: &str) -> (String, Arc<MockIdentityProvider>) {
    let app = create_test_app(api_url, Environment::Development);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app.router).await.ok();
    });

    (format!("http://{}", addr), app.identity)
}

/// `Cookie` header value carrying `session`.
#[allow(dead_code)]
pub fn session_cookie_header(session: &Session) -> String {
    format!("{}={}", SESSION_COOKIE, encode_session(session).unwrap())
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

#[allow(dead_code)]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(axum::http::header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Backend profile for the mock provider's default user.
#[allow(dead_code)]
pub fn profile_json() -> serde_json::Value {
    serde_json::json!({
        "id": "profile-1",
        "supabaseUserId": "dev-user",
        "email": "dev@overtime.local",
        "name": "Dev User",
        "roles": ["player"],
        "hasPlayerProfile": false
    })
}

/// Two tournaments, one hidden, plus a hidden category and zone.
#[allow(dead_code)]
pub fn tournaments_json() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "t1",
            "name": "Apertura 2026",
            "slug": "apertura-2026",
            "categories": [
                {
                    "id": "c1",
                    "name": "Libre",
                    "slug": "libre",
                    "zones": [
                        {"id": "z1", "name": "Zona A", "slug": "zona-a", "teams": []},
                        {"id": "z2", "name": "Zona B", "slug": "zona-b", "hidden": true}
                    ]
                },
                {"id": "c2", "name": "Veteranos", "slug": "veteranos", "hidden": true}
            ]
        },
        {
            "id": "t2",
            "name": "Clausura 2026",
            "slug": "clausura-2026",
            "hidden": true,
            "categories": []
        }
    ])
}
