// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request/response interception points of the API client.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use std::sync::Arc;

use super::error::ApiError;

/// Page every unauthorized browser-side call is sent to.
pub const LOGIN_PATH: &str = "/auth/login";

/// Where the bearer token for outgoing requests comes from.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Access token of the current session, `None` when anonymous.
    async fn access_token(&self) -> anyhow::Result<Option<String>>;
}

/// Browser navigation (`window.location.href = ...`).
pub trait Navigator: Send + Sync {
    fn assign(&self, href: &str);
}

/// Runs before every request is sent.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn on_request(&self, request: reqwest::Request) -> reqwest::Request;
}

/// Runs on every failed response before the error reaches the caller.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn on_error(&self, error: &ApiError);
}

/// Attaches `Authorization: Bearer <token>` from the current session.
///
/// A session that cannot be resolved never blocks the request; it goes out
/// unauthenticated.
pub struct BearerAuth {
    source: Arc<dyn TokenSource>,
}

impl BearerAuth {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl RequestInterceptor for BearerAuth {
    async fn on_request(&self, mut request: reqwest::Request) -> reqwest::Request {
        let token = match self.source.access_token().await {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => return request,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    url = %request.url(),
                    "Failed to resolve session, sending request unauthenticated"
                );
                return request;
            }
        };

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("Access token is not a valid header value, skipping"),
        }
        request
    }
}

/// Forces a full navigation to the login page on any 401.
///
/// Does not tell expired tokens from missing permissions and never tries a
/// silent refresh first.
pub struct LoginRedirect {
    navigator: Arc<dyn Navigator>,
}

impl LoginRedirect {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }
}

#[async_trait]
impl ResponseInterceptor for LoginRedirect {
    async fn on_error(&self, error: &ApiError) {
        if error.is_unauthorized() {
            tracing::info!(error = %error, "Unauthorized response, redirecting to login");
            self.navigator.assign(LOGIN_PATH);
        }
    }
}
