// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase Auth (GoTrue) REST client.
//!
//! Handles:
//! - PKCE code exchange after the OAuth redirect
//! - Password sign-in
//! - Refresh-token rotation
//! - Token validation (`/user`) and revocation (`/logout`)

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::{AuthGrant, IdentityError, IdentityProvider, OAuthProvider};
use crate::models::{Session, User};

/// GoTrue client bound to one Supabase project.
#[derive(Clone)]
pub struct GoTrueProvider {
    http: reqwest::Client,
    auth_url: String,
    anon_key: String,
}

impl GoTrueProvider {
    pub fn new(supabase_url: &str, anon_key: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed building identity provider HTTP client")?;

        Ok(Self {
            http,
            auth_url: format!("{}/auth/v1", supabase_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        })
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<AuthGrant, IdentityError> {
        let response = self
            .http
            .post(format!("{}/token", self.auth_url))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let token: TokenResponse = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| IdentityError::Malformed(e.to_string()))?;

        Ok(token.into_grant(chrono::Utc::now().timestamp()))
    }
}

#[async_trait]
impl IdentityProvider for GoTrueProvider {
    fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        code_challenge: &str,
    ) -> String {
        format!(
            "{}/authorize?\
             provider={}&\
             redirect_to={}&\
             code_challenge={}&\
             code_challenge_method=s256",
            self.auth_url,
            provider.as_str(),
            urlencoding::encode(redirect_to),
            urlencoding::encode(code_challenge)
        )
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthGrant, IdentityError> {
        self.token_grant(
            "pkce",
            serde_json::json!({ "auth_code": code, "code_verifier": code_verifier }),
        )
        .await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthGrant, IdentityError> {
        self.token_grant(
            "password",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthGrant, IdentityError> {
        self.token_grant(
            "refresh_token",
            serde_json::json!({ "refresh_token": refresh_token }),
        )
        .await
    }

    async fn get_user(&self, access_token: &str) -> Result<User, IdentityError> {
        let response = self
            .http
            .get(format!("{}/user", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| IdentityError::Malformed(e.to_string()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .http
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        check_response(response).await?;
        Ok(())
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    user: User,
}

impl TokenResponse {
    fn into_grant(self, now: i64) -> AuthGrant {
        AuthGrant {
            session: Session {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
                token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
                expires_at: self.expires_at.unwrap_or(now + self.expires_in),
            },
            user: self.user,
        }
    }
}

/// Map non-success responses: 4xx means the provider refused, anything else
/// is treated as the provider being unavailable.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or(body);

    if status.is_client_error() {
        Err(IdentityError::Rejected(message))
    } else {
        Err(IdentityError::Transport(format!("HTTP {}: {}", status, message)))
    }
}

fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
