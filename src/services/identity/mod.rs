// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider boundary.
//!
//! The provider owns accounts, OAuth and token issuance. This application
//! only exchanges codes, refreshes and revokes sessions, and asks who a
//! token belongs to.

pub mod gotrue;
pub mod mock;
pub mod pkce;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::models::{Session, User};

pub use gotrue::GoTrueProvider;
pub use mock::MockIdentityProvider;

/// Identity provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    /// The provider refused the grant or token (invalid code, revoked token, ...).
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),

    #[error("identity provider unavailable: {0}")]
    Transport(String),

    #[error("malformed identity provider response: {0}")]
    Malformed(String),
}

/// External OAuth providers users can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    #[default]
    Google,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
        }
    }
}

/// A freshly issued session together with its user.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub session: Session,
    pub user: User,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL that starts the provider's OAuth flow and comes back to `redirect_to`.
    fn authorize_url(&self, provider: OAuthProvider, redirect_to: &str, code_challenge: &str)
        -> String;

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthGrant, IdentityError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthGrant, IdentityError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthGrant, IdentityError>;

    /// Validate `access_token` with the provider and return its user.
    async fn get_user(&self, access_token: &str) -> Result<User, IdentityError>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

/// Build the identity provider selected by `IDENTITY_PROVIDER`.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn IdentityProvider>> {
    match config.identity_provider.as_str() {
        "supabase" => {
            tracing::info!(url = %config.supabase_url, "Using Supabase identity provider");
            Ok(Arc::new(GoTrueProvider::new(
                &config.supabase_url,
                &config.supabase_anon_key,
            )?))
        }
        "mock" => {
            tracing::warn!("Using in-memory mock identity provider (development only)");
            Ok(Arc::new(MockIdentityProvider::new()?))
        }
        other => anyhow::bail!(
            "Unknown identity provider: {}. Supported providers: supabase, mock",
            other
        ),
    }
}
