// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory identity provider for local development and tests.
//!
//! Issues HS256 JWT access tokens, single-use PKCE-bound authorization codes
//! and rotating refresh tokens. `authorize_url` consents immediately on
//! behalf of the default development user.

use async_trait::async_trait;
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use super::pkce;
use super::{AuthGrant, IdentityError, IdentityProvider, OAuthProvider};
use crate::models::{Session, User};

const DEFAULT_ACCESS_TTL_SECS: i64 = 3600;

/// Unexchanged codes expire with the code verifier cookie.
const CODE_TTL_SECS: i64 = 600;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    session_id: String,
    iat: i64,
    exp: i64,
}

struct PendingCode {
    user_id: String,
    code_challenge: String,
    issued_at: i64,
}

struct RefreshEntry {
    user_id: String,
    session_id: String,
}

pub struct MockIdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    default_user_id: String,
    users: DashMap<String, User>,
    passwords: DashMap<String, (String, String)>,
    codes: DashMap<String, PendingCode>,
    refresh_tokens: DashMap<String, RefreshEntry>,
    /// Revoked session id to the time its last access token expires.
    revoked_sessions: DashMap<String, i64>,
}

impl MockIdentityProvider {
    /// Provider with a random signing secret.
    pub fn new() -> anyhow::Result<Self> {
        let secret = pkce::random_token(32)?;
        Ok(Self::with_secret(secret.as_bytes()))
    }

    pub fn with_secret(secret: &[u8]) -> Self {
        let default_user = User {
            id: "dev-user".to_string(),
            email: Some("dev@overtime.local".to_string()),
            app_metadata: serde_json::json!({ "provider": "google" }),
            user_metadata: serde_json::json!({ "full_name": "Dev User" }),
        };

        let users = DashMap::new();
        let default_user_id = default_user.id.clone();
        users.insert(default_user.id.clone(), default_user);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            default_user_id,
            users,
            passwords: DashMap::new(),
            codes: DashMap::new(),
            refresh_tokens: DashMap::new(),
            revoked_sessions: DashMap::new(),
        }
    }

    /// Lifetime of issued access tokens; non-positive values issue sessions
    /// that are already expired.
    pub fn with_access_ttl(mut self, secs: i64) -> Self {
        self.access_ttl_secs = secs;
        self
    }

    /// User that `authorize_url` signs in.
    pub fn add_user(&self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn register_password_user(&self, user: User, password: &str) {
        if let Some(email) = user.email.clone() {
            self.passwords
                .insert(email, (user.id.clone(), password.to_string()));
        }
        self.add_user(user);
    }

    /// Single-use authorization code for `user_id`, bound to `code_challenge`.
    pub fn issue_code(&self, user_id: &str, code_challenge: &str) -> anyhow::Result<String> {
        let code = pkce::random_token(16)?;
        let now = chrono::Utc::now().timestamp();
        self.codes
            .retain(|_, pending| now - pending.issued_at < CODE_TTL_SECS);
        self.codes.insert(
            code.clone(),
            PendingCode {
                user_id: user_id.to_string(),
                code_challenge: code_challenge.to_string(),
                issued_at: now,
            },
        );
        Ok(code)
    }

    /// Issue a session directly, bypassing any grant flow.
    pub fn issue_session(&self, user_id: &str) -> Result<AuthGrant, IdentityError> {
        let user = self.user(user_id)?;
        let session_id =
            pkce::random_token(16).map_err(|e| IdentityError::Transport(e.to_string()))?;
        self.grant(user, session_id)
    }

    pub fn active_refresh_tokens(&self) -> usize {
        self.refresh_tokens.len()
    }

    pub fn pending_codes(&self) -> usize {
        self.codes.len()
    }

    fn is_revoked(&self, session_id: &str) -> bool {
        self.revoked_sessions.contains_key(session_id)
    }

    fn user(&self, user_id: &str) -> Result<User, IdentityError> {
        self.users
            .get(user_id)
            .map(|u| u.clone())
            .ok_or_else(|| IdentityError::Rejected(format!("unknown user {user_id}")))
    }

    fn grant(&self, user: User, session_id: String) -> Result<AuthGrant, IdentityError> {
        let now = chrono::Utc::now().timestamp();
        let expires_at = now + self.access_ttl_secs;

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            session_id: session_id.clone(),
            iat: now,
            exp: expires_at,
        };
        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| IdentityError::Malformed(e.to_string()))?;
        let refresh_token =
            pkce::random_token(24).map_err(|e| IdentityError::Transport(e.to_string()))?;

        self.refresh_tokens.insert(
            refresh_token.clone(),
            RefreshEntry {
                user_id: user.id.clone(),
                session_id,
            },
        );

        Ok(AuthGrant {
            session: Session {
                access_token,
                refresh_token: Some(refresh_token),
                token_type: "bearer".to_string(),
                expires_at,
            },
            user,
        })
    }

    fn decode_claims(&self, token: &str, validate_exp: bool) -> Result<Claims, IdentityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = validate_exp;
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| IdentityError::Rejected(format!("invalid JWT: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn authorize_url(
        &self,
        _provider: OAuthProvider,
        redirect_to: &str,
        code_challenge: &str,
    ) -> String {
        let separator = if redirect_to.contains('?') { '&' } else { '?' };
        match self.issue_code(&self.default_user_id, code_challenge) {
            Ok(code) => format!("{redirect_to}{separator}code={code}"),
            Err(e) => {
                tracing::error!(error = %e, "Mock provider failed to issue code");
                format!("{redirect_to}{separator}error=server_error")
            }
        }
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthGrant, IdentityError> {
        let (_, pending) = self
            .codes
            .remove(code)
            .ok_or_else(|| IdentityError::Rejected("invalid or already used code".to_string()))?;

        if chrono::Utc::now().timestamp() - pending.issued_at >= CODE_TTL_SECS {
            return Err(IdentityError::Rejected("code expired".to_string()));
        }

        let expected = pending.code_challenge.as_bytes();
        let actual = pkce::challenge(code_verifier);
        if !bool::from(actual.as_bytes().ct_eq(expected)) {
            return Err(IdentityError::Rejected("code verifier mismatch".to_string()));
        }

        self.issue_session(&pending.user_id)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthGrant, IdentityError> {
        let user_id = self
            .passwords
            .get(email)
            .filter(|entry| bool::from(entry.1.as_bytes().ct_eq(password.as_bytes())))
            .map(|entry| entry.0.clone())
            .ok_or_else(|| IdentityError::Rejected("Invalid login credentials".to_string()))?;

        self.issue_session(&user_id)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthGrant, IdentityError> {
        let (_, entry) = self
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| IdentityError::Rejected("Invalid Refresh Token".to_string()))?;

        if self.is_revoked(&entry.session_id) {
            return Err(IdentityError::Rejected("session revoked".to_string()));
        }

        let user = self.user(&entry.user_id)?;
        self.grant(user, entry.session_id)
    }

    async fn get_user(&self, access_token: &str) -> Result<User, IdentityError> {
        let claims = self.decode_claims(access_token, true)?;
        if self.is_revoked(&claims.session_id) {
            return Err(IdentityError::Rejected("session revoked".to_string()));
        }
        self.user(&claims.sub)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let claims = self.decode_claims(access_token, false)?;
        self.refresh_tokens
            .retain(|_, entry| entry.session_id != claims.session_id);

        // Tokens of the session stop validating once they expire on their
        // own, so the revocation entry only has to outlive them
        let now = chrono::Utc::now().timestamp();
        self.revoked_sessions.retain(|_, until| *until > now);
        self.revoked_sessions
            .insert(claims.session_id, now + self.access_ttl_secs.max(0));
        Ok(())
    }
}
