// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cookie-backed session store operations for the current request.

use async_trait::async_trait;

use super::context::RequestContext;
use super::cookies::{
    code_verifier_cookie, decode_session, session_cookie, CODE_VERIFIER_COOKIE, SESSION_COOKIE,
};
use super::SessionError;
use crate::api::TokenSource;
use crate::models::{Session, User};
use crate::services::identity::{pkce, AuthGrant, IdentityError, OAuthProvider};

/// Session of the current request, refreshing it first when expired.
///
/// Fails only when no request context is installed or the identity provider
/// cannot be reached; every other problem resolves to `None`.
pub async fn try_get_session() -> Result<Option<Session>, SessionError> {
    let context = RequestContext::current()?;
    load_session(&context).await
}

/// Session of the current request; anonymous on any failure.
pub async fn get_session() -> Option<Session> {
    match try_get_session().await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to resolve session, treating request as anonymous");
            None
        }
    }
}

/// User behind the current session, validated with the identity provider.
pub async fn get_user() -> Option<User> {
    let context = RequestContext::current().ok()?;
    let session = get_session().await?;

    match context.identity().get_user(&session.access_token).await {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to resolve user for session");
            None
        }
    }
}

/// Exchange an OAuth authorization code using the verifier stored by
/// [`begin_oauth`]. The verifier cookie is consumed whatever the outcome.
pub async fn exchange_code_for_session(code: &str) -> Result<AuthGrant, SessionError> {
    let context = RequestContext::current()?;
    let verifier = context
        .cookie(CODE_VERIFIER_COOKIE)
        .ok_or(SessionError::MissingCodeVerifier)?;
    context.remove_cookie(CODE_VERIFIER_COOKIE);

    let grant = context
        .identity()
        .exchange_code_for_session(code, &verifier)
        .await?;
    store_session(&context, &grant.session)?;

    tracing::info!(user_id = %grant.user.id, "Session established from OAuth code");
    Ok(grant)
}

pub async fn sign_in_with_password(email: &str, password: &str) -> Result<AuthGrant, SessionError> {
    let context = RequestContext::current()?;
    let grant = context
        .identity()
        .sign_in_with_password(email, password)
        .await?;
    store_session(&context, &grant.session)?;

    tracing::info!(user_id = %grant.user.id, "Session established from password sign-in");
    Ok(grant)
}

/// Start an OAuth flow: store a fresh PKCE verifier and return the provider
/// URL to send the browser to.
pub fn begin_oauth(provider: OAuthProvider, redirect_to: &str) -> Result<String, SessionError> {
    let context = RequestContext::current()?;
    let verifier =
        pkce::generate_verifier().map_err(|e| SessionError::Entropy(e.to_string()))?;

    context.set_cookie(code_verifier_cookie(&verifier, context.secure_cookies()));
    Ok(context
        .identity()
        .authorize_url(provider, redirect_to, &pkce::challenge(&verifier)))
}

/// Revoke the current session with the provider and clear the cookie.
///
/// Revocation is best effort; the cookie is cleared even when it fails.
pub async fn sign_out() -> Result<(), SessionError> {
    let context = RequestContext::current()?;
    let _guard = context.session_lock.lock().await;

    if let Some(session) = context.cookie(SESSION_COOKIE).and_then(|v| decode_session(&v)) {
        if let Err(e) = context.identity().sign_out(&session.access_token).await {
            tracing::warn!(error = %e, "Failed to revoke session with identity provider");
        }
    }

    context.remove_cookie(SESSION_COOKIE);
    Ok(())
}

async fn load_session(context: &RequestContext) -> Result<Option<Session>, SessionError> {
    let _guard = context.session_lock.lock().await;

    let Some(value) = context.cookie(SESSION_COOKIE) else {
        return Ok(None);
    };

    let Some(session) = decode_session(&value) else {
        tracing::warn!("Discarding undecodable session cookie");
        context.remove_cookie(SESSION_COOKIE);
        return Ok(None);
    };

    if !session.is_expired() {
        return Ok(Some(session));
    }

    let Some(refresh_token) = session.refresh_token.as_deref() else {
        context.remove_cookie(SESSION_COOKIE);
        return Ok(None);
    };

    match context.identity().refresh_session(refresh_token).await {
        Ok(grant) => {
            store_session(context, &grant.session)?;
            tracing::debug!(user_id = %grant.user.id, "Session refreshed");
            Ok(Some(grant.session))
        }
        Err(IdentityError::Rejected(reason)) => {
            tracing::info!(reason = %reason, "Refresh token rejected, clearing session");
            context.remove_cookie(SESSION_COOKIE);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn store_session(context: &RequestContext, session: &Session) -> Result<(), SessionError> {
    context.set_cookie(session_cookie(session, context.secure_cookies())?);
    Ok(())
}

/// Bearer tokens for server-side API calls, taken from the request being handled.
pub struct RequestSessionTokens;

#[async_trait]
impl TokenSource for RequestSessionTokens {
    async fn access_token(&self) -> anyhow::Result<Option<String>> {
        Ok(try_get_session().await?.map(|session| session.access_token))
    }
}
