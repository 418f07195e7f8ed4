// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side session handling: cookie storage, the per-request context,
//! and resolution of the signed-in user and profile for a render.

pub mod context;
pub mod cookies;
pub mod resolver;
pub mod store;

use crate::services::identity::IdentityError;

pub use context::RequestContext;
pub use resolver::{get_profile, resolve_auth_snapshot, AuthSnapshot};
pub use store::{
    begin_oauth, exchange_code_for_session, get_session, get_user, sign_in_with_password,
    sign_out, try_get_session, RequestSessionTokens,
};

/// Session store errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no request context installed for session access")]
    NoRequestContext,

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("missing PKCE code verifier cookie")]
    MissingCodeVerifier,

    #[error("random source unavailable: {0}")]
    Entropy(String),

    #[error("failed encoding session cookie: {0}")]
    Encode(#[from] serde_json::Error),
}
