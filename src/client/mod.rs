// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Browser side of the auth pipeline.
//!
//! A [`BrowserTab`] owns the cookie jar and location of one tab. The
//! [`AuthProvider`] mounted in it is seeded with the server-rendered auth
//! snapshot and re-runs server resolution whenever the identity client
//! reports a sign-in or sign-out.

pub mod auth_context;
pub mod identity;
pub mod profile;
pub mod router;
pub mod tab;

use reqwest::StatusCode;

pub use auth_context::{try_use_auth, use_auth, AuthContext, AuthProvider, AuthState};
pub use identity::{AuthChangeEvent, BrowserIdentity, IdentityClient};
pub use profile::{create_player_profile, FormError};
pub use router::{HttpPageRouter, PageRouter};
pub use tab::{BrowserTab, Location};

/// Browser-side auth errors
#[derive(Debug, thiserror::Error)]
pub enum ClientAuthError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered HTTP {0}")]
    Status(StatusCode),

    #[error("authorize response carried no redirect")]
    MissingRedirect,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("no pending navigation")]
    NoNavigation,
}
