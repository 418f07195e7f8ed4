// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - backend endpoints and the identity provider.

pub mod auth;
pub mod identity;
pub mod tournament;

pub use auth::AuthService;
pub use identity::{AuthGrant, IdentityError, IdentityProvider, OAuthProvider};
pub use tournament::TournamentService;
