// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth data resolved once per server render.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::store::{get_session, get_user};
use crate::models::{Profile, User};
use crate::services::AuthService;

/// `(user, profile)` pair a render is seeded with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthSnapshot {
    pub user: Option<User>,
    pub profile: Option<Profile>,
}

impl AuthSnapshot {
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

/// Profile of the current session's user.
///
/// No session means no backend call at all. A failed fetch is logged and
/// treated as "no profile" for this render; there is no retry.
pub async fn get_profile(auth: &AuthService) -> Option<Profile> {
    let session = get_session().await?;
    if session.access_token.is_empty() {
        return None;
    }

    match auth.get_profile().await {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::error!(
                error = %e,
                status = ?e.status(),
                "Error fetching profile server-side"
            );
            None
        }
    }
}

/// Resolve the snapshot for the current request. The profile is only
/// fetched for a signed-in user.
pub async fn resolve_auth_snapshot(auth: &AuthService) -> AuthSnapshot {
    let Some(user) = get_user().await else {
        return AuthSnapshot::default();
    };

    let profile = get_profile(auth).await;
    if profile.is_none() {
        tracing::debug!(user_id = %user.id, "Signed-in user has no profile for this render");
    }

    AuthSnapshot {
        user: Some(user),
        profile,
    }
}
