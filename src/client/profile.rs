// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Create-player-profile form action.

use validator::{Validate, ValidationErrors};

use super::auth_context::use_auth;
use crate::api::Navigator;
use crate::models::CreatePlayerProfile;
use crate::services::AuthService;

/// Where a user with a player profile is sent.
pub const PLAYER_PROFILE_PATH: &str = "/profile/player";

/// Message shown when the backend gives no usable one.
pub const DEFAULT_ERROR_MESSAGE: &str = "Error al crear perfil de jugador";

/// User-visible form failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Rejected(String),
}

/// Submit the create-player-profile form.
///
/// Users that already have a player profile are sent straight to it. On
/// success the server data is refreshed before navigating; failures are
/// returned for display and never retried.
///
/// Must run inside an [`AuthProvider`](super::AuthProvider) scope.
pub async fn create_player_profile(
    service: &AuthService,
    navigator: &dyn Navigator,
    first_name: &str,
    last_name: &str,
) -> Result<(), FormError> {
    let auth = use_auth();

    if auth.profile().is_some_and(|p| p.has_player_profile) {
        navigator.assign(PLAYER_PROFILE_PATH);
        return Ok(());
    }

    let form = CreatePlayerProfile::new(first_name, last_name);
    form.validate()
        .map_err(|e| FormError::Invalid(first_message(&e)))?;

    let _loading = auth.start_loading();

    if let Err(e) = service.create_player_profile(&form).await {
        tracing::warn!(error = %e, "Failed to create player profile");
        return Err(FormError::Rejected(
            e.server_message()
                .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
        ));
    }

    // Navigation proceeds even if the refresh fails; the next page load
    // resolves the profile again
    let _ = auth.refresh().await;
    navigator.assign(PLAYER_PROFILE_PATH);
    Ok(())
}

/// Form fields in display order; the first failing one is reported.
const FIELD_ORDER: [&str; 2] = ["first_name", "last_name"];

fn first_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    FIELD_ORDER
        .iter()
        .filter_map(|name| fields.get(*name))
        .chain(fields.values())
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}
