// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application profile of a signed-in user.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Profile served by the backend for the current user.
///
/// The backend creates one for every registered user, so a missing profile
/// is a transient failure, never a valid state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    pub id: String,
    /// Back-reference to the identity-provider user
    #[serde(alias = "supabaseUserId")]
    pub identity_user_id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub has_player_profile: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

impl Profile {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }
}

/// Body of `POST /auth/create-player-profile`.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerProfile {
    #[validate(length(min = 1, max = 80, message = "El nombre es obligatorio"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 80, message = "El apellido es obligatorio"))]
    pub last_name: String,
}

impl CreatePlayerProfile {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_accepts_backend_field_names() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "supabaseUserId": "u1",
            "email": "ana@example.com",
            "name": "Ana",
            "roles": ["admin", "player"],
            "hasPlayerProfile": true,
            "playerId": "pl1",
            "playerName": "Ana Pérez"
        }))
        .unwrap();

        assert_eq!(profile.identity_user_id, "u1");
        assert!(profile.is_admin());
        assert!(profile.has_player_profile);
        assert_eq!(profile.avatar_url, None);

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["identityUserId"], "u1");
        assert!(json.get("avatarUrl").is_none());
    }

    #[test]
    fn test_profile_roles_default_empty() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "identityUserId": "u1",
            "email": "ana@example.com",
            "name": "Ana"
        }))
        .unwrap();
        assert!(profile.roles.is_empty());
        assert!(!profile.has_player_profile);
    }

    #[test]
    fn test_create_player_profile_validation() {
        assert!(CreatePlayerProfile::new("Juan", "Pérez").validate().is_ok());
        assert!(CreatePlayerProfile::new("   ", "Pérez").validate().is_err());
        assert!(CreatePlayerProfile::new("Juan", &"x".repeat(81))
            .validate()
            .is_err());

        let json = serde_json::to_value(CreatePlayerProfile::new(" Juan ", "Pérez")).unwrap();
        assert_eq!(json, serde_json::json!({"firstName": "Juan", "lastName": "Pérez"}));
    }
}
