// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend auth endpoints.

use crate::api::{ApiClient, ApiError};
use crate::models::{CreatePlayerProfile, Profile};

/// Typed wrapper over `/auth/*` on the backend.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /auth/profile` for the session attached by the client.
    pub async fn get_profile(&self) -> Result<Profile, ApiError> {
        self.client.get("/auth/profile").await
    }

    /// `POST /auth/create-player-profile`. The created resource is returned as-is.
    pub async fn create_player_profile(
        &self,
        form: &CreatePlayerProfile,
    ) -> Result<serde_json::Value, ApiError> {
        self.client.post("/auth/create-player-profile", form).await
    }
}
