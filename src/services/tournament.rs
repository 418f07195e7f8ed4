// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend tournament endpoints.

use crate::api::{ApiClient, ApiError};
use crate::models::{Category, Tournament};

/// Typed wrapper over `/tournaments/*` on the backend.
///
/// No caching or retries; errors go back to the caller untouched.
#[derive(Clone)]
pub struct TournamentService {
    client: ApiClient,
}

impl TournamentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_tournaments(&self) -> Result<Vec<Tournament>, ApiError> {
        self.client.get("/tournaments").await
    }

    pub async fn get_tournament_by_slug(&self, slug: &str) -> Result<Tournament, ApiError> {
        self.client
            .get(&format!("/tournaments/{}", urlencoding::encode(slug)))
            .await
    }

    pub async fn get_category_by_slug(
        &self,
        tournament_slug: &str,
        category_slug: &str,
    ) -> Result<Category, ApiError> {
        self.client
            .get(&format!(
                "/tournaments/{}/categories/{}",
                urlencoding::encode(tournament_slug),
                urlencoding::encode(category_slug)
            ))
            .await
    }
}
