// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tournament pages.
//!
//! Each page is the root layout data (auth snapshot and header navigation)
//! plus the page's own content.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{nav, Category, NavItem, Tournament};
use crate::session::{resolve_auth_snapshot, AuthSnapshot};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/torneos", get(tournaments_page))
        .route("/torneos/{tournament_slug}", get(tournament_page))
        .route(
            "/torneos/{tournament_slug}/{category_slug}",
            get(category_page),
        )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub auth: AuthSnapshot,
    pub nav: Vec<NavItem>,
    pub content: T,
}

struct Layout {
    auth: AuthSnapshot,
    tournaments: Vec<Tournament>,
}

impl Layout {
    fn page<T>(self, content: T) -> Page<T> {
        Page {
            auth: self.auth,
            nav: nav::main_menu(&self.tournaments),
            content,
        }
    }
}

/// Auth snapshot and the tournaments feeding the navigation.
///
/// A failed tournament load leaves the menu without its sub-menu rather
/// than failing the page.
async fn load_layout(state: &AppState) -> Layout {
    let (auth, tournaments) = tokio::join!(
        resolve_auth_snapshot(&state.auth_service),
        state.tournament_service.get_tournaments()
    );

    let tournaments = tournaments.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load tournaments for navigation");
        Vec::new()
    });

    Layout { auth, tournaments }
}

/// Tournament listing. Hidden tournaments are not listed.
async fn tournaments_page(State(state): State<Arc<AppState>>) -> Json<Page<Vec<Tournament>>> {
    let layout = load_layout(&state).await;
    let visible = layout
        .tournaments
        .iter()
        .filter(|t| !t.hidden)
        .cloned()
        .collect();
    Json(layout.page(visible))
}

async fn tournament_page(
    State(state): State<Arc<AppState>>,
    Path(tournament_slug): Path<String>,
) -> Result<Json<Page<Tournament>>> {
    let (layout, tournament) = tokio::join!(
        load_layout(&state),
        state.tournament_service.get_tournament_by_slug(&tournament_slug)
    );

    let tournament = tournament.inspect_err(|e| {
        tracing::info!(slug = %tournament_slug, error = %e, "Tournament page load failed");
    })?;
    Ok(Json(layout.page(tournament)))
}

async fn category_page(
    State(state): State<Arc<AppState>>,
    Path((tournament_slug, category_slug)): Path<(String, String)>,
) -> Result<Json<Page<Category>>> {
    let (layout, category) = tokio::join!(
        load_layout(&state),
        state
            .tournament_service
            .get_category_by_slug(&tournament_slug, &category_slug)
    );

    let category = category.inspect_err(|e| {
        tracing::info!(
            tournament = %tournament_slug,
            category = %category_slug,
            error = %e,
            "Category page load failed"
        );
    })?;
    Ok(Json(layout.page(category)))
}
