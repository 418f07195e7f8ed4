// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Overtime web: server-rendered frontend of the Overtime tournament platform.
//!
//! This crate resolves the signed-in user and profile for every render from
//! the identity provider's session cookie, forwards authenticated calls to
//! the tournament backend, and keeps the browser-side auth context in sync
//! with the server.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;

use std::sync::Arc;

use api::{ApiClient, ExecutionContext};
use config::Config;
use services::{AuthService, IdentityProvider, TournamentService};
use session::RequestSessionTokens;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub identity: Arc<dyn IdentityProvider>,
    pub auth_service: AuthService,
    pub tournament_service: TournamentService,
}

impl AppState {
    /// Wire the backend services around one server-side API client that
    /// authenticates with the session of the request being handled.
    pub fn new(config: Config, identity: Arc<dyn IdentityProvider>) -> anyhow::Result<Self> {
        let api = ApiClient::builder(config.api_base())
            .context(ExecutionContext::Server)
            .token_source(Arc::new(RequestSessionTokens))
            .build()?;

        Ok(Self {
            auth_service: AuthService::new(api.clone()),
            tournament_service: TournamentService::new(api),
            config,
            identity,
        })
    }
}
