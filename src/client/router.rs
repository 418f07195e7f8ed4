// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Re-running server-side data resolution from the browser.

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use std::sync::Arc;

use super::tab::BrowserTab;
use super::ClientAuthError;
use crate::session::AuthSnapshot;

/// Page-level refresh: ask the server to resolve the root-render data again.
#[async_trait]
pub trait PageRouter: Send + Sync {
    async fn refresh(&self) -> Result<AuthSnapshot, ClientAuthError>;
}

/// Refreshes through `GET /auth/session` with the tab's cookies.
pub struct HttpPageRouter {
    tab: Arc<BrowserTab>,
}

impl HttpPageRouter {
    pub fn new(tab: Arc<BrowserTab>) -> Arc<Self> {
        Arc::new(Self { tab })
    }
}

#[async_trait]
impl PageRouter for HttpPageRouter {
    async fn refresh(&self) -> Result<AuthSnapshot, ClientAuthError> {
        let response = self
            .tab
            .http()
            .get(self.tab.url("/auth/session")?)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientAuthError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}
