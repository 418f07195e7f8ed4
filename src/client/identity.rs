// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Browser binding of the identity provider.

use async_trait::async_trait;
use reqwest::header::LOCATION;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

use super::tab::BrowserTab;
use super::ClientAuthError;
use crate::api::{Navigator, TokenSource};
use crate::models::Session;
use crate::services::OAuthProvider;
use crate::session::cookies::{decode_session, SESSION_COOKIE};

const EVENT_CAPACITY: usize = 16;

/// Session change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChangeEvent {
    /// Sent to a new subscriber describing the session it starts with.
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Start the provider's OAuth redirect flow; returns once the browser
    /// has been pointed at the provider.
    async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<(), ClientAuthError>;

    async fn sign_out(&self) -> Result<(), ClientAuthError>;

    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthChangeEvent>;
}

/// Identity client over the auth routes of this server, observing the
/// session through the tab's cookie jar.
pub struct BrowserIdentity {
    tab: Arc<BrowserTab>,
    /// One channel per subscriber, so `InitialSession` reaches only the
    /// subscriber it describes.
    subscribers: Mutex<Vec<broadcast::Sender<AuthChangeEvent>>>,
    last_token: Mutex<Option<String>>,
}

impl BrowserIdentity {
    pub fn new(tab: Arc<BrowserTab>) -> Arc<Self> {
        let identity = Self {
            tab,
            subscribers: Mutex::new(Vec::new()),
            last_token: Mutex::new(None),
        };
        *identity.last_token.lock().unwrap_or_else(PoisonError::into_inner) =
            identity.session().map(|s| s.access_token);
        Arc::new(identity)
    }

    /// Session currently stored in the tab.
    pub fn session(&self) -> Option<Session> {
        decode_session(&self.tab.cookie(SESSION_COOKIE)?)
    }

    /// Compare the stored session with the last one seen and notify
    /// subscribers of the change, if any.
    pub fn sync_session(&self) -> Option<AuthChangeEvent> {
        let current = self.session().map(|s| s.access_token);
        let event = {
            let mut last = self.last_token.lock().unwrap_or_else(PoisonError::into_inner);
            let event = match (last.as_deref(), current.as_deref()) {
                (None, Some(_)) => Some(AuthChangeEvent::SignedIn),
                (Some(_), None) => Some(AuthChangeEvent::SignedOut),
                (Some(before), Some(now)) if before != now => Some(AuthChangeEvent::TokenRefreshed),
                _ => None,
            };
            *last = current;
            event
        };

        if let Some(event) = event {
            tracing::debug!(?event, "Auth state changed");
            let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
            subscribers.retain(|sender| sender.send(event).is_ok());
        }
        event
    }
}

#[async_trait]
impl IdentityClient for BrowserIdentity {
    async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<(), ClientAuthError> {
        let url = self.tab.url(&format!("/auth/authorize?provider={}", provider.as_str()))?;
        let response = self.tab.http().get(url).send().await?;

        if !response.status().is_redirection() {
            return Err(ClientAuthError::Status(response.status()));
        }
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ClientAuthError::MissingRedirect)?;

        self.tab.location().assign(location);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), ClientAuthError> {
        let url = self.tab.url("/auth/signout")?;
        let response = self.tab.http().post(url).send().await?;
        if !response.status().is_success() {
            return Err(ClientAuthError::Status(response.status()));
        }

        self.sync_session();
        Ok(())
    }

    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthChangeEvent> {
        let (sender, receiver) = broadcast::channel(EVENT_CAPACITY);
        // Cannot fail while `receiver` is alive
        let _ = sender.send(AuthChangeEvent::InitialSession);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender);
        receiver
    }
}

#[async_trait]
impl TokenSource for BrowserIdentity {
    async fn access_token(&self) -> anyhow::Result<Option<String>> {
        Ok(self.session().map(|s| s.access_token))
    }
}
