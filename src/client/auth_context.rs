// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client auth context.
//!
//! State is seeded from the server-rendered snapshot and only ever replaced
//! by another server resolution; it is never patched locally.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::identity::{AuthChangeEvent, IdentityClient};
use super::router::PageRouter;
use super::ClientAuthError;
use crate::models::{Profile, User};
use crate::services::OAuthProvider;
use crate::session::AuthSnapshot;

/// How long `sign_out` waits for the event-driven refresh before refreshing
/// on its own.
const SIGN_OUT_REFRESH_GRACE: Duration = Duration::from_secs(2);

tokio::task_local! {
    static AUTH_CONTEXT: AuthContext;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub profile: Option<Profile>,
    pub loading: bool,
    /// Bumped after every refresh attempt, successful or not
    pub revision: u64,
    pub last_error: Option<String>,
}

/// Handle to the auth state of one mounted [`AuthProvider`].
#[derive(Clone)]
pub struct AuthContext {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<AuthState>,
    identity: Arc<dyn IdentityClient>,
    router: Arc<dyn PageRouter>,
    refresh_lock: tokio::sync::Mutex<()>,
}

/// Mounted auth context. Dropping it ends the event subscription.
pub struct AuthProvider {
    context: AuthContext,
    listener: JoinHandle<()>,
}

impl AuthProvider {
    /// Mount with the server-resolved snapshot. Nothing is fetched here.
    pub fn mount(
        server: AuthSnapshot,
        identity: Arc<dyn IdentityClient>,
        router: Arc<dyn PageRouter>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState {
            user: server.user,
            profile: server.profile,
            ..AuthState::default()
        });

        // Subscribe before spawning so no event between mount and the first
        // poll of the listener is missed
        let mut events = identity.on_auth_state_change();

        let context = AuthContext {
            inner: Arc::new(Inner {
                state,
                identity,
                router,
                refresh_lock: tokio::sync::Mutex::new(()),
            }),
        };

        let listener_context = context.clone();
        let listener = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event @ (AuthChangeEvent::SignedIn | AuthChangeEvent::SignedOut)) => {
                        tracing::debug!(?event, "Auth state changed, refreshing server data");
                        let _ = listener_context.refresh().await;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Missed auth events, refreshing server data");
                        let _ = listener_context.refresh().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self { context, listener }
    }

    pub fn context(&self) -> AuthContext {
        self.context.clone()
    }

    /// Run `fut` inside this provider's subtree, where [`use_auth`] works.
    pub async fn scope<F: Future>(&self, fut: F) -> F::Output {
        AUTH_CONTEXT.scope(self.context.clone(), fut).await
    }
}

impl Drop for AuthProvider {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// The auth context of the enclosing [`AuthProvider`].
///
/// # Panics
///
/// Panics when called outside an [`AuthProvider::scope`].
pub fn use_auth() -> AuthContext {
    match try_use_auth() {
        Some(context) => context,
        None => panic!("use_auth must be used within an AuthProvider"),
    }
}

pub fn try_use_auth() -> Option<AuthContext> {
    AUTH_CONTEXT.try_with(Clone::clone).ok()
}

/// Clears `loading` when dropped.
pub(crate) struct LoadingGuard<'a> {
    state: &'a watch::Sender<AuthState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|state| state.loading = false);
    }
}

impl AuthContext {
    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.inner.state.borrow().profile.clone()
    }

    pub fn loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    pub(crate) fn start_loading(&self) -> LoadingGuard<'_> {
        self.inner.state.send_modify(|state| state.loading = true);
        LoadingGuard {
            state: &self.inner.state,
        }
    }

    fn record_error(&self, error: &ClientAuthError) {
        let message = error.to_string();
        self.inner
            .state
            .send_modify(|state| state.last_error = Some(message));
    }

    /// Send the browser to Google through the provider's OAuth flow.
    pub async fn sign_in_with_google(&self) -> Result<(), ClientAuthError> {
        let _loading = self.start_loading();

        let result = self
            .inner
            .identity
            .sign_in_with_oauth(OAuthProvider::Google)
            .await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Error signing in");
            self.record_error(e);
        }
        result
    }

    /// End the session. Resolves once state reflecting the sign-out has
    /// been fetched from the server.
    pub async fn sign_out(&self) -> Result<(), ClientAuthError> {
        let _loading = self.start_loading();

        let mut changes = self.inner.state.subscribe();
        let before = changes.borrow_and_update().revision;

        if let Err(e) = self.inner.identity.sign_out().await {
            tracing::error!(error = %e, "Error signing out");
            self.record_error(&e);
            return Err(e);
        }

        let refreshed = matches!(
            tokio::time::timeout(
                SIGN_OUT_REFRESH_GRACE,
                changes.wait_for(|state| state.revision > before && state.user.is_none()),
            )
            .await,
            Ok(Ok(_))
        );

        if !refreshed {
            tracing::debug!("No event-driven refresh after sign-out, refreshing directly");
            self.refresh().await?;
        }
        Ok(())
    }

    /// Re-run server-side resolution and replace the state with its result.
    pub async fn refresh(&self) -> Result<(), ClientAuthError> {
        let _guard = self.inner.refresh_lock.lock().await;

        let result = self.inner.router.refresh().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Failed refreshing server data");
        }

        self.inner.state.send_modify(|state| {
            state.revision += 1;
            match &result {
                Ok(snapshot) => {
                    state.user = snapshot.user.clone();
                    state.profile = snapshot.profile.clone();
                    state.last_error = None;
                }
                Err(e) => state.last_error = Some(e.to_string()),
            }
        });

        result.map(|_| ())
    }
}
