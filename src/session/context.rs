// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-request session context.
//!
//! Every request handler runs inside a task-local [`RequestContext`] holding
//! the incoming cookies and the cookie writes made while handling it. Session
//! store operations find it ambiently, so callers never thread a cookie jar
//! through the domain services.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::{Arc, Mutex, PoisonError};
use time::Duration;

use super::cookies::removal_cookie;
use super::SessionError;
use crate::services::identity::IdentityProvider;

tokio::task_local! {
    static REQUEST_CONTEXT: Arc<RequestContext>;
}

pub struct RequestContext {
    identity: Arc<dyn IdentityProvider>,
    secure_cookies: bool,
    incoming: CookieJar,
    pending: Mutex<Vec<Cookie<'static>>>,
    /// Serializes session loads so a rotating refresh token is spent once.
    pub(crate) session_lock: tokio::sync::Mutex<()>,
}

impl RequestContext {
    pub fn new(identity: Arc<dyn IdentityProvider>, secure_cookies: bool, incoming: CookieJar) -> Self {
        Self {
            identity,
            secure_cookies,
            incoming,
            pending: Mutex::new(Vec::new()),
            session_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// The context of the request being handled on this task.
    pub fn current() -> Result<Arc<Self>, SessionError> {
        REQUEST_CONTEXT
            .try_with(Arc::clone)
            .map_err(|_| SessionError::NoRequestContext)
    }

    /// Run `fut` with `self` as the current request context.
    pub async fn scope<F: std::future::Future>(self: Arc<Self>, fut: F) -> F::Output {
        REQUEST_CONTEXT.scope(self, fut).await
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Current value of cookie `name`, as the browser will see it after this
    /// response.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cookie) = pending.iter().rev().find(|c| c.name() == name) {
            return match cookie.max_age() {
                Some(age) if age <= Duration::ZERO => None,
                _ => Some(cookie.value().to_string()),
            };
        }
        self.incoming.get(name).map(|c| c.value().to_string())
    }

    pub fn set_cookie(&self, cookie: Cookie<'static>) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cookie);
    }

    pub fn remove_cookie(&self, name: &'static str) {
        self.set_cookie(removal_cookie(name, self.secure_cookies));
    }

    /// Drain the cookie writes made so far into a response jar.
    pub fn take_cookie_writes(&self) -> CookieJar {
        let pending = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        );
        pending
            .into_iter()
            .fold(CookieJar::new(), |jar, cookie| jar.add(cookie))
    }
}
