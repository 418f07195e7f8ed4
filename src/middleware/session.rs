// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session context middleware.

use crate::session::RequestContext;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Install a [`RequestContext`] for the rest of the stack and turn the
/// cookie writes made while handling the request into `Set-Cookie` headers.
pub async fn session_context(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let context = Arc::new(RequestContext::new(
        state.identity.clone(),
        state.config.secure_cookies(),
        jar,
    ));

    let response = context.clone().scope(next.run(request)).await;

    (context.take_cookie_writes(), response).into_response()
}
