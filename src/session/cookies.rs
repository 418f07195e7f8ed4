// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session and PKCE cookie layout.

use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use time::Duration;

use crate::models::Session;

/// Cookie holding the encoded identity-provider session.
pub const SESSION_COOKIE: &str = "ot-auth-token";

/// Cookie holding the PKCE verifier between `/auth/authorize` and `/auth/callback`.
pub const CODE_VERIFIER_COOKIE: &str = "ot-code-verifier";

const SESSION_PATH: &str = "/";
const CODE_VERIFIER_PATH: &str = "/auth";

// Browsers cap cookie lifetime at 400 days
const SESSION_MAX_AGE: Duration = Duration::days(400);
const CODE_VERIFIER_MAX_AGE: Duration = Duration::minutes(10);

pub fn encode_session(session: &Session) -> Result<String, serde_json::Error> {
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(session)?))
}

/// Decode a session cookie value. `None` for anything that is not a session.
pub fn decode_session(value: &str) -> Option<Session> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn build(name: &'static str, value: String, path: &'static str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(path)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub fn session_cookie(session: &Session, secure: bool) -> Result<Cookie<'static>, serde_json::Error> {
    let mut cookie = build(SESSION_COOKIE, encode_session(session)?, SESSION_PATH, secure);
    cookie.set_max_age(SESSION_MAX_AGE);
    Ok(cookie)
}

pub fn code_verifier_cookie(verifier: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = build(
        CODE_VERIFIER_COOKIE,
        verifier.to_string(),
        CODE_VERIFIER_PATH,
        secure,
    );
    cookie.set_max_age(CODE_VERIFIER_MAX_AGE);
    cookie
}

/// Removal cookie for `name`: same attributes as at creation, `Max-Age=0`.
pub fn removal_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    let path = if name == CODE_VERIFIER_COOKIE {
        CODE_VERIFIER_PATH
    } else {
        SESSION_PATH
    };
    let mut cookie = build(name, String::new(), path, secure);
    cookie.set_max_age(Duration::ZERO);
    cookie
}
