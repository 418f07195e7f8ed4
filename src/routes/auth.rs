// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication routes: OAuth start and callback, password login,
//! sign-out and the session snapshot used by the browser.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Environment;
use crate::error::{AppError, Result};
use crate::services::OAuthProvider;
use crate::session;
use crate::AppState;

/// Page every failed sign-in attempt ends on.
pub const ERROR_PATH: &str = "/auth/error";

const CALLBACK_PATH: &str = "/auth/callback";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/authorize", get(authorize))
        .route("/auth/callback", get(callback))
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/signout", axum::routing::post(signout))
        .route("/auth/session", get(session_snapshot))
        .route(ERROR_PATH, get(error_page))
}

/// Origin the browser used to reach us, built from `Host`.
///
/// Development servers are plain `http`. In production the scheme comes
/// from `x-forwarded-proto` when a proxy sets it, otherwise `http` for
/// loopback hosts and `https` for everything else. Without a `Host` header
/// this is `site_url`.
pub fn request_origin(headers: &HeaderMap, environment: Environment, site_url: &str) -> String {
    let Some(host) = headers.get(header::HOST).and_then(|h| h.to_str().ok()) else {
        return site_url.trim_end_matches('/').to_string();
    };

    let forwarded_proto = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|proto| *proto == "http" || *proto == "https");

    let scheme = match (environment, forwarded_proto) {
        (Environment::Development, _) => "http",
        (Environment::Production, Some(proto)) => proto,
        (Environment::Production, None) if is_loopback_host(host) => "http",
        (Environment::Production, None) => "https",
    };
    format!("{}://{}", scheme, host)
}

/// Exact loopback host names, with an optional numeric port.
fn is_loopback_host(host: &str) -> bool {
    let name = match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    };
    matches!(
        name.to_ascii_lowercase().as_str(),
        "localhost" | "127.0.0.1" | "[::1]"
    )
}

/// Only local absolute paths are accepted as a post-login destination.
pub fn sanitize_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\") => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

/// Where a successful OAuth callback sends the browser.
///
/// Behind a reverse proxy in production the public host arrives in
/// `x-forwarded-host`; elsewhere the request origin is authoritative.
pub fn callback_redirect(
    environment: Environment,
    origin: &str,
    forwarded_host: Option<&str>,
    next: &str,
) -> String {
    match (environment, forwarded_host) {
        (Environment::Production, Some(host)) => format!("https://{}{}", host, next),
        _ => format!("{}{}", origin, next),
    }
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Query parameters for starting the OAuth flow.
#[derive(Deserialize)]
pub struct AuthorizeParams {
    #[serde(default)]
    provider: OAuthProvider,
    #[serde(default)]
    next: Option<String>,
}

/// Start OAuth: store a PKCE verifier and redirect to the provider.
async fn authorize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<AuthorizeParams>,
) -> Result<Response> {
    let origin = request_origin(&headers, state.config.environment, &state.config.site_url);
    let mut redirect_to = format!("{}{}", origin, CALLBACK_PATH);
    if params.next.is_some() {
        let next = sanitize_next(params.next.as_deref());
        redirect_to = format!("{}?next={}", redirect_to, urlencoding::encode(&next));
    }

    let url = session::begin_oauth(params.provider, &redirect_to)
        .map_err(|e| AppError::Internal(e.into()))?;

    tracing::info!(
        provider = params.provider.as_str(),
        redirect_to = %redirect_to,
        "Starting OAuth flow"
    );

    Ok(found(&url))
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback: exchange the code for a session cookie and redirect.
///
/// Missing code, failed exchange or unparseable parameters all end on the
/// error page.
async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    params: std::result::Result<Query<CallbackParams>, QueryRejection>,
) -> Response {
    let origin = request_origin(&headers, state.config.environment, &state.config.site_url);
    let error_url = format!("{}{}", origin, ERROR_PATH);

    let params = match params {
        Ok(Query(params)) => params,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable OAuth callback parameters");
            return found(&error_url);
        }
    };

    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        tracing::warn!(error = ?params.error, "OAuth callback without code");
        return found(&error_url);
    };

    match session::exchange_code_for_session(&code).await {
        Ok(grant) => {
            let next = sanitize_next(params.next.as_deref());
            let forwarded_host = headers
                .get("x-forwarded-host")
                .and_then(|h| h.to_str().ok())
                .filter(|h| !h.is_empty());
            let target =
                callback_redirect(state.config.environment, &origin, forwarded_host, &next);

            tracing::info!(
                user_id = %grant.user.id,
                environment = %state.config.environment,
                target = %target,
                "OAuth sign-in complete"
            );
            found(&target)
        }
        Err(e) => {
            tracing::warn!(error = %e, "OAuth code exchange failed");
            found(&error_url)
        }
    }
}

#[derive(Deserialize)]
pub struct LoginPageParams {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    next: Option<String>,
}

async fn login_page(Query(params): Query<LoginPageParams>) -> Html<String> {
    let next = sanitize_next(params.next.as_deref());
    let error = match params.error.as_deref() {
        Some("invalid_credentials") => {
            r#"<p class="error">Email o contraseña incorrectos.</p>"#
        }
        Some(_) => r#"<p class="error">No se pudo iniciar sesión.</p>"#,
        None => "",
    };

    Html(format!(
        r#"<!doctype html>
<html lang="es">
<head><meta charset="utf-8"><title>Iniciar sesión | Overtime</title></head>
<body>
<h1>Iniciar sesión</h1>
{error}
<a href="/auth/authorize?provider=google&amp;next={next_param}">Continuar con Google</a>
<form method="post" action="/auth/login">
<input type="hidden" name="next" value="{next_value}">
<label>Email <input type="email" name="email" required></label>
<label>Contraseña <input type="password" name="password" required></label>
<button type="submit">Entrar</button>
</form>
</body>
</html>"#,
        error = error,
        next_param = urlencoding::encode(&next),
        next_value = escape_html(&next),
    ))
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
    #[serde(default)]
    next: Option<String>,
}

/// Password sign-in from the login form.
async fn login(Form(form): Form<LoginForm>) -> Redirect {
    let next = sanitize_next(form.next.as_deref());

    match session::sign_in_with_password(form.email.trim(), &form.password).await {
        Ok(grant) => {
            tracing::info!(user_id = %grant.user.id, "Password sign-in complete");
            Redirect::to(&next)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Password sign-in failed");
            Redirect::to("/auth/login?error=invalid_credentials")
        }
    }
}

/// Terminate the session. Provider failures are logged; the cookie is
/// cleared regardless.
async fn signout() -> Result<StatusCode> {
    session::sign_out()
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Root-render data for the current request.
async fn session_snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = session::resolve_auth_snapshot(&state.auth_service).await;
    ([(header::CACHE_CONTROL, "no-store")], Json(snapshot))
}

const ERROR_PAGE: &str = r#"<!doctype html>
<html lang="es">
<head><meta charset="utf-8"><title>Error de autenticación | Overtime</title></head>
<body>
<h1>Error de autenticación</h1>
<p>No pudimos completar el inicio de sesión. El enlace puede haber expirado o ya haber sido usado.</p>
<a href="/auth/login">Volver a intentar</a>
</body>
</html>"#;

async fn error_page() -> Html<&'static str> {
    Html(ERROR_PAGE)
}
