// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One browser tab: origin, cookie jar and location.

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::LOCATION;
use reqwest::Url;
use std::sync::{Arc, Mutex, PoisonError};

use super::ClientAuthError;
use crate::api::{ApiClient, ExecutionContext, Navigator, TokenSource};

const MAX_REDIRECTS: usize = 10;

/// `window.location`: every assigned or visited href, latest last.
#[derive(Debug, Default)]
pub struct Location {
    history: Mutex<Vec<String>>,
}

impl Location {
    pub fn href(&self) -> Option<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, href: &str) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(href.to_string());
    }
}

impl Navigator for Location {
    fn assign(&self, href: &str) {
        tracing::debug!(href, "Navigating");
        self.push(href);
    }
}

pub struct BrowserTab {
    origin: Url,
    jar: Arc<Jar>,
    location: Arc<Location>,
    http: reqwest::Client,
}

impl BrowserTab {
    /// New tab on `origin` with an empty cookie jar.
    pub fn open(origin: &str) -> Result<Arc<Self>, ClientAuthError> {
        let origin = Url::parse(origin).map_err(|e| ClientAuthError::InvalidUrl(e.to_string()))?;
        let jar = Arc::new(Jar::default());

        // Redirects are followed by hand so every hop shows up in the location
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Arc::new(Self {
            origin,
            jar,
            location: Arc::new(Location::default()),
            http,
        }))
    }

    pub fn location(&self) -> Arc<Location> {
        self.location.clone()
    }

    pub fn jar(&self) -> Arc<Jar> {
        self.jar.clone()
    }

    /// Cookie-sending HTTP client of this tab (redirects not followed).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Resolve `href` against the tab origin.
    pub fn url(&self, href: &str) -> Result<Url, ClientAuthError> {
        self.origin
            .join(href)
            .map_err(|e| ClientAuthError::InvalidUrl(e.to_string()))
    }

    /// Value of cookie `name` as sent with a request to the origin root.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        let header = header.to_str().ok()?;
        header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }

    /// Load the current location, following redirects.
    pub async fn follow_location(&self) -> Result<reqwest::Response, ClientAuthError> {
        let href = self.location.href().ok_or(ClientAuthError::NoNavigation)?;
        let mut url = self.url(&href)?;

        for _ in 0..MAX_REDIRECTS {
            let response = self.http.get(url.clone()).send().await?;
            if !response.status().is_redirection() {
                return Ok(response);
            }

            let Some(next) = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
            else {
                return Ok(response);
            };
            url = url
                .join(next)
                .map_err(|e| ClientAuthError::InvalidUrl(e.to_string()))?;
            self.location.push(url.as_str());
        }

        Err(ClientAuthError::TooManyRedirects)
    }

    /// Navigate to `href` and load it.
    pub async fn open_page(&self, href: &str) -> Result<reqwest::Response, ClientAuthError> {
        self.location.assign(href);
        self.follow_location().await
    }

    /// Backend API client running in this tab: cookies included, bearer
    /// token from `tokens`, and a 401 sends the tab to the login page.
    pub fn api_client(
        &self,
        api_base: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> reqwest::Result<ApiClient> {
        ApiClient::builder(api_base)
            .context(ExecutionContext::Browser(self.location.clone()))
            .token_source(tokens)
            .cookie_store(self.jar.clone())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_lookup() {
        let tab = BrowserTab::open("http://localhost:3000").unwrap();
        let url = tab.url("/").unwrap();
        tab.jar().add_cookie_str("ot-auth-token=abc; Path=/", &url);
        tab.jar().add_cookie_str("other=1; Path=/", &url);

        assert_eq!(tab.cookie("ot-auth-token").as_deref(), Some("abc"));
        assert_eq!(tab.cookie("missing"), None);
    }

    #[test]
    fn test_location_records_assignments() {
        let location = Location::default();
        assert_eq!(location.href(), None);

        location.assign("/auth/login");
        location.assign("/torneos");

        assert_eq!(location.href().as_deref(), Some("/torneos"));
        assert_eq!(location.history(), vec!["/auth/login", "/torneos"]);
    }
}
