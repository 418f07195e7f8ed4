// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared HTTP client for the tournament backend.
//!
//! One instance is built at startup and cloned into every domain service.
//! Outgoing requests pass through the request interceptors (bearer token);
//! failed responses pass through the response interceptors (login redirect)
//! before the error is handed back to the caller.

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use super::error::ApiError;
use super::interceptors::{
    BearerAuth, LoginRedirect, Navigator, RequestInterceptor, ResponseInterceptor, TokenSource,
};

/// Where the client runs. Only a browser context can be navigated to the
/// login page.
#[derive(Clone, Default)]
pub enum ExecutionContext {
    #[default]
    Server,
    Browser(Arc<dyn Navigator>),
}

/// Backend API client.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClient {
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.into(),
            context: ExecutionContext::Server,
            token_source: None,
            cookie_store: None,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
        }
    }

    /// GET `{base_url}{path}` and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, None::<&()>).await
    }

    /// POST a JSON body to `{base_url}{path}` and decode the JSON response.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match self.execute(method, path, body).await {
            Ok(value) => Ok(value),
            Err(err) => {
                for interceptor in &self.inner.response_interceptors {
                    interceptor.on_error(&err).await;
                }
                Err(err)
            }
        }
    }

    async fn execute<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.inner.base_url, path);
        let transport = |source| ApiError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        };

        let mut builder = self.inner.http.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let mut request = builder.build().map_err(transport)?;

        for interceptor in &self.inner.request_interceptors {
            request = interceptor.on_request(request).await;
        }

        let response = self.inner.http.execute(request).await.map_err(transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                method,
                url,
                status,
                body,
            });
        }

        let bytes = response.bytes().await.map_err(transport)?;
        // 201/204 responses may carry no body at all
        let bytes: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        serde_json::from_slice(bytes).map_err(|source| ApiError::Decode {
            method,
            url,
            source,
        })
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    base_url: String,
    context: ExecutionContext,
    token_source: Option<Arc<dyn TokenSource>>,
    cookie_store: Option<Arc<Jar>>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClientBuilder {
    pub fn context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    /// Attach a bearer token from `source` to every request.
    pub fn token_source(mut self, source: Arc<dyn TokenSource>) -> Self {
        self.token_source = Some(source);
        self
    }

    /// Send cookies from `jar` with every request (credentials included).
    pub fn cookie_store(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_store = Some(jar);
        self
    }

    pub fn request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> reqwest::Result<ApiClient> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut http = reqwest::Client::builder().default_headers(headers);
        if let Some(jar) = self.cookie_store {
            http = http.cookie_provider(jar);
        }

        let mut request_interceptors: Vec<Arc<dyn RequestInterceptor>> = Vec::new();
        if let Some(source) = self.token_source {
            request_interceptors.push(Arc::new(BearerAuth::new(source)));
        }
        request_interceptors.extend(self.request_interceptors);

        let mut response_interceptors: Vec<Arc<dyn ResponseInterceptor>> = Vec::new();
        if let ExecutionContext::Browser(navigator) = self.context {
            response_interceptors.push(Arc::new(LoginRedirect::new(navigator)));
        }
        response_interceptors.extend(self.response_interceptors);

        Ok(ApiClient {
            inner: Arc::new(ApiClientInner {
                http: http.build()?,
                base_url: self.base_url.trim_end_matches('/').to_string(),
                request_interceptors,
                response_interceptors,
            }),
        })
    }
}
