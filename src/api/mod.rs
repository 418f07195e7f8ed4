// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend API client and its interceptors.

pub mod client;
pub mod error;
pub mod interceptors;

pub use client::{ApiClient, ApiClientBuilder, ExecutionContext};
pub use error::ApiError;
pub use interceptors::{
    BearerAuth, LoginRedirect, Navigator, RequestInterceptor, ResponseInterceptor, TokenSource,
    LOGIN_PATH,
};
