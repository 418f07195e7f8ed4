// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::fmt;

/// Backend origin used when no API URL is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3011";

/// Deployment environment. Only affects where the OAuth callback redirects
/// and whether cookies are marked `Secure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::Invalid("APP_ENV", value.to_string())),
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    /// Backend origin; requests go to `{api_url}/api`
    pub api_url: String,
    /// Public origin of this frontend, used when a request has no Host header
    pub site_url: String,
    pub environment: Environment,
    /// Server port
    pub port: u16,

    /// Identity provider backend (`supabase` or `mock`)
    pub identity_provider: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("site_url", &self.site_url)
            .field("environment", &self.environment)
            .field("port", &self.port)
            .field("identity_provider", &self.identity_provider)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"[REDACTED]")
            .finish()
    }
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            site_url: "http://localhost:3000".to_string(),
            environment: Environment::Development,
            port: 3000,
            identity_provider: "mock".to_string(),
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let environment = match env::var("APP_ENV").or_else(|_| env::var("NODE_ENV")) {
            Ok(value) => Environment::parse(&value)?,
            Err(_) => Environment::Development,
        };

        let identity_provider =
            env::var("IDENTITY_PROVIDER").unwrap_or_else(|_| "supabase".to_string());

        let (supabase_url, supabase_anon_key) = if identity_provider == "supabase" {
            (
                env::var("SUPABASE_URL").map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
                env::var("SUPABASE_ANON_KEY")
                    .map(|v| v.trim().to_string())
                    .map_err(|_| ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            )
        } else {
            (String::new(), String::new())
        };

        Ok(Self {
            api_url: env::var("API_URL")
                .or_else(|_| env::var("NEXT_PUBLIC_API_URL"))
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            site_url: env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            environment,
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            identity_provider,
            supabase_url,
            supabase_anon_key,
        })
    }

    /// Base URL shared by every backend request.
    pub fn api_base(&self) -> String {
        format!("{}/api", self.api_url.trim_end_matches('/'))
    }

    /// Session cookies are only marked `Secure` outside development.
    pub fn secure_cookies(&self) -> bool {
        !self.environment.is_development()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
