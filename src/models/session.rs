// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity-provider session and user records.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Sessions this close to expiry are treated as expired and refreshed.
pub const EXPIRY_MARGIN_SECS: i64 = 10;

/// Credential bundle issued by the identity provider.
///
/// Lives only in the session cookie; the application never stores it anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Unix timestamp (seconds) at which the access token stops being valid
    pub expires_at: i64,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now + EXPIRY_MARGIN_SECS
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }
}

/// Account record owned by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown>"))]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown>"))]
    pub user_metadata: serde_json::Value,
}

impl User {
    /// OAuth provider the account signed up with (`app_metadata.provider`).
    pub fn provider(&self) -> Option<&str> {
        self.app_metadata.get("provider").and_then(|v| v.as_str())
    }
}
