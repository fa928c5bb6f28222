//! Endpoint paths and request/response bodies of the auth API.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Exchange a username and password for a token pair.
pub const TOKEN_OBTAIN: &str = "api/token/";

/// Exchange a refresh token for a new access token.
pub const TOKEN_REFRESH: &str = "api/token/refresh/";

/// The caller's role and permission codes.
pub const PERMISSIONS_PROFILE: &str = "api/auth/me/permissions/";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the login endpoint.
#[derive(Serialize)]
pub struct ObtainTokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response from the login endpoint.
#[derive(Deserialize)]
pub struct ObtainTokenResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Request body for the renewal endpoint.
#[derive(Serialize)]
pub struct RefreshTokenRequest<'a> {
    pub refresh: &'a str,
}

/// Response from the renewal endpoint.
///
/// `refresh` is only present when the server rotates refresh tokens.
#[derive(Deserialize)]
pub struct RefreshTokenResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl fmt::Debug for ObtainTokenRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObtainTokenRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for RefreshTokenRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRequest")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for ObtainTokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        redacted_pair(f, "ObtainTokenResponse", self.refresh.is_some())
    }
}

impl fmt::Debug for RefreshTokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        redacted_pair(f, "RefreshTokenResponse", self.refresh.is_some())
    }
}

fn redacted_pair(f: &mut fmt::Formatter<'_>, name: &str, has_refresh: bool) -> fmt::Result {
    f.debug_struct(name)
        .field("access", &"[REDACTED]")
        .field("refresh", &has_refresh.then_some("[REDACTED]"))
        .finish()
}

/// Error body format.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ApiErrorResponse {
    /// Returns the detail as text; structured details are rendered as JSON.
    pub fn detail_text(&self) -> Option<String> {
        self.detail.as_ref().map(|detail| match detail {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }
}
