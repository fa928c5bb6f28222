//! Credential pair, storage scopes, and login credentials.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tokens::{AccessToken, RefreshToken};

/// Storage key holding the access token inside a scope.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key holding the refresh token inside a scope.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// The lifetime of stored credentials.
///
/// A logged-in user's tokens live in exactly one scope: persistent when
/// they asked to be remembered, session-bounded otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Survives restarts of the application.
    Persistent,
    /// Discarded when the user's session ends.
    Session,
}

impl Scope {
    /// Both scopes, in read-preference order.
    pub const ALL: [Scope; 2] = [Scope::Persistent, Scope::Session];

    /// Returns the scope name used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Persistent => "persistent",
            Scope::Session => "session",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An access token and, when the session can be renewed, a refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access: AccessToken,
    pub refresh: Option<RefreshToken>,
}

impl CredentialPair {
    /// Create a new credential pair.
    pub fn new(access: AccessToken, refresh: Option<RefreshToken>) -> Self {
        Self { access, refresh }
    }
}

/// A credential pair together with the scope it was read from.
///
/// Renewal writes the new access token back to this scope so a session
/// never spans both scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub pair: CredentialPair,
    pub scope: Scope,
}

/// Username and password exchanged for a credential pair at login.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
#[derive(Clone)]
pub struct LoginCredentials {
    username: String,
    password: String,
}

impl LoginCredentials {
    /// Create new login credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing the login request body.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
