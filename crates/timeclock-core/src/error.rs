//! Error types for the timeclock client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, protocol, renewal, storage, and input validation errors.
//! Every variant is `Clone`: a single renewal failure is handed to every
//! request that was waiting on it.

use std::fmt;
use thiserror::Error;

/// The unified error type for timeclock operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success responses from the API.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Renewal and login failures.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A credential scope could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A success response whose body did not have the expected shape.
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Input validation errors (invalid URL, method, body).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true for a 401 response, the only status that triggers renewal.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Protocol(err) if err.is_unauthorized())
    }

    /// Returns true if the error came from the network layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication and renewal errors.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// No scope holds a refresh token, so the session cannot be renewed.
    #[error("no refresh token available")]
    RefreshTokenMissing,

    /// The renewal endpoint answered with an error status.
    #[error("refresh rejected: {0}")]
    RefreshRejected(ProtocolError),

    /// The renewal endpoint could not be reached.
    #[error("refresh failed: {0}")]
    RefreshUnreachable(TransportError),

    /// The renewal task died before it settled.
    #[error("renewal abandoned before completion")]
    RenewalAbandoned,

    /// The login endpoint rejected the username or password.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}

impl AuthError {
    /// Classify an error raised while calling the renewal endpoint.
    pub fn from_refresh_failure(err: Error) -> Error {
        match err {
            Error::Protocol(protocol) => AuthError::RefreshRejected(protocol).into(),
            Error::Transport(transport) => AuthError::RefreshUnreachable(transport).into(),
            other => other,
        }
    }
}

/// Protocol-level errors from API responses.
///
/// The API reports failures as `{"detail": "...", "code": "..."}`; both
/// fields are optional since proxies and crashed workers answer with plain
/// text or an empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub code: Option<String>,
    /// Human-readable detail from the server.
    pub detail: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, code: Option<String>, detail: Option<String>) -> Self {
        Self {
            status,
            code,
            detail,
        }
    }

    /// Check if this is an expired or missing authorization.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Errors raised by credential storage scopes.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("{scope} scope I/O failed: {message}")]
    Io { scope: String, message: String },

    /// The stored data could not be parsed.
    #[error("{scope} scope is corrupt: {message}")]
    Corrupt { scope: String, message: String },
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Unsupported HTTP method.
    #[error("invalid HTTP method '{value}'")]
    Method { value: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
