//! Request descriptors, replay attempts, and responses.

use serde::Serialize;
use serde::de::DeserializeOwned;

use timeclock_core::error::{Error, InvalidInputError};
use timeclock_core::{AccessToken, Result};

pub use reqwest::Method;

/// An immutable description of an outbound API call.
///
/// Descriptors are plain data: the dispatcher can send the same descriptor
/// twice (original send and post-renewal replay) without rebuilding it.
///
/// # Example
///
/// ```
/// use timeclock_http::RequestDescriptor;
///
/// let request = RequestDescriptor::get("api/attendance/")
///     .with_query("month", "2026-10")
///     .with_query("employee", "42");
/// assert_eq!(request.query().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl RequestDescriptor {
    /// Create a descriptor for any method.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Parse a method name such as `"GET"` or `"patch"`.
    pub fn parse(method: &str, path: impl Into<String>) -> Result<Self> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|_| {
            Error::InvalidInput(InvalidInputError::Method {
                value: method.to_string(),
            })
        })?;
        Ok(Self::new(method, path))
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a request header.
    ///
    /// `Authorization` is managed by the client and must not be set here.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize and attach a JSON body.
    pub fn try_with_json<B: Serialize>(self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: format!("request body is not valid JSON: {e}"),
            })
        })?;
        Ok(self.with_json(value))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// One send of a descriptor: the original, or the single replay allowed
/// after a renewal.
///
/// A replay carries the token the renewal produced so it never re-reads
/// storage that a concurrent sign-out may already have cleared.
#[derive(Debug, Clone)]
pub(crate) struct Attempt<'a> {
    request: &'a RequestDescriptor,
    replay_token: Option<AccessToken>,
}

impl<'a> Attempt<'a> {
    /// The first send of a descriptor.
    pub(crate) fn first(request: &'a RequestDescriptor) -> Self {
        Self {
            request,
            replay_token: None,
        }
    }

    /// The replay of this attempt's descriptor with a renewed token.
    pub(crate) fn replay(&self, token: AccessToken) -> Self {
        Self {
            request: self.request,
            replay_token: Some(token),
        }
    }

    pub(crate) fn request(&self) -> &'a RequestDescriptor {
        self.request
    }

    pub(crate) fn is_replay(&self) -> bool {
        self.replay_token.is_some()
    }

    pub(crate) fn replay_token(&self) -> Option<&AccessToken> {
        self.replay_token.as_ref()
    }
}

/// A successful API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: u16,
    body: String,
}

impl ApiResponse {
    pub(crate) fn new(status: u16, body: String) -> Self {
        Self { status, body }
    }

    /// HTTP status code (always 2xx).
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw response body.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Returns true for bodiless responses such as `204 No Content`.
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Decode the body as JSON.
    pub fn json<R: DeserializeOwned>(&self) -> Result<R> {
        serde_json::from_str(&self.body).map_err(|e| Error::Decode {
            message: e.to_string(),
        })
    }
}
