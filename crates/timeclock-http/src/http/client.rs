//! HTTP client implementation.

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use timeclock_core::error::{Error, ProtocolError, TransportError};
use timeclock_core::{AccessToken, ApiUrl, Result};

use crate::config::ClientConfig;
use crate::request::{ApiResponse, RequestDescriptor};

use super::endpoints::ApiErrorResponse;

/// Map a reqwest failure onto the transport error taxonomy.
pub(crate) fn map_transport(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

/// HTTP client bound to one API base URL.
///
/// Performs exactly one round-trip per call; retry and renewal live in the
/// dispatcher and coordinator.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    client: reqwest::Client,
    base: ApiUrl,
}

impl ApiClient {
    /// Create a new client from configuration.
    pub(crate) fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(map_transport)?;

        Ok(Self {
            client,
            base: config.base_url.clone(),
        })
    }

    /// Returns the API base URL this client is configured for.
    pub(crate) fn base(&self) -> &ApiUrl {
        &self.base
    }

    /// Send a described request, attaching `token` as a bearer credential.
    #[instrument(skip(self, request, token), fields(method = %request.method(), path = request.path()))]
    pub(crate) async fn execute(
        &self,
        request: &RequestDescriptor,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse> {
        let url = self.base.endpoint(request.path());
        debug!(authed = token.is_some(), "API request");

        let mut builder = self.client.request(request.method().clone(), &url);
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }

        let response = builder.send().await.map_err(map_transport)?;
        let status = response.status();
        trace!(status = %status, "API response");

        if status.is_success() {
            let body = response.text().await.map_err(map_transport)?;
            Ok(ApiResponse::new(status.as_u16(), body))
        } else {
            Err(Error::Protocol(parse_error_response(response).await))
        }
    }

    /// Make an unauthenticated POST with a JSON body.
    #[instrument(skip(self, body))]
    pub(crate) async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.base.endpoint(path);
        debug!(%url, "API procedure");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;

        handle_response(response).await
    }

    /// Make an authenticated GET.
    #[instrument(skip(self, token))]
    pub(crate) async fn get_authed<R>(&self, path: &str, token: &AccessToken) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = self.base.endpoint(path);
        debug!("API authenticated query");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(map_transport)?;

        handle_response(response).await
    }
}

/// Handle a response, parsing the body or error.
async fn handle_response<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
    let status = response.status();
    trace!(status = %status, "API response");

    if status.is_success() {
        let body = response.text().await.map_err(map_transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Decode {
            message: e.to_string(),
        })
    } else {
        Err(Error::Protocol(parse_error_response(response).await))
    }
}

/// Parse an error response.
async fn parse_error_response(response: reqwest::Response) -> ProtocolError {
    let status = response.status().as_u16();

    // Proxies and crashed workers answer with HTML or nothing at all
    match response.json::<ApiErrorResponse>().await {
        Ok(body) => ProtocolError::new(status, body.code.clone(), body.detail_text()),
        Err(_) => ProtocolError::new(status, None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let config = ClientConfig::new(ApiUrl::new("https://hr.example.com").unwrap());
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base().as_str(), config.base_url.as_str());
    }
}
