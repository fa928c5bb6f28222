//! The request dispatcher every application call goes through.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use timeclock_core::error::{AuthError, Error};
use timeclock_core::{
    AccessToken, ApiUrl, CredentialPair, LoginCredentials, Navigator, PermissionNotifier,
    PermissionProfile, RefreshToken, Result, Scope,
};

use crate::broadcaster::{BroadcastNotifier, PermissionBroadcaster};
use crate::config::ClientConfig;
use crate::coordinator::RefreshCoordinator;
use crate::http::ApiClient;
use crate::http::endpoints::{ObtainTokenRequest, ObtainTokenResponse};
use crate::invalidation::{SessionInvalidationHandler, WatchNavigator};
use crate::request::{ApiResponse, Attempt, RequestDescriptor};
use crate::store::CredentialStore;

/// Authenticated client for the timeclock API.
///
/// Every call attaches the stored access token. A 401 hands the request to
/// the refresh coordinator once; the request is then replayed with the
/// renewed token, and a second 401 is returned to the caller as is.
///
/// Clones share one credential store and one renewal state, so concurrent
/// requests from any clone trigger at most one renewal.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    api: ApiClient,
    store: CredentialStore,
    coordinator: RefreshCoordinator,
    invalidation: Arc<SessionInvalidationHandler>,
}

impl AuthClient {
    /// Start building a client for the given configuration.
    pub fn builder(config: ClientConfig) -> AuthClientBuilder {
        AuthClientBuilder::new(config)
    }

    /// Returns the API base URL.
    pub fn api_url(&self) -> &ApiUrl {
        self.inner.api.base()
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Returns the credential store.
    pub fn store(&self) -> &CredentialStore {
        &self.inner.store
    }

    /// Returns the session invalidation handler.
    pub fn invalidation(&self) -> &SessionInvalidationHandler {
        &self.inner.invalidation
    }

    /// Returns true while a token renewal is in flight.
    pub fn is_renewing(&self) -> bool {
        self.inner.coordinator.is_renewing()
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Send a request with the current access token.
    ///
    /// # Errors
    ///
    /// - Transport failures are returned untouched and never trigger renewal.
    /// - A 401 triggers renewal; if renewal fails its error is returned.
    /// - A 401 on the replay is returned as the protocol error.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn send(&self, request: &RequestDescriptor) -> Result<ApiResponse> {
        let mut attempt = Attempt::first(request);
        loop {
            let token = match attempt.replay_token() {
                Some(token) => Some(token.clone()),
                None => self.inner.store.access_token()?,
            };

            match self.inner.api.execute(request, token.as_ref()).await {
                Err(err) if err.is_unauthorized() => {
                    let renewed = self
                        .inner
                        .coordinator
                        .handle_auth_failure(&attempt, err)
                        .await?;
                    debug!("Replaying with renewed token");
                    attempt = attempt.replay(renewed);
                }
                outcome => return outcome,
            }
        }
    }

    /// Send a request and decode its JSON body.
    pub async fn send_json<R: DeserializeOwned>(&self, request: &RequestDescriptor) -> Result<R> {
        self.send(request).await?.json()
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.send_json(&RequestDescriptor::get(path)).await
    }

    pub async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        self.send_json(&RequestDescriptor::post(path).try_with_json(body)?)
            .await
    }

    pub async fn put<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        self.send_json(&RequestDescriptor::put(path).try_with_json(body)?)
            .await
    }

    pub async fn patch<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        self.send_json(&RequestDescriptor::patch(path).try_with_json(body)?)
            .await
    }

    /// Delete a resource; the response body, if any, is discarded.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(&RequestDescriptor::delete(path)).await.map(|_| ())
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Exchange a username and password for a token pair and store it.
    ///
    /// `scope` decides whether the session survives restarts.
    #[instrument(skip(self, credentials), fields(username = credentials.username(), %scope))]
    pub async fn login(&self, credentials: &LoginCredentials, scope: Scope) -> Result<()> {
        info!("Logging in");

        let request = ObtainTokenRequest {
            username: credentials.username(),
            password: credentials.password(),
        };

        let response: ObtainTokenResponse = self
            .inner
            .api
            .post_json(&self.inner.config.login_path, &request)
            .await
            .map_err(|err| match err {
                Error::Protocol(protocol) if matches!(protocol.status, 400 | 401) => {
                    AuthError::InvalidCredentials(
                        protocol
                            .detail
                            .unwrap_or_else(|| "login rejected".to_string()),
                    )
                    .into()
                }
                other => other,
            })?;

        let pair = CredentialPair::new(
            AccessToken::new(response.access),
            response.refresh.map(RefreshToken::new),
        );
        self.establish(&pair, scope)?;

        debug!("Logged in successfully");
        Ok(())
    }

    /// Install a credential pair obtained elsewhere as the current session.
    pub fn establish(&self, pair: &CredentialPair, scope: Scope) -> Result<()> {
        self.inner.store.establish(pair, scope)?;
        self.inner.invalidation.rearm();
        Ok(())
    }

    /// Renew the access token now.
    ///
    /// Joins a renewal already in flight instead of starting another. A
    /// failure invalidates the session exactly as a failed 401 renewal does.
    pub async fn renew(&self) -> Result<()> {
        self.inner.coordinator.renew().await.map(|_| ())
    }

    /// Fetch the caller's permission profile.
    pub async fn permissions(&self) -> Result<PermissionProfile> {
        self.get(&self.inner.config.profile_path).await
    }

    /// Forget the current session without navigating anywhere.
    pub fn logout(&self) -> Result<()> {
        info!("Logging out");
        self.inner.store.clear()
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("api", &self.inner.config.base_url)
            .field("store", &self.inner.store)
            .finish()
    }
}

/// Builder wiring an [`AuthClient`] to its collaborators.
///
/// Defaults: in-memory credential store, a [`WatchNavigator`], and a
/// [`BroadcastNotifier`].
pub struct AuthClientBuilder {
    config: ClientConfig,
    store: Option<CredentialStore>,
    navigator: Option<Arc<dyn Navigator>>,
    notifier: Option<Arc<dyn PermissionNotifier>>,
}

impl AuthClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            store: None,
            navigator: None,
            notifier: None,
        }
    }

    pub fn store(mut self, store: CredentialStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn PermissionNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<AuthClient> {
        let api = ApiClient::new(&self.config)?;
        let store = self.store.unwrap_or_else(CredentialStore::in_memory);
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(WatchNavigator::new()));
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(BroadcastNotifier::default()));

        let invalidation = Arc::new(SessionInvalidationHandler::new(store.clone(), navigator));
        let broadcaster =
            PermissionBroadcaster::new(api.clone(), self.config.profile_path.clone(), notifier);
        let coordinator = RefreshCoordinator::new(
            store.clone(),
            api.clone(),
            self.config.refresh_path.clone(),
            invalidation.clone(),
            broadcaster,
        );

        Ok(AuthClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                api,
                store,
                coordinator,
                invalidation,
            }),
        })
    }
}
