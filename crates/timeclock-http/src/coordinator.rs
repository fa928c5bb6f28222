//! Single-flight token renewal.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{Instrument, debug, info, instrument, warn};

use timeclock_core::error::{AuthError, Error};
use timeclock_core::{AccessToken, CredentialPair, RefreshToken, Result};

use crate::broadcaster::PermissionBroadcaster;
use crate::http::ApiClient;
use crate::http::endpoints::{RefreshTokenRequest, RefreshTokenResponse};
use crate::invalidation::SessionInvalidationHandler;
use crate::request::Attempt;
use crate::store::CredentialStore;

type RenewalOutcome = Result<AccessToken>;

/// A request suspended until the in-flight renewal settles.
struct PendingCaller {
    release: oneshot::Sender<RenewalOutcome>,
}

enum RenewalState {
    Idle,
    Renewing(Vec<PendingCaller>),
}

/// Owns the renewal protocol: one renewal at a time, every caller that
/// needs it waits for that one's outcome.
///
/// The renewal runs on its own task, so it settles even when the caller
/// that started it is dropped. The state lock is never held across an await.
#[derive(Clone)]
pub(crate) struct RefreshCoordinator {
    inner: Arc<Renewal>,
}

struct Renewal {
    state: Mutex<RenewalState>,
    store: CredentialStore,
    api: ApiClient,
    refresh_path: String,
    invalidation: Arc<SessionInvalidationHandler>,
    broadcaster: PermissionBroadcaster,
}

impl RefreshCoordinator {
    pub(crate) fn new(
        store: CredentialStore,
        api: ApiClient,
        refresh_path: String,
        invalidation: Arc<SessionInvalidationHandler>,
        broadcaster: PermissionBroadcaster,
    ) -> Self {
        Self {
            inner: Arc::new(Renewal {
                state: Mutex::new(RenewalState::Idle),
                store,
                api,
                refresh_path,
                invalidation,
                broadcaster,
            }),
        }
    }

    /// Returns true while a renewal is in flight.
    pub(crate) fn is_renewing(&self) -> bool {
        matches!(*self.inner.lock_state(), RenewalState::Renewing(_))
    }

    /// React to a 401 on `attempt`.
    ///
    /// A replay that is rejected again fails with `error` unchanged; a first
    /// attempt gets the renewed token to replay with, or the renewal error.
    pub(crate) async fn handle_auth_failure(
        &self,
        attempt: &Attempt<'_>,
        error: Error,
    ) -> Result<AccessToken> {
        if attempt.is_replay() {
            warn!(
                path = attempt.request().path(),
                "Request rejected after renewal, not retrying"
            );
            return Err(error);
        }

        debug!(path = attempt.request().path(), "Access token rejected");
        self.renew().await
    }

    /// Obtain a new access token, joining the in-flight renewal if there is one.
    pub(crate) async fn renew(&self) -> Result<AccessToken> {
        let (release, wait) = oneshot::channel();
        let start = {
            let mut state = self.inner.lock_state();
            match &mut *state {
                RenewalState::Renewing(pending) => {
                    pending.push(PendingCaller { release });
                    false
                }
                RenewalState::Idle => {
                    *state = RenewalState::Renewing(vec![PendingCaller { release }]);
                    true
                }
            }
        };

        if start {
            let renewal = Arc::clone(&self.inner);
            tokio::spawn(async move { renewal.run().await }.in_current_span());
        } else {
            debug!("Renewal already in flight, waiting for it");
        }

        wait.await.unwrap_or_else(|_| Err(AuthError::RenewalAbandoned.into()))
    }
}

impl Renewal {
    fn lock_state(&self) -> MutexGuard<'_, RenewalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drive one renewal to completion and release everyone waiting on it.
    ///
    /// Storage is updated, or the session invalidated, before any waiter
    /// observes the outcome.
    async fn run(&self) {
        let mut settle = Settle::new(&self.state);
        let outcome = self.exchange().await;

        match &outcome {
            Ok(token) => self.broadcaster.spawn(token.clone()),
            Err(err) => {
                warn!(error = %err, "Session renewal failed");
                self.invalidation.invalidate();
            }
        }

        let pending = settle.take_pending();
        debug!(waiters = pending.len(), ok = outcome.is_ok(), "Renewal settled");
        for caller in pending {
            // A caller that stopped waiting has dropped its receiver.
            let _ = caller.release.send(outcome.clone());
        }
    }

    /// Trade the stored refresh token for a new access token and store it in
    /// the scope the refresh token came from.
    #[instrument(skip(self), fields(path = %self.refresh_path))]
    async fn exchange(&self) -> Result<AccessToken> {
        let (refresh, scope) = self
            .store
            .refresh_token()?
            .ok_or(AuthError::RefreshTokenMissing)?;

        info!(%scope, "Renewing access token");

        let request = RefreshTokenRequest {
            refresh: refresh.as_str(),
        };
        let response: RefreshTokenResponse = self
            .api
            .post_json(&self.refresh_path, &request)
            .await
            .map_err(AuthError::from_refresh_failure)?;

        let access = AccessToken::new(response.access);
        match response.refresh {
            Some(rotated) => {
                let pair = CredentialPair::new(access.clone(), Some(RefreshToken::new(rotated)));
                self.store.write(&pair, scope)?;
            }
            None => self.store.write_access(&access, scope)?,
        }

        info!(%scope, "Access token renewed");
        Ok(access)
    }
}

/// Returns the state to `Idle` when the renewal task settles or unwinds.
///
/// If the task panics before `take_pending`, the pending senders are
/// dropped with it and every waiter fails with
/// [`AuthError::RenewalAbandoned`].
struct Settle<'a> {
    state: &'a Mutex<RenewalState>,
    settled: bool,
}

impl<'a> Settle<'a> {
    fn new(state: &'a Mutex<RenewalState>) -> Self {
        Self {
            state,
            settled: false,
        }
    }

    fn reset(&self) -> Vec<PendingCaller> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *state, RenewalState::Idle) {
            RenewalState::Renewing(pending) => pending,
            RenewalState::Idle => Vec::new(),
        }
    }

    fn take_pending(&mut self) -> Vec<PendingCaller> {
        self.settled = true;
        self.reset()
    }
}

impl Drop for Settle<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let abandoned = self.reset();
            warn!(waiters = abandoned.len(), "Renewal dropped before settling");
        }
    }
}
