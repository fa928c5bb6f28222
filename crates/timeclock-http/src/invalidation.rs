//! Terminal session loss: purge credentials and route to login.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use timeclock_core::Navigator;

use crate::store::CredentialStore;

/// Clears every credential scope and sends the application to login when
/// a session cannot be renewed.
///
/// Several requests failing renewal together produce several calls; only
/// the first one navigates. Establishing new credentials re-arms it.
pub struct SessionInvalidationHandler {
    store: CredentialStore,
    navigator: Arc<dyn Navigator>,
    signalled: AtomicBool,
}

impl SessionInvalidationHandler {
    pub fn new(store: CredentialStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            signalled: AtomicBool::new(false),
        }
    }

    /// Purge credentials and, once per lost session, redirect to login.
    ///
    /// Never fails: a storage error while clearing is logged.
    pub fn invalidate(&self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "Failed to clear credentials during invalidation");
        }

        if self.signalled.swap(true, Ordering::AcqRel) {
            debug!("Session already invalidated");
            return;
        }

        info!("Session invalidated, redirecting to login");
        self.navigator.redirect_to_login();
    }

    /// Allow the next invalidation to navigate again, and tell the navigator
    /// a session is active.
    pub fn rearm(&self) {
        self.signalled.store(false, Ordering::Release);
        self.navigator.session_established();
    }

    /// Returns true once the current session has been invalidated.
    pub fn is_signalled(&self) -> bool {
        self.signalled.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for SessionInvalidationHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionInvalidationHandler")
            .field("signalled", &self.is_signalled())
            .finish()
    }
}

/// Whether the application may keep using its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    LoginRequired,
}

/// A [`Navigator`] that publishes the session state on a watch channel.
///
/// UI code awaits `changed()` on a receiver and shows its login screen when
/// the state flips to [`SessionState::LoginRequired`]. Establishing new
/// credentials through the client flips it back to [`SessionState::Active`].
#[derive(Debug)]
pub struct WatchNavigator {
    state: watch::Sender<SessionState>,
}

impl WatchNavigator {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Active);
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Flip back to active. Subscribers are only notified if the state
    /// actually changes.
    pub fn mark_active(&self) {
        self.state.send_if_modified(|state| {
            let changed = *state != SessionState::Active;
            *state = SessionState::Active;
            changed
        });
    }
}

impl Default for WatchNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for WatchNavigator {
    fn redirect_to_login(&self) {
        self.state.send_replace(SessionState::LoginRequired);
    }

    fn session_established(&self) {
        self.mark_active();
    }
}
