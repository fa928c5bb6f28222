//! Best-effort permission profile refresh after a renewal.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use timeclock_core::{
    AccessToken, PermissionNotifier, PermissionProfile, PermissionsRefreshed, Result,
};

use crate::http::ApiClient;

/// Fetches the caller's permission profile with a freshly renewed token and
/// publishes it as a `permissions-refreshed` event.
///
/// The fetch runs on its own task. Failures are logged and dropped; no
/// request ever waits on it.
#[derive(Clone)]
pub(crate) struct PermissionBroadcaster {
    api: ApiClient,
    profile_path: String,
    notifier: Arc<dyn PermissionNotifier>,
}

impl PermissionBroadcaster {
    pub(crate) fn new(
        api: ApiClient,
        profile_path: String,
        notifier: Arc<dyn PermissionNotifier>,
    ) -> Self {
        Self {
            api,
            profile_path,
            notifier,
        }
    }

    /// Fire-and-forget refresh on a spawned task.
    pub(crate) fn spawn(&self, token: AccessToken) {
        let broadcaster = self.clone();
        tokio::spawn(async move {
            if let Err(err) = broadcaster.refresh(&token).await {
                warn!(error = %err, "Permission profile refresh failed");
            }
        });
    }

    /// Fetch the profile and publish it.
    pub(crate) async fn refresh(&self, token: &AccessToken) -> Result<PermissionProfile> {
        debug!(path = %self.profile_path, "Fetching permission profile");
        let profile: PermissionProfile = self.api.get_authed(&self.profile_path, token).await?;

        info!(
            role = profile.role.as_deref().unwrap_or("-"),
            permissions = profile.permissions.len(),
            "Permissions refreshed"
        );
        self.notifier.publish(PermissionsRefreshed::new(profile.clone()));
        Ok(profile)
    }
}

impl std::fmt::Debug for PermissionBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionBroadcaster")
            .field("profile_path", &self.profile_path)
            .finish()
    }
}

/// A [`PermissionNotifier`] that fans events out to every subscriber.
///
/// Subscribers that fall more than `capacity` events behind skip ahead;
/// only the newest profile matters.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<PermissionsRefreshed>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PermissionsRefreshed> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

impl PermissionNotifier for BroadcastNotifier {
    fn publish(&self, event: PermissionsRefreshed) {
        if self.sender.send(event).is_err() {
            debug!("No permission listeners subscribed");
        }
    }
}
