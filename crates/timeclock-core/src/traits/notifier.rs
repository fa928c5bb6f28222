//! Event surface for refreshed permission profiles.

use crate::profile::PermissionsRefreshed;

/// Receives the `permissions-refreshed` event after a successful renewal.
///
/// Publishing must not block: it runs on the broadcaster's task and its
/// outcome is never reported back to request callers.
pub trait PermissionNotifier: Send + Sync {
    fn publish(&self, event: PermissionsRefreshed);
}
