//! Authorization profile and the event that publishes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the event published after a successful renewal.
pub const PERMISSIONS_REFRESHED: &str = "permissions-refreshed";

/// The caller's authorization profile as reported by the API.
///
/// `role` and `permissions` are the fields the application branches on;
/// anything else the server sends is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionProfile {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PermissionProfile {
    /// Check whether the profile grants a permission code.
    pub fn has(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// Event carrying a freshly fetched permission profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermissionsRefreshed {
    pub profile: PermissionProfile,
    pub refreshed_at: DateTime<Utc>,
}

impl PermissionsRefreshed {
    /// Wrap a profile fetched just now.
    pub fn new(profile: PermissionProfile) -> Self {
        Self {
            profile,
            refreshed_at: Utc::now(),
        }
    }

    /// Returns the event name.
    pub fn name(&self) -> &'static str {
        PERMISSIONS_REFRESHED
    }
}
