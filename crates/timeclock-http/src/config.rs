//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use timeclock_core::ApiUrl;

use crate::http::endpoints::{PERMISSIONS_PROFILE, TOKEN_OBTAIN, TOKEN_REFRESH};

/// Default transport timeout; bounds how long queued callers wait on a renewal.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for an [`AuthClient`](crate::AuthClient).
///
/// Only the base URL is required; endpoint paths default to the API's
/// standard token and profile routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: ApiUrl,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_profile_path")]
    pub profile_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration with default paths for the given API.
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            profile_path: default_profile_path(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }

    /// Override the transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Override the renewal endpoint path.
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Override the permission profile endpoint path.
    pub fn with_profile_path(mut self, path: impl Into<String>) -> Self {
        self.profile_path = path.into();
        self
    }

    /// Returns the transport timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_login_path() -> String {
    TOKEN_OBTAIN.to_string()
}

fn default_refresh_path() -> String {
    TOKEN_REFRESH.to_string()
}

fn default_profile_path() -> String {
    PERMISSIONS_PROFILE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    concat!("timeclock/", env!("CARGO_PKG_VERSION")).to_string()
}
