//! timeclock-core - Core types and traits for the timeclock API client.
//!
//! This crate holds the vocabulary shared by the request client and its
//! consumers: token types, the credential pair and its storage scopes, the
//! unified error type, and the collaborator traits the client calls out to
//! (storage scopes, login navigation, permission notifications).

pub mod credentials;
pub mod error;
pub mod profile;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::{CredentialPair, LoginCredentials, Scope, StoredCredentials};
pub use error::Error;
pub use profile::{PERMISSIONS_REFRESHED, PermissionProfile, PermissionsRefreshed};
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{KeyValueScope, Navigator, PermissionNotifier};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
