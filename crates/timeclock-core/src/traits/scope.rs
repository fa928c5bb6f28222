//! Key-value storage scope trait.

use crate::Result;
use crate::credentials::Scope;

/// One key-value storage area holding `access_token` / `refresh_token`
/// entries.
///
/// The credential store owns two of these, one per [`Scope`].
/// Implementations must be cheap to call from async code: every call
/// happens between network round-trips, never across one.
pub trait KeyValueScope: Send + Sync {
    /// Which lifetime this scope provides.
    fn scope(&self) -> Scope;

    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
