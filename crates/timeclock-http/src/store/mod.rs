//! Credential storage across the persistent and session scopes.

mod file;
mod memory;

use std::sync::Arc;

use tracing::debug;

use timeclock_core::credentials::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use timeclock_core::{
    AccessToken, CredentialPair, KeyValueScope, RefreshToken, Result, Scope, StoredCredentials,
};

pub use file::FileScope;
pub use memory::MemoryScope;

/// Reads and writes the credential pair in whichever scope owns the session.
///
/// Resolution prefers the persistent scope and falls back to the session
/// scope only when the persistent one holds no refresh token. Writers pass
/// the scope explicitly so a renewed token lands where its refresh token
/// came from.
#[derive(Clone)]
pub struct CredentialStore {
    persistent: Arc<dyn KeyValueScope>,
    session: Arc<dyn KeyValueScope>,
}

impl CredentialStore {
    /// Create a store over two scopes.
    pub fn new(persistent: Arc<dyn KeyValueScope>, session: Arc<dyn KeyValueScope>) -> Self {
        Self {
            persistent,
            session,
        }
    }

    /// A store whose scopes both live in process memory.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryScope::new(Scope::Persistent)),
            Arc::new(MemoryScope::new(Scope::Session)),
        )
    }

    fn scope(&self, scope: Scope) -> &dyn KeyValueScope {
        match scope {
            Scope::Persistent => self.persistent.as_ref(),
            Scope::Session => self.session.as_ref(),
        }
    }

    /// Determine which scope owns the current session, if any.
    pub fn active_scope(&self) -> Result<Option<Scope>> {
        for scope in Scope::ALL {
            if self.scope(scope).get(REFRESH_TOKEN_KEY)?.is_some() {
                return Ok(Some(scope));
            }
        }
        // No refresh token anywhere: fall back to a bare access token.
        for scope in Scope::ALL {
            if self.scope(scope).get(ACCESS_TOKEN_KEY)?.is_some() {
                return Ok(Some(scope));
            }
        }
        Ok(None)
    }

    /// Read the credential pair from the owning scope.
    ///
    /// Returns `None` when the owning scope has no access token.
    pub fn read(&self) -> Result<Option<StoredCredentials>> {
        let Some(scope) = self.active_scope()? else {
            return Ok(None);
        };
        let kv = self.scope(scope);
        let Some(access) = kv.get(ACCESS_TOKEN_KEY)? else {
            return Ok(None);
        };
        let refresh = kv.get(REFRESH_TOKEN_KEY)?;

        Ok(Some(StoredCredentials {
            pair: CredentialPair::new(AccessToken::new(access), refresh.map(RefreshToken::new)),
            scope,
        }))
    }

    /// Returns the access token to attach to outbound calls.
    pub fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self.read()?.map(|stored| stored.pair.access))
    }

    /// Returns the refresh token and the scope it lives in.
    pub fn refresh_token(&self) -> Result<Option<(RefreshToken, Scope)>> {
        for scope in Scope::ALL {
            if let Some(refresh) = self.scope(scope).get(REFRESH_TOKEN_KEY)? {
                return Ok(Some((RefreshToken::new(refresh), scope)));
            }
        }
        Ok(None)
    }

    /// Write a pair into one scope.
    ///
    /// A pair without a refresh token leaves any stored refresh token in
    /// place.
    pub fn write(&self, pair: &CredentialPair, scope: Scope) -> Result<()> {
        let kv = self.scope(scope);
        kv.set(ACCESS_TOKEN_KEY, pair.access.as_str())?;
        if let Some(refresh) = &pair.refresh {
            kv.set(REFRESH_TOKEN_KEY, refresh.as_str())?;
        }
        debug!(%scope, rotated = pair.refresh.is_some(), "Stored credentials");
        Ok(())
    }

    /// Replace only the access token in one scope.
    pub fn write_access(&self, token: &AccessToken, scope: Scope) -> Result<()> {
        self.scope(scope).set(ACCESS_TOKEN_KEY, token.as_str())?;
        debug!(%scope, "Stored access token");
        Ok(())
    }

    /// Start a new session: wipe both scopes, then write the pair into one.
    pub fn establish(&self, pair: &CredentialPair, scope: Scope) -> Result<()> {
        self.clear()?;
        self.write(pair, scope)
    }

    /// Remove credentials from both scopes.
    ///
    /// Every removal is attempted; the first failure is returned.
    pub fn clear(&self) -> Result<()> {
        let mut first_error = None;
        for scope in Scope::ALL {
            for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
                if let Err(err) = self.scope(scope).remove(key) {
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("persistent", &self.persistent.scope())
            .field("session", &self.session.scope())
            .finish()
    }
}
