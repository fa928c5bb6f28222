//! On-disk locations of the two credential scopes.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use timeclock_core::Scope;
use timeclock_http::{CredentialStore, FileScope};

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "timeclock").context("Could not determine config directory")
}

/// Persistent credentials live with the user's application data.
fn persistent_path(dirs: &ProjectDirs) -> Result<PathBuf> {
    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;
    Ok(data_dir.join("credentials.json"))
}

/// Session credentials live in the per-login runtime directory, which the
/// OS empties when the user logs out. Platforms without one use the cache.
fn session_path(dirs: &ProjectDirs) -> Result<PathBuf> {
    let dir = dirs
        .runtime_dir()
        .map(|dir| dir.to_path_buf())
        .unwrap_or_else(|| dirs.cache_dir().join("session"));
    fs::create_dir_all(&dir).context("Failed to create session directory")?;
    Ok(dir.join("session.json"))
}

/// Open the credential store backed by both scope files.
pub fn credential_store() -> Result<CredentialStore> {
    let dirs = project_dirs()?;

    let persistent = FileScope::new(persistent_path(&dirs)?, Scope::Persistent);
    let session = FileScope::new(session_path(&dirs)?, Scope::Session);
    tracing::debug!(
        persistent = %persistent.path().display(),
        session = %session.path().display(),
        "Credential scopes"
    );

    Ok(CredentialStore::new(Arc::new(persistent), Arc::new(session)))
}
