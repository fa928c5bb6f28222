//! Client construction for CLI commands.

pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use timeclock_core::{ApiUrl, Navigator};
use timeclock_http::{AuthClient, ClientConfig};

use crate::cli::ClientArgs;
use crate::output;

/// Tells the user to sign in again when the session cannot be renewed.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect_to_login(&self) {
        output::error("Session expired. Run 'timeclock login' to sign in again.");
    }
}

/// Build a client over the on-disk credential scopes.
pub fn client(args: &ClientArgs) -> Result<AuthClient> {
    let api = ApiUrl::new(&args.api).context("Invalid API URL")?;
    let config = ClientConfig::new(api).with_timeout(Duration::from_secs(args.timeout_secs));

    let client = AuthClient::builder(config)
        .store(storage::credential_store()?)
        .navigator(Arc::new(TerminalNavigator))
        .build()
        .context("Failed to build HTTP client")?;

    Ok(client)
}

/// Build a client and require a stored session.
pub fn active_client(args: &ClientArgs) -> Result<AuthClient> {
    let client = client(args)?;
    client
        .store()
        .read()
        .context("Failed to load session")?
        .context("No active session. Run 'timeclock login' first.")?;
    Ok(client)
}
