//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs, client_args: &ClientArgs) -> Result<()> {
    let client = session::active_client(client_args)?;
    let scope = client
        .store()
        .active_scope()?
        .context("No active session. Run 'timeclock login' first.")?;

    output::field("API", client.api_url().as_str());
    output::field("Scope", scope.as_str());

    let profile = client
        .permissions()
        .await
        .context("Failed to fetch permissions")?;

    output::field("Role", profile.role.as_deref().unwrap_or("-"));
    output::field("Permissions", &profile.permissions.join(", "));

    Ok(())
}
