//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, client_args: &ClientArgs) -> Result<()> {
    let client = session::client(client_args)?;
    client.logout().context("Failed to clear session")?;
    output::success("Logged out");
    Ok(())
}
