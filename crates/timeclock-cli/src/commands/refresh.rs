//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, client_args: &ClientArgs) -> Result<()> {
    let client = session::active_client(client_args)?;

    eprintln!("{}", "Refreshing session...".dimmed());

    client.renew().await.context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    Ok(())
}
