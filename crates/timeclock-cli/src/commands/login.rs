//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use timeclock_core::{LoginCredentials, Scope};

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account username
    #[arg(long)]
    pub username: String,

    /// Account password
    #[arg(long, env = "TIMECLOCK_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Keep the session across restarts
    #[arg(long)]
    pub remember: bool,
}

pub async fn run(args: LoginArgs, client_args: &ClientArgs) -> Result<()> {
    let client = session::client(client_args)?;
    let credentials = LoginCredentials::new(&args.username, &args.password);
    let scope = if args.remember {
        Scope::Persistent
    } else {
        Scope::Session
    };

    eprintln!("{}", "Logging in...".dimmed());

    client
        .login(&credentials, scope)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("User", &args.username);
    output::field("API", client.api_url().as_str());
    output::field("Scope", scope.as_str());

    Ok(())
}
