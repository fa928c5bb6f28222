//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::commands::{login, logout, refresh, request, whoami};

/// Command-line client for the timeclock HR/attendance API.
#[derive(Parser, Debug)]
#[command(name = "timeclock")]
#[command(author, version = env!("TIMECLOCK_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub client: ClientArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// API base URL
    #[arg(long, global = true, env = "TIMECLOCK_API", default_value = "http://localhost:8000")]
    pub api: String,

    /// Transport timeout in seconds
    #[arg(long, global = true, env = "TIMECLOCK_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session
    Login(login::LoginArgs),

    /// Display the active session and its permissions
    Whoami(whoami::WhoamiArgs),

    /// Send an authenticated request
    Request(request::RequestArgs),

    /// Renew the access token now
    Refresh(refresh::RefreshArgs),

    /// Forget the stored session
    Logout(logout::LogoutArgs),
}
