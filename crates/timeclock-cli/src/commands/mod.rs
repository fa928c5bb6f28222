//! Command implementations.

pub mod login;
pub mod logout;
pub mod refresh;
pub mod request;
pub mod whoami;

use anyhow::Result;

use crate::cli::{ClientArgs, Commands};

pub async fn handle(command: Commands, client: &ClientArgs) -> Result<()> {
    match command {
        Commands::Login(args) => login::run(args, client).await,
        Commands::Whoami(args) => whoami::run(args, client).await,
        Commands::Request(args) => request::run(args, client).await,
        Commands::Refresh(args) => refresh::run(args, client).await,
        Commands::Logout(args) => logout::run(args, client).await,
    }
}
