//! timeclock-http - Authenticated request client for the timeclock API.
//!
//! All application calls go through [`AuthClient`]. It attaches the stored
//! access token, and when the API answers 401 it coordinates a single
//! token renewal across every request that is failing at the same time,
//! replays each of them once with the new token, and signs the user out
//! when renewal is impossible.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use timeclock_core::{ApiUrl, LoginCredentials, Scope};
//! use timeclock_http::{AuthClient, ClientConfig, WatchNavigator};
//!
//! # async fn example() -> Result<(), timeclock_core::Error> {
//! let config = ClientConfig::new(ApiUrl::new("https://hr.example.com")?);
//! let navigator = Arc::new(WatchNavigator::new());
//! let client = AuthClient::builder(config)
//!     .navigator(navigator.clone())
//!     .build()?;
//!
//! client
//!     .login(&LoginCredentials::new("jdoe", "hunter2"), Scope::Session)
//!     .await?;
//!
//! let today: serde_json::Value = client.get("api/attendance/today/").await?;
//! println!("{today}");
//! # Ok(())
//! # }
//! ```

mod broadcaster;
mod client;
mod config;
mod coordinator;
mod http;
mod invalidation;
mod request;
pub mod store;

pub use broadcaster::BroadcastNotifier;
pub use client::{AuthClient, AuthClientBuilder};
pub use config::ClientConfig;
pub use invalidation::{SessionInvalidationHandler, SessionState, WatchNavigator};
pub use request::{ApiResponse, Method, RequestDescriptor};
pub use store::{CredentialStore, FileScope, MemoryScope};
