//! Birdr API client library.
//!
//! An async client for the Birdr social-posting service: log in, then post,
//! comment, follow, report and update the profile over HTTPS/JSON.
//!
//! ```no_run
//! use birdr_client::{Client, ClientConfig, Credentials};
//!
//! # async fn run() -> birdr_client::Result<()> {
//! let client = Client::new(&ClientConfig::default())?;
//! let me = client.login(Credentials::token("my-api-token")).await?;
//! println!("logged in as {}", me.username);
//!
//! let post = client.send_post("hello from rust").await?;
//! client.delete_post(&post.id).await?;
//! client.logout().await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod media;
pub mod models;

pub use auth::{AuthScheme, BearerAuth, SessionAuth};
pub use client::Client;
pub use config::{AuthSchemeKind, ClientConfig, ConfigError};
pub use error::{ClientError, Result};
pub use models::{Comment, Credentials, Message, Post, ProfileUpdate, ReportKind, User};
