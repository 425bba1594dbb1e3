//! Aidbox API interaction module
//!
//! This module provides the client side of the Aidbox REST and multibox RPC
//! APIs: transport, authentication, the `resourceType` discriminator and one
//! module per managed resource.
//!
//! # Module Structure
//!
//! - [`client`] - Main API client with typed CRUD and RPC calls
//! - [`http`] - HTTP transport and status handling
//! - [`auth`] - Basic auth and per-box token routing
//! - [`rpc`] - `/rpc` envelope
//! - [`resource`] - Shared resource types and the discriminator decoder
//! - [`enums`] - String-marshalled enums
//! - [`error`] - Errors callers branch on
//!
//! # Example
//!
//! ```ignore
//! use aidbox_provider::aidbox::{access_policy::AccessPolicy, client::ApiClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = ApiClient::new("http://localhost:8888", "root", "secret", false)?;
//!     let policy: AccessPolicy = client.get("allow-all", "").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod enums;
pub mod error;
pub mod http;
pub mod resource;
pub mod rpc;

pub mod access_policy;
pub mod auth_client;
pub mod db_migration;
pub mod gcp_service_account;
pub mod identity_provider;
pub mod multibox;
pub mod questionnaire_theme;
pub mod sdc_config;
pub mod search;
pub mod search_parameter;
pub mod structure_definition;
pub mod subscription;
pub mod token_introspector;
pub mod user;

pub use client::ApiClient;
pub use error::{is_not_found, AidboxError};
