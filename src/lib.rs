//! Declarative management of Aidbox and multibox FHIR server configuration
//!
//! [`aidbox`] is the typed HTTP/RPC client, [`provider`] the resource
//! lifecycle built on it and [`config`] the provider settings.

pub mod aidbox;
pub mod config;
pub mod provider;

/// Version injected at compile time via AIDBOX_PROVIDER_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("AIDBOX_PROVIDER_VERSION") {
    Some(v) => v,
    None => "dev",
};
