//! Configuration Management
//!
//! Provider settings come from, in order of precedence: command line flags,
//! the config file, `AIDBOX_*` environment variables and built-in defaults.
//! The config file may be JSON or YAML.

use crate::aidbox::ApiClient;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_URL: &str = "http://localhost:8888";
pub const DEFAULT_CLIENT_ID: &str = "root";
pub const DEFAULT_CLIENT_SECRET: &str = "secret";

/// Provider settings as written in the config file or passed on the command line
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_multibox: Option<bool>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub url: String,
    pub client_id: String,
    pub client_secret: String,
    pub is_multibox: bool,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("aidbox-provider").join("config.json"))
    }

    /// Load configuration from disk
    ///
    /// An explicit path must exist. Without one the default path is used when
    /// present, otherwise the configuration is empty.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&path, &content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(content)?),
            _ => Ok(serde_json::from_str(content)?),
        }
    }

    /// Settings from `AIDBOX_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let is_multibox = match lookup("AIDBOX_IS_MULTIBOX") {
            Some(raw) => Some(parse_bool(&raw).context("Invalid AIDBOX_IS_MULTIBOX")?),
            None => None,
        };
        Ok(Self {
            url: lookup("AIDBOX_URL"),
            client_id: lookup("AIDBOX_CLIENT_ID"),
            client_secret: lookup("AIDBOX_CLIENT_SECRET"),
            is_multibox,
        })
    }

    /// Fill values unset here from `fallback`
    pub fn or(self, fallback: Config) -> Config {
        Config {
            url: self.url.or(fallback.url),
            client_id: self.client_id.or(fallback.client_id),
            client_secret: self.client_secret.or(fallback.client_secret),
            is_multibox: self.is_multibox.or(fallback.is_multibox),
        }
    }

    /// Apply defaults
    pub fn resolve(self) -> Settings {
        Settings {
            url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            client_id: self.client_id.unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
            client_secret: self.client_secret.unwrap_or_else(|| DEFAULT_CLIENT_SECRET.to_string()),
            is_multibox: self.is_multibox.unwrap_or(false),
        }
    }
}

/// 1, t, true and 0, f, false in the usual casings
fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => bail!("'{}' is not a boolean", other),
    }
}

impl Settings {
    /// Resolve settings from CLI flags, the config file and the environment
    pub fn load(cli: Config, config_path: Option<&Path>) -> Result<Self> {
        let file = Config::load(config_path)?;
        let env = Config::from_env()?;
        Ok(cli.or(file).or(env).resolve())
    }

    pub fn client(&self) -> Result<ApiClient> {
        tracing::info!(
            "Connecting to {} as {} (multibox: {})",
            self.url,
            self.client_id,
            self.is_multibox
        );
        ApiClient::new(&self.url, &self.client_id, &self.client_secret, self.is_multibox)
    }
}
