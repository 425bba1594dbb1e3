//! SDCConfig resource (Structured Data Capture settings)

use super::resource::{impl_resource, ResourceBase};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdcConfig {
    #[serde(flatten)]
    pub base: ResourceBase,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Whether this is the config used when none is requested explicitly
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
    /// Attachment storage settings, kept as raw JSON
    #[serde(default)]
    pub storage: Option<Value>,
}

impl_resource!(SdcConfig, "SDCConfig", "SDCConfig");
