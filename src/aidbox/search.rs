//! Search resource (named SQL search over a resource type)

use super::resource::{impl_resource, Reference, ResourceBase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Search {
    #[serde(flatten)]
    pub base: ResourceBase,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub module: String,
    pub resource: Reference,
    /// SQL fragment with `{{param}}` placeholder
    #[serde(rename = "where", default)]
    pub where_clause: String,
}

impl_resource!(Search, "Search", "Search");

impl Search {
    /// Searches are addressed as `<resource type>.<name>`
    pub fn make_id(resource_id: &str, name: &str) -> String {
        format!("{}.{}", resource_id, name)
    }
}
