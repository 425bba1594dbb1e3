//! AccessPolicy resource

use super::enums::AccessPolicyEngine;
use super::resource::{impl_resource, Reference, ResourceBase};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rule deciding whether a request is allowed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(flatten)]
    pub base: ResourceBase,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub engine: AccessPolicyEngine,
    /// JSON schema evaluated by the `json-schema` engine, kept as raw JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Clients, users or operations the policy applies to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<Reference>,
}

impl_resource!(AccessPolicy, "AccessPolicy", "AccessPolicy");
