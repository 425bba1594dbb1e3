//! IdentityProvider resource
//!
//! External OAuth/OpenID Connect provider users can sign in with.

use super::enums::UserinfoSource;
use super::resource::{impl_resource, ResourceBase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityProvider {
    #[serde(flatten)]
    pub base: ResourceBase,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub authorize_endpoint: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_endpoint: String,
    #[serde(rename = "userinfo-source", default, skip_serializing_if = "Option::is_none")]
    pub userinfo_source: Option<UserinfoSource>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub userinfo_endpoint: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<IdentityProviderClient>,
}

/// Credentials Aidbox presents to the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityProviderClient {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret: String,
}

impl_resource!(IdentityProvider, "IdentityProvider", "IdentityProvider");
