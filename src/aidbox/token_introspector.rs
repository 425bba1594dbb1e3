//! TokenIntrospector resource
//!
//! Teaches Aidbox to accept tokens issued elsewhere, either JWTs verified
//! against a key set or opaque tokens checked with an introspection endpoint.

use super::enums::TokenIntrospectorType;
use super::resource::{impl_resource, ResourceBase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenIntrospector {
    #[serde(flatten)]
    pub base: ResourceBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introspection_endpoint: Option<IntrospectionEndpoint>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub jwks_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<IntrospectorJwt>,
    #[serde(rename = "type")]
    pub kind: TokenIntrospectorType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntrospectionEndpoint {
    #[serde(default)]
    pub authorization: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntrospectorJwt {
    #[serde(default)]
    pub iss: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret: String,
}

impl_resource!(TokenIntrospector, "TokenIntrospector", "TokenIntrospector");
