//! Client resource (OAuth client registered with Aidbox)

use super::enums::GrantType;
use super::resource::{impl_resource, ResourceBase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthClient {
    #[serde(flatten)]
    pub base: ResourceBase,
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub grant_types: Vec<GrantType>,
}

impl_resource!(AuthClient, "Client", "Client");
