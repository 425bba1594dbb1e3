//! User resource (read only)

use super::resource::{impl_resource, ResourceBase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub base: ResourceBase,
    #[serde(rename = "twoFactor", default)]
    pub two_factor: TwoFactor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwoFactor {
    #[serde(default)]
    pub enabled: bool,
}

impl_resource!(User, "User", "User");
