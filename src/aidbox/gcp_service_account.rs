//! GcpServiceAccount resource

use super::resource::{impl_resource, ResourceBase};
use serde::{Deserialize, Serialize};

/// Google Cloud credentials Aidbox uses for signed storage URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcpServiceAccount {
    #[serde(flatten)]
    pub base: ResourceBase,
    #[serde(
        rename = "service-account-email",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub service_account_email: String,
    #[serde(rename = "private-key", default, skip_serializing_if = "String::is_empty")]
    pub private_key: String,
}

impl_resource!(GcpServiceAccount, "GcpServiceAccount", "fhir/GcpServiceAccount", true);
