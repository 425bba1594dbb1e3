//! Multibox box management
//!
//! Boxes are tenants of a multibox deployment. They are not REST resources;
//! the box manager is reached only through RPC as the superuser.

use super::client::ApiClient;
use super::resource::ResourceBase;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// A box (tenant) in a multibox deployment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxResource {
    #[serde(flatten)]
    pub base: ResourceBase,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "fhirVersion", default)]
    pub fhir_version: String,
    #[serde(rename = "access-token", default, skip_serializing_if = "String::is_empty")]
    pub access_token: String,
    #[serde(rename = "box-url", default, skip_serializing_if = "String::is_empty")]
    pub box_url: String,
    /// Environment in lower-kebab-case keys
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// Create a box, then read it back to learn its URL and token
pub async fn create_box(client: &ApiClient, requested: &BoxResource) -> Result<BoxResource> {
    let created: BoxResource = client
        .rpc("multibox/create-box", requested, "")
        .await
        .with_context(|| format!("Failed to create box '{}'", requested.base.id))?;
    tracing::info!("Created box {}", created.base.id);
    get_box(client, &created.base.id).await
}

pub async fn get_box(client: &ApiClient, id: &str) -> Result<BoxResource> {
    client.rpc("multibox/get-box", &json!({ "id": id }), "").await
}

/// Delete a box and forget its cached token
pub async fn delete_box(client: &ApiClient, id: &str) -> Result<()> {
    let _: Value = client
        .rpc("multibox/delete-box", &json!({ "id": id }), "")
        .await?;
    client.forget_box(id).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_wire_format() {
        let body = json!({
            "id": "ankh",
            "description": "City box",
            "fhirVersion": "fhir-4.0.1",
            "access-token": "tok",
            "box-url": "https://ankh.example",
            "env": {"aidbox-client-id": "root"}
        });
        let parsed: BoxResource = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.base.id, "ankh");
        assert_eq!(parsed.box_url, "https://ankh.example");
        assert_eq!(parsed.env.get("aidbox-client-id").map(String::as_str), Some("root"));
    }

    #[test]
    fn test_unset_token_and_url_are_not_sent() {
        let requested = BoxResource {
            base: ResourceBase::with_id("ankh"),
            fhir_version: "fhir-4.0.1".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&requested).unwrap(),
            json!({"id": "ankh", "description": "", "fhirVersion": "fhir-4.0.1"})
        );
    }
}
