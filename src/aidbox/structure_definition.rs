//! StructureDefinition resource
//!
//! Besides plain CRUD, core definitions can be looked up and replaced by
//! canonical URL. Those helpers work on the full JSON object because
//! overrides carry elements the typed model does not know about.

use super::client::ApiClient;
use super::error::AidboxError;
use super::resource::{impl_resource, Bundle, ResourceBase};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinition {
    #[serde(flatten)]
    pub base: ResourceBase,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub base_definition: String,
    #[serde(default)]
    pub derivation: String,
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub version: String,
    /// Element differences from the base definition, kept as raw JSON
    #[serde(default)]
    pub differential: Option<Value>,
}

impl_resource!(StructureDefinition, "StructureDefinition", "fhir/StructureDefinition");

fn by_url_path(canonical_url: &str) -> String {
    format!(
        "fhir/StructureDefinition?url={}",
        urlencoding::encode(canonical_url)
    )
}

/// Look up the single StructureDefinition with the given canonical URL
///
/// No match is reported as [`AidboxError::NotFound`]; more than one match is
/// an error.
pub async fn get_structure_definition_by_url(
    client: &ApiClient,
    canonical_url: &str,
    box_id: &str,
) -> Result<Map<String, Value>> {
    let bundle: Bundle = client.get_json(&by_url_path(canonical_url), box_id).await?;

    let mut entries = bundle.entry;
    match entries.len() {
        0 => Err(anyhow::Error::from(AidboxError::NotFound).context(format!(
            "StructureDefinition with canonical url '{}' does not exist",
            canonical_url
        ))),
        1 => match entries.remove(0).resource {
            Value::Object(definition) => Ok(definition),
            other => bail!(
                "StructureDefinition with canonical url '{}' is not a JSON object: {}",
                canonical_url,
                other
            ),
        },
        n => bail!(
            "found {} StructureDefinition entries for canonical url '{}', expected 1",
            n,
            canonical_url
        ),
    }
}

/// Replace the StructureDefinition with the given canonical URL
pub async fn update_structure_definition_by_url(
    client: &ApiClient,
    definition: &Map<String, Value>,
    canonical_url: &str,
    box_id: &str,
) -> Result<Map<String, Value>> {
    client
        .put_json(&by_url_path(canonical_url), definition, box_id)
        .await
}
