//! aidbox_box resource
//!
//! Boxes only exist in multibox mode and are managed through RPC as the
//! superuser. There is no update call, so every attribute forces
//! replacement.

use crate::aidbox::multibox::{create_box, delete_box, get_box, BoxResource};
use crate::aidbox::resource::ResourceBase;
use crate::aidbox::ApiClient;
use crate::provider::data::ResourceData;
use crate::provider::handler::{handle_not_found, ResourceHandler};
use crate::provider::schema::{Attribute, AttributeType, ResourceSchema};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;

pub struct BoxHandler;

/// Parse `key=value` entries; the value may itself contain '='
pub fn parse_env(entries: &[String]) -> Result<BTreeMap<String, String>> {
    entries
        .iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .with_context(|| format!("Invalid env entry '{}', expected KEY=VALUE", entry))
        })
        .collect()
}

fn box_from_data(data: &ResourceData) -> Result<BoxResource> {
    Ok(BoxResource {
        base: ResourceBase::with_id(data.get_str("name")),
        description: data.get_str("description"),
        fhir_version: data.get_str("fhir_version"),
        env: parse_env(&data.get_str_list("env"))?,
        ..BoxResource::default()
    })
}

fn box_to_data(found: &BoxResource, data: &mut ResourceData) {
    data.set_id(found.base.id.as_str());
    data.set("name", found.base.id.as_str());
    data.set("description", found.description.as_str());
    data.set("fhir_version", found.fhir_version.as_str());
    data.set("box_url", found.box_url.as_str());
    let env: Vec<String> = found
        .env
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    data.set("env", env);
}

fn validate_env(value: &serde_json::Value) -> Result<(), String> {
    let entries: Vec<String> = value
        .as_array()
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    parse_env(&entries).map(|_| ()).map_err(|e| e.to_string())
}

#[async_trait]
impl ResourceHandler for BoxHandler {
    fn type_name(&self) -> &'static str {
        "aidbox_box"
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(
            "Box https://docs.aidbox.app/multibox/multibox-box-manager-api.",
            [
                (
                    "name",
                    Attribute::string("id of the box to create. Must match /[a-z][a-z0-9]{4,}/")
                        .required()
                        .force_new(),
                ),
                (
                    "description",
                    Attribute::string("Description of box for human users.")
                        .optional()
                        .force_new(),
                ),
                (
                    "fhir_version",
                    Attribute::string("FHIR version. Value must be from the multibox/versions response.")
                        .required()
                        .force_new(),
                ),
                (
                    "env",
                    Attribute::set_of(
                        AttributeType::String,
                        "Environment variables as KEY=VALUE, keys in lower-kebab-case (not in UPPER_SNAKE_CASE).",
                    )
                    .optional()
                    .force_new()
                    .validate(validate_env),
                ),
                ("box_url", Attribute::string("URL for accessing the box").computed()),
            ],
        )
        .importable()
        .not_updatable()
    }

    async fn create(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let requested = box_from_data(data)?;
        let created = create_box(client, &requested).await?;
        box_to_data(&created, data);
        Ok(())
    }

    async fn read(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let result = get_box(client, data.id()).await;
        match result {
            Ok(found) => {
                box_to_data(&found, data);
                Ok(())
            }
            Err(e) if handle_not_found(&e, data) => Ok(()),
            Err(e) => Err(e.context(format!("Failed to read box {}", data.id()))),
        }
    }

    async fn update(&self, _client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        bail!("Box {} cannot be updated in place, it has to be replaced", data.id())
    }

    async fn delete(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        delete_box(client, data.id())
            .await
            .with_context(|| format!("Failed to delete box {}", data.id()))?;
        tracing::info!("Deleted box {}", data.id());
        data.clear_id();
        Ok(())
    }

    async fn import(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let found = get_box(client, data.id())
            .await
            .with_context(|| format!("Failed to import box {}", data.id()))?;
        box_to_data(&found, data);
        Ok(())
    }
}
