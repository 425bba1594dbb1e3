//! aidbox_structure_definition and aidbox_structure_definition_override resources
//!
//! An override replaces a core FHIR StructureDefinition in place. The core
//! definition cannot be deleted without breaking the server, so the override
//! keeps a backup of the original in state and restores it on delete. There
//! is no import: once overridden, the original is no longer on the server.

use super::{get_json, json_attribute, json_text};
use crate::aidbox::resource::ResourceBase;
use crate::aidbox::structure_definition::{
    get_structure_definition_by_url, update_structure_definition_by_url, StructureDefinition,
};
use crate::aidbox::ApiClient;
use crate::provider::data::ResourceData;
use crate::provider::handler::{handle_not_found, ResourceHandler, ResourceMapping};
use crate::provider::schema::{Attribute, ResourceSchema};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

pub struct StructureDefinitionMapping;

impl ResourceMapping for StructureDefinitionMapping {
    type Model = StructureDefinition;

    const TYPE_NAME: &'static str = "aidbox_structure_definition";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "FHIR R4 StructureDefinition https://hl7.org/fhir/R4/structuredefinition.html",
            [
                ("name", Attribute::string("Computer friendly name of the resource").required()),
                (
                    "url",
                    Attribute::string("Canonical URL that's unique to this StructureDefinition").required(),
                ),
                (
                    "base_definition",
                    Attribute::string("Definition that this type is constrained/specialized from").required(),
                ),
                (
                    "derivation",
                    Attribute::string("Value of specialization | constraint").required(),
                ),
                ("abstract", Attribute::bool("Whether the structure is abstract").required()),
                (
                    "type",
                    Attribute::string("The FHIR type defined or constrained by this structure").required(),
                ),
                (
                    "status",
                    Attribute::string("Value of draft | active | retired | unknown").required(),
                ),
                (
                    "kind",
                    Attribute::string("Value of primitive-type | complex-type | resource | logical").required(),
                ),
                (
                    "version",
                    Attribute::string("Business version of the structure definition").required(),
                ),
                (
                    "differential",
                    json_attribute("The value of StructureDefinition.differential expressed as a raw JSON string value")
                        .required(),
                ),
            ],
        )
        .importable()
    }

    fn from_data(data: &ResourceData) -> Result<StructureDefinition> {
        Ok(StructureDefinition {
            base: ResourceBase::with_id(data.id()),
            name: data.get_str("name"),
            url: data.get_str("url"),
            base_definition: data.get_str("base_definition"),
            derivation: data.get_str("derivation"),
            is_abstract: data.get_bool("abstract"),
            type_name: data.get_str("type"),
            status: data.get_str("status"),
            kind: data.get_str("kind"),
            version: data.get_str("version"),
            differential: get_json(data, "differential")?,
        })
    }

    fn to_data(definition: &StructureDefinition, data: &mut ResourceData) -> Result<()> {
        data.set_id(definition.base.id.as_str());
        data.set("name", definition.name.as_str());
        data.set("url", definition.url.as_str());
        data.set("base_definition", definition.base_definition.as_str());
        data.set("derivation", definition.derivation.as_str());
        data.set("abstract", definition.is_abstract);
        data.set("type", definition.type_name.as_str());
        data.set("status", definition.status.as_str());
        data.set("kind", definition.kind.as_str());
        data.set("version", definition.version.as_str());
        let differential = definition.differential.clone().unwrap_or(Value::Null);
        data.set("differential", json_text(&differential)?);
        Ok(())
    }
}

// =============================================================================
// Override of a core StructureDefinition
// =============================================================================

const OVERRIDE: &str = "structure_definition_override";
const ORIGINAL: &str = "original_structure_definition";

pub struct StructureDefinitionOverride;

fn parse_definition(data: &ResourceData, key: &str) -> Result<Map<String, Value>> {
    let raw = data.get_str(key);
    serde_json::from_str(&raw).with_context(|| format!("Attribute {} must be a JSON object", key))
}

fn canonical_url_of(definition: &Map<String, Value>) -> &str {
    definition.get("url").and_then(Value::as_str).unwrap_or_default()
}

/// Store a server definition as the override, keyed by its canonical URL
fn store_override(mut definition: Map<String, Value>, canonical_url: &str, data: &mut ResourceData) -> Result<()> {
    // the server-assigned id only adds noise when comparing states
    definition.shift_remove("id");
    data.set("url", canonical_url);
    data.set_id(canonical_url);
    data.set(OVERRIDE, json_text(&Value::Object(definition))?);
    Ok(())
}

#[async_trait]
impl ResourceHandler for StructureDefinitionOverride {
    fn type_name(&self) -> &'static str {
        "aidbox_structure_definition_override"
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(
            "A specialization of StructureDefinition which allows you to override the default version of \
             StructureDefinitions that are specified inside the core FHIR IG used on the server. This means default \
             rules of resources can be changed without having the client specify a meta.profile in their request.",
            [
                (
                    "url",
                    Attribute::string("Canonical URL that's unique to this StructureDefinition")
                        .required()
                        .force_new(),
                ),
                (
                    OVERRIDE,
                    json_attribute("A customized StructureDefinition, based on the original one from the core FHIR spec")
                        .required()
                        .sensitive(),
                ),
                (
                    ORIGINAL,
                    Attribute::string("Backup of the original StructureDefinition, which will be restored upon deleting the override")
                        .computed()
                        .sensitive(),
                ),
            ],
        )
        .with_base()
    }

    async fn create(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let canonical_url = data.get_str("url");
        let box_id = data.box_id();

        let original = get_structure_definition_by_url(client, &canonical_url, &box_id)
            .await
            .context("Failed to back up the original StructureDefinition")?;
        data.set(ORIGINAL, json_text(&Value::Object(original))?);

        let requested = parse_definition(data, OVERRIDE)?;
        let updated = update_structure_definition_by_url(client, &requested, &canonical_url, &box_id).await?;
        let updated_url = canonical_url_of(&updated).to_string();
        if updated_url != canonical_url {
            bail!(
                "canonical url of resource unexpectedly changed after update, {} was set on the resource but server responded with {}",
                canonical_url,
                updated_url
            );
        }
        tracing::info!("Overrode StructureDefinition {}", canonical_url);
        store_override(updated, &updated_url, data)
    }

    async fn read(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let canonical_url = data.get_str("url");
        let result = get_structure_definition_by_url(client, &canonical_url, &data.box_id()).await;
        let current = match result {
            Ok(current) => current,
            Err(e) if handle_not_found(&e, data) => return Ok(()),
            Err(e) => return Err(e),
        };
        let current_url = canonical_url_of(&current).to_string();
        if current_url != canonical_url {
            bail!(
                "canonical url of resource unexpectedly changed during state refresh, {} was set on the resource but server responded with {}",
                canonical_url,
                current_url
            );
        }
        store_override(current, &current_url, data)
    }

    async fn update(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let canonical_url = data.get_str("url");
        let requested = parse_definition(data, OVERRIDE)?;
        let mut updated =
            update_structure_definition_by_url(client, &requested, &canonical_url, &data.box_id()).await?;
        updated.shift_remove("id");
        data.set(OVERRIDE, json_text(&Value::Object(updated))?);
        Ok(())
    }

    async fn delete(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let canonical_url = data.get_str("url");
        let original = parse_definition(data, ORIGINAL)?;
        update_structure_definition_by_url(client, &original, &canonical_url, &data.box_id())
            .await
            .with_context(|| format!("Failed to restore the original StructureDefinition {}", canonical_url))?;
        tracing::info!("Restored original StructureDefinition {}", canonical_url);
        data.clear_id();
        Ok(())
    }
}
