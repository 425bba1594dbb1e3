//! Resource and data source adapters
//!
//! One module per Aidbox resource. Each maps between the attribute bag and
//! the typed model in [`crate::aidbox`] and declares the schema users write
//! configuration against.

pub mod access_policy;
pub mod auth_client;
pub mod db_migration;
pub mod gcp_service_account;
pub mod identity_provider;
pub mod multibox;
pub mod questionnaire_theme;
pub mod sdc_config;
pub mod search;
pub mod search_parameter;
pub mod structure_definition;
pub mod subscription;
pub mod token_introspector;
pub mod user;

use super::data::{block_str, ResourceData};
use super::diff::json_diff_suppress;
use super::schema::Attribute;
use crate::aidbox::resource::Reference;
use crate::aidbox::AidboxError;
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::str::FromStr;

/// String attribute holding a raw JSON document
pub(crate) fn json_attribute(description: &str) -> Attribute {
    Attribute::string(description)
        .validate(validate_json)
        .diff_suppress(json_diff_suppress)
        .diff_suppress_on_refresh()
}

pub(crate) fn validate_json(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some("") | None => Ok(()),
        Some(raw) => serde_json::from_str::<Value>(raw)
            .map(|_| ())
            .map_err(|e| format!("Invalid JSON: {}", e)),
    }
}

/// Parse a JSON string attribute; unset or empty reads as `None`
pub(crate) fn get_json(data: &ResourceData, key: &str) -> Result<Option<Value>> {
    match data.get_ok(key).and_then(Value::as_str) {
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .with_context(|| format!("Attribute {} does not contain valid JSON", key)),
        None => Ok(None),
    }
}

/// Compact JSON text of a document stored in a string attribute
pub(crate) fn json_text(value: &Value) -> Result<String> {
    serde_json::to_string(value).context("Failed to encode JSON attribute")
}

pub(crate) fn validate_enum<E>(value: &Value) -> Result<(), String>
where
    E: FromStr<Err = AidboxError>,
{
    match value.as_str() {
        Some(s) => E::from_str(s).map(|_| ()).map_err(|e| e.to_string()),
        None => Ok(()),
    }
}

pub(crate) fn validate_enum_list<E>(value: &Value) -> Result<(), String>
where
    E: FromStr<Err = AidboxError>,
{
    match value {
        Value::Array(items) => items.iter().try_for_each(validate_enum::<E>),
        _ => Ok(()),
    }
}

/// Single `{resource_id, resource_type}` block
pub(crate) fn reference_attribute(description: &str) -> Attribute {
    Attribute::block(
        description,
        [
            (
                "resource_id",
                Attribute::string("The ID of the referenced resource").required(),
            ),
            (
                "resource_type",
                Attribute::string("The type of the referenced resource").required(),
            ),
        ],
    )
}

pub(crate) fn reference_from_block(block: &Map<String, Value>) -> Reference {
    Reference {
        id: block_str(block, "resource_id"),
        resource_type: block_str(block, "resource_type"),
    }
}

pub(crate) fn reference_to_block(reference: &Reference) -> Value {
    json!({
        "resource_id": reference.id,
        "resource_type": reference.resource_type,
    })
}

/// The first `reference` block, which the schema requires
pub(crate) fn required_reference(data: &ResourceData) -> Result<Reference> {
    data.get_block("reference")
        .map(|block| reference_from_block(&block))
        .context("Attribute reference is required")
}
