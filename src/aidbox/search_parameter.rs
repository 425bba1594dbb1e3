//! SearchParameter resources
//!
//! Aidbox stores search parameters in two formats under the same
//! `resourceType`. The Aidbox format addresses elements with nested
//! path arrays; the FHIR R4 format uses a FHIRPath expression string and is
//! served under `fhir/SearchParameter`.

use super::enums::SearchParameterType;
use super::resource::{impl_resource, Reference, ResourceBase};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Aidbox-format search parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParameter {
    #[serde(flatten)]
    pub base: ResourceBase,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub module: String,
    #[serde(rename = "type")]
    pub kind: SearchParameterType,
    /// Element paths; each path is a list of names, indexes or `{key: value}` filters
    pub expression: Vec<Vec<Value>>,
    pub resource: Reference,
}

impl_resource!(SearchParameter, "SearchParameter", "SearchParameter");

impl SearchParameter {
    /// Aidbox search parameters are addressed as `<resource type>.<name>`
    pub fn make_id(resource_id: &str, name: &str) -> String {
        format!("{}.{}", resource_id, name)
    }
}

/// FHIR R4 search parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FhirSearchParameter {
    #[serde(flatten)]
    pub base: ResourceBase,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SearchParameterType,
    pub expression: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub code: String,
    /// Resource types the parameter applies to
    #[serde(rename = "base", default)]
    pub base_types: Vec<String>,
}

// Aidbox ignores the id in a POST body for this collection
impl_resource!(FhirSearchParameter, "SearchParameter", "fhir/SearchParameter", true);

impl FhirSearchParameter {
    /// Addressed as `<base types joined by '-'>.<name>`
    pub fn make_id(base: &[String], name: &str) -> String {
        format!("{}.{}", base.join("-"), name)
    }
}

/// Convert one textual path element to its wire form
///
/// `key|value` becomes a `{key: value}` filter, integers become indexes and
/// anything else is an element name.
pub fn expression_element_from_str(element: &str) -> Value {
    if let Some((key, value)) = element.split_once('|') {
        let mut filter = Map::new();
        filter.insert(key.to_string(), Value::String(value.to_string()));
        return Value::Object(filter);
    }
    if let Ok(index) = element.parse::<i64>() {
        return Value::from(index);
    }
    Value::String(element.to_string())
}

/// Inverse of [`expression_element_from_str`]
pub fn expression_element_to_string(element: &Value) -> String {
    match element {
        Value::String(name) => name.clone(),
        Value::Number(index) => index.to_string(),
        Value::Object(filter) => filter
            .iter()
            .map(|(key, value)| match value {
                Value::String(v) => format!("{}|{}", key, v),
                other => format!("{}|{}", key, other),
            })
            .last()
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expression_element_from_str() {
        assert_eq!(expression_element_from_str("identifier"), json!("identifier"));
        assert_eq!(expression_element_from_str("0"), json!(0));
        assert_eq!(expression_element_from_str("system|http://acme"), json!({"system": "http://acme"}));
    }

    #[test]
    fn test_expression_element_to_string() {
        assert_eq!(expression_element_to_string(&json!("value")), "value");
        assert_eq!(expression_element_to_string(&json!(2)), "2");
        assert_eq!(expression_element_to_string(&json!({"use": "official"})), "use|official");
    }

    #[test]
    fn test_ids() {
        assert_eq!(SearchParameter::make_id("Patient", "nhs"), "Patient.nhs");
        assert_eq!(
            FhirSearchParameter::make_id(&["Patient".to_string(), "Practitioner".to_string()], "nhs"),
            "Patient-Practitioner.nhs"
        );
    }
}
