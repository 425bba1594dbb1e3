//! Resource schemas
//!
//! Describes the attributes of provider configuration, resources and data
//! sources. Schemas drive validation and planning and are printed by the
//! `schema` command.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Custom validation of a single attribute value
pub type ValidateFn = fn(&Value) -> Result<(), String>;

/// Returns true when `old` and `new` should be treated as equal
pub type DiffSuppressFn = fn(key: &str, old: &str, new: &str) -> bool;

/// Name of the attribute routing a resource to a multibox box
pub const BOX_ID: &str = "box_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Int,
    /// Ordered list of `element` values
    List,
    /// Unordered list of unique `element` values
    Set,
    /// List of nested blocks
    Block,
}

impl AttributeType {
    pub fn is_collection(&self) -> bool {
        matches!(self, AttributeType::List | AttributeType::Set | AttributeType::Block)
    }

    /// Whether a JSON value has this primitive type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            AttributeType::String => value.is_string(),
            AttributeType::Bool => value.is_boolean(),
            AttributeType::Int => value.is_i64() || value.is_u64(),
            AttributeType::List | AttributeType::Set => value.is_array(),
            AttributeType::Block => value.is_array(),
        }
    }
}

/// A single attribute
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub kind: AttributeType,
    /// Element type of a list or set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<AttributeType>,
    /// Attributes of each nested block
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub block: BTreeMap<String, Attribute>,
    pub description: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub computed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip)]
    pub validate: Option<ValidateFn>,
    #[serde(skip)]
    pub diff_suppress: Option<DiffSuppressFn>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub diff_suppress_on_refresh: bool,
}

impl Attribute {
    fn new(kind: AttributeType, description: &str) -> Self {
        Self {
            kind,
            element: None,
            block: BTreeMap::new(),
            description: description.to_string(),
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            force_new: false,
            default: None,
            min_items: None,
            max_items: None,
            validate: None,
            diff_suppress: None,
            diff_suppress_on_refresh: false,
        }
    }

    pub fn string(description: &str) -> Self {
        Self::new(AttributeType::String, description)
    }

    pub fn bool(description: &str) -> Self {
        Self::new(AttributeType::Bool, description)
    }

    pub fn int(description: &str) -> Self {
        Self::new(AttributeType::Int, description)
    }

    pub fn list_of(element: AttributeType, description: &str) -> Self {
        Self {
            element: Some(element),
            ..Self::new(AttributeType::List, description)
        }
    }

    pub fn set_of(element: AttributeType, description: &str) -> Self {
        Self {
            element: Some(element),
            ..Self::new(AttributeType::Set, description)
        }
    }

    pub fn block<I>(description: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Attribute)>,
    {
        Self {
            block: attributes
                .into_iter()
                .map(|(name, attribute)| (name.to_string(), attribute))
                .collect(),
            ..Self::new(AttributeType::Block, description)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn validate(mut self, f: ValidateFn) -> Self {
        self.validate = Some(f);
        self
    }

    pub fn diff_suppress(mut self, f: DiffSuppressFn) -> Self {
        self.diff_suppress = Some(f);
        self
    }

    pub fn diff_suppress_on_refresh(mut self) -> Self {
        self.diff_suppress_on_refresh = true;
        self
    }

    /// Computed without being settable from configuration
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }
}

/// Schema of a resource or data source
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSchema {
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
    pub importable: bool,
    /// False when every change forces replacement
    pub updatable: bool,
}

impl ResourceSchema {
    pub fn new<I>(description: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Attribute)>,
    {
        Self {
            description: description.to_string(),
            attributes: attributes
                .into_iter()
                .map(|(name, attribute)| (name.to_string(), attribute))
                .collect(),
            importable: false,
            updatable: true,
        }
    }

    /// Add the attributes shared by every REST resource
    pub fn with_base(mut self) -> Self {
        for (name, attribute) in base_attributes() {
            self.attributes.entry(name.to_string()).or_insert(attribute);
        }
        self
    }

    pub fn importable(mut self) -> Self {
        self.importable = true;
        self
    }

    pub fn not_updatable(mut self) -> Self {
        self.updatable = false;
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }
}

fn base_attributes() -> Vec<(&'static str, Attribute)> {
    vec![(
        BOX_ID,
        Attribute::string(
            "Id of the multibox box to manage the resource in. Leave empty to talk to the main server.",
        )
        .optional()
        .force_new(),
    )]
}

/// Complete provider schema
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderSchema {
    pub provider: BTreeMap<String, Attribute>,
    pub resources: BTreeMap<String, ResourceSchema>,
    pub data_sources: BTreeMap<String, ResourceSchema>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_flags() {
        let attribute = Attribute::string("Secret").required().sensitive();
        assert!(attribute.required);
        assert!(attribute.sensitive);
        assert!(!attribute.is_read_only());
        assert!(Attribute::string("Url").computed().is_read_only());
    }

    #[test]
    fn test_with_base_adds_box_id() {
        let schema = ResourceSchema::new("Thing", [("name", Attribute::string("Name").required())]).with_base();
        let box_id = schema.attribute(BOX_ID).unwrap();
        assert!(box_id.optional);
        assert!(box_id.force_new);
        assert!(schema.attribute("name").is_some());
    }

    #[test]
    fn test_schema_serializes_without_hooks() {
        fn always(_: &Value) -> Result<(), String> {
            Ok(())
        }
        let schema = ResourceSchema::new(
            "Thing",
            [("engine", Attribute::string("Engine").required().validate(always))],
        );
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["attributes"]["engine"]["type"], "string");
        assert_eq!(value["attributes"]["engine"]["required"], true);
        assert!(value["attributes"]["engine"].get("validate").is_none());
        assert!(value["attributes"]["engine"].get("optional").is_none());
    }
}
