//! Attribute bag
//!
//! [`ResourceData`] holds the id and attributes of one resource instance as
//! JSON values. It is what resource handlers read configuration from and
//! write server state into, and what gets persisted as state.
//!
//! Reads follow zero-value semantics: a missing attribute reads as the empty
//! string, `false`, `0` or an empty list.

use super::schema::BOX_ID;
use anyhow::{bail, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: String,
    attributes: Map<String, Value>,
}

/// Whether a value is the zero value of its type
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute bag from configuration (no id yet)
    pub fn from_config(attributes: Map<String, Value>) -> Self {
        Self {
            id: String::new(),
            attributes,
        }
    }

    /// Parse a state object `{"id": ..., <attributes>}`
    pub fn from_state(state: Value) -> Result<Self> {
        let Value::Object(mut attributes) = state else {
            bail!("Resource state must be a JSON object");
        };
        let id = match attributes.shift_remove("id") {
            Some(Value::String(id)) => id,
            Some(Value::Null) | None => String::new(),
            Some(other) => bail!("Resource id must be a string, got {}", other),
        };
        Ok(Self { id, attributes })
    }

    /// State object with the id first
    pub fn to_state(&self) -> Value {
        let mut state = Map::new();
        state.insert("id".to_string(), Value::String(self.id.clone()));
        for (key, value) in &self.attributes {
            state.insert(key.clone(), value.clone());
        }
        Value::Object(state)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Mark the resource as gone; it is dropped from state afterwards
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Value of an attribute if it is set to something other than its zero value
    pub fn get_ok(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !is_zero(v))
    }

    pub fn get_str(&self, key: &str) -> String {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.attributes
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn get_i64(&self, key: &str) -> i64 {
        self.attributes
            .get(key)
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    pub fn get_list(&self, key: &str) -> Vec<Value> {
        match self.attributes.get(key) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// String items of a list or set attribute
    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        self.get_list(key)
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    /// Nested blocks of a block attribute
    pub fn get_blocks(&self, key: &str) -> Vec<Map<String, Value>> {
        self.get_list(key)
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(block) => Some(block),
                _ => None,
            })
            .collect()
    }

    /// First nested block of a single-block attribute
    pub fn get_block(&self, key: &str) -> Option<Map<String, Value>> {
        self.get_blocks(key).into_iter().next()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.attributes.shift_remove(key)
    }

    /// Box the resource lives in; empty for the main server
    pub fn box_id(&self) -> String {
        self.get_str(BOX_ID)
    }
}

/// Read a string member of a nested block
pub fn block_str(block: &Map<String, Value>, key: &str) -> String {
    block
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Read an integer member of a nested block
pub fn block_i64(block: &Map<String, Value>, key: &str) -> i64 {
    block.get(key).and_then(Value::as_i64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_roundtrip_keeps_id_separate() {
        let data = ResourceData::from_state(json!({"id": "p1", "engine": "allow", "box_id": ""})).unwrap();
        assert_eq!(data.id(), "p1");
        assert!(data.get("id").is_none());
        assert_eq!(data.get_str("engine"), "allow");
        assert_eq!(data.to_state(), json!({"id": "p1", "engine": "allow", "box_id": ""}));
    }

    #[test]
    fn test_zero_value_reads() {
        let data = ResourceData::from_config(Map::new());
        assert_eq!(data.get_str("missing"), "");
        assert!(!data.get_bool("missing"));
        assert_eq!(data.get_i64("missing"), 0);
        assert!(data.get_list("missing").is_empty());
        assert!(data.get_block("missing").is_none());
    }

    #[test]
    fn test_get_ok_ignores_zero_values() {
        let mut data = ResourceData::new();
        data.set("description", "");
        data.set("default", false);
        data.set("module", "core");
        assert!(data.get_ok("description").is_none());
        assert!(data.get_ok("default").is_none());
        assert_eq!(data.get_ok("module"), Some(&json!("core")));
    }

    #[test]
    fn test_blocks() {
        let mut data = ResourceData::new();
        data.set("jwt", json!([{"iss": "https://auth.example", "secret": "s"}]));
        let jwt = data.get_block("jwt").unwrap();
        assert_eq!(block_str(&jwt, "iss"), "https://auth.example");
        assert_eq!(block_str(&jwt, "missing"), "");
    }

    #[test]
    fn test_non_object_state_is_rejected() {
        assert!(ResourceData::from_state(json!(["nope"])).is_err());
        assert!(ResourceData::from_state(json!({"id": 5})).is_err());
    }
}
