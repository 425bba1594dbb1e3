//! Validation, planning and diff suppression
//!
//! Compares configuration against prior state using the resource schema and
//! decides whether a resource must be created, updated in place, replaced or
//! left alone.

use super::data::{is_zero, ResourceData};
use super::diagnostic::Diagnostic;
use super::schema::{Attribute, AttributeType, ResourceSchema};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Shown in plans instead of sensitive values
const SENSITIVE_PLACEHOLDER: &str = "(sensitive value)";

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeType::String => "string",
            AttributeType::Bool => "bool",
            AttributeType::Int => "number",
            AttributeType::List => "list",
            AttributeType::Set => "set",
            AttributeType::Block => "list of blocks",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Check a configuration against a schema
pub fn validate(schema: &ResourceSchema, config: &Map<String, Value>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_attributes(&schema.attributes, config, "", &mut diagnostics);
    diagnostics
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn validate_attributes(
    attributes: &BTreeMap<String, Attribute>,
    config: &Map<String, Value>,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for key in config.keys() {
        if !attributes.contains_key(key) {
            diagnostics.push(
                Diagnostic::error("Unsupported argument")
                    .with_detail(format!("An argument named \"{}\" is not expected here.", key))
                    .at(join_path(prefix, key)),
            );
        }
    }

    for (name, attribute) in attributes {
        let path = join_path(prefix, name);
        match config.get(name).filter(|v| !v.is_null()) {
            None if attribute.required => diagnostics.push(
                Diagnostic::error("Missing required argument")
                    .with_detail(format!("The argument \"{}\" is required, but no definition was found.", name))
                    .at(path),
            ),
            None => {}
            Some(_) if attribute.is_read_only() => diagnostics.push(
                Diagnostic::error("Value for unconfigurable attribute")
                    .with_detail(format!("\"{}\" is computed by the server and cannot be set.", name))
                    .at(path),
            ),
            Some(value) => validate_value(attribute, value, &path, diagnostics),
        }
    }
}

fn validate_value(attribute: &Attribute, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    if !attribute.kind.accepts(value) {
        diagnostics.push(
            Diagnostic::error("Incorrect attribute value type")
                .with_detail(format!("Expected {}, got {}", attribute.kind, value))
                .at(path),
        );
        return;
    }

    if let Value::Array(items) = value {
        if let Some(min) = attribute.min_items {
            if items.len() < min {
                diagnostics.push(
                    Diagnostic::error("Not enough list items")
                        .with_detail(format!("At least {} item(s) are required, {} given.", min, items.len()))
                        .at(path),
                );
            }
        }
        if let Some(max) = attribute.max_items {
            if items.len() > max {
                diagnostics.push(
                    Diagnostic::error("Too many list items")
                        .with_detail(format!("No more than {} item(s) are allowed, {} given.", max, items.len()))
                        .at(path),
                );
            }
        }

        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{}[{}]", path, i);
            match (attribute.kind, attribute.element) {
                (AttributeType::Block, _) => match item {
                    Value::Object(block) => {
                        validate_attributes(&attribute.block, block, &item_path, diagnostics)
                    }
                    other => diagnostics.push(
                        Diagnostic::error("Incorrect attribute value type")
                            .with_detail(format!("Expected a block, got {}", other))
                            .at(item_path),
                    ),
                },
                (_, Some(element)) if !element.accepts(item) => diagnostics.push(
                    Diagnostic::error("Incorrect attribute value type")
                        .with_detail(format!("Expected {}, got {}", element, item))
                        .at(item_path),
                ),
                _ => {}
            }
        }

        if attribute.kind == AttributeType::Set {
            for (i, item) in items.iter().enumerate() {
                if items[..i].contains(item) {
                    diagnostics.push(
                        Diagnostic::error("Duplicate set element")
                            .with_detail(format!("{} appears more than once", item))
                            .at(path),
                    );
                }
            }
        }
    }

    if let Some(check) = attribute.validate {
        if let Err(message) = check(value) {
            diagnostics.push(Diagnostic::error(message).at(path));
        }
    }
}

// =============================================================================
// Planning
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Replace,
    NoOp,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Create => "create",
            Action::Update => "update in-place",
            Action::Replace => "replace",
            Action::NoOp => "no changes",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeChange {
    pub attribute: String,
    pub old: Value,
    pub new: Value,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub forces_replacement: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub action: Action,
    pub changes: Vec<AttributeChange>,
    /// State the resource should have after applying
    #[serde(skip)]
    pub planned: ResourceData,
}

fn display_value(attribute: &Attribute, value: &Value) -> Value {
    if attribute.sensitive && !value.is_null() {
        Value::String(SENSITIVE_PLACEHOLDER.to_string())
    } else {
        value.clone()
    }
}

/// Replace sensitive values in a state object, nested blocks included
pub fn mask_sensitive(attributes: &BTreeMap<String, Attribute>, state: &mut Map<String, Value>) {
    for (name, attribute) in attributes {
        let Some(value) = state.get_mut(name) else {
            continue;
        };
        if attribute.sensitive {
            *value = display_value(attribute, value);
        } else if attribute.kind == AttributeType::Block {
            if let Value::Array(items) = value {
                for item in items.iter_mut().filter_map(Value::as_object_mut) {
                    mask_sensitive(&attribute.block, item);
                }
            }
        }
    }
}

fn values_equal(attribute: &Attribute, old: &Value, new: &Value) -> bool {
    if is_zero(old) && is_zero(new) {
        return true;
    }
    match (attribute.kind, old, new) {
        (AttributeType::Set, Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().all(|item| b.contains(item))
        }
        (AttributeType::Block, Value::Array(a), Value::Array(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|(x, y)| blocks_equal(&attribute.block, x, y))
        }
        _ => old == new,
    }
}

// Members missing on one side compare as their zero value
fn blocks_equal(attributes: &BTreeMap<String, Attribute>, a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => attributes.iter().all(|(name, nested)| {
            values_equal(
                nested,
                x.get(name).unwrap_or(&Value::Null),
                y.get(name).unwrap_or(&Value::Null),
            )
        }),
        _ => a == b,
    }
}

/// Work out what applying `config` on top of `prior` would do
///
/// Defaults fill unset attributes, computed attributes keep their prior
/// value, and diff-suppressed attributes keep the prior representation when
/// the suppress function considers them equal.
pub fn plan(schema: &ResourceSchema, prior: Option<&ResourceData>, config: &Map<String, Value>) -> Plan {
    let prior = prior.filter(|p| !p.id().is_empty());

    let mut planned = ResourceData::new();
    for (name, attribute) in &schema.attributes {
        let value = match config.get(name).filter(|v| !v.is_null()) {
            Some(configured) => Some(configured.clone()),
            None if attribute.computed => prior.and_then(|p| p.get(name).cloned()),
            None => attribute.default.clone(),
        };
        if let Some(value) = value {
            planned.set(name, value);
        }
    }

    let Some(prior) = prior else {
        let changes = schema
            .attributes
            .iter()
            .filter_map(|(name, attribute)| {
                planned.get(name).filter(|v| !is_zero(v)).map(|new| AttributeChange {
                    attribute: name.clone(),
                    old: Value::Null,
                    new: display_value(attribute, new),
                    forces_replacement: false,
                })
            })
            .collect();
        return Plan {
            action: Action::Create,
            changes,
            planned,
        };
    };

    planned.set_id(prior.id());
    let mut changes = Vec::new();
    for (name, attribute) in &schema.attributes {
        if attribute.is_read_only() {
            continue;
        }
        let old = prior.get(name).cloned().unwrap_or(Value::Null);
        let new = planned.get(name).cloned().unwrap_or(Value::Null);
        if values_equal(attribute, &old, &new) {
            continue;
        }
        if let (Some(suppress), AttributeType::String) = (attribute.diff_suppress, attribute.kind) {
            let old_str = old.as_str().unwrap_or_default();
            let new_str = new.as_str().unwrap_or_default();
            if suppress(name, old_str, new_str) {
                planned.set(name, old);
                continue;
            }
        }
        changes.push(AttributeChange {
            attribute: name.clone(),
            old: display_value(attribute, &old),
            new: display_value(attribute, &new),
            forces_replacement: attribute.force_new || !schema.updatable,
        });
    }

    let action = if changes.is_empty() {
        Action::NoOp
    } else if changes.iter().any(|c| c.forces_replacement) {
        Action::Replace
    } else {
        Action::Update
    };

    if action == Action::Replace {
        planned.clear_id();
        for (name, attribute) in &schema.attributes {
            if attribute.computed && config.get(name).map_or(true, Value::is_null) {
                planned.remove(name);
            }
        }
    }

    Plan {
        action,
        changes,
        planned,
    }
}

/// Keep prior values of suppress-on-refresh attributes that are still equal
pub fn refresh(schema: &ResourceSchema, prior: &ResourceData, refreshed: &mut ResourceData) {
    for (name, attribute) in &schema.attributes {
        let Some(suppress) = attribute.diff_suppress else {
            continue;
        };
        if !attribute.diff_suppress_on_refresh {
            continue;
        }
        if let (Some(Value::String(old)), Some(Value::String(new))) = (prior.get(name), refreshed.get(name)) {
            if old != new && suppress(name, old, new) {
                tracing::debug!("Keeping prior representation of {} after refresh", name);
                refreshed.set(name, old.clone());
            }
        }
    }
}

// =============================================================================
// JSON diff suppression
// =============================================================================

/// Compare two JSON documents semantically
///
/// Key order and numeric representation are ignored. A document that does
/// not parse is always reported as changed.
pub fn json_diff_suppress(key: &str, old: &str, new: &str) -> bool {
    if old.is_empty() || new.is_empty() {
        return old.is_empty() && new.is_empty();
    }

    let parsed = serde_json::from_str::<Value>(old).and_then(|o| serde_json::from_str::<Value>(new).map(|n| (o, n)));
    match parsed {
        Ok((old_value, new_value)) => json_equal(&old_value, &new_value),
        Err(e) => {
            tracing::debug!("Attribute {} does not hold valid JSON: {}", key, e);
            false
        }
    }
}

/// Structural equality where `1` equals `1.0`
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(i), Some(j)) => i == j,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(v, w)| json_equal(v, w))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).map_or(false, |w| json_equal(v, w)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "Test",
            [
                ("name", Attribute::string("Name").required().force_new()),
                ("status", Attribute::string("Status").optional().default_value("active")),
                ("secret", Attribute::string("Secret").optional().sensitive()),
                (
                    "schema",
                    Attribute::string("JSON")
                        .optional()
                        .diff_suppress(json_diff_suppress)
                        .diff_suppress_on_refresh(),
                ),
                ("url", Attribute::string("Url").computed()),
                ("tags", Attribute::set_of(AttributeType::String, "Tags").optional()),
                (
                    "client",
                    Attribute::block("Client", [("id", Attribute::string("Id").required())])
                        .optional()
                        .max_items(1),
                ),
            ],
        )
    }

    fn config(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("config must be an object"),
        }
    }

    #[test]
    fn test_validate_reports_problems() {
        let diagnostics = validate(
            &schema(),
            &config(json!({
                "status": 3,
                "url": "http://x",
                "bogus": true,
                "tags": ["a", "a"],
                "client": [{"id": "x"}, {}]
            })),
        );
        let summaries: Vec<(&str, Option<&str>)> = diagnostics
            .iter()
            .map(|d| (d.summary.as_str(), d.attribute.as_deref()))
            .collect();

        assert!(summaries.contains(&("Unsupported argument", Some("bogus"))));
        assert!(summaries.contains(&("Missing required argument", Some("name"))));
        assert!(summaries.contains(&("Incorrect attribute value type", Some("status"))));
        assert!(summaries.contains(&("Value for unconfigurable attribute", Some("url"))));
        assert!(summaries.contains(&("Duplicate set element", Some("tags"))));
        assert!(summaries.contains(&("Too many list items", Some("client"))));
        assert!(summaries.contains(&("Missing required argument", Some("client[1].id"))));
    }

    #[test]
    fn test_plan_create_applies_defaults_and_masks_secrets() {
        let plan = plan(&schema(), None, &config(json!({"name": "a", "secret": "hunter2"})));
        assert_eq!(plan.action, Action::Create);
        assert_eq!(plan.planned.get_str("status"), "active");
        assert_eq!(plan.planned.get_str("secret"), "hunter2");

        let secret = plan.changes.iter().find(|c| c.attribute == "secret").unwrap();
        assert_eq!(secret.new, json!(SENSITIVE_PLACEHOLDER));
    }

    #[test]
    fn test_mask_sensitive_in_nested_blocks() {
        let attributes: BTreeMap<String, Attribute> = [
            ("name".to_string(), Attribute::string("Name").required()),
            ("secret".to_string(), Attribute::string("Secret").optional().sensitive()),
            (
                "auth".to_string(),
                Attribute::block("Auth", [("password", Attribute::string("Password").required().sensitive())])
                    .optional(),
            ),
        ]
        .into_iter()
        .collect();
        let mut state = config(json!({
            "name": "a",
            "secret": "hunter2",
            "auth": [{"password": "letmein"}]
        }));

        mask_sensitive(&attributes, &mut state);
        assert_eq!(state["name"], "a");
        assert_eq!(state["secret"], SENSITIVE_PLACEHOLDER);
        assert_eq!(state["auth"][0]["password"], SENSITIVE_PLACEHOLDER);
    }

    #[test]
    fn test_plan_noop_and_update() {
        let prior = ResourceData::from_state(json!({
            "id": "a", "name": "a", "status": "active", "url": "http://server/a", "tags": ["x", "y"]
        }))
        .unwrap();

        let unchanged = plan(&schema(), Some(&prior), &config(json!({"name": "a", "tags": ["y", "x"]})));
        assert_eq!(unchanged.action, Action::NoOp);
        assert_eq!(unchanged.planned.get_str("url"), "http://server/a");
        assert_eq!(unchanged.planned.id(), "a");

        let changed = plan(&schema(), Some(&prior), &config(json!({"name": "a", "status": "retired", "tags": ["x", "y"]})));
        assert_eq!(changed.action, Action::Update);
        assert_eq!(changed.changes.len(), 1);
        assert_eq!(changed.changes[0].attribute, "status");
    }

    #[test]
    fn test_plan_force_new_replaces() {
        let prior = ResourceData::from_state(json!({"id": "a", "name": "a", "status": "active", "url": "u"})).unwrap();
        let plan = plan(&schema(), Some(&prior), &config(json!({"name": "b"})));
        assert_eq!(plan.action, Action::Replace);
        assert!(plan.changes[0].forces_replacement);
        assert_eq!(plan.planned.id(), "");
        assert!(plan.planned.get("url").is_none());
    }

    #[test]
    fn test_plan_suppresses_equivalent_json() {
        let prior = ResourceData::from_state(json!({
            "id": "a", "name": "a", "status": "active", "schema": "{\"a\":1,\"b\":[1,2]}"
        }))
        .unwrap();
        let plan = plan(
            &schema(),
            Some(&prior),
            &config(json!({"name": "a", "schema": "{ \"b\": [1, 2.0], \"a\": 1 }"})),
        );
        assert_eq!(plan.action, Action::NoOp);
        assert_eq!(plan.planned.get_str("schema"), "{\"a\":1,\"b\":[1,2]}");
    }

    #[test]
    fn test_refresh_keeps_equivalent_representation() {
        let prior = ResourceData::from_state(json!({"id": "a", "schema": "{\"a\": 1}"})).unwrap();
        let mut refreshed = ResourceData::from_state(json!({"id": "a", "schema": "{\"a\":1}"})).unwrap();
        refresh(&schema(), &prior, &mut refreshed);
        assert_eq!(refreshed.get_str("schema"), "{\"a\": 1}");

        let mut drifted = ResourceData::from_state(json!({"id": "a", "schema": "{\"a\":2}"})).unwrap();
        refresh(&schema(), &prior, &mut drifted);
        assert_eq!(drifted.get_str("schema"), "{\"a\":2}");
    }

    #[test]
    fn test_json_diff_suppress_edge_cases() {
        assert!(json_diff_suppress("schema", "", ""));
        assert!(!json_diff_suppress("schema", "", "{}"));
        assert!(!json_diff_suppress("schema", "{}", ""));
        assert!(!json_diff_suppress("schema", "{not json", "{}"));
        assert!(json_diff_suppress("schema", "{\"x\": 1.0}", "{\"x\": 1}"));
        assert!(!json_diff_suppress("schema", "[1, 2]", "[2, 1]"));
    }
}
