//! Resource lifecycle
//!
//! Drives validation, planning and the handler callbacks for one resource
//! instance. Failures coming back from the server are reported as
//! diagnostics next to the state that is known to be true afterwards; only
//! misuse (an unknown type, a malformed state file) is an `Err`.

use super::data::ResourceData;
use super::diagnostic::{has_errors, Diagnostic};
use super::diff::{self, Action, AttributeChange, Plan};
use super::handler::{DataSourceHandler, ResourceHandler};
use super::registry::{get_data_source, get_resource};
use super::schema::BOX_ID;
use crate::aidbox::ApiClient;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Result of a lifecycle operation
#[derive(Debug, Serialize)]
pub struct Outcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<AttributeChange>,
    /// State after the operation, `None` when the resource does not exist
    pub state: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    fn new(state: Option<Value>) -> Self {
        Self {
            action: None,
            changes: Vec::new(),
            state,
            diagnostics: Vec::new(),
        }
    }

    fn failed(state: Option<Value>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            ..Self::new(state)
        }
    }

    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }
}

pub fn resource_handler(type_name: &str) -> Result<&'static dyn ResourceHandler> {
    get_resource(type_name).with_context(|| format!("Unknown resource type {}", type_name))
}

pub fn data_source_handler(type_name: &str) -> Result<&'static dyn DataSourceHandler> {
    get_data_source(type_name).with_context(|| format!("Unknown data source type {}", type_name))
}

fn prior_data(prior: Option<&Value>) -> Result<Option<ResourceData>> {
    prior
        .filter(|state| !state.is_null())
        .map(|state| ResourceData::from_state(state.clone()))
        .transpose()
        .context("Invalid prior state")
}

/// Validate configuration of a resource
pub fn validate(type_name: &str, config: &Map<String, Value>) -> Result<Vec<Diagnostic>> {
    let handler = resource_handler(type_name)?;
    Ok(diff::validate(&handler.schema(), config))
}

/// Plan without touching the server
pub fn plan(type_name: &str, prior: Option<&Value>, config: &Map<String, Value>) -> Result<Outcome> {
    let handler = resource_handler(type_name)?;
    let schema = handler.schema();
    let diagnostics = diff::validate(&schema, config);
    if has_errors(&diagnostics) {
        return Ok(Outcome::failed(prior.cloned(), diagnostics));
    }
    let prior = prior_data(prior)?;
    let Plan { action, changes, planned } = diff::plan(&schema, prior.as_ref(), config);
    // plans are printed; secrets only reach state files through apply
    let mut state = planned.to_state();
    if let Value::Object(attributes) = &mut state {
        diff::mask_sensitive(&schema.attributes, attributes);
    }
    Ok(Outcome {
        action: Some(action),
        changes,
        state: Some(state),
        diagnostics,
    })
}

/// Converge the resource to `config`
pub async fn apply(
    client: &ApiClient,
    type_name: &str,
    prior: Option<&Value>,
    config: &Map<String, Value>,
) -> Result<Outcome> {
    let handler = resource_handler(type_name)?;
    let schema = handler.schema();
    let mut diagnostics = diff::validate(&schema, config);
    if has_errors(&diagnostics) {
        return Ok(Outcome::failed(prior.cloned(), diagnostics));
    }

    let prior_state = prior_data(prior)?;
    let plan = diff::plan(&schema, prior_state.as_ref(), config);
    tracing::info!("Applying {} to {} {}", plan.action, type_name, plan.planned.id());

    let planned = plan.planned.clone();
    let mut data = plan.planned;
    let result = match plan.action {
        Action::NoOp => {
            return Ok(Outcome {
                action: Some(Action::NoOp),
                ..Outcome::new(prior.cloned())
            });
        }
        Action::Create => handler.create(client, &mut data).await,
        Action::Update => handler.update(client, &mut data).await,
        Action::Replace => {
            let Some(mut old) = prior_state else {
                // plan only replaces existing resources
                return Ok(Outcome::new(prior.cloned()));
            };
            let deleted = handler.delete(client, &mut old).await;
            if let Err(e) = deleted {
                diagnostics.push(Diagnostic::from_error(&e));
                return Ok(Outcome::failed(prior.cloned(), diagnostics));
            }
            handler.create(client, &mut data).await
        }
    };

    let state = match result {
        Ok(()) => {
            diff::refresh(&schema, &planned, &mut data);
            Some(data.to_state())
        }
        Err(e) => {
            tracing::error!("Failed to {} {}: {:#}", plan.action, type_name, e);
            diagnostics.push(Diagnostic::from_error(&e));
            match plan.action {
                Action::Update => prior.cloned(),
                _ => None,
            }
        }
    };

    Ok(Outcome {
        action: Some(plan.action),
        changes: plan.changes,
        state,
        diagnostics,
    })
}

/// Read the resource back from the server
pub async fn refresh(client: &ApiClient, type_name: &str, prior: &Value) -> Result<Outcome> {
    let handler = resource_handler(type_name)?;
    let Some(prior_state) = prior_data(Some(prior))? else {
        return Ok(Outcome::new(None));
    };

    let mut data = prior_state.clone();
    let result = handler.read(client, &mut data).await;
    if let Err(e) = result {
        return Ok(Outcome::failed(Some(prior.clone()), vec![Diagnostic::from_error(&e)]));
    }
    if data.id().is_empty() {
        return Ok(Outcome::new(None));
    }
    diff::refresh(&handler.schema(), &prior_state, &mut data);
    Ok(Outcome::new(Some(data.to_state())))
}

/// Delete the resource
pub async fn destroy(client: &ApiClient, type_name: &str, prior: &Value) -> Result<Outcome> {
    let handler = resource_handler(type_name)?;
    let Some(mut data) = prior_data(Some(prior))? else {
        return Ok(Outcome::new(None));
    };
    if data.id().is_empty() {
        return Ok(Outcome::new(None));
    }

    let result = handler.delete(client, &mut data).await;
    match result {
        Ok(()) => Ok(Outcome::new(None)),
        Err(e) => Ok(Outcome::failed(Some(prior.clone()), vec![Diagnostic::from_error(&e)])),
    }
}

/// Bring an existing server resource under management
pub async fn import(client: &ApiClient, type_name: &str, id: &str, box_id: &str) -> Result<Outcome> {
    let handler = resource_handler(type_name)?;
    let schema = handler.schema();
    if !schema.importable {
        let diagnostic = Diagnostic::error(format!("Resource {} does not support import", type_name));
        return Ok(Outcome::failed(None, vec![diagnostic]));
    }

    let mut data = ResourceData::new();
    data.set_id(id);
    if !box_id.is_empty() {
        if schema.attribute(BOX_ID).is_none() {
            let diagnostic = Diagnostic::error(format!("Resource {} is not managed inside a box", type_name)).at(BOX_ID);
            return Ok(Outcome::failed(None, vec![diagnostic]));
        }
        data.set(BOX_ID, box_id);
    }

    let result = handler.import(client, &mut data).await;
    match result {
        Ok(()) => Ok(Outcome::new(Some(data.to_state()))),
        Err(e) => Ok(Outcome::failed(None, vec![Diagnostic::from_error(&e)])),
    }
}

/// Look up a data source
pub async fn read_data_source(client: &ApiClient, type_name: &str, config: &Map<String, Value>) -> Result<Outcome> {
    let handler = data_source_handler(type_name)?;
    let diagnostics = diff::validate(&handler.schema(), config);
    if has_errors(&diagnostics) {
        return Ok(Outcome::failed(None, diagnostics));
    }

    let mut data = ResourceData::from_config(config.clone());
    let result = handler.read(client, &mut data).await;
    match result {
        Ok(()) => Ok(Outcome::new(Some(data.to_state()))),
        Err(e) => Ok(Outcome::failed(None, vec![Diagnostic::from_error(&e)])),
    }
}
