//! Resource files
//!
//! One file per managed resource: its type, the user's configuration and the
//! state recorded after the last apply or refresh. JSON or YAML, picked by
//! the file extension.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceFile {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml"))
}

impl ResourceFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read resource file {}", path.display()))?;
        let file = if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(anyhow::Error::from)
        } else {
            serde_json::from_str(&content).map_err(anyhow::Error::from)
        };
        file.with_context(|| format!("Failed to parse resource file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)? + "\n"
        };
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write resource file {}", path.display()))?;
        tracing::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Replace the recorded state; `None` means the resource is gone
    pub fn record(&mut self, state: Option<Value>) {
        self.state = state.filter(|s| !s.is_null());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json() {
        let file: ResourceFile = serde_json::from_value(json!({
            "type": "aidbox_client",
            "config": {"name": "webapp", "secret": "s3cret", "grant_types": ["basic"]}
        }))
        .unwrap();
        assert_eq!(file.type_name, "aidbox_client");
        assert_eq!(file.config["name"], "webapp");
        assert!(file.state.is_none());
    }

    #[test]
    fn test_save_and_load_yaml() {
        let path = std::env::temp_dir().join(format!("aidbox-provider-state-{}.yaml", std::process::id()));
        let mut file = ResourceFile {
            type_name: "aidbox_search".to_string(),
            config: json!({"name": "mrn"}).as_object().cloned().unwrap(),
            state: None,
        };
        file.record(Some(json!({"id": "Patient.mrn", "name": "mrn"})));
        file.save(&path).unwrap();

        let loaded = ResourceFile::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, file);
    }

    #[test]
    fn test_record_null_clears_state() {
        let mut file = ResourceFile {
            type_name: "aidbox_search".to_string(),
            config: Map::new(),
            state: Some(json!({"id": "x"})),
        };
        file.record(Some(Value::Null));
        assert!(file.state.is_none());
    }
}
