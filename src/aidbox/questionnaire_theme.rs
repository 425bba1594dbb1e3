//! QuestionnaireTheme resource

use super::resource::{impl_resource, ResourceBase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireTheme {
    #[serde(flatten)]
    pub base: ResourceBase,
    #[serde(rename = "theme-name", default, skip_serializing_if = "String::is_empty")]
    pub theme_name: String,
    #[serde(rename = "design-system", default, skip_serializing_if = "String::is_empty")]
    pub design_system: String,
}

impl_resource!(QuestionnaireTheme, "QuestionnaireTheme", "QuestionnaireTheme");
