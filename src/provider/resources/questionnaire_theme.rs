//! aidbox_questionnaire_theme resource

use crate::aidbox::questionnaire_theme::QuestionnaireTheme;
use crate::aidbox::resource::ResourceBase;
use crate::provider::data::ResourceData;
use crate::provider::handler::ResourceMapping;
use crate::provider::schema::{Attribute, ResourceSchema};
use anyhow::Result;

pub struct QuestionnaireThemeMapping;

impl ResourceMapping for QuestionnaireThemeMapping {
    type Model = QuestionnaireTheme;

    const TYPE_NAME: &'static str = "aidbox_questionnaire_theme";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "QuestionnaireTheme https://www.health-samurai.io/docs/aidbox/reference/system-resources-reference/sdc-module-resources#questionnairetheme",
            [
                (
                    "aidbox_id",
                    Attribute::string("The Aidbox ID of the questionnaire theme")
                        .required()
                        .force_new(),
                ),
                ("theme_name", Attribute::string("Name of the theme").optional()),
                ("design_system", Attribute::string("Design system of the theme").optional()),
            ],
        )
        .importable()
    }

    fn from_data(data: &ResourceData) -> Result<QuestionnaireTheme> {
        Ok(QuestionnaireTheme {
            base: ResourceBase::with_id(data.get_str("aidbox_id")),
            theme_name: data.get_str("theme_name"),
            design_system: data.get_str("design_system"),
        })
    }

    fn to_data(theme: &QuestionnaireTheme, data: &mut ResourceData) -> Result<()> {
        data.set_id(theme.base.id.as_str());
        data.set("aidbox_id", theme.base.id.as_str());
        data.set("theme_name", theme.theme_name.as_str());
        data.set("design_system", theme.design_system.as_str());
        Ok(())
    }
}
