//! aidbox_sdc_config resource

use super::{get_json, json_attribute, json_text};
use crate::aidbox::resource::ResourceBase;
use crate::aidbox::sdc_config::SdcConfig;
use crate::provider::data::ResourceData;
use crate::provider::handler::ResourceMapping;
use crate::provider::schema::{Attribute, ResourceSchema};
use anyhow::Result;

pub struct SdcConfigMapping;

impl ResourceMapping for SdcConfigMapping {
    type Model = SdcConfig;

    const TYPE_NAME: &'static str = "aidbox_sdc_config";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "SDCConfig https://docs.aidbox.app/modules/aidbox-forms/aidbox-ui-builder-alpha/form-settings",
            [
                (
                    "name",
                    Attribute::string("Computer friendly name of the SDC configuration.").required(),
                ),
                (
                    "description",
                    Attribute::string("A human-readable description of the SDC configuration.").optional(),
                ),
                (
                    "default",
                    Attribute::bool("Specifies if this is the default configuration for the system or tenant.")
                        .optional(),
                ),
                (
                    "storage",
                    json_attribute("Configuration for storing attachments, as a raw JSON string.").optional(),
                ),
            ],
        )
        .importable()
    }

    fn from_data(data: &ResourceData) -> Result<SdcConfig> {
        Ok(SdcConfig {
            base: ResourceBase::with_id(data.id()),
            name: data.get_str("name"),
            description: data.get_str("description"),
            default: data.get_bool("default"),
            storage: get_json(data, "storage")?,
        })
    }

    fn to_data(config: &SdcConfig, data: &mut ResourceData) -> Result<()> {
        data.set_id(config.base.id.as_str());
        data.set("name", config.name.as_str());
        data.set("description", config.description.as_str());
        data.set("default", config.default);
        match &config.storage {
            Some(storage) => data.set("storage", json_text(storage)?),
            None => data.set("storage", ""),
        }
        Ok(())
    }
}
