//! aidbox_access_policy resource and data source

use super::{get_json, json_attribute, json_text, reference_attribute, reference_from_block, reference_to_block, validate_enum};
use crate::aidbox::access_policy::AccessPolicy;
use crate::aidbox::enums::AccessPolicyEngine;
use crate::aidbox::resource::ResourceBase;
use crate::provider::data::ResourceData;
use crate::provider::handler::ResourceMapping;
use crate::provider::schema::{Attribute, ResourceSchema};
use anyhow::Result;
use serde_json::Value;

pub struct AccessPolicyMapping;

impl ResourceMapping for AccessPolicyMapping {
    type Model = AccessPolicy;

    const TYPE_NAME: &'static str = "aidbox_access_policy";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "AccessPolicy https://docs.aidbox.app/security-and-access-control-1/security/access-policy.",
            [
                (
                    "description",
                    Attribute::string("Description of access policy for human users.").optional(),
                ),
                (
                    "engine",
                    Attribute::string("The engine which is used to evaluate this policy. One of (json-schema|allow|sql|complex|matcho|clj)")
                        .required()
                        .validate(validate_enum::<AccessPolicyEngine>),
                ),
                (
                    "schema",
                    json_attribute("JSON-schema policy to be evaluated. Used only if engine is json-schema").optional(),
                ),
                (
                    "link",
                    reference_attribute("The actors to allow access. Used only if engine is allow.").optional(),
                ),
            ],
        )
    }

    fn from_data(data: &ResourceData) -> Result<AccessPolicy> {
        Ok(AccessPolicy {
            base: ResourceBase::with_id(data.id()),
            description: data.get_str("description"),
            engine: data.get_str("engine").parse()?,
            schema: get_json(data, "schema")?,
            link: data
                .get_blocks("link")
                .iter()
                .map(reference_from_block)
                .collect(),
        })
    }

    fn to_data(policy: &AccessPolicy, data: &mut ResourceData) -> Result<()> {
        data.set_id(policy.base.id.as_str());
        data.set("description", policy.description.as_str());
        data.set("engine", policy.engine.as_str());
        match &policy.schema {
            Some(schema) => data.set("schema", json_text(schema)?),
            None => data.set("schema", ""),
        }
        let links: Vec<Value> = policy.link.iter().map(reference_to_block).collect();
        data.set("link", links);
        Ok(())
    }
}
