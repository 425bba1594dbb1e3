//! aidbox_client resource

use super::validate_enum_list;
use crate::aidbox::auth_client::AuthClient;
use crate::aidbox::enums::GrantType;
use crate::aidbox::resource::ResourceBase;
use crate::provider::data::ResourceData;
use crate::provider::handler::ResourceMapping;
use crate::provider::schema::{Attribute, AttributeType, ResourceSchema};
use anyhow::Result;

pub struct AuthClientMapping;

impl ResourceMapping for AuthClientMapping {
    type Model = AuthClient;

    const TYPE_NAME: &'static str = "aidbox_client";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "Client https://docs.aidbox.app/security-and-access-control-1/auth/basic-auth.",
            [
                (
                    "name",
                    Attribute::string("Client ID used for authentication")
                        .required()
                        .force_new(),
                ),
                (
                    "secret",
                    Attribute::string("Client secret used for authentication")
                        .required()
                        .sensitive(),
                ),
                (
                    "grant_types",
                    Attribute::list_of(AttributeType::String, "Grant types the client may use, e.g. basic")
                        .required()
                        .min_items(1)
                        .validate(validate_enum_list::<GrantType>),
                ),
            ],
        )
        .importable()
    }

    fn from_data(data: &ResourceData) -> Result<AuthClient> {
        let grant_types = data
            .get_str_list("grant_types")
            .iter()
            .map(|t| t.parse::<GrantType>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AuthClient {
            base: ResourceBase::with_id(data.get_str("name")),
            secret: data.get_str("secret"),
            grant_types,
        })
    }

    fn to_data(client: &AuthClient, data: &mut ResourceData) -> Result<()> {
        data.set_id(client.base.id.as_str());
        data.set("name", client.base.id.as_str());
        data.set("secret", client.secret.as_str());
        let grant_types: Vec<&str> = client.grant_types.iter().map(GrantType::as_str).collect();
        data.set("grant_types", grant_types);
        Ok(())
    }
}
