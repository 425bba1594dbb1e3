//! aidbox_identity_provider resource

use super::validate_enum;
use crate::aidbox::enums::UserinfoSource;
use crate::aidbox::identity_provider::{IdentityProvider, IdentityProviderClient};
use crate::aidbox::resource::ResourceBase;
use crate::provider::data::{block_str, ResourceData};
use crate::provider::handler::ResourceMapping;
use crate::provider::schema::{Attribute, AttributeType, ResourceSchema};
use anyhow::Result;
use serde_json::json;

pub struct IdentityProviderMapping;

impl ResourceMapping for IdentityProviderMapping {
    type Model = IdentityProvider;

    const TYPE_NAME: &'static str = "aidbox_identity_provider";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "IdentityProvider https://docs.aidbox.app/security-and-access-control-1/auth/sso-with-external-provider",
            [
                ("title", Attribute::string("Title of the identity provider.").optional()),
                (
                    "client",
                    Attribute::block(
                        "Authentication of the OAuth Provider.",
                        [
                            (
                                "id",
                                Attribute::string("id of the client you registered in OAuth Provider API.").optional(),
                            ),
                            (
                                "secret",
                                Attribute::string("secret of the client you registered in OAuth Provider API.")
                                    .optional()
                                    .sensitive(),
                            ),
                        ],
                    )
                    .optional()
                    .max_items(1),
                ),
                (
                    "system",
                    Attribute::string("Adds identifier for the created user with this system.").optional(),
                ),
                (
                    "authorize_endpoint",
                    Attribute::string("OAuth Provider authorization endpoint.").optional(),
                ),
                (
                    "token_endpoint",
                    Attribute::string("OAuth Provider access token endpoint.").optional(),
                ),
                (
                    "userinfo_source",
                    Attribute::string(
                        "One of (id-token|userinfo-endpoint). If `id-token`, then `user.data` is populated with the \
                         `id_token.claims` value. Otherwise request to the `userinfo_endpoint` is performed to get user details.",
                    )
                    .optional()
                    .validate(validate_enum::<UserinfoSource>),
                ),
                (
                    "userinfo_endpoint",
                    Attribute::string("OAuth Provider user profile endpoint.").optional(),
                ),
                (
                    "scopes",
                    Attribute::list_of(AttributeType::String, "Array of scopes for which you request access from user.")
                        .optional(),
                ),
            ],
        )
        .importable()
    }

    fn from_data(data: &ResourceData) -> Result<IdentityProvider> {
        let userinfo_source = match data.get_str("userinfo_source").as_str() {
            "" => None,
            source => Some(source.parse()?),
        };
        Ok(IdentityProvider {
            base: ResourceBase::with_id(data.id()),
            title: data.get_str("title"),
            system: data.get_str("system"),
            authorize_endpoint: data.get_str("authorize_endpoint"),
            token_endpoint: data.get_str("token_endpoint"),
            userinfo_source,
            userinfo_endpoint: data.get_str("userinfo_endpoint"),
            scopes: data.get_str_list("scopes"),
            client: data.get_block("client").map(|block| IdentityProviderClient {
                id: block_str(&block, "id"),
                secret: block_str(&block, "secret"),
            }),
        })
    }

    fn to_data(provider: &IdentityProvider, data: &mut ResourceData) -> Result<()> {
        data.set_id(provider.base.id.as_str());
        data.set("title", provider.title.as_str());
        data.set("system", provider.system.as_str());
        data.set("authorize_endpoint", provider.authorize_endpoint.as_str());
        data.set("token_endpoint", provider.token_endpoint.as_str());
        data.set(
            "userinfo_source",
            provider.userinfo_source.map(|s| s.as_str()).unwrap_or_default(),
        );
        data.set("userinfo_endpoint", provider.userinfo_endpoint.as_str());
        data.set("scopes", provider.scopes.clone());
        match &provider.client {
            Some(client) => data.set("client", json!([{"id": client.id, "secret": client.secret}])),
            None => data.set("client", json!([])),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_userinfo_source_is_omitted() {
        let mut data = ResourceData::new();
        data.set_id("google");
        data.set("title", "Google");
        data.set("scopes", json!(["openid", "email"]));

        let provider = IdentityProviderMapping::from_data(&data).unwrap();
        assert_eq!(provider.userinfo_source, None);

        let wire = serde_json::to_value(&provider).unwrap();
        assert!(wire.get("userinfo-source").is_none());
        assert_eq!(wire["scopes"], json!(["openid", "email"]));
    }

    #[test]
    fn test_userinfo_source_and_client() {
        let mut data = ResourceData::new();
        data.set("userinfo_source", "id-token");
        data.set("client", json!([{"id": "aidbox", "secret": "shh"}]));

        let provider = IdentityProviderMapping::from_data(&data).unwrap();
        assert_eq!(provider.userinfo_source, Some(UserinfoSource::IdToken));

        let mut refreshed = ResourceData::new();
        IdentityProviderMapping::to_data(&provider, &mut refreshed).unwrap();
        assert_eq!(refreshed.get_str("userinfo_source"), "id-token");
        assert_eq!(refreshed.get_block("client").unwrap()["secret"], "shh");
    }
}
