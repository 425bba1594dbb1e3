//! aidbox_token_introspector resource and data source

use super::validate_enum;
use crate::aidbox::enums::TokenIntrospectorType;
use crate::aidbox::resource::ResourceBase;
use crate::aidbox::token_introspector::{IntrospectionEndpoint, IntrospectorJwt, TokenIntrospector};
use crate::provider::data::{block_str, ResourceData};
use crate::provider::handler::ResourceMapping;
use crate::provider::schema::{Attribute, ResourceSchema};
use anyhow::Result;
use serde_json::json;

pub struct TokenIntrospectorMapping;

impl ResourceMapping for TokenIntrospectorMapping {
    type Model = TokenIntrospector;

    const TYPE_NAME: &'static str = "aidbox_token_introspector";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "TokenIntrospector https://docs.aidbox.app/security-and-access-control-1/auth/access-token-introspection.",
            [
                (
                    "type",
                    Attribute::string("Type of token introspector. One of (opaque|jwt)")
                        .required()
                        .validate(validate_enum::<TokenIntrospectorType>),
                ),
                (
                    "introspection_endpoint",
                    Attribute::block(
                        "Configuration for introspecting opaque access tokens.",
                        [
                            (
                                "authorization",
                                Attribute::string("Authorization header value.").optional().sensitive(),
                            ),
                            ("url", Attribute::string("URL of the introspection endpoint.").optional()),
                        ],
                    )
                    .optional()
                    .max_items(1),
                ),
                (
                    "jwks_uri",
                    Attribute::string("Location of JWKS public key information for validating JWT tokens").optional(),
                ),
                (
                    "jwt",
                    Attribute::block(
                        "Configuration for validating jwt type access tokens",
                        [
                            ("iss", Attribute::string("The issuer of the JWT").required()),
                            (
                                "secret",
                                Attribute::string("The secret used to sign the JWT").optional().sensitive(),
                            ),
                        ],
                    )
                    .optional()
                    .max_items(1),
                ),
            ],
        )
    }

    fn from_data(data: &ResourceData) -> Result<TokenIntrospector> {
        Ok(TokenIntrospector {
            base: ResourceBase::with_id(data.id()),
            introspection_endpoint: data.get_block("introspection_endpoint").map(|block| {
                IntrospectionEndpoint {
                    authorization: block_str(&block, "authorization"),
                    url: block_str(&block, "url"),
                }
            }),
            jwks_uri: data.get_str("jwks_uri"),
            jwt: data.get_block("jwt").map(|block| IntrospectorJwt {
                iss: block_str(&block, "iss"),
                secret: block_str(&block, "secret"),
            }),
            kind: data.get_str("type").parse()?,
        })
    }

    fn to_data(introspector: &TokenIntrospector, data: &mut ResourceData) -> Result<()> {
        data.set_id(introspector.base.id.as_str());
        data.set("type", introspector.kind.as_str());
        match &introspector.introspection_endpoint {
            Some(endpoint) => data.set(
                "introspection_endpoint",
                json!([{"authorization": endpoint.authorization, "url": endpoint.url}]),
            ),
            None => data.set("introspection_endpoint", json!([])),
        }
        data.set("jwks_uri", introspector.jwks_uri.as_str());
        match &introspector.jwt {
            Some(jwt) => data.set("jwt", json!([{"iss": jwt.iss, "secret": jwt.secret}])),
            None => data.set("jwt", json!([])),
        }
        Ok(())
    }
}
