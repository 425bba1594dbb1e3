//! Provider Registry - every resource and data source the provider serves
//!
//! Handlers are built once and looked up by their type name.

use super::handler::{DataSourceHandler, ResourceHandler, RestDataSource, RestResource};
use super::resources::access_policy::AccessPolicyMapping;
use super::resources::auth_client::AuthClientMapping;
use super::resources::db_migration::DbMigrationHandler;
use super::resources::gcp_service_account::GcpServiceAccountMapping;
use super::resources::identity_provider::IdentityProviderMapping;
use super::resources::multibox::BoxHandler;
use super::resources::questionnaire_theme::QuestionnaireThemeMapping;
use super::resources::sdc_config::SdcConfigMapping;
use super::resources::search::SearchMapping;
use super::resources::search_parameter::{FhirSearchParameterMapping, SearchParameterMapping};
use super::resources::structure_definition::{StructureDefinitionMapping, StructureDefinitionOverride};
use super::resources::subscription::{SubscriptionTopicMapping, TopicDestinationMapping};
use super::resources::token_introspector::TokenIntrospectorMapping;
use super::resources::user::UserDataSource;
use super::schema::{Attribute, ProviderSchema};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub struct Registry {
    pub resources: BTreeMap<&'static str, Box<dyn ResourceHandler>>,
    pub data_sources: BTreeMap<&'static str, Box<dyn DataSourceHandler>>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn build_registry() -> Registry {
    let resources: Vec<Box<dyn ResourceHandler>> = vec![
        Box::new(RestResource::<AccessPolicyMapping>::new()),
        Box::new(RestResource::<AuthClientMapping>::new()),
        Box::new(RestResource::<TokenIntrospectorMapping>::new()),
        Box::new(RestResource::<SearchParameterMapping>::new()),
        Box::new(RestResource::<FhirSearchParameterMapping>::new()),
        Box::new(RestResource::<SearchMapping>::new()),
        Box::new(RestResource::<StructureDefinitionMapping>::new()),
        Box::new(StructureDefinitionOverride),
        Box::new(RestResource::<SdcConfigMapping>::new()),
        Box::new(RestResource::<GcpServiceAccountMapping>::new()),
        Box::new(RestResource::<QuestionnaireThemeMapping>::new()),
        Box::new(RestResource::<IdentityProviderMapping>::new()),
        Box::new(RestResource::<SubscriptionTopicMapping>::new()),
        Box::new(RestResource::<TopicDestinationMapping>::new()),
        Box::new(BoxHandler),
        Box::new(DbMigrationHandler),
    ];
    let data_sources: Vec<Box<dyn DataSourceHandler>> = vec![
        Box::new(UserDataSource),
        Box::new(RestDataSource::<TokenIntrospectorMapping>::new()),
        Box::new(RestDataSource::<AccessPolicyMapping>::new()),
    ];

    let registry = Registry {
        resources: resources.into_iter().map(|h| (h.type_name(), h)).collect(),
        data_sources: data_sources.into_iter().map(|h| (h.type_name(), h)).collect(),
    };
    tracing::debug!(
        "Registered {} resources and {} data sources",
        registry.resources.len(),
        registry.data_sources.len()
    );
    registry
}

/// Get the global registry
pub fn get_registry() -> &'static Registry {
    REGISTRY.get_or_init(build_registry)
}

pub fn get_resource(type_name: &str) -> Option<&'static dyn ResourceHandler> {
    get_registry().resources.get(type_name).map(|h| h.as_ref())
}

pub fn get_data_source(type_name: &str) -> Option<&'static dyn DataSourceHandler> {
    get_registry().data_sources.get(type_name).map(|h| h.as_ref())
}

/// Provider configuration attributes with their environment fallbacks
pub fn provider_attributes() -> BTreeMap<String, Attribute> {
    [
        (
            "url",
            Attribute::string("The URL of the Aidbox server, falls back to AIDBOX_URL")
                .optional()
                .default_value("http://localhost:8888"),
        ),
        (
            "client_id",
            Attribute::string("The Aidbox client id, falls back to AIDBOX_CLIENT_ID")
                .optional()
                .default_value("root"),
        ),
        (
            "client_secret",
            Attribute::string("The Aidbox client secret, falls back to AIDBOX_CLIENT_SECRET")
                .optional()
                .sensitive()
                .default_value("secret"),
        ),
        (
            "is_multibox",
            Attribute::bool(
                "Whether the server is a multibox deployment. Credentials must then belong to the superuser. \
                 Falls back to AIDBOX_IS_MULTIBOX",
            )
            .optional()
            .default_value(false),
        ),
    ]
    .into_iter()
    .map(|(name, attribute)| (name.to_string(), attribute))
    .collect()
}

/// Schema of the whole provider, as printed by the `schema` command
pub fn provider_schema() -> ProviderSchema {
    let registry = get_registry();
    ProviderSchema {
        provider: provider_attributes(),
        resources: registry
            .resources
            .iter()
            .map(|(name, handler)| (name.to_string(), handler.schema()))
            .collect(),
        data_sources: registry
            .data_sources
            .iter()
            .map(|(name, handler)| (name.to_string(), handler.schema()))
            .collect(),
    }
}
