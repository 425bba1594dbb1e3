//! Resource base types and the `resourceType` discriminator
//!
//! Every REST resource embeds a [`ResourceBase`] and implements [`Resource`],
//! which ties the Rust type to its `resourceType` and REST path. Responses of
//! unknown shape go through [`parse_resource`], which peeks at `resourceType`
//! before decoding into the concrete type.

use super::access_policy::AccessPolicy;
use super::auth_client::AuthClient;
use super::error::AidboxError;
use super::gcp_service_account::GcpServiceAccount;
use super::identity_provider::IdentityProvider;
use super::questionnaire_theme::QuestionnaireTheme;
use super::sdc_config::SdcConfig;
use super::search::Search;
use super::search_parameter::{FhirSearchParameter, SearchParameter};
use super::structure_definition::StructureDefinition;
use super::subscription::{AidboxSubscriptionTopic, AidboxTopicDestination};
use super::token_introspector::TokenIntrospector;
use super::user::User;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields shared by every stored resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceBase {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl ResourceBase {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            meta: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<String>,
}

/// Reference to another resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    #[serde(rename = "resourceType")]
    pub resource_type: String,
}

/// FHIR search result set (only the entries are of interest)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BundleEntry {
    pub resource: Value,
}

/// A resource stored under a REST collection
pub trait Resource: Serialize + DeserializeOwned + Send + Sync {
    /// Value of the `resourceType` discriminator
    const RESOURCE_TYPE: &'static str;
    /// Collection path relative to the server URL
    const PATH: &'static str;
    /// Create with `PUT <path>/<id>` instead of `POST <path>`
    ///
    /// Some collections ignore a client-chosen id on POST.
    const CREATE_WITH_PUT: bool = false;

    fn base(&self) -> &ResourceBase;

    fn id(&self) -> &str {
        &self.base().id
    }
}

macro_rules! impl_resource {
    ($ty:ty, $resource_type:literal, $path:literal) => {
        impl_resource!($ty, $resource_type, $path, false);
    };
    ($ty:ty, $resource_type:literal, $path:literal, $create_with_put:literal) => {
        impl $crate::aidbox::resource::Resource for $ty {
            const RESOURCE_TYPE: &'static str = $resource_type;
            const PATH: &'static str = $path;
            const CREATE_WITH_PUT: bool = $create_with_put;

            fn base(&self) -> &$crate::aidbox::resource::ResourceBase {
                &self.base
            }
        }
    };
}
pub(crate) use impl_resource;

/// Read the `resourceType` member of a JSON object
pub fn resource_type_of(value: &Value) -> Option<&str> {
    value.get("resourceType").and_then(Value::as_str)
}

/// Encode a resource for the wire, stamping its `resourceType`
pub fn encode<T: Resource>(resource: &T) -> Result<Value> {
    let mut value = serde_json::to_value(resource)
        .with_context(|| format!("Failed to encode {}", T::RESOURCE_TYPE))?;
    if let Value::Object(map) = &mut value {
        map.insert(
            "resourceType".to_string(),
            Value::String(T::RESOURCE_TYPE.to_string()),
        );
    }
    Ok(value)
}

/// Decode a response as `T`, rejecting a mismatched `resourceType`
///
/// Bodies without a `resourceType` are accepted as-is.
pub fn decode<T: Resource>(value: Value) -> Result<T> {
    if let Some(actual) = resource_type_of(&value) {
        if actual != T::RESOURCE_TYPE {
            return Err(AidboxError::ResourceTypeMismatch {
                expected: T::RESOURCE_TYPE.to_string(),
                actual: actual.to_string(),
            }
            .into());
        }
    }
    serde_json::from_value(value).with_context(|| format!("Failed to decode {}", T::RESOURCE_TYPE))
}

/// Any resource the discriminator knows how to decode
#[derive(Debug, Clone)]
pub enum AnyResource {
    AccessPolicy(AccessPolicy),
    Client(AuthClient),
    TokenIntrospector(TokenIntrospector),
    SearchParameter(SearchParameter),
    FhirSearchParameter(FhirSearchParameter),
    Search(Search),
    StructureDefinition(StructureDefinition),
    SdcConfig(SdcConfig),
    GcpServiceAccount(GcpServiceAccount),
    QuestionnaireTheme(QuestionnaireTheme),
    IdentityProvider(IdentityProvider),
    AidboxSubscriptionTopic(AidboxSubscriptionTopic),
    AidboxTopicDestination(AidboxTopicDestination),
    User(User),
}

impl AnyResource {
    pub fn resource_type(&self) -> &'static str {
        match self {
            AnyResource::AccessPolicy(_) => AccessPolicy::RESOURCE_TYPE,
            AnyResource::Client(_) => AuthClient::RESOURCE_TYPE,
            AnyResource::TokenIntrospector(_) => TokenIntrospector::RESOURCE_TYPE,
            AnyResource::SearchParameter(_) => SearchParameter::RESOURCE_TYPE,
            AnyResource::FhirSearchParameter(_) => FhirSearchParameter::RESOURCE_TYPE,
            AnyResource::Search(_) => Search::RESOURCE_TYPE,
            AnyResource::StructureDefinition(_) => StructureDefinition::RESOURCE_TYPE,
            AnyResource::SdcConfig(_) => SdcConfig::RESOURCE_TYPE,
            AnyResource::GcpServiceAccount(_) => GcpServiceAccount::RESOURCE_TYPE,
            AnyResource::QuestionnaireTheme(_) => QuestionnaireTheme::RESOURCE_TYPE,
            AnyResource::IdentityProvider(_) => IdentityProvider::RESOURCE_TYPE,
            AnyResource::AidboxSubscriptionTopic(_) => AidboxSubscriptionTopic::RESOURCE_TYPE,
            AnyResource::AidboxTopicDestination(_) => AidboxTopicDestination::RESOURCE_TYPE,
            AnyResource::User(_) => User::RESOURCE_TYPE,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            AnyResource::AccessPolicy(r) => r.id(),
            AnyResource::Client(r) => r.id(),
            AnyResource::TokenIntrospector(r) => r.id(),
            AnyResource::SearchParameter(r) => r.id(),
            AnyResource::FhirSearchParameter(r) => r.id(),
            AnyResource::Search(r) => r.id(),
            AnyResource::StructureDefinition(r) => r.id(),
            AnyResource::SdcConfig(r) => r.id(),
            AnyResource::GcpServiceAccount(r) => r.id(),
            AnyResource::QuestionnaireTheme(r) => r.id(),
            AnyResource::IdentityProvider(r) => r.id(),
            AnyResource::AidboxSubscriptionTopic(r) => r.id(),
            AnyResource::AidboxTopicDestination(r) => r.id(),
            AnyResource::User(r) => r.id(),
        }
    }

    /// Wire representation, including `resourceType`
    pub fn to_json(&self) -> Result<Value> {
        match self {
            AnyResource::AccessPolicy(r) => encode(r),
            AnyResource::Client(r) => encode(r),
            AnyResource::TokenIntrospector(r) => encode(r),
            AnyResource::SearchParameter(r) => encode(r),
            AnyResource::FhirSearchParameter(r) => encode(r),
            AnyResource::Search(r) => encode(r),
            AnyResource::StructureDefinition(r) => encode(r),
            AnyResource::SdcConfig(r) => encode(r),
            AnyResource::GcpServiceAccount(r) => encode(r),
            AnyResource::QuestionnaireTheme(r) => encode(r),
            AnyResource::IdentityProvider(r) => encode(r),
            AnyResource::AidboxSubscriptionTopic(r) => encode(r),
            AnyResource::AidboxTopicDestination(r) => encode(r),
            AnyResource::User(r) => encode(r),
        }
    }
}

/// Decode a JSON resource by first inspecting its `resourceType`
///
/// `SearchParameter` exists in two formats on the wire: the Aidbox one
/// carries `expression` as nested element arrays, the FHIR one as a string.
pub fn parse_resource(bytes: &[u8]) -> Result<AnyResource> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse resource JSON")?;
    parse_resource_value(value)
}

pub fn parse_resource_value(value: Value) -> Result<AnyResource> {
    let resource_type = resource_type_of(&value).unwrap_or_default().to_string();

    let resource = match resource_type.as_str() {
        "AccessPolicy" => AnyResource::AccessPolicy(decode(value)?),
        "Client" => AnyResource::Client(decode(value)?),
        "TokenIntrospector" => AnyResource::TokenIntrospector(decode(value)?),
        "SearchParameter" => {
            if value.get("expression").map_or(false, Value::is_string) {
                AnyResource::FhirSearchParameter(decode(value)?)
            } else {
                AnyResource::SearchParameter(decode(value)?)
            }
        }
        "Search" => AnyResource::Search(decode(value)?),
        "StructureDefinition" => AnyResource::StructureDefinition(decode(value)?),
        "SDCConfig" => AnyResource::SdcConfig(decode(value)?),
        "GcpServiceAccount" => AnyResource::GcpServiceAccount(decode(value)?),
        "QuestionnaireTheme" => AnyResource::QuestionnaireTheme(decode(value)?),
        "IdentityProvider" => AnyResource::IdentityProvider(decode(value)?),
        "AidboxSubscriptionTopic" => AnyResource::AidboxSubscriptionTopic(decode(value)?),
        "AidboxTopicDestination" => AnyResource::AidboxTopicDestination(decode(value)?),
        "User" => AnyResource::User(decode(value)?),
        other => return Err(AidboxError::UnsupportedResourceType(other.to_string()).into()),
    };
    Ok(resource)
}
