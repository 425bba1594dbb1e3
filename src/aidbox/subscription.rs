//! Topic-based subscription resources
//!
//! An [`AidboxSubscriptionTopic`] names the resource changes to publish, an
//! [`AidboxTopicDestination`] delivers a topic to a channel such as kafka or
//! a webhook. Only at-least-once delivery exists, so a destination's `kind`
//! and profile always carry that suffix on the wire.

use super::resource::{impl_resource, Meta, ResourceBase};
use serde::{Deserialize, Serialize};

const KIND_SUFFIX: &str = "-at-least-once";
const KIND_PROFILE_PREFIX: &str = "http://aidbox.app/StructureDefinition/aidboxtopicdestination-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AidboxSubscriptionTopic {
    #[serde(flatten)]
    pub base: ResourceBase,
    pub url: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub trigger: Vec<TopicTrigger>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicTrigger {
    pub resource: String,
}

impl_resource!(
    AidboxSubscriptionTopic,
    "AidboxSubscriptionTopic",
    "fhir/AidboxSubscriptionTopic"
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AidboxTopicDestination {
    #[serde(flatten)]
    pub base: ResourceBase,
    pub topic: String,
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub parameter: Vec<DestinationParameter>,
}

/// Channel-specific setting (header, endpoint, batch size...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_unsigned_int: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
}

impl_resource!(
    AidboxTopicDestination,
    "AidboxTopicDestination",
    "fhir/AidboxTopicDestination"
);

impl AidboxTopicDestination {
    /// Set the delivery channel, e.g. `kafka`, stamping kind and profile
    pub fn set_channel(&mut self, channel: &str) {
        self.kind = format!("{}{}", channel, KIND_SUFFIX);
        let meta = self.base.meta.get_or_insert_with(Meta::default);
        meta.profile = vec![format!("{}{}{}", KIND_PROFILE_PREFIX, channel, KIND_SUFFIX)];
    }

    /// Delivery channel without the at-least-once suffix
    pub fn channel(&self) -> &str {
        self.kind.strip_suffix(KIND_SUFFIX).unwrap_or(&self.kind)
    }
}
