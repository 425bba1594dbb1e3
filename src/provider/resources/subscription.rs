//! aidbox_aidbox_subscription_topic and aidbox_aidbox_topic_destination resources

use crate::aidbox::resource::ResourceBase;
use crate::aidbox::subscription::{
    AidboxSubscriptionTopic, AidboxTopicDestination, DestinationParameter, TopicTrigger,
};
use crate::provider::data::{block_str, ResourceData};
use crate::provider::handler::ResourceMapping;
use crate::provider::schema::{Attribute, ResourceSchema};
use anyhow::Result;
use serde_json::{json, Map, Value};

pub struct SubscriptionTopicMapping;

impl ResourceMapping for SubscriptionTopicMapping {
    type Model = AidboxSubscriptionTopic;

    const TYPE_NAME: &'static str = "aidbox_aidbox_subscription_topic";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "AidboxSubscriptionTopic https://docs.aidbox.app/modules/topic-based-subscriptions/wip-dynamic-subscriptiontopic-with-destinations",
            [
                (
                    "url",
                    Attribute::string("Canonical identifier for this subscription topic, represented as a URI (globally unique)")
                        .required(),
                ),
                (
                    "status",
                    Attribute::string("Value of draft | active | retired | unknown, see https://hl7.org/fhir/R4/valueset-publication-status.html")
                        .optional()
                        .default_value("active"),
                ),
                (
                    "trigger",
                    Attribute::block(
                        "Definition of a trigger for the subscription topic",
                        [(
                            "resource",
                            Attribute::string("Key Data Type, Resource (reference to definition), or relevant definition for this trigger")
                                .required(),
                        )],
                    )
                    .required()
                    .min_items(1),
                ),
            ],
        )
        .importable()
    }

    fn from_data(data: &ResourceData) -> Result<AidboxSubscriptionTopic> {
        Ok(AidboxSubscriptionTopic {
            base: ResourceBase::with_id(data.id()),
            url: data.get_str("url"),
            status: data.get_str("status"),
            trigger: data
                .get_blocks("trigger")
                .iter()
                .map(|block| TopicTrigger {
                    resource: block_str(block, "resource"),
                })
                .collect(),
        })
    }

    fn to_data(topic: &AidboxSubscriptionTopic, data: &mut ResourceData) -> Result<()> {
        data.set_id(topic.base.id.as_str());
        data.set("url", topic.url.as_str());
        data.set("status", topic.status.as_str());
        let triggers: Vec<Value> = topic
            .trigger
            .iter()
            .map(|t| json!({"resource": t.resource}))
            .collect();
        data.set("trigger", triggers);
        Ok(())
    }
}

pub struct TopicDestinationMapping;

fn validate_unsigned(value: &Value) -> Result<(), String> {
    match value {
        Value::Number(n) if n.as_u64().is_none() => Err(format!("Expected a non-negative integer, got {}", n)),
        _ => Ok(()),
    }
}

fn parameter_from_block(block: &Map<String, Value>) -> DestinationParameter {
    let non_empty = |key: &str| Some(block_str(block, key)).filter(|s| !s.is_empty());
    DestinationParameter {
        name: block_str(block, "name"),
        value_url: non_empty("url"),
        value_unsigned_int: block.get("unsigned_int").and_then(Value::as_u64),
        value_string: non_empty("string"),
    }
}

fn parameter_to_block(parameter: &DestinationParameter) -> Value {
    let mut block = Map::new();
    block.insert("name".to_string(), Value::String(parameter.name.clone()));
    if let Some(url) = &parameter.value_url {
        block.insert("url".to_string(), Value::String(url.clone()));
    }
    if let Some(n) = parameter.value_unsigned_int {
        block.insert("unsigned_int".to_string(), Value::from(n));
    }
    if let Some(s) = &parameter.value_string {
        block.insert("string".to_string(), Value::String(s.clone()));
    }
    Value::Object(block)
}

impl ResourceMapping for TopicDestinationMapping {
    type Model = AidboxTopicDestination;

    const TYPE_NAME: &'static str = "aidbox_aidbox_topic_destination";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "AidboxTopicDestination https://docs.aidbox.app/modules/topic-based-subscriptions/wip-dynamic-subscriptiontopic-with-destinations",
            [
                ("topic", Attribute::string("Unique URL of the topic to subscribe on").required()),
                ("kind", Attribute::string("One of kafka, webhook or gcp-pubsub").required()),
                ("content", Attribute::string("One of full-resource, id-only or empty").required()),
                (
                    "parameter",
                    Attribute::block(
                        "Channel-dependent information to send as part of the notification (e.g., HTTP Headers).",
                        [
                            (
                                "name",
                                Attribute::string("Name of a channel-dependent customization parameter").required(),
                            ),
                            (
                                "url",
                                Attribute::string("URL value for the specified parameter name").optional(),
                            ),
                            (
                                "unsigned_int",
                                Attribute::int("Unsigned integer value for the specified parameter name")
                                    .optional()
                                    .validate(validate_unsigned),
                            ),
                            (
                                "string",
                                Attribute::string("String value for the specified parameter name").optional(),
                            ),
                        ],
                    )
                    .optional(),
                ),
            ],
        )
        .importable()
    }

    fn from_data(data: &ResourceData) -> Result<AidboxTopicDestination> {
        let mut destination = AidboxTopicDestination {
            base: ResourceBase::with_id(data.id()),
            topic: data.get_str("topic"),
            kind: String::new(),
            content: data.get_str("content"),
            parameter: data
                .get_blocks("parameter")
                .iter()
                .map(parameter_from_block)
                .collect(),
        };
        destination.set_channel(&data.get_str("kind"));
        Ok(destination)
    }

    fn to_data(destination: &AidboxTopicDestination, data: &mut ResourceData) -> Result<()> {
        data.set_id(destination.base.id.as_str());
        data.set("topic", destination.topic.as_str());
        data.set("kind", destination.channel());
        data.set("content", destination.content.as_str());
        let parameters: Vec<Value> = destination.parameter.iter().map(parameter_to_block).collect();
        data.set("parameter", parameters);
        Ok(())
    }
}
