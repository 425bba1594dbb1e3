//! Resource and data source handlers
//!
//! A [`ResourceHandler`] wires the lifecycle callbacks of one resource type
//! to [`ApiClient`] calls. Most resources are plain REST documents; those
//! implement [`ResourceMapping`] and get their handler from
//! [`RestResource`]. Resources with unusual semantics implement the trait
//! directly.

use super::data::ResourceData;
use super::schema::{Attribute, ResourceSchema, BOX_ID};
use crate::aidbox::resource::Resource;
use crate::aidbox::{is_not_found, ApiClient};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::marker::PhantomData;

#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Resource type name, e.g. `aidbox_access_policy`
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> ResourceSchema;

    async fn create(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()>;

    /// Refresh `data` from the server; clears the id when the resource is gone
    async fn read(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()>;

    async fn update(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()>;

    async fn delete(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()>;

    /// Populate `data` (which only carries the id and `box_id`) from the server
    async fn import(&self, _client: &ApiClient, _data: &mut ResourceData) -> Result<()> {
        bail!("Resource {} does not support import", self.type_name())
    }
}

#[async_trait]
pub trait DataSourceHandler: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> ResourceSchema;

    async fn read(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()>;
}

/// Drop a resource that no longer exists from state
///
/// Returns true when the error was a not-found and the id was cleared.
pub fn handle_not_found(err: &anyhow::Error, data: &mut ResourceData) -> bool {
    if is_not_found(err) {
        tracing::warn!(
            "Removing resource with id {} from state as it no longer exists",
            data.id()
        );
        data.clear_id();
        true
    } else {
        false
    }
}

// =============================================================================
// REST resources
// =============================================================================

/// Mapping between the attribute bag and a REST resource model
pub trait ResourceMapping: Send + Sync + 'static {
    type Model: Resource;

    const TYPE_NAME: &'static str;

    /// Resource schema without the base attributes
    fn schema() -> ResourceSchema;

    fn from_data(data: &ResourceData) -> Result<Self::Model>;

    /// Write the server representation back, including the id
    fn to_data(model: &Self::Model, data: &mut ResourceData) -> Result<()>;
}

/// Handler for a resource stored under a REST collection
pub struct RestResource<M>(PhantomData<M>);

impl<M> RestResource<M> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<M> Default for RestResource<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M: ResourceMapping> ResourceHandler for RestResource<M> {
    fn type_name(&self) -> &'static str {
        M::TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        M::schema().with_base()
    }

    async fn create(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let model = M::from_data(data)?;
        let created = client
            .create(&model, &data.box_id())
            .await
            .with_context(|| format!("Failed to create {}", M::TYPE_NAME))?;
        tracing::info!("Created {} {}", M::TYPE_NAME, created.id());
        M::to_data(&created, data)
    }

    async fn read(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let result = client.get::<M::Model>(data.id(), &data.box_id()).await;
        match result {
            Ok(found) => M::to_data(&found, data),
            Err(e) if handle_not_found(&e, data) => Ok(()),
            Err(e) => Err(e.context(format!("Failed to read {} {}", M::TYPE_NAME, data.id()))),
        }
    }

    async fn update(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let model = M::from_data(data)?;
        let updated = client
            .update(&model, &data.box_id())
            .await
            .with_context(|| format!("Failed to update {} {}", M::TYPE_NAME, data.id()))?;
        M::to_data(&updated, data)
    }

    async fn delete(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let result = client.delete::<M::Model>(data.id(), &data.box_id()).await;
        match result {
            Ok(()) => {}
            Err(e) if is_not_found(&e) => {
                tracing::debug!("{} {} was already deleted", M::TYPE_NAME, data.id());
            }
            Err(e) => return Err(e.context(format!("Failed to delete {} {}", M::TYPE_NAME, data.id()))),
        }
        data.clear_id();
        Ok(())
    }

    async fn import(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        if !M::schema().importable {
            bail!("Resource {} does not support import", M::TYPE_NAME);
        }
        let found: M::Model = client
            .get(data.id(), &data.box_id())
            .await
            .with_context(|| format!("Failed to import {} {}", M::TYPE_NAME, data.id()))?;
        M::to_data(&found, data)
    }
}

/// Data source reading a REST resource by id
pub struct RestDataSource<M>(PhantomData<M>);

impl<M> RestDataSource<M> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<M> Default for RestDataSource<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a resource schema into a lookup-by-id data source schema
///
/// Every attribute becomes computed except `box_id`; `id` is added as the
/// required lookup key.
pub fn data_source_schema(resource: ResourceSchema) -> ResourceSchema {
    let mut schema = resource.with_base();
    for (name, attribute) in schema.attributes.iter_mut() {
        if name != BOX_ID {
            *attribute = into_computed(attribute.clone());
        }
    }
    schema.importable = false;
    schema.attributes.insert(
        "id".to_string(),
        Attribute::string("Id of the resource to read").required(),
    );
    schema
}

fn into_computed(mut attribute: Attribute) -> Attribute {
    attribute.required = false;
    attribute.optional = false;
    attribute.computed = true;
    attribute.default = None;
    attribute.min_items = None;
    attribute.max_items = None;
    attribute.validate = None;
    attribute.block = attribute
        .block
        .into_iter()
        .map(|(name, nested)| (name, into_computed(nested)))
        .collect();
    attribute
}

/// Move the configured `id` lookup key into the resource id
pub fn take_lookup_id(data: &mut ResourceData) -> Result<String> {
    let id = match data.remove("id") {
        Some(serde_json::Value::String(id)) if !id.is_empty() => id,
        _ if !data.id().is_empty() => data.id().to_string(),
        _ => bail!("No id provided for data source"),
    };
    data.set_id(id.clone());
    Ok(id)
}

#[async_trait]
impl<M: ResourceMapping> DataSourceHandler for RestDataSource<M> {
    fn type_name(&self) -> &'static str {
        M::TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        data_source_schema(M::schema())
    }

    async fn read(&self, client: &ApiClient, data: &mut ResourceData) -> Result<()> {
        let id = take_lookup_id(data)?;
        let found: M::Model = client
            .get(&id, &data.box_id())
            .await
            .with_context(|| format!("Failed to read data source {} {}", M::TYPE_NAME, id))?;
        M::to_data(&found, data)
    }
}
