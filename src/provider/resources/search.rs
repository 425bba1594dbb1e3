//! aidbox_search resource

use super::{reference_attribute, reference_to_block, required_reference};
use crate::aidbox::resource::ResourceBase;
use crate::aidbox::search::Search;
use crate::provider::data::ResourceData;
use crate::provider::handler::ResourceMapping;
use crate::provider::schema::{Attribute, ResourceSchema};
use anyhow::Result;
use serde_json::Value;

pub struct SearchMapping;

impl ResourceMapping for SearchMapping {
    type Model = Search;

    const TYPE_NAME: &'static str = "aidbox_search";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "Search https://docs.aidbox.app/api/rest-api/aidbox-search#search-resource",
            [
                (
                    "name",
                    Attribute::string("Name of search, used in search query string")
                        .required()
                        .force_new(),
                ),
                ("module", Attribute::string("Module name").optional()),
                ("where", Attribute::string("SQL of search").required()),
                (
                    "reference",
                    reference_attribute("Reference to resource this search is attached to")
                        .required()
                        .min_items(1)
                        .max_items(1)
                        .force_new(),
                ),
            ],
        )
        .importable()
    }

    fn from_data(data: &ResourceData) -> Result<Search> {
        let name = data.get_str("name");
        let resource = required_reference(data)?;
        Ok(Search {
            base: ResourceBase::with_id(Search::make_id(&resource.id, &name)),
            name,
            module: data.get_str("module"),
            resource,
            where_clause: data.get_str("where"),
        })
    }

    fn to_data(search: &Search, data: &mut ResourceData) -> Result<()> {
        data.set_id(search.base.id.as_str());
        data.set("name", search.name.as_str());
        data.set("module", search.module.as_str());
        data.set("where", search.where_clause.as_str());
        data.set("reference", Value::Array(vec![reference_to_block(&search.resource)]));
        Ok(())
    }
}
