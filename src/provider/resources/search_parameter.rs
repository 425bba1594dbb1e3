//! aidbox_search_parameter and aidbox_fhir_search_parameter resources

use super::{reference_attribute, reference_to_block, required_reference, validate_enum};
use crate::aidbox::enums::SearchParameterType;
use crate::aidbox::resource::ResourceBase;
use crate::aidbox::search_parameter::{
    expression_element_from_str, expression_element_to_string, FhirSearchParameter, SearchParameter,
};
use crate::provider::data::ResourceData;
use crate::provider::handler::ResourceMapping;
use crate::provider::schema::{Attribute, AttributeType, ResourceSchema};
use anyhow::Result;
use serde_json::Value;

const SEARCH_PARAMETER_TYPES: &str =
    "One of (string|number|date|token|quantity|reference|uri|composite)";

pub struct SearchParameterMapping;

impl ResourceMapping for SearchParameterMapping {
    type Model = SearchParameter;

    const TYPE_NAME: &'static str = "aidbox_search_parameter";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "SearchParameter https://docs.aidbox.app/api-1/fhir-api/search-1/searchparameter",
            [
                (
                    "name",
                    Attribute::string("Name of search parameter, used in search query string")
                        .required()
                        .force_new(),
                ),
                ("module", Attribute::string("Module name").optional()),
                (
                    "type",
                    Attribute::string(&format!("Type of search parameter. {}", SEARCH_PARAMETER_TYPES))
                        .required()
                        .validate(validate_enum::<SearchParameterType>),
                ),
                (
                    "expression",
                    Attribute::list_of(
                        AttributeType::String,
                        "Path to the searchable element. Each item is an element name, an index, or a key|value filter",
                    )
                    .required()
                    .min_items(1),
                ),
                (
                    "reference",
                    reference_attribute("Reference to resource this search param is attached to")
                        .required()
                        .min_items(1)
                        .max_items(1)
                        .force_new(),
                ),
            ],
        )
    }

    fn from_data(data: &ResourceData) -> Result<SearchParameter> {
        let name = data.get_str("name");
        let resource = required_reference(data)?;
        let path = data
            .get_str_list("expression")
            .iter()
            .map(|element| expression_element_from_str(element))
            .collect();
        Ok(SearchParameter {
            base: ResourceBase::with_id(SearchParameter::make_id(&resource.id, &name)),
            name,
            module: data.get_str("module"),
            kind: data.get_str("type").parse()?,
            expression: vec![path],
            resource,
        })
    }

    fn to_data(parameter: &SearchParameter, data: &mut ResourceData) -> Result<()> {
        data.set_id(parameter.base.id.as_str());
        data.set("name", parameter.name.as_str());
        data.set("module", parameter.module.as_str());
        data.set("type", parameter.kind.as_str());
        let expression: Vec<String> = parameter
            .expression
            .first()
            .map(|path| path.iter().map(expression_element_to_string).collect())
            .unwrap_or_default();
        data.set("expression", expression);
        data.set("reference", Value::Array(vec![reference_to_block(&parameter.resource)]));
        Ok(())
    }
}

pub struct FhirSearchParameterMapping;

impl ResourceMapping for FhirSearchParameterMapping {
    type Model = FhirSearchParameter;

    const TYPE_NAME: &'static str = "aidbox_fhir_search_parameter";

    fn schema() -> ResourceSchema {
        ResourceSchema::new(
            "FHIR R4 SearchParameter https://hl7.org/fhir/R4/searchparameter.html",
            [
                (
                    "name",
                    Attribute::string("Name of search parameter, used in search query string")
                        .required()
                        .force_new(),
                ),
                (
                    "type",
                    Attribute::string(&format!("Type of search parameter. {}", SEARCH_PARAMETER_TYPES))
                        .required()
                        .validate(validate_enum::<SearchParameterType>),
                ),
                (
                    "description",
                    Attribute::string("Natural language description of the search parameter").required(),
                ),
                (
                    "url",
                    Attribute::string("Canonical identifier for this search parameter, represented as a URI (globally unique)")
                        .required(),
                ),
                ("code", Attribute::string("Code used in URL").required()),
                (
                    "status",
                    Attribute::string("Value of draft | active | retired | unknown, see https://hl7.org/fhir/R4/valueset-publication-status.html")
                        .optional()
                        .default_value("active"),
                ),
                (
                    "base",
                    Attribute::list_of(AttributeType::String, "The resource type(s) this search parameter applies to")
                        .required()
                        .min_items(1)
                        .force_new(),
                ),
                (
                    "expression",
                    Attribute::string("FHIRPath expression that extracts the values, see https://hl7.org/fhir/fhirpath.html")
                        .required(),
                ),
            ],
        )
        .importable()
    }

    fn from_data(data: &ResourceData) -> Result<FhirSearchParameter> {
        let name = data.get_str("name");
        let base_types = data.get_str_list("base");
        Ok(FhirSearchParameter {
            base: ResourceBase::with_id(FhirSearchParameter::make_id(&base_types, &name)),
            name,
            kind: data.get_str("type").parse()?,
            expression: data.get_str("expression"),
            description: data.get_str("description"),
            url: data.get_str("url"),
            status: data.get_str("status"),
            code: data.get_str("code"),
            base_types,
        })
    }

    fn to_data(parameter: &FhirSearchParameter, data: &mut ResourceData) -> Result<()> {
        data.set_id(parameter.base.id.as_str());
        data.set("name", parameter.name.as_str());
        data.set("type", parameter.kind.as_str());
        data.set("description", parameter.description.as_str());
        data.set("url", parameter.url.as_str());
        data.set("code", parameter.code.as_str());
        data.set("status", parameter.status.as_str());
        data.set("base", parameter.base_types.clone());
        data.set("expression", parameter.expression.as_str());
        Ok(())
    }
}
