//! JSON rendering of a generated schema.

use super::Emitter;
use crate::model::{Decorator, Graph, PropertyId, PropertyType, SchemaId, SchemaIdentity};
use crate::validator::ValidatorList;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Serializes a schema, its properties and the ids of every nested property
/// context, so tooling can walk the graph without this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEmitter;

#[derive(Serialize)]
struct SchemaView<'a> {
    #[serde(flatten)]
    identity: &'a SchemaIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    uses: BTreeSet<String>,
    properties: Vec<PropertyView<'a>>,
    base_validators: &'a ValidatorList,
    /// Properties only reachable through validators (items, branches, ...).
    nested_properties: Vec<PropertyView<'a>>,
}

#[derive(Serialize)]
struct PropertyView<'a> {
    id: PropertyId,
    name: &'a str,
    identifier: &'a str,
    #[serde(rename = "type")]
    ty: Option<&'a PropertyType>,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "no_decorators")]
    decorators: &'a [Decorator],
    validators: &'a ValidatorList,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<PropertyId>,
}

fn no_decorators(decorators: &&[Decorator]) -> bool {
    decorators.is_empty()
}

fn property_view(graph: &Graph, id: PropertyId) -> PropertyView<'_> {
    let property = graph.property(id);
    PropertyView {
        id,
        name: property.name(),
        identifier: property.identifier(),
        ty: property.property_type(),
        required: property.is_required(),
        default: property.default_value(),
        description: property.description(),
        decorators: property.decorators(),
        validators: property.validators(),
        children: graph.child_properties(id),
    }
}

impl JsonEmitter {
    fn view<'a>(&self, graph: &'a Graph, schema: SchemaId) -> SchemaView<'a> {
        let schema_id = graph.canonical(schema);
        let schema = graph.schema(schema_id);

        let mut nested = Vec::new();
        let mut seen: BTreeSet<PropertyId> = schema.properties().iter().copied().collect();
        let mut stack: Vec<PropertyId> = schema
            .base_validators()
            .iter()
            .flat_map(|validator| validator.check().children())
            .chain(
                schema
                    .properties()
                    .iter()
                    .flat_map(|&id| graph.child_properties(id)),
            )
            .collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            stack.extend(graph.child_properties(id));
            nested.push(id);
        }
        nested.sort();

        SchemaView {
            identity: schema.identity(),
            description: schema.description(),
            uses: graph.used_types(schema_id),
            properties: schema
                .properties()
                .iter()
                .map(|&id| property_view(graph, id))
                .collect(),
            base_validators: schema.base_validators(),
            nested_properties: nested.into_iter().map(|id| property_view(graph, id)).collect(),
        }
    }
}

impl Emitter for JsonEmitter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn emit(&self, graph: &Graph, schema: SchemaId) -> String {
        let view = self.view(graph, schema);
        // Every key is a string and every value serializable.
        serde_json::to_string_pretty(&view).unwrap_or_default()
    }
}
