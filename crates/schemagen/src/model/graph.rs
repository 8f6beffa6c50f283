//! Arena holding every property and schema built during a run.

use super::property::{Property, PropertyId};
use super::schema::{Schema, SchemaId, SchemaIdentity};
use std::collections::BTreeSet;

/// Property and schema storage addressed by stable ids.
///
/// Builders hold ids rather than references, so placeholders created for
/// cyclic references can be bound after their target finishes.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    properties: Vec<Property>,
    schemas: Vec<Schema>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_property(&mut self, property: Property) -> PropertyId {
        self.properties.push(property);
        PropertyId(self.properties.len() - 1)
    }

    pub fn property(&self, id: PropertyId) -> &Property {
        &self.properties[id.0]
    }

    pub(crate) fn property_mut(&mut self, id: PropertyId) -> &mut Property {
        &mut self.properties[id.0]
    }

    pub(crate) fn reserve_schema(&mut self, identity: SchemaIdentity, root: bool) -> SchemaId {
        self.schemas.push(Schema::new(identity, root));
        SchemaId(self.schemas.len() - 1)
    }

    /// Follow dedup redirects to the schema that is actually generated.
    pub fn canonical(&self, mut id: SchemaId) -> SchemaId {
        while let Some(target) = self.schemas[id.0].redirect {
            id = target;
        }
        id
    }

    /// The generated schema for `id`, after redirects.
    pub fn schema(&self, id: SchemaId) -> &Schema {
        &self.schemas[self.canonical(id).0]
    }

    /// The schema slot for `id` itself, even when redirected.
    pub(crate) fn schema_entry(&self, id: SchemaId) -> &Schema {
        &self.schemas[id.0]
    }

    pub(crate) fn schema_mut(&mut self, id: SchemaId) -> &mut Schema {
        &mut self.schemas[id.0]
    }

    /// Every schema that will be generated, in creation order.
    pub fn schemas(&self) -> impl Iterator<Item = (SchemaId, &Schema)> {
        self.schemas
            .iter()
            .enumerate()
            .filter(|(_, schema)| schema.redirect.is_none())
            .map(|(index, schema)| (SchemaId(index), schema))
    }

    pub fn schema_count(&self) -> usize {
        self.schemas().count()
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Look up a property of a schema by its JSON name.
    pub fn find_property(&self, schema: SchemaId, name: &str) -> Option<PropertyId> {
        self.schema(schema)
            .properties
            .iter()
            .copied()
            .find(|&id| self.property(id).name == name)
    }

    /// Look up a generated schema by class name.
    pub fn find_schema(&self, class_name: &str) -> Option<SchemaId> {
        self.schemas()
            .find(|(_, schema)| schema.identity.class_name == class_name)
            .map(|(id, _)| id)
    }

    /// Properties reachable from a property through its validators
    /// (array items, composition branches, ...), excluding nested schemas.
    pub fn child_properties(&self, id: PropertyId) -> Vec<PropertyId> {
        self.property(id)
            .validators
            .iter()
            .flat_map(|validator| validator.check().children())
            .collect()
    }

    /// Generated schemas referenced by `id`, directly or through nested
    /// property contexts. The schema itself is not included.
    pub fn referenced_schemas(&self, id: SchemaId) -> BTreeSet<SchemaId> {
        let id = self.canonical(id);
        let schema = self.schema(id);
        let mut found = BTreeSet::new();
        let mut stack: Vec<PropertyId> = schema.properties.clone();
        for validator in schema.base_validators.iter() {
            stack.extend(validator.check().children());
            found.extend(validator.check().schema_refs().map(|s| self.canonical(s)));
        }

        let mut seen = BTreeSet::new();
        while let Some(property) = stack.pop() {
            if !seen.insert(property) {
                continue;
            }
            let entry = self.property(property);
            if let Some(nested) = entry.nested_schema {
                found.insert(self.canonical(nested));
            }
            for validator in entry.validators.iter() {
                found.extend(validator.check().schema_refs().map(|s| self.canonical(s)));
                stack.extend(validator.check().children());
            }
        }

        found.remove(&id);
        found
    }

    /// Qualified names of referenced types living in another namespace.
    pub fn used_types(&self, id: SchemaId) -> BTreeSet<String> {
        let namespace = &self.schema(id).identity.namespace;
        self.referenced_schemas(id)
            .into_iter()
            .map(|nested| &self.schema(nested).identity)
            .filter(|identity| &identity.namespace != namespace)
            .map(SchemaIdentity::qualified)
            .collect()
    }
}
