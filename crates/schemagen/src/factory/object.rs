use crate::error::DefinitionError;
use crate::generator::{Generator, Scope};
use crate::model::{Decorator, JsonKind, Property, PropertyId, PropertyType, SchemaId, SchemaIdentity};
use crate::validator::{Check, Validator};
use serde_json::Value;

impl Generator {
    /// Materialize a nested type for an object node and return the property
    /// holding it. `merge` names the type as a composition merge class.
    pub(crate) fn build_object(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
        required: bool,
        merge: bool,
    ) -> Result<PropertyId, DefinitionError> {
        let schema = self.reserve_object_schema(scope, name, node, merge);
        self.build_object_into(scope, name, node, required, schema)
    }

    /// Process an object node into an already reserved schema.
    pub(crate) fn build_object_into(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
        required: bool,
        schema: SchemaId,
    ) -> Result<PropertyId, DefinitionError> {
        let mut property = self.materialize_object(scope, name, node, required, schema)?;
        self.apply_common(&mut property, node, required)?;
        Ok(self.graph.add_property(property))
    }

    /// The object member of a multi-type property; shared steps are left to
    /// the union.
    pub(super) fn object_member(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
        required: bool,
    ) -> Result<Property, DefinitionError> {
        let schema = self.reserve_object_schema(scope, name, node, false);
        self.materialize_object(scope, name, node, required, schema)
    }

    fn reserve_object_schema(&mut self, scope: &Scope, name: &str, node: &Value, merge: bool) -> SchemaId {
        let class_name = self
            .config
            .naming
            .class_name(name, node, merge, &scope.class_name);
        let class_name = self.unique_class_name(&scope.namespace, &class_name);
        self.graph
            .reserve_schema(SchemaIdentity::new(scope.namespace.clone(), class_name), false)
    }

    fn materialize_object(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
        required: bool,
        schema: SchemaId,
    ) -> Result<Property, DefinitionError> {
        let class_name = self.graph.schema_entry(schema).identity.class_name.clone();
        self.process_schema(&scope.with_class(&class_name), schema, node)?;
        let schema = self.finalize_schema(schema);
        self.object_property_value(name, schema, required)
    }

    /// A property instantiating `schema`.
    pub(crate) fn object_property(
        &mut self,
        name: &str,
        schema: SchemaId,
        required: bool,
    ) -> Result<PropertyId, DefinitionError> {
        let property = self.object_property_value(name, schema, required)?;
        Ok(self.graph.add_property(property))
    }

    fn object_property_value(
        &self,
        name: &str,
        schema: SchemaId,
        required: bool,
    ) -> Result<Property, DefinitionError> {
        let class_name = self.graph.schema(schema).identity.class_name.clone();
        let mut property = Property::new(name, required)?;
        property.set_type(PropertyType::new(class_name));
        property.nested_schema = Some(schema);
        property.add_decorator(Decorator::ObjectInstantiation { schema });
        if required {
            property.add_validator(Validator::new(Check::Required));
        }
        property.add_validator(Validator::new(Check::Type {
            kinds: vec![JsonKind::Object],
            implicit_null: self.allows_implicit_null(required),
        }));
        property.add_validator(Validator::new(Check::NestedObject { schema }));
        Ok(property)
    }
}
