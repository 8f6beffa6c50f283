use super::TypeDescriptor;
use crate::composition::without_compositions;
use crate::error::{DefinitionError, malformed};
use crate::generator::{Generator, Scope};
use crate::model::{JsonKind, Nullability, Property, PropertyId, PropertyType};
use crate::validator::{Check, Validator};
use serde_json::Value;

impl Generator {
    /// `"type": [...]`: run every member's builder, merge their checks, and
    /// replace the per-member presence and type checks with a single combined
    /// type check.
    ///
    /// Member checks are guarded by the value's kind at runtime, so a string
    /// constraint never fires on a number of the same union. Compositions
    /// belong to the union; the object member's class is built without them.
    pub(super) fn build_multi_type(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
        required: bool,
        types: &[Value],
    ) -> Result<PropertyId, DefinitionError> {
        let mut kinds: Vec<JsonKind> = Vec::with_capacity(types.len());
        for ty in types {
            let type_name = ty
                .as_str()
                .ok_or_else(|| malformed(name, "type entries must be strings"))?;
            let kind = JsonKind::from_keyword(type_name).ok_or_else(|| {
                DefinitionError::UnsupportedType {
                    property: name.to_string(),
                    type_name: type_name.to_string(),
                }
            })?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            return Err(malformed(name, "type must not be an empty list"));
        }

        let mut property = Property::new(name, required)?;
        let mut type_names: Vec<String> = Vec::new();
        for &kind in &kinds {
            if kind == JsonKind::Null {
                continue;
            }
            let member = if kind == JsonKind::Object {
                self.object_member(scope, name, &without_compositions(node), required)?
            } else {
                self.typed_core(scope, name, node, required, TypeDescriptor::for_kind(kind))?
            };
            if let Some(ty) = member.property_type() {
                type_names.extend(ty.names().iter().cloned());
            }
            if member.nested_schema.is_some() {
                property.nested_schema = member.nested_schema;
                property.decorators.extend(member.decorators.iter().cloned());
            }
            merge_member_checks(&mut property, &member);
        }

        let nullable = kinds.contains(&JsonKind::Null);
        let nullability = if nullable {
            Nullability::Nullable
        } else {
            Nullability::Unknown
        };
        if type_names.is_empty() {
            type_names.push(JsonKind::Null.keyword().to_string());
        }
        property.set_type(PropertyType::union(type_names).with_nullability(nullability));

        if required {
            property.add_validator(Validator::new(Check::Required));
        }
        property.add_validator(Validator::new(Check::Type {
            kinds,
            implicit_null: self.allows_implicit_null(required) && !nullable,
        }));

        self.apply_common(&mut property, node, required)?;
        self.apply_compositions(scope, &mut property, node, required)?;
        Ok(self.graph.add_property(property))
    }
}

/// Copy a member's checks except presence and type, skipping checks the
/// property already has.
fn merge_member_checks(property: &mut Property, member: &Property) {
    for validator in member.validators().iter() {
        if matches!(validator.check(), Check::Required | Check::Type { .. }) {
            continue;
        }
        let duplicate = property.validators().iter().any(|existing| {
            existing.priority() == validator.priority()
                && existing.check().fingerprint() == validator.check().fingerprint()
                && existing.check().children() == validator.check().children()
        });
        if !duplicate {
            property.add_validator(validator.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{describe, process};
    use crate::model::Nullability;
    use crate::validator::Check;
    use serde_json::json;

    #[test]
    fn nullable_string() {
        let (generator, schema) = process(json!({
            "type": "object",
            "properties": { "nick": { "type": ["string", "null"], "maxLength": 8 } },
            "required": ["nick"]
        }));
        let graph = generator.graph();
        let nick = graph.property(graph.find_property(schema, "nick").unwrap());
        let ty = nick.property_type().unwrap();
        assert_eq!(ty.to_string(), "string|null");
        assert_eq!(ty.nullability(), Nullability::Nullable);
        assert_eq!(
            describe(&generator, schema, "nick"),
            vec!["1 value is present", "2 type is string|null", "99 length <= 8"]
        );
    }

    #[test]
    fn member_checks_are_merged_once() {
        let (generator, schema) = process(json!({
            "type": "object",
            "properties": {
                "amount": { "type": ["integer", "number", "string"], "minimum": 1, "minLength": 1 }
            }
        }));
        assert_eq!(
            describe(&generator, schema, "amount"),
            vec![
                "2 type is integer|number|string (implicit null)",
                "99 value >= 1",
                "99 length >= 1",
            ]
        );
    }

    #[test]
    fn union_compositions_are_attached_once() {
        let (generator, schema) = process(json!({
            "type": "object",
            "properties": {
                "v": {
                    "type": ["object", "string"],
                    "anyOf": [
                        { "type": "object", "required": ["a"] },
                        { "type": "string", "minLength": 3 }
                    ]
                }
            }
        }));
        let graph = generator.graph();
        let v = graph.property(graph.find_property(schema, "v").unwrap());
        let nested = v.nested_schema().unwrap();
        assert!(graph.schema(nested).base_validators().is_empty());
        assert!(graph
            .schemas()
            .all(|(_, schema)| !schema.identity().class_name.contains("_Merged_")));
        assert_eq!(
            v.validators()
                .iter()
                .filter(|validator| matches!(validator.check(), Check::Composition { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn object_member_keeps_nested_schema() {
        let (generator, schema) = process(json!({
            "type": "object",
            "properties": {
                "owner": {
                    "type": ["object", "string"],
                    "properties": { "name": { "type": "string" } }
                }
            }
        }));
        let graph = generator.graph();
        let owner = graph.property(graph.find_property(schema, "owner").unwrap());
        let nested = owner.nested_schema().unwrap();
        assert!(owner.property_type().unwrap().contains(&graph.schema(nested).identity().class_name));
        assert!(owner.property_type().unwrap().contains("string"));
    }
}
