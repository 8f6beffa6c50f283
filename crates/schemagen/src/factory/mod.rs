//! Property builders.
//!
//! Every property kind runs through one pipeline: presence and type checks,
//! the type's own steps from its [`TypeDescriptor`], then the steps shared by
//! all kinds (enum, const, filter, default, compositions). Objects, unions
//! and untyped nodes have dedicated builders that reuse the same steps.

mod array;
mod common;
mod multi_type;
mod numeric;
mod object;
mod scalar;
mod string;

pub(crate) use string::compile_pattern;

use crate::error::{DefinitionError, malformed};
use crate::generator::{Generator, Scope};
use crate::model::{JsonKind, Nullability, Property, PropertyId, PropertyType};
use crate::validator::{Check, Validator};
use serde_json::{Number, Value, json};

/// A type-specific builder step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Format,
    Pattern,
    Length,
    Range,
    MultipleOf,
    Array,
}

/// The kind a builder produces and the steps specific to it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TypeDescriptor {
    kind: JsonKind,
    steps: &'static [Step],
}

impl TypeDescriptor {
    const STRING: Self = Self {
        kind: JsonKind::String,
        steps: &[Step::Format, Step::Pattern, Step::Length],
    };
    const INTEGER: Self = Self {
        kind: JsonKind::Integer,
        steps: &[Step::Range, Step::MultipleOf],
    };
    const NUMBER: Self = Self {
        kind: JsonKind::Number,
        steps: &[Step::Range, Step::MultipleOf],
    };
    const BOOLEAN: Self = Self {
        kind: JsonKind::Boolean,
        steps: &[],
    };
    const NULL: Self = Self {
        kind: JsonKind::Null,
        steps: &[],
    };
    const ARRAY: Self = Self {
        kind: JsonKind::Array,
        steps: &[Step::Array],
    };
    const OBJECT: Self = Self {
        kind: JsonKind::Object,
        steps: &[],
    };

    pub fn for_kind(kind: JsonKind) -> Self {
        match kind {
            JsonKind::String => Self::STRING,
            JsonKind::Integer => Self::INTEGER,
            JsonKind::Number => Self::NUMBER,
            JsonKind::Boolean => Self::BOOLEAN,
            JsonKind::Null => Self::NULL,
            JsonKind::Array => Self::ARRAY,
            JsonKind::Object => Self::OBJECT,
        }
    }
}

/// Whether a node describes an object: `"type": "object"`, or no type but
/// object keywords.
pub(crate) fn is_object_node(node: &Value) -> bool {
    match node.get("type") {
        Some(Value::String(ty)) => ty == "object",
        Some(_) => false,
        None => {
            node.get("properties").is_some()
                || node.get("patternProperties").is_some()
                || node.get("additionalProperties").is_some()
        }
    }
}

/// Boolean schemas become their object equivalents.
fn normalize_node(name: &str, node: &Value) -> Result<Value, DefinitionError> {
    match node {
        Value::Object(_) => Ok(node.clone()),
        Value::Bool(true) => Ok(json!({})),
        Value::Bool(false) => Ok(json!({ "not": {} })),
        other => Err(malformed(
            name,
            format!("a schema must be an object or a boolean, got {}", other),
        )),
    }
}

/// A non-negative integer keyword such as `minLength`.
fn count_keyword(name: &str, node: &Value, keyword: &str) -> Result<Option<usize>, DefinitionError> {
    match node.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| malformed(name, format!("{} must be a non-negative integer", keyword))),
    }
}

/// A numeric keyword such as `minimum`.
fn number_keyword(name: &str, node: &Value, keyword: &str) -> Result<Option<Number>, DefinitionError> {
    match node.get(keyword) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(_) => Err(malformed(name, format!("{} must be a number", keyword))),
    }
}

fn bool_keyword(name: &str, node: &Value, keyword: &str) -> Result<bool, DefinitionError> {
    match node.get(keyword) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(malformed(name, format!("{} must be a boolean", keyword))),
    }
}

impl Generator {
    /// Build the property `name` described by `node`.
    pub(crate) fn build_property(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
        required: bool,
    ) -> Result<PropertyId, DefinitionError> {
        let node = normalize_node(name, node)?;

        if let Some(reference) = node.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| malformed(name, "$ref must be a string"))?;
            let id = self.resolve_reference(scope, name, reference, required)?;
            if let Some(description) = node.get("description").and_then(Value::as_str) {
                self.graph.property_mut(id).description = Some(description.to_string());
            }
            return Ok(id);
        }

        match node.get("type") {
            Some(Value::String(type_name)) => {
                let kind = JsonKind::from_keyword(type_name).ok_or_else(|| {
                    DefinitionError::UnsupportedType {
                        property: name.to_string(),
                        type_name: type_name.clone(),
                    }
                })?;
                if kind == JsonKind::Object {
                    self.build_object(scope, name, &node, required, false)
                } else {
                    self.build_typed(scope, name, &node, required, TypeDescriptor::for_kind(kind))
                }
            }
            Some(Value::Array(types)) => self.build_multi_type(scope, name, &node, required, types),
            Some(other) => Err(malformed(
                name,
                format!("type must be a string or an array, got {}", other),
            )),
            None if is_object_node(&node) => self.build_object(scope, name, &node, required, false),
            None if node.get("const").is_some() => self.build_const(scope, name, &node, required),
            None if node.get("enum").is_some() => self.build_untyped_enum(scope, name, &node, required),
            None => self.build_any(scope, name, &node, required),
        }
    }

    /// Build a property and strip its presence check, for values living in a
    /// nested context (array items, additional properties, ...).
    pub(crate) fn build_nested_property(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
    ) -> Result<PropertyId, DefinitionError> {
        let id = self.build_property(scope, name, node, true)?;
        self.graph.property_mut(id).relax_required();
        Ok(id)
    }

    /// Whether an optional property accepts an explicit null.
    pub(crate) fn allows_implicit_null(&self, required: bool) -> bool {
        self.config.implicit_null() && !required
    }

    fn build_typed(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
        required: bool,
        descriptor: TypeDescriptor,
    ) -> Result<PropertyId, DefinitionError> {
        let mut property = self.typed_core(scope, name, node, required, descriptor)?;
        self.apply_common(&mut property, node, required)?;
        self.apply_compositions(scope, &mut property, node, required)?;
        Ok(self.graph.add_property(property))
    }

    /// Presence check, type check and the descriptor's own steps.
    fn typed_core(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
        required: bool,
        descriptor: TypeDescriptor,
    ) -> Result<Property, DefinitionError> {
        let mut property = Property::new(name, required)?;
        let mut ty = PropertyType::new(descriptor.kind.keyword());
        if descriptor.kind == JsonKind::Null {
            ty = ty.with_nullability(Nullability::Nullable);
        }
        property.set_type(ty);

        if required {
            property.add_validator(Validator::new(Check::Required));
        }
        property.add_validator(Validator::new(Check::Type {
            kinds: vec![descriptor.kind],
            implicit_null: self.allows_implicit_null(required) && descriptor.kind != JsonKind::Null,
        }));

        for step in descriptor.steps {
            match step {
                Step::Format => string::apply_format(&property, node)?,
                Step::Pattern => string::apply_pattern(&mut property, node)?,
                Step::Length => string::apply_length(&mut property, node)?,
                Step::Range => numeric::apply_range(&mut property, node)?,
                Step::MultipleOf => numeric::apply_multiple_of(&mut property, node)?,
                Step::Array => self.apply_array(scope, &mut property, node)?,
            }
        }
        Ok(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::DocumentSource;
    use crate::model::SchemaId;

    pub(crate) fn process(document: Value) -> (Generator, SchemaId) {
        let mut generator = Generator::default();
        let schema = generator
            .process_document(&DocumentSource::new("test.json", "App", "Test"), document)
            .unwrap();
        (generator, schema)
    }

    pub(crate) fn process_err(document: Value) -> DefinitionError {
        Generator::default()
            .process_document(&DocumentSource::new("test.json", "App", "Test"), document)
            .unwrap_err()
    }

    pub(crate) fn describe(generator: &Generator, schema: SchemaId, name: &str) -> Vec<String> {
        let graph = generator.graph();
        let id = graph.find_property(schema, name).unwrap();
        graph
            .property(id)
            .validators()
            .iter()
            .map(|v| format!("{} {}", v.priority(), v.describe()))
            .collect()
    }

    #[test]
    fn object_node_inference() {
        assert!(is_object_node(&json!({"type": "object"})));
        assert!(is_object_node(&json!({"properties": {}})));
        assert!(is_object_node(&json!({"additionalProperties": false})));
        assert!(!is_object_node(&json!({"type": ["object", "null"]})));
        assert!(!is_object_node(&json!({"enum": [1]})));
    }

    #[test]
    fn required_string_pipeline() {
        let (generator, schema) = process(json!({
            "type": "object",
            "properties": { "name": { "type": "string", "minLength": 2, "pattern": "^[a-z]+$" } },
            "required": ["name"]
        }));
        assert_eq!(
            describe(&generator, schema, "name"),
            vec![
                "1 value is present",
                "2 type is string",
                "99 value matches /^[a-z]+$/",
                "99 length >= 2",
            ]
        );
    }

    #[test]
    fn optional_property_accepts_implicit_null() {
        let (generator, schema) = process(json!({
            "type": "object",
            "properties": { "age": { "type": "integer" } }
        }));
        assert_eq!(
            describe(&generator, schema, "age"),
            vec!["2 type is integer (implicit null)"]
        );
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let err = process_err(json!({
            "type": "object",
            "properties": { "a": { "type": "date" } }
        }));
        assert!(matches!(err, DefinitionError::UnsupportedType { type_name, .. } if type_name == "date"));
    }

    #[test]
    fn boolean_schemas() {
        let (generator, schema) = process(json!({
            "type": "object",
            "properties": { "anything": true, "nothing": false }
        }));
        assert!(describe(&generator, schema, "anything").is_empty());
        assert_eq!(
            describe(&generator, schema, "nothing"),
            vec!["2 null is absent (implicit null)", "99 not of 1 branches"]
        );
    }
}
