//! Builders for nodes without a declared type.

use super::common::enum_values;
use crate::error::DefinitionError;
use crate::generator::{Generator, Scope};
use crate::model::{Decorator, JsonKind, Property, PropertyId, PropertyType};
use crate::validator::{Check, Validator};
use serde_json::Value;

/// The narrowest kind covering every value, if there is one. Integers and
/// floats together make `number`.
fn common_kind(values: &[Value]) -> Option<JsonKind> {
    let mut kinds = values.iter().map(JsonKind::of);
    let first = kinds.next()?;
    kinds.try_fold(first, |acc, kind| match (acc, kind) {
        _ if acc == kind => Some(acc),
        (JsonKind::Number, JsonKind::Integer) | (JsonKind::Integer, JsonKind::Number) => {
            Some(JsonKind::Number)
        }
        _ => None,
    })
}

impl Generator {
    /// An enum without `type`: the type is inferred from the values and no
    /// type check is generated.
    pub(super) fn build_untyped_enum(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
        required: bool,
    ) -> Result<PropertyId, DefinitionError> {
        let mut property = Property::new(name, required)?;
        if required {
            property.add_validator(Validator::new(Check::Required));
        }

        if let Some(values) = enum_values(name, node)? {
            let non_null: Vec<Value> = values.iter().filter(|v| !v.is_null()).cloned().collect();
            if let Some(kind) = common_kind(&non_null) {
                property.set_type(PropertyType::new(kind.keyword()));
            } else {
                let mut names: Vec<String> = Vec::new();
                for value in &non_null {
                    let keyword = JsonKind::of(value).keyword().to_string();
                    if !names.contains(&keyword) {
                        names.push(keyword);
                    }
                }
                property.add_decorator(Decorator::TypeHint { names });
            }
        }

        self.apply_common(&mut property, node, required)?;
        self.apply_compositions(scope, &mut property, node, required)?;
        Ok(self.graph.add_property(property))
    }

    /// A `const` without `type`.
    pub(super) fn build_const(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
        required: bool,
    ) -> Result<PropertyId, DefinitionError> {
        let mut property = Property::new(name, required)?;
        if required {
            property.add_validator(Validator::new(Check::Required));
        }
        if let Some(value) = node.get("const") {
            property.set_type(PropertyType::new(JsonKind::of(value).keyword()));
        }
        self.apply_common(&mut property, node, required)?;
        self.apply_compositions(scope, &mut property, node, required)?;
        Ok(self.graph.add_property(property))
    }

    /// A node with neither type nor type-implying keywords. Only the shared
    /// steps apply.
    pub(super) fn build_any(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
        required: bool,
    ) -> Result<PropertyId, DefinitionError> {
        let mut property = Property::new(name, required)?;
        if required {
            property.add_validator(Validator::new(Check::Required));
        }
        self.apply_common(&mut property, node, required)?;
        self.apply_compositions(scope, &mut property, node, required)?;
        Ok(self.graph.add_property(property))
    }
}
