//! Steps shared by every property kind.

use crate::error::{DefinitionError, malformed};
use crate::generator::Generator;
use crate::model::{JsonKind, Nullability, Property};
use crate::validator::{Check, Validator};
use serde_json::{Map, Value};

/// Kinds declared by the property's type check, if it has one.
pub(super) fn declared_kinds(property: &Property) -> Option<Vec<JsonKind>> {
    property
        .validators()
        .find(|check| matches!(check, Check::Type { .. }))
        .and_then(|validator| match validator.check() {
            Check::Type { kinds, .. } => Some(kinds.clone()),
            _ => None,
        })
}

/// Enum values without duplicates, in declaration order.
pub(super) fn enum_values(property: &str, node: &Value) -> Result<Option<Vec<Value>>, DefinitionError> {
    let Some(values) = node.get("enum") else {
        return Ok(None);
    };
    let values = values
        .as_array()
        .ok_or_else(|| malformed(property, "enum must be an array"))?;
    if values.is_empty() {
        return Err(DefinitionError::EmptyEnum {
            property: property.to_string(),
        });
    }
    let mut unique: Vec<Value> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(value) {
            unique.push(value.clone());
        }
    }
    Ok(Some(unique))
}

impl Generator {
    /// Description, enum, const, filters, default, and the strictness of
    /// typed enums.
    pub(super) fn apply_common(
        &self,
        property: &mut Property,
        node: &Value,
        required: bool,
    ) -> Result<(), DefinitionError> {
        if let Some(description) = node.get("description").and_then(Value::as_str) {
            property.description = Some(description.to_string());
        }

        if let Some(values) = enum_values(property.name(), node)? {
            let implicit_null =
                self.allows_implicit_null(required) && !values.contains(&Value::Null);
            property.add_validator(Validator::new(Check::Enum {
                values,
                implicit_null,
            }));
            // A typed enum keeps its presence check even when optional.
            if node.get("type").is_some() {
                property.strict = true;
                property.stamp_required(required, self.config.implicit_null());
            }
        }

        if let Some(value) = node.get("const") {
            property.add_validator(Validator::new(Check::Const {
                value: value.clone(),
            }));
        }

        self.apply_filters(property, node)?;
        apply_default(property, node)?;
        Ok(())
    }

    fn apply_filters(&self, property: &mut Property, node: &Value) -> Result<(), DefinitionError> {
        let Some(spec) = node.get("filter") else {
            return Ok(());
        };
        let entries: Vec<&Value> = match spec {
            Value::Array(entries) => entries.iter().collect(),
            other => vec![other],
        };

        for entry in entries {
            let (filter_name, options) = match entry {
                Value::String(name) => (name.as_str(), Value::Null),
                Value::Object(map) => {
                    let name = map.get("filter").and_then(Value::as_str).ok_or_else(|| {
                        malformed(property.name(), "filter object needs a filter name")
                    })?;
                    let options: Map<String, Value> = map
                        .iter()
                        .filter(|(key, _)| key.as_str() != "filter")
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect();
                    let options = if options.is_empty() {
                        Value::Null
                    } else {
                        Value::Object(options)
                    };
                    (name, options)
                }
                _ => return Err(malformed(property.name(), "filter must be a name or an object")),
            };

            let definition = self.config.filters.get(filter_name).ok_or_else(|| {
                DefinitionError::UnknownFilter {
                    property: property.name().to_string(),
                    filter: filter_name.to_string(),
                }
            })?;

            if let Some(kinds) = declared_kinds(property) {
                let compatible = kinds
                    .iter()
                    .any(|kind| definition.accepts().iter().any(|accepted| accepted.includes(*kind)));
                if !compatible {
                    return Err(DefinitionError::IncompatibleFilter {
                        property: property.name().to_string(),
                        filter: filter_name.to_string(),
                        type_name: property
                            .property_type()
                            .map(ToString::to_string)
                            .unwrap_or_default(),
                    });
                }
            }

            property.add_validator(Validator::new(Check::Filter {
                name: filter_name.to_string(),
                options,
                accepts: definition.accepts().to_vec(),
                apply: definition.function(),
            }));
        }
        Ok(())
    }
}

/// Record `default`, rejecting values the declared type cannot hold.
fn apply_default(property: &mut Property, node: &Value) -> Result<(), DefinitionError> {
    let Some(default) = node.get("default") else {
        return Ok(());
    };
    if let Some(kinds) = declared_kinds(property) {
        let nullable = property
            .property_type()
            .is_some_and(|ty| ty.nullability() == Nullability::Nullable);
        let fits = kinds.iter().any(|kind| kind.accepts(default)) || (default.is_null() && nullable);
        if !fits {
            let expected: Vec<&str> = kinds.iter().map(|kind| kind.keyword()).collect();
            return Err(DefinitionError::InvalidDefault {
                property: property.name().to_string(),
                expected: expected.join("|"),
            });
        }
    }
    property.default = Some(default.clone());
    Ok(())
}
