//! Turns an object node into the properties and object-wide validators of a
//! schema.

use crate::error::{DefinitionError, malformed};
use crate::factory::compile_pattern;
use crate::generator::{Generator, Scope};
use crate::model::SchemaId;
use crate::validator::{Check, Validator};
use serde_json::{Map, Value, json};

/// Names listed in `required`, in order.
fn required_names(class: &str, node: &Value) -> Result<Vec<String>, DefinitionError> {
    match node.get("required") {
        None => Ok(Vec::new()),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| {
                name.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| malformed(class, "required entries must be strings"))
            })
            .collect(),
        Some(_) => Err(malformed(class, "required must be an array")),
    }
}

fn object_keyword<'a>(
    class: &str,
    node: &'a Value,
    keyword: &str,
) -> Result<Option<&'a Map<String, Value>>, DefinitionError> {
    match node.get(keyword) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(malformed(class, format!("{} must be an object", keyword))),
    }
}

/// Add `"type": "object"` to object schemas that leave it implicit.
pub(crate) fn with_object_type(node: &Value) -> Value {
    match node {
        Value::Object(map) if !map.contains_key("type") => {
            let mut map = map.clone();
            map.insert("type".to_string(), json!("object"));
            Value::Object(map)
        }
        Value::Bool(false) => json!({ "type": "object", "not": {} }),
        Value::Bool(true) => json!({ "type": "object" }),
        other => other.clone(),
    }
}

impl Generator {
    /// Fill `schema` from an object node. The scope's class name is the
    /// schema's own.
    pub(crate) fn process_schema(
        &mut self,
        scope: &Scope,
        schema: SchemaId,
        node: &Value,
    ) -> Result<(), DefinitionError> {
        let class = scope.class_name.clone();
        tracing::trace!(class = %class, "processing object schema");

        if let Some(description) = node.get("description").and_then(Value::as_str) {
            self.graph.schema_mut(schema).description = Some(description.to_string());
        }

        let required = required_names(&class, node)?;
        let empty = Map::new();
        let properties = object_keyword(&class, node, "properties")?.unwrap_or(&empty);
        for (name, property_node) in properties {
            let id = self.build_property(scope, name, property_node, required.contains(name))?;
            self.graph.schema_mut(schema).properties.push(id);
        }
        // Required names without a declaration become untyped required properties.
        for name in required.iter().filter(|name| !properties.contains_key(*name)) {
            let id = self.build_property(scope, name, &json!({}), true)?;
            self.graph.schema_mut(schema).properties.push(id);
        }

        self.apply_additional_properties(scope, schema, node)?;
        self.apply_property_names(scope, schema, node)?;
        self.apply_property_counts(schema, node)?;
        self.apply_dependencies(scope, schema, node)?;
        self.apply_object_compositions(scope, schema, node)?;
        Ok(())
    }

    fn add_base_validator(&mut self, schema: SchemaId, validator: Validator) {
        self.graph.schema_mut(schema).base_validators.add(validator);
    }

    /// `additionalProperties` and `patternProperties`.
    fn apply_additional_properties(
        &mut self,
        scope: &Scope,
        schema: SchemaId,
        node: &Value,
    ) -> Result<(), DefinitionError> {
        let class = scope.class_name.clone();
        let known: Vec<String> = self
            .graph
            .schema_entry(schema)
            .properties
            .iter()
            .map(|&id| self.graph.property(id).name.clone())
            .collect();

        let mut patterns = Vec::new();
        let mut keys: Vec<String> = Vec::new();
        if let Some(pattern_properties) = object_keyword(&class, node, "patternProperties")? {
            for (source, property_node) in pattern_properties {
                let pattern = compile_pattern(&class, source)?;
                let key = property_node
                    .get("key")
                    .and_then(Value::as_str)
                    .unwrap_or(source)
                    .to_string();
                if keys.contains(&key) {
                    return Err(DefinitionError::DuplicatePatternKey { class, key });
                }
                keys.push(key.clone());

                let property = self.build_nested_property(
                    scope,
                    &format!("pattern property {}", source),
                    property_node,
                )?;
                self.add_base_validator(
                    schema,
                    Validator::new(Check::PatternProperty {
                        class: class.clone(),
                        pattern: pattern.clone(),
                        key,
                        property,
                    }),
                );
                patterns.push(pattern);
            }
        }

        match node.get("additionalProperties") {
            None | Some(Value::Bool(true)) => {}
            Some(Value::Bool(false)) => self.add_base_validator(
                schema,
                Validator::new(Check::AdditionalPropertiesRejected {
                    class,
                    known,
                    patterns,
                }),
            ),
            Some(additional @ Value::Object(_)) => {
                let property = self.build_nested_property(scope, "additional property", additional)?;
                self.add_base_validator(
                    schema,
                    Validator::new(Check::AdditionalProperties {
                        class,
                        known,
                        patterns,
                        property,
                    }),
                );
            }
            Some(_) => {
                return Err(malformed(
                    &class,
                    "additionalProperties must be a boolean or a schema",
                ));
            }
        }
        Ok(())
    }

    fn apply_property_names(
        &mut self,
        scope: &Scope,
        schema: SchemaId,
        node: &Value,
    ) -> Result<(), DefinitionError> {
        let Some(names) = node.get("propertyNames") else {
            return Ok(());
        };
        let property = self.build_nested_property(scope, "property name", names)?;
        self.add_base_validator(
            schema,
            Validator::new(Check::PropertyNames {
                class: scope.class_name.clone(),
                property,
            }),
        );
        Ok(())
    }

    fn apply_property_counts(&mut self, schema: SchemaId, node: &Value) -> Result<(), DefinitionError> {
        let class = self.graph.schema_entry(schema).identity.class_name.clone();
        for keyword in ["minProperties", "maxProperties"] {
            let Some(value) = node.get(keyword) else {
                continue;
            };
            let count = value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| malformed(&class, format!("{} must be a non-negative integer", keyword)))?;
            let check = if keyword == "minProperties" {
                Check::MinProperties(count)
            } else {
                Check::MaxProperties(count)
            };
            self.add_base_validator(schema, Validator::new(check));
        }
        Ok(())
    }

    /// `dependencies`, and its split forms `dependentRequired` and
    /// `dependentSchemas`.
    fn apply_dependencies(
        &mut self,
        scope: &Scope,
        schema: SchemaId,
        node: &Value,
    ) -> Result<(), DefinitionError> {
        let class = scope.class_name.clone();
        for keyword in ["dependencies", "dependentRequired", "dependentSchemas"] {
            let Some(dependencies) = object_keyword(&class, node, keyword)? else {
                continue;
            };
            for (trigger, dependency) in dependencies {
                match dependency {
                    Value::Array(names) => {
                        let dependants = names
                            .iter()
                            .map(|name| {
                                name.as_str().map(str::to_string).ok_or_else(|| {
                                    malformed(&class, "property dependencies must be strings")
                                })
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        self.add_base_validator(
                            schema,
                            Validator::new(Check::PropertyDependency {
                                trigger: trigger.clone(),
                                dependants,
                            }),
                        );
                    }
                    Value::Bool(true) => {}
                    Value::Object(_) | Value::Bool(false) => {
                        let property = self.build_nested_property(
                            scope,
                            &format!("dependency of {}", trigger),
                            &with_object_type(dependency),
                        )?;
                        self.add_base_validator(
                            schema,
                            Validator::new(Check::SchemaDependency {
                                trigger: trigger.clone(),
                                property,
                            }),
                        );
                    }
                    _ => {
                        return Err(malformed(
                            &class,
                            format!("invalid dependency for {}", trigger),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
