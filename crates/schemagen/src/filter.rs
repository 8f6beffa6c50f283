//! Registry of value filters usable through the `filter` keyword.

use crate::model::JsonKind;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Transforms a value before the remaining checks see it. Receives the
/// options given in the schema; an `Err` fails validation with the message.
#[derive(Clone)]
pub struct FilterFn(Arc<dyn Fn(Value, &Value) -> Result<Value, String> + Send + Sync>);

impl FilterFn {
    pub fn apply(&self, value: Value, options: &Value) -> Result<Value, String> {
        (self.0)(value, options)
    }
}

impl fmt::Debug for FilterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FilterFn(..)")
    }
}

/// A named filter and the JSON kinds it accepts.
#[derive(Clone)]
pub struct FilterDefinition {
    name: String,
    accepts: Vec<JsonKind>,
    apply: FilterFn,
}

impl FilterDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accepts(&self) -> &[JsonKind] {
        &self.accepts
    }

    pub fn function(&self) -> FilterFn {
        self.apply.clone()
    }
}

impl fmt::Debug for FilterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDefinition")
            .field("name", &self.name)
            .field("accepts", &self.accepts)
            .finish_non_exhaustive()
    }
}

/// Filters available to one generator run.
///
/// Built-in filters are present on [`FilterRegistry::default`]; custom
/// filters are registered on the instance handed to the generator.
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    filters: Vec<FilterDefinition>,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("trim", [JsonKind::String], |value, _| {
            Ok(match value {
                Value::String(s) => Value::String(s.trim().to_string()),
                other => other,
            })
        });
        registry.register("notEmpty", [JsonKind::Array], |value, _| {
            Ok(match value {
                Value::Array(items) => {
                    Value::Array(items.into_iter().filter(|item| !is_empty(item)).collect())
                }
                other => other,
            })
        });
        registry
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl FilterRegistry {
    /// A registry without the built-in filters.
    pub fn empty() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Register a filter. A filter with the same name is replaced.
    pub fn register<F>(
        &mut self,
        name: &str,
        accepts: impl IntoIterator<Item = JsonKind>,
        apply: F,
    ) where
        F: Fn(Value, &Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.filters.retain(|filter| filter.name != name);
        self.filters.push(FilterDefinition {
            name: name.to_string(),
            accepts: accepts.into_iter().collect(),
            apply: FilterFn(Arc::new(apply)),
        });
    }

    pub fn get(&self, name: &str) -> Option<&FilterDefinition> {
        self.filters.iter().find(|filter| filter.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|filter| filter.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtins_are_registered() {
        let registry = FilterRegistry::default();
        assert_eq!(registry.names(), vec!["trim", "notEmpty"]);
        assert!(FilterRegistry::empty().get("trim").is_none());
    }

    #[test]
    fn trim_and_not_empty() {
        let registry = FilterRegistry::default();
        let trim = registry.get("trim").unwrap().function();
        assert_eq!(trim.apply(json!("  hi "), &Value::Null).unwrap(), json!("hi"));

        let not_empty = registry.get("notEmpty").unwrap().function();
        assert_eq!(
            not_empty.apply(json!(["a", "", null, [], {}, 0]), &Value::Null).unwrap(),
            json!(["a", 0])
        );
    }

    #[test]
    fn register_replaces_by_name() {
        let mut registry = FilterRegistry::default();
        registry.register("trim", [JsonKind::String], |_, _| Ok(json!("x")));
        assert_eq!(registry.names().len(), 2);
        let trim = registry.get("trim").unwrap().function();
        assert_eq!(trim.apply(json!(" a "), &Value::Null).unwrap(), json!("x"));
    }
}
