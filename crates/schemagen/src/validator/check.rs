//! Check expressions carried by validators.

use super::error_kind::ErrorKind;
use super::{PRIORITY_DEFAULT, PRIORITY_ENUM, PRIORITY_FILTER, PRIORITY_REQUIRED, PRIORITY_TYPE};
use crate::filter::FilterFn;
use crate::model::{JsonKind, PropertyId, SchemaId};
use serde_json::{Map, Number, Value, json};
use std::fmt;
use std::sync::Arc;

/// A compiled regular expression that remembers its source.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: regex::Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: source.to_string(),
            regex: regex::Regex::new(source)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.source)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A custom predicate owned by the validator that runs it.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    pub fn test(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Boolean combination keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum CompositionKind {
    AllOf,
    AnyOf,
    OneOf,
    Not,
}

impl CompositionKind {
    pub fn keyword(self) -> &'static str {
        match self {
            CompositionKind::AllOf => "allOf",
            CompositionKind::AnyOf => "anyOf",
            CompositionKind::OneOf => "oneOf",
            CompositionKind::Not => "not",
        }
    }

    /// Text used in the "Requires to match ..." message.
    pub fn requirement(self) -> &'static str {
        match self {
            CompositionKind::AllOf => "all composition elements",
            CompositionKind::AnyOf => "at least one composition element",
            CompositionKind::OneOf => "one composition element",
            CompositionKind::Not => "none of the composition elements",
        }
    }

    /// Whether `matched` passing branches out of `total` satisfy the keyword.
    /// An empty branch list never passes.
    pub fn is_satisfied(self, matched: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }
        match self {
            CompositionKind::AllOf => matched == total,
            CompositionKind::AnyOf => matched >= 1,
            CompositionKind::OneOf => matched == 1,
            CompositionKind::Not => matched == 0,
        }
    }
}

/// One branch of a composition: a view onto a property built elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionBranch {
    pub property: PropertyId,
    /// Names of sibling properties of the enclosing object this branch populates.
    pub affected: Vec<String>,
}

/// A runtime check and everything needed to describe it.
#[derive(Debug, Clone)]
pub enum Check {
    Required,
    Type {
        kinds: Vec<JsonKind>,
        implicit_null: bool,
    },
    Enum {
        values: Vec<Value>,
        implicit_null: bool,
    },
    /// Lets an explicit `null` settle like an absent value on a composed
    /// property that has no type, enum or const check of its own.
    ImplicitNull {
        enabled: bool,
    },
    Const {
        value: Value,
    },
    Minimum {
        limit: Number,
        exclusive: bool,
    },
    Maximum {
        limit: Number,
        exclusive: bool,
    },
    MultipleOf {
        divisor: Number,
    },
    Pattern(Pattern),
    MinLength(usize),
    MaxLength(usize),
    MinItems(usize),
    MaxItems(usize),
    UniqueItems,
    Items {
        item: PropertyId,
    },
    Tuple {
        items: Vec<PropertyId>,
    },
    AdditionalItemsRejected {
        expected: usize,
    },
    AdditionalItems {
        offset: usize,
        item: PropertyId,
    },
    Contains {
        item: PropertyId,
    },
    NestedObject {
        schema: SchemaId,
    },
    AdditionalPropertiesRejected {
        class: String,
        known: Vec<String>,
        patterns: Vec<Pattern>,
    },
    AdditionalProperties {
        class: String,
        known: Vec<String>,
        patterns: Vec<Pattern>,
        property: PropertyId,
    },
    PatternProperty {
        class: String,
        pattern: Pattern,
        key: String,
        property: PropertyId,
    },
    PropertyNames {
        class: String,
        property: PropertyId,
    },
    MinProperties(usize),
    MaxProperties(usize),
    PropertyDependency {
        trigger: String,
        dependants: Vec<String>,
    },
    SchemaDependency {
        trigger: String,
        property: PropertyId,
    },
    Composition {
        kind: CompositionKind,
        branches: Vec<CompositionBranch>,
        object_level: bool,
    },
    Conditional {
        condition: PropertyId,
        then: Option<PropertyId>,
        otherwise: Option<PropertyId>,
        object_level: bool,
    },
    Filter {
        name: String,
        options: Value,
        accepts: Vec<JsonKind>,
        apply: FilterFn,
    },
    /// Placeholder for a reference whose definition is still being resolved.
    Deferred {
        reference: String,
    },
    Custom {
        description: String,
        predicate: Predicate,
    },
}

impl Check {
    pub fn default_priority(&self) -> u32 {
        match self {
            Check::Required => PRIORITY_REQUIRED,
            Check::Type { .. } | Check::ImplicitNull { .. } => PRIORITY_TYPE,
            Check::Enum { .. } | Check::Const { .. } => PRIORITY_ENUM,
            Check::Filter { .. } => PRIORITY_FILTER,
            _ => PRIORITY_DEFAULT,
        }
    }

    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Check::Required => ErrorKind::RequiredMissing,
            Check::Type { .. } | Check::ImplicitNull { .. } => ErrorKind::TypeMismatch,
            Check::Enum { .. } | Check::Const { .. } => ErrorKind::EnumViolation,
            Check::Minimum { .. }
            | Check::Maximum { .. }
            | Check::MultipleOf { .. }
            | Check::MinProperties(_)
            | Check::MaxProperties(_) => ErrorKind::RangeViolation,
            Check::Pattern(_) => ErrorKind::PatternMismatch,
            Check::MinLength(_) | Check::MaxLength(_) | Check::MinItems(_) | Check::MaxItems(_) => {
                ErrorKind::LengthViolation
            }
            Check::UniqueItems
            | Check::Items { .. }
            | Check::Tuple { .. }
            | Check::AdditionalItemsRejected { .. }
            | Check::AdditionalItems { .. }
            | Check::Contains { .. } => ErrorKind::ItemViolation,
            Check::NestedObject { .. } => ErrorKind::NestedObjectViolation,
            Check::AdditionalPropertiesRejected { .. }
            | Check::AdditionalProperties { .. }
            | Check::PatternProperty { .. } => ErrorKind::AdditionalPropertyViolation,
            Check::PropertyNames { .. } => ErrorKind::PropertyNameViolation,
            Check::PropertyDependency { .. } | Check::SchemaDependency { .. } => {
                ErrorKind::DependencyViolation
            }
            Check::Composition { .. } => ErrorKind::CompositionViolation,
            Check::Conditional { .. } => ErrorKind::ConditionalViolation,
            Check::Filter { .. } => ErrorKind::FilterViolation,
            Check::Deferred { .. } | Check::Custom { .. } => ErrorKind::Custom,
        }
    }

    /// Message template; `{property}` and the keys of [`Check::params`] are
    /// substituted when the message is rendered.
    pub fn template(&self) -> &'static str {
        match self {
            Check::Required => "Missing required value for {property}",
            Check::Type { .. } => "Invalid type for {property}. Requires {expected}, got {actual}",
            Check::Enum { .. } => "Invalid value for {property} declined by enum constraint",
            Check::ImplicitNull { .. } => "Invalid null value for {property}",
            Check::Const { .. } => "Invalid value for {property} declined by const constraint",
            Check::Minimum {
                exclusive: false, ..
            } => "Value for {property} must not be smaller than {limit}",
            Check::Minimum {
                exclusive: true, ..
            } => "Value for {property} must be larger than {limit}",
            Check::Maximum {
                exclusive: false, ..
            } => "Value for {property} must not be larger than {limit}",
            Check::Maximum {
                exclusive: true, ..
            } => "Value for {property} must be smaller than {limit}",
            Check::MultipleOf { .. } => "Value for {property} must be a multiple of {divisor}",
            Check::Pattern(_) => "Value for {property} doesn't match pattern {pattern}",
            Check::MinLength(_) => "Value for {property} must not be shorter than {length}",
            Check::MaxLength(_) => "Value for {property} must not be longer than {length}",
            Check::MinItems(_) => "Array {property} must not contain less than {count} items",
            Check::MaxItems(_) => "Array {property} must not contain more than {count} items",
            Check::UniqueItems => "Items of array {property} are not unique",
            Check::Items { .. } => "Invalid items in array {property}",
            Check::Tuple { .. } => "Invalid tuple item in array {property}",
            Check::AdditionalItemsRejected { .. } => {
                "Tuple array {property} contains not allowed additional items. Expected {expected} items, got {actual}"
            }
            Check::AdditionalItems { .. } => "Tuple array {property} contains invalid additional items",
            Check::Contains { .. } => "No item in array {property} matches contains constraint",
            Check::NestedObject { .. } => "Invalid nested object for property {property}",
            Check::AdditionalPropertiesRejected { .. } => {
                "Provided JSON for {class} contains not allowed additional properties [{properties}]"
            }
            Check::AdditionalProperties { .. } => {
                "Provided JSON for {class} contains invalid additional properties"
            }
            Check::PatternProperty { .. } => {
                "Provided JSON for {class} contains invalid pattern properties matching {pattern}"
            }
            Check::PropertyNames { .. } => "Provided JSON for {class} contains invalid property names",
            Check::MinProperties(_) => "Provided object for {property} must not contain less than {count} properties",
            Check::MaxProperties(_) => "Provided object for {property} must not contain more than {count} properties",
            Check::PropertyDependency { .. } => {
                "Missing required attributes which are dependants of {trigger}: {missing}"
            }
            Check::SchemaDependency { .. } => "Invalid schema which is dependant on {trigger}",
            Check::Composition { .. } => {
                "Invalid value for {property} declined by composition constraint. Requires to match {requirement} but matched {matched} elements"
            }
            Check::Conditional { .. } => {
                "Invalid value for {property} declined by conditional composition constraint"
            }
            Check::Filter { .. } => "Filter {filter} failed for {property}: {reason}",
            Check::Deferred { .. } => "Unresolved reference {reference} for {property}",
            Check::Custom { .. } => {
                "Invalid value for {property} declined by custom constraint: {description}"
            }
        }
    }

    /// Build-time parameters of the message template.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        match self {
            Check::Type { kinds, .. } => {
                let expected: Vec<&str> = kinds.iter().map(|k| k.keyword()).collect();
                params.insert("expected".into(), json!(expected.join("|")));
            }
            Check::Enum { values, .. } => {
                params.insert("allowed".into(), Value::Array(values.clone()));
            }
            Check::Const { value } => {
                params.insert("const".into(), value.clone());
            }
            Check::Minimum { limit, .. } | Check::Maximum { limit, .. } => {
                params.insert("limit".into(), Value::Number(limit.clone()));
            }
            Check::MultipleOf { divisor } => {
                params.insert("divisor".into(), Value::Number(divisor.clone()));
            }
            Check::Pattern(pattern) => {
                params.insert("pattern".into(), json!(pattern.as_str()));
            }
            Check::MinLength(n) | Check::MaxLength(n) => {
                params.insert("length".into(), json!(n));
            }
            Check::MinItems(n)
            | Check::MaxItems(n)
            | Check::MinProperties(n)
            | Check::MaxProperties(n) => {
                params.insert("count".into(), json!(n));
            }
            Check::AdditionalItemsRejected { expected } => {
                params.insert("expected".into(), json!(expected));
            }
            Check::AdditionalPropertiesRejected { class, .. }
            | Check::AdditionalProperties { class, .. }
            | Check::PropertyNames { class, .. } => {
                params.insert("class".into(), json!(class));
            }
            Check::PatternProperty {
                class, pattern, key, ..
            } => {
                params.insert("class".into(), json!(class));
                params.insert("pattern".into(), json!(pattern.as_str()));
                params.insert("key".into(), json!(key));
            }
            Check::PropertyDependency {
                trigger,
                dependants,
            } => {
                params.insert("trigger".into(), json!(trigger));
                params.insert("dependants".into(), json!(dependants));
            }
            Check::SchemaDependency { trigger, .. } => {
                params.insert("trigger".into(), json!(trigger));
            }
            Check::Composition { kind, .. } => {
                params.insert("keyword".into(), json!(kind.keyword()));
                params.insert("requirement".into(), json!(kind.requirement()));
            }
            Check::Filter { name, options, .. } => {
                params.insert("filter".into(), json!(name));
                if !options.is_null() {
                    params.insert("options".into(), options.clone());
                }
            }
            Check::Deferred { reference } => {
                params.insert("reference".into(), json!(reference));
            }
            Check::Custom { description, .. } => {
                params.insert("description".into(), json!(description));
            }
            Check::Required
            | Check::ImplicitNull { .. }
            | Check::UniqueItems
            | Check::Items { .. }
            | Check::Tuple { .. }
            | Check::AdditionalItems { .. }
            | Check::Contains { .. }
            | Check::NestedObject { .. }
            | Check::Conditional { .. } => {}
        }
        params
    }

    /// Properties this check evaluates values against.
    pub fn children(&self) -> Vec<PropertyId> {
        match self {
            Check::Items { item }
            | Check::AdditionalItems { item, .. }
            | Check::Contains { item } => vec![*item],
            Check::Tuple { items } => items.clone(),
            Check::AdditionalProperties { property, .. }
            | Check::PatternProperty { property, .. }
            | Check::PropertyNames { property, .. }
            | Check::SchemaDependency { property, .. } => vec![*property],
            Check::Composition { branches, .. } => branches.iter().map(|b| b.property).collect(),
            Check::Conditional {
                condition,
                then,
                otherwise,
                ..
            } => std::iter::once(*condition)
                .chain(*then)
                .chain(*otherwise)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Schemas this check instantiates directly.
    pub fn schema_refs(&self) -> impl Iterator<Item = SchemaId> {
        match self {
            Check::NestedObject { schema } => Some(*schema),
            _ => None,
        }
        .into_iter()
    }

    /// Short human readable form of the check expression.
    pub fn describe(&self) -> String {
        match self {
            Check::Required => "value is present".to_string(),
            Check::Type {
                kinds,
                implicit_null,
            } => {
                let names: Vec<&str> = kinds.iter().map(|k| k.keyword()).collect();
                let suffix = if *implicit_null { " (implicit null)" } else { "" };
                format!("type is {}{}", names.join("|"), suffix)
            }
            Check::Enum {
                values,
                implicit_null,
            } => {
                let suffix = if *implicit_null { " (implicit null)" } else { "" };
                format!("value in {}{}", Value::Array(values.clone()), suffix)
            }
            Check::ImplicitNull { enabled: true } => "null is absent (implicit null)".to_string(),
            Check::ImplicitNull { enabled: false } => "null is a value".to_string(),
            Check::Const { value } => format!("value == {}", value),
            Check::Minimum { limit, exclusive } => {
                format!("value {} {}", if *exclusive { ">" } else { ">=" }, limit)
            }
            Check::Maximum { limit, exclusive } => {
                format!("value {} {}", if *exclusive { "<" } else { "<=" }, limit)
            }
            Check::MultipleOf { divisor } => format!("value % {} == 0", divisor),
            Check::Pattern(pattern) => format!("value matches /{}/", pattern.as_str()),
            Check::MinLength(n) => format!("length >= {}", n),
            Check::MaxLength(n) => format!("length <= {}", n),
            Check::MinItems(n) => format!("item count >= {}", n),
            Check::MaxItems(n) => format!("item count <= {}", n),
            Check::UniqueItems => "items are unique".to_string(),
            Check::Items { item } => format!("every item satisfies #{}", item.index()),
            Check::Tuple { items } => format!("tuple of {} items", items.len()),
            Check::AdditionalItemsRejected { expected } => {
                format!("at most {} items", expected)
            }
            Check::AdditionalItems { offset, item } => {
                format!("items from {} satisfy #{}", offset, item.index())
            }
            Check::Contains { item } => format!("some item satisfies #{}", item.index()),
            Check::NestedObject { schema } => format!("value satisfies schema #{}", schema.index()),
            Check::AdditionalPropertiesRejected { known, .. } => {
                format!("only properties [{}]", known.join(", "))
            }
            Check::AdditionalProperties { property, .. } => {
                format!("additional properties satisfy #{}", property.index())
            }
            Check::PatternProperty { pattern, .. } => {
                format!("properties matching /{}/ are valid", pattern.as_str())
            }
            Check::PropertyNames { property, .. } => {
                format!("property names satisfy #{}", property.index())
            }
            Check::MinProperties(n) => format!("property count >= {}", n),
            Check::MaxProperties(n) => format!("property count <= {}", n),
            Check::PropertyDependency {
                trigger,
                dependants,
            } => format!("{} requires [{}]", trigger, dependants.join(", ")),
            Check::SchemaDependency { trigger, .. } => format!("{} requires dependency schema", trigger),
            Check::Composition { kind, branches, .. } => {
                format!("{} of {} branches", kind.keyword(), branches.len())
            }
            Check::Conditional { then, otherwise, .. } => format!(
                "if/then{}/else{}",
                if then.is_some() { "" } else { " (none)" },
                if otherwise.is_some() { "" } else { " (none)" }
            ),
            Check::Filter { name, .. } => format!("filter {}", name),
            Check::Deferred { reference } => format!("deferred {}", reference),
            Check::Custom { description, .. } => description.clone(),
        }
    }

    /// Rendering without graph ids or class names. Children and nested
    /// schemas are left to the caller.
    pub(crate) fn fingerprint(&self) -> String {
        let patterns = |patterns: &[Pattern]| {
            patterns
                .iter()
                .map(|p| format!("/{}/", p.as_str()))
                .collect::<Vec<_>>()
                .join(",")
        };
        match self {
            Check::Items { .. } => "items".to_string(),
            Check::Tuple { items } => format!("tuple {}", items.len()),
            Check::AdditionalItems { offset, .. } => format!("additional items from {}", offset),
            Check::Contains { .. } => "contains".to_string(),
            Check::NestedObject { .. } => "nested object".to_string(),
            Check::AdditionalPropertiesRejected {
                known,
                patterns: p,
                ..
            } => format!("no additional [{}] {}", known.join(","), patterns(p)),
            Check::AdditionalProperties {
                known,
                patterns: p,
                ..
            } => format!("additional [{}] {}", known.join(","), patterns(p)),
            Check::PatternProperty { pattern, key, .. } => {
                format!("pattern property /{}/ as {}", pattern.as_str(), key)
            }
            Check::PropertyNames { .. } => "property names".to_string(),
            Check::SchemaDependency { trigger, .. } => format!("dependency schema of {}", trigger),
            Check::Composition {
                kind,
                branches,
                object_level,
            } => {
                let affected: Vec<String> =
                    branches.iter().map(|b| b.affected.join(",")).collect();
                format!(
                    "{} object={} affected=[{}]",
                    kind.keyword(),
                    object_level,
                    affected.join(";")
                )
            }
            Check::Conditional {
                then,
                otherwise,
                object_level,
                ..
            } => format!(
                "if then={} else={} object={}",
                then.is_some(),
                otherwise.is_some(),
                object_level
            ),
            Check::Filter { name, options, .. } => format!("filter {} {}", name, options),
            other => other.describe(),
        }
    }
}
