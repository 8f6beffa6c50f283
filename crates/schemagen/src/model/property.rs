//! Properties: one validated value inside a generated type.

use super::kind::JsonKind;
use super::property_type::PropertyType;
use super::schema::SchemaId;
use crate::error::DefinitionError;
use crate::validator::{Check, Validator, ValidatorList};
use serde::Serialize;
use serde_json::Value;

/// Stable key of a [`Property`] inside a [`Graph`](super::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PropertyId(pub(crate) usize);

impl PropertyId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Extra information consumers need to render a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decorator", rename_all = "kebab-case")]
pub enum Decorator {
    /// The value is turned into an instance of the nested schema's type.
    ObjectInstantiation { schema: SchemaId },
    /// Possible runtime types when the declared type is unknown (untyped enums).
    TypeHint { names: Vec<String> },
    /// The property was lifted into its schema from an object-level composition.
    Transferred { keyword: String },
}

/// One validated field or value.
#[derive(Debug, Clone)]
pub struct Property {
    pub(crate) name: String,
    pub(crate) identifier: String,
    pub(crate) ty: Option<PropertyType>,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
    pub(crate) description: Option<String>,
    pub(crate) validators: ValidatorList,
    pub(crate) decorators: Vec<Decorator>,
    pub(crate) nested_schema: Option<SchemaId>,
    /// Keeps the presence check even when optional (typed enums).
    pub(crate) strict: bool,
    /// Lives in a nested context (array item, pattern property, ...).
    pub(crate) relaxed: bool,
}

impl Property {
    /// Create a property, deriving its identifier from the name.
    pub fn new(name: impl Into<String>, required: bool) -> Result<Self, DefinitionError> {
        let name = name.into();
        let identifier = generated_identifier(&name)?;
        Ok(Self {
            name,
            identifier,
            ty: None,
            required,
            default: None,
            description: None,
            validators: ValidatorList::new(),
            decorators: Vec::new(),
            nested_schema: None,
            strict: false,
            relaxed: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier used for the generated field/accessor.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn property_type(&self) -> Option<&PropertyType> {
        self.ty.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn validators(&self) -> &ValidatorList {
        &self.validators
    }

    pub fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }

    pub fn nested_schema(&self) -> Option<SchemaId> {
        self.nested_schema
    }

    pub(crate) fn set_type(&mut self, ty: PropertyType) {
        self.ty = Some(ty);
    }

    pub(crate) fn add_validator(&mut self, validator: Validator) {
        self.validators.add(validator);
    }

    pub(crate) fn add_decorator(&mut self, decorator: Decorator) {
        if !self.decorators.contains(&decorator) {
            self.decorators.push(decorator);
        }
    }

    /// Rename a copied property for a new call site.
    pub(crate) fn rename(&mut self, name: &str) -> Result<(), DefinitionError> {
        self.identifier = generated_identifier(name)?;
        self.name = name.to_string();
        Ok(())
    }

    /// Downgrade to optional: the presence check is removed.
    ///
    /// Used by nested contexts (array items, pattern properties, ...) where an
    /// absent value is not a required-value violation.
    pub(crate) fn relax_required(&mut self) {
        self.required = false;
        self.relaxed = true;
        self.validators.remove_required();
    }

    /// Re-derive the presence check and implicit-null flags after the
    /// required flag changed (a definition reused at another call site).
    pub(crate) fn stamp_required(&mut self, required: bool, implicit_null: bool) {
        self.required = required;
        self.validators.remove_required();
        if (required || self.strict) && !self.relaxed {
            self.validators.add(Validator::new(Check::Required));
        }
        let allow_null = implicit_null && !required && !self.strict && !self.relaxed;
        for validator in self.validators.iter_mut() {
            validator.map_check(|check| match check {
                Check::Type {
                    kinds,
                    implicit_null,
                } => *implicit_null = allow_null && !kinds.contains(&JsonKind::Null),
                Check::Enum {
                    values,
                    implicit_null,
                } => *implicit_null = allow_null && !values.contains(&Value::Null),
                Check::ImplicitNull { enabled } => *enabled = allow_null,
                _ => {}
            });
        }
    }
}

/// Derive a camelCase identifier from a property name.
///
/// Every run of non-alphanumeric characters splits a word; words after the
/// first are capitalized. Identifiers that would start with a digit get a
/// leading underscore.
pub fn generated_identifier(name: &str) -> Result<String, DefinitionError> {
    let mut identifier = String::with_capacity(name.len());
    for word in name.split(|c: char| !c.is_alphanumeric()) {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        if identifier.is_empty() {
            identifier.extend(first.to_lowercase());
        } else {
            identifier.extend(first.to_uppercase());
        }
        identifier.push_str(chars.as_str());
    }

    if identifier.is_empty() {
        return Err(DefinitionError::EmptyIdentifier {
            name: name.to_string(),
        });
    }
    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        identifier.insert(0, '_');
    }
    Ok(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_camel_case() {
        assert_eq!(generated_identifier("first-name").unwrap(), "firstName");
        assert_eq!(generated_identifier("Street Address").unwrap(), "streetAddress");
        assert_eq!(generated_identifier("snake_case_value").unwrap(), "snakeCaseValue");
        assert_eq!(generated_identifier("already").unwrap(), "already");
    }

    #[test]
    fn leading_digit_is_prefixed() {
        assert_eq!(generated_identifier("1st place").unwrap(), "_1stPlace");
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let err = generated_identifier("-- !").unwrap_err();
        assert!(matches!(err, DefinitionError::EmptyIdentifier { .. }));
        assert!(Property::new("", true).is_err());
    }

    #[test]
    fn relax_required_strips_presence_check() {
        let mut property = Property::new("item", true).unwrap();
        property.add_validator(Validator::new(Check::Required));
        property.add_validator(Validator::new(Check::MinLength(2)));
        property.relax_required();

        assert!(!property.is_required());
        assert_eq!(property.validators().len(), 1);
    }

    #[test]
    fn stamp_required_follows_call_site() {
        let mut property = Property::new("name", true).unwrap();
        property.add_validator(Validator::new(Check::Required));
        property.add_validator(Validator::new(Check::Type {
            kinds: vec![JsonKind::String],
            implicit_null: false,
        }));

        property.stamp_required(false, true);
        assert!(!property.validators().has_required());
        assert!(matches!(
            property.validators().find(|c| matches!(c, Check::Type { .. })).unwrap().check(),
            Check::Type { implicit_null: true, .. }
        ));

        property.stamp_required(true, true);
        assert!(property.validators().has_required());
        assert_eq!(property.validators().priorities(), vec![1, 2]);
    }

    #[test]
    fn stamp_required_toggles_null_settling() {
        let mut property = Property::new("choice", true).unwrap();
        property.add_validator(Validator::new(Check::ImplicitNull { enabled: false }));

        property.stamp_required(false, true);
        let validator = property.validators().find(|c| matches!(c, Check::ImplicitNull { .. })).unwrap();
        assert!(matches!(validator.check(), Check::ImplicitNull { enabled: true }));
        assert_eq!(validator.describe(), "null is absent (implicit null)");

        property.stamp_required(true, true);
        assert!(matches!(
            property.validators().find(|c| matches!(c, Check::ImplicitNull { .. })).unwrap().check(),
            Check::ImplicitNull { enabled: false }
        ));
    }

    #[test]
    fn strict_properties_keep_presence_check() {
        let mut property = Property::new("status", false).unwrap();
        property.strict = true;
        property.stamp_required(false, true);
        assert!(property.validators().has_required());
        assert!(!property.is_required());
    }
}
