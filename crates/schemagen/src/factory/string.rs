use super::count_keyword;
use crate::error::{DefinitionError, malformed};
use crate::model::Property;
use crate::validator::{Check, Pattern, Validator};
use serde_json::Value;

/// No formats are supported; naming one is an error rather than a silently
/// skipped check.
pub(super) fn apply_format(property: &Property, node: &Value) -> Result<(), DefinitionError> {
    match node.get("format") {
        None => Ok(()),
        Some(format) => Err(DefinitionError::UnsupportedFormat {
            property: property.name().to_string(),
            format: format.as_str().map(str::to_string).unwrap_or_else(|| format.to_string()),
        }),
    }
}

pub(super) fn apply_pattern(property: &mut Property, node: &Value) -> Result<(), DefinitionError> {
    let Some(pattern) = node.get("pattern") else {
        return Ok(());
    };
    let source = pattern
        .as_str()
        .ok_or_else(|| malformed(property.name(), "pattern must be a string"))?;
    let pattern = compile_pattern(property.name(), source)?;
    property.add_validator(Validator::new(Check::Pattern(pattern)));
    Ok(())
}

pub(super) fn apply_length(property: &mut Property, node: &Value) -> Result<(), DefinitionError> {
    if let Some(min) = count_keyword(property.name(), node, "minLength")? {
        property.add_validator(Validator::new(Check::MinLength(min)));
    }
    if let Some(max) = count_keyword(property.name(), node, "maxLength")? {
        property.add_validator(Validator::new(Check::MaxLength(max)));
    }
    Ok(())
}

pub(crate) fn compile_pattern(property: &str, source: &str) -> Result<Pattern, DefinitionError> {
    Pattern::new(source).map_err(|err| DefinitionError::InvalidPattern {
        property: property.to_string(),
        pattern: source.to_string(),
        reason: err.to_string(),
    })
}
