use super::number_keyword;
use crate::error::{DefinitionError, malformed};
use crate::model::Property;
use crate::validator::{Check, Validator};
use serde_json::{Number, Value};

/// `minimum`/`maximum` and their exclusive variants.
///
/// Both the numeric form (`"exclusiveMinimum": 3`) and the draft-4 boolean
/// form (`"minimum": 3, "exclusiveMinimum": true`) are accepted.
pub(super) fn apply_range(property: &mut Property, node: &Value) -> Result<(), DefinitionError> {
    let name = property.name().to_string();
    for (bound, exclusive_keyword, lower) in [
        ("minimum", "exclusiveMinimum", true),
        ("maximum", "exclusiveMaximum", false),
    ] {
        let limit = number_keyword(&name, node, bound)?;
        let (limit, draft4_exclusive) = match node.get(exclusive_keyword) {
            Some(Value::Bool(exclusive)) => (limit, *exclusive),
            Some(Value::Number(exclusive)) => {
                add_bound(property, exclusive.clone(), true, lower);
                (limit, false)
            }
            Some(_) => {
                return Err(malformed(
                    &name,
                    format!("{} must be a number or a boolean", exclusive_keyword),
                ));
            }
            None => (limit, false),
        };
        if let Some(limit) = limit {
            add_bound(property, limit, draft4_exclusive, lower);
        }
    }
    Ok(())
}

fn add_bound(property: &mut Property, limit: Number, exclusive: bool, lower: bool) {
    let check = if lower {
        Check::Minimum { limit, exclusive }
    } else {
        Check::Maximum { limit, exclusive }
    };
    property.add_validator(Validator::new(check));
}

/// `multipleOf`. A divisor of zero only accepts zero.
pub(super) fn apply_multiple_of(property: &mut Property, node: &Value) -> Result<(), DefinitionError> {
    let name = property.name().to_string();
    if let Some(divisor) = number_keyword(&name, node, "multipleOf")? {
        property.add_validator(Validator::new(Check::MultipleOf { divisor }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::{describe, process};
    use serde_json::json;

    #[test]
    fn inclusive_and_exclusive_bounds() {
        let (generator, schema) = process(json!({
            "type": "object",
            "properties": {
                "age": { "type": "integer", "minimum": 0, "exclusiveMaximum": 150 }
            },
            "required": ["age"]
        }));
        assert_eq!(
            describe(&generator, schema, "age"),
            vec!["1 value is present", "2 type is integer", "99 value >= 0", "99 value < 150"]
        );
    }

    #[test]
    fn draft4_boolean_exclusive_bounds() {
        let (generator, schema) = process(json!({
            "type": "object",
            "properties": {
                "ratio": {
                    "type": "number",
                    "minimum": 0,
                    "exclusiveMinimum": true,
                    "maximum": 1,
                    "exclusiveMaximum": false
                }
            },
            "required": ["ratio"]
        }));
        assert_eq!(
            describe(&generator, schema, "ratio"),
            vec!["1 value is present", "2 type is number", "99 value > 0", "99 value <= 1"]
        );
    }

    #[test]
    fn zero_divisor_is_kept() {
        let (generator, schema) = process(json!({
            "type": "object",
            "properties": { "n": { "type": "integer", "multipleOf": 0 } },
            "required": ["n"]
        }));
        assert_eq!(
            describe(&generator, schema, "n"),
            vec!["1 value is present", "2 type is integer", "99 value % 0 == 0"]
        );
    }
}
