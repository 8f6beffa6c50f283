//! Plain-text outline of a generated schema.

use super::Emitter;
use crate::model::{Decorator, Graph, PropertyId, SchemaId};
use crate::validator::{Check, Validator};

/// Deterministic outline: the class, its properties with their validators in
/// execution order, nested contexts indented below the check that owns them,
/// and the object-wide validators last.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineEmitter;

impl Emitter for OutlineEmitter {
    fn name(&self) -> &'static str {
        "outline"
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn emit(&self, graph: &Graph, schema: SchemaId) -> String {
        let schema_id = graph.canonical(schema);
        let schema = graph.schema(schema_id);
        let mut out = String::new();
        out.push_str(&format!("class {}\n", schema.identity()));
        if let Some(description) = schema.description() {
            out.push_str(&format!("  // {}\n", description));
        }
        for used in graph.used_types(schema_id) {
            out.push_str(&format!("  uses {}\n", used));
        }

        let mut path = Vec::new();
        for &property in schema.properties() {
            render_property(graph, property, 1, &mut path, &mut out);
        }
        if !schema.base_validators().is_empty() {
            out.push_str("  object:\n");
            for validator in schema.base_validators().iter() {
                render_validator(graph, validator, 2, &mut path, &mut out);
            }
        }
        out
    }
}

fn render_property(
    graph: &Graph,
    id: PropertyId,
    depth: usize,
    path: &mut Vec<PropertyId>,
    out: &mut String,
) {
    let property = graph.property(id);
    let indent = "  ".repeat(depth);
    let ty = property
        .property_type()
        .map(ToString::to_string)
        .unwrap_or_else(|| "mixed".to_string());
    out.push_str(&format!("{}{}: {}", indent, property.name(), ty));
    if property.is_required() {
        out.push_str(", required");
    }
    if let Some(default) = property.default_value() {
        out.push_str(&format!(", default {}", default));
    }
    out.push('\n');

    // Bound placeholders of recursive definitions point back at themselves.
    if path.contains(&id) {
        out.push_str(&format!("{}  (recursive)\n", indent));
        return;
    }
    path.push(id);
    if let Some(description) = property.description() {
        out.push_str(&format!("{}  // {}\n", indent, description));
    }
    for decorator in property.decorators() {
        out.push_str(&format!("{}  @{}\n", indent, decorator_label(graph, decorator)));
    }
    for validator in property.validators().iter() {
        render_validator(graph, validator, depth + 1, path, out);
    }
    path.pop();
}

fn render_validator(
    graph: &Graph,
    validator: &Validator,
    depth: usize,
    path: &mut Vec<PropertyId>,
    out: &mut String,
) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!(
        "{}[{}] {}\n",
        indent,
        validator.priority(),
        check_label(graph, validator.check())
    ));
    for child in validator.check().children() {
        render_property(graph, child, depth + 1, path, out);
    }
}

/// Like [`Check::describe`], without graph ids.
fn check_label(graph: &Graph, check: &Check) -> String {
    match check {
        Check::Items { .. } => "items".to_string(),
        Check::AdditionalItems { offset, .. } => format!("additional items from {}", offset),
        Check::Contains { .. } => "contains".to_string(),
        Check::NestedObject { schema } => {
            format!("instance of {}", graph.schema(*schema).identity().class_name)
        }
        Check::AdditionalProperties { .. } => "additional properties".to_string(),
        Check::PatternProperty { pattern, key, .. } => {
            format!("pattern properties /{}/ as {}", pattern.as_str(), key)
        }
        Check::PropertyNames { .. } => "property names".to_string(),
        other => other.describe(),
    }
}

fn decorator_label(graph: &Graph, decorator: &Decorator) -> String {
    match decorator {
        Decorator::ObjectInstantiation { schema } => {
            format!("instantiates {}", graph.schema(*schema).identity().class_name)
        }
        Decorator::TypeHint { names } => format!("type hint {}", names.join("|")),
        Decorator::Transferred { keyword } => format!("transferred from {}", keyword),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{DocumentSource, Generator};
    use serde_json::json;

    #[test]
    fn outline_of_flat_schema() {
        let mut generator = Generator::default();
        let schema = generator
            .process_document(
                &DocumentSource::new("user.json", "App", "User"),
                json!({
                    "type": "object",
                    "description": "A user",
                    "properties": {
                        "name": { "type": "string", "minLength": 2 },
                        "age": { "type": "integer", "minimum": 0, "default": 18 },
                        "tags": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["name"],
                    "additionalProperties": false
                }),
            )
            .unwrap();

        let output = OutlineEmitter.emit(generator.graph(), schema);
        insta::assert_snapshot!(output, @r"
        class App\User
          // A user
          name: string, required
            [1] value is present
            [2] type is string
            [99] length >= 2
          age: integer, default 18
            [2] type is integer (implicit null)
            [99] value >= 0
          tags: array
            [2] type is array (implicit null)
            [99] items
              item of array tags: string
                [2] type is string
          object:
            [99] only properties [name, age, tags]
        ");
    }

    #[test]
    fn recursive_properties_are_cut() {
        let mut generator = Generator::default();
        let schema = generator
            .process_document(
                &DocumentSource::new("a.json", "", "A"),
                json!({
                    "type": "object",
                    "definitions": {
                        "tree": { "type": "array", "items": { "$ref": "#/definitions/tree" } }
                    },
                    "properties": { "tree": { "$ref": "#/definitions/tree" } }
                }),
            )
            .unwrap();

        let output = OutlineEmitter.emit(generator.graph(), schema);
        assert!(output.contains("(recursive)"));
    }
}
