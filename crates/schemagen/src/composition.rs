//! `allOf`, `anyOf`, `oneOf`, `not` and `if`/`then`/`else`.
//!
//! Every branch is built as a property of its own and referenced from one
//! composition validator. Branches without a `type` inherit the parent's, and
//! inherit its requiredness. Branch type checks never settle an implicit
//! null: an optional parent settles `null` before its compositions run.
//!
//! On objects the compositions become object-wide validators. Properties
//! declared by object branches are lifted into the base schema as optional,
//! check-free properties; each branch records the names it populates so the
//! evaluator can reset the ones a failing branch would have filled.

use crate::diagnostics::Diagnostic;
use crate::error::{DefinitionError, malformed};
use crate::factory::is_object_node;
use crate::generator::{Generator, Scope};
use crate::model::{Decorator, Property, PropertyId, SchemaId};
use crate::processor::with_object_type;
use crate::validator::{Check, CompositionBranch, CompositionKind, Validator, ValidatorList};
use serde_json::{Value, json};

const KEYWORDS: [&str; 7] = ["allOf", "anyOf", "oneOf", "not", "if", "then", "else"];

const KINDS: [CompositionKind; 4] = [
    CompositionKind::AllOf,
    CompositionKind::AnyOf,
    CompositionKind::OneOf,
    CompositionKind::Not,
];

/// The branch schemas of `kind` in `node`, if the keyword is present.
fn branch_nodes(
    owner: &str,
    node: &Value,
    kind: CompositionKind,
) -> Result<Option<Vec<Value>>, DefinitionError> {
    match (kind, node.get(kind.keyword())) {
        (_, None) => Ok(None),
        (CompositionKind::Not, Some(branch)) => Ok(Some(vec![branch.clone()])),
        (_, Some(Value::Array(branches))) => Ok(Some(branches.clone())),
        (_, Some(_)) => Err(malformed(
            owner,
            format!("{} must be an array", kind.keyword()),
        )),
    }
}

/// `node` without its composition and conditional keywords.
pub(crate) fn without_compositions(node: &Value) -> Value {
    let mut node = node.clone();
    if let Value::Object(map) = &mut node {
        map.retain(|key, _| !KEYWORDS.contains(&key.as_str()));
    }
    node
}

/// A branch schema with the parent's `type` when it declares none.
fn inherit_type(parent: &Value, branch: &Value) -> Value {
    let mut branch = match branch {
        Value::Bool(true) => json!({}),
        Value::Bool(false) => json!({ "not": {} }),
        other => other.clone(),
    };
    if let (Some(ty), Value::Object(map)) = (parent.get("type"), &mut branch) {
        if !map.contains_key("type") && !map.contains_key("$ref") {
            map.insert("type".to_string(), ty.clone());
        }
    }
    branch
}

impl Generator {
    /// Property-level compositions and conditionals.
    pub(crate) fn apply_compositions(
        &mut self,
        scope: &Scope,
        property: &mut Property,
        node: &Value,
        required: bool,
    ) -> Result<(), DefinitionError> {
        let name = property.name().to_string();
        let mut composed = false;
        for kind in KINDS {
            let Some(branch_nodes) = branch_nodes(&name, node, kind)? else {
                continue;
            };
            if branch_nodes.is_empty() {
                self.push_diagnostic(Diagnostic::EmptyComposition {
                    keyword: kind.keyword().to_string(),
                    property: name.clone(),
                });
            }

            let mut branches = Vec::with_capacity(branch_nodes.len());
            for branch in &branch_nodes {
                let branch = inherit_type(node, branch);
                let id = self.build_branch(scope, &name, &branch, required)?;
                branches.push(CompositionBranch {
                    property: id,
                    affected: Vec::new(),
                });
            }

            if property.ty.is_none() && kind != CompositionKind::Not {
                self.infer_type_from_branches(property, &branches);
            }
            property.add_validator(Validator::new(Check::Composition {
                kind,
                branches,
                object_level: false,
            }));
            composed = true;
        }

        if let Some(check) = self.build_conditional(scope, &name, node, required, false)? {
            property.add_validator(Validator::new(check));
            composed = true;
        }

        let constrained = property
            .validators()
            .find(|check| matches!(check, Check::Type { .. } | Check::Enum { .. } | Check::Const { .. }))
            .is_some();
        if composed && !constrained {
            property.add_validator(Validator::new(Check::ImplicitNull {
                enabled: self.allows_implicit_null(required) && !property.strict,
            }));
        }
        Ok(())
    }

    /// A property-level branch. It is built as required so its type checks
    /// stay strict, then loses the presence check if the parent is optional.
    fn build_branch(
        &mut self,
        scope: &Scope,
        name: &str,
        branch: &Value,
        required: bool,
    ) -> Result<PropertyId, DefinitionError> {
        let id = self.build_property(scope, name, branch, true)?;
        if !required {
            self.graph.property_mut(id).relax_required();
        }
        Ok(id)
    }

    /// An untyped composition whose branches agree on one type takes it.
    fn infer_type_from_branches(&self, property: &mut Property, branches: &[CompositionBranch]) {
        let mut types = branches
            .iter()
            .map(|branch| self.graph.property(branch.property).ty.clone());
        let Some(Some(first)) = types.next() else {
            return;
        };
        if types.all(|ty| ty.as_ref() == Some(&first)) {
            property.add_decorator(Decorator::TypeHint {
                names: first.names().to_vec(),
            });
            property.set_type(first);
        }
    }

    /// `if`/`then`/`else`. Without `then` and `else` nothing is generated.
    fn build_conditional(
        &mut self,
        scope: &Scope,
        name: &str,
        node: &Value,
        required: bool,
        object_level: bool,
    ) -> Result<Option<Check>, DefinitionError> {
        let Some(condition) = node.get("if") else {
            return Ok(None);
        };
        if node.get("then").is_none() && node.get("else").is_none() {
            self.push_diagnostic(Diagnostic::IneffectiveConditional {
                property: name.to_string(),
            });
            return Ok(None);
        }

        let build = |generator: &mut Self, branch: &Value| {
            if object_level {
                generator.build_property(scope, name, &with_object_type(branch), required)
            } else {
                generator.build_branch(scope, name, &inherit_type(node, branch), required)
            }
        };
        let condition = build(self, condition)?;
        let then = node.get("then").map(|then| build(self, then)).transpose()?;
        let otherwise = node
            .get("else")
            .map(|otherwise| build(self, otherwise))
            .transpose()?;
        Ok(Some(Check::Conditional {
            condition,
            then,
            otherwise,
            object_level,
        }))
    }

    /// Object-wide compositions and conditionals of `schema`.
    pub(crate) fn apply_object_compositions(
        &mut self,
        scope: &Scope,
        schema: SchemaId,
        node: &Value,
    ) -> Result<(), DefinitionError> {
        let class = scope.class_name.clone();
        for kind in KINDS {
            let Some(branch_nodes) = branch_nodes(&class, node, kind)? else {
                continue;
            };
            if branch_nodes.is_empty() {
                self.push_diagnostic(Diagnostic::EmptyComposition {
                    keyword: kind.keyword().to_string(),
                    property: class.clone(),
                });
            }

            let mut branches = Vec::with_capacity(branch_nodes.len());
            for branch in &branch_nodes {
                let branch = with_object_type(branch);
                let id = if is_object_node(&branch) && branch.get("$ref").is_none() {
                    self.build_object(scope, &class, &branch, true, true)?
                } else {
                    self.build_property(scope, &class, &branch, true)?
                };
                let affected = if kind == CompositionKind::Not {
                    Vec::new()
                } else {
                    self.transfer_properties(schema, id, kind)
                };
                branches.push(CompositionBranch {
                    property: id,
                    affected,
                });
            }

            self.graph
                .schema_mut(schema)
                .base_validators
                .add(Validator::new(Check::Composition {
                    kind,
                    branches,
                    object_level: true,
                }));
        }

        if let Some(check) = self.build_conditional(scope, &class, node, true, true)? {
            self.graph
                .schema_mut(schema)
                .base_validators
                .add(Validator::new(check));
        }
        Ok(())
    }

    /// Lift the properties of an object branch into `schema` and return the
    /// names the branch populates. Properties declared by the schema itself
    /// are left alone.
    fn transfer_properties(
        &mut self,
        schema: SchemaId,
        branch: PropertyId,
        kind: CompositionKind,
    ) -> Vec<String> {
        let Some(nested) = self.graph.property(branch).nested_schema else {
            return Vec::new();
        };
        let nested_properties = self.graph.schema(nested).properties.clone();

        let mut affected = Vec::new();
        for source in nested_properties {
            let name = self.graph.property(source).name.clone();
            let existing = self
                .graph
                .schema_entry(schema)
                .properties
                .iter()
                .copied()
                .find(|&id| self.graph.property(id).name == name);
            match existing {
                Some(existing) => {
                    let transferred = self
                        .graph
                        .property(existing)
                        .decorators
                        .iter()
                        .any(|decorator| matches!(decorator, Decorator::Transferred { .. }));
                    if transferred {
                        affected.push(name);
                    }
                }
                None => {
                    let mut property = self.graph.property(source).clone();
                    property.required = false;
                    property.strict = false;
                    property.validators = ValidatorList::new();
                    property.add_decorator(Decorator::Transferred {
                        keyword: kind.keyword().to_string(),
                    });
                    let id = self.graph.add_property(property);
                    self.graph.schema_mut(schema).properties.push(id);
                    affected.push(name);
                }
            }
        }
        affected
    }
}
