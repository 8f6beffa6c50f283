//! Structural signatures for collapsing duplicate schemas.
//!
//! A signature hashes a canonical rendering of a schema: its properties
//! (name, type, requiredness, default, validators and their child
//! properties) and its object-wide validators. Class names, descriptions and
//! graph ids do not take part, so two definitions written the same way in
//! different places produce the same signature.

use crate::diagnostics::Diagnostic;
use crate::generator::Generator;
use crate::model::{Graph, PropertyId, SchemaId};
use crate::validator::{Check, Validator};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::Write as _;

/// Hex blake3 digest of a schema's canonical rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Compute the signature of `schema` as it currently stands in `graph`.
    pub fn of(graph: &Graph, schema: SchemaId) -> Self {
        let text = canonical_text(graph, schema);
        Signature(blake3::hash(text.as_bytes()).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First schema registered under each signature.
#[derive(Debug, Default)]
pub(crate) struct SignatureRegistry {
    by_signature: HashMap<Signature, SchemaId>,
}

impl SignatureRegistry {
    pub fn get(&self, signature: &Signature) -> Option<SchemaId> {
        self.by_signature.get(signature).copied()
    }

    /// Register unless the signature is already taken.
    pub fn register(&mut self, signature: Signature, schema: SchemaId) {
        self.by_signature.entry(signature).or_insert(schema);
    }
}

/// Render `schema` canonically. Exposed for tests and debugging output.
pub fn canonical_text(graph: &Graph, schema: SchemaId) -> String {
    let renderer = Renderer {
        graph,
        current: graph.canonical(schema),
    };
    let mut out = String::new();
    let entry = graph.schema_entry(schema);
    for &property in &entry.properties {
        renderer.property(&mut out, property, &mut HashSet::new());
        out.push('\n');
    }
    out.push_str("base:");
    for validator in entry.base_validators.iter() {
        renderer.validator(&mut out, validator, &mut HashSet::new());
    }
    out
}

struct Renderer<'g> {
    graph: &'g Graph,
    current: SchemaId,
}

impl Renderer<'_> {
    fn property(&self, out: &mut String, id: PropertyId, stack: &mut HashSet<PropertyId>) {
        if !stack.insert(id) {
            out.push_str("<cycle>");
            return;
        }
        let property = self.graph.property(id);
        let ty = property
            .ty
            .as_ref()
            .map(|ty| ty.to_string())
            .unwrap_or_default();
        let default = property
            .default
            .as_ref()
            .map(|value| value.to_string())
            .unwrap_or_default();
        let _ = write!(
            out,
            "{}:{}:{}:{}:",
            property.name, property.required, ty, default
        );
        if let Some(schema) = property.nested_schema {
            self.schema_ref(out, schema);
        }
        out.push('[');
        for validator in property.validators.iter() {
            self.validator(out, validator, stack);
        }
        out.push(']');
        stack.remove(&id);
    }

    fn validator(&self, out: &mut String, validator: &Validator, stack: &mut HashSet<PropertyId>) {
        let check = validator.check();
        let _ = write!(out, "({}|{}", validator.priority(), check.fingerprint());
        if let Check::Type { implicit_null, .. } | Check::Enum { implicit_null, .. } = check {
            let _ = write!(out, "|null={}", implicit_null);
        }
        for schema in check.schema_refs() {
            out.push('|');
            self.schema_ref(out, schema);
        }
        for child in check.children() {
            out.push('{');
            self.property(out, child, stack);
            out.push('}');
        }
        out.push(')');
    }

    fn schema_ref(&self, out: &mut String, schema: SchemaId) {
        let schema = self.graph.canonical(schema);
        if schema == self.current {
            out.push_str("schema:self");
        } else {
            let _ = write!(out, "schema:{}", schema.index());
        }
    }
}

impl Generator {
    /// Compute and record the signature of a finished schema, collapsing it
    /// into an earlier identical schema when there is one.
    ///
    /// Returns the schema callers should reference from now on. Document
    /// roots always keep their own identity.
    pub(crate) fn finalize_schema(&mut self, schema: SchemaId) -> SchemaId {
        let signature = Signature::of(&self.graph, schema);
        self.graph.schema_mut(schema).signature = Some(signature.clone());

        let root = self.graph.schema_entry(schema).root;
        match self.signatures.get(&signature) {
            Some(existing) if !root && self.graph.canonical(existing) != schema => {
                let existing = self.graph.canonical(existing);
                self.graph.schema_mut(schema).redirect = Some(existing);
                let from = self.graph.schema_entry(schema).identity.qualified();
                let to = self.graph.schema_entry(existing).identity.qualified();
                self.push_diagnostic(Diagnostic::SchemaRedirected { from, to });
                existing
            }
            Some(_) => schema,
            None => {
                tracing::trace!(schema = %self.graph.schema_entry(schema).identity, %signature, "registered schema signature");
                self.signatures.register(signature, schema);
                schema
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Property, SchemaIdentity};

    fn schema_with_name_property(graph: &mut Graph, class: &str, min_length: usize) -> SchemaId {
        let schema = graph.reserve_schema(SchemaIdentity::new("", class), false);
        let mut property = Property::new("name", true).unwrap();
        property.add_validator(Validator::new(Check::Required));
        property.add_validator(Validator::new(Check::MinLength(min_length)));
        let id = graph.add_property(property);
        graph.schema_mut(schema).properties.push(id);
        schema
    }

    #[test]
    fn class_names_do_not_affect_signature() {
        let mut graph = Graph::new();
        let a = schema_with_name_property(&mut graph, "A", 2);
        let b = schema_with_name_property(&mut graph, "B", 2);
        assert_eq!(Signature::of(&graph, a), Signature::of(&graph, b));
    }

    #[test]
    fn constraints_affect_signature() {
        let mut graph = Graph::new();
        let a = schema_with_name_property(&mut graph, "A", 2);
        let b = schema_with_name_property(&mut graph, "B", 3);
        assert_ne!(Signature::of(&graph, a), Signature::of(&graph, b));
    }

    #[test]
    fn registry_keeps_first_schema() {
        let mut graph = Graph::new();
        let a = schema_with_name_property(&mut graph, "A", 2);
        let b = schema_with_name_property(&mut graph, "B", 2);
        let mut registry = SignatureRegistry::default();
        registry.register(Signature::of(&graph, a), a);
        registry.register(Signature::of(&graph, b), b);
        assert_eq!(registry.get(&Signature::of(&graph, b)), Some(a));
    }
}
