//! `$ref` resolution with cycle-safe caching.
//!
//! Every definition is built once per run and cached by document and
//! pointer. Each call site receives its own copy carrying the call site's
//! name and requiredness.
//!
//! A reference reached again while its definition is still being built
//! returns a placeholder:
//! - object definitions reserve their schema before processing, so the
//!   placeholder already points at the final type;
//! - any other definition gets a deferred placeholder which is filled in
//!   once the definition completes.

pub mod dedup;
mod pointer;

pub use pointer::{decode_fragment, last_segment, lookup, split_reference};

use crate::error::DefinitionError;
use crate::generator::{Generator, Scope};
use crate::model::{PropertyId, SchemaId, SchemaIdentity};
use crate::validator::{Check, Validator};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A document that references can point into.
#[derive(Debug, Clone)]
pub(crate) struct StoredDocument {
    pub key: String,
    pub namespace: String,
    pub value: Arc<Value>,
}

/// Documents known to the current run, in registration order.
#[derive(Debug, Default)]
pub(crate) struct DocumentStore {
    documents: Vec<StoredDocument>,
}

impl DocumentStore {
    /// Store a document; a document with the same key is replaced.
    pub fn insert(&mut self, key: &str, namespace: &str, value: Arc<Value>) {
        self.documents.retain(|document| document.key != key);
        self.documents.push(StoredDocument {
            key: key.to_string(),
            namespace: namespace.to_string(),
            value,
        });
    }

    pub fn get(&self, key: &str) -> Option<&StoredDocument> {
        self.documents.iter().find(|document| document.key == key)
    }

    /// Find the document a reference's document part names: by key, by file
    /// name, or by `$id`.
    pub fn locate(&self, reference: &str) -> Option<&StoredDocument> {
        if let Some(document) = self.get(reference) {
            return Some(document);
        }
        let file_name = reference.rsplit('/').next().unwrap_or(reference);
        self.documents
            .iter()
            .find(|document| document.key.rsplit('/').next() == Some(file_name))
            .or_else(|| {
                self.documents.iter().find(|document| {
                    document
                        .value
                        .get("$id")
                        .and_then(Value::as_str)
                        .is_some_and(|id| id.trim_end_matches('#') == reference)
                })
            })
    }
}

/// Cache key of a definition: owning document and decoded pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct DefinitionKey {
    document: String,
    pointer: String,
}

impl DefinitionKey {
    pub fn new(document: &str, pointer: &str) -> Self {
        Self {
            document: document.to_string(),
            pointer: pointer.to_string(),
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }
}

#[derive(Debug, Clone)]
pub(crate) enum DefinitionState {
    /// Being built. Object definitions know their schema up front; deferred
    /// placeholders wait for the finished definition.
    InProgress {
        schema: Option<SchemaId>,
        placeholders: Vec<PropertyId>,
    },
    Resolved(PropertyId),
}

pub(crate) type DefinitionCache = HashMap<DefinitionKey, DefinitionState>;

/// Target of a reference after locating its document.
struct Target {
    key: DefinitionKey,
    namespace: String,
    node: Value,
    name: String,
}

impl Generator {
    /// Locate the node a reference points to. Returns its cache key and a
    /// copy of the node.
    pub(crate) fn resolve_pointer(
        &self,
        scope: &Scope,
        reference: &str,
    ) -> Result<(DefinitionKey, Value), DefinitionError> {
        let target = self.locate(scope, reference)?;
        Ok((target.key, target.node))
    }

    fn locate(&self, scope: &Scope, reference: &str) -> Result<Target, DefinitionError> {
        let unresolved = || DefinitionError::UnresolvedReference {
            reference: reference.to_string(),
        };
        let (document, fragment) = split_reference(reference);
        let stored = if document.is_empty() {
            self.documents.get(&scope.document)
        } else {
            self.documents.locate(document)
        }
        .ok_or_else(unresolved)?;

        let pointer = decode_fragment(fragment);
        let node = lookup(&stored.value, &pointer).ok_or_else(unresolved)?;
        let name = last_segment(&pointer).unwrap_or_else(|| {
            let key = stored.key.rsplit('/').next().unwrap_or(&stored.key);
            key.split('.').next().unwrap_or(key).to_string()
        });
        Ok(Target {
            key: DefinitionKey::new(&stored.key, &pointer),
            namespace: stored.namespace.clone(),
            node: node.clone(),
            name,
        })
    }

    /// Build the property for `name` whose schema is `{"$ref": reference}`.
    pub(crate) fn resolve_reference(
        &mut self,
        scope: &Scope,
        name: &str,
        reference: &str,
        required: bool,
    ) -> Result<PropertyId, DefinitionError> {
        let target = self.locate(scope, reference)?;

        match self.definitions.get(&target.key).cloned() {
            Some(DefinitionState::Resolved(definition)) => {
                self.instantiate_definition(definition, name, required)
            }
            Some(DefinitionState::InProgress { schema, .. }) => {
                tracing::debug!(%reference, "recursive reference, creating placeholder");
                self.placeholder(&target.key, schema, name, reference, required)
            }
            None => {
                tracing::debug!(%reference, "resolving definition");
                let definition = self.build_definition(&target)?;
                self.instantiate_definition(definition, name, required)
            }
        }
    }

    fn build_definition(&mut self, target: &Target) -> Result<PropertyId, DefinitionError> {
        let scope = Scope {
            document: target.key.document.clone(),
            namespace: target.namespace.clone(),
            class_name: String::new(),
        };

        let reserved = if crate::factory::is_object_node(&target.node) {
            let class_name = self
                .config
                .naming
                .class_name(&target.name, &target.node, false, "");
            let class_name = self.unique_class_name(&target.namespace, &class_name);
            Some(
                self.graph
                    .reserve_schema(SchemaIdentity::new(target.namespace.clone(), class_name), false),
            )
        } else {
            None
        };

        self.definitions.insert(
            target.key.clone(),
            DefinitionState::InProgress {
                schema: reserved,
                placeholders: Vec::new(),
            },
        );

        let definition = match reserved {
            Some(schema) => self.build_object_into(&scope, &target.name, &target.node, true, schema)?,
            None => self.build_property(&scope, &target.name, &target.node, true)?,
        };
        self.complete_definition(target.key.clone(), definition);
        Ok(definition)
    }

    /// Mark a definition finished and fill in its deferred placeholders.
    pub(crate) fn complete_definition(&mut self, key: DefinitionKey, definition: PropertyId) {
        let previous = self
            .definitions
            .insert(key, DefinitionState::Resolved(definition));
        if let Some(DefinitionState::InProgress { placeholders, .. }) = previous {
            for placeholder in placeholders {
                self.bind_placeholder(placeholder, definition);
            }
        }
    }

    fn placeholder(
        &mut self,
        key: &DefinitionKey,
        schema: Option<SchemaId>,
        name: &str,
        reference: &str,
        required: bool,
    ) -> Result<PropertyId, DefinitionError> {
        if let Some(schema) = schema {
            return self.object_property(name, schema, required);
        }

        let mut property = crate::model::Property::new(name, required)?;
        if required {
            property.add_validator(Validator::new(Check::Required));
        }
        property.add_validator(Validator::new(Check::Deferred {
            reference: reference.to_string(),
        }));
        let id = self.graph.add_property(property);
        if let Some(DefinitionState::InProgress { placeholders, .. }) = self.definitions.get_mut(key) {
            placeholders.push(id);
        }
        Ok(id)
    }

    /// Copy everything but the call-site name and requiredness from the
    /// finished definition into a deferred placeholder.
    fn bind_placeholder(&mut self, placeholder: PropertyId, definition: PropertyId) {
        let source = self.graph.property(definition).clone();
        let implicit_null = self.config.implicit_null();
        let target = self.graph.property_mut(placeholder);
        target.ty = source.ty;
        target.default = source.default;
        if target.description.is_none() {
            target.description = source.description;
        }
        target.decorators = source.decorators;
        target.nested_schema = source.nested_schema;
        target.strict = source.strict;
        target.validators = source.validators;
        let required = target.required;
        target.stamp_required(required, implicit_null);
    }

    /// A fresh copy of a finished definition for one call site.
    fn instantiate_definition(
        &mut self,
        definition: PropertyId,
        name: &str,
        required: bool,
    ) -> Result<PropertyId, DefinitionError> {
        let mut property = self.graph.property(definition).clone();
        property.rename(name)?;
        property.relaxed = false;
        property.stamp_required(required, self.config.implicit_null());
        Ok(self.graph.add_property(property))
    }
}
