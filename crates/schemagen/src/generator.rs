//! Run-level entry point.
//!
//! A [`Generator`] owns everything shared between the documents of one run:
//! the property graph, the definitions cache, the dedup registry, and the
//! collected diagnostics. All of it is mutated through `&mut self`, so every
//! check-then-insert on the registries happens under a single writer.

use crate::config::GeneratorConfig;
use crate::diagnostics::Diagnostic;
use crate::error::{ConfigError, DefinitionError};
use crate::model::{Graph, SchemaId, SchemaIdentity};
use crate::resolver::dedup::SignatureRegistry;
use crate::resolver::{DefinitionCache, DefinitionKey, DefinitionState, DocumentStore};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Identifies a schema document within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    /// Key other documents use in `$ref` (usually the file name).
    pub key: String,
    /// Namespace of every type generated from the document.
    pub namespace: String,
    /// Class name of the document's top-level type.
    pub class_name: String,
}

impl DocumentSource {
    pub fn new(
        key: impl Into<String>,
        namespace: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            namespace: namespace.into(),
            class_name: class_name.into(),
        }
    }

    /// Derive key and class name from a file path.
    pub fn from_path(path: &Path, namespace: impl Into<String>) -> Self {
        let key = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let class_name = crate::config::NamingStrategy::class_name(
            &crate::config::DefaultNamingStrategy,
            &stem,
            &Value::Null,
            false,
            "",
        );
        Self::new(key, namespace, class_name)
    }
}

/// Where a node being processed lives.
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    /// Document key `$ref`s without a document part resolve against.
    pub document: String,
    pub namespace: String,
    /// Class name of the enclosing type; empty at document level.
    pub class_name: String,
}

impl Scope {
    pub fn with_class(&self, class_name: &str) -> Self {
        Self {
            document: self.document.clone(),
            namespace: self.namespace.clone(),
            class_name: class_name.to_string(),
        }
    }
}

/// Resolves schema documents into one shared property graph.
#[derive(Debug)]
pub struct Generator {
    pub(crate) config: GeneratorConfig,
    pub(crate) graph: Graph,
    pub(crate) documents: DocumentStore,
    pub(crate) definitions: DefinitionCache,
    pub(crate) signatures: SignatureRegistry,
    pub(crate) diagnostics: Vec<Diagnostic>,
    class_names: HashSet<String>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            graph: Graph::new(),
            documents: DocumentStore::default(),
            definitions: DefinitionCache::default(),
            signatures: SignatureRegistry::default(),
            diagnostics: Vec::new(),
            class_names: HashSet::new(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Make a document available to `$ref`s without generating its root type.
    pub fn register_document(&mut self, source: &DocumentSource, document: Value) {
        self.documents
            .insert(&source.key, &source.namespace, Arc::new(document));
    }

    /// Read and process a JSON schema file.
    pub fn process_file(
        &mut self,
        path: &Path,
        namespace: &str,
    ) -> Result<SchemaId, crate::Error> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Value =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let source = DocumentSource::from_path(path, namespace);
        Ok(self.process_document(&source, document)?)
    }

    /// Resolve a document into its top-level schema.
    ///
    /// The document's root must describe an object, directly or through a
    /// `$ref` to an object schema.
    pub fn process_document(
        &mut self,
        source: &DocumentSource,
        document: Value,
    ) -> Result<SchemaId, DefinitionError> {
        tracing::debug!(document = %source.key, class = %source.class_name, "processing schema document");
        let document = Arc::new(document);
        self.documents
            .insert(&source.key, &source.namespace, Arc::clone(&document));

        let scope = Scope {
            document: source.key.clone(),
            namespace: source.namespace.clone(),
            class_name: String::new(),
        };

        // A root `$ref` within the same document makes the referenced
        // definition resolve to the root type.
        let (root_node, key) = match document.get("$ref").and_then(Value::as_str) {
            Some(reference) => {
                let (key, target) = self.resolve_pointer(&scope, reference)?;
                if !crate::factory::is_object_node(&target) {
                    return Err(DefinitionError::BaseReferenceNotObject {
                        reference: reference.to_string(),
                    });
                }
                let key = (key.document() == source.key).then_some(key);
                (target, key)
            }
            None => {
                let untyped = document.is_object() && document.get("type").is_none();
                if !untyped && !crate::factory::is_object_node(&document) {
                    return Err(DefinitionError::RootNotObject {
                        document: source.key.clone(),
                    });
                }
                (
                    document.as_ref().clone(),
                    Some(DefinitionKey::new(&source.key, "")),
                )
            }
        };

        let class_name = self.unique_class_name(&source.namespace, &source.class_name);
        let identity = SchemaIdentity::new(source.namespace.clone(), class_name.clone());
        let schema = self.graph.reserve_schema(identity, true);

        // The root is its own definition so `"$ref": "#"` closes the cycle.
        if let Some(key) = &key {
            self.definitions.insert(
                key.clone(),
                DefinitionState::InProgress {
                    schema: Some(schema),
                    placeholders: Vec::new(),
                },
            );
        }

        self.process_schema(&scope.with_class(&class_name), schema, &root_node)?;
        let schema = self.finalize_schema(schema);

        if let Some(key) = key {
            let property = self.object_property(&class_name, schema, true)?;
            self.complete_definition(key, property);
        }
        Ok(schema)
    }

    /// Reserve a class name, suffixing a counter when it is already taken in
    /// the namespace.
    pub(crate) fn unique_class_name(&mut self, namespace: &str, class_name: &str) -> String {
        let mut candidate = class_name.to_string();
        let mut counter = 1;
        while !self.class_names.insert(format!("{}\\{}", namespace, candidate)) {
            counter += 1;
            candidate = format!("{}_{}", class_name, counter);
        }
        candidate
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_warning() {
            tracing::warn!("{}", diagnostic);
        } else {
            tracing::info!("{}", diagnostic);
        }
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn class_names_are_unique_per_namespace() {
        let mut generator = Generator::default();
        assert_eq!(generator.unique_class_name("App", "Person"), "Person");
        assert_eq!(generator.unique_class_name("App", "Person"), "Person_2");
        assert_eq!(generator.unique_class_name("Other", "Person"), "Person");
    }

    #[test]
    fn document_source_from_path() {
        let source = DocumentSource::from_path(Path::new("schemas/user-profile.json"), "App");
        assert_eq!(source.key, "user-profile.json");
        assert_eq!(source.class_name, "UserProfile");
    }

    #[test]
    fn root_must_be_object_when_referenced() {
        let mut generator = Generator::default();
        let document = json!({
            "$ref": "#/definitions/name",
            "definitions": { "name": { "type": "string" } }
        });
        let err = generator
            .process_document(&DocumentSource::new("a.json", "", "A"), document)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::BaseReferenceNotObject { .. }));
    }

    #[test]
    fn root_must_describe_an_object() {
        let mut generator = Generator::default();
        for document in [json!({ "type": "string" }), json!(true), json!({ "type": ["object", "null"] })] {
            let err = generator
                .process_document(&DocumentSource::new("a.json", "", "A"), document)
                .unwrap_err();
            assert!(matches!(err, DefinitionError::RootNotObject { document } if document == "a.json"));
        }
    }

    #[test]
    fn root_reference_to_object_definition() {
        let mut generator = Generator::default();
        let document = json!({
            "$ref": "#/definitions/person",
            "definitions": {
                "person": {
                    "type": "object",
                    "properties": { "name": { "type": "string" } }
                }
            }
        });
        let schema = generator
            .process_document(&DocumentSource::new("a.json", "", "A"), document)
            .unwrap();
        let graph = generator.graph();
        assert_eq!(graph.schema(schema).identity().class_name, "A");
        assert!(graph.find_property(schema, "name").is_some());
    }
}
