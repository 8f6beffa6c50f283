//! Schemas: the full definition behind one generated type.

use super::property::PropertyId;
use crate::resolver::dedup::Signature;
use crate::validator::ValidatorList;
use serde::Serialize;
use std::fmt;

/// Stable key of a [`Schema`] inside a [`Graph`](super::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a generated type lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SchemaIdentity {
    /// Namespace, usually derived from the source document's location.
    pub namespace: String,
    pub class_name: String,
}

impl SchemaIdentity {
    pub fn new(namespace: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            class_name: class_name.into(),
        }
    }

    /// Namespace-qualified name, used for imports.
    pub fn qualified(&self) -> String {
        if self.namespace.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}\\{}", self.namespace, self.class_name)
        }
    }
}

impl fmt::Display for SchemaIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// One generated type.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) identity: SchemaIdentity,
    pub(crate) description: Option<String>,
    pub(crate) properties: Vec<PropertyId>,
    pub(crate) base_validators: ValidatorList,
    pub(crate) signature: Option<Signature>,
    pub(crate) redirect: Option<SchemaId>,
    pub(crate) root: bool,
}

impl Schema {
    pub(crate) fn new(identity: SchemaIdentity, root: bool) -> Self {
        Self {
            identity,
            description: None,
            properties: Vec::new(),
            base_validators: ValidatorList::new(),
            signature: None,
            redirect: None,
            root,
        }
    }

    pub fn identity(&self) -> &SchemaIdentity {
        &self.identity
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[PropertyId] {
        &self.properties
    }

    /// Object-wide validators (additional properties, dependencies, compositions...).
    pub fn base_validators(&self) -> &ValidatorList {
        &self.base_validators
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// The schema this one was collapsed into, if it was a duplicate.
    pub fn redirect(&self) -> Option<SchemaId> {
        self.redirect
    }

    /// Whether this schema is the top-level type of a document.
    pub fn is_root(&self) -> bool {
        self.root
    }
}
