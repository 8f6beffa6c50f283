//! Emission backends.
//!
//! An [`Emitter`] renders one generated schema of a [`Graph`] into text. The
//! crate ships two: [`OutlineEmitter`], a deterministic plain-text outline
//! meant for review and snapshot tests, and [`JsonEmitter`], which serializes
//! the same information for tooling.
//!
//! # Implementing custom emitters
//!
//! ```ignore
//! use schemagen::emit::Emitter;
//! use schemagen::model::{Graph, SchemaId};
//!
//! struct PhpEmitter;
//!
//! impl Emitter for PhpEmitter {
//!     fn name(&self) -> &'static str { "php" }
//!     fn extension(&self) -> &'static str { "php" }
//!     fn emit(&self, graph: &Graph, schema: SchemaId) -> String { /* ... */ }
//! }
//! ```

mod json;
mod outline;

pub use json::JsonEmitter;
pub use outline::OutlineEmitter;

use crate::model::{Graph, SchemaId};

/// Renders a generated schema.
pub trait Emitter: Send + Sync {
    /// Unique emitter identifier (e.g. "outline", "json").
    fn name(&self) -> &'static str;

    /// File extension for emitted files.
    fn extension(&self) -> &'static str;

    /// Render `schema` and everything it needs from `graph`.
    fn emit(&self, graph: &Graph, schema: SchemaId) -> String;
}

static OUTLINE: OutlineEmitter = OutlineEmitter;
static JSON: JsonEmitter = JsonEmitter;

/// Built-in emitters.
pub fn builtin_emitters() -> [&'static dyn Emitter; 2] {
    [&OUTLINE, &JSON]
}

/// Get a built-in emitter by name.
pub fn get_emitter(name: &str) -> Option<&'static dyn Emitter> {
    builtin_emitters()
        .into_iter()
        .find(|emitter| emitter.name() == name)
}

/// Names of the built-in emitters.
pub fn emitter_names() -> Vec<&'static str> {
    builtin_emitters().iter().map(|emitter| emitter.name()).collect()
}
