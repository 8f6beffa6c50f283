//! JSON Schema resolution and composition for code generation.
//!
//! `schemagen` turns JSON Schema documents into a graph of generated types:
//! every object schema becomes a [`model::Schema`] holding ordered
//! [`model::Property`] records, and every property carries the priority-ordered
//! [`validator::Validator`]s generated code has to run.
//!
//! # Architecture
//!
//! ```text
//! Documents            Generator                      Consumers
//! ─────────────     ───────────────────────────     ─────────────────
//! JSON Schema  ─┐   resolver ($ref, cycles)     ┌─> emit (outline, json)
//! JSON Schema  ─┼─> factory (type builders) ────┼─> eval (reference checks)
//!              ─┘   composition, dedup          └─> custom Emitter
//! ```
//!
//! # Example
//!
//! ```
//! use schemagen::{DocumentSource, Generator};
//! use schemagen::emit::{Emitter, OutlineEmitter};
//!
//! let document = serde_json::json!({
//!     "type": "object",
//!     "properties": {
//!         "id": { "type": "integer" },
//!         "email": { "type": "string", "pattern": "@" }
//!     },
//!     "required": ["id"]
//! });
//!
//! let mut generator = Generator::default();
//! let schema = generator
//!     .process_document(&DocumentSource::new("user.json", "App", "User"), document)
//!     .unwrap();
//!
//! let outline = OutlineEmitter.emit(generator.graph(), schema);
//! assert!(outline.starts_with("class App\\User"));
//! ```
//!
//! # Feature Flags
//!
//! - `cli` - the `schemagen` binary

pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod eval;
pub mod filter;
pub mod generator;
pub mod model;
pub mod resolver;
pub mod validator;

mod composition;
pub(crate) mod factory;
mod processor;

pub use config::{DefaultNamingStrategy, GeneratorConfig, NamingStrategy, Settings};
pub use diagnostics::Diagnostic;
pub use emit::{Emitter, JsonEmitter, OutlineEmitter, get_emitter};
pub use error::{ConfigError, DefinitionError, Error};
pub use eval::{ErrorReport, Evaluation, Evaluator, Mode, Violation};
pub use filter::FilterRegistry;
pub use generator::{DocumentSource, Generator};
pub use model::{Graph, Property, PropertyId, Schema, SchemaId};
pub use validator::{Check, ErrorKind, Validator, ValidatorList};
