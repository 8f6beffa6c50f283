//! The property graph produced by schema processing.
//!
//! Downstream consumers (emitters, post-processors) read this graph; it is
//! only mutated by the crate while a document is being processed.

mod graph;
mod kind;
mod property;
mod property_type;
mod schema;

pub use graph::Graph;
pub use kind::JsonKind;
pub use property::{Decorator, Property, PropertyId, generated_identifier};
pub use property_type::{Nullability, PropertyType};
pub use schema::{Schema, SchemaId, SchemaIdentity};
