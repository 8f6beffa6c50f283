//! Declared property types.

use serde::Serialize;
use std::fmt;

/// Tri-state nullability of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Nullability {
    /// No statement was made; emitters decide from the required flag.
    #[default]
    Unknown,
    Nullable,
    NonNullable,
}

/// A type label attached to a property.
///
/// Primitive types use their JSON Schema keyword (`string`, `integer`, ...);
/// nested objects use the generated class name. Multi-type properties carry
/// every member name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyType {
    names: Vec<String>,
    nullability: Nullability,
}

impl PropertyType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            nullability: Nullability::Unknown,
        }
    }

    /// A union of several type names. Duplicates are dropped, order is kept.
    pub fn union<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self {
            names: unique,
            nullability: Nullability::Unknown,
        }
    }

    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = nullability;
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn nullability(&self) -> Nullability {
        self.nullability
    }

    pub fn is_union(&self) -> bool {
        self.names.len() > 1
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join("|"))?;
        if self.nullability == Nullability::Nullable && !self.contains("null") {
            f.write_str("|null")?;
        }
        Ok(())
    }
}
