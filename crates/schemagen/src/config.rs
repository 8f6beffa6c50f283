//! Generator configuration.
//!
//! Settings are read from `.schemagen/config.toml`:
//! ```toml
//! # Optional properties accept an explicit null without listing "null" in `type`.
//! implicit_null = true
//! # Collect every violation instead of stopping at the first one.
//! collect_errors = true
//! ```

use crate::error::ConfigError;
use crate::filter::FilterRegistry;
use crate::model::generated_identifier;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Serializable run settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(default)]
pub struct Settings {
    /// Optional properties accept `null` even if `null` is not a listed type.
    pub implicit_null: bool,
    /// Generated checks collect every violation instead of failing fast.
    pub collect_errors: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            implicit_null: true,
            collect_errors: true,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `.schemagen/config.toml` below `root`, or defaults if it is missing.
    pub fn load_or_default(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(".schemagen").join("config.toml");
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Decides the class name of every nested type the generator materializes.
pub trait NamingStrategy: Send + Sync {
    /// Name for the type built from `node`, found under `property_name` in
    /// the type `current_class` (empty for document roots). `is_merge_class`
    /// is set for object-level composition branches.
    fn class_name(
        &self,
        property_name: &str,
        node: &Value,
        is_merge_class: bool,
        current_class: &str,
    ) -> String;
}

/// `Parent_Property<hash>` names, using `$id` or `title` when present.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamingStrategy;

impl NamingStrategy for DefaultNamingStrategy {
    fn class_name(
        &self,
        property_name: &str,
        node: &Value,
        is_merge_class: bool,
        current_class: &str,
    ) -> String {
        let base = node
            .get("$id")
            .and_then(Value::as_str)
            .map(id_base)
            .or_else(|| node.get("title").and_then(Value::as_str))
            .unwrap_or(property_name);
        let base = pascal_case(base);

        if current_class.is_empty() {
            return base;
        }

        let hash = blake3::hash(node.to_string().as_bytes()).to_hex();
        let hash = &hash.as_str()[..8];
        if is_merge_class {
            format!("{}_Merged_{}{}", current_class, base, hash)
        } else {
            format!("{}_{}{}", current_class, base, hash)
        }
    }
}

/// File stem of an `$id` such as `https://example.com/person.json#`.
fn id_base(id: &str) -> &str {
    let id = id.trim_end_matches('#');
    let last = id.rsplit('/').next().unwrap_or(id);
    last.split('.').next().unwrap_or(last)
}

fn pascal_case(name: &str) -> String {
    let identifier = generated_identifier(name).unwrap_or_else(|_| "Type".to_string());
    let identifier = identifier.trim_start_matches('_');
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Type".to_string(),
    }
}

/// Everything a generator run reads: settings, filters, and naming.
pub struct GeneratorConfig {
    pub settings: Settings,
    pub filters: FilterRegistry,
    pub naming: Box<dyn NamingStrategy>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl GeneratorConfig {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            filters: FilterRegistry::default(),
            naming: Box::new(DefaultNamingStrategy),
        }
    }

    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_naming(mut self, naming: impl NamingStrategy + 'static) -> Self {
        self.naming = Box::new(naming);
        self
    }

    pub fn implicit_null(&self) -> bool {
        self.settings.implicit_null
    }

    pub fn collect_errors(&self) -> bool {
        self.settings.collect_errors
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("settings", &self.settings)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}
