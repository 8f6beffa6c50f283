//! Priority-ordered validators attached to properties and schemas.
//!
//! Every [`Validator`] wraps one [`Check`] together with its execution
//! priority, failure kind, and message parameters. [`ValidatorList`] keeps
//! them ordered by priority, ties broken by attachment order, so consumers can
//! run them front to back.

mod check;
mod error_kind;

pub use check::{Check, CompositionBranch, CompositionKind, Pattern, Predicate};
pub use error_kind::ErrorKind;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use serde_json::{Map, Value};

/// Presence check.
pub const PRIORITY_REQUIRED: u32 = 1;
/// Type check.
pub const PRIORITY_TYPE: u32 = 2;
/// Enum and const checks.
pub const PRIORITY_ENUM: u32 = 3;
/// Filters transform the value before the remaining checks see it.
pub const PRIORITY_FILTER: u32 = 10;
pub const PRIORITY_DEFAULT: u32 = 99;

/// One runtime check with its failure metadata.
#[derive(Debug, Clone)]
pub struct Validator {
    check: Check,
    priority: u32,
    kind: ErrorKind,
    params: Map<String, Value>,
}

impl Validator {
    /// Wrap a check using its default priority.
    pub fn new(check: Check) -> Self {
        let priority = check.default_priority();
        Self::with_priority(check, priority)
    }

    pub fn with_priority(check: Check, priority: u32) -> Self {
        Self {
            kind: check.error_kind(),
            params: check.params(),
            check,
            priority,
        }
    }

    pub fn check(&self) -> &Check {
        &self.check
    }

    /// Change the check in place. Kind and message parameters are derived
    /// again from the changed check.
    pub(crate) fn map_check(&mut self, change: impl FnOnce(&mut Check)) {
        change(&mut self.check);
        self.kind = self.check.error_kind();
        self.params = self.check.params();
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn template(&self) -> &'static str {
        self.check.template()
    }

    pub fn describe(&self) -> String {
        self.check.describe()
    }

    /// Render the failure message for `property`.
    ///
    /// `runtime` holds values only known when the check runs (the actual
    /// type, the matched branch count, ...). They take precedence over
    /// build-time parameters of the same name.
    pub fn message(&self, property: &str, runtime: &Map<String, Value>) -> String {
        let mut message = self.template().replace("{property}", property);
        for (key, value) in self.params.iter().chain(runtime.iter()) {
            let placeholder = format!("{{{}}}", key);
            if message.contains(&placeholder) {
                message = message.replace(&placeholder, &render_param(value));
            }
        }
        message
    }
}

fn render_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render_param).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

impl Serialize for Validator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Validator", 5)?;
        state.serialize_field("check", &self.describe())?;
        state.serialize_field("priority", &self.priority)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("template", self.template())?;
        state.serialize_field("params", &self.params)?;
        state.end()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    sequence: u64,
    validator: Validator,
}

/// Validators ordered by ascending priority, then attachment order.
#[derive(Debug, Clone, Default)]
pub struct ValidatorList {
    entries: Vec<Entry>,
    next_sequence: u64,
}

impl ValidatorList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping the list ordered. A validator goes after every existing
    /// validator of the same priority.
    pub fn add(&mut self, validator: Validator) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let at = self
            .entries
            .partition_point(|entry| entry.validator.priority <= validator.priority);
        self.entries.insert(
            at,
            Entry {
                sequence,
                validator,
            },
        );
    }

    pub fn iter(&self) -> impl Iterator<Item = &Validator> {
        self.entries.iter().map(|entry| &entry.validator)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Validator> {
        self.entries.iter_mut().map(|entry| &mut entry.validator)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-establish ordering. Sorting an ordered list changes nothing.
    pub fn sort(&mut self) {
        self.entries
            .sort_by_key(|entry| (entry.validator.priority, entry.sequence));
    }

    /// Keep only validators matching `keep`, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&Validator) -> bool) {
        self.entries.retain(|entry| keep(&entry.validator));
    }

    pub fn remove_required(&mut self) {
        self.retain(|validator| !matches!(validator.check(), Check::Required));
    }

    pub fn has_required(&self) -> bool {
        self.iter().any(|v| matches!(v.check(), Check::Required))
    }

    pub fn find(&self, mut predicate: impl FnMut(&Check) -> bool) -> Option<&Validator> {
        self.iter().find(|v| predicate(v.check()))
    }

    pub fn priorities(&self) -> Vec<u32> {
        self.iter().map(Validator::priority).collect()
    }

    /// Append every validator of `other` in its order.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Validator>) {
        for validator in other {
            self.add(validator);
        }
    }
}

impl Serialize for ValidatorList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
