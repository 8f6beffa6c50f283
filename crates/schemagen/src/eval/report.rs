//! Violations collected while evaluating a value.

use crate::validator::ErrorKind;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Property name, or the class name for object-wide checks.
    pub property: String,
    pub kind: ErrorKind,
    pub message: String,
    /// Build-time and runtime message parameters.
    pub params: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Detail>,
}

/// A labelled group of nested violations: one composition branch, one
/// invalid array item, ...
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detail {
    pub label: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl Detail {
    pub(crate) fn failed(label: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            label: label.into(),
            passed: false,
            violations,
        }
    }
}

impl Violation {
    /// This violation's message followed by every nested one, depth first.
    pub fn all_messages(&self) -> Vec<String> {
        let mut messages = vec![self.message.clone()];
        for detail in &self.details {
            for violation in &detail.violations {
                messages.extend(violation.all_messages());
            }
        }
        messages
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.message, indent = depth * 4)?;
        for detail in &self.details {
            writeln!(f, "{:indent$}- {}", "", detail.label, indent = depth * 4 + 2)?;
            for violation in &detail.violations {
                violation.write_indented(f, depth + 1)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Every violation of one evaluation, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorReport {
    violations: Vec<Violation>,
}

impl ErrorReport {
    pub(crate) fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub(crate) fn extend(&mut self, violations: impl IntoIterator<Item = Violation>) {
        self.violations.extend(violations);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    /// Violations grouped by property, properties in first-seen order.
    pub fn by_property(&self) -> Vec<(&str, Vec<&Violation>)> {
        let mut groups: Vec<(&str, Vec<&Violation>)> = Vec::new();
        for violation in &self.violations {
            match groups
                .iter_mut()
                .find(|(property, _)| *property == violation.property)
            {
                Some((_, group)) => group.push(violation),
                None => groups.push((&violation.property, vec![violation])),
            }
        }
        groups
    }

    pub fn for_property(&self, property: &str) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|violation| violation.property == property)
            .collect()
    }

    /// Top-level messages.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.message.clone()).collect()
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}
