//! Failure kinds raised by generated checks.

use serde::Serialize;
use std::fmt;

/// The kind of error a generated check reports when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    RequiredMissing,
    TypeMismatch,
    RangeViolation,
    LengthViolation,
    PatternMismatch,
    EnumViolation,
    ItemViolation,
    /// Carries a per-branch breakdown.
    CompositionViolation,
    ConditionalViolation,
    AdditionalPropertyViolation,
    PropertyNameViolation,
    DependencyViolation,
    NestedObjectViolation,
    FilterViolation,
    Custom,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::RequiredMissing => "RequiredMissing",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::RangeViolation => "RangeViolation",
            ErrorKind::LengthViolation => "LengthViolation",
            ErrorKind::PatternMismatch => "PatternMismatch",
            ErrorKind::EnumViolation => "EnumViolation",
            ErrorKind::ItemViolation => "ItemViolation",
            ErrorKind::CompositionViolation => "CompositionViolation",
            ErrorKind::ConditionalViolation => "ConditionalViolation",
            ErrorKind::AdditionalPropertyViolation => "AdditionalPropertyViolation",
            ErrorKind::PropertyNameViolation => "PropertyNameViolation",
            ErrorKind::DependencyViolation => "DependencyViolation",
            ErrorKind::NestedObjectViolation => "NestedObjectViolation",
            ErrorKind::FilterViolation => "FilterViolation",
            ErrorKind::Custom => "Custom",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
