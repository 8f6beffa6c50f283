//! Non-fatal notes produced while processing schemas.

use serde::Serialize;
use std::fmt;

/// Something worth reporting that does not stop processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "diagnostic", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// A structurally identical schema already existed; `from` is generated as `to`.
    SchemaRedirected { from: String, to: String },
    /// A composition keyword with no branches; it can never pass.
    EmptyComposition { keyword: String, property: String },
    /// `if` without `then` or `else` has no effect.
    IneffectiveConditional { property: String },
}

impl Diagnostic {
    pub fn is_warning(&self) -> bool {
        !matches!(self, Diagnostic::SchemaRedirected { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SchemaRedirected { from, to } => {
                write!(f, "Duplicated signature {} redirected to {}", from, to)
            }
            Diagnostic::EmptyComposition { keyword, property } => write!(
                f,
                "Empty {} composition for property {} will always fail",
                keyword, property
            ),
            Diagnostic::IneffectiveConditional { property } => write!(
                f,
                "Conditional composition for property {} has neither then nor else",
                property
            ),
        }
    }
}
