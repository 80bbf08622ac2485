//! Error and diagnostic types.

use std::fmt;

use fpp_ast::AstError;
use thiserror::Error;

/// Failures that abort a whole translation run.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// No translation units were supplied.
    #[error("no translation units to translate")]
    NoInput,

    /// The units carry neither declarations nor tokens.
    #[error("no declarations or tokens found in {units} translation unit(s)")]
    NoDeclarations { units: usize },

    /// A unit breaks the arena invariants (dangling links, cycles).
    #[error("translation unit {unit} is malformed")]
    InvalidAst {
        unit: usize,
        #[source]
        source: AstError,
    },
}

/// Non-fatal degradations recorded while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// The declaration has no body; it rendered as `...`.
    UnresolvedDefinition,
    /// Text was emitted with an approximation tag.
    UnmappableConstruct,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::UnresolvedDefinition => f.write_str("unresolved definition"),
            IssueKind::UnmappableConstruct => f.write_str("unmappable construct"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: IssueKind,
    /// `Class.method` (or just the function name) the issue belongs to.
    pub declaration: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.declaration, self.kind, self.message)
    }
}
