//! Build errors.

use nodegql_core::DiagnosticBag;
use nodegql_model::ValidationError;
use nodegql_schema::SchemaBuildError;
use thiserror::Error;

/// Why a schema build failed.
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    /// The type definitions do not parse.
    #[error("type definitions contain {} syntax error(s)", .0.error_count())]
    Parse(DiagnosticBag),

    /// The type definitions parse but describe an invalid model.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Augmentation produced an inconsistent type graph.
    #[error("schema build failed: {0}")]
    Schema(#[from] SchemaBuildError),
}

impl BuildError {
    /// The collected diagnostics, for parse and validation failures.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&DiagnosticBag> {
        match self {
            Self::Parse(diagnostics) => Some(diagnostics),
            Self::Validation(error) => Some(&error.diagnostics),
            Self::Schema(_) => None,
        }
    }
}
