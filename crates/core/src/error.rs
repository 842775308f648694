//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// conflicts, missing records). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Client supplied malformed or missing input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A requested resource was not found.
    #[error("not found")]
    NotFound,

    /// A uniqueness rule was violated (e.g. username already taken).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn missing(fields: impl IntoIterator<Item = &'static str>) -> Self {
        Self::Validation(ValidationError::MissingFields(fields.into_iter().collect()))
    }

    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation(ValidationError::Malformed {
            field,
            reason: reason.into(),
        })
    }
}

/// Why an input was rejected.
///
/// Missing fields and malformed fields are separate variants so callers can
/// tell "you forgot the amount" apart from "the amount is not a number".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid {field}: {reason}")]
    Malformed { field: &'static str, reason: String },
}

impl ValidationError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingFields(_) => "missing_fields",
            ValidationError::Malformed { .. } => "invalid_field",
        }
    }
}
