use uuid::Uuid;

use crate::storage::StoreError;
use crate::validation::{FieldErrorKind, ValidationErrors};

/// Outcome of a failed model operation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("storage error: {0}")]
    Store(#[source] anyhow::Error),
    #[error("password hashing failed: {0}")]
    Password(#[source] anyhow::Error),
}

impl ModelError {
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ValidationErrors> for ModelError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<StoreError> for ModelError {
    /// Unique-constraint failures become a field error of the same shape as
    /// any other validation failure.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { field } => Self::Validation(ValidationErrors::single(
                field,
                FieldErrorKind::Unique,
                format!("{field} already exists. Please choose another."),
            )),
            StoreError::Backend(e) => Self::Store(e),
        }
    }
}
