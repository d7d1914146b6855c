use crate::code::CodeError;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Employee {0} has already resigned")]
    AlreadyResigned(String),

    #[error("Sequential code space exhausted for prefix {prefix}")]
    CapacityExceeded { prefix: char },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CodeError> for CoreError {
    fn from(err: CodeError) -> Self {
        match err {
            CodeError::CapacityExceeded { prefix } => CoreError::CapacityExceeded { prefix },
            CodeError::OutOfRange { .. } => CoreError::Internal(err.to_string()),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
