use backoffice_core::code::CodeError;
use backoffice_core::error::CoreError;

/// Failures raised by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A sequential code was taken between computing and inserting it.
    #[error("sequential code {0} is already taken")]
    Conflict(String),

    /// A login account with this e-mail already exists.
    #[error("account e-mail {0} is already in use")]
    DuplicateIdentifier(String),

    /// A referenced row (usually a branch) does not exist.
    #[error("{entity} {reference} does not exist")]
    MissingReference {
        entity: &'static str,
        reference: String,
    },

    /// No more codes can be issued for a kind.
    #[error(transparent)]
    Code(#[from] CodeError),

    /// A stored row could not be decoded into a domain value.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(code) => {
                CoreError::Conflict(format!("Sequential code {code} is already taken"))
            }
            StoreError::DuplicateIdentifier(email) => {
                CoreError::DuplicateIdentifier(format!("Email {email} is already in use"))
            }
            StoreError::MissingReference { entity, reference } => {
                CoreError::Validation(format!("{entity} {reference} does not exist"))
            }
            StoreError::Code(code) => code.into(),
            StoreError::Corrupt(msg) => CoreError::Internal(format!("Corrupt row: {msg}")),
            StoreError::Database(err) => CoreError::Internal(format!("Database error: {err}")),
        }
    }
}

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Classify a sqlx error by the constraint it violated.
///
/// - `uq_members_member_number` / `uq_employees_employee_number` become
///   [`StoreError::Conflict`] so callers can retry with a fresh code.
/// - `uq_users_email` becomes [`StoreError::DuplicateIdentifier`].
/// - Foreign key violations become [`StoreError::MissingReference`].
pub(crate) fn classify(err: sqlx::Error, code: &str, email: Option<&str>) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default();
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => match constraint {
                "uq_members_member_number" | "uq_employees_employee_number" => {
                    return StoreError::Conflict(code.to_string());
                }
                "uq_users_email" => {
                    return StoreError::DuplicateIdentifier(email.unwrap_or_default().to_string());
                }
                _ => {}
            },
            Some(FOREIGN_KEY_VIOLATION) => {
                return StoreError::MissingReference {
                    entity: "Branch",
                    reference: constraint.to_string(),
                };
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}
