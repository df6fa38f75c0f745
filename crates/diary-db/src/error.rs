use thiserror::Error;

/// Error type for data-access operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Malformed or empty filter/data argument. Raised before any I/O.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Statement, connection, or transaction-control failure.
    #[error("Database error: {0}")]
    Execution(#[from] sqlx::Error),
}

impl DbError {
    pub fn validation(message: impl Into<String>) -> Self {
        DbError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DbError::Validation(_))
    }
}

pub type DbResult<T> = Result<T, DbError>;
