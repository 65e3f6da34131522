//! Database-specific error types and conversions.

use studyfinder_core::FinderError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique index violated: {0}")]
    UniqueViolation(String),

    #[error("Failed to decode row: {0}")]
    Decode(String),
}

impl DbError {
    /// Classify a SurrealDB error, picking out unique-index violations
    /// so callers can treat them as the authoritative conflict signal.
    pub fn classify(err: surrealdb::Error) -> Self {
        let text = err.to_string();
        if text.contains("already contains") {
            DbError::UniqueViolation(text)
        } else {
            DbError::Surreal(err)
        }
    }
}

impl From<DbError> for FinderError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => FinderError::NotFound { entity, id },
            DbError::UniqueViolation(detail) => FinderError::Conflict { message: detail },
            other => FinderError::Store(other.to_string()),
        }
    }
}
