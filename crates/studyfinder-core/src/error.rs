//! Error types for the StudyFinder system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinderError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Already a member of this study group")]
    AlreadyMember,

    #[error("Not a member of this study group")]
    NotMember,

    #[error("Store unavailable: {0}")]
    Store(String),
}

impl FinderError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

pub type FinderResult<T> = Result<T, FinderError>;
