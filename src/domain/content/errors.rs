//! Errors raised while resolving content access.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, PostId};

#[derive(Debug, Clone, Error)]
pub enum AccessError {
    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl AccessError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AccessError::PostNotFound(_) => ErrorCode::PostNotFound,
            AccessError::Malformed(_) => ErrorCode::ValidationFailed,
            AccessError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }
}

impl From<DomainError> for AccessError {
    fn from(err: DomainError) -> Self {
        AccessError::Infrastructure(err.to_string())
    }
}
