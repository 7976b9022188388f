//! API key errors.

use bastion_core::{BastionError, StoreError, UserId};
use thiserror::Error;

/// Result type for API key operations.
pub type ApiKeyResult<T> = Result<T, ApiKeyError>;

/// Errors raised by the API key service.
#[derive(Debug, Error)]
pub enum ApiKeyError {
    /// No key matches the identifier or digest.
    #[error("API key not found")]
    NotFound,

    /// The key exists but its owner does not.
    #[error("owner {0} of API key not found")]
    OwnerNotFound(UserId),

    /// The repository failed.
    #[error("API key store error: {0}")]
    Store(#[source] StoreError),
}

impl ApiKeyError {
    /// Whether the failure means "no such credential".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound | Self::OwnerNotFound(_))
    }
}

impl From<StoreError> for ApiKeyError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else {
            Self::Store(err)
        }
    }
}

impl From<ApiKeyError> for BastionError {
    fn from(err: ApiKeyError) -> Self {
        match err {
            ApiKeyError::NotFound | ApiKeyError::OwnerNotFound(_) => {
                Self::not_found("Unable to find an API key", err.to_string())
            }
            ApiKeyError::Store(_) => {
                Self::internal_with_source("Unable to retrieve API key from the database", err)
            }
        }
    }
}
