//! Error types for Bastion.
//!
//! [`BastionError`] covers every way a request can be refused. Each variant
//! maps to an [`ErrorCategory`] and from there to an HTTP status code, and
//! renders the `{ "message", "details" }` wire envelope.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Result type alias using [`BastionError`].
pub type BastionResult<T> = Result<T, BastionError>;

/// Message of every 401 response.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
/// Details of every 401 response. Deliberately says nothing about the cause.
pub const MISSING_TOKEN_DETAILS: &str = "A valid authorisation token is missing";
/// Message for a general access denial.
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied to resource";
/// Message when the classified operation is not in the caller's set.
pub const AUTHORIZATION_REQUIRED_MESSAGE: &str = "Authorization required for this operation";
/// Message for an invalid license.
pub const INVALID_LICENSE_MESSAGE: &str = "License is not valid";

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing or invalid credential.
    Authentication,
    /// Authenticated but not permitted.
    Authorization,
    /// License is not valid.
    License,
    /// Resource not found.
    NotFound,
    /// Malformed input.
    Validation,
    /// Collaborator or internal failure.
    Internal,
}

impl ErrorCategory {
    /// Returns the HTTP status code for this category.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization | Self::License => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Bastion.
///
/// # Example
///
/// ```
/// use bastion_core::{BastionError, ErrorCategory};
///
/// let err = BastionError::access_denied("endpoint 4 is not shared with user 7");
/// assert_eq!(err.category(), ErrorCategory::Authorization);
/// assert_eq!(err.to_envelope().message, "Access denied to resource");
/// ```
#[derive(Error, Debug)]
pub enum BastionError {
    /// No usable credential, or the identity no longer exists.
    #[error("{}", UNAUTHORIZED_MESSAGE)]
    Unauthorized,

    /// Valid identity without access to the resource.
    #[error("{}", ACCESS_DENIED_MESSAGE)]
    AccessDenied {
        /// Diagnostic detail returned to the caller.
        details: String,
    },

    /// The classified operation is not granted to the caller.
    #[error("{}", AUTHORIZATION_REQUIRED_MESSAGE)]
    AuthorizationRequired {
        /// Diagnostic detail returned to the caller.
        details: String,
    },

    /// The license collaborator reported an invalid license.
    #[error("{}", INVALID_LICENSE_MESSAGE)]
    InvalidLicense,

    /// A referenced object does not exist.
    #[error("{message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// Diagnostic detail.
        details: String,
    },

    /// Malformed input.
    #[error("{message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// Diagnostic detail.
        details: String,
    },

    /// Internal lookup failure.
    #[error("{message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (logged, never serialized).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl BastionError {
    /// Creates a general access denial.
    pub fn access_denied(details: impl Into<String>) -> Self {
        Self::AccessDenied {
            details: details.into(),
        }
    }

    /// Creates an operation-level denial.
    pub fn authorization_required(details: impl Into<String>) -> Self {
        Self::AuthorizationRequired {
            details: details.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            details: details.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: details.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Maps a failed read of the authenticated identity.
    ///
    /// A vanished identity is an authentication failure; anything else is
    /// an internal failure.
    pub fn from_identity_lookup(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::Unauthorized
        } else {
            Self::internal_with_source("Unable to retrieve user details from the database", err)
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized => ErrorCategory::Authentication,
            Self::AccessDenied { .. } | Self::AuthorizationRequired { .. } => {
                ErrorCategory::Authorization
            }
            Self::InvalidLicense => ErrorCategory::License,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().status_code()
    }

    /// Renders the wire envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let details = match self {
            Self::Unauthorized => MISSING_TOKEN_DETAILS.to_string(),
            Self::AccessDenied { details }
            | Self::AuthorizationRequired { details }
            | Self::NotFound { details, .. }
            | Self::Validation { details, .. } => details.clone(),
            Self::InvalidLicense => INVALID_LICENSE_MESSAGE.to_string(),
            Self::Internal { message, .. } => message.clone(),
        };
        ErrorEnvelope {
            message: self.to_string(),
            details,
        }
    }
}

impl From<StoreError> for BastionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::not_found("Object not found", what),
            StoreError::Unavailable(_) => {
                Self::internal_with_source("Unable to reach the data store", err)
            }
        }
    }
}

/// JSON body of every failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Short human-readable message.
    pub message: String,
    /// Diagnostic detail.
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BastionError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            BastionError::access_denied("x").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            BastionError::authorization_required("x").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(BastionError::InvalidLicense.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            BastionError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_envelope_hides_cause() {
        let envelope = BastionError::Unauthorized.to_envelope();
        assert_eq!(envelope.message, "Unauthorized");
        assert_eq!(envelope.details, "A valid authorisation token is missing");
    }

    #[test]
    fn test_denials_have_distinct_messages() {
        let denied = BastionError::access_denied("d").to_envelope();
        let required = BastionError::authorization_required("d").to_envelope();
        assert_ne!(denied.message, required.message);
        assert_eq!(required.message, AUTHORIZATION_REQUIRED_MESSAGE);
    }

    #[test]
    fn test_internal_source_not_serialized() {
        let err = BastionError::internal_with_source(
            "Unable to retrieve user memberships",
            StoreError::unavailable("connection refused"),
        );
        let json = serde_json::to_string(&err.to_envelope()).unwrap();
        assert!(!json.contains("connection refused"));
    }

    #[test]
    fn test_identity_lookup_mapping() {
        assert!(matches!(
            BastionError::from_identity_lookup(StoreError::not_found("user 4")),
            BastionError::Unauthorized
        ));
        assert_eq!(
            BastionError::from_identity_lookup(StoreError::unavailable("down")).category(),
            ErrorCategory::Internal
        );
    }
}
