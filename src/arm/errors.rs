//! Error types for resource operations.
//!
//! [`ArmError`] is the error every resource wrapper, pager, and long-running
//! operation returns. HTTP failures are flattened so callers match on
//! [`ArmError::RequestFailed`] directly instead of digging through the
//! pipeline's error type.
//!
//! # Example
//!
//! ```rust,ignore
//! use azure_api::arm::ArmError;
//!
//! match deployment.get().await {
//!     Ok(response) => println!("Found: {}", response.id()),
//!     Err(ArmError::RequestFailed(e)) if e.code == 404 => println!("missing"),
//!     Err(ArmError::OperationFailed(e)) => println!("{}: {}", e.state, e.message),
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```

use crate::arm::operation::OperationState;
use crate::clients::{HttpError, HttpResponseError, InvalidHttpRequestError};
use thiserror::Error;

/// A long-running operation reached a failed or canceled terminal state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Long-running operation {state}. ErrorCode: {}, Message: {message}", .error_code.as_deref().unwrap_or("none"))]
pub struct OperationFailedError {
    /// The terminal state (`Failed` or `Canceled`).
    pub state: OperationState,
    /// Service error code from the status body, if any.
    pub error_code: Option<String>,
    /// Service error message, or a generic description.
    pub message: String,
    /// `x-ms-request-id` of the response that reported the failure.
    pub request_id: Option<String>,
}

/// Error type for resource operations.
#[derive(Debug, Error)]
pub enum ArmError {
    /// A required argument was empty or malformed. Raised before any I/O.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// The argument name.
        name: &'static str,
        /// Why the argument was rejected.
        reason: String,
    },

    /// A resource id string could not be parsed.
    #[error("Invalid resource id '{id}': {reason}")]
    InvalidResourceId {
        /// The rejected id.
        id: String,
        /// Why the id was rejected.
        reason: String,
    },

    /// A resource id points at a different resource type than expected.
    #[error("Invalid resource type {actual}, expected {expected}")]
    TypeMismatch {
        /// The type the id resolves to.
        actual: String,
        /// The type the caller expected.
        expected: String,
    },

    /// The resource has no path for the requested operation.
    #[error("{resource} does not support the '{operation}' operation")]
    OperationNotSupported {
        /// The resource name.
        resource: &'static str,
        /// The operation name.
        operation: String,
    },

    /// The service returned a non-success status.
    #[error(transparent)]
    RequestFailed(HttpResponseError),

    /// A response body was malformed or violated its schema.
    #[error("Invalid payload for {target}: {reason}")]
    InvalidPayload {
        /// What was being deserialized.
        target: String,
        /// The parser's description of the problem.
        reason: String,
    },

    /// A long-running operation ended in `Failed` or `Canceled`.
    #[error(transparent)]
    OperationFailed(#[from] OperationFailedError),

    /// A get returned no payload.
    #[error("{resource} '{id}' not found")]
    NotFound {
        /// The resource name.
        resource: &'static str,
        /// The requested id.
        id: String,
    },

    /// The caller canceled the wait. The server-side operation is unaffected.
    #[error("The wait was canceled before the operation completed")]
    Canceled,

    /// A transport-level failure (network, retries exhausted, credential).
    #[error(transparent)]
    Http(HttpError),

    /// The blocking adapter could not start its runtime.
    #[error("Failed to start blocking runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl From<HttpError> for ArmError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Response(e) => Self::RequestFailed(e),
            other => Self::Http(other),
        }
    }
}

impl From<InvalidHttpRequestError> for ArmError {
    fn from(error: InvalidHttpRequestError) -> Self {
        Self::Http(HttpError::InvalidRequest(error))
    }
}

impl ArmError {
    /// Builds an [`ArmError::InvalidPayload`] from a serde error.
    #[must_use]
    pub fn invalid_payload(target: impl Into<String>, error: &serde_json::Error) -> Self {
        Self::InvalidPayload {
            target: target.into(),
            reason: error.to_string(),
        }
    }

    /// Returns the `x-ms-request-id` of the failing response, if available.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::RequestFailed(e) => e.request_id.as_deref(),
            Self::OperationFailed(e) => e.request_id.as_deref(),
            Self::Http(e) => e.request_id(),
            _ => None,
        }
    }

    /// Returns the HTTP status of the failing response, if available.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed(e) => Some(e.code),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_error() -> HttpResponseError {
        HttpResponseError {
            code: 409,
            message: "Conflict".to_string(),
            error_code: Some("Conflict".to_string()),
            raw_body: "{}".to_string(),
            request_id: Some("req-9".to_string()),
        }
    }

    #[test]
    fn test_http_response_error_flattens_to_request_failed() {
        let error: ArmError = HttpError::Response(response_error()).into();
        assert!(matches!(error, ArmError::RequestFailed(ref e) if e.code == 409));
        assert_eq!(error.request_id(), Some("req-9"));
        assert_eq!(error.status(), Some(409));
    }

    #[test]
    fn test_other_http_errors_stay_wrapped() {
        let error: ArmError = HttpError::InvalidRequest(InvalidHttpRequestError::EmptyPath).into();
        assert!(matches!(error, ArmError::Http(_)));
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_operation_failed_message() {
        let error = ArmError::from(OperationFailedError {
            state: OperationState::Failed,
            error_code: Some("QuotaExceeded".to_string()),
            message: "Not enough cores".to_string(),
            request_id: None,
        });
        let message = error.to_string();
        assert!(message.contains("Failed"));
        assert!(message.contains("QuotaExceeded"));
        assert!(message.contains("Not enough cores"));
    }

    #[test]
    fn test_invalid_argument_message() {
        let error = ArmError::InvalidArgument {
            name: "key",
            reason: "cannot be empty".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid argument 'key': cannot be empty");
    }

    #[test]
    fn test_invalid_payload_from_serde() {
        let serde_error = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let error = ArmError::invalid_payload("OnlineDeploymentData", &serde_error);
        assert!(error.to_string().starts_with("Invalid payload for OnlineDeploymentData"));
    }
}
