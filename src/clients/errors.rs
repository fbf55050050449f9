//! HTTP-specific error types.
//!
//! This module contains error types for HTTP operations, including response
//! errors, retry exhaustion, request validation failures, and credential
//! failures raised while authenticating a request.
//!
//! # Error Handling
//!
//! - [`HttpResponseError`]: Non-2xx HTTP responses from the service
//! - [`MaxHttpRetriesExceededError`]: When retry attempts are exhausted
//! - [`InvalidHttpRequestError`]: When a request fails validation before sending
//! - [`HttpError`]: Unified error type encompassing all HTTP-related errors
//!
//! # Example
//!
//! ```rust,ignore
//! use azure_api::clients::HttpError;
//!
//! match client.request(request).await {
//!     Ok(response) => println!("Success: {}", response.body),
//!     Err(HttpError::Response(e)) => {
//!         println!("Service error {} ({:?}): {}", e.code, e.error_code, e.message);
//!     }
//!     Err(HttpError::MaxRetries(e)) => {
//!         println!("Retries exhausted after {} tries", e.tries);
//!     }
//!     Err(e) => println!("Request failed: {e}"),
//! }
//! ```

use crate::auth::CredentialError;
use thiserror::Error;

/// Error returned when a request receives a non-successful response.
///
/// Carries everything needed to diagnose the failure: the status, the
/// service error code (from the `x-ms-error-code` header or the body's
/// `error.code`), the raw body, and the `x-ms-request-id` header.
///
/// # Example
///
/// ```rust
/// use azure_api::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 404,
///     message: "The Resource was not found.".to_string(),
///     error_code: Some("ResourceNotFound".to_string()),
///     raw_body: String::new(),
///     request_id: Some("abc-123".to_string()),
/// };
///
/// assert!(error.to_string().contains("404"));
/// assert!(error.to_string().contains("ResourceNotFound"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Service request failed. Status: {code}, ErrorCode: {}, Message: {message}", .error_code.as_deref().unwrap_or("none"))]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Human-readable message extracted from the response.
    pub message: String,
    /// Service error code, if the service provided one.
    pub error_code: Option<String>,
    /// The unparsed response body.
    pub raw_body: String,
    /// Value of the `x-ms-request-id` header.
    pub request_id: Option<String>,
}

/// Error returned when maximum retry attempts have been exhausted.
///
/// Raised when a request keeps failing with a transient status (408, 429,
/// 500, 502, 503, 504) after all configured attempts have been made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Exceeded maximum retry count of {tries}. Last response: {last}")]
pub struct MaxHttpRetriesExceededError {
    /// The number of tries that were attempted.
    pub tries: u32,
    /// The last failed response.
    pub last: HttpResponseError,
}

/// Error returned when a request fails validation before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The request path is empty.
    #[error("Request path cannot be empty.")]
    EmptyPath,

    /// A PUT or PATCH request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-2xx response.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Maximum retry attempts exhausted.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// The credential could not authenticate the request.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns the `x-ms-request-id` of the failing response, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Response(e) => e.request_id.as_deref(),
            Self::MaxRetries(e) => e.last.request_id.as_deref(),
            _ => None,
        }
    }

    /// Returns the HTTP status of the failing response, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            Self::MaxRetries(e) => Some(e.last.code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(code: u16) -> HttpResponseError {
        HttpResponseError {
            code,
            message: "Too many requests".to_string(),
            error_code: None,
            raw_body: String::new(),
            request_id: Some("req-1".to_string()),
        }
    }

    #[test]
    fn test_response_error_message_without_error_code() {
        let message = sample(400).to_string();
        assert!(message.contains("Status: 400"));
        assert!(message.contains("ErrorCode: none"));
    }

    #[test]
    fn test_max_retries_error_includes_retry_count() {
        let error = MaxHttpRetriesExceededError {
            tries: 3,
            last: sample(429),
        };
        let message = error.to_string();
        assert!(message.contains("Exceeded maximum retry count of 3"));
        assert!(message.contains("429"));
    }

    #[test]
    fn test_invalid_request_error_missing_body() {
        let error = InvalidHttpRequestError::MissingBody {
            method: "put".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot use put without specifying data.");
    }

    #[test]
    fn test_http_error_request_id_and_status() {
        let error = HttpError::from(MaxHttpRetriesExceededError {
            tries: 2,
            last: sample(503),
        });
        assert_eq!(error.request_id(), Some("req-1"));
        assert_eq!(error.status(), Some(503));

        let error = HttpError::from(InvalidHttpRequestError::EmptyPath);
        assert_eq!(error.request_id(), None);
        assert_eq!(error.status(), None);
    }
}
