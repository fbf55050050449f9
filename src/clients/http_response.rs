//! HTTP response types.
//!
//! This module provides the [`HttpResponse`] type with accessors for the
//! Azure headers the rest of the crate relies on: request ids, long-running
//! operation polling headers, and retry hints.

use std::collections::HashMap;
use std::time::Duration;

use crate::clients::errors::HttpResponseError;

/// An HTTP response from an Azure service.
///
/// Header names are stored lowercased. The body is parsed as JSON; an empty
/// or non-JSON body yields [`serde_json::Value::Null`] and the original text
/// stays available in `raw_body`. Use [`body_error`](Self::body_error) to
/// tell a missing body from one that is not JSON.
///
/// # Example
///
/// ```rust
/// use azure_api::clients::HttpResponse;
/// use std::collections::HashMap;
///
/// let mut headers = HashMap::new();
/// headers.insert("retry-after".to_string(), vec!["2".to_string()]);
/// headers.insert("x-ms-request-id".to_string(), vec!["abc".to_string()]);
///
/// let response = HttpResponse::new(202, headers, String::new());
/// assert!(response.is_ok());
/// assert!(!response.has_content());
/// assert_eq!(response.request_id(), Some("abc"));
/// assert_eq!(response.retry_after(), Some(std::time::Duration::from_secs(2)));
/// ```
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body, or `Null`.
    pub body: serde_json::Value,
    /// The unparsed response body.
    pub raw_body: String,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing the body as JSON when possible.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, raw_body: String) -> Self {
        let body = if raw_body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&raw_body).unwrap_or(serde_json::Value::Null)
        };

        Self {
            code,
            headers,
            body,
            raw_body,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns `true` if the response has a non-blank body.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.raw_body.trim().is_empty()
    }

    /// Returns the parse error if the body is present but not valid JSON.
    #[must_use]
    pub fn body_error(&self) -> Option<serde_json::Error> {
        if !self.body.is_null() || !self.has_content() {
            return None;
        }
        serde_json::from_str::<serde_json::Value>(&self.raw_body).err()
    }

    /// Returns the first value of a header (name matched case-insensitively).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `x-ms-request-id` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-ms-request-id")
    }

    /// Returns the `x-ms-client-request-id` echoed by the service.
    #[must_use]
    pub fn client_request_id(&self) -> Option<&str> {
        self.header("x-ms-client-request-id")
    }

    /// Returns the `Location` header value, if present.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header("location").filter(|v| !v.is_empty())
    }

    /// Returns the `Azure-AsyncOperation` header value, if present.
    #[must_use]
    pub fn azure_async_operation(&self) -> Option<&str> {
        self.header("azure-asyncoperation").filter(|v| !v.is_empty())
    }

    /// Returns the `Operation-Location` header value, if present.
    #[must_use]
    pub fn operation_location(&self) -> Option<&str> {
        self.header("operation-location").filter(|v| !v.is_empty())
    }

    /// Returns the delay the service asked for before the next request.
    ///
    /// `retry-after-ms` and `x-ms-retry-after-ms` (milliseconds) take
    /// precedence over `Retry-After` (seconds). Values that are negative or
    /// too large for a [`Duration`] are ignored.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        let millis = ["retry-after-ms", "x-ms-retry-after-ms"]
            .iter()
            .find_map(|name| self.header(name).and_then(|v| v.trim().parse::<u64>().ok()))
            .map(Duration::from_millis);

        millis.or_else(|| {
            self.header("retry-after")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        })
    }

    /// Returns the service error code from `x-ms-error-code` or the body's
    /// `error.code`.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.header("x-ms-error-code").or_else(|| {
            self.body
                .get("error")
                .and_then(|e| e.get("code"))
                .and_then(serde_json::Value::as_str)
        })
    }

    /// Returns the service error message from the body's `error.message`.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(serde_json::Value::as_str)
    }

    /// Builds the error describing this (failed) response.
    #[must_use]
    pub fn to_error(&self) -> HttpResponseError {
        let message = self.error_message().map_or_else(
            || {
                if self.raw_body.is_empty() {
                    format!("Request failed with status {}", self.code)
                } else {
                    self.raw_body.clone()
                }
            },
            String::from,
        );

        HttpResponseError {
            code: self.code,
            message,
            error_code: self.error_code().map(String::from),
            raw_body: self.raw_body.clone(),
            request_id: self.request_id().map(String::from),
        }
    }
}
