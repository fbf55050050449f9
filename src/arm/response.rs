//! Response wrapper for resource operations.
//!
//! [`ResourceResponse<T>`] pairs a typed value with the raw HTTP response it
//! was read from. It implements `Deref<Target = T>`, so the value's methods
//! are available directly on the wrapper:
//!
//! ```rust,ignore
//! let response = deployment.get().await?;
//!
//! // TypedResource methods via Deref
//! println!("{}", response.id());
//!
//! // Raw response metadata
//! println!("request id: {:?}", response.request_id());
//!
//! // Take ownership of the value
//! let deployment = response.into_inner();
//! ```

use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;

use crate::arm::errors::ArmError;
use crate::clients::HttpResponse;

/// A typed value plus the raw response it came from.
///
/// # Example
///
/// ```rust
/// use azure_api::arm::ResourceResponse;
/// use azure_api::clients::HttpResponse;
/// use std::collections::HashMap;
///
/// let raw = HttpResponse::new(200, HashMap::new(), "[1,2,3]".to_string());
/// let response = ResourceResponse::new(vec![1, 2, 3], raw);
///
/// assert_eq!(response.len(), 3);
/// assert_eq!(response.raw_response().code, 200);
/// assert_eq!(response.into_inner(), vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct ResourceResponse<T> {
    value: T,
    raw: HttpResponse,
}

impl<T> ResourceResponse<T> {
    /// Creates a new response wrapper.
    #[must_use]
    pub const fn new(value: T, raw: HttpResponse) -> Self {
        Self { value, raw }
    }

    /// Consumes the response and returns the value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Consumes the response and returns the value and raw response.
    #[must_use]
    pub fn into_parts(self) -> (T, HttpResponse) {
        (self.value, self.raw)
    }

    /// Returns a reference to the value.
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Returns the raw HTTP response.
    #[must_use]
    pub const fn raw_response(&self) -> &HttpResponse {
        &self.raw
    }

    /// Returns the `x-ms-request-id` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.raw.request_id()
    }

    /// Maps the value, keeping the raw response.
    pub fn map<U, F>(self, f: F) -> ResourceResponse<U>
    where
        F: FnOnce(T) -> U,
    {
        ResourceResponse {
            value: f(self.value),
            raw: self.raw,
        }
    }
}

impl<T> Deref for ResourceResponse<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> DerefMut for ResourceResponse<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

/// Deserializes a response body into `T`.
///
/// A body that is present but not JSON fails the same way as one that does
/// not match `T`.
pub(crate) fn parse_body<T: DeserializeOwned>(
    response: &HttpResponse,
    target: &str,
) -> Result<T, ArmError> {
    if let Some(e) = response.body_error() {
        return Err(ArmError::invalid_payload(target, &e));
    }
    serde_json::from_value(response.body.clone()).map_err(|e| ArmError::invalid_payload(target, &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn raw_with_request_id(id: &str) -> HttpResponse {
        let mut headers = HashMap::new();
        headers.insert("x-ms-request-id".to_string(), vec![id.to_string()]);
        HttpResponse::new(200, headers, String::new())
    }

    #[test]
    fn test_deref_exposes_value_methods() {
        let response = ResourceResponse::new("hello".to_string(), raw_with_request_id("r"));
        assert_eq!(response.len(), 5);
        assert!(response.starts_with("he"));
    }

    #[test]
    fn test_map_keeps_raw_response() {
        let response = ResourceResponse::new(2, raw_with_request_id("abc"));
        let mapped = response.map(|n| n * 21);
        assert_eq!(*mapped, 42);
        assert_eq!(mapped.request_id(), Some("abc"));
    }

    #[test]
    fn test_deref_mut() {
        let mut response = ResourceResponse::new(vec![1], raw_with_request_id("r"));
        response.push(2);
        let (value, raw) = response.into_parts();
        assert_eq!(value, vec![1, 2]);
        assert_eq!(raw.code, 200);
    }
}
