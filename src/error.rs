//! Error types for SDK configuration.
//!
//! This module contains error types used when constructing client options,
//! credentials, and other validated configuration values.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use azure_api::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// Errors that can occur during SDK configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Azure service key.")]
    EmptyApiKey,

    /// Endpoint URL is invalid.
    #[error("Invalid endpoint '{url}'. Please provide an absolute URL with scheme (e.g., 'https://management.azure.com').")]
    InvalidEndpoint {
        /// The invalid URL that was provided.
        url: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM-DD' or 'YYYY-MM-DD-preview'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// A numeric option is out of range.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// The option name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_error_message() {
        let message = ConfigError::EmptyApiKey.to_string();
        assert!(message.contains("API key cannot be empty"));
    }

    #[test]
    fn test_invalid_endpoint_error_message() {
        let error = ConfigError::InvalidEndpoint {
            url: "not a url".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("not a url"));
        assert!(message.contains("absolute URL"));
    }

    #[test]
    fn test_invalid_api_version_error_message() {
        let error = ConfigError::InvalidApiVersion {
            version: "2022-13".to_string(),
        };
        assert!(error.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyApiKey;
        let _: &dyn std::error::Error = &error;
    }
}
