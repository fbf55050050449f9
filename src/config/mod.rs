//! Client configuration for the Azure SDK core.
//!
//! This module provides the options shared by every client in the crate:
//! which endpoint to call, which `api-version` to send per resource type,
//! how many times transient failures are retried, and how often
//! long-running operations are polled.
//!
//! # Overview
//!
//! - [`ClientOptions`]: The immutable option set handed to a client
//! - [`ClientOptionsBuilder`]: A builder for constructing [`ClientOptions`]
//! - [`ApiKey`]: A validated service key with masked debug output
//! - [`Endpoint`]: A validated service endpoint URL
//! - [`ApiVersion`]: A validated `api-version` value
//!
//! # Example
//!
//! ```rust
//! use azure_api::{ApiVersion, ClientOptions};
//! use std::time::Duration;
//!
//! let options = ClientOptions::builder()
//!     .api_version(
//!         "Microsoft.MachineLearningServices/workspaces/onlineEndpoints/deployments",
//!         ApiVersion::new("2023-04-01").unwrap(),
//!     )
//!     .poll_interval(Duration::from_millis(500))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(options.max_tries(), 3);
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiKey, Endpoint};
pub use version::ApiVersion;

use crate::error::ConfigError;
use std::collections::HashMap;
use std::time::Duration;

/// Default number of attempts for a request, including the first one.
pub const DEFAULT_MAX_TRIES: u32 = 3;

/// Default delay between long-running operation polls when the service
/// sends no `Retry-After` hint.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Options shared by every client.
///
/// # Thread Safety
///
/// `ClientOptions` is `Clone`, `Send`, and `Sync`.
///
/// # API Version Overrides
///
/// Each resource type ships with a default `api-version`. Overrides are
/// keyed by resource type and matched ASCII case-insensitively.
#[derive(Clone, Debug)]
pub struct ClientOptions {
    endpoint: Endpoint,
    api_versions: HashMap<String, ApiVersion>,
    max_tries: u32,
    poll_interval: Duration,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl ClientOptions {
    /// Creates a new builder for constructing `ClientOptions`.
    #[must_use]
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::new()
    }

    /// Returns the service endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the `api-version` override for a resource type, if any.
    #[must_use]
    pub fn api_version_override(&self, resource_type: &str) -> Option<&ApiVersion> {
        self.api_versions.get(&resource_type.to_ascii_lowercase())
    }

    /// Returns the maximum number of attempts per request.
    #[must_use]
    pub const fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /// Returns the fallback delay between operation polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the per-request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns a copy of these options pointed at a different endpoint.
    #[must_use]
    pub fn with_endpoint(&self, endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            ..self.clone()
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            api_versions: HashMap::new(),
            max_tries: DEFAULT_MAX_TRIES,
            poll_interval: DEFAULT_POLL_INTERVAL,
            user_agent_prefix: None,
            timeout: None,
        }
    }
}

// Verify ClientOptions is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientOptions>();
};

/// Builder for constructing [`ClientOptions`] instances.
///
/// No field is required.
///
/// # Defaults
///
/// - `endpoint`: `https://management.azure.com`
/// - `api_version`: the resource type's built-in version
/// - `max_tries`: 3
/// - `poll_interval`: 1 second
/// - `user_agent_prefix`: `None`
/// - `timeout`: `None`
#[derive(Debug, Default)]
pub struct ClientOptionsBuilder {
    endpoint: Option<Endpoint>,
    api_versions: HashMap<String, ApiVersion>,
    max_tries: Option<u32>,
    poll_interval: Option<Duration>,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl ClientOptionsBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Overrides the `api-version` sent for one resource type.
    #[must_use]
    pub fn api_version(mut self, resource_type: &str, version: ApiVersion) -> Self {
        self.api_versions
            .insert(resource_type.to_ascii_lowercase(), version);
        self
    }

    /// Sets the maximum number of attempts per request (at least 1).
    #[must_use]
    pub const fn max_tries(mut self, tries: u32) -> Self {
        self.max_tries = Some(tries);
        self
    }

    /// Sets the fallback delay between long-running operation polls.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`ClientOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `max_tries` is zero.
    pub fn build(self) -> Result<ClientOptions, ConfigError> {
        let max_tries = self.max_tries.unwrap_or(DEFAULT_MAX_TRIES);
        if max_tries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_tries",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(ClientOptions {
            endpoint: self.endpoint.unwrap_or_default(),
            api_versions: self.api_versions,
            max_tries,
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            user_agent_prefix: self.user_agent_prefix,
            timeout: self.timeout,
        })
    }
}
