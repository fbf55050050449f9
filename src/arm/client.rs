//! Entry point for resource management.

use std::sync::Arc;

use crate::arm::errors::ArmError;
use crate::arm::resource::{ResourceData, TypedResource};
use crate::arm::resource_id::ResourceIdentifier;
use crate::auth::{AuthPolicy, TokenCredential};
use crate::clients::HttpClient;
use crate::config::ClientOptions;

/// Client for resource management operations.
///
/// Owns the request pipeline shared by every [`TypedResource`] it hands
/// out. Cloning is cheap.
///
/// # Example
///
/// ```rust
/// use azure_api::arm::{ArmClient, ResourceIdentifier};
/// use azure_api::auth::{AccessToken, StaticTokenCredential};
/// use azure_api::ClientOptions;
/// use std::sync::Arc;
///
/// let credential = Arc::new(StaticTokenCredential::new(AccessToken::never_expiring("token")));
/// let client = ArmClient::new(credential, ClientOptions::default()).unwrap();
///
/// assert_eq!(client.options().endpoint().as_ref(), "https://management.azure.com");
/// assert_eq!(client.api_version_for("Microsoft.Resources/tags", "2021-04-01"), "2021-04-01");
/// ```
#[derive(Clone, Debug)]
pub struct ArmClient {
    pipeline: Arc<HttpClient>,
    options: Arc<ClientOptions>,
}

// Verify ArmClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ArmClient>();
};

impl ArmClient {
    /// Creates a client that authenticates with bearer tokens for the
    /// endpoint's `/.default` scope.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Http`] if the HTTP client cannot be created.
    pub fn new(credential: Arc<dyn TokenCredential>, options: ClientOptions) -> Result<Self, ArmError> {
        let scope = format!("{}/.default", options.endpoint());
        let pipeline = HttpClient::new(&options, AuthPolicy::bearer(credential, scope))?;
        Ok(Self::with_pipeline(Arc::new(pipeline), options))
    }

    /// Creates a client over an existing pipeline.
    #[must_use]
    pub fn with_pipeline(pipeline: Arc<HttpClient>, options: ClientOptions) -> Self {
        Self {
            pipeline,
            options: Arc::new(options),
        }
    }

    /// Returns the shared request pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &Arc<HttpClient> {
        &self.pipeline
    }

    /// Returns the client options.
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Returns the configured `api-version` for a resource type, or `default`.
    #[must_use]
    pub fn api_version_for(&self, resource_type: &str, default: &str) -> String {
        self.options
            .api_version_override(resource_type)
            .map_or_else(|| default.to_string(), ToString::to_string)
    }

    /// Returns a typed handle for `id` without fetching it.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::TypeMismatch`] if `id` is not a `D` resource.
    pub fn resource<D: ResourceData>(&self, id: ResourceIdentifier) -> Result<TypedResource<D>, ArmError> {
        TypedResource::new(self.clone(), id)
    }
}
