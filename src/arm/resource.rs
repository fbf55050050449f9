//! Generic typed resource handle.
//!
//! [`TypedResource<D>`] pairs a [`ResourceIdentifier`] with the last data
//! read for it. The data shape `D` declares, through [`ResourceData`], its
//! resource type, default `api-version` and the operations the service
//! supports for it. Everything else (get, delete, update, tags, sub-resource
//! listing, actions) is shared.
//!
//! Handles are never mutated in place: every operation that changes the
//! resource returns a new handle carrying fresh data.
//!
//! # Example
//!
//! ```rust,ignore
//! use azure_api::arm::{ArmClient, WaitUntil};
//! use azure_api::services::machine_learning::OnlineDeploymentData;
//!
//! let deployment = client.resource::<OnlineDeploymentData>(id)?;
//! let deployment = deployment.get().await?.into_inner();
//! let tagged = deployment.add_tag("env", "prod").await?;
//! tagged.delete(WaitUntil::Completed).await?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::Instrument;

use crate::arm::client::ArmClient;
use crate::arm::errors::ArmError;
use crate::arm::operation::{ArmOperation, OperationSource, UnitSource, WaitUntil};
use crate::arm::pager::{self, Pageable};
use crate::arm::path::{get_path, ResourceOperation, ResourcePath};
use crate::arm::response::{parse_body, ResourceResponse};
use crate::arm::resource_id::ResourceIdentifier;
use crate::arm::tags::{TagResourceData, TAGS_NAME, TAGS_NAMESPACE};
use crate::clients::{HttpRequest, HttpResponse};

/// A resource data shape and the operations its service supports.
pub trait ResourceData:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Body of a PATCH update.
    type Patch: Serialize + Send + Sync;

    /// Name used in errors and tracing spans.
    const NAME: &'static str;
    /// Full resource type, e.g. `Microsoft.Resources/tags`.
    const RESOURCE_TYPE: &'static str;
    /// Default `api-version`, unless overridden in [`ClientOptions`](crate::ClientOptions).
    const API_VERSION: &'static str;
    /// Supported operations.
    const PATHS: &'static [ResourcePath];

    /// Returns the resource id carried in the data, if any.
    fn id(&self) -> Option<&ResourceIdentifier>;
}

/// A resource id plus, optionally, the data last read for it.
#[derive(Clone, Debug)]
pub struct TypedResource<D> {
    client: ArmClient,
    id: ResourceIdentifier,
    data: Option<D>,
}

impl<D: ResourceData> TypedResource<D> {
    /// Creates a handle without data.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::TypeMismatch`] if `id` is not a `D` resource.
    pub fn new(client: ArmClient, id: ResourceIdentifier) -> Result<Self, ArmError> {
        id.validate(D::RESOURCE_TYPE)?;
        Ok(Self {
            client,
            id,
            data: None,
        })
    }

    /// Creates a handle from data returned by the service. The data's own
    /// id wins over `id` when present.
    pub(crate) fn with_data(client: ArmClient, id: ResourceIdentifier, data: D) -> Self {
        let id = data.id().cloned().unwrap_or(id);
        Self {
            client,
            id,
            data: Some(data),
        }
    }

    /// Returns the resource id.
    #[must_use]
    pub const fn id(&self) -> &ResourceIdentifier {
        &self.id
    }

    /// Returns the data, if this handle was produced by a read.
    #[must_use]
    pub const fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    /// Returns `true` if this handle carries data.
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Consumes the handle and returns its data.
    #[must_use]
    pub fn into_data(self) -> Option<D> {
        self.data
    }

    /// Returns the client this handle sends requests through.
    #[must_use]
    pub const fn client(&self) -> &ArmClient {
        &self.client
    }

    /// Returns the `api-version` used for this resource type.
    #[must_use]
    pub fn api_version(&self) -> String {
        self.client.api_version_for(D::RESOURCE_TYPE, D::API_VERSION)
    }

    /// Returns a handle to this resource's tag sub-resource.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if the id cannot be extended
    /// (the tenant root).
    pub fn tag_resource(&self) -> Result<TypedResource<TagResourceData>, ArmError> {
        let id = self
            .id
            .append_provider_resource(TAGS_NAMESPACE, "tags", TAGS_NAME)?;
        Ok(TypedResource {
            client: self.client.clone(),
            id,
            data: None,
        })
    }

    /// Reads the resource.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::NotFound`] when the service answers with no
    /// payload, [`ArmError::RequestFailed`] on a non-2xx status, and
    /// [`ArmError::InvalidPayload`] if the body is not JSON or does not
    /// match `D`.
    pub async fn get(&self) -> Result<ResourceResponse<Self>, ArmError> {
        async move {
            let path = self.path(ResourceOperation::Get)?;
            let request = self.request(path, None)?;
            let response = self.client.pipeline().request(request).await?;
            if let Some(e) = response.body_error() {
                return Err(ArmError::invalid_payload(D::NAME, &e));
            }
            if response.body.is_null() {
                return Err(ArmError::NotFound {
                    resource: D::NAME,
                    id: self.id.to_string(),
                });
            }
            let data = parse_data::<D>(&response)?;
            let resource = Self::with_data(self.client.clone(), self.id.clone(), data);
            Ok(ResourceResponse::new(resource, response))
        }
        .instrument(self.span("get"))
        .await
    }

    /// Deletes the resource.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::OperationNotSupported`] if `D` has no delete
    /// operation, or any error from sending or (with
    /// [`WaitUntil::Completed`]) polling the operation.
    pub async fn delete(&self, wait: WaitUntil) -> Result<ArmOperation<()>, ArmError> {
        async move {
            let path = self.path(ResourceOperation::Delete)?;
            let request = self.request(path, None)?;
            self.start_operation(path, request, Box::new(UnitSource), wait)
                .await
        }
        .instrument(self.span("delete"))
        .await
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::OperationNotSupported`] if `D` has no update
    /// operation, or any error from sending or polling the operation.
    pub async fn update(
        &self,
        wait: WaitUntil,
        patch: &D::Patch,
    ) -> Result<ArmOperation<Self>, ArmError> {
        async move {
            let path = self.path(ResourceOperation::Update)?;
            let body = to_body(patch)?;
            let request = self.request(path, Some(body))?;
            self.start_operation(path, request, Box::new(self.source()), wait)
                .await
        }
        .instrument(self.span("update"))
        .await
    }

    /// Creates or replaces the resource with `data`.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::OperationNotSupported`] if `D` has no
    /// create-or-update operation, or any error from sending or polling.
    pub async fn create_or_update(
        &self,
        wait: WaitUntil,
        data: &D,
    ) -> Result<ArmOperation<Self>, ArmError> {
        async move {
            let path = self.path(ResourceOperation::CreateOrUpdate)?;
            let body = to_body(data)?;
            let request = self.request(path, Some(body))?;
            self.start_operation(path, request, Box::new(self.source()), wait)
                .await
        }
        .instrument(self.span("create_or_update"))
        .await
    }

    /// Adds or replaces one tag and returns the re-read resource.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if `key` is empty, before any
    /// request is sent.
    pub async fn add_tag(&self, key: &str, value: &str) -> Result<ResourceResponse<Self>, ArmError> {
        require_key(key)?;
        async move {
            let tag_resource = self.tag_resource()?;
            let mut tags = tag_resource.current_tags().await?;
            tags.tags_mut().insert(key.to_string(), value.to_string());
            tag_resource
                .create_or_update(WaitUntil::Completed, &tags)
                .await?;
            self.get().await
        }
        .instrument(self.span("add_tag"))
        .await
    }

    /// Replaces every tag and returns the re-read resource.
    ///
    /// The existing tags are deleted before the new set is written, so a
    /// failure in between leaves the resource untagged.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if any key is empty, before
    /// any request is sent.
    pub async fn set_tags(
        &self,
        tags: HashMap<String, String>,
    ) -> Result<ResourceResponse<Self>, ArmError> {
        if tags.keys().any(String::is_empty) {
            return Err(ArmError::InvalidArgument {
                name: "tags",
                reason: "tag names cannot be empty".to_string(),
            });
        }
        async move {
            let tag_resource = self.tag_resource()?;
            tag_resource.delete(WaitUntil::Completed).await?;
            let mut data = tag_resource.current_tags().await?;
            *data.tags_mut() = tags;
            tag_resource
                .create_or_update(WaitUntil::Completed, &data)
                .await?;
            self.get().await
        }
        .instrument(self.span("set_tags"))
        .await
    }

    /// Removes one tag and returns the re-read resource.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if `key` is empty, before any
    /// request is sent.
    pub async fn remove_tag(&self, key: &str) -> Result<ResourceResponse<Self>, ArmError> {
        require_key(key)?;
        async move {
            let tag_resource = self.tag_resource()?;
            let mut tags = tag_resource.current_tags().await?;
            tags.tags_mut().remove(key);
            tag_resource
                .create_or_update(WaitUntil::Completed, &tags)
                .await?;
            self.get().await
        }
        .instrument(self.span("remove_tag"))
        .await
    }

    /// Lists a named sub-resource collection.
    ///
    /// `page_size` is sent as `$top`. A `continuation_token` from a previous
    /// page resumes iteration after that page.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if `name` is empty and
    /// [`ArmError::OperationNotSupported`] if `D` has no such collection.
    pub fn get_sub_resources<T>(
        &self,
        name: &'static str,
        page_size: Option<u32>,
        continuation_token: Option<String>,
    ) -> Result<Pageable<T>, ArmError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let query: Vec<(&str, String)> = page_size
            .map(|size| ("$top", size.to_string()))
            .into_iter()
            .collect();
        self.list_with_query(name, &query, continuation_token)
    }

    pub(crate) fn list_with_query<T>(
        &self,
        name: &'static str,
        query: &[(&str, String)],
        continuation_token: Option<String>,
    ) -> Result<Pageable<T>, ArmError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        if name.is_empty() {
            return Err(ArmError::InvalidArgument {
                name: "name",
                reason: "sub-resource name cannot be empty".to_string(),
            });
        }
        let path = self.path(ResourceOperation::List(name))?;
        let mut builder = HttpRequest::builder(path.http_method, self.request_path(path.suffix))
            .api_version(self.api_version());
        for (key, value) in query {
            builder = builder.query_param(*key, value.clone());
        }
        let request = builder.build()?;
        tracing::debug!("Listing {} of {} {}", name, D::NAME, self.id);
        Ok(pager::from_list_request(
            self.client.pipeline().clone(),
            request,
            continuation_token.filter(|token| !token.is_empty()),
        ))
    }

    /// Invokes a named POST action and parses its response as `R`.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::OperationNotSupported`] if `D` has no such
    /// action, [`ArmError::RequestFailed`] on a non-2xx status and
    /// [`ArmError::InvalidPayload`] if the body does not match `R`.
    pub async fn invoke_action<B, R>(
        &self,
        name: &'static str,
        body: Option<&B>,
    ) -> Result<ResourceResponse<R>, ArmError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        async move {
            let path = self.path(ResourceOperation::Action(name))?;
            let body = body.map(to_body).transpose()?;
            let request = self.request(path, body)?;
            let response = self.client.pipeline().request(request).await?;
            let value = parse_body(&response, name)?;
            Ok(ResourceResponse::new(value, response))
        }
        .instrument(self.span(name))
        .await
    }

    fn path(&self, operation: ResourceOperation) -> Result<&'static ResourcePath, ArmError> {
        get_path(D::PATHS, operation).ok_or_else(|| ArmError::OperationNotSupported {
            resource: D::NAME,
            operation: operation.to_string(),
        })
    }

    fn request_path(&self, suffix: &str) -> String {
        format!("{}{}", self.id.to_request_path(), suffix)
    }

    fn request(
        &self,
        path: &ResourcePath,
        body: Option<serde_json::Value>,
    ) -> Result<HttpRequest, ArmError> {
        let mut builder = HttpRequest::builder(path.http_method, self.request_path(path.suffix))
            .api_version(self.api_version());
        if let Some(body) = body {
            builder = builder.body(body);
        }
        Ok(builder.build()?)
    }

    async fn start_operation<T>(
        &self,
        path: &ResourcePath,
        request: HttpRequest,
        source: Box<dyn OperationSource<T>>,
        wait: WaitUntil,
    ) -> Result<ArmOperation<T>, ArmError> {
        ArmOperation::start(
            self.client.pipeline().clone(),
            request,
            Some(self.api_version()),
            path.final_state_or_default(),
            self.client.options().poll_interval(),
            source,
            wait,
        )
        .await
    }

    fn source(&self) -> ResourceSource<D> {
        ResourceSource {
            client: self.client.clone(),
            id: self.id.clone(),
            data: PhantomData,
        }
    }

    fn span(&self, operation: &str) -> tracing::Span {
        tracing::debug_span!(
            "arm.resource",
            resource = D::NAME,
            operation = operation,
            id = %self.id
        )
    }
}

impl TypedResource<TagResourceData> {
    async fn current_tags(&self) -> Result<TagResourceData, ArmError> {
        let response = self.get().await?;
        Ok(response.into_inner().into_data().unwrap_or_default())
    }
}

/// Builds a [`TypedResource`] from the final response of an operation.
pub(crate) struct ResourceSource<D> {
    client: ArmClient,
    id: ResourceIdentifier,
    data: PhantomData<fn() -> D>,
}

impl<D: ResourceData> OperationSource<TypedResource<D>> for ResourceSource<D> {
    fn from_response(&self, response: &HttpResponse) -> Result<TypedResource<D>, ArmError> {
        let data = parse_data::<D>(response)?;
        Ok(TypedResource::with_data(
            self.client.clone(),
            self.id.clone(),
            data,
        ))
    }
}

fn parse_data<D: ResourceData>(response: &HttpResponse) -> Result<D, ArmError> {
    parse_body(response, D::NAME)
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ArmError> {
    serde_json::to_value(body).map_err(|e| ArmError::InvalidArgument {
        name: "body",
        reason: e.to_string(),
    })
}

fn require_key(key: &str) -> Result<(), ArmError> {
    if key.is_empty() {
        return Err(ArmError::InvalidArgument {
            name: "key",
            reason: "tag name cannot be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessToken, StaticTokenCredential};
    use crate::clients::HttpMethod;
    use crate::config::ClientOptions;
    use std::sync::Arc;

    fn client() -> ArmClient {
        let credential = Arc::new(StaticTokenCredential::new(AccessToken::never_expiring("t")));
        ArmClient::new(credential, ClientOptions::default()).unwrap()
    }

    fn scope() -> ResourceIdentifier {
        ResourceIdentifier::parse("/subscriptions/s/providers/Microsoft.Resources/tags/default")
            .unwrap()
    }

    #[test]
    fn test_unsupported_operation_is_reported() {
        let resource = TypedResource::<TagResourceData>::new(client(), scope()).unwrap();
        let error = resource.path(ResourceOperation::Update).unwrap_err();
        assert!(matches!(
            error,
            ArmError::OperationNotSupported { resource: "TagResource", ref operation } if operation == "update"
        ));
    }

    #[test]
    fn test_request_carries_api_version() {
        let resource = TypedResource::<TagResourceData>::new(client(), scope()).unwrap();
        let path = resource.path(ResourceOperation::Get).unwrap();
        let request = resource.request(path, None).unwrap();
        assert_eq!(request.http_method, HttpMethod::Get);
        assert_eq!(
            request.path,
            "/subscriptions/s/providers/Microsoft.Resources/tags/default"
        );
        assert_eq!(
            request.query.unwrap().get("api-version"),
            Some(&"2021-04-01".to_string())
        );
    }

    #[test]
    fn test_tag_resource_id() {
        let id = ResourceIdentifier::parse("/subscriptions/s/resourceGroups/g").unwrap();
        let resource = TypedResource::<TagResourceData> {
            client: client(),
            id,
            data: None,
        };
        let tags = resource.tag_resource().unwrap();
        assert_eq!(
            tags.id().as_str(),
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Resources/tags/default"
        );
        assert!(!tags.has_data());
    }

    #[test]
    fn test_data_id_wins() {
        let data: TagResourceData = serde_json::from_value(serde_json::json!({
            "id": "/subscriptions/other/providers/Microsoft.Resources/tags/default",
            "properties": {"tags": {}}
        }))
        .unwrap();
        let resource = TypedResource::with_data(client(), scope(), data);
        assert_eq!(resource.id().subscription_id(), Some("other"));
        assert!(resource.has_data());
    }

    #[test]
    fn test_empty_sub_resource_name_is_rejected() {
        let resource = TypedResource::<TagResourceData>::new(client(), scope()).unwrap();
        let result = resource.get_sub_resources::<serde_json::Value>("", None, None);
        assert!(matches!(result, Err(ArmError::InvalidArgument { name: "name", .. })));
    }
}
