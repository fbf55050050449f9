//! Blocking adapters over the async API.
//!
//! Each adapter owns (a shared handle to) a current-thread Tokio runtime and
//! drives the async implementation to completion on it, so blocking and
//! async callers run the same code.
//!
//! These types must not be used from inside an async runtime; calling them
//! from a Tokio worker thread panics.
//!
//! # Example
//!
//! ```rust,ignore
//! use azure_api::arm::WaitUntil;
//! use azure_api::blocking::BlockingResource;
//!
//! let deployment = BlockingResource::new(client.online_deployment(id)?)?;
//! let fresh = deployment.get()?.into_inner();
//! for sku in fresh.pager(fresh.inner().get_skus(None, None)?) {
//!     println!("{:?}", sku?.sku);
//! }
//! fresh.delete(WaitUntil::Completed)?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use crate::arm::{
    ArmError, ArmOperation, CancellationSignal, OperationState, Pageable, ResourceData,
    ResourceResponse, TypedResource, WaitUntil,
};
use crate::clients::HttpResponse;
use crate::services::conversations::ConversationAnalysisClient;

fn runtime() -> Result<Arc<Runtime>, ArmError> {
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(Arc::new(runtime))
}

/// Blocking wrapper around a [`TypedResource`].
pub struct BlockingResource<D> {
    inner: TypedResource<D>,
    runtime: Arc<Runtime>,
}

impl<D: ResourceData> BlockingResource<D> {
    /// Wraps a resource handle, starting a dedicated runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Runtime`] if the runtime cannot be started.
    pub fn new(resource: TypedResource<D>) -> Result<Self, ArmError> {
        Ok(Self {
            inner: resource,
            runtime: runtime()?,
        })
    }

    fn wrap(&self, resource: TypedResource<D>) -> Self {
        Self {
            inner: resource,
            runtime: Arc::clone(&self.runtime),
        }
    }

    /// Returns the async handle.
    #[must_use]
    pub const fn inner(&self) -> &TypedResource<D> {
        &self.inner
    }

    /// Consumes the wrapper and returns the async handle.
    #[must_use]
    pub fn into_inner(self) -> TypedResource<D> {
        self.inner
    }

    /// Runs any future on this wrapper's runtime.
    ///
    /// Useful for service-specific operations, e.g.
    /// `blocking.block_on(blocking.inner().get_logs(&content))`.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Wraps a pager so it can be iterated synchronously.
    #[must_use]
    pub fn pager<T>(&self, pageable: Pageable<T>) -> BlockingPager<T> {
        BlockingPager {
            inner: pageable,
            runtime: Arc::clone(&self.runtime),
        }
    }

    /// See [`TypedResource::get`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn get(&self) -> Result<ResourceResponse<Self>, ArmError> {
        let response = self.runtime.block_on(self.inner.get())?;
        Ok(response.map(|resource| self.wrap(resource)))
    }

    /// See [`TypedResource::delete`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn delete(&self, wait: WaitUntil) -> Result<BlockingOperation<()>, ArmError> {
        let operation = self.runtime.block_on(self.inner.delete(wait))?;
        Ok(self.operation(operation))
    }

    /// See [`TypedResource::update`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn update(
        &self,
        wait: WaitUntil,
        patch: &D::Patch,
    ) -> Result<BlockingOperation<TypedResource<D>>, ArmError> {
        let operation = self.runtime.block_on(self.inner.update(wait, patch))?;
        Ok(self.operation(operation))
    }

    /// See [`TypedResource::create_or_update`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn create_or_update(
        &self,
        wait: WaitUntil,
        data: &D,
    ) -> Result<BlockingOperation<TypedResource<D>>, ArmError> {
        let operation = self
            .runtime
            .block_on(self.inner.create_or_update(wait, data))?;
        Ok(self.operation(operation))
    }

    /// See [`TypedResource::add_tag`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn add_tag(&self, key: &str, value: &str) -> Result<ResourceResponse<Self>, ArmError> {
        let response = self.runtime.block_on(self.inner.add_tag(key, value))?;
        Ok(response.map(|resource| self.wrap(resource)))
    }

    /// See [`TypedResource::set_tags`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn set_tags(
        &self,
        tags: HashMap<String, String>,
    ) -> Result<ResourceResponse<Self>, ArmError> {
        let response = self.runtime.block_on(self.inner.set_tags(tags))?;
        Ok(response.map(|resource| self.wrap(resource)))
    }

    /// See [`TypedResource::remove_tag`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn remove_tag(&self, key: &str) -> Result<ResourceResponse<Self>, ArmError> {
        let response = self.runtime.block_on(self.inner.remove_tag(key))?;
        Ok(response.map(|resource| self.wrap(resource)))
    }

    /// See [`TypedResource::get_sub_resources`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn get_sub_resources<T>(
        &self,
        name: &'static str,
        page_size: Option<u32>,
        continuation_token: Option<String>,
    ) -> Result<BlockingPager<T>, ArmError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let pageable = self
            .inner
            .get_sub_resources(name, page_size, continuation_token)?;
        Ok(self.pager(pageable))
    }

    /// See [`TypedResource::invoke_action`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn invoke_action<B, R>(
        &self,
        name: &'static str,
        body: Option<&B>,
    ) -> Result<ResourceResponse<R>, ArmError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        self.runtime.block_on(self.inner.invoke_action(name, body))
    }

    fn operation<T>(&self, operation: ArmOperation<T>) -> BlockingOperation<T> {
        BlockingOperation {
            inner: operation,
            runtime: Arc::clone(&self.runtime),
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for BlockingResource<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingResource")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// Blocking wrapper around an [`ArmOperation`].
pub struct BlockingOperation<T> {
    inner: ArmOperation<T>,
    runtime: Arc<Runtime>,
}

impl<T> BlockingOperation<T> {
    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> OperationState {
        self.inner.state()
    }

    /// Returns `true` once the operation is terminal. Performs no I/O.
    #[must_use]
    pub const fn has_completed(&self) -> bool {
        self.inner.has_completed()
    }

    /// Returns the result once available.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.inner.value()
    }

    /// Returns the most recent response.
    #[must_use]
    pub const fn raw_response(&self) -> &HttpResponse {
        self.inner.raw_response()
    }

    /// Consumes the wrapper and returns the async operation.
    #[must_use]
    pub fn into_inner(self) -> ArmOperation<T> {
        self.inner
    }

    /// See [`ArmOperation::update_status`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn update_status(&mut self) -> Result<OperationState, ArmError> {
        self.runtime.block_on(self.inner.update_status())
    }

    /// See [`ArmOperation::wait_for_completion`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn wait_for_completion(&mut self) -> Result<T, ArmError>
    where
        T: Clone,
    {
        self.runtime.block_on(self.inner.wait_for_completion())
    }

    /// See [`ArmOperation::wait_for_completion_with`]. Cancel `signal` from
    /// another thread to stop the wait.
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn wait_for_completion_with(&mut self, signal: &CancellationSignal) -> Result<T, ArmError>
    where
        T: Clone,
    {
        self.runtime
            .block_on(self.inner.wait_for_completion_with(signal))
    }
}

impl<T> fmt::Debug for BlockingOperation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingOperation")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// Blocking iterator over a [`Pageable`].
pub struct BlockingPager<T> {
    inner: Pageable<T>,
    runtime: Arc<Runtime>,
}

impl<T> BlockingPager<T> {
    /// Wraps a pager, starting a dedicated runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Runtime`] if the runtime cannot be started.
    pub fn new(pageable: Pageable<T>) -> Result<Self, ArmError> {
        Ok(Self {
            inner: pageable,
            runtime: runtime()?,
        })
    }
}

impl<T> Iterator for BlockingPager<T> {
    type Item = Result<T, ArmError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.inner.next())
    }
}

impl<T> fmt::Debug for BlockingPager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingPager")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// Blocking wrapper around a [`ConversationAnalysisClient`].
pub struct BlockingConversationAnalysisClient {
    inner: ConversationAnalysisClient,
    runtime: Arc<Runtime>,
}

impl BlockingConversationAnalysisClient {
    /// Wraps a client, starting a dedicated runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Runtime`] if the runtime cannot be started.
    pub fn new(client: ConversationAnalysisClient) -> Result<Self, ArmError> {
        Ok(Self {
            inner: client,
            runtime: runtime()?,
        })
    }

    /// Returns the async client.
    #[must_use]
    pub const fn inner(&self) -> &ConversationAnalysisClient {
        &self.inner
    }

    /// See [`ConversationAnalysisClient::analyze_conversation`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn analyze_conversation(&self, task: &Value) -> Result<ResourceResponse<Value>, ArmError> {
        self.runtime.block_on(self.inner.analyze_conversation(task))
    }

    /// See [`ConversationAnalysisClient::begin_analyze_conversation_job`].
    ///
    /// # Errors
    ///
    /// Same as the async operation.
    pub fn begin_analyze_conversation_job(
        &self,
        wait: WaitUntil,
        task: &Value,
    ) -> Result<BlockingOperation<Value>, ArmError> {
        let operation = self
            .runtime
            .block_on(self.inner.begin_analyze_conversation_job(wait, task))?;
        Ok(BlockingOperation {
            inner: operation,
            runtime: Arc::clone(&self.runtime),
        })
    }
}

impl fmt::Debug for BlockingConversationAnalysisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingConversationAnalysisClient")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
