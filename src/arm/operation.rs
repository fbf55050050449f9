//! Long-running operation polling.
//!
//! Mutating calls that the service completes asynchronously return an
//! [`ArmOperation<T>`]. The operation inspects the initial response to pick a
//! polling strategy, polls on request, and caches its terminal outcome so
//! later waits perform no I/O.
//!
//! # Polling strategies
//!
//! | Initial response carries             | Strategy                                  |
//! |--------------------------------------|-------------------------------------------|
//! | `Azure-AsyncOperation`               | Status monitor (`status` field of body)   |
//! | `Operation-Location`                 | Status monitor (`status` field of body)   |
//! | `Location`                           | 202 = running, any other 2xx = done       |
//! | none (PUT/PATCH)                     | `properties.provisioningState` of the URI |
//! | none (other methods)                 | Done immediately                          |
//!
//! # Example
//!
//! ```rust,ignore
//! use azure_api::arm::{CancellationSignal, WaitUntil};
//!
//! let mut operation = deployment.delete(WaitUntil::Started).await?;
//! let signal = CancellationSignal::new();
//! operation.wait_for_completion_with(&signal).await?;
//! assert!(operation.has_completed());
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::arm::cancellation::CancellationSignal;
use crate::arm::errors::{ArmError, OperationFailedError};
use crate::arm::models::ErrorResponse;
use crate::arm::response::parse_body;
use crate::clients::{HttpClient, HttpMethod, HttpRequest, HttpResponse};

/// State of a long-running operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationState {
    /// The operation was started but not yet polled.
    Created,
    /// The service reports the operation is still running.
    InProgress,
    /// The operation finished successfully.
    Succeeded,
    /// The operation failed.
    Failed,
    /// The operation was canceled on the service.
    Canceled,
}

impl OperationState {
    /// Returns `true` for `Succeeded`, `Failed`, and `Canceled`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    /// Maps a service status string (ASCII case-insensitive).
    ///
    /// Unknown values (`Running`, `Accepted`, `Updating`, ...) mean the
    /// operation is still in progress.
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" | "cancelled" => Self::Canceled,
            _ => Self::InProgress,
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "Created",
            Self::InProgress => "InProgress",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
        };
        f.write_str(name)
    }
}

/// Where the final result of a successful operation is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinalStateVia {
    /// The URL in the initial `Location` header.
    Location,
    /// The status monitor named by `Azure-AsyncOperation`.
    AzureAsyncOperation,
    /// The URI of the original request.
    OriginalUri,
    /// The status monitor named by `Operation-Location`.
    OperationLocation,
}

/// Whether a mutating call returns right after the service accepts it or
/// only once the operation has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitUntil {
    /// Return after the initial response.
    Started,
    /// Poll until a terminal state before returning.
    Completed,
}

/// Turns a final response into the operation's result value.
pub trait OperationSource<T>: Send + Sync {
    /// Builds the result from the final response.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidPayload`] when the body does not match.
    fn from_response(&self, response: &HttpResponse) -> Result<T, ArmError>;

    /// Returns `false` when the result carries no payload and the final
    /// fetch can be skipped.
    fn needs_payload(&self) -> bool {
        true
    }
}

/// Source for operations with no result value (deletes).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitSource;

impl OperationSource<()> for UnitSource {
    fn from_response(&self, _response: &HttpResponse) -> Result<(), ArmError> {
        Ok(())
    }

    fn needs_payload(&self) -> bool {
        false
    }
}

/// Source that deserializes the final body as JSON.
pub struct JsonSource<T>(PhantomData<fn() -> T>);

impl<T> JsonSource<T> {
    /// Creates a JSON source.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonSource")
    }
}

impl<T: DeserializeOwned> OperationSource<T> for JsonSource<T> {
    fn from_response(&self, response: &HttpResponse) -> Result<T, ArmError> {
        parse_body(response, "operation result")
    }
}

/// The request that started an operation.
#[derive(Debug, Clone)]
pub(crate) struct OriginalRequest {
    pub method: HttpMethod,
    pub path: String,
    pub api_version: Option<String>,
}

impl OriginalRequest {
    fn get(&self) -> Result<HttpRequest, ArmError> {
        let mut builder = HttpRequest::builder(HttpMethod::Get, self.path.clone());
        if let Some(version) = &self.api_version {
            builder = builder.api_version(version.clone());
        }
        Ok(builder.build()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Polling {
    StatusMonitor(String),
    Location(String),
    ProvisioningState,
    Done,
}

/// A long-running operation.
///
/// The operation is single-consumer: polling takes `&mut self`. Once a
/// terminal state is reached the outcome is cached and every later call to
/// [`wait_for_completion`](Self::wait_for_completion) returns it without
/// network calls.
pub struct ArmOperation<T> {
    pipeline: Arc<HttpClient>,
    original: OriginalRequest,
    final_state_via: FinalStateVia,
    polling: Polling,
    initial_location: Option<String>,
    state: OperationState,
    last_response: HttpResponse,
    poll_interval: Duration,
    source: Box<dyn OperationSource<T>>,
    outcome: Option<Result<T, OperationFailedError>>,
}

impl<T> ArmOperation<T> {
    /// Creates an operation from the service's initial response.
    pub(crate) fn new(
        pipeline: Arc<HttpClient>,
        original: OriginalRequest,
        initial: HttpResponse,
        final_state_via: FinalStateVia,
        poll_interval: Duration,
        source: Box<dyn OperationSource<T>>,
    ) -> Self {
        let polling = if let Some(url) = initial
            .azure_async_operation()
            .or_else(|| initial.operation_location())
        {
            Polling::StatusMonitor(url.to_string())
        } else if let Some(url) = initial.location() {
            Polling::Location(url.to_string())
        } else if matches!(original.method, HttpMethod::Put | HttpMethod::Patch) {
            Polling::ProvisioningState
        } else {
            Polling::Done
        };

        let state = match polling {
            Polling::StatusMonitor(_) | Polling::Location(_) => OperationState::Created,
            Polling::ProvisioningState => match provisioning_state(&initial) {
                Some(state) if !state.is_terminal() => OperationState::Created,
                Some(state) => state,
                None => OperationState::Succeeded,
            },
            Polling::Done => OperationState::Succeeded,
        };

        tracing::debug!(
            "Started {} {} ({:?}, state {})",
            original.method,
            original.path,
            polling,
            state
        );

        Self {
            pipeline,
            initial_location: initial.location().map(str::to_string),
            original,
            final_state_via,
            polling,
            state,
            last_response: initial,
            poll_interval,
            source,
            outcome: None,
        }
    }

    /// Sends the initial request and wraps the response in an operation.
    ///
    /// With [`WaitUntil::Completed`] the operation is polled to a terminal
    /// state before returning.
    pub(crate) async fn start(
        pipeline: Arc<HttpClient>,
        request: HttpRequest,
        api_version: Option<String>,
        final_state_via: FinalStateVia,
        poll_interval: Duration,
        source: Box<dyn OperationSource<T>>,
        wait: WaitUntil,
    ) -> Result<Self, ArmError> {
        let original = OriginalRequest {
            method: request.http_method,
            path: request.path.clone(),
            api_version,
        };
        let initial = pipeline.request(request).await?;
        let mut operation = Self::new(
            pipeline,
            original,
            initial,
            final_state_via,
            poll_interval,
            source,
        );
        if wait == WaitUntil::Completed {
            operation.drive(&CancellationSignal::new()).await?;
        }
        Ok(operation)
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> OperationState {
        self.state
    }

    /// Returns `true` once the operation has reached a terminal state.
    ///
    /// Performs no I/O.
    #[must_use]
    pub const fn has_completed(&self) -> bool {
        self.state.is_terminal()
    }

    /// Returns the result value once the operation has succeeded and its
    /// final payload has been read.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match &self.outcome {
            Some(Ok(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the most recent response (initial, poll, or final fetch).
    #[must_use]
    pub const fn raw_response(&self) -> &HttpResponse {
        &self.last_response
    }

    /// Polls the service once and returns the new state.
    ///
    /// Does nothing once the operation is terminal.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::RequestFailed`] if the poll request fails and
    /// [`ArmError::InvalidPayload`] if a status body is not JSON or a status
    /// monitor body has no `status`.
    pub async fn update_status(&mut self) -> Result<OperationState, ArmError> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        let request = match &self.polling {
            Polling::StatusMonitor(url) | Polling::Location(url) => {
                HttpRequest::builder(HttpMethod::Get, url.clone()).build()?
            }
            Polling::ProvisioningState => self.original.get()?,
            Polling::Done => return Ok(self.state),
        };
        let response = self.pipeline.request(request).await?;
        if matches!(self.polling, Polling::StatusMonitor(_) | Polling::ProvisioningState) {
            if let Some(e) = response.body_error() {
                return Err(ArmError::invalid_payload("operation status", &e));
            }
        }

        let state = match &self.polling {
            Polling::StatusMonitor(_) => {
                let status = response
                    .body
                    .get("status")
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| ArmError::InvalidPayload {
                        target: "operation status".to_string(),
                        reason: "status monitor response has no 'status' field".to_string(),
                    })?;
                OperationState::from_status(status)
            }
            Polling::Location(_) => {
                if response.code == 202 {
                    OperationState::InProgress
                } else {
                    OperationState::Succeeded
                }
            }
            Polling::ProvisioningState => {
                provisioning_state(&response).unwrap_or(OperationState::Succeeded)
            }
            Polling::Done => OperationState::Succeeded,
        };

        if let Polling::Location(url) = &mut self.polling {
            if let Some(next) = response.location() {
                next.clone_into(url);
            }
        }

        self.state = if state.is_terminal() {
            state
        } else {
            OperationState::InProgress
        };
        tracing::debug!(
            "Polled {} {} -> {} (HTTP {})",
            self.original.method,
            self.original.path,
            self.state,
            response.code
        );
        self.last_response = response;
        Ok(self.state)
    }

    /// Polls until the operation reaches a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::OperationFailed`] if the operation failed or was
    /// canceled on the service, or any error from polling or the final fetch.
    pub async fn wait_for_completion(&mut self) -> Result<T, ArmError>
    where
        T: Clone,
    {
        self.wait_for_completion_with(&CancellationSignal::new())
            .await
    }

    /// Polls until a terminal state or until `signal` is canceled.
    ///
    /// Every poll, the first one included, is preceded by a sleep of the
    /// last response's retry hint or the client's poll interval. For the
    /// sequence `[InProgress, InProgress, Succeeded]` that is three sleeps
    /// and three polls.
    ///
    /// The signal is checked before every poll and before and during every
    /// sleep. Canceling only stops the local wait.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Canceled`] when the signal fires, plus every error
    /// of [`wait_for_completion`](Self::wait_for_completion).
    pub async fn wait_for_completion_with(
        &mut self,
        signal: &CancellationSignal,
    ) -> Result<T, ArmError>
    where
        T: Clone,
    {
        self.drive(signal).await?;
        match &self.outcome {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(e)) => Err(e.clone().into()),
            None => Err(ArmError::Canceled),
        }
    }

    async fn drive(&mut self, signal: &CancellationSignal) -> Result<(), ArmError> {
        loop {
            match &self.outcome {
                Some(Ok(_)) => return Ok(()),
                Some(Err(e)) => return Err(e.clone().into()),
                None => {}
            }

            if self.state.is_terminal() {
                self.finish().await?;
                continue;
            }

            if signal.is_canceled() {
                return Err(ArmError::Canceled);
            }

            let delay = self.last_response.retry_after().unwrap_or(self.poll_interval);
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = signal.canceled() => return Err(ArmError::Canceled),
            }

            if signal.is_canceled() {
                return Err(ArmError::Canceled);
            }
            self.update_status().await?;
        }
    }

    async fn finish(&mut self) -> Result<(), ArmError> {
        if self.state != OperationState::Succeeded {
            let error = self.failure();
            tracing::warn!(
                "{} {} ended {}: {}",
                self.original.method,
                self.original.path,
                self.state,
                error.message
            );
            self.outcome = Some(Err(error));
            return Ok(());
        }

        if let Some(request) = self.final_request()? {
            self.last_response = self.pipeline.request(request).await?;
        }
        let value = self.source.from_response(&self.last_response)?;
        self.outcome = Some(Ok(value));
        Ok(())
    }

    fn final_request(&self) -> Result<Option<HttpRequest>, ArmError> {
        let method = self.original.method;
        if !self.source.needs_payload() || method == HttpMethod::Delete {
            return Ok(None);
        }

        if method == HttpMethod::Put {
            return match self.polling {
                Polling::ProvisioningState => Ok(None),
                _ => self.original.get().map(Some),
            };
        }

        let url = match self.final_state_via {
            FinalStateVia::Location => match (&self.polling, &self.initial_location) {
                (Polling::Location(_), _) | (_, None) => None,
                (_, Some(location)) => Some(location.clone()),
            },
            FinalStateVia::OriginalUri => {
                if self.polling == Polling::ProvisioningState {
                    None
                } else {
                    return self.original.get().map(Some);
                }
            }
            FinalStateVia::AzureAsyncOperation | FinalStateVia::OperationLocation => self
                .last_response
                .body
                .get("resourceLocation")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
        };

        if let Some(url) = url {
            return Ok(Some(HttpRequest::builder(HttpMethod::Get, url).build()?));
        }

        // A status monitor body describes the operation, never the resource.
        let reread = method == HttpMethod::Patch
            && match self.polling {
                Polling::StatusMonitor(_) => true,
                Polling::ProvisioningState => false,
                Polling::Location(_) | Polling::Done => !self.last_response.has_content(),
            };
        if reread {
            return self.original.get().map(Some);
        }
        Ok(None)
    }

    fn failure(&self) -> OperationFailedError {
        let body = &self.last_response.body;
        let detail = serde_json::from_value::<ErrorResponse>(body.clone())
            .ok()
            .and_then(|r| r.error)
            .or_else(|| {
                body.pointer("/properties/error")
                    .and_then(|e| serde_json::from_value(e.clone()).ok())
            })
            .unwrap_or_default();

        OperationFailedError {
            state: self.state,
            error_code: detail.code,
            message: detail
                .message
                .unwrap_or_else(|| format!("The operation ended in state {}", self.state)),
            request_id: self.last_response.request_id().map(str::to_string),
        }
    }
}

impl<T> fmt::Debug for ArmOperation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmOperation")
            .field("method", &self.original.method)
            .field("path", &self.original.path)
            .field("state", &self.state)
            .field("final_state_via", &self.final_state_via)
            .field("has_outcome", &self.outcome.is_some())
            .finish_non_exhaustive()
    }
}

fn provisioning_state(response: &HttpResponse) -> Option<OperationState> {
    response
        .body
        .pointer("/properties/provisioningState")
        .and_then(serde_json::Value::as_str)
        .map(OperationState::from_status)
}
