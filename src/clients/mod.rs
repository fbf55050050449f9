//! HTTP client types for Azure service communication.
//!
//! This module provides the request pipeline every higher-level client is
//! built on. It handles request/response processing, authentication, retry
//! logic, and Azure-specific header parsing.
//!
//! # Overview
//!
//! - [`HttpClient`]: The async request pipeline
//! - [`HttpRequest`]: A request to be sent to the service
//! - [`HttpResponse`]: A parsed response from the service
//! - [`HttpMethod`]: Supported HTTP methods
//!
//! # Retry Behavior
//!
//! - **408, 429, 500, 502, 503, 504**: Retried using `retry-after-ms` or
//!   `Retry-After` when present, otherwise after a fixed 1-second delay
//! - **Other errors (4xx)**: Returned immediately without retry
//!
//! The number of attempts comes from
//! [`ClientOptions::max_tries`](crate::ClientOptions::max_tries) (default 3)
//! and can be overridden per request with [`HttpRequestBuilder::tries`].

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, RETRY_WAIT_TIME, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
