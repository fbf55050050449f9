//! # Azure API Rust SDK core
//!
//! A Rust SDK core for Azure resource management and the language service
//! runtime, providing typed resource handles, lazy pagination, long-running
//! operation polling, and an authenticated HTTP pipeline with retries.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`ClientOptions`] and [`ClientOptionsBuilder`]
//! - Validated newtypes for keys, endpoints and `api-version` values
//! - Key and bearer-token authentication via [`auth`]
//! - Parsed, validated resource ids via [`arm::ResourceIdentifier`]
//! - Generic get/delete/update/tag operations via [`arm::TypedResource`]
//! - Lazy `nextLink` pagination via [`arm::Pageable`]
//! - Long-running operation polling with cancellation via [`arm::ArmOperation`]
//! - Service clients for machine learning, Cosmos DB and conversation
//!   analysis via [`services`]
//! - Blocking adapters over every async operation via [`blocking`]
//!
//! ## Quick Start
//!
//! ```rust
//! use azure_api::arm::ArmClient;
//! use azure_api::auth::{AccessToken, StaticTokenCredential};
//! use azure_api::services::machine_learning;
//! use azure_api::ClientOptions;
//! use std::sync::Arc;
//!
//! let credential = Arc::new(StaticTokenCredential::new(AccessToken::never_expiring("token")));
//! let client = ArmClient::new(credential, ClientOptions::default()).unwrap();
//!
//! let id = machine_learning::create_resource_identifier("sub", "rg", "ws", "endpoint", "blue")
//!     .unwrap();
//! let deployment = client.online_deployment(id).unwrap();
//! assert!(!deployment.has_data());
//! ```
//!
//! ## Long-Running Operations
//!
//! ```rust,ignore
//! use azure_api::arm::{CancellationSignal, WaitUntil};
//!
//! // Wait for the service to finish
//! deployment.delete(WaitUntil::Completed).await?;
//!
//! // Or start it and poll on your own terms
//! let mut operation = deployment.delete(WaitUntil::Started).await?;
//! let signal = CancellationSignal::new();
//! operation.wait_for_completion_with(&signal).await?;
//! ```
//!
//! ## Pagination
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//!
//! let mut skus = deployment.get_skus(Some(10), None)?;
//! while let Some(sku) = skus.try_next().await? {
//!     println!("{:?}", sku.sku);
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and spans (requests and polls at
//! `debug`, retries and failed operations at `warn`) and installs no
//! subscriber.
//!
//! ## Design Principles
//!
//! - **No global state**: Each client owns its pipeline and passes it explicitly
//! - **Fail-fast validation**: Newtypes and ids validate on construction,
//!   arguments are checked before any request is sent
//! - **Thread-safe**: Clients are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio, with blocking adapters

pub mod arm;
pub mod auth;
pub mod blocking;
pub mod clients;
pub mod config;
pub mod error;
pub mod services;

// Re-export public types at crate root for convenience
pub use config::{ApiKey, ApiVersion, ClientOptions, ClientOptionsBuilder, Endpoint};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};

// Re-export resource management types
pub use arm::{
    ArmClient, ArmError, ArmOperation, CancellationSignal, OperationState, Pageable,
    ResourceIdentifier, ResourceResponse, TypedResource, WaitUntil,
};
