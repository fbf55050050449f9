//! Resource management core.
//!
//! This module provides the building blocks shared by every management
//! service:
//!
//! - [`ResourceIdentifier`]: Parsed, validated resource ids
//! - [`TypedResource`]: Generic get/delete/update/tag operations over any
//!   [`ResourceData`] shape
//! - [`Pageable`]: Lazy pagination following `nextLink`
//! - [`ArmOperation`]: Long-running operation polling with cancellation
//! - [`ArmClient`]: The pipeline owner that hands out typed resources
//!
//! # Example
//!
//! ```rust,ignore
//! use azure_api::arm::{ArmClient, ResourceIdentifier, WaitUntil};
//! use azure_api::services::machine_learning::OnlineDeploymentData;
//!
//! let client = ArmClient::new(credential, ClientOptions::default())?;
//! let id: ResourceIdentifier = "/subscriptions/.../deployments/blue".parse()?;
//!
//! let deployment = client.resource::<OnlineDeploymentData>(id)?.get().await?;
//! let mut operation = deployment.delete(WaitUntil::Started).await?;
//! operation.wait_for_completion().await?;
//! ```

mod cancellation;
mod client;
mod errors;
pub mod models;
mod operation;
mod pager;
mod path;
mod resource;
mod resource_id;
mod response;
mod tags;

pub use cancellation::CancellationSignal;
pub use client::ArmClient;
pub use errors::{ArmError, OperationFailedError};
pub use operation::{
    ArmOperation, FinalStateVia, JsonSource, OperationSource, OperationState, UnitSource,
    WaitUntil,
};
pub use pager::{Page, Pageable};
pub use path::{get_path, ResourceOperation, ResourcePath};
pub use resource::{ResourceData, TypedResource};
pub use resource_id::ResourceIdentifier;
pub use response::ResourceResponse;

pub(crate) use response::parse_body;
pub use tags::{TagResourceData, Tags, TAGS_NAME, TAGS_NAMESPACE};
