//! Operation tables for resource types.
//!
//! Every resource data shape declares which REST operations it supports as
//! a const table of [`ResourcePath`] rows. Each row names the operation, the
//! HTTP method, a suffix appended to the resource's own path, and, for
//! long-running operations, where the final result is read from.
//!
//! # Example
//!
//! ```rust
//! use azure_api::arm::{get_path, FinalStateVia, ResourceOperation, ResourcePath};
//! use azure_api::clients::HttpMethod;
//!
//! const PATHS: &[ResourcePath] = &[
//!     ResourcePath::new(HttpMethod::Get, ResourceOperation::Get, ""),
//!     ResourcePath::new(HttpMethod::Delete, ResourceOperation::Delete, "")
//!         .final_state(FinalStateVia::Location),
//!     ResourcePath::new(HttpMethod::Get, ResourceOperation::List("skus"), "/skus"),
//! ];
//!
//! let path = get_path(PATHS, ResourceOperation::List("skus")).unwrap();
//! assert_eq!(path.suffix, "/skus");
//! assert!(get_path(PATHS, ResourceOperation::Update).is_none());
//! ```

use crate::arm::operation::FinalStateVia;
use crate::clients::HttpMethod;
use std::fmt;

/// Operations a resource can support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOperation {
    /// Read the resource.
    Get,
    /// Create or replace the resource.
    CreateOrUpdate,
    /// Partially update the resource.
    Update,
    /// Delete the resource.
    Delete,
    /// List a named sub-resource collection (e.g. `skus`).
    List(&'static str),
    /// Invoke a named action (e.g. `getLogs`).
    Action(&'static str),
}

impl ResourceOperation {
    /// Returns the operation name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::CreateOrUpdate => "createOrUpdate",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List(name) | Self::Action(name) => name,
        }
    }
}

impl fmt::Display for ResourceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a resource's operation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePath {
    /// The HTTP method for this operation.
    pub http_method: HttpMethod,
    /// The operation this row describes.
    pub operation: ResourceOperation,
    /// Appended to the resource's request path (empty for the resource itself).
    pub suffix: &'static str,
    /// Where a long-running operation's final result is read from.
    pub final_state: Option<FinalStateVia>,
}

impl ResourcePath {
    /// Creates a new row with no final-state policy.
    #[must_use]
    pub const fn new(
        http_method: HttpMethod,
        operation: ResourceOperation,
        suffix: &'static str,
    ) -> Self {
        Self {
            http_method,
            operation,
            suffix,
            final_state: None,
        }
    }

    /// Sets the final-state policy for a long-running operation.
    #[must_use]
    pub const fn final_state(mut self, via: FinalStateVia) -> Self {
        self.final_state = Some(via);
        self
    }

    /// Returns the final-state policy, defaulting by method: PUT and PATCH
    /// re-read the original URI, everything else follows `Location`.
    #[must_use]
    pub const fn final_state_or_default(&self) -> FinalStateVia {
        match (self.final_state, self.http_method) {
            (Some(via), _) => via,
            (None, HttpMethod::Put | HttpMethod::Patch) => FinalStateVia::OriginalUri,
            (None, _) => FinalStateVia::Location,
        }
    }
}

/// Returns the row for `operation`, if the table has one.
#[must_use]
pub fn get_path(paths: &[ResourcePath], operation: ResourceOperation) -> Option<&ResourcePath> {
    paths.iter().find(|p| p.operation == operation)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATHS: &[ResourcePath] = &[
        ResourcePath::new(HttpMethod::Get, ResourceOperation::Get, ""),
        ResourcePath::new(HttpMethod::Patch, ResourceOperation::Update, "")
            .final_state(FinalStateVia::Location),
        ResourcePath::new(HttpMethod::Put, ResourceOperation::CreateOrUpdate, ""),
        ResourcePath::new(HttpMethod::Delete, ResourceOperation::Delete, ""),
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Action("getLogs"), "/getLogs"),
    ];

    #[test]
    fn test_get_path_matches_named_operations() {
        let path = get_path(PATHS, ResourceOperation::Action("getLogs")).unwrap();
        assert_eq!(path.http_method, HttpMethod::Post);
        assert_eq!(path.suffix, "/getLogs");
        assert!(get_path(PATHS, ResourceOperation::Action("restart")).is_none());
        assert!(get_path(PATHS, ResourceOperation::List("skus")).is_none());
    }

    #[test]
    fn test_final_state_defaults() {
        let update = get_path(PATHS, ResourceOperation::Update).unwrap();
        assert_eq!(update.final_state_or_default(), FinalStateVia::Location);

        let put = get_path(PATHS, ResourceOperation::CreateOrUpdate).unwrap();
        assert_eq!(put.final_state_or_default(), FinalStateVia::OriginalUri);

        let delete = get_path(PATHS, ResourceOperation::Delete).unwrap();
        assert_eq!(delete.final_state_or_default(), FinalStateVia::Location);
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(ResourceOperation::CreateOrUpdate.as_str(), "createOrUpdate");
        assert_eq!(ResourceOperation::List("skus").to_string(), "skus");
    }
}
