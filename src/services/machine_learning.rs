//! Machine learning online deployments.
//!
//! An online deployment lives under a workspace's online endpoint:
//!
//! ```text
//! /subscriptions/{s}/resourceGroups/{g}/providers/Microsoft.MachineLearningServices/
//!     workspaces/{w}/onlineEndpoints/{e}/deployments/{d}
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use azure_api::arm::WaitUntil;
//! use azure_api::services::machine_learning::{self, DeploymentLogsContent, OnlineDeploymentPatch};
//!
//! let id = machine_learning::create_resource_identifier("sub", "rg", "ws", "endpoint", "blue")?;
//! let deployment = client.online_deployment(id)?.get().await?.into_inner();
//!
//! let logs = deployment.get_logs(&DeploymentLogsContent::tail(100)).await?;
//! println!("{}", logs.content.as_deref().unwrap_or_default());
//!
//! let patch = OnlineDeploymentPatch::default().with_tag("owner", "ml-team");
//! deployment.update(WaitUntil::Completed, &patch).await?;
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::arm::models::SystemData;
use crate::arm::{
    ArmClient, ArmError, FinalStateVia, Pageable, ResourceData, ResourceIdentifier,
    ResourceOperation, ResourcePath, ResourceResponse, TypedResource,
};
use crate::clients::HttpMethod;

/// Provider namespace of machine learning resources.
pub const NAMESPACE: &str = "Microsoft.MachineLearningServices";

/// A handle to an online deployment.
pub type OnlineDeploymentResource = TypedResource<OnlineDeploymentData>;

/// Builds the id of an online deployment.
///
/// # Errors
///
/// Returns [`ArmError::InvalidArgument`] if any name is empty or contains `/`.
pub fn create_resource_identifier(
    subscription_id: &str,
    resource_group_name: &str,
    workspace_name: &str,
    endpoint_name: &str,
    deployment_name: &str,
) -> Result<ResourceIdentifier, ArmError> {
    ResourceIdentifier::build(
        subscription_id,
        resource_group_name,
        NAMESPACE,
        &[
            ("workspaces", workspace_name),
            ("onlineEndpoints", endpoint_name),
            ("deployments", deployment_name),
        ],
    )
}

/// An online deployment as returned by the service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineDeploymentData {
    /// Resource id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceIdentifier>,
    /// Deployment name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Resource type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Creation and modification metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_data: Option<SystemData>,
    /// Resource tags.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    /// Azure region.
    #[serde(default)]
    pub location: String,
    /// Metadata used by portal tooling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Deployment properties.
    #[serde(default)]
    pub properties: OnlineDeploymentProperties,
    /// Managed identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<ManagedServiceIdentity>,
    /// Deployment SKU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
}

/// Properties of an online deployment.
///
/// The commonly used fields are typed; compute-type specific settings
/// (probes, scale settings, request settings, ...) are kept as JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineDeploymentProperties {
    /// `Managed`, `Kubernetes` or `AzureMLCompute`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_compute_type: Option<String>,
    /// Provisioning state reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    /// Model asset id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Compute instance type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Remaining properties.
    #[serde(flatten)]
    pub additional: serde_json::Map<String, serde_json::Value>,
}

/// A managed service identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedServiceIdentity {
    /// `None`, `SystemAssigned`, `UserAssigned` or `SystemAssigned,UserAssigned`.
    #[serde(rename = "type")]
    pub identity_type: String,
    /// Service principal id of the system-assigned identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    /// Tenant of the system-assigned identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// User-assigned identities keyed by resource id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_assigned_identities: Option<serde_json::Value>,
}

/// A resource SKU.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    /// SKU name.
    pub name: String,
    /// `Free`, `Basic`, `Standard` or `Premium`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    /// SKU size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Hardware family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Instance count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
}

/// Body of a deployment update (PATCH).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineDeploymentPatch {
    /// Replacement tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
    /// SKU changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<serde_json::Value>,
    /// Identity changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<serde_json::Value>,
    /// Kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Property changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

impl OnlineDeploymentPatch {
    /// Adds a tag to the patch.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Container whose logs are requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerType {
    /// The model download container.
    StorageInitializer,
    /// The scoring container.
    InferenceServer,
}

/// Body of a `getLogs` request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentLogsContent {
    /// Container to read logs from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<ContainerType>,
    /// Number of trailing lines to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<i32>,
}

impl DeploymentLogsContent {
    /// Requests the last `lines` lines of the inference server log.
    #[must_use]
    pub const fn tail(lines: i32) -> Self {
        Self {
            container_type: Some(ContainerType::InferenceServer),
            tail: Some(lines),
        }
    }
}

/// Logs returned by `getLogs`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentLogs {
    /// The retrieved log text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A SKU the deployment can scale to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuResource {
    /// Resource type the SKU applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// SKU name and tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<SkuSetting>,
    /// Scale limits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<SkuCapacity>,
}

/// SKU name and tier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuSetting {
    /// SKU name.
    pub name: String,
    /// SKU tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

/// Scale limits of a SKU.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuCapacity {
    /// Minimum instance count.
    #[serde(default)]
    pub minimum: i32,
    /// Maximum instance count.
    #[serde(default)]
    pub maximum: i32,
    /// Default instance count.
    #[serde(default)]
    pub default: i32,
    /// `Automatic`, `Manual` or `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_type: Option<String>,
}

impl ResourceData for OnlineDeploymentData {
    type Patch = OnlineDeploymentPatch;

    const NAME: &'static str = "OnlineDeployment";
    const RESOURCE_TYPE: &'static str =
        "Microsoft.MachineLearningServices/workspaces/onlineEndpoints/deployments";
    const API_VERSION: &'static str = "2022-10-01";
    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(HttpMethod::Get, ResourceOperation::Get, ""),
        ResourcePath::new(HttpMethod::Put, ResourceOperation::CreateOrUpdate, ""),
        ResourcePath::new(HttpMethod::Patch, ResourceOperation::Update, "")
            .final_state(FinalStateVia::Location),
        ResourcePath::new(HttpMethod::Delete, ResourceOperation::Delete, "")
            .final_state(FinalStateVia::Location),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::List("skus"), "/skus"),
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Action("getLogs"), "/getLogs"),
    ];

    fn id(&self) -> Option<&ResourceIdentifier> {
        self.id.as_ref()
    }
}

impl TypedResource<OnlineDeploymentData> {
    /// Fetches container logs.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::RequestFailed`] on a non-2xx status.
    pub async fn get_logs(
        &self,
        content: &DeploymentLogsContent,
    ) -> Result<ResourceResponse<DeploymentLogs>, ArmError> {
        self.invoke_action("getLogs", Some(content)).await
    }

    /// Lists the SKUs the deployment can scale to.
    ///
    /// `count` is the page size; `skip` is a continuation token understood
    /// by the service.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if `count` is zero or negative.
    /// The check runs locally before any request; such values are never
    /// forwarded to the service.
    pub fn get_skus(
        &self,
        count: Option<i32>,
        skip: Option<&str>,
    ) -> Result<Pageable<SkuResource>, ArmError> {
        let mut query = Vec::new();
        if let Some(count) = count {
            if count <= 0 {
                return Err(ArmError::InvalidArgument {
                    name: "count",
                    reason: format!("must be positive, got {count}"),
                });
            }
            query.push(("count", count.to_string()));
        }
        if let Some(skip) = skip {
            query.push(("$skip", skip.to_string()));
        }
        self.list_with_query("skus", &query, None)
    }
}

impl ArmClient {
    /// Returns a handle to an online deployment without fetching it.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::TypeMismatch`] if `id` is not an online deployment.
    pub fn online_deployment(&self, id: ResourceIdentifier) -> Result<OnlineDeploymentResource, ArmError> {
        self.resource(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_resource_identifier() {
        let id = create_resource_identifier("sub", "rg", "ws", "ep", "blue").unwrap();
        assert_eq!(
            id.as_str(),
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.MachineLearningServices/workspaces/ws/onlineEndpoints/ep/deployments/blue"
        );
        assert!(id.validate(OnlineDeploymentData::RESOURCE_TYPE).is_ok());
    }

    #[test]
    fn test_create_resource_identifier_rejects_empty_names() {
        let result = create_resource_identifier("sub", "rg", "ws", "", "blue");
        assert!(matches!(result, Err(ArmError::InvalidArgument { .. })));
    }

    #[test]
    fn test_deserialize_deployment_keeps_unknown_properties() {
        let data: OnlineDeploymentData = serde_json::from_value(json!({
            "id": "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.MachineLearningServices/workspaces/ws/onlineEndpoints/ep/deployments/blue",
            "name": "blue",
            "location": "westus2",
            "tags": {"env": "prod"},
            "sku": {"name": "Default", "capacity": 2},
            "properties": {
                "endpointComputeType": "Managed",
                "provisioningState": "Succeeded",
                "scaleSettings": {"scaleType": "Default"}
            }
        }))
        .unwrap();

        assert_eq!(data.tags.get("env").map(String::as_str), Some("prod"));
        assert_eq!(data.sku.unwrap().capacity, Some(2));
        assert_eq!(data.properties.endpoint_compute_type.as_deref(), Some("Managed"));
        assert!(data.properties.additional.contains_key("scaleSettings"));
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = OnlineDeploymentPatch::default().with_tag("owner", "ml");
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"tags": {"owner": "ml"}})
        );
    }

    #[test]
    fn test_logs_content_serialization() {
        assert_eq!(
            serde_json::to_value(DeploymentLogsContent::tail(50)).unwrap(),
            json!({"containerType": "InferenceServer", "tail": 50})
        );
    }
}
