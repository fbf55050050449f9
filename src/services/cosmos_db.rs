//! Cosmos DB restorable accounts and the MongoDB databases they can restore.

use serde::{Deserialize, Serialize};

use crate::arm::models::{non_nullable, SystemData};
use crate::arm::{
    ArmClient, ArmError, Pageable, ResourceData, ResourceIdentifier, ResourceOperation,
    ResourcePath, TypedResource,
};
use crate::clients::HttpMethod;

/// Provider namespace of Cosmos DB resources.
pub const NAMESPACE: &str = "Microsoft.DocumentDB";

/// A handle to a restorable database account.
pub type RestorableDatabaseAccountResource = TypedResource<RestorableDatabaseAccountData>;

/// Builds the id of a restorable database account.
///
/// # Errors
///
/// Returns [`ArmError::InvalidArgument`] if any segment is empty or contains `/`.
pub fn create_resource_identifier(
    subscription_id: &str,
    location: &str,
    instance_id: &str,
) -> Result<ResourceIdentifier, ArmError> {
    ResourceIdentifier::subscription(subscription_id)?
        .append_provider_resource(NAMESPACE, "locations", location)?
        .append_child_resource("restorableDatabaseAccounts", instance_id)
}

/// A deleted or live database account that can be restored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorableDatabaseAccountData {
    /// Resource id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceIdentifier>,
    /// Instance id of the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Resource type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Location the restore information is stored in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Account properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<RestorableDatabaseAccountProperties>,
}

/// Properties of a restorable database account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorableDatabaseAccountProperties {
    /// Name of the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    /// Creation time (ISO-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    /// Deletion time (ISO-8601), if the account was deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_time: Option<String>,
    /// API the account exposes (`MongoDB`, `Sql`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_type: Option<String>,
}

impl ResourceData for RestorableDatabaseAccountData {
    type Patch = ();

    const NAME: &'static str = "RestorableDatabaseAccount";
    const RESOURCE_TYPE: &'static str = "Microsoft.DocumentDB/locations/restorableDatabaseAccounts";
    const API_VERSION: &'static str = "2022-08-15";
    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(HttpMethod::Get, ResourceOperation::Get, ""),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::List("restorableMongodbDatabases"),
            "/restorableMongodbDatabases",
        ),
    ];

    fn id(&self) -> Option<&ResourceIdentifier> {
        self.id.as_ref()
    }
}

/// A MongoDB database event recorded for a restorable account.
///
/// `systemData`, `properties` and `properties.resource` may be absent but
/// must never be `null`; a `null` fails deserialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRestorableMongodbDatabase", into = "RawRestorableMongodbDatabase")]
pub struct RestorableMongodbDatabase {
    /// Resource id.
    pub id: Option<ResourceIdentifier>,
    /// Resource name.
    pub name: Option<String>,
    /// Resource type.
    pub resource_type: Option<String>,
    /// Creation and modification metadata.
    pub system_data: Option<SystemData>,
    /// The database event.
    pub resource: Option<RestorableMongodbDatabasePropertiesResource>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRestorableMongodbDatabase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<ResourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    resource_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "non_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    system_data: Option<SystemData>,
    #[serde(
        default,
        deserialize_with = "non_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    properties: Option<RawProperties>,
}

#[derive(Clone, Serialize, Deserialize)]
struct RawProperties {
    #[serde(
        default,
        deserialize_with = "non_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    resource: Option<RestorableMongodbDatabasePropertiesResource>,
}

impl From<RawRestorableMongodbDatabase> for RestorableMongodbDatabase {
    fn from(raw: RawRestorableMongodbDatabase) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            resource_type: raw.resource_type,
            system_data: raw.system_data,
            resource: raw.properties.and_then(|p| p.resource),
        }
    }
}

impl From<RestorableMongodbDatabase> for RawRestorableMongodbDatabase {
    fn from(database: RestorableMongodbDatabase) -> Self {
        Self {
            id: database.id,
            name: database.name,
            resource_type: database.resource_type,
            system_data: database.system_data,
            properties: database.resource.map(|resource| RawProperties {
                resource: Some(resource),
            }),
        }
    }
}

/// The event behind a [`RestorableMongodbDatabase`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorableMongodbDatabasePropertiesResource {
    /// System-generated id of the event.
    #[serde(rename = "_rid", default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    /// What happened to the database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<OperationType>,
    /// When the event happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_timestamp: Option<String>,
    /// Database name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Database resource id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_resource_id: Option<String>,
}

/// Kind of database event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    /// The database was created.
    Create,
    /// The database was replaced.
    Replace,
    /// The database was deleted.
    Delete,
    /// A service-initiated change.
    SystemOperation,
    /// A value this SDK version does not know.
    #[serde(other)]
    Unknown,
}

impl TypedResource<RestorableDatabaseAccountData> {
    /// Lists the MongoDB database events of this account.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::OperationNotSupported`] only if the operation
    /// table is missing the collection.
    pub fn get_restorable_mongodb_databases(
        &self,
    ) -> Result<Pageable<RestorableMongodbDatabase>, ArmError> {
        self.get_sub_resources("restorableMongodbDatabases", None, None)
    }
}

impl ArmClient {
    /// Returns a handle to a restorable database account without fetching it.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::TypeMismatch`] if `id` is not a restorable account.
    pub fn restorable_database_account(
        &self,
        id: ResourceIdentifier,
    ) -> Result<RestorableDatabaseAccountResource, ArmError> {
        self.resource(id)
    }
}
