//! Wire models shared by every resource provider.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Creation and last-modification metadata the service attaches to a resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemData {
    /// Identity that created the resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Kind of identity that created the resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_type: Option<CreatedByType>,
    /// Creation timestamp (UTC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Identity that last modified the resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    /// Kind of identity that last modified the resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by_type: Option<CreatedByType>,
    /// Last modification timestamp (UTC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
}

/// The kind of identity behind a [`SystemData`] entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreatedByType {
    /// A user principal.
    User,
    /// An application (service principal).
    Application,
    /// A managed identity.
    ManagedIdentity,
    /// An access key.
    Key,
    /// A value this SDK version does not know.
    #[serde(other)]
    Unknown,
}

/// A page of a list response: `{ "value": [...], "nextLink": "..." }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResult<T> {
    /// The items on this page.
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    /// Absolute URL of the next page, if any.
    #[serde(rename = "nextLink", default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

/// The standard error envelope: `{ "error": { ... } }`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The error detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

/// A service error with optional nested details.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The element the error refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Nested errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
}

/// Deserializes a property that may be absent but must never be `null`.
///
/// Use with `#[serde(default, deserialize_with = "non_nullable")]` on an
/// `Option<T>` field: a missing property yields `None`, an explicit `null`
/// is rejected.
///
/// # Errors
///
/// Returns a deserialization error when the value is `null`.
pub fn non_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)?
        .map(Some)
        .ok_or_else(|| de::Error::custom("non-nullable property was null"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "non_nullable")]
        required: Option<String>,
    }

    #[test]
    fn test_non_nullable_distinguishes_absent_from_null() {
        let absent: Sample = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.required, None);

        let present: Sample = serde_json::from_value(json!({"required": "x"})).unwrap();
        assert_eq!(present.required.as_deref(), Some("x"));

        let err = serde_json::from_value::<Sample>(json!({"required": null})).unwrap_err();
        assert!(err.to_string().contains("non-nullable"));
    }

    #[test]
    fn test_system_data_parses_timestamps_and_unknown_types() {
        let data: SystemData = serde_json::from_value(json!({
            "createdBy": "someone@example.com",
            "createdByType": "User",
            "createdAt": "2022-10-01T12:00:00Z",
            "lastModifiedByType": "Robot"
        }))
        .unwrap();

        assert_eq!(data.created_by_type, Some(CreatedByType::User));
        assert_eq!(data.last_modified_by_type, Some(CreatedByType::Unknown));
        assert_eq!(
            data.created_at.unwrap().to_rfc3339(),
            "2022-10-01T12:00:00+00:00"
        );
    }

    #[test]
    fn test_list_result_defaults() {
        let list: ListResult<u32> = serde_json::from_value(json!({})).unwrap();
        assert!(list.value.is_empty());
        assert!(list.next_link.is_none());

        let list: ListResult<u32> =
            serde_json::from_value(json!({"value": [1, 2], "nextLink": "https://x/next"})).unwrap();
        assert_eq!(list.value, vec![1, 2]);
        assert_eq!(list.next_link.as_deref(), Some("https://x/next"));
    }

    #[test]
    fn test_error_response_nested_details() {
        let response: ErrorResponse = serde_json::from_value(json!({
            "error": {
                "code": "BadRequest",
                "message": "Invalid",
                "details": [{"code": "Inner", "target": "sku"}]
            }
        }))
        .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code.as_deref(), Some("BadRequest"));
        assert_eq!(error.details[0].target.as_deref(), Some("sku"));
    }
}
