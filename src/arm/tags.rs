//! The tag sub-resource every tracked resource exposes at
//! `{id}/providers/Microsoft.Resources/tags/default`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::arm::operation::FinalStateVia;
use crate::arm::path::{ResourceOperation, ResourcePath};
use crate::arm::resource::ResourceData;
use crate::arm::resource_id::ResourceIdentifier;
use crate::clients::HttpMethod;

/// Namespace of the tag resource.
pub const TAGS_NAMESPACE: &str = "Microsoft.Resources";

/// Name of the single tag resource under a scope.
pub const TAGS_NAME: &str = "default";

/// The tag set of a resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagResourceData {
    /// Resource id of the tag resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceIdentifier>,
    /// Always `default`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `Microsoft.Resources/tags`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// The tags.
    #[serde(default)]
    pub properties: Tags,
}

/// The `properties` object of a tag resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    /// Tag names and values.
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl TagResourceData {
    /// Returns the tag map.
    #[must_use]
    pub const fn tags(&self) -> &HashMap<String, String> {
        &self.properties.tags
    }

    /// Returns the tag map for modification.
    pub fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.properties.tags
    }
}

impl ResourceData for TagResourceData {
    type Patch = TagResourceData;

    const NAME: &'static str = "TagResource";
    const RESOURCE_TYPE: &'static str = "Microsoft.Resources/tags";
    const API_VERSION: &'static str = "2021-04-01";
    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(HttpMethod::Get, ResourceOperation::Get, ""),
        ResourcePath::new(HttpMethod::Put, ResourceOperation::CreateOrUpdate, ""),
        ResourcePath::new(HttpMethod::Delete, ResourceOperation::Delete, "")
            .final_state(FinalStateVia::Location),
    ];

    fn id(&self) -> Option<&ResourceIdentifier> {
        self.id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_tag_resource() {
        let data: TagResourceData = serde_json::from_value(json!({
            "id": "/subscriptions/s/providers/Microsoft.Resources/tags/default",
            "name": "default",
            "type": "Microsoft.Resources/tags",
            "properties": {"tags": {"env": "prod"}}
        }))
        .unwrap();

        assert_eq!(data.tags().get("env").map(String::as_str), Some("prod"));
        assert_eq!(data.id.unwrap().name(), "default");
    }

    #[test]
    fn test_serializes_only_tags_when_empty() {
        let mut data = TagResourceData::default();
        data.tags_mut().insert("a".to_string(), "1".to_string());
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"properties": {"tags": {"a": "1"}}})
        );
    }
}
