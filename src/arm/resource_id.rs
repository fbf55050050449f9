//! Hierarchical Azure resource identifiers.
//!
//! A resource id is a `/`-separated list of segment pairs:
//!
//! ```text
//! /subscriptions/{s}/resourceGroups/{g}/providers/{ns}/{type}/{name}[/{child}/{name}]...
//! ```
//!
//! Each pair is `(typeSegment, nameSegment)` and `("providers", namespace)`
//! counts as a pair. The keywords `subscriptions`, `resourceGroups` and
//! `providers` are recognized ASCII case-insensitively; equality of two
//! identifiers is exact string equality.
//!
//! # Example
//!
//! ```rust
//! use azure_api::arm::ResourceIdentifier;
//!
//! let id = ResourceIdentifier::build(
//!     "sub",
//!     "rg",
//!     "Microsoft.MachineLearningServices",
//!     &[("workspaces", "w"), ("onlineEndpoints", "e"), ("deployments", "d")],
//! )
//! .unwrap();
//!
//! assert_eq!(id.name(), "d");
//! assert_eq!(
//!     id.resource_type(),
//!     "Microsoft.MachineLearningServices/workspaces/onlineEndpoints/deployments"
//! );
//! assert_eq!(id.parent().unwrap().name(), "e");
//! ```

use crate::arm::errors::ArmError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

const SUBSCRIPTIONS: &str = "subscriptions";
const RESOURCE_GROUPS: &str = "resourceGroups";
const PROVIDERS: &str = "providers";
const BUILTIN_NAMESPACE: &str = "Microsoft.Resources";

/// An immutable, parsed resource id.
#[derive(Clone)]
pub struct ResourceIdentifier {
    id: String,
    segments: Vec<String>,
}

impl ResourceIdentifier {
    /// Returns the tenant root identifier (`/`).
    #[must_use]
    pub fn root() -> Self {
        Self {
            id: "/".to_string(),
            segments: Vec::new(),
        }
    }

    /// Parses a resource id string.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidResourceId`] if the id does not start with
    /// `/`, contains empty segments, has an odd number of segments, or does
    /// not begin with `subscriptions` or `providers`.
    pub fn parse(id: &str) -> Result<Self, ArmError> {
        let invalid = |reason: &str| ArmError::InvalidResourceId {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = id
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<String> = trimmed.split('/').map(String::from).collect();
        if segments.iter().any(String::is_empty) {
            return Err(invalid("contains an empty segment"));
        }
        if segments.len() % 2 != 0 {
            return Err(invalid("must contain type/name segment pairs"));
        }
        let first = &segments[0];
        if !first.eq_ignore_ascii_case(SUBSCRIPTIONS) && !first.eq_ignore_ascii_case(PROVIDERS) {
            return Err(invalid("must begin with 'subscriptions' or 'providers'"));
        }

        Ok(Self::from_segments(segments))
    }

    /// Builds the id of a provider resource inside a resource group.
    ///
    /// `types_and_names` lists the `(type, name)` pairs that follow the
    /// provider namespace, outermost first.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if any segment is empty or
    /// contains `/`, or if `types_and_names` is empty.
    pub fn build(
        subscription_id: &str,
        resource_group_name: &str,
        namespace: &str,
        types_and_names: &[(&str, &str)],
    ) -> Result<Self, ArmError> {
        let (first, rest) = types_and_names
            .split_first()
            .ok_or_else(|| ArmError::InvalidArgument {
                name: "types_and_names",
                reason: "at least one (type, name) pair is required".to_string(),
            })?;

        let mut id = Self::subscription(subscription_id)?
            .resource_group(resource_group_name)?
            .append_provider_resource(namespace, first.0, first.1)?;
        for (resource_type, name) in rest {
            id = id.append_child_resource(resource_type, name)?;
        }
        Ok(id)
    }

    /// Builds a subscription id (`/subscriptions/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if the id is empty or contains `/`.
    pub fn subscription(subscription_id: &str) -> Result<Self, ArmError> {
        Self::root().append(&[
            ("subscription type", SUBSCRIPTIONS),
            ("subscription_id", subscription_id),
        ])
    }

    /// Appends a resource group to a subscription id.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if the name is empty or contains `/`.
    pub fn resource_group(&self, resource_group_name: &str) -> Result<Self, ArmError> {
        self.append(&[
            ("resource group type", RESOURCE_GROUPS),
            ("resource_group_name", resource_group_name),
        ])
    }

    /// Appends `providers/{namespace}/{type}/{name}`.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if any segment is empty or
    /// contains `/`.
    pub fn append_provider_resource(
        &self,
        namespace: &str,
        resource_type: &str,
        name: &str,
    ) -> Result<Self, ArmError> {
        self.append(&[
            ("providers", PROVIDERS),
            ("namespace", namespace),
            ("resource_type", resource_type),
            ("name", name),
        ])
    }

    /// Appends a child `{type}/{name}` pair.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if either segment is empty or
    /// contains `/`.
    pub fn append_child_resource(&self, resource_type: &str, name: &str) -> Result<Self, ArmError> {
        self.append(&[("resource_type", resource_type), ("name", name)])
    }

    /// Returns the parent id, or `None` for the tenant root.
    ///
    /// The last pair is dropped; a `providers/{namespace}` pair left dangling
    /// at the end is dropped too.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments[..self.segments.len() - 2].to_vec();
        if segments.len() >= 2 && segments[segments.len() - 2].eq_ignore_ascii_case(PROVIDERS) {
            segments.truncate(segments.len() - 2);
        }
        Some(Self::from_segments(segments))
    }

    /// Returns the last name segment, or `""` for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Returns `true` for the tenant root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the subscription id, if the id is scoped to a subscription.
    #[must_use]
    pub fn subscription_id(&self) -> Option<&str> {
        self.pairs()
            .next()
            .filter(|(key, _)| key.eq_ignore_ascii_case(SUBSCRIPTIONS))
            .map(|(_, value)| value)
    }

    /// Returns the resource group name, if the id is scoped to one.
    #[must_use]
    pub fn resource_group_name(&self) -> Option<&str> {
        self.pairs()
            .take_while(|(key, _)| !key.eq_ignore_ascii_case(PROVIDERS))
            .find(|(key, _)| key.eq_ignore_ascii_case(RESOURCE_GROUPS))
            .map(|(_, value)| value)
    }

    /// Returns the innermost provider namespace, if any.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        self.pairs()
            .filter(|(key, _)| key.eq_ignore_ascii_case(PROVIDERS))
            .last()
            .map(|(_, value)| value)
    }

    /// Returns the full resource type, e.g.
    /// `Microsoft.DocumentDB/locations/restorableDatabaseAccounts`.
    ///
    /// Ids without a provider resolve to a `Microsoft.Resources` type named
    /// after their last type segment.
    #[must_use]
    pub fn resource_type(&self) -> String {
        let pairs: Vec<(&str, &str)> = self.pairs().collect();
        let Some((last_key, _)) = pairs.last() else {
            return format!("{BUILTIN_NAMESPACE}/tenants");
        };

        match pairs
            .iter()
            .rposition(|(key, _)| key.eq_ignore_ascii_case(PROVIDERS))
        {
            Some(index) if index + 1 < pairs.len() => {
                let mut resource_type = pairs[index].1.to_string();
                for (key, _) in &pairs[index + 1..] {
                    resource_type.push('/');
                    resource_type.push_str(key);
                }
                resource_type
            }
            Some(_) => format!("{BUILTIN_NAMESPACE}/{PROVIDERS}"),
            None if last_key.eq_ignore_ascii_case(SUBSCRIPTIONS) => {
                format!("{BUILTIN_NAMESPACE}/{SUBSCRIPTIONS}")
            }
            None if last_key.eq_ignore_ascii_case(RESOURCE_GROUPS) => {
                format!("{BUILTIN_NAMESPACE}/{RESOURCE_GROUPS}")
            }
            None => format!("{BUILTIN_NAMESPACE}/{last_key}"),
        }
    }

    /// Fails with [`ArmError::TypeMismatch`] unless the resource type equals
    /// `expected` (ASCII case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::TypeMismatch`] on mismatch.
    pub fn validate(&self, expected: &str) -> Result<(), ArmError> {
        let actual = self.resource_type();
        if actual.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(ArmError::TypeMismatch {
                actual,
                expected: expected.to_string(),
            })
        }
    }

    /// Returns the id with every segment percent-encoded, for use as a
    /// request path.
    #[must_use]
    pub fn to_request_path(&self) -> String {
        if self.segments.is_empty() {
            return String::new();
        }
        self.segments.iter().fold(String::new(), |mut path, segment| {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
            path
        })
    }

    /// Returns the id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.id
    }

    fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.segments
            .chunks_exact(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    fn append(&self, additions: &[(&'static str, &str)]) -> Result<Self, ArmError> {
        let mut segments = self.segments.clone();
        for (name, value) in additions {
            check_segment(name, value)?;
            segments.push((*value).to_string());
        }
        Ok(Self::from_segments(segments))
    }

    fn from_segments(segments: Vec<String>) -> Self {
        if segments.is_empty() {
            return Self::root();
        }
        let id = segments.iter().fold(String::new(), |mut id, segment| {
            id.push('/');
            id.push_str(segment);
            id
        });
        Self { id, segments }
    }
}

fn check_segment(name: &'static str, value: &str) -> Result<(), ArmError> {
    if value.is_empty() {
        return Err(ArmError::InvalidArgument {
            name,
            reason: "cannot be empty".to_string(),
        });
    }
    if value.contains('/') {
        return Err(ArmError::InvalidArgument {
            name,
            reason: format!("'{value}' cannot contain '/'"),
        });
    }
    Ok(())
}

impl PartialEq for ResourceIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResourceIdentifier {}

impl Hash for ResourceIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for ResourceIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResourceIdentifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceIdentifier({})", self.id)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl FromStr for ResourceIdentifier {
    type Err = ArmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ResourceIdentifier {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

impl Serialize for ResourceIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.id)
    }
}

impl<'de> Deserialize<'de> for ResourceIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}
