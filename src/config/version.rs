//! Service API version values.
//!
//! Azure services version their REST surface with a date string passed as the
//! `api-version` query parameter, optionally suffixed with `-preview`.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A validated `api-version` value.
///
/// # Example
///
/// ```rust
/// use azure_api::ApiVersion;
///
/// let version: ApiVersion = "2022-10-01".parse().unwrap();
/// assert!(!version.is_preview());
/// assert_eq!(version.to_string(), "2022-10-01");
///
/// let preview = ApiVersion::new("2023-04-01-preview").unwrap();
/// assert!(preview.is_preview());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApiVersion(String);

impl ApiVersion {
    const PREVIEW_SUFFIX: &'static str = "-preview";

    /// Creates a new validated API version.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiVersion`] if the value is not a
    /// `YYYY-MM-DD` date with an optional `-preview` suffix.
    pub fn new(version: impl Into<String>) -> Result<Self, ConfigError> {
        let version = version.into();
        let date = version
            .strip_suffix(Self::PREVIEW_SUFFIX)
            .unwrap_or(&version);

        if !Self::is_valid_date(date) {
            return Err(ConfigError::InvalidApiVersion { version });
        }
        Ok(Self(version))
    }

    /// Returns `true` for `-preview` versions.
    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.0.ends_with(Self::PREVIEW_SUFFIX)
    }

    /// Returns the version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid_date(date: &str) -> bool {
        let parts: Vec<&str> = date.split('-').collect();
        if parts.len() != 3 {
            return false;
        }
        let digits = |s: &str, len: usize| s.len() == len && s.chars().all(|c| c.is_ascii_digit());
        if !digits(parts[0], 4) || !digits(parts[1], 2) || !digits(parts[2], 2) {
            return false;
        }
        let month: u32 = parts[1].parse().unwrap_or(0);
        let day: u32 = parts[2].parse().unwrap_or(0);
        (1..=12).contains(&month) && (1..=31).contains(&day)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ApiVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_stable_and_preview_versions() {
        assert!(ApiVersion::new("2022-05-01").is_ok());
        assert!(ApiVersion::new("2021-04-01-preview").unwrap().is_preview());
    }

    #[test]
    fn test_rejects_malformed_versions() {
        for bad in ["", "2022-05", "2022-13-01", "2022-00-10", "22-05-01", "2022-05-01-beta"] {
            assert!(
                matches!(ApiVersion::new(bad), Err(ConfigError::InvalidApiVersion { .. })),
                "expected {bad} to be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trips() {
        let version: ApiVersion = "2022-08-15".parse().unwrap();
        assert_eq!(version.to_string(), "2022-08-15");
        assert_eq!(version.as_str(), "2022-08-15");
    }

    #[test]
    fn test_versions_order_by_date() {
        let older = ApiVersion::new("2021-04-01").unwrap();
        let newer = ApiVersion::new("2022-10-01").unwrap();
        assert!(older < newer);
    }
}
