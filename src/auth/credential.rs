//! Credential types.

use crate::config::ApiKey;
use crate::error::ConfigError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use thiserror::Error;

/// Error returned when a credential cannot produce a token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The credential could not obtain a token.
    #[error("Failed to acquire a token for scopes [{scopes}]: {message}")]
    Unavailable {
        /// The requested scopes, comma separated.
        scopes: String,
        /// A description from the credential.
        message: String,
    },

    /// The credential returned a token that has already expired.
    #[error("Credential returned a token that expired at {expires_on}")]
    Expired {
        /// The expiry of the returned token.
        expires_on: DateTime<Utc>,
    },
}

/// A service key sent in a request header.
///
/// # Example
///
/// ```rust
/// use azure_api::auth::KeyCredential;
///
/// let credential = KeyCredential::new("my-key").unwrap();
/// assert_eq!(credential.key(), "my-key");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyCredential {
    key: ApiKey,
}

impl KeyCredential {
    /// Creates a key credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            key: ApiKey::new(key)?,
        })
    }

    /// Returns the key value.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_ref()
    }
}

impl From<ApiKey> for KeyCredential {
    fn from(key: ApiKey) -> Self {
        Self { key }
    }
}

/// A bearer token and the instant it stops being valid.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    expires_on: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token that expires at `expires_on`.
    #[must_use]
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// Creates a token that is valid for `lifetime` from now.
    #[must_use]
    pub fn expires_in(token: impl Into<String>, lifetime: Duration) -> Self {
        Self::new(token, Utc::now() + lifetime)
    }

    /// Creates a token with no practical expiry. Useful for tests and
    /// pre-issued tokens.
    #[must_use]
    pub fn never_expiring(token: impl Into<String>) -> Self {
        Self::new(token, DateTime::<Utc>::MAX_UTC)
    }

    /// Returns the raw token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the expiry instant.
    #[must_use]
    pub const fn expires_on(&self) -> DateTime<Utc> {
        self.expires_on
    }

    /// Returns `true` if the token expires within `margin` of now.
    #[must_use]
    pub fn expires_within(&self, margin: Duration) -> bool {
        Utc::now()
            .checked_add_signed(margin)
            .map_or(true, |deadline| self.expires_on <= deadline)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"*****")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// A source of bearer tokens.
///
/// Implementations are expected to cache and refresh on their own if token
/// acquisition is expensive; the pipeline additionally caches the last token
/// until shortly before it expires.
#[async_trait]
pub trait TokenCredential: Send + Sync + fmt::Debug {
    /// Returns a token valid for the given scopes.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if no token can be produced.
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError>;
}

/// A credential that always returns the same token.
#[derive(Clone, Debug)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    /// Wraps a pre-issued token.
    #[must_use]
    pub const fn new(token: AccessToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        if self.token.expires_within(Duration::zero()) {
            return Err(CredentialError::Expired {
                expires_on: self.token.expires_on,
            });
        }
        Ok(self.token.clone())
    }
}
