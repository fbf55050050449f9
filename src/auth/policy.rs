//! Request authentication policy.

use super::credential::{AccessToken, CredentialError, KeyCredential, TokenCredential};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cached tokens are refreshed once they are this many seconds from expiring.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;

/// Fetches bearer tokens for one scope and caches the latest one.
pub struct BearerTokenPolicy {
    credential: Arc<dyn TokenCredential>,
    scopes: Vec<String>,
    cache: Mutex<Option<AccessToken>>,
}

impl BearerTokenPolicy {
    /// Creates a policy requesting tokens for `scope`.
    #[must_use]
    pub fn new(credential: Arc<dyn TokenCredential>, scope: impl Into<String>) -> Self {
        Self {
            credential,
            scopes: vec![scope.into()],
            cache: Mutex::new(None),
        }
    }

    /// Returns the requested scopes.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Returns the `Authorization` header value, refreshing the token if
    /// the cached one is missing or close to expiry.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the credential fails.
    pub async fn authorization(&self) -> Result<String, CredentialError> {
        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref() {
            if !token.expires_within(chrono::Duration::seconds(TOKEN_REFRESH_MARGIN_SECS)) {
                return Ok(format!("Bearer {}", token.token()));
            }
        }

        let scopes: Vec<&str> = self.scopes.iter().map(String::as_str).collect();
        tracing::debug!("Requesting token for scopes {:?}", scopes);
        let token = self.credential.get_token(&scopes).await?;
        let header = format!("Bearer {}", token.token());
        *cache = Some(token);
        Ok(header)
    }
}

impl fmt::Debug for BearerTokenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenPolicy")
            .field("credential", &self.credential)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

/// How the pipeline authenticates requests.
#[derive(Debug)]
pub enum AuthPolicy {
    /// No authentication header.
    None,
    /// A service key sent in the named header.
    Key {
        /// Header name, e.g. `Ocp-Apim-Subscription-Key`.
        header: String,
        /// The key.
        credential: KeyCredential,
    },
    /// A bearer token in the `Authorization` header.
    Bearer(BearerTokenPolicy),
}

impl AuthPolicy {
    /// Creates a key header policy.
    #[must_use]
    pub fn key(header: impl Into<String>, credential: KeyCredential) -> Self {
        Self::Key {
            header: header.into(),
            credential,
        }
    }

    /// Creates a bearer token policy for one scope.
    #[must_use]
    pub fn bearer(credential: Arc<dyn TokenCredential>, scope: impl Into<String>) -> Self {
        Self::Bearer(BearerTokenPolicy::new(credential, scope))
    }

    /// Returns the header to add to the next request, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if a bearer token cannot be acquired.
    pub async fn header(&self) -> Result<Option<(String, String)>, CredentialError> {
        match self {
            Self::None => Ok(None),
            Self::Key { header, credential } => {
                Ok(Some((header.clone(), credential.key().to_string())))
            }
            Self::Bearer(policy) => Ok(Some((
                "Authorization".to_string(),
                policy.authorization().await?,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct CountingCredential {
        calls: AtomicUsize,
        lifetime: chrono::Duration,
    }

    #[async_trait]
    impl TokenCredential for CountingCredential {
        async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError> {
            assert_eq!(scopes, ["https://management.azure.com/.default"]);
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::expires_in(format!("token-{n}"), self.lifetime))
        }
    }

    #[tokio::test]
    async fn test_bearer_policy_caches_token() {
        let credential = Arc::new(CountingCredential {
            calls: AtomicUsize::new(0),
            lifetime: chrono::Duration::hours(1),
        });
        let policy = AuthPolicy::bearer(credential.clone(), crate::auth::ARM_SCOPE);

        let first = policy.header().await.unwrap().unwrap();
        let second = policy.header().await.unwrap().unwrap();

        assert_eq!(first, ("Authorization".to_string(), "Bearer token-0".to_string()));
        assert_eq!(first, second);
        assert_eq!(credential.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bearer_policy_refreshes_near_expiry() {
        let credential = Arc::new(CountingCredential {
            calls: AtomicUsize::new(0),
            lifetime: chrono::Duration::minutes(1),
        });
        let policy = AuthPolicy::bearer(credential.clone(), crate::auth::ARM_SCOPE);

        policy.header().await.unwrap();
        let (_, value) = policy.header().await.unwrap().unwrap();

        assert_eq!(value, "Bearer token-1");
        assert_eq!(credential.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_key_policy_uses_named_header() {
        let policy = AuthPolicy::key(
            "Ocp-Apim-Subscription-Key",
            KeyCredential::new("k-123").unwrap(),
        );
        let header = policy.header().await.unwrap();
        assert_eq!(
            header,
            Some(("Ocp-Apim-Subscription-Key".to_string(), "k-123".to_string()))
        );
    }

    #[tokio::test]
    async fn test_none_policy_adds_nothing() {
        assert_eq!(AuthPolicy::None.header().await.unwrap(), None);
    }
}
