//! Conversation analysis (language service runtime).
//!
//! Requests and results are passed as JSON; the task shapes are documented
//! by the language service REST reference.
//!
//! # Example
//!
//! ```rust,ignore
//! use azure_api::auth::KeyCredential;
//! use azure_api::services::conversations::ConversationAnalysisClient;
//! use azure_api::{ClientOptions, Endpoint};
//! use serde_json::json;
//!
//! let client = ConversationAnalysisClient::new(
//!     Endpoint::new("https://my-language.cognitiveservices.azure.com")?,
//!     KeyCredential::new(std::env::var("LANGUAGE_KEY")?)?,
//!     ClientOptions::default(),
//! )?;
//!
//! let result = client
//!     .analyze_conversation(&json!({
//!         "kind": "Conversation",
//!         "analysisInput": {"conversationItem": {"id": "1", "participantId": "1", "text": "Send an email to Carol"}},
//!         "parameters": {"projectName": "Menu", "deploymentName": "production"}
//!     }))
//!     .await?;
//! println!("{}", result["result"]["prediction"]["topIntent"]);
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::arm::{
    parse_body, ArmError, ArmOperation, FinalStateVia, JsonSource, ResourceResponse, WaitUntil,
};
use crate::auth::{AuthPolicy, KeyCredential, TokenCredential, COGNITIVE_SERVICES_SCOPE};
use crate::clients::{HttpClient, HttpMethod, HttpRequest};
use crate::config::{ClientOptions, Endpoint};

/// Header carrying the language service key.
pub const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Default `api-version` of the conversation analysis runtime.
pub const DEFAULT_API_VERSION: &str = "2022-05-01";

/// Key under which an `api-version` override is looked up in [`ClientOptions`].
pub const API_VERSION_KEY: &str = "Language/conversations";

/// Client for the conversation analysis runtime.
#[derive(Clone, Debug)]
pub struct ConversationAnalysisClient {
    pipeline: Arc<HttpClient>,
    endpoint: Endpoint,
    api_version: String,
    poll_interval: Duration,
}

// Verify ConversationAnalysisClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConversationAnalysisClient>();
};

impl ConversationAnalysisClient {
    /// Creates a client that authenticates with a service key.
    ///
    /// `endpoint` replaces the endpoint in `options`.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Http`] if the HTTP client cannot be created.
    pub fn new(
        endpoint: Endpoint,
        credential: KeyCredential,
        options: ClientOptions,
    ) -> Result<Self, ArmError> {
        Self::with_auth(endpoint, AuthPolicy::key(KEY_HEADER, credential), &options)
    }

    /// Creates a client that authenticates with bearer tokens for the
    /// Cognitive Services scope.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Http`] if the HTTP client cannot be created.
    pub fn with_token_credential(
        endpoint: Endpoint,
        credential: Arc<dyn TokenCredential>,
        options: ClientOptions,
    ) -> Result<Self, ArmError> {
        Self::with_auth(
            endpoint,
            AuthPolicy::bearer(credential, COGNITIVE_SERVICES_SCOPE),
            &options,
        )
    }

    fn with_auth(
        endpoint: Endpoint,
        auth: AuthPolicy,
        options: &ClientOptions,
    ) -> Result<Self, ArmError> {
        let options = options.with_endpoint(endpoint);
        let api_version = options
            .api_version_override(API_VERSION_KEY)
            .map_or_else(|| DEFAULT_API_VERSION.to_string(), ToString::to_string);
        let pipeline = HttpClient::new(&options, auth)?;

        Ok(Self {
            pipeline: Arc::new(pipeline),
            endpoint: options.endpoint().clone(),
            api_version,
            poll_interval: options.poll_interval(),
        })
    }

    /// Returns the service endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the `api-version` sent with every request.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Analyzes a single conversation turn.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if `task` is `null`, before any
    /// request is sent, [`ArmError::RequestFailed`] on a non-2xx status and
    /// [`ArmError::InvalidPayload`] if the body is not JSON.
    pub async fn analyze_conversation(
        &self,
        task: &Value,
    ) -> Result<ResourceResponse<Value>, ArmError> {
        require_task(task)?;
        let request = HttpRequest::builder(HttpMethod::Post, "/language/:analyze-conversations")
            .api_version(self.api_version.clone())
            .body(task.clone())
            .build()?;
        let response = self.pipeline.request(request).await?;
        let result = parse_body(&response, "conversation result")?;
        Ok(ResourceResponse::new(result, response))
    }

    /// Submits a conversation analysis job.
    ///
    /// The job is tracked through its `Operation-Location`; the result is the
    /// final job state document.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if `task` is `null`, before any
    /// request is sent, plus any error from sending or polling the job.
    pub async fn begin_analyze_conversation_job(
        &self,
        wait: WaitUntil,
        task: &Value,
    ) -> Result<ArmOperation<Value>, ArmError> {
        require_task(task)?;
        let request =
            HttpRequest::builder(HttpMethod::Post, "/language/analyze-conversations/jobs")
                .api_version(self.api_version.clone())
                .body(task.clone())
                .build()?;
        ArmOperation::start(
            Arc::clone(&self.pipeline),
            request,
            Some(self.api_version.clone()),
            FinalStateVia::OperationLocation,
            self.poll_interval,
            Box::new(JsonSource::new()),
            wait,
        )
        .await
    }
}

fn require_task(task: &Value) -> Result<(), ArmError> {
    if task.is_null() {
        return Err(ArmError::InvalidArgument {
            name: "task",
            reason: "cannot be null".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiVersion;

    fn endpoint() -> Endpoint {
        Endpoint::new("https://lang.cognitiveservices.azure.com").unwrap()
    }

    #[test]
    fn test_endpoint_replaces_options_endpoint() {
        let client = ConversationAnalysisClient::new(
            endpoint(),
            KeyCredential::new("key").unwrap(),
            ClientOptions::default(),
        )
        .unwrap();
        assert_eq!(
            client.endpoint().as_ref(),
            "https://lang.cognitiveservices.azure.com"
        );
        assert_eq!(client.api_version(), DEFAULT_API_VERSION);
    }

    #[test]
    fn test_api_version_override() {
        let options = ClientOptions::builder()
            .api_version(API_VERSION_KEY, ApiVersion::new("2023-04-01").unwrap())
            .build()
            .unwrap();
        let client = ConversationAnalysisClient::new(
            endpoint(),
            KeyCredential::new("key").unwrap(),
            options,
        )
        .unwrap();
        assert_eq!(client.api_version(), "2023-04-01");
    }

    #[test]
    fn test_null_task_is_rejected() {
        assert!(matches!(
            require_task(&Value::Null),
            Err(ArmError::InvalidArgument { name: "task", .. })
        ));
        assert!(require_task(&serde_json::json!({"kind": "Conversation"})).is_ok());
    }
}
