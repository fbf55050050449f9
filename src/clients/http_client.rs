//! HTTP pipeline for Azure service communication.
//!
//! This module provides the [`HttpClient`] type for sending authenticated
//! requests with automatic retry handling.

use std::collections::HashMap;
use std::time::Duration;

use crate::auth::AuthPolicy;
use crate::clients::errors::{HttpError, MaxHttpRetriesExceededError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{ClientOptions, Endpoint};

/// Fixed retry wait time in seconds when the service sends no retry hint.
pub const RETRY_WAIT_TIME: u64 = 1;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Status codes that are retried.
const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// The request pipeline shared by every client.
///
/// The client handles:
/// - URL construction from the endpoint (absolute URLs pass through)
/// - Default headers including User-Agent and `x-ms-client-request-id`
/// - Authentication via the configured [`AuthPolicy`]
/// - Automatic retry of transient statuses
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use azure_api::auth::AuthPolicy;
/// use azure_api::clients::{HttpClient, HttpMethod, HttpRequest};
/// use azure_api::ClientOptions;
///
/// let client = HttpClient::new(&ClientOptions::default(), AuthPolicy::None)?;
/// let request = HttpRequest::builder(HttpMethod::Get, "/subscriptions")
///     .api_version("2022-12-01")
///     .build()?;
/// let response = client.request(request).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    endpoint: Endpoint,
    auth: AuthPolicy,
    default_headers: HashMap<String, String>,
    max_tries: u32,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new pipeline from client options and an auth policy.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client
    /// cannot be created (e.g. TLS initialization failure).
    pub fn new(options: &ClientOptions, auth: AuthPolicy) -> Result<Self, HttpError> {
        let user_agent_prefix = options
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!("{user_agent_prefix}azsdk-rust-core/{SDK_VERSION} (Rust {rust_version})");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = options.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: options.endpoint().clone(),
            auth,
            default_headers,
            max_tries: options.max_tries(),
        })
    }

    /// Returns the endpoint relative paths are resolved against.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the default number of attempts per request.
    #[must_use]
    pub const fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /// Resolves a request path to a full URL.
    #[must_use]
    pub fn url_for(&self, request: &HttpRequest) -> String {
        if request.is_absolute() {
            request.path.clone()
        } else {
            self.endpoint.join(&request.path)
        }
    }

    /// Sends a request.
    ///
    /// This method handles:
    /// - Request validation
    /// - URL construction
    /// - Header merging and authentication
    /// - Response parsing
    /// - Retry logic for 408, 429 and 5xx gateway/server responses
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - The credential fails (`Credential`)
    /// - Network error occurs (`Network`)
    /// - Non-2xx response received (`Response`)
    /// - Max retries exceeded (`MaxRetries`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.url_for(&request);
        let max_tries = request.tries.unwrap_or(self.max_tries).max(1);

        let mut headers = self.default_headers.clone();
        headers.insert(
            "x-ms-client-request-id".to_string(),
            uuid::Uuid::new_v4().to_string(),
        );
        if request.body.is_some() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let mut req_builder = match request.http_method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
                HttpMethod::Put => self.client.put(&url),
                HttpMethod::Patch => self.client.patch(&url),
                HttpMethod::Delete => self.client.delete(&url),
            };

            for (key, value) in &headers {
                req_builder = req_builder.header(key, value);
            }

            if let Some((name, value)) = self.auth.header().await? {
                req_builder = req_builder.header(name, value);
            }

            if let Some(query) = &request.query {
                req_builder = req_builder.query(query);
            }

            match &request.body {
                Some(body) => req_builder = req_builder.body(body.to_string()),
                None if request.http_method == HttpMethod::Post => {
                    req_builder = req_builder.header("Content-Length", "0");
                }
                None => {}
            }

            tracing::debug!("{} {} (try {}/{})", request.http_method, url, tries, max_tries);

            let res = req_builder.send().await?;

            let code = res.status().as_u16();
            let res_headers = Self::parse_response_headers(res.headers());
            let body_text = res.text().await.unwrap_or_default();
            let response = HttpResponse::new(code, res_headers, body_text);

            tracing::debug!(
                "{} {} -> {} (x-ms-request-id: {})",
                request.http_method,
                url,
                code,
                response.request_id().unwrap_or("-")
            );

            if response.is_ok() {
                return Ok(response);
            }

            if !RETRYABLE_STATUSES.contains(&code) {
                return Err(HttpError::Response(response.to_error()));
            }

            if tries >= max_tries {
                if max_tries == 1 {
                    return Err(HttpError::Response(response.to_error()));
                }
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    tries: max_tries,
                    last: response.to_error(),
                }));
            }

            let delay = Self::calculate_retry_delay(&response);
            tracing::warn!(
                "Retrying {} {} after status {} in {:?}",
                request.http_method,
                url,
                code,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    fn calculate_retry_delay(response: &HttpResponse) -> Duration {
        response
            .retry_after()
            .unwrap_or(Duration::from_secs(RETRY_WAIT_TIME))
    }
}
