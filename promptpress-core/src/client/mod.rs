//! HTTP client for the remote generation API
//!
//! This module implements the API boundary:
//! - credential and base-URL resolution into an explicit [`ApiConfig`]
//! - endpoint URL construction with optional version segments
//! - bearer-token and JSON headers on every request
//! - validation of responses into the canonical texts sequence

pub mod error;

pub use error::{ApiError, ApiResult};

use crate::config::{SecretString, SettingsStore};
use crate::request::PromptRequest;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Timeout for content-producing calls
const CONTENT_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for the connectivity probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Sampling temperature used when the caller does not pick one
const DEFAULT_TEMPERATURE: f64 = 0.8;

const ROUTE_USER: &str = "/user";
const ROUTE_TEXT: &str = "/text";
const ROUTE_PROMPT: &str = "/from-prompt";
const ROUTE_EDIT: &str = "/text/edit";

/// Remote API version identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    /// Current stable version
    #[default]
    V1,
    /// Free-text generation endpoint version
    V2,
}

impl ApiVersion {
    /// Path segment for this version
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
        }
    }

    /// Latest version a client built from settings speaks
    pub fn latest() -> Self {
        ApiVersion::V1
    }
}

/// Connection configuration for the generation API
///
/// Always passed to the client explicitly; the client performs no ambient
/// settings lookup of its own.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Absolute base URL of the remote API, trailing slash included
    pub base_url: String,
    /// Bearer credential; may be empty, in which case requests fail
    /// authentication server-side
    pub api_key: SecretString,
    /// Version segment used for versioned endpoints
    pub api_version: ApiVersion,
}

impl ApiConfig {
    /// Create a config pinned to the latest API version
    pub fn new(base_url: impl Into<String>, api_key: impl Into<SecretString>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_version: ApiVersion::latest(),
        }
    }
}

/// Client for the remote generation API
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    client: reqwest::Client,
    content_timeout: Duration,
    probe_timeout: Duration,
}

impl ApiClient {
    /// Create a client from an explicit configuration
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        Self::with_timeouts(config, CONTENT_TIMEOUT, PROBE_TIMEOUT)
    }

    /// Create a client with custom per-call timeouts
    pub fn with_timeouts(
        config: ApiConfig,
        content_timeout: Duration,
        probe_timeout: Duration,
    ) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            "Created API client for {} (key: {})",
            config.base_url,
            config.api_key.partial_redact()
        );
        Ok(Self {
            config,
            client,
            content_timeout,
            probe_timeout,
        })
    }

    /// Create a client from the persisted settings snapshot
    pub fn from_settings(settings: &SettingsStore) -> ApiResult<Self> {
        let snapshot = settings.get_all();
        Self::new(ApiConfig::new(snapshot.url, snapshot.key))
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Credential this client authenticates with
    pub fn api_key(&self) -> &SecretString {
        &self.config.api_key
    }

    /// Probe the identity endpoint to check connectivity and the credential
    ///
    /// Returns true only when the call completes without a transport error
    /// and the status is exactly 200. Never raises: any failure is false.
    pub async fn is_connected(&self) -> bool {
        let url = self.make_url(ROUTE_USER, false);
        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .timeout(self.probe_timeout)
            .send()
            .await;

        match response {
            Ok(response) => response.status() == StatusCode::OK,
            Err(err) => {
                debug!("Connectivity probe failed: {}", err);
                false
            }
        }
    }

    /// Generate free text from a raw prompt
    ///
    /// Speaks the v2 text endpoint; the version override is scoped to this
    /// call and does not touch the client's configured version.
    pub async fn generate_free_text(
        &self,
        prompt: &str,
        temperature: Option<f64>,
    ) -> ApiResult<Vec<String>> {
        let body = json!({
            "prompt": prompt,
            "temperature": temperature.unwrap_or(DEFAULT_TEMPERATURE),
        });
        let url = self.make_url_as(ROUTE_TEXT, Some(ApiVersion::V2));
        self.post_for_texts(&url, &body).await
    }

    /// Run a templated prompt request
    pub async fn prompt(&self, request: &PromptRequest) -> ApiResult<Vec<String>> {
        let url = self.make_url_as(ROUTE_PROMPT, None);
        self.post_for_texts(&url, &request.to_payload()).await
    }

    /// Rewrite input text according to an instruction
    pub async fn edit_text(&self, input: &str, instruction: &str) -> ApiResult<Vec<String>> {
        let body = json!({
            "input": input,
            "instruction": instruction,
        });
        let url = self.make_url_as(ROUTE_EDIT, None);
        self.post_for_texts(&url, &body).await
    }

    /// Build a request URL, optionally with the client's version segment
    pub fn make_url(&self, endpoint: &str, with_version: bool) -> String {
        self.make_url_as(endpoint, with_version.then_some(self.config.api_version))
    }

    fn make_url_as(&self, endpoint: &str, version: Option<ApiVersion>) -> String {
        let mut url = format!("{}api", self.config.base_url);
        if let Some(version) = version {
            url.push('/');
            url.push_str(version.as_str());
        }
        url.push_str(endpoint);
        url
    }

    async fn post_for_texts(&self, url: &str, body: &Value) -> ApiResult<Vec<String>> {
        let request_id = Uuid::new_v4();
        debug!("POST {} [request_id: {}]", url, request_id);

        let response = self
            .client
            .post(url)
            .headers(self.headers())
            .timeout(self.content_timeout)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                warn!("Request failed for {} [request_id: {}]: {}", url, request_id, err);
                ApiError::from(err)
            })?;

        let texts = handle_response(response).await?;
        info!(
            "Request returned {} texts [request_id: {}]",
            texts.len(),
            request_id
        );
        Ok(texts)
    }

    /// Headers attached to every request
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {}", self.config.api_key.expose_secret())
                .parse()
                .unwrap_or_else(|_| HeaderValue::from_static("Bearer invalid")),
        );
        headers
    }
}

/// Reduce a content response to the canonical texts sequence
///
/// Anything other than a 201 with a `{"texts": [string, ...]}` body is an
/// error; no other field of the body is exposed to callers.
async fn handle_response(response: reqwest::Response) -> ApiResult<Vec<String>> {
    let status = response.status();
    if status != StatusCode::CREATED {
        let reason = status.canonical_reason().unwrap_or("").to_string();
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() { reason } else { body };
        return Err(ApiError::UnexpectedStatus {
            status: status.as_u16(),
            message,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(format!("Failed to read response body: {}", e)))?;
    decode_texts(&body)
}

fn decode_texts(body: &str) -> ApiResult<Vec<String>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ApiError::MalformedResponse(format!("body is not valid JSON: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| ApiError::MalformedResponse("body is not a JSON object".to_string()))?;
    let texts = object
        .get("texts")
        .ok_or_else(|| ApiError::MalformedResponse("body has no 'texts' key".to_string()))?;
    let entries = texts
        .as_array()
        .ok_or_else(|| ApiError::MalformedResponse("'texts' is not an array".to_string()))?;

    let mut out = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match entry.as_str() {
            Some(text) => out.push(text.to_string()),
            None => {
                return Err(ApiError::MalformedResponse(format!(
                    "key {} of texts is not a string",
                    index
                )))
            }
        }
    }
    Ok(out)
}
