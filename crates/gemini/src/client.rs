//! HTTP client for the `generateContent` endpoint.
//!
//! One call to [`GeminiClient::generate_content`] is one outbound POST. Retrying, fallback
//! between models and timeouts-as-failures are the caller's policy; this client only
//! classifies what happened.

use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use tracing::debug;

use crate::wire::{GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use crate::{GeminiError, GeminiResult};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound on upstream error bodies carried into diagnostics.
const MAX_ERROR_DETAIL_CHARS: usize = 200;

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: HeaderValue,
    endpoint: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client against the public endpoint with the default timeout.
    pub fn new(api_key: &str) -> GeminiResult<Self> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT)
    }

    /// Create a client against an explicit endpoint.
    ///
    /// # Errors
    /// Returns an error if:
    /// - the API key is blank or not a valid header value,
    /// - the endpoint is not an absolute `http`/`https` URL without credentials,
    /// - the underlying HTTP client cannot be constructed.
    pub fn with_endpoint(api_key: &str, endpoint: &str, timeout: Duration) -> GeminiResult<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(GeminiError::MissingApiKey);
        }

        let mut api_key = HeaderValue::from_str(api_key)
            .map_err(|e| GeminiError::InvalidApiKey(e.to_string()))?;
        api_key.set_sensitive(true);

        let endpoint = endpoint.trim_end_matches('/');
        let parsed = reqwest::Url::parse(endpoint)
            .map_err(|e| GeminiError::InvalidEndpoint(format!("'{endpoint}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GeminiError::InvalidEndpoint(format!(
                "scheme must be http or https, got {}",
                parsed.scheme()
            )));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(GeminiError::InvalidEndpoint(
                "endpoint must not contain credentials".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GeminiError::ClientBuild)?;

        Ok(Self {
            client,
            api_key,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one generation against `model` and return the generated text.
    ///
    /// # Errors
    /// - [`GeminiError::Transport`] if the request could not be sent or timed out,
    /// - [`GeminiError::Status`] for any non-2xx response,
    /// - [`GeminiError::Decode`] if a 2xx body is not a valid response document,
    /// - [`GeminiError::NoContent`] if a valid response carries no usable text.
    pub async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        config: GenerationConfig,
    ) -> GeminiResult<String> {
        let url = format!("{}/{}:generateContent", self.endpoint, model);
        debug!("generateContent: model={} prompt={} chars", model, prompt.len());

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header("x-goog-api-key", self.api_key.clone())
            .json(&GenerateContentRequest::new(prompt, config))
            .send()
            .await
            .map_err(GeminiError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(GeminiError::Transport)?;

        if !status.is_success() {
            return Err(GeminiError::Status {
                status: status.as_u16(),
                detail: truncate_detail(&body),
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GeminiError::Decode(e.to_string()))?;

        parsed
            .into_text()
            .map_err(|reason| GeminiError::NoContent { reason })
    }
}

/// Keep error bodies short so upstream echoes of the prompt do not end up in logs.
fn truncate_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_ERROR_DETAIL_CHARS {
        let mut cut: String = trimmed.chars().take(MAX_ERROR_DETAIL_CHARS).collect();
        cut.push('…');
        cut
    } else {
        trimmed.to_string()
    }
}
