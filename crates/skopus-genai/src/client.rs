//! HTTP client for the generative-AI REST API.
//!
//! Wraps `reqwest` with API-key handling, request shaping and typed response
//! decoding. Transient failures are retried with back-off (see
//! [`crate::retry`]).

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::GenAiError;
use crate::retry::RetryPolicy;
use crate::types::{
    Content, EmptyObject, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, RequestPart, ThinkingConfig, Tool,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Per-call generation switches.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Token budget for the model's internal reasoning.
    pub thinking_budget: Option<u32>,
    /// Ask for `application/json` output shaped by this schema.
    pub response_schema: Option<serde_json::Value>,
    /// Ground the answer on live web search.
    pub search_grounding: bool,
}

/// Client for the `generateContent` endpoint.
///
/// Use [`GenAiClient::new`] for production or [`GenAiClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct GenAiClient {
    client: Client,
    api_key: String,
    base_url: Url,
    retry: RetryPolicy,
}

impl std::fmt::Debug for GenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAiClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl GenAiClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GenAiError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// Retries are disabled until [`GenAiClient::with_retry`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GenAiError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GenAiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GenAiError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            retry: RetryPolicy::default(),
        })
    }

    /// Enables retries on transient failures.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.retry = RetryPolicy::new(max_retries, backoff_base_ms);
        self
    }

    /// Sends one prompt and returns the generated text.
    ///
    /// # Errors
    ///
    /// - [`GenAiError::UnexpectedStatus`] for non-2xx responses.
    /// - [`GenAiError::Blocked`] when the prompt is refused.
    /// - [`GenAiError::EmptyResponse`] when no text comes back.
    /// - [`GenAiError::Http`] on network failure.
    /// - [`GenAiError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, GenAiError> {
        let url = self.model_url(model)?;
        let body = build_request(prompt, options);

        let response = self.retry.run(model, || {
            let url = url.clone();
            let body = &body;
            async move { self.send(model, url, body).await }
        })
        .await?;

        if response.candidates.is_empty() {
            if let Some(reason) = response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.clone())
            {
                return Err(GenAiError::Blocked {
                    model: model.to_owned(),
                    reason,
                });
            }
        }

        let text = response.text();
        if text.trim().is_empty() {
            return Err(GenAiError::EmptyResponse {
                model: model.to_owned(),
            });
        }

        tracing::debug!(model, chars = text.len(), "generation complete");
        Ok(text)
    }

    /// `{base}/v1beta/models/{model}:generateContent`.
    fn model_url(&self, model: &str) -> Result<Url, GenAiError> {
        self.base_url
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(|e| GenAiError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn send(
        &self,
        model: &str,
        url: Url,
        body: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse, GenAiError> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| match e.error.status {
                    Some(code) => format!("{code}: {}", e.error.message),
                    None => e.error.message,
                })
                .unwrap_or_else(|_| truncate(&text, 200));
            return Err(GenAiError::UnexpectedStatus {
                status: status.as_u16(),
                model: model.to_owned(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| GenAiError::Deserialize {
            context: format!("generateContent({model})"),
            source: e,
        })
    }
}

fn build_request<'a>(prompt: &'a str, options: &GenerateOptions) -> GenerateContentRequest<'a> {
    let tools = if options.search_grounding {
        vec![Tool {
            google_search: EmptyObject {},
        }]
    } else {
        Vec::new()
    };

    let config = GenerationConfig {
        response_mime_type: options
            .response_schema
            .as_ref()
            .map(|_| "application/json"),
        response_schema: options.response_schema.clone(),
        thinking_config: options.thinking_budget.map(|thinking_budget| ThinkingConfig {
            thinking_budget,
        }),
    };
    let has_config = config.response_mime_type.is_some() || config.thinking_config.is_some();

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![RequestPart { text: prompt }],
        }],
        tools,
        generation_config: has_config.then_some(config),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
