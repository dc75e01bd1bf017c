//! Model dispatcher: sends composed prompts to an OpenAI-compatible completion endpoint.
//!
//! Agents talk to [`Dispatcher`], which owns a [`CompletionBackend`]. The production backend
//! is [`OpenAiCompatClient`] (Groq by default); tests and offline runs use
//! [`PlaceholderBackend`].

use crate::config::SahayConfig;
use crate::error::DispatchError;
use crate::normalize::parse_structured;
use crate::prompts::{ChatMessage, PromptPayload};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Token budget and temperature for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Sampling {
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }

    /// Temperature 0, for extraction and translation.
    pub const fn deterministic(max_tokens: u32) -> Self {
        Self::new(max_tokens, 0.0)
    }
}

/// Wire request for `POST {base}/chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// A hosted (or fake) completion service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generated text for `request`.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DispatchError>;

    fn name(&self) -> &str;
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiCompatClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            client,
        }
    }

    pub fn from_config(config: &SahayConfig) -> Self {
        Self::new(
            &config.api_base_url,
            &config.api_key,
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DispatchError> {
        let url = format!("{}/chat/completions", self.base_url);
        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(DispatchError::Api { status, body });
        }

        let parsed: ChatResponse = res.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(DispatchError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

/// Offline backend: answers every request with a fixed text, or fails when it has none.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderBackend {
    response: Option<String>,
}

impl PlaceholderBackend {
    /// Fails every call, exercising the fallback paths.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }
}

#[async_trait]
impl CompletionBackend for PlaceholderBackend {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, DispatchError> {
        self.response
            .clone()
            .ok_or_else(|| DispatchError::Unavailable("placeholder backend has no response".into()))
    }

    fn name(&self) -> &str {
        "placeholder"
    }
}

/// Shared handle to a completion backend plus the model id to request.
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn CompletionBackend>,
    model: String,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn CompletionBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn from_config(config: &SahayConfig) -> Self {
        Self::new(
            Arc::new(OpenAiCompatClient::from_config(config)),
            config.model.clone(),
        )
    }

    /// Dispatcher that fails every call.
    pub fn offline() -> Self {
        Self::new(
            Arc::new(PlaceholderBackend::new()),
            crate::config::DEFAULT_MODEL,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Trimmed free-text output. Blank output is `DispatchError::EmptyResponse`.
    pub async fn dispatch(
        &self,
        payload: &PromptPayload,
        sampling: Sampling,
    ) -> Result<String, DispatchError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: payload.messages.clone(),
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
        };
        debug!(
            backend = self.backend.name(),
            kind = ?payload.kind,
            language = %payload.language,
            max_tokens = sampling.max_tokens,
            temperature = sampling.temperature,
            "dispatching completion"
        );
        match self.backend.complete(&request).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    warn!(backend = self.backend.name(), "completion returned blank text");
                    Err(DispatchError::EmptyResponse)
                } else {
                    Ok(text.to_string())
                }
            }
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "completion failed");
                Err(e)
            }
        }
    }

    /// Fence-normalized JSON output decoded into `T`.
    pub async fn dispatch_structured<T: DeserializeOwned>(
        &self,
        payload: &PromptPayload,
        sampling: Sampling,
    ) -> Result<T, DispatchError> {
        let raw = self.dispatch(payload, sampling).await?;
        parse_structured(&raw).map_err(|e| {
            warn!(error = %e, "structured output rejected");
            DispatchError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::prompts::{PromptBuilder, PromptKind};
    use serde_json::Value;

    fn payload() -> PromptPayload {
        PromptBuilder::new(PromptKind::Voice, Language::English)
            .section("What documents do I need?")
            .build()
    }

    #[tokio::test]
    async fn placeholder_response_is_trimmed() {
        let dispatcher = Dispatcher::new(
            Arc::new(PlaceholderBackend::with_response("  Bring your Aadhaar card.\n")),
            "m",
        );
        let out = dispatcher
            .dispatch(&payload(), Sampling::deterministic(300))
            .await
            .unwrap();
        assert_eq!(out, "Bring your Aadhaar card.");
    }

    #[tokio::test]
    async fn offline_dispatcher_fails() {
        let err = Dispatcher::offline()
            .dispatch(&payload(), Sampling::deterministic(300))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Unavailable(_)));
    }

    #[tokio::test]
    async fn blank_output_is_an_error() {
        let dispatcher = Dispatcher::new(Arc::new(PlaceholderBackend::with_response("  ")), "m");
        let err = dispatcher
            .dispatch(&payload(), Sampling::deterministic(300))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::EmptyResponse));
    }

    #[tokio::test]
    async fn structured_output_strips_fences() {
        let dispatcher = Dispatcher::new(
            Arc::new(PlaceholderBackend::with_response("```json\n{\"a\": [1]}\n```")),
            "m",
        );
        let v: Value = dispatcher
            .dispatch_structured(&payload(), Sampling::new(100, 0.2))
            .await
            .unwrap();
        assert_eq!(v["a"][0], 1);
    }

    #[tokio::test]
    async fn malformed_structured_output_is_parse_error() {
        let dispatcher =
            Dispatcher::new(Arc::new(PlaceholderBackend::with_response("not json")), "m");
        let err = dispatcher
            .dispatch_structured::<Value>(&payload(), Sampling::new(100, 0.2))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Parse(_)));
    }
}
