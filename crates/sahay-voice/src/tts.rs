//! **Text-to-Speech (TTS)**: render a reply as audio bytes.

use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use sahay_core::Language;
use std::time::Duration;
use tracing::info;

/// Backend that turns text into audio bytes (MP3). Empty bytes mean nothing was produced.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    async fn synthesize(&self, text: &str, language: Language) -> VoiceResult<Vec<u8>>;

    fn name(&self) -> &str;
}

/// Placeholder TTS: returns the configured bytes (none by default).
#[derive(Debug, Default)]
pub struct PlaceholderTts {
    pub audio: Vec<u8>,
}

impl PlaceholderTts {
    pub fn with_audio(audio: impl Into<Vec<u8>>) -> Self {
        Self {
            audio: audio.into(),
        }
    }
}

#[async_trait]
impl TtsBackend for PlaceholderTts {
    async fn synthesize(&self, _text: &str, _language: Language) -> VoiceResult<Vec<u8>> {
        Ok(self.audio.clone())
    }

    fn name(&self) -> &str {
        "placeholder"
    }
}

/// Voice used for each reply language when `TTS_VOICE` is unset.
fn language_to_voice(language: Language) -> &'static str {
    match language {
        Language::English => "alloy",
        Language::Hindi => "shimmer",
        Language::Kannada => "nova",
    }
}

/// Production TTS backend: OpenAI-compatible `/audio/speech`.
/// Uses `TTS_API_URL`, `TTS_API_KEY`, `TTS_MODEL` (default tts-1), and `TTS_VOICE`.
#[derive(Debug, Clone)]
pub struct OpenAiTts {
    pub base_url: String,
    pub api_key: String,
    /// tts-1 (fast) or tts-1-hd.
    pub model: String,
    /// Fixed voice; derived from the reply language when `None`.
    pub voice_override: Option<String>,
    client: reqwest::Client,
}

impl OpenAiTts {
    /// Build from environment: TTS_API_URL, TTS_API_KEY (or SAHAY_LLM_API_KEY / GROQ_API_KEY), TTS_MODEL, TTS_VOICE.
    pub fn from_env() -> VoiceResult<Self> {
        let base_url = std::env::var("TTS_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let api_key = std::env::var("TTS_API_KEY")
            .or_else(|_| std::env::var("SAHAY_LLM_API_KEY"))
            .or_else(|_| std::env::var("GROQ_API_KEY"))
            .map_err(|_| {
                VoiceError::Config(
                    "TTS requires TTS_API_KEY, SAHAY_LLM_API_KEY, or GROQ_API_KEY".to_string(),
                )
            })?;
        let model = std::env::var("TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string());
        let mut tts = Self::new(base_url, api_key, model)?;
        tts.voice_override = std::env::var("TTS_VOICE").ok().filter(|v| !v.trim().is_empty());
        Ok(tts)
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> VoiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| VoiceError::Tts(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            voice_override: None,
            client,
        })
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice_override = Some(voice.into());
        self
    }

    fn voice_id(&self, language: Language) -> String {
        if let Some(ref v) = self.voice_override {
            return v.clone();
        }
        language_to_voice(language).to_string()
    }
}

#[async_trait]
impl TtsBackend for OpenAiTts {
    async fn synthesize(&self, text: &str, language: Language) -> VoiceResult<Vec<u8>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/audio/speech", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice_id(language),
            "response_format": "mp3",
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::Tts(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!("TTS API error {}: {}", status, body)));
        }
        let bytes = res.bytes().await.map_err(|e| VoiceError::Tts(e.to_string()))?;
        info!(language = language.code(), bytes = bytes.len(), "speech synthesized");
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}
