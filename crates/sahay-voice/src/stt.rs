//! **Speech-to-Text (STT)**: turn a recorded audio file into a transcript.
//!
//! Implement `SttBackend` for any transcription service. `OpenAiStt` talks to an
//! OpenAI-compatible `/audio/transcriptions` endpoint; `PlaceholderStt` returns a fixed
//! transcript for tests and offline runs.

use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use sahay_core::{detect_language, Language, LanguageMode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Confidence reported when the service gives no per-segment scores.
pub const DEFAULT_CONFIDENCE: f32 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub confidence: f32,
    /// Script-detected language of `text`.
    pub detected_language: Language,
    pub duration_secs: f32,
}

impl Transcription {
    /// Transcript for text that never went through a speech service.
    pub fn simulated(text: &str, language: Language) -> Self {
        Self {
            text: text.to_string(),
            confidence: 0.95,
            detected_language: language,
            duration_secs: 0.0,
        }
    }
}

#[async_trait]
pub trait SttBackend: Send + Sync {
    /// Transcribe one audio file. An empty `text` means nothing was recognised.
    async fn transcribe(&self, audio: &Path, mode: LanguageMode) -> VoiceResult<Transcription>;

    fn name(&self) -> &str;
}

/// Placeholder STT: returns a fixed transcript, or an empty one when none is set.
#[derive(Debug, Default)]
pub struct PlaceholderStt {
    pub response: Option<String>,
}

impl PlaceholderStt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(s: impl Into<String>) -> Self {
        Self {
            response: Some(s.into()),
        }
    }
}

#[async_trait]
impl SttBackend for PlaceholderStt {
    async fn transcribe(&self, audio: &Path, _mode: LanguageMode) -> VoiceResult<Transcription> {
        let text = self.response.clone().unwrap_or_default();
        debug!(audio = %audio.display(), chars = text.len(), "placeholder transcription");
        Ok(Transcription {
            detected_language: detect_language(&text),
            text,
            confidence: 0.95,
            duration_secs: 0.0,
        })
    }

    fn name(&self) -> &str {
        "placeholder"
    }
}

#[derive(Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    text: String,
    #[serde(default)]
    duration: Option<f32>,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Deserialize)]
struct Segment {
    #[serde(default)]
    avg_logprob: Option<f32>,
}

/// Mean segment probability, or [`DEFAULT_CONFIDENCE`] without segment scores.
fn segment_confidence(segments: &[Segment]) -> f32 {
    let probs: Vec<f32> = segments
        .iter()
        .filter_map(|s| s.avg_logprob)
        .map(|lp| lp.exp().clamp(0.0, 1.0))
        .collect();
    if probs.is_empty() {
        DEFAULT_CONFIDENCE
    } else {
        probs.iter().sum::<f32>() / probs.len() as f32
    }
}

/// Production STT backend: OpenAI-compatible transcription API (OpenAI Whisper, Groq, etc.).
/// Uses `STT_API_URL` (e.g. https://api.openai.com/v1), `STT_API_KEY`, and `STT_MODEL` (default whisper-1).
#[derive(Debug, Clone)]
pub struct OpenAiStt {
    /// Base URL without trailing slash.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    client: reqwest::Client,
}

impl OpenAiStt {
    /// Build from environment: STT_API_URL, STT_API_KEY (or SAHAY_LLM_API_KEY / GROQ_API_KEY), STT_MODEL.
    pub fn from_env() -> VoiceResult<Self> {
        let base_url = std::env::var("STT_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let api_key = std::env::var("STT_API_KEY")
            .or_else(|_| std::env::var("SAHAY_LLM_API_KEY"))
            .or_else(|_| std::env::var("GROQ_API_KEY"))
            .map_err(|_| {
                VoiceError::Config(
                    "STT requires STT_API_KEY, SAHAY_LLM_API_KEY, or GROQ_API_KEY".to_string(),
                )
            })?;
        let model = std::env::var("STT_MODEL").unwrap_or_else(|_| "whisper-1".to_string());
        Self::new(base_url, api_key, model)
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> VoiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| VoiceError::Stt(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }
}

#[async_trait]
impl SttBackend for OpenAiStt {
    async fn transcribe(&self, audio: &Path, mode: LanguageMode) -> VoiceResult<Transcription> {
        let bytes = tokio::fs::read(audio).await?;
        let file_name = audio
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let mut form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(file_name))
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");
        if let Some(language) = mode.hint() {
            form = form.text("language", language.code());
        }

        let url = format!("{}/audio/transcriptions", self.base_url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::Stt(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!("STT API error {}: {}", status, body)));
        }
        let parsed: VerboseTranscription =
            res.json().await.map_err(|e| VoiceError::Stt(e.to_string()))?;

        let text = parsed.text.trim().to_string();
        info!(model = %self.model, chars = text.len(), "audio transcribed");
        Ok(Transcription {
            detected_language: detect_language(&text),
            confidence: segment_confidence(&parsed.segments),
            duration_secs: parsed.duration.unwrap_or(0.0),
            text,
        })
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_averages_segment_probabilities() {
        let segments = vec![
            Segment { avg_logprob: Some(0.0) },
            Segment { avg_logprob: Some((0.5f32).ln()) },
            Segment { avg_logprob: None },
        ];
        assert!((segment_confidence(&segments) - 0.75).abs() < 1e-6);
        assert_eq!(segment_confidence(&[]), DEFAULT_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_placeholder_detects_script() {
        let stt = PlaceholderStt::with_response("मुझे ऋण चाहिए");
        let t = stt
            .transcribe(Path::new("in.wav"), LanguageMode::Auto)
            .await
            .unwrap();
        assert_eq!(t.detected_language, Language::Hindi);

        let empty = PlaceholderStt::new()
            .transcribe(Path::new("in.wav"), LanguageMode::Auto)
            .await
            .unwrap();
        assert!(empty.text.is_empty());
    }
}
