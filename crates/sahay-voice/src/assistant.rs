//! Voice assistant: speech-to-text, model reply, text-to-speech.
//!
//! Every operation returns a value the caller can show or speak. Model failures become the
//! localized apology; speech failures become a staged [`StageFailure`].

use crate::bridge::{SpeechBridge, StageFailure};
use crate::capability::SpeechCapabilities;
use crate::error::{VoiceError, VoiceResult};
use crate::inquiry::InquiryType;
use crate::stt::Transcription;
use chrono::Utc;
use sahay_core::dispatcher::Sampling;
use sahay_core::fallback::retry_message;
use sahay_core::prompts::templates::VOICE_QUERY_TASK;
use sahay_core::{
    cache_key, ConversationHistory, ConversationRecord, Dispatcher, Language, LanguageMode,
    PromptBuilder, PromptKind, ResponseCache, SahayConfig, Translator, UserProfile,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceQueryResult {
    pub success: bool,
    /// Reply in `language`; the apology when `success` is false.
    pub response_text: String,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Where a synthesized reply went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechOutput {
    /// `None` for simulated runs.
    pub audio_path: Option<PathBuf>,
    pub audio_bytes: usize,
    pub text_length: usize,
    pub language: Language,
    pub engine: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedConversation {
    pub transcription: Transcription,
    pub reply: VoiceQueryResult,
    pub speech: SpeechOutput,
    pub language: Language,
    pub trail: Vec<crate::bridge::BridgeState>,
    pub simulated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConversationOutcome {
    Completed(CompletedConversation),
    Failed(StageFailure),
}

impl ConversationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversationOutcome::Completed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalContext {
    pub village: String,
    pub occupation: String,
    pub greeting_style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceInquiry {
    pub text_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<SpeechOutput>,
    pub language: Language,
    pub inquiry_type: InquiryType,
    pub personalized: bool,
    pub local_context: LocalContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct VoiceAssistant {
    dispatcher: Dispatcher,
    translator: Translator,
    capabilities: SpeechCapabilities,
    cache: ResponseCache<VoiceQueryResult>,
    history: ConversationHistory,
    data_dir: PathBuf,
}

impl VoiceAssistant {
    pub fn new(
        dispatcher: Dispatcher,
        capabilities: SpeechCapabilities,
        cache_capacity: usize,
        history_capacity: usize,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            translator: Translator::new(dispatcher.clone()),
            dispatcher,
            capabilities,
            cache: ResponseCache::new(cache_capacity),
            history: ConversationHistory::new(history_capacity),
            data_dir: data_dir.into(),
        }
    }

    pub fn from_config(config: &SahayConfig, capabilities: SpeechCapabilities) -> Self {
        Self::new(
            Dispatcher::from_config(config),
            capabilities,
            config.cache_capacity,
            config.history_capacity,
            config.data_dir.clone(),
        )
    }

    /// Transcribe `audio`. An empty transcript is an error.
    pub async fn speech_to_text(&self, audio: &Path, mode: LanguageMode) -> VoiceResult<Transcription> {
        let stt = self.capabilities.stt()?;
        let transcription = stt.transcribe(audio, mode).await?;
        if transcription.text.trim().is_empty() {
            return Err(VoiceError::Stt(format!(
                "{} returned an empty transcript",
                stt.name()
            )));
        }
        Ok(transcription)
    }

    /// Answer `query` in the borrower's language. The profile's preferred language wins over
    /// `language`.
    pub async fn process_voice_query(
        &mut self,
        query: &str,
        profile: Option<&UserProfile>,
        context: &str,
        language: Language,
    ) -> VoiceQueryResult {
        let language = profile
            .and_then(UserProfile::preferred_language)
            .unwrap_or(language);
        let english_query = self.translator.to_english_for(language, query).await;

        let key = cache_key(&json!({"query": english_query, "context": context, "lang": language}));
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let payload = PromptBuilder::new(PromptKind::Voice, language)
            .section(VOICE_QUERY_TASK)
            .section(format!("Additional Context: {}", context))
            .section(format!("User Query: {}", english_query))
            .section("Provide a helpful response:")
            .build();

        match self
            .dispatcher
            .dispatch(&payload, Sampling::deterministic(300))
            .await
        {
            Ok(answer) => {
                let reply = self.translator.to_user_language(language, &answer).await;
                self.history.record(query, reply.clone(), language);
                let result = VoiceQueryResult {
                    success: true,
                    response_text: reply,
                    language,
                    error: None,
                };
                self.cache.insert(key, result.clone());
                result
            }
            Err(e) => {
                warn!(error = %e, %language, "voice query fell back");
                VoiceQueryResult {
                    success: false,
                    response_text: retry_message(language).to_string(),
                    language,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Synthesize `text` and write it to `path`, or to
    /// `{data_dir}/audio_output/response_{ts}.mp3`.
    pub async fn text_to_speech(
        &self,
        text: &str,
        language: Language,
        path: Option<&Path>,
    ) -> VoiceResult<SpeechOutput> {
        let tts = self.capabilities.tts()?;
        let audio = tts.synthesize(text, language).await?;
        if audio.is_empty() {
            return Err(VoiceError::Tts(format!("{} produced no audio", tts.name())));
        }

        let path = match path {
            Some(p) => p.to_path_buf(),
            None => self
                .data_dir
                .join("audio_output")
                .join(format!("response_{}.mp3", Utc::now().timestamp())),
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &audio).await?;
        info!(path = %path.display(), bytes = audio.len(), "reply audio saved");

        Ok(SpeechOutput {
            audio_path: Some(path),
            audio_bytes: audio.len(),
            text_length: text.chars().count(),
            language,
            engine: tts.name().to_string(),
        })
    }

    /// Full turn: transcribe, answer, speak. In `Auto` mode the transcript's script picks the
    /// language for every later stage.
    pub async fn handle_voice_conversation(
        &mut self,
        audio: &Path,
        context: &str,
        mode: LanguageMode,
    ) -> ConversationOutcome {
        let mut bridge = SpeechBridge::new();
        let transcription = match self.speech_to_text(audio, mode).await {
            Ok(t) => t,
            Err(e) => return self.abort(&mut bridge, e),
        };
        let language = match mode {
            LanguageMode::Auto => transcription.detected_language,
            LanguageMode::Fixed(language) => language,
        };
        match self
            .answer_and_speak(&mut bridge, transcription, language, context, false)
            .await
        {
            Ok(done) => ConversationOutcome::Completed(done),
            Err(e) => self.abort(&mut bridge, e),
        }
    }

    /// Text-only run through the same bridge; no speech services are called.
    pub async fn simulate_voice_interaction(
        &mut self,
        text: &str,
        language: Language,
    ) -> ConversationOutcome {
        let mut bridge = SpeechBridge::new();
        let transcription = Transcription::simulated(text, language);
        match self
            .answer_and_speak(&mut bridge, transcription, language, "", true)
            .await
        {
            Ok(done) => ConversationOutcome::Completed(done),
            Err(e) => self.abort(&mut bridge, e),
        }
    }

    async fn answer_and_speak(
        &mut self,
        bridge: &mut SpeechBridge,
        transcription: Transcription,
        language: Language,
        context: &str,
        simulated: bool,
    ) -> VoiceResult<CompletedConversation> {
        bridge.advance()?;
        let reply = self
            .process_voice_query(&transcription.text, None, context, language)
            .await;
        if !reply.success {
            return Err(VoiceError::Query(reply.error.unwrap_or_default()));
        }

        bridge.advance()?;
        let speech = if simulated {
            SpeechOutput {
                audio_path: None,
                audio_bytes: 0,
                text_length: reply.response_text.chars().count(),
                language,
                engine: "simulated".to_string(),
            }
        } else {
            self.text_to_speech(&reply.response_text, language, None)
                .await?
        };
        bridge.advance()?;

        Ok(CompletedConversation {
            transcription,
            reply,
            speech,
            language,
            trail: bridge.trail().to_vec(),
            simulated,
        })
    }

    fn abort(&self, bridge: &mut SpeechBridge, error: VoiceError) -> ConversationOutcome {
        let failure = bridge.fail(error.to_string());
        warn!(stage = %failure.stage, error = %failure.error, "voice conversation stopped");
        ConversationOutcome::Failed(failure)
    }

    /// Canned reply for a routine inquiry, spoken when `speak` is set and TTS is available.
    pub async fn process_voice_inquiry(
        &self,
        profile: &UserProfile,
        inquiry: InquiryType,
        language: Language,
        speak: bool,
    ) -> VoiceInquiry {
        let village = profile.village().to_string();
        let occupation = profile.occupation().to_string();
        let text_response = inquiry.reply(language, profile.full_name(), &village, &occupation);

        let (audio, error) = if speak {
            match self.text_to_speech(&text_response, language, None).await {
                Ok(out) => (Some(out), None),
                Err(e) => {
                    warn!(error = %e, %inquiry, "inquiry reply not spoken");
                    (None, Some(e.to_string()))
                }
            }
        } else {
            (None, None)
        };

        VoiceInquiry {
            text_response,
            audio,
            language,
            inquiry_type: inquiry,
            personalized: true,
            local_context: LocalContext {
                village,
                occupation,
                greeting_style: "respectful_rural".to_string(),
            },
            error,
        }
    }

    /// Last `limit` exchanges, oldest first.
    pub fn conversation_history(&self, limit: usize) -> Vec<ConversationRecord> {
        self.history.recent(limit)
    }

    pub fn clear_conversation_history(&mut self) {
        self.history.clear();
    }

    /// Write the history as pretty JSON; see [`ConversationHistory::save_log`].
    pub async fn save_conversation_log(&self, path: Option<&Path>) -> VoiceResult<PathBuf> {
        Ok(self.history.save_log(path, &self.data_dir).await?)
    }

    pub fn supported_languages(&self) -> &'static [Language] {
        &Language::ALL
    }
}
