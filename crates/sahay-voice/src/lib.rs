//! # Sahay Voice - speech bridge for the borrower assistant
//!
//! ```text
//!  audio file ──► STT ──► transcript ──► Dispatcher ──► reply ──► TTS ──► mp3
//!   Listening            Thinking                      Speaking          Done
//! ```
//!
//! Backends are resolved once into [`SpeechCapabilities`]; the [`VoiceAssistant`] reports a
//! failed stage instead of raising transport errors.

pub mod assistant;
pub mod bridge;
pub mod capability;
pub mod error;
pub mod inquiry;
pub mod stt;
pub mod tts;

pub use assistant::{
    CompletedConversation, ConversationOutcome, LocalContext, SpeechOutput, VoiceAssistant,
    VoiceInquiry, VoiceQueryResult,
};
pub use bridge::{BridgeState, SpeechBridge, Stage, StageFailure};
pub use capability::SpeechCapabilities;
pub use error::{VoiceError, VoiceResult};
pub use inquiry::InquiryType;
pub use stt::{OpenAiStt, PlaceholderStt, SttBackend, Transcription};
pub use tts::{OpenAiTts, PlaceholderTts, TtsBackend};
