//! Voice assistant flows with placeholder speech backends.

use sahay_core::fallback::retry_message;
use sahay_core::{Dispatcher, Language, LanguageMode, PlaceholderBackend, UserProfile};
use sahay_voice::{
    BridgeState, ConversationOutcome, InquiryType, PlaceholderStt, PlaceholderTts,
    SpeechCapabilities, Stage, VoiceAssistant,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const REPLY: &str = "Bring your Aadhaar card, two photos, and your bank passbook.";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn answering(reply: &str) -> Dispatcher {
    Dispatcher::new(Arc::new(PlaceholderBackend::with_response(reply)), "test-model")
}

fn speaking(transcript: &str) -> SpeechCapabilities {
    SpeechCapabilities::none()
        .with_stt(Arc::new(PlaceholderStt::with_response(transcript)))
        .with_tts(Arc::new(PlaceholderTts::with_audio(b"ID3fake-mp3".to_vec())))
}

fn assistant(dispatcher: Dispatcher, caps: SpeechCapabilities, dir: &TempDir) -> VoiceAssistant {
    VoiceAssistant::new(dispatcher, caps, 16, 10, dir.path())
}

#[tokio::test]
async fn test_voice_query_returns_model_answer() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let mut va = assistant(answering(REPLY), SpeechCapabilities::none(), &dir);

    let result = va
        .process_voice_query(
            "What documents do I need for a loan application?",
            None,
            "",
            Language::English,
        )
        .await;

    assert!(result.success);
    assert_eq!(result.response_text, REPLY);
    assert_eq!(va.conversation_history(10).len(), 1);

    // Cached: the second identical query is not recorded again.
    let again = va
        .process_voice_query(
            "What documents do I need for a loan application?",
            None,
            "",
            Language::English,
        )
        .await;
    assert_eq!(again, result);
    assert_eq!(va.conversation_history(10).len(), 1);
}

#[tokio::test]
async fn test_failed_query_apologises_in_profile_language() {
    let dir = TempDir::new().unwrap();
    let mut va = assistant(Dispatcher::offline(), SpeechCapabilities::none(), &dir);
    let profile = UserProfile::new().with("personal_info", "preferred_language", "hindi");

    let result = va
        .process_voice_query("loan chahiye", Some(&profile), "", Language::English)
        .await;

    assert!(!result.success);
    assert_eq!(result.language, Language::Hindi);
    assert_eq!(result.response_text, retry_message(Language::Hindi));
    assert!(result.error.is_some());
    assert!(va.conversation_history(10).is_empty());
}

#[tokio::test]
async fn test_auto_mode_uses_transcript_language() {
    let dir = TempDir::new().unwrap();
    let mut va = assistant(answering(REPLY), speaking("ನನಗೆ ಸಾಲ ಬೇಕು"), &dir);

    let outcome = va
        .handle_voice_conversation(Path::new("query.wav"), "", LanguageMode::Auto)
        .await;

    let ConversationOutcome::Completed(done) = outcome else {
        panic!("conversation failed");
    };
    assert_eq!(done.language, Language::Kannada);
    assert_eq!(done.reply.language, Language::Kannada);
    assert_eq!(
        done.trail,
        vec![
            BridgeState::Listening,
            BridgeState::Thinking,
            BridgeState::Speaking,
            BridgeState::Done
        ]
    );
    let audio = done.speech.audio_path.unwrap();
    assert!(audio.starts_with(dir.path().join("audio_output")));
    assert_eq!(std::fs::read(audio).unwrap(), b"ID3fake-mp3");
}

#[tokio::test]
async fn test_missing_stt_fails_first_stage() {
    let dir = TempDir::new().unwrap();
    let mut va = assistant(answering(REPLY), SpeechCapabilities::none(), &dir);

    let outcome = va
        .handle_voice_conversation(Path::new("query.wav"), "", LanguageMode::Auto)
        .await;

    let ConversationOutcome::Failed(failure) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(failure.stage, Stage::SpeechToText);
    assert_eq!(failure.state, BridgeState::TranscriptionFailed);
    assert!(failure.error.contains("speech-to-text"));
    assert_eq!(
        failure.trail,
        vec![BridgeState::Listening, BridgeState::TranscriptionFailed]
    );
}

#[tokio::test]
async fn test_empty_transcript_is_a_transcription_failure() {
    let dir = TempDir::new().unwrap();
    let caps = SpeechCapabilities::none().with_stt(Arc::new(PlaceholderStt::new()));
    let mut va = assistant(answering(REPLY), caps, &dir);

    let outcome = va
        .handle_voice_conversation(Path::new("silence.wav"), "", LanguageMode::Auto)
        .await;
    assert!(matches!(
        outcome,
        ConversationOutcome::Failed(ref f) if f.state == BridgeState::TranscriptionFailed
    ));
}

#[tokio::test]
async fn test_model_failure_stops_before_speaking() {
    let dir = TempDir::new().unwrap();
    let mut va = assistant(
        Dispatcher::offline(),
        speaking("How much interest for an agriculture loan?"),
        &dir,
    );

    let outcome = va
        .handle_voice_conversation(
            Path::new("query.wav"),
            "",
            LanguageMode::Fixed(Language::English),
        )
        .await;

    let ConversationOutcome::Failed(failure) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(failure.stage, Stage::LlmProcessing);
    assert_eq!(failure.state, BridgeState::QueryFailed);
    assert!(!dir.path().join("audio_output").exists());
}

#[tokio::test]
async fn test_silent_tts_is_a_synthesis_failure() {
    let dir = TempDir::new().unwrap();
    let caps = SpeechCapabilities::none()
        .with_stt(Arc::new(PlaceholderStt::with_response("Can I get a loan without collateral?")))
        .with_tts(Arc::new(PlaceholderTts::default()));
    let mut va = assistant(answering(REPLY), caps, &dir);

    let outcome = va
        .handle_voice_conversation(Path::new("query.wav"), "", LanguageMode::Auto)
        .await;

    let ConversationOutcome::Failed(failure) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(failure.stage, Stage::TextToSpeech);
    assert_eq!(failure.state, BridgeState::SynthesisFailed);
    assert_eq!(failure.trail.len(), 4);
}

#[tokio::test]
async fn test_simulation_needs_no_speech_backends() {
    let dir = TempDir::new().unwrap();
    let mut va = assistant(answering(REPLY), SpeechCapabilities::none(), &dir);

    let outcome = va
        .simulate_voice_interaction("Can I apply for loan without collateral?", Language::English)
        .await;

    let ConversationOutcome::Completed(done) = outcome else {
        panic!("simulation failed");
    };
    assert!(done.simulated);
    assert_eq!(done.transcription.confidence, 0.95);
    assert_eq!(done.speech.audio_path, None);
    assert_eq!(done.reply.response_text, REPLY);
}

#[tokio::test]
async fn test_inquiry_is_personalised() {
    let dir = TempDir::new().unwrap();
    let va = assistant(Dispatcher::offline(), SpeechCapabilities::none(), &dir);
    let profile = UserProfile::new()
        .with("personal_info", "full_name", "Geetha")
        .with("household_location", "village_name", "Malavalli")
        .with("occupation_income", "primary_occupation", "tailor");

    let inquiry = va
        .process_voice_inquiry(&profile, InquiryType::LoanStatus, Language::Hindi, true)
        .await;

    assert!(inquiry.text_response.starts_with("नमस्ते Geetha जी!"));
    assert!(inquiry.text_response.contains("Malavalli"));
    assert_eq!(inquiry.local_context.occupation, "tailor");
    assert!(inquiry.audio.is_none());
    assert!(inquiry.error.unwrap().contains("text-to-speech"));
}

#[tokio::test]
async fn test_conversation_log_is_saved() {
    let dir = TempDir::new().unwrap();
    let mut va = assistant(answering(REPLY), SpeechCapabilities::none(), &dir);
    va.process_voice_query("first", None, "", Language::English).await;
    va.process_voice_query("second", None, "", Language::English).await;

    let path = va.save_conversation_log(None).await.unwrap();
    assert!(path.starts_with(dir.path().join("conversation_logs")));
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved.as_array().unwrap().len(), 2);
    assert_eq!(saved[1]["query"], "second");

    assert_eq!(va.conversation_history(1)[0].query, "second");
    va.clear_conversation_history();
    assert!(va.conversation_history(10).is_empty());
    assert_eq!(va.supported_languages().len(), 3);
}
