//! OpenAI-compatible STT/TTS clients against a local mock server.

use sahay_core::{Language, LanguageMode};
use sahay_voice::{OpenAiStt, OpenAiTts, SttBackend, TtsBackend, VoiceError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_transcription_reads_verbose_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(header("Authorization", "Bearer stt-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": " मुझे ऋण चाहिए ",
            "duration": 2.5,
            "segments": [{"avg_logprob": 0.0}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("query.wav");
    std::fs::write(&audio, b"RIFF....WAVE").unwrap();

    let stt = OpenAiStt::new(server.uri(), "stt-key", "whisper-1").unwrap();
    let t = stt
        .transcribe(&audio, LanguageMode::Fixed(Language::Hindi))
        .await
        .unwrap();

    assert_eq!(t.text, "मुझे ऋण चाहिए");
    assert_eq!(t.detected_language, Language::Hindi);
    assert!((t.confidence - 1.0).abs() < 1e-6);
    assert!((t.duration_secs - 2.5).abs() < 1e-6);
}

#[tokio::test]
async fn test_transcription_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("query.wav");
    std::fs::write(&audio, b"RIFF").unwrap();

    let stt = OpenAiStt::new(server.uri(), "nope", "whisper-1").unwrap();
    match stt.transcribe(&audio, LanguageMode::Auto).await {
        Err(VoiceError::Stt(msg)) => assert!(msg.contains("401")),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_audio_file_is_io_error() {
    let stt = OpenAiStt::new("http://127.0.0.1:9", "k", "whisper-1").unwrap();
    let result = stt
        .transcribe(std::path::Path::new("/nonexistent/query.wav"), LanguageMode::Auto)
        .await;
    assert!(matches!(result, Err(VoiceError::Io(_))));
}

#[tokio::test]
async fn test_speech_uses_language_voice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .and(body_partial_json(json!({
            "model": "tts-1",
            "voice": "nova",
            "response_format": "mp3"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let tts = OpenAiTts::new(server.uri(), "tts-key", "tts-1").unwrap();
    let audio = tts.synthesize("ನಮಸ್ಕಾರ", Language::Kannada).await.unwrap();
    assert_eq!(audio, b"ID3audio");

    // Blank text never reaches the server.
    assert!(tts.synthesize("  ", Language::Kannada).await.unwrap().is_empty());
}
